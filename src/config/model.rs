// src/config/model.rs

use serde::Deserialize;

/// Configuration as read from `Taskdag.toml`, before validation.
///
/// ```toml
/// [document]
/// id_width = 3
///
/// [replan]
/// orphan_review_threshold = 3
///
/// [checkpoint]
/// recent_completed = 5
/// subprojects = ["backend", "frontend"]
/// check_command = ["npx", "tsc", "--noEmit"]
/// check_timeout_secs = 60
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default)]
    pub document: DocumentSection,

    #[serde(default)]
    pub replan: ReplanSection,

    #[serde(default)]
    pub checkpoint: CheckpointSection,
}

/// Validated configuration. Build it with `Config::try_from(raw)`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub document: DocumentSection,
    pub replan: ReplanSection,
    pub checkpoint: CheckpointSection,
}

impl Config {
    pub(crate) fn new_unchecked(raw: RawConfig) -> Self {
        Self {
            document: raw.document,
            replan: raw.replan,
            checkpoint: raw.checkpoint,
        }
    }
}

/// `[document]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentSection {
    /// Minimum number of digits in newly allocated task ids.
    #[serde(default = "default_id_width")]
    pub id_width: usize,
}

fn default_id_width() -> usize {
    crate::replan::DEFAULT_ID_WIDTH
}

impl Default for DocumentSection {
    fn default() -> Self {
        Self {
            id_width: default_id_width(),
        }
    }
}

/// `[replan]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplanSection {
    /// A "review" suggestion is made once the number of isolated pending
    /// tasks exceeds this.
    #[serde(default = "default_orphan_review_threshold")]
    pub orphan_review_threshold: usize,
}

fn default_orphan_review_threshold() -> usize {
    crate::replan::DEFAULT_ORPHAN_REVIEW_THRESHOLD
}

impl Default for ReplanSection {
    fn default() -> Self {
        Self {
            orphan_review_threshold: default_orphan_review_threshold(),
        }
    }
}

/// `[checkpoint]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckpointSection {
    /// How many of the most recently completed tasks get their related
    /// files checked.
    #[serde(default = "default_recent_completed")]
    pub recent_completed: usize,

    /// Sub-project directories (relative to the project root) in which the
    /// check command runs, if they exist.
    #[serde(default = "default_subprojects")]
    pub subprojects: Vec<String>,

    /// Program and arguments of the static check.
    #[serde(default = "default_check_command")]
    pub check_command: Vec<String>,

    #[serde(default = "default_check_timeout_secs")]
    pub check_timeout_secs: u64,
}

fn default_recent_completed() -> usize {
    5
}

fn default_subprojects() -> Vec<String> {
    vec!["backend".to_string(), "frontend".to_string()]
}

fn default_check_command() -> Vec<String> {
    ["npx", "tsc", "--noEmit"].map(String::from).to_vec()
}

fn default_check_timeout_secs() -> u64 {
    60
}

impl Default for CheckpointSection {
    fn default() -> Self {
        Self {
            recent_completed: default_recent_completed(),
            subprojects: default_subprojects(),
            check_command: default_check_command(),
            check_timeout_secs: default_check_timeout_secs(),
        }
    }
}
