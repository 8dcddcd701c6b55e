// src/document/labels.rs

//! Field label vocabulary.
//!
//! Every field of a task record is a labeled line such as
//! `- **Status**: pending`. Plan documents exist in two label styles (English
//! and Chinese, as produced by the bilingual planning templates); both are
//! accepted when reading, and new records are written in whichever style the
//! document already uses.

use std::fmt;

/// Language of the field labels used in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    #[default]
    English,
    Chinese,
}

/// A recognised field of a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Status,
    Assignee,
    ClaimedAt,
    Priority,
    Dependencies,
    Module,
    Description,
    AcceptanceCriteria,
    RelatedFiles,
}

impl Field {
    /// All fields in canonical record order.
    pub const ALL: [Field; 9] = [
        Field::Status,
        Field::Assignee,
        Field::ClaimedAt,
        Field::Priority,
        Field::Dependencies,
        Field::Module,
        Field::Description,
        Field::AcceptanceCriteria,
        Field::RelatedFiles,
    ];

    /// Stable machine name, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Field::Status => "status",
            Field::Assignee => "assignee",
            Field::ClaimedAt => "claimed_at",
            Field::Priority => "priority",
            Field::Dependencies => "dependencies",
            Field::Module => "module",
            Field::Description => "description",
            Field::AcceptanceCriteria => "acceptance_criteria",
            Field::RelatedFiles => "related_files",
        }
    }

    /// Label written for this field in the given style.
    pub fn label(self, style: LabelStyle) -> &'static str {
        match style {
            LabelStyle::English => self.english_labels()[0],
            LabelStyle::Chinese => self.chinese_label(),
        }
    }

    fn english_labels(self) -> &'static [&'static str] {
        match self {
            Field::Status => &["Status"],
            Field::Assignee => &["Assignee", "Owner"],
            Field::ClaimedAt => &["Claimed At", "Claim Time"],
            Field::Priority => &["Priority"],
            Field::Dependencies => &["Dependencies", "Depends On"],
            Field::Module => &["Module"],
            Field::Description => &["Description"],
            Field::AcceptanceCriteria => &["Acceptance Criteria", "Acceptance"],
            Field::RelatedFiles => &["Related Files", "Files"],
        }
    }

    fn chinese_label(self) -> &'static str {
        match self {
            Field::Status => "状态",
            Field::Assignee => "执行者",
            Field::ClaimedAt => "认领时间",
            Field::Priority => "优先级",
            Field::Dependencies => "依赖",
            Field::Module => "模块",
            Field::Description => "描述",
            Field::AcceptanceCriteria => "验收标准",
            Field::RelatedFiles => "相关文件",
        }
    }

    /// Resolve a label as written in a document.
    ///
    /// English labels match case-insensitively; unknown labels return `None`
    /// and the line is carried through untouched.
    pub fn from_label(label: &str) -> Option<(Field, LabelStyle)> {
        let label = label.trim();
        Field::ALL.into_iter().find_map(|field| {
            if field.chinese_label() == label {
                Some((field, LabelStyle::Chinese))
            } else if field
                .english_labels()
                .iter()
                .any(|l| l.eq_ignore_ascii_case(label))
            {
                Some((field, LabelStyle::English))
            } else {
                None
            }
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value written for a cleared optional field.
pub const EMPTY_MARKER: &str = "-";

/// Whether a raw field value means "nothing here".
pub fn is_empty_marker(value: &str) -> bool {
    matches!(value.trim(), "" | "-" | "无") || value.trim().eq_ignore_ascii_case("none")
}

/// Text written for an empty dependency list.
pub fn no_dependencies(style: LabelStyle) -> &'static str {
    match style {
        LabelStyle::English => "none",
        LabelStyle::Chinese => "无",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_both_label_styles() {
        assert_eq!(
            Field::from_label("Status"),
            Some((Field::Status, LabelStyle::English))
        );
        assert_eq!(
            Field::from_label("claimed at"),
            Some((Field::ClaimedAt, LabelStyle::English))
        );
        assert_eq!(
            Field::from_label("依赖"),
            Some((Field::Dependencies, LabelStyle::Chinese))
        );
        assert_eq!(Field::from_label("Estimate"), None);
    }

    #[test]
    fn empty_markers() {
        for v in ["", " - ", "none", "None", "无"] {
            assert!(is_empty_marker(v), "{v:?} should be empty");
        }
        assert!(!is_empty_marker("TASK-001"));
    }
}
