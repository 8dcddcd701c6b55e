// src/config/validate.rs

use crate::config::model::{Config, RawConfig};
use crate::errors::{Result, TaskdagError};

impl TryFrom<RawConfig> for Config {
    type Error = crate::errors::TaskdagError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(Config::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfig) -> Result<()> {
    validate_document(cfg)?;
    validate_checkpoint(cfg)?;
    Ok(())
}

fn validate_document(cfg: &RawConfig) -> Result<()> {
    let width = cfg.document.id_width;
    if !(1..=9).contains(&width) {
        return Err(TaskdagError::ConfigError(format!(
            "[document].id_width must be between 1 and 9 (got {width})"
        )));
    }
    Ok(())
}

fn validate_checkpoint(cfg: &RawConfig) -> Result<()> {
    let checkpoint = &cfg.checkpoint;

    match checkpoint.check_command.first() {
        Some(program) if !program.trim().is_empty() => {}
        _ => {
            return Err(TaskdagError::ConfigError(
                "[checkpoint].check_command must name a program".to_string(),
            ));
        }
    }

    if checkpoint.check_timeout_secs == 0 {
        return Err(TaskdagError::ConfigError(
            "[checkpoint].check_timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config> {
        let raw: RawConfig = toml::from_str(text)?;
        Config::try_from(raw)
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.document.id_width, 3);
        assert_eq!(cfg.replan.orphan_review_threshold, 3);
        assert_eq!(cfg.checkpoint.recent_completed, 5);
        assert_eq!(cfg.checkpoint.subprojects, vec!["backend", "frontend"]);
        assert_eq!(cfg.checkpoint.check_command, vec!["npx", "tsc", "--noEmit"]);
        assert_eq!(cfg.checkpoint.check_timeout_secs, 60);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse("[checkpoint]\ncheck_timeout_secs = 5\n").unwrap();
        assert_eq!(cfg.checkpoint.check_timeout_secs, 5);
        assert_eq!(cfg.checkpoint.recent_completed, 5);
    }

    #[test]
    fn rejects_out_of_range_values() {
        for text in [
            "[document]\nid_width = 0\n",
            "[document]\nid_width = 12\n",
            "[checkpoint]\ncheck_command = []\n",
            "[checkpoint]\ncheck_timeout_secs = 0\n",
        ] {
            assert!(
                matches!(parse(text), Err(TaskdagError::ConfigError(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn unknown_keys_are_toml_errors() {
        assert!(matches!(
            parse("[replan]\nthreshold = 1\n"),
            Err(TaskdagError::TomlError(_))
        ));
    }
}
