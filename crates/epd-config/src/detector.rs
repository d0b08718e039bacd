use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::engine::EngineConfig;
use crate::logging::LoggingConfig;
use crate::validate;

/// Resolved, validated contents of an `epd.toml` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

impl DetectorConfig {
    /// Read and parse an `epd.toml` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.as_ref().display()))?;
        content.parse()
    }
}

impl FromStr for DetectorConfig {
    type Err = anyhow::Error;

    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let config: DetectorConfig = toml::from_str(toml_str)?;
        validate::validate(&config)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use std::path::PathBuf;

    const FULL_TOML: &str = r#"
[engine]
helper_prefixes = ["_.", "lodash."]
event_types = ["ObjectEvent", "SensorEvent"]

[logging]
level = "warn"
modules = { "epd_core" = "trace", "epd_runtime" = "debug" }
file = "logs/epd.log"
format = "json"
"#;

    #[test]
    fn load_full_toml() {
        let cfg: DetectorConfig = FULL_TOML.parse().unwrap();

        assert_eq!(cfg.engine.helper_prefixes, vec!["_.", "lodash."]);
        assert_eq!(cfg.engine.event_types, vec!["ObjectEvent", "SensorEvent"]);

        assert_eq!(cfg.logging.level, "warn");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.file, Some(PathBuf::from("logs/epd.log")));
        assert_eq!(
            cfg.logging.directives(),
            "warn,epd_core=trace,epd_runtime=debug"
        );
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg: DetectorConfig = "".parse().unwrap();
        assert_eq!(cfg.engine, EngineConfig::default());
        assert_eq!(cfg.engine.helper_prefixes, vec!["_."]);
        assert_eq!(cfg.engine.event_types.len(), 5);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.format, LogFormat::Plain);
        assert!(cfg.logging.file.is_none());
    }

    #[test]
    fn partial_engine_section_keeps_other_defaults() {
        let cfg: DetectorConfig = "[engine]\nevent_types = [\"SensorEvent\"]\n"
            .parse()
            .unwrap();
        assert_eq!(cfg.engine.helper_prefixes, vec!["_."]);
        assert_eq!(cfg.engine.event_types, vec!["SensorEvent"]);
    }

    #[test]
    fn reject_no_helper_prefixes() {
        let toml = FULL_TOML.replace(r#"helper_prefixes = ["_.", "lodash."]"#, "helper_prefixes = []");
        assert!(toml.parse::<DetectorConfig>().is_err());
    }

    #[test]
    fn reject_blank_helper_prefix() {
        let toml = FULL_TOML.replace(r#"["_.", "lodash."]"#, r#"["_.", " "]"#);
        let err = toml.parse::<DetectorConfig>().unwrap_err();
        assert!(err.to_string().contains("helper_prefixes[1]"));
    }

    #[test]
    fn reject_empty_event_type() {
        let toml = FULL_TOML.replace(r#"["ObjectEvent", "SensorEvent"]"#, r#"["ObjectEvent", ""]"#);
        assert!(toml.parse::<DetectorConfig>().is_err());
    }

    #[test]
    fn reject_unknown_log_format() {
        let toml = FULL_TOML.replace(r#"format = "json""#, r#"format = "xml""#);
        assert!(toml.parse::<DetectorConfig>().is_err());
    }
}
