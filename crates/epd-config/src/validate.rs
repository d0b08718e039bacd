use crate::detector::DetectorConfig;

/// Called from `DetectorConfig::from_str` / `load`.
pub(crate) fn validate(config: &DetectorConfig) -> anyhow::Result<()> {
    let engine = &config.engine;

    if engine.helper_prefixes.is_empty() {
        anyhow::bail!("engine.helper_prefixes must contain at least one prefix");
    }
    for (i, prefix) in engine.helper_prefixes.iter().enumerate() {
        if prefix.trim().is_empty() {
            anyhow::bail!("engine.helper_prefixes[{i}] must not be empty");
        }
    }

    for (i, event_type) in engine.event_types.iter().enumerate() {
        if event_type.trim().is_empty() {
            anyhow::bail!("engine.event_types[{i}] must not be empty");
        }
    }

    if config.logging.level.trim().is_empty() {
        anyhow::bail!("logging.level must not be empty");
    }

    Ok(())
}
