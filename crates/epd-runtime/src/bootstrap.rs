use std::path::Path;

use epd_config::DetectorConfig;
use epd_core::{DetectionResult, PredicateResolver, ProfileDetector, StructuralClassifier};
use orion_error::compat_prelude::*;
use orion_error::prelude::*;
use serde_json::Value;
use tracing_appender::non_blocking::WorkerGuard;

use crate::error::{RuntimeReason, RuntimeResult};
use crate::tracing_init::init_tracing;

/// A configured detector together with the configuration it was built from.
pub struct DetectorRuntime {
    pub config: DetectorConfig,
    pub detector: ProfileDetector,
    /// Keeps the log file writer alive; `None` when logging to stderr only.
    pub log_guard: Option<WorkerGuard>,
}

impl DetectorRuntime {
    /// Run detection, lifting engine failures into [`RuntimeReason::Core`].
    pub fn detect(&self, document: &Value, rules: &Value) -> RuntimeResult<DetectionResult> {
        self.detector.detect(document, rules).err_conv()
    }
}

/// Wire a [`ProfileDetector`] from the `[engine]` section.
pub fn build_detector(config: &DetectorConfig) -> ProfileDetector {
    let engine = &config.engine;
    ProfileDetector::new()
        .with_resolver(PredicateResolver::new(engine.helper_prefixes.iter().cloned()))
        .with_classifier(StructuralClassifier::new(engine.event_types.iter().cloned()))
}

/// Load `epd.toml`, install logging, and build the detector.
///
/// Installs the global subscriber, so call it once per process.
pub fn load(path: impl AsRef<Path>) -> RuntimeResult<DetectorRuntime> {
    let path = path.as_ref();
    let config = DetectorConfig::load(path).owe_conf()?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let log_guard = init_tracing(&config.logging, base_dir).owe(RuntimeReason::Bootstrap)?;
    epd_debug!(conf, path = %path.display(), "config loaded");

    let detector = build_detector(&config);
    epd_info!(
        sys,
        helper_prefixes = ?config.engine.helper_prefixes,
        event_types = config.engine.event_types.len(),
        "profile detector ready"
    );
    Ok(DetectorRuntime {
        config,
        detector,
        log_guard,
    })
}
