use lumina_core::KernelConfig;
use thiserror::Error;

use crate::validator::{validate_config, ValidationError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to parse kernel config RON: {0}")]
    ConfigParseError(String),
    #[error("Kernel config '{name}' failed validation with {} errors", .errors.len())]
    Invalid {
        name: String,
        errors: Vec<ValidationError>,
    },
}

/// Parse a single kernel config RON string. Does not validate.
pub fn load_config_from_str(ron_str: &str) -> Result<KernelConfig, LoadError> {
    let options = ron::Options::default();
    options
        .from_str(ron_str)
        .map_err(|e| LoadError::ConfigParseError(e.to_string()))
}

/// Parse and validate a named kernel config. Every validation error is
/// logged before the aggregate error is returned.
pub fn load_validated(name: &str, ron_str: &str) -> Result<KernelConfig, LoadError> {
    let config = load_config_from_str(ron_str)?;
    if let Err(errors) = validate_config(&config) {
        for e in &errors {
            log::error!("Kernel config '{name}': {e}");
        }
        return Err(LoadError::Invalid {
            name: name.to_string(),
            errors,
        });
    }
    log::debug!(
        "Loaded kernel config '{name}': policy={:?}, steps={}..={}, divisor={}",
        config.policy,
        config.step_budget.min_steps,
        config.step_budget.max_steps,
        config.step_budget.distance_divisor
    );
    Ok(config)
}
