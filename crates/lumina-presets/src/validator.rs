use lumina_core::KernelConfig;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("min_steps must be at least 1 (march loop would never sample)")]
    ZeroMinSteps,
    #[error("min_steps {min} exceeds max_steps {max}")]
    InvertedStepRange { min: u32, max: u32 },
    #[error("distance_divisor {0} must be finite and positive")]
    InvalidDistanceDivisor(f32),
    #[error("occlusion_threshold {0} outside [0, 1]")]
    ThresholdOutOfRange(f32),
    #[error("ambient {0} outside [0, 1]")]
    AmbientOutOfRange(f32),
    #[error("max_opacity {0} outside [0, 1]")]
    MaxOpacityOutOfRange(f32),
}

fn unit_range(v: f32) -> bool {
    (0.0..=1.0).contains(&v)
}

/// Validate a kernel config. All violations are collected.
pub fn validate_config(config: &KernelConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let budget = &config.step_budget;

    if budget.min_steps == 0 {
        errors.push(ValidationError::ZeroMinSteps);
    }
    if budget.min_steps > budget.max_steps {
        errors.push(ValidationError::InvertedStepRange {
            min: budget.min_steps,
            max: budget.max_steps,
        });
    }
    if !budget.distance_divisor.is_finite() || budget.distance_divisor <= 0.0 {
        errors.push(ValidationError::InvalidDistanceDivisor(
            budget.distance_divisor,
        ));
    }
    if !unit_range(config.occlusion_threshold) {
        errors.push(ValidationError::ThresholdOutOfRange(
            config.occlusion_threshold,
        ));
    }
    if let Some(ambient) = config.ambient {
        if !unit_range(ambient) {
            errors.push(ValidationError::AmbientOutOfRange(ambient));
        }
    }
    if let Some(cap) = config.max_opacity {
        if !unit_range(cap) {
            errors.push(ValidationError::MaxOpacityOutOfRange(cap));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
