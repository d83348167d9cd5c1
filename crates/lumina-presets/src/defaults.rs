//! Built-in kernel presets, compiled in from `data/presets/`.

use lumina_core::KernelConfig;

use crate::loader::{load_validated, LoadError};

pub const BUILTIN_PRESET_NAMES: [&str; 2] = ["fast", "quality"];

/// Raw RON source of a built-in preset.
pub fn builtin_preset(name: &str) -> Option<&'static str> {
    match name {
        "fast" => Some(include_str!("../../../data/presets/fast.ron")),
        "quality" => Some(include_str!("../../../data/presets/quality.ron")),
        _ => None,
    }
}

/// Load and validate a built-in preset by name. Unknown names return `None`.
pub fn load_builtin(name: &str) -> Option<Result<KernelConfig, LoadError>> {
    builtin_preset(name).map(|src| load_validated(name, src))
}
