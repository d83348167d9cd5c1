pub mod defaults;
pub mod loader;
pub mod validator;

pub use defaults::{builtin_preset, load_builtin, BUILTIN_PRESET_NAMES};
pub use loader::{load_config_from_str, LoadError};
pub use validator::{validate_config, ValidationError};
