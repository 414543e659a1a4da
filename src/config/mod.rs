pub mod settings;
pub mod validation;
pub use settings::{default_settings_path, MirrorSettings};
pub use validation::{SettingsValidator, ValidationResult, ValidationError, ValidationWarning};
