use super::MirrorSettings;
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}
pub struct SettingsValidator;
impl SettingsValidator {
    pub fn new() -> Self {
        Self
    }
    pub fn validate(&self, settings: &MirrorSettings) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        self.validate_batching(settings, &mut errors);
        self.validate_timing(settings, &mut errors, &mut warnings);
        self.validate_sampling(settings, &mut errors, &mut warnings);
        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
    fn validate_batching(
        &self,
        settings: &MirrorSettings,
        errors: &mut Vec<ValidationError>,
    ) {
        for (field, value) in [
            ("discovery_batch_size", settings.discovery_batch_size),
            ("sync_batch_size", settings.sync_batch_size),
            ("event_capacity", settings.event_capacity),
        ] {
            if value == 0 {
                errors
                    .push(ValidationError {
                        field: field.to_string(),
                        message: format!("{} cannot be zero", field),
                        suggestion: Some("Set a value greater than 0".to_string()),
                    });
            }
        }
    }
    fn validate_timing(
        &self,
        settings: &MirrorSettings,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        if settings.poll_interval_ms == 0 {
            errors
                .push(ValidationError {
                    field: "poll_interval_ms".to_string(),
                    message: "Poll interval cannot be zero".to_string(),
                    suggestion: Some("Use an interval of a few seconds".to_string()),
                });
        } else if settings.poll_interval_ms < settings.debounce_ms {
            warnings
                .push(ValidationWarning {
                    field: "poll_interval_ms".to_string(),
                    message: "Poll interval is shorter than the debounce window"
                        .to_string(),
                    suggestion: Some(
                        "Polls will keep restarting the debounce timer".to_string(),
                    ),
                });
        }
        if settings.debounce_ms < 100 {
            warnings
                .push(ValidationWarning {
                    field: "debounce_ms".to_string(),
                    message: "Very short debounce window will not coalesce bursts"
                        .to_string(),
                    suggestion: Some("Consider 1000-3000 ms".to_string()),
                });
        }
    }
    fn validate_sampling(
        &self,
        settings: &MirrorSettings,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        if settings.poll_sample_size == 0 {
            errors
                .push(ValidationError {
                    field: "poll_sample_size".to_string(),
                    message: "Poll sample size cannot be zero".to_string(),
                    suggestion: Some("The default samples 50 files".to_string()),
                });
        } else if settings.poll_sample_size > 1000 {
            warnings
                .push(ValidationWarning {
                    field: "poll_sample_size".to_string(),
                    message: "Large samples make every poll tick expensive".to_string(),
                    suggestion: Some("Keep the sample size around 50-200".to_string()),
                });
        }
        if settings.hash_prefix_bytes == 0 {
            errors
                .push(ValidationError {
                    field: "hash_prefix_bytes".to_string(),
                    message: "Hash prefix cannot be empty".to_string(),
                    suggestion: Some("The default hashes the first 64 KiB".to_string()),
                });
        }
    }
    pub fn validate_and_fix(&self, settings: &mut MirrorSettings) -> ValidationResult {
        let result = self.validate(settings);
        let defaults = MirrorSettings::default();
        if settings.discovery_batch_size == 0 {
            settings.discovery_batch_size = defaults.discovery_batch_size;
        }
        if settings.sync_batch_size == 0 {
            settings.sync_batch_size = defaults.sync_batch_size;
        }
        if settings.event_capacity == 0 {
            settings.event_capacity = defaults.event_capacity;
        }
        if settings.poll_interval_ms == 0 {
            settings.poll_interval_ms = defaults.poll_interval_ms;
        }
        if settings.poll_sample_size == 0 {
            settings.poll_sample_size = defaults.poll_sample_size;
        }
        if settings.hash_prefix_bytes == 0 {
            settings.hash_prefix_bytes = defaults.hash_prefix_bytes;
        }
        result
    }
}
impl Default for SettingsValidator {
    fn default() -> Self {
        Self::new()
    }
}
