use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";
pub const DEFAULT_RECIPIENT_NAME: &str = "Site Owner";

/// Settings for the contact relay. Built once at startup and handed to the
/// controller, nothing reads these from ambient globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactConfig {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub recipient_name: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("contact relay setting `{0}` is empty")]
    Missing(&'static str),
}

impl ContactConfig {
    /// Reads the relay settings captured at compile time (see build.rs).
    pub fn from_build_env() -> Self {
        Self {
            endpoint: option_env!("EMAILJS_ENDPOINT")
                .unwrap_or(DEFAULT_ENDPOINT)
                .to_string(),
            service_id: option_env!("EMAILJS_SERVICE_ID")
                .unwrap_or_default()
                .to_string(),
            template_id: option_env!("EMAILJS_TEMPLATE_ID")
                .unwrap_or_default()
                .to_string(),
            public_key: option_env!("EMAILJS_PUBLIC_KEY")
                .unwrap_or_default()
                .to_string(),
            recipient_name: option_env!("CONTACT_RECIPIENT_NAME")
                .unwrap_or(DEFAULT_RECIPIENT_NAME)
                .to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("endpoint", &self.endpoint),
            ("service_id", &self.service_id),
            ("template_id", &self.template_id),
            ("public_key", &self.public_key),
            ("recipient_name", &self.recipient_name),
        ];
        match fields.iter().find(|(_, v)| v.trim().is_empty()) {
            Some((name, _)) => Err(ConfigError::Missing(name)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ContactConfig {
        ContactConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            service_id: "service_test".to_string(),
            template_id: "template_test".to_string(),
            public_key: "pk_test".to_string(),
            recipient_name: "Jordan".to_string(),
        }
    }

    #[test]
    fn test_complete_config_is_valid() {
        assert_eq!(config().validate(), Ok(()));
    }

    #[test]
    fn test_blank_setting_is_reported() {
        let mut cfg = config();
        cfg.template_id = "  ".to_string();
        assert_eq!(cfg.validate(), Err(ConfigError::Missing("template_id")));

        let mut cfg = config();
        cfg.public_key.clear();
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.to_string(), "contact relay setting `public_key` is empty");
    }
}
