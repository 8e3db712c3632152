use chrono::NaiveDate;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub backend_base_url: Url,
    pub backend_token: Option<String>,
    pub debug: bool,
    pub auth_token: String,
    pub enable_swagger: bool,
    pub port: u16,
    /// IANA name used when a request does not say which timezone it views in.
    pub display_timezone: String,
    pub evening_start_hour: u32,
    pub signup_start_hour: u32,
    pub signup_duration_minutes: u32,
    pub min_attendance: usize,
    pub fridays_to_show: usize,
    #[serde(default)]
    pub disabled_fridays: Vec<NaiveDate>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_base_url: Url::parse("http://localhost:3000/api").expect("default URL parses"),
            backend_token: None,
            debug: false,
            auth_token: "default-token-change-me".to_string(),
            enable_swagger: true,
            port: 8080,
            display_timezone: "UTC".to_string(),
            evening_start_hour: 18,
            signup_start_hour: 19,
            signup_duration_minutes: 120,
            min_attendance: 2,
            fridays_to_show: 4,
            disabled_fridays: Vec::new(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // APP_ prefix, double underscore for nesting so single underscores stay in key names
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("disabled_fridays"),
            )
            .set_default("backend_base_url", "http://localhost:3000/api")?
            .set_default("debug", false)?
            .set_default("auth_token", "default-token-change-me")?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("display_timezone", "UTC")?
            .set_default("evening_start_hour", 18)?
            .set_default("signup_start_hour", 19)?
            .set_default("signup_duration_minutes", 120)?
            .set_default("min_attendance", 2)?
            .set_default("fridays_to_show", 4)?
            .set_default("disabled_fridays", Vec::<String>::new())?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Signups must land inside the evening window that attendance counts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.evening_start_hour > 23 || self.signup_start_hour > 23 {
            return Err(ConfigError::Message(
                "evening_start_hour and signup_start_hour must be between 0 and 23".into(),
            ));
        }
        if self.signup_start_hour < self.evening_start_hour {
            return Err(ConfigError::Message(format!(
                "signup_start_hour ({}) must not be earlier than evening_start_hour ({})",
                self.signup_start_hour, self.evening_start_hour
            )));
        }
        if self.signup_duration_minutes == 0 {
            return Err(ConfigError::Message(
                "signup_duration_minutes must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Parses a timezone name, falling back to UTC when it is unknown.
    pub fn parse_timezone(name: &str) -> Tz {
        match name.trim().parse::<Tz>() {
            Ok(tz) => tz,
            Err(err) => {
                warn!(timezone = %name, error = %err, "unknown timezone, using UTC");
                chrono_tz::UTC
            }
        }
    }

    pub fn timezone(&self) -> Tz {
        Self::parse_timezone(&self.display_timezone)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for key in [
            "APP_PORT",
            "APP_DISPLAY_TIMEZONE",
            "APP_DISABLED_FRIDAYS",
            "APP_EVENING_START_HOUR",
            "APP_SIGNUP_START_HOUR",
        ] {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.evening_start_hour, 18);
        assert_eq!(settings.signup_start_hour, 19);
        assert_eq!(settings.signup_duration_minutes, 120);
        assert_eq!(settings.min_attendance, 2);
        assert_eq!(settings.fridays_to_show, 4);
        assert!(settings.disabled_fridays.is_empty());
        assert_eq!(settings.timezone(), chrono_tz::UTC);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("APP_PORT", "9090");
            std::env::set_var("APP_DISPLAY_TIMEZONE", "America/Los_Angeles");
            std::env::set_var("APP_DISABLED_FRIDAYS", "2025-12-26,2026-01-02");
        }
        let settings = Settings::from_env().unwrap();
        clear_env();

        assert_eq!(settings.port, 9090);
        assert_eq!(settings.timezone(), chrono_tz::America::Los_Angeles);
        assert_eq!(
            settings.disabled_fridays,
            vec![
                NaiveDate::from_ymd_opt(2025, 12, 26).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            ]
        );
    }

    #[test]
    #[serial]
    fn test_rejects_out_of_range_hour() {
        clear_env();
        unsafe { std::env::set_var("APP_EVENING_START_HOUR", "24") };
        let result = Settings::from_env();
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_rejects_signup_before_evening() {
        clear_env();
        unsafe { std::env::set_var("APP_SIGNUP_START_HOUR", "17") };
        let result = Settings::from_env();
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_friday_rules() {
        assert!(Settings::default().validate().is_ok());

        let early_signup = Settings {
            signup_start_hour: 17,
            ..Settings::default()
        };
        assert!(early_signup.validate().is_err());

        let at_evening_start = Settings {
            signup_start_hour: 18,
            ..Settings::default()
        };
        assert!(at_evening_start.validate().is_ok());

        let no_duration = Settings {
            signup_duration_minutes: 0,
            ..Settings::default()
        };
        assert!(no_duration.validate().is_err());
    }

    #[test]
    fn test_parse_timezone_fallback() {
        assert_eq!(Settings::parse_timezone("Europe/Warsaw"), chrono_tz::Europe::Warsaw);
        assert_eq!(Settings::parse_timezone("Mars/Olympus"), chrono_tz::UTC);
    }
}
