use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "GramCare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4000";
const DEFAULT_CLASSIFIER_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_CLASSIFIER_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MEET_BASE_URL: &str = "https://meet.jit.si";

/// Get the application data directory (~/.gramcare)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(".gramcare")
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub db_path: PathBuf,
    /// Absent when no API key is configured — triage then runs on the
    /// keyword fallback alone.
    pub classifier: Option<ClassifierConfig>,
    pub doctor_phone: Option<String>,
    pub doctor_email: Option<String>,
    pub meet_base_url: String,
}

impl Config {
    /// Build configuration from the environment, with working defaults
    /// for every value except the classifier API key.
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("GRAMCARE_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
        let db_path = std::env::var("GRAMCARE_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| app_data_dir().join("gramcare.db"));

        let classifier = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(|api_key| ClassifierConfig {
                base_url: std::env::var("CLASSIFIER_URL")
                    .unwrap_or_else(|_| DEFAULT_CLASSIFIER_URL.into()),
                model: std::env::var("CLASSIFIER_MODEL")
                    .unwrap_or_else(|_| DEFAULT_CLASSIFIER_MODEL.into()),
                api_key,
                timeout_secs: std::env::var("CLASSIFIER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_CLASSIFIER_TIMEOUT_SECS),
            });

        Self {
            bind_addr,
            db_path,
            classifier,
            doctor_phone: std::env::var("DOCTOR_PHONE").ok().filter(|v| !v.is_empty()),
            doctor_email: std::env::var("DOCTOR_EMAIL").ok().filter(|v| !v.is_empty()),
            meet_base_url: std::env::var("MEET_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_MEET_BASE_URL.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with(".gramcare"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
