use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "HealthGuard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the Gemini API key.
/// The orchestrator never reads this itself; callers decide whether to
/// construct a generative client from it.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Generative model used for clinical regimen validation.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Base URL of the Gemini generateContent API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Wall-clock budget for a single outbound generate call. A validation
/// makes at most one such call before falling back to rules.
pub const GEMINI_TIMEOUT_SECS: u64 = 60;

pub fn default_log_filter() -> &'static str {
    "healthguard=info"
}

/// Get the application data directory
/// ~/HealthGuard/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("HealthGuard")
}

/// Default path of the validation history database
pub fn validation_db_path() -> PathBuf {
    app_data_dir().join("validations.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("HealthGuard"));
    }

    #[test]
    fn validation_db_under_app_data() {
        let db = validation_db_path();
        let app = app_data_dir();
        assert!(db.starts_with(app));
        assert!(db.ends_with("validations.db"));
    }

    #[test]
    fn app_name_is_healthguard() {
        assert_eq!(APP_NAME, "HealthGuard");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
