use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "snipt";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("snipt_config.json"))
    }

    pub fn results_log_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.data_local_dir().join("results.csv"))
            .unwrap_or_else(|| PathBuf::from("snipt_results.csv"))
    }

    /// Diagnostic log, under $HOME/.local/state when available.
    pub fn log_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
                .join("snipt.log")
        } else {
            Self::project()
                .map(|pd| pd.data_local_dir().join("snipt.log"))
                .unwrap_or_else(|| PathBuf::from("snipt.log"))
        }
    }
}
