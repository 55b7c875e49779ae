use std::path::PathBuf;

pub const DEFAULT_SESSION_PATH: &str = "wealth_session.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub session_path: PathBuf,
    pub dataset_path: Option<PathBuf>,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            session_path: non_empty("WEALTH_SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH)),
            dataset_path: non_empty("WEALTH_DATASET_PATH").map(PathBuf::from),
            log_level: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }
}
