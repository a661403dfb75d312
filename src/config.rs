use std::{env, path::PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub prefs_path: PathBuf,
    pub user_id: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: resolve_port(),
            data_path: resolve_data_path(),
            prefs_path: resolve_prefs_path(),
            user_id: env::var("APP_USER_ID").unwrap_or_else(|_| "local".to_string()),
        }
    }
}

pub fn resolve_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080)
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/tasks.json")
}

pub fn resolve_prefs_path() -> PathBuf {
    if let Ok(path) = env::var("APP_PREFS_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/preferences.json")
}
