use std::{collections::HashMap, fs};

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub database_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".into(),
            database_url: "sqlite://./data/portal.db".into(),
        }
    }
}

/// Defaults, overridden by `portal.toml` in the working directory, overridden
/// in turn by `PORTAL_API_URL` / `PORTAL_DATABASE_URL`.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("portal.toml") {
        apply_file_config(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("PORTAL_API_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("PORTAL_DATABASE_URL") {
        settings.database_url = v;
    }

    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("api_base_url") {
            settings.api_base_url = v.clone();
        }
        if let Some(v) = file_cfg.get("database_url") {
            settings.database_url = v.clone();
        }
    }
}
