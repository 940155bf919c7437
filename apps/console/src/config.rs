use std::{collections::HashMap, fs};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_url: String,
    pub username: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080/api/".into(),
            username: None,
        }
    }
}

/// Defaults, overridden by `console.toml`, overridden by `CONSOLE__*` env.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("console.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_file_config(&mut settings, &file_cfg);
        }
    }

    if let Ok(v) = std::env::var("CONSOLE__SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("CONSOLE__USERNAME") {
        settings.username = Some(v);
    }

    settings
}

fn apply_file_config(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("username") {
        settings.username = Some(v.clone());
    }
}
