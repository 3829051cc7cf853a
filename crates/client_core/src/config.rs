use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use shared::domain::LanguageCode;
use url::Url;

pub const SETTINGS_FILE: &str = "committee_tracker.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub bridge_url: String,
    pub request_timeout_secs: u64,
    pub scan_timeout_secs: u64,
    pub preferences_path: String,
    pub viewer_page: String,
    pub default_language: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            bridge_url: "http://127.0.0.1:8080".into(),
            request_timeout_secs: 10,
            scan_timeout_secs: 120,
            preferences_path: "./data/preferences.json".into(),
            viewer_page: "http://127.0.0.1:8080/database_viewer.html".into(),
            default_language: LanguageCode::ENGLISH.into(),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs.max(1))
    }

    pub fn bridge_url(&self) -> anyhow::Result<Url> {
        Url::parse(&self.bridge_url)
            .with_context(|| format!("invalid bridge url '{}'", self.bridge_url))
    }

    pub fn viewer_page(&self) -> anyhow::Result<Url> {
        Url::parse(&self.viewer_page)
            .with_context(|| format!("invalid viewer page url '{}'", self.viewer_page))
    }

    pub fn default_language(&self) -> LanguageCode {
        LanguageCode::new(&self.default_language)
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the flat TOML file, then environment variables.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, &file_cfg),
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable settings file"),
        }
    }

    if let Some(v) = env_first(&env, &["TRACKER_BRIDGE_URL", "APP__BRIDGE_URL"]) {
        settings.bridge_url = v;
    }
    if let Some(v) = env_first(&env, &["TRACKER_PREFERENCES_PATH", "APP__PREFERENCES_PATH"]) {
        settings.preferences_path = v;
    }
    if let Some(v) = env_first(&env, &["TRACKER_VIEWER_PAGE", "APP__VIEWER_PAGE"]) {
        settings.viewer_page = v;
    }
    if let Some(v) = env_first(&env, &["TRACKER_LANGUAGE", "APP__DEFAULT_LANGUAGE"]) {
        settings.default_language = v;
    }
    if let Some(v) = env_first(&env, &["APP__REQUEST_TIMEOUT_SECS"]) {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Some(v) = env_first(&env, &["APP__SCAN_TIMEOUT_SECS"]) {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.scan_timeout_secs = parsed;
        }
    }

    settings
}

fn apply_file(settings: &mut ClientSettings, file_cfg: &HashMap<String, toml::Value>) {
    let text = |key: &str| file_cfg.get(key).and_then(|v| v.as_str()).map(str::to_string);
    let seconds = |key: &str| {
        file_cfg.get(key).and_then(|v| match v {
            toml::Value::Integer(n) => u64::try_from(*n).ok(),
            toml::Value::String(s) => s.parse::<u64>().ok(),
            _ => None,
        })
    };

    if let Some(v) = text("bridge_url") {
        settings.bridge_url = v;
    }
    if let Some(v) = text("preferences_path") {
        settings.preferences_path = v;
    }
    if let Some(v) = text("viewer_page") {
        settings.viewer_page = v;
    }
    if let Some(v) = text("default_language") {
        settings.default_language = v;
    }
    if let Some(v) = seconds("request_timeout_secs") {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = seconds("scan_timeout_secs") {
        settings.scan_timeout_secs = v;
    }
}

fn env_first(env: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    // Later keys win, matching the APP__ overrides taking precedence.
    keys.iter().filter_map(|key| env(key)).last()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
