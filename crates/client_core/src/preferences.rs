//! Persisted UI preferences (currently only the language code).

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use shared::domain::LanguageCode;

pub const LANGUAGE_KEY: &str = "wpsg_language";

pub trait PreferenceStore: Send + Sync {
    fn load_language(&self) -> Result<Option<LanguageCode>>;
    fn save_language(&self, language: &LanguageCode) -> Result<()>;
}

/// JSON object on disk, one string value per key.
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read preferences '{}'", self.path.display())
                })
            }
        };
        serde_json::from_str(&raw)
            .with_context(|| format!("malformed preferences file '{}'", self.path.display()))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load_language(&self) -> Result<Option<LanguageCode>> {
        Ok(self
            .read_all()?
            .get(LANGUAGE_KEY)
            .filter(|code| !code.trim().is_empty())
            .map(LanguageCode::new))
    }

    fn save_language(&self, language: &LanguageCode) -> Result<()> {
        // A corrupt file is replaced rather than blocking the save.
        let mut all = self.read_all().unwrap_or_default();
        all.insert(LANGUAGE_KEY.to_string(), language.as_str().to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create preferences directory '{}'", parent.display())
            })?;
        }
        let body = serde_json::to_string_pretty(&all)?;
        fs::write(&self.path, body)
            .with_context(|| format!("failed to write preferences '{}'", self.path.display()))
    }
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    language: Mutex<Option<LanguageCode>>,
}

impl MemoryPreferenceStore {
    pub fn with_language(language: LanguageCode) -> Self {
        Self {
            language: Mutex::new(Some(language)),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_language(&self) -> Result<Option<LanguageCode>> {
        Ok(self
            .language
            .lock()
            .map_err(|_| anyhow::anyhow!("preference lock poisoned"))?
            .clone())
    }

    fn save_language(&self, language: &LanguageCode) -> Result<()> {
        *self
            .language
            .lock()
            .map_err(|_| anyhow::anyhow!("preference lock poisoned"))? = Some(language.clone());
        Ok(())
    }
}
