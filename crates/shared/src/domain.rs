use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(CommitteeId);

/// Committee taxonomy the list is partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Filter {
    #[default]
    Cen,
    Iso,
}

impl Filter {
    pub const ALL: [Filter; 2] = [Filter::Cen, Filter::Iso];

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::Cen => "CEN",
            Filter::Iso => "ISO",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CEN" => Some(Filter::Cen),
            "ISO" => Some(Filter::Iso),
            _ => None,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub const ENGLISH: &'static str = "en";
    pub const DUTCH: &'static str = "nl";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_lowercase())
    }

    pub fn english() -> Self {
        Self(Self::ENGLISH.to_string())
    }

    pub fn dutch() -> Self {
        Self(Self::DUTCH.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_dutch(&self) -> bool {
        self.0 == Self::DUTCH
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dataset categories linked from the main page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetCategory {
    UnderDevelopment,
    RecentlyPublished,
    IsoDeleted,
    NeedMore,
}

impl DatasetCategory {
    /// Key passed to the viewer page; `None` for categories without a viewer.
    pub fn viewer_key(self) -> Option<&'static str> {
        match self {
            DatasetCategory::UnderDevelopment => Some("under_development"),
            DatasetCategory::RecentlyPublished => Some("recently_published"),
            DatasetCategory::IsoDeleted => Some("iso_deleted"),
            DatasetCategory::NeedMore => None,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "under_development" => Some(DatasetCategory::UnderDevelopment),
            "recently_published" => Some(DatasetCategory::RecentlyPublished),
            "iso_deleted" => Some(DatasetCategory::IsoDeleted),
            "need_more" => Some(DatasetCategory::NeedMore),
            _ => None,
        }
    }
}
