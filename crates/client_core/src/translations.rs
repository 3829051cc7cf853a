//! Translation cache: active language table with a built-in English fallback.

use shared::{domain::LanguageCode, protocol::TranslationMap};

pub mod keys {
    pub const APP_TITLE: &str = "app_title";
    pub const FILTER_COMMITTEES: &str = "filter_committees";
    pub const SCAN_UPDATES: &str = "scan_updates";
    pub const LAST_RUN: &str = "last_run";
    pub const LOADING: &str = "loading";
    pub const VIEW_DATASETS: &str = "view_datasets";
    pub const STANDARDS_UNDER_DEVELOPMENT: &str = "standards_under_development";
    pub const RECENTLY_PUBLISHED_STANDARDS: &str = "recently_published_standards";
    pub const ISO_DELETED_STANDARDS: &str = "iso_deleted_standards";
    pub const DOES_IT_NEED_MORE: &str = "does_it_need_more";
    pub const GITHUB_REPOSITORY: &str = "github_repository";
    pub const FOR_SUPPORT_CONTACT: &str = "for_support_contact";
    pub const ADD_COMMITTEE: &str = "add_committee";
    pub const EDIT_COMMITTEE: &str = "edit_committee";
    pub const REMOVE_COMMITTEE: &str = "remove_committee";
    pub const NO_COMMITTEES: &str = "no_committees";
}

const ENGLISH_DEFAULTS: &[(&str, &str)] = &[
    (keys::APP_TITLE, "WPSG Automation Tool"),
    (keys::FILTER_COMMITTEES, "Filter Committees:"),
    (keys::SCAN_UPDATES, "Scan Updates"),
    (keys::LAST_RUN, "Last Scan:"),
    (keys::LOADING, "Loading..."),
    (keys::VIEW_DATASETS, "View Datasets:"),
    (keys::STANDARDS_UNDER_DEVELOPMENT, "Standards Under Development"),
    (keys::RECENTLY_PUBLISHED_STANDARDS, "Recently Published Standards"),
    (keys::ISO_DELETED_STANDARDS, "ISO Deleted Standards"),
    (keys::DOES_IT_NEED_MORE, "Need More?"),
    (keys::GITHUB_REPOSITORY, "Github Repository"),
    (keys::FOR_SUPPORT_CONTACT, "For support, contact:"),
    (keys::ADD_COMMITTEE, "Add Committee"),
    (keys::EDIT_COMMITTEE, "Edit committee"),
    (keys::REMOVE_COMMITTEE, "Remove committee"),
    (keys::NO_COMMITTEES, "No committees loaded"),
];

pub fn english_default(key: &str) -> Option<&'static str> {
    ENGLISH_DEFAULTS
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, value)| *value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTable {
    language: LanguageCode,
    entries: TranslationMap,
    builtin: bool,
}

impl TranslationTable {
    pub fn new(language: LanguageCode, entries: TranslationMap) -> Self {
        Self {
            language,
            entries,
            builtin: false,
        }
    }

    pub fn builtin_english() -> Self {
        Self {
            language: LanguageCode::english(),
            entries: ENGLISH_DEFAULTS
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            builtin: true,
        }
    }

    pub fn builtin_english_pairs() -> &'static [(&'static str, &'static str)] {
        ENGLISH_DEFAULTS
    }

    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Looks up `key`, falling back to the English default and finally the key itself.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .or_else(|| english_default(key))
            .unwrap_or(key)
    }
}
