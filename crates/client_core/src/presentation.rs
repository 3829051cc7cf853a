//! Render model projected from session state, plus localized notices and inline edit sessions.

use shared::domain::{CommitteeId, Filter, LanguageCode};

use crate::{
    session::{CommitteeList, SessionState},
    translations::{keys, TranslationTable},
};

pub const RESET_WINDOW_SIZE: (u32, u32) = (930, 650);
pub const FALLBACK_LAST_UPDATE: &str = "07 September 2025";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitteeRow {
    pub index: usize,
    pub id: CommitteeId,
    pub name: String,
    pub edit_title: String,
    pub remove_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitteeListView {
    pub filter: Filter,
    pub rows: Vec<CommitteeRow>,
    /// Shown instead of rows when the list is empty.
    pub placeholder: Option<String>,
}

impl CommitteeListView {
    pub fn project(filter: Filter, list: &CommitteeList, table: &TranslationTable) -> Self {
        let edit_title = table.text(keys::EDIT_COMMITTEE).to_string();
        let remove_title = table.text(keys::REMOVE_COMMITTEE).to_string();
        let rows: Vec<CommitteeRow> = list
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| CommitteeRow {
                index,
                id: entry.id,
                name: entry.name.clone(),
                edit_title: edit_title.clone(),
                remove_title: remove_title.clone(),
            })
            .collect();
        let placeholder = rows
            .is_empty()
            .then(|| table.text(keys::NO_COMMITTEES).to_string());
        Self {
            filter,
            rows,
            placeholder,
        }
    }

    pub fn from_session(session: &SessionState) -> Self {
        Self::project(session.filter, &session.committees, &session.translations)
    }

    pub fn row(&self, index: usize) -> Option<&CommitteeRow> {
        self.rows.get(index)
    }

    pub fn row_by_id(&self, id: CommitteeId) -> Option<&CommitteeRow> {
        self.rows.iter().find(|row| row.id == id)
    }
}

/// Every translated text bound in the main page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    pub language: LanguageCode,
    pub page_title: String,
    pub subtitle: String,
    pub filter_header: String,
    pub scan_button: String,
    pub last_run: String,
    pub view_datasets: String,
    pub under_development: String,
    pub recently_published: String,
    pub iso_deleted: String,
    pub need_more: String,
    pub github: String,
    pub support: String,
    pub loading: String,
    pub add_committee: String,
}

impl LabelSet {
    pub fn project(language: &LanguageCode, table: &TranslationTable) -> Self {
        let text = |key: &str| table.text(key).to_string();
        Self {
            language: language.clone(),
            page_title: text(keys::APP_TITLE),
            subtitle: if language.is_dutch() {
                "Automatiseringstool".to_string()
            } else {
                "Automation Tool".to_string()
            },
            filter_header: text(keys::FILTER_COMMITTEES),
            scan_button: text(keys::SCAN_UPDATES),
            last_run: text(keys::LAST_RUN),
            view_datasets: text(keys::VIEW_DATASETS),
            under_development: text(keys::STANDARDS_UNDER_DEVELOPMENT),
            recently_published: text(keys::RECENTLY_PUBLISHED_STANDARDS),
            iso_deleted: text(keys::ISO_DELETED_STANDARDS),
            need_more: text(keys::DOES_IT_NEED_MORE),
            github: text(keys::GITHUB_REPOSITORY),
            support: text(keys::FOR_SUPPORT_CONTACT),
            loading: text(keys::LOADING),
            add_committee: text(keys::ADD_COMMITTEE),
        }
    }

    pub fn is_active(&self, language: &str) -> bool {
        self.language.as_str() == language
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanControl {
    pub enabled: bool,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Controller messages in the active language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<'a> {
    CommitteeUpdated,
    UpdateFailed,
    CommitteeRemoved,
    RemoveFailed,
    CommitteeAdded,
    AddFailed,
    SwitchedFilter(Filter),
    LanguageChanged,
    LanguageChangeFailed,
    ConfirmRemoval(&'a str),
    NeedMoreDatasets,
    ScanCompleted,
    ScanFailed,
    AppLoaded,
    LoadFailed,
    ConnectionOk,
    ConnectionFailed,
}

impl Message<'_> {
    pub fn text(self, language: &LanguageCode) -> String {
        let nl = language.is_dutch();
        match self {
            Message::CommitteeUpdated if nl => "Commissie succesvol bijgewerkt".into(),
            Message::CommitteeUpdated => "Committee updated successfully".into(),
            Message::UpdateFailed if nl => "Bijwerken commissie mislukt".into(),
            Message::UpdateFailed => "Failed to update committee".into(),
            Message::CommitteeRemoved if nl => "Commissie succesvol verwijderd".into(),
            Message::CommitteeRemoved => "Committee removed successfully".into(),
            Message::RemoveFailed if nl => "Verwijderen commissie mislukt".into(),
            Message::RemoveFailed => "Failed to remove committee".into(),
            Message::CommitteeAdded if nl => "Commissie succesvol toegevoegd".into(),
            Message::CommitteeAdded => "Committee added successfully".into(),
            Message::AddFailed if nl => "Toevoegen commissie mislukt".into(),
            Message::AddFailed => "Failed to add committee".into(),
            Message::SwitchedFilter(filter) if nl => format!("Omgeschakeld naar {filter} commissies"),
            Message::SwitchedFilter(filter) => format!("Switched to {filter} committees"),
            Message::LanguageChanged if nl => "Taal gewijzigd naar Nederlands".into(),
            Message::LanguageChanged => "Language changed to English".into(),
            Message::LanguageChangeFailed => "Failed to change language".into(),
            Message::ConfirmRemoval(name) if nl => {
                format!("Weet u zeker dat u \"{name}\" wilt verwijderen?")
            }
            Message::ConfirmRemoval(name) => format!("Are you sure you want to remove \"{name}\"?"),
            Message::NeedMoreDatasets if nl => {
                "Aanvullende datasets kunnen worden geconfigureerd in de instellingen.".into()
            }
            Message::NeedMoreDatasets => "Additional datasets can be configured in the settings.".into(),
            Message::ScanCompleted => "Scan completed successfully".into(),
            Message::ScanFailed => "Scan failed with unknown error".into(),
            Message::AppLoaded => "Application loaded successfully".into(),
            Message::LoadFailed if nl => "Laden commissies mislukt".into(),
            Message::LoadFailed => "Failed to load committees".into(),
            Message::ConnectionOk => "Connection test successful".into(),
            Message::ConnectionFailed => "Connection test failed".into(),
        }
    }
}

/// Default name for a freshly added committee.
pub fn synthesized_committee_name(filter: Filter, language: &LanguageCode) -> String {
    if language.is_dutch() {
        format!("Nieuwe {filter} Commissie")
    } else {
        format!("New {filter} Committee")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTrigger {
    ConfirmKey,
    FocusLost,
}

/// Text-field swap over one row. Only the first commit produces an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineEdit {
    id: CommitteeId,
    original: String,
    settled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub id: CommitteeId,
    pub name: String,
}

impl InlineEdit {
    pub fn open(row: &CommitteeRow) -> Self {
        Self {
            id: row.id,
            original: row.name.clone(),
            settled: false,
        }
    }

    pub fn id(&self) -> CommitteeId {
        self.id
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Settles the session. Returns an edit only for the first trigger and only
    /// when the trimmed value is non-empty and differs from the original.
    pub fn commit(&mut self, value: &str, trigger: CommitTrigger) -> Option<EditRequest> {
        if self.settled {
            tracing::trace!(id = %self.id, ?trigger, "inline edit already settled");
            return None;
        }
        self.settled = true;
        let value = value.trim();
        (!value.is_empty() && value != self.original).then(|| EditRequest {
            id: self.id,
            name: value.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "tests/presentation_tests.rs"]
mod tests;
