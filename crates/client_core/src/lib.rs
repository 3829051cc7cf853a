use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{Filter, LanguageCode},
    protocol::{AppStatus, ConnectionReport, ScanReport, TranslationMap},
};
use url::Url;

pub mod binder;
pub mod busy;
pub mod config;
pub mod controller;
pub mod error;
pub mod local;
pub mod navigation;
pub mod optimistic;
pub mod preferences;
pub mod presentation;
pub mod session;
pub mod transport;
pub mod translations;

pub use binder::{PresentationBinder, UiIntent};
pub use busy::{BusyArbiter, BusyGuard, BusyState};
pub use config::{load_settings, ClientSettings};
pub use controller::{ControllerDependencies, ControllerSettings, StartupReport, SyncController};
pub use error::{OperationKind, SkipReason, SyncError, SyncResult};
pub use local::LocalCommitteeStore;
pub use preferences::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use presentation::{
    CommitTrigger, CommitteeListView, CommitteeRow, InlineEdit, LabelSet, Notice, NoticeLevel,
    ScanControl,
};
pub use session::{CommitteeEntry, CommitteeList, SessionState};
pub use transport::HttpCommitteeStore;
pub use translations::TranslationTable;

/// Remote committee store: the backend of record behind the RPC bridge.
///
/// `Ok(false)` means the backend refused the change; `Err` means the call
/// itself failed. Implementations never retry.
#[async_trait]
pub trait CommitteeStore: Send + Sync {
    async fn list(&self, filter: Filter) -> Result<Vec<String>>;
    async fn add(&self, filter: Filter, name: &str) -> Result<bool>;
    /// Replaces the whole list for `filter`.
    async fn update(&self, filter: Filter, committees: &[String]) -> Result<bool>;
    /// Removes the first committee equal to `name`.
    async fn remove(&self, filter: Filter, name: &str) -> Result<bool>;
    async fn scan(&self) -> Result<ScanReport>;
    async fn language(&self) -> Result<LanguageCode>;
    async fn set_language(&self, language: &LanguageCode) -> Result<bool>;
    async fn translations(&self, language: &LanguageCode) -> Result<TranslationMap>;
    async fn status(&self) -> Result<AppStatus>;
    async fn test_connection(&self) -> Result<ConnectionReport>;
}

#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn fetch_translations(&self, language: &LanguageCode) -> Result<TranslationTable>;
}

#[async_trait]
impl<T> TranslationProvider for T
where
    T: CommitteeStore,
{
    async fn fetch_translations(&self, language: &LanguageCode) -> Result<TranslationTable> {
        let entries = self.translations(language).await?;
        Ok(TranslationTable::new(language.clone(), entries))
    }
}

/// Output side of the presentation binder. Every call carries the complete
/// state for its region; nothing is diffed.
pub trait Renderer: Send + Sync {
    fn render_committees(&self, view: &CommitteeListView);
    fn render_labels(&self, labels: &LabelSet);
    fn render_filter(&self, filter: Filter);
    fn render_scan_control(&self, control: &ScanControl);
    fn render_last_scan(&self, last_update: &str);
    fn open_inline_edit(&self, row: &CommitteeRow);
    fn notify(&self, notice: &Notice);
    fn navigate(&self, url: &Url);
    fn reset_window_size(&self, width: u32, height: u32);
}

pub trait ConfirmationPrompt: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
}

pub struct AlwaysConfirm;

impl ConfirmationPrompt for AlwaysConfirm {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}
