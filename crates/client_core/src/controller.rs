//! Sync controller: serializes user operations through the busy arbiter, applies
//! optimistic edits, and reconciles session state with the committee store.

use std::{future::Future, sync::Arc, time::Duration};

use shared::{
    domain::{CommitteeId, DatasetCategory, Filter, LanguageCode},
    protocol::{AppStatus, ConnectionReport, ScanReport},
};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    busy::{BusyArbiter, BusyGuard, BusyState},
    config::ClientSettings,
    error::{OperationKind, SkipReason, SyncError, SyncResult},
    navigation::{dataset_link, NavigationParams},
    optimistic::{resolve, tentative_apply, Mutation, Resolution},
    presentation::{
        synthesized_committee_name, CommitteeListView, CommitteeRow, LabelSet, Message, Notice,
        NoticeLevel, ScanControl, FALLBACK_LAST_UPDATE, RESET_WINDOW_SIZE,
    },
    session::SessionState,
    translations::{keys, TranslationTable},
    CommitteeStore, ConfirmationPrompt, PreferenceStore, Renderer, TranslationProvider,
};

pub struct ControllerDependencies {
    pub store: Arc<dyn CommitteeStore>,
    pub translations: Arc<dyn TranslationProvider>,
    pub renderer: Arc<dyn Renderer>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub confirmation: Arc<dyn ConfirmationPrompt>,
}

impl ControllerDependencies {
    /// Uses `store` as the translation provider as well.
    pub fn new<S>(
        store: Arc<S>,
        renderer: Arc<dyn Renderer>,
        preferences: Arc<dyn PreferenceStore>,
        confirmation: Arc<dyn ConfirmationPrompt>,
    ) -> Self
    where
        S: CommitteeStore + 'static,
    {
        Self {
            translations: store.clone(),
            store,
            renderer,
            preferences,
            confirmation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub request_timeout: Duration,
    pub scan_timeout: Duration,
    pub viewer_page: Url,
    pub default_language: LanguageCode,
}

impl ControllerSettings {
    pub fn from_client_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        Ok(Self {
            request_timeout: settings.request_timeout(),
            scan_timeout: settings.scan_timeout(),
            viewer_page: settings.viewer_page()?,
            default_language: settings.default_language(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartupReport {
    pub language_loaded: bool,
    pub status_loaded: bool,
    pub committees_loaded: bool,
}

impl StartupReport {
    pub fn is_complete(&self) -> bool {
        self.language_loaded && self.status_loaded && self.committees_loaded
    }
}

/// Restores the scan control when the scan settles, however it settles.
struct ScanControlRestore {
    renderer: Arc<dyn Renderer>,
    label: String,
}

impl Drop for ScanControlRestore {
    fn drop(&mut self) {
        self.renderer.render_scan_control(&ScanControl {
            enabled: true,
            label: std::mem::take(&mut self.label),
        });
    }
}

pub struct SyncController {
    deps: ControllerDependencies,
    settings: ControllerSettings,
    arbiter: BusyArbiter,
    session: RwLock<SessionState>,
}

impl SyncController {
    pub fn new_with_dependencies(
        deps: ControllerDependencies,
        settings: ControllerSettings,
    ) -> Arc<Self> {
        let session = SessionState::new(settings.default_language.clone());
        Arc::new(Self {
            deps,
            settings,
            arbiter: BusyArbiter::new(),
            session: RwLock::new(session),
        })
    }

    pub fn busy_state(&self) -> BusyState {
        self.arbiter.state()
    }

    pub fn is_busy(&self) -> bool {
        self.arbiter.is_busy()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.session.read().await.clone()
    }

    pub async fn view(&self) -> CommitteeListView {
        CommitteeListView::from_session(&*self.session.read().await)
    }

    pub async fn labels(&self) -> LabelSet {
        let session = self.session.read().await;
        LabelSet::project(&session.language, &session.translations)
    }

    /// Startup sequence. Each stage is isolated so one failing subsystem does
    /// not keep the others from initializing.
    pub async fn initialize(&self, query: Option<&str>) -> SyncResult<StartupReport> {
        let _guard = self.acquire(OperationKind::Startup)?;

        let params = NavigationParams::parse(query);
        if params.reset_size {
            let (width, height) = RESET_WINDOW_SIZE;
            self.deps.renderer.reset_window_size(width, height);
        }

        let mut report = StartupReport {
            language_loaded: self.load_language_and_translations().await,
            status_loaded: self.load_status().await,
            committees_loaded: false,
        };

        let filter = self.session.read().await.filter;
        self.deps.renderer.render_filter(filter);
        match self.reload_locked(OperationKind::Startup, filter).await {
            Ok(_) => report.committees_loaded = true,
            Err(err) => self.surface(&err, Message::LoadFailed).await,
        }

        if report.is_complete() {
            info!("committee tracker initialized");
            self.notify_message(NoticeLevel::Success, Message::AppLoaded).await;
        } else {
            warn!(?report, "committee tracker initialized with failures");
        }
        Ok(report)
    }

    /// Fetches `filter` and replaces the cached list wholesale. Selecting a
    /// different filter this way moves the active marker with it.
    pub async fn reload(&self, filter: Filter) -> SyncResult<()> {
        let _guard = self.acquire(OperationKind::Reload)?;
        let selection_changed = {
            let mut session = self.session.write().await;
            std::mem::replace(&mut session.filter, filter) != filter
        };
        if selection_changed {
            self.deps.renderer.render_filter(filter);
        }
        match self.reload_locked(OperationKind::Reload, filter).await {
            Ok(_) => Ok(()),
            Err(err) => self.fail(err, Message::LoadFailed).await,
        }
    }

    pub async fn switch_filter(&self, filter: Filter) -> SyncResult<()> {
        let op = OperationKind::SwitchFilter;
        let _guard = self.acquire(op)?;
        {
            let mut session = self.session.write().await;
            if session.filter == filter {
                return Err(SyncError::skipped(op, SkipReason::SameFilter));
            }
            debug!(from = %session.filter, to = %filter, "switching filter");
            session.filter = filter;
        }
        self.deps.renderer.render_filter(filter);

        // The marker stays switched when the reload fails; the list is then stale.
        match self.reload_locked(op, filter).await {
            Ok(_) => {
                self.notify_message(NoticeLevel::Info, Message::SwitchedFilter(filter))
                    .await;
                Ok(())
            }
            Err(err) => self.fail(err, Message::LoadFailed).await,
        }
    }

    /// Adds a committee with a synthesized default name and opens it for inline edit.
    /// Nothing is applied locally until the reload after a successful add.
    pub async fn add_committee(&self) -> SyncResult<Option<CommitteeId>> {
        let op = OperationKind::AddCommittee;
        let _guard = self.acquire(op)?;
        let (filter, language) = {
            let session = self.session.read().await;
            (session.filter, session.language.clone())
        };
        let name = synthesized_committee_name(filter, &language);
        info!(%filter, name = %name, "adding committee");

        let store = Arc::clone(&self.deps.store);
        if let Err(err) = self
            .confirmed(op, self.settings.request_timeout, store.add(filter, &name))
            .await
        {
            return self.fail(err, Message::AddFailed).await;
        }

        let minted = match self.reload_locked(op, filter).await {
            Ok(minted) => minted,
            Err(err) => return self.fail(err, Message::LoadFailed).await,
        };
        self.notify_message(NoticeLevel::Success, Message::CommitteeAdded)
            .await;

        let row = {
            let session = self.session.read().await;
            let entry = session
                .committees
                .entries()
                .iter()
                .find(|entry| entry.name == name && minted.contains(&entry.id))
                .or_else(|| session.committees.first_named(&name));
            entry.and_then(|entry| {
                CommitteeListView::from_session(&session)
                    .row_by_id(entry.id)
                    .cloned()
            })
        };
        match row {
            Some(row) => {
                self.deps.renderer.open_inline_edit(&row);
                Ok(Some(row.id))
            }
            None => {
                warn!(name = %name, "added committee missing from reloaded list");
                Ok(None)
            }
        }
    }

    /// Optimistic rename: apply locally, commit the whole list, revert the one
    /// entry if the store refuses or fails.
    pub async fn edit_committee(&self, id: CommitteeId, new_name: &str) -> SyncResult<()> {
        let op = OperationKind::EditCommittee;
        let _guard = self.acquire(op)?;
        let mutation = Mutation::Rename {
            id,
            name: new_name.to_string(),
        };

        let prepared = {
            let mut session = self.session.write().await;
            Self::ensure_current(&session, op).and_then(|()| {
                let (next, pending) = tentative_apply(&session.committees, &mutation)
                    .map_err(|reason| SyncError::skipped(op, reason))?;
                session.committees = next;
                Ok((session.filter, session.committees.names(), pending))
            })
        };
        let (filter, names, pending) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => return self.fail(err, Message::UpdateFailed).await,
        };
        self.render_committees().await;
        debug!(%filter, index = pending.index, from = %pending.previous_name, to = %pending.applied_name, "tentative rename applied");

        let store = Arc::clone(&self.deps.store);
        let outcome = self
            .confirmed(op, self.settings.request_timeout, store.update(filter, &names))
            .await;
        let resolution = if outcome.is_ok() {
            Resolution::Committed
        } else {
            Resolution::RolledBack
        };
        {
            let mut session = self.session.write().await;
            session.committees = resolve(&session.committees, &pending, resolution);
        }
        self.render_committees().await;

        match outcome {
            Ok(()) => {
                info!(%filter, index = pending.index, "committee rename committed");
                self.notify_message(NoticeLevel::Success, Message::CommitteeUpdated)
                    .await;
                Ok(())
            }
            Err(err) => {
                warn!(%filter, index = pending.index, "committee rename rolled back");
                self.fail(err, Message::UpdateFailed).await
            }
        }
    }

    pub async fn edit_committee_at(&self, index: usize, new_name: &str) -> SyncResult<()> {
        let id = self.id_at(OperationKind::EditCommittee, index).await?;
        self.edit_committee(id, new_name).await
    }

    /// Removes by value after confirmation, then resynchronizes from the store.
    pub async fn delete_committee(&self, id: CommitteeId) -> SyncResult<()> {
        let op = OperationKind::DeleteCommittee;
        let _guard = self.acquire(op)?;

        let target = {
            let session = self.session.read().await;
            Self::ensure_current(&session, op).and_then(|()| {
                session
                    .committees
                    .get(id)
                    .map(|entry| (session.filter, entry.name.clone(), session.language.clone()))
                    .ok_or(SyncError::skipped(op, SkipReason::UnknownCommittee))
            })
        };
        let (filter, name, language) = match target {
            Ok(target) => target,
            Err(err) => return self.fail(err, Message::RemoveFailed).await,
        };

        if !self
            .deps
            .confirmation
            .confirm(&Message::ConfirmRemoval(&name).text(&language))
        {
            debug!(name = %name, "removal declined");
            return Err(SyncError::skipped(op, SkipReason::Declined));
        }

        info!(%filter, name = %name, "removing committee");
        let store = Arc::clone(&self.deps.store);
        if let Err(err) = self
            .confirmed(op, self.settings.request_timeout, store.remove(filter, &name))
            .await
        {
            return self.fail(err, Message::RemoveFailed).await;
        }

        match self.reload_locked(op, filter).await {
            Ok(_) => {
                self.notify_message(NoticeLevel::Success, Message::CommitteeRemoved)
                    .await;
                Ok(())
            }
            Err(err) => self.fail(err, Message::LoadFailed).await,
        }
    }

    pub async fn delete_committee_at(&self, index: usize) -> SyncResult<()> {
        let id = self.id_at(OperationKind::DeleteCommittee, index).await?;
        self.delete_committee(id).await
    }

    /// Switches language on the backend, then locally. Nothing changes locally
    /// unless both the switch and the new translation table succeed.
    pub async fn switch_language(&self, language: LanguageCode) -> SyncResult<()> {
        let op = OperationKind::SwitchLanguage;
        let _guard = self.acquire(op)?;
        let previous = {
            let session = self.session.read().await;
            if session.language == language {
                return Err(SyncError::skipped(op, SkipReason::SameLanguage));
            }
            session.language.clone()
        };

        let store = Arc::clone(&self.deps.store);
        if let Err(err) = self
            .confirmed(op, self.settings.request_timeout, store.set_language(&language))
            .await
        {
            return self.fail(err, Message::LanguageChangeFailed).await;
        }

        let provider = Arc::clone(&self.deps.translations);
        let table = match self
            .remote(
                op,
                self.settings.request_timeout,
                provider.fetch_translations(&language),
            )
            .await
        {
            Ok(table) => table,
            Err(err) => {
                if let Err(restore) = self
                    .remote(
                        op,
                        self.settings.request_timeout,
                        store.set_language(&previous),
                    )
                    .await
                {
                    error!(error = %restore, language = %previous, "failed to restore backend language");
                }
                return self.fail(err, Message::LanguageChangeFailed).await;
            }
        };

        {
            let mut session = self.session.write().await;
            session.language = language.clone();
            session.translations = table;
        }
        if let Err(err) = self.deps.preferences.save_language(&language) {
            warn!(error = %err, language = %language, "failed to persist language preference");
        }
        info!(language = %language, "language switched");

        self.render_all_text().await;
        self.notify_message(NoticeLevel::Success, Message::LanguageChanged)
            .await;
        Ok(())
    }

    pub async fn perform_scan(&self) -> SyncResult<ScanReport> {
        let op = OperationKind::Scan;
        let _guard = self.acquire(op)?;
        let (busy_label, idle_label) = {
            let session = self.session.read().await;
            (
                session.translations.text(keys::LOADING).to_string(),
                session.translations.text(keys::SCAN_UPDATES).to_string(),
            )
        };
        self.deps.renderer.render_scan_control(&ScanControl {
            enabled: false,
            label: busy_label,
        });
        // Dropped before `_guard`, so the control is restored before the arbiter frees.
        let _restore = ScanControlRestore {
            renderer: Arc::clone(&self.deps.renderer),
            label: idle_label,
        };

        info!("starting scan");
        let store = Arc::clone(&self.deps.store);
        let report = match self.remote(op, self.settings.scan_timeout, store.scan()).await {
            Ok(report) => report,
            Err(err) => return self.fail(err, Message::ScanFailed).await,
        };
        if !report.success {
            let message = Some(report.message.clone()).filter(|m| !m.trim().is_empty());
            return self
                .fail(
                    SyncError::OperationRejected {
                        operation: op,
                        message,
                    },
                    Message::ScanFailed,
                )
                .await;
        }

        let text = if report.message.trim().is_empty() {
            Message::ScanCompleted.text(&self.session.read().await.language)
        } else {
            report.message.clone()
        };
        self.deps.renderer.notify(&Notice::success(text));

        match self
            .remote(
                OperationKind::Status,
                self.settings.request_timeout,
                store.status(),
            )
            .await
        {
            Ok(status) => {
                self.session.write().await.last_scan = Some(status.last_update.clone());
                self.deps.renderer.render_last_scan(&status.last_update);
            }
            Err(err) => error!(error = %err, "failed to refresh last scan date"),
        }
        Ok(report)
    }

    /// Viewer handoff for a dataset link. Not gated: navigation leaves the page.
    pub async fn open_dataset(&self, category: DatasetCategory) -> Option<Url> {
        let language = self.session.read().await.language.clone();
        match dataset_link(&self.settings.viewer_page, category, &language) {
            Some(url) => {
                info!(%url, "navigating to dataset viewer");
                self.deps.renderer.navigate(&url);
                Some(url)
            }
            None => {
                self.deps
                    .renderer
                    .notify(&Notice::info(Message::NeedMoreDatasets.text(&language)));
                None
            }
        }
    }

    /// Backend status; refreshes the cached last scan date.
    pub async fn status(&self) -> SyncResult<AppStatus> {
        let store = Arc::clone(&self.deps.store);
        let status = self
            .remote(
                OperationKind::Status,
                self.settings.request_timeout,
                store.status(),
            )
            .await?;
        self.session.write().await.last_scan = Some(status.last_update.clone());
        self.deps.renderer.render_last_scan(&status.last_update);
        Ok(status)
    }

    pub async fn test_connection(&self) -> SyncResult<ConnectionReport> {
        let op = OperationKind::Status;
        let store = Arc::clone(&self.deps.store);
        match self
            .remote(op, self.settings.request_timeout, store.test_connection())
            .await
        {
            Ok(report) if report.success => {
                self.notify_message(NoticeLevel::Success, Message::ConnectionOk)
                    .await;
                Ok(report)
            }
            Ok(report) => self
                .fail(
                    SyncError::OperationRejected {
                        operation: op,
                        message: Some(report.message),
                    },
                    Message::ConnectionFailed,
                )
                .await,
            Err(err) => self.fail(err, Message::ConnectionFailed).await,
        }
    }

    fn acquire(&self, kind: OperationKind) -> SyncResult<BusyGuard> {
        self.arbiter.try_acquire(kind).map_err(|holder| {
            debug!(operation = %kind, holder = %holder, "ignored while busy");
            SyncError::skipped(kind, SkipReason::Busy(holder))
        })
    }

    fn ensure_current(session: &SessionState, op: OperationKind) -> SyncResult<()> {
        if session.is_list_current() {
            Ok(())
        } else {
            Err(SyncError::StaleList {
                operation: op,
                shown: session.list_filter,
                selected: session.filter,
            })
        }
    }

    async fn id_at(&self, op: OperationKind, index: usize) -> SyncResult<CommitteeId> {
        if let BusyState::Busy(holder) = self.arbiter.state() {
            return Err(SyncError::skipped(op, SkipReason::Busy(holder)));
        }
        self.session
            .read()
            .await
            .committees
            .at(index)
            .map(|entry| entry.id)
            .ok_or(SyncError::skipped(op, SkipReason::UnknownCommittee))
    }

    /// Caller must hold the arbiter.
    async fn reload_locked(
        &self,
        op: OperationKind,
        filter: Filter,
    ) -> SyncResult<Vec<CommitteeId>> {
        let store = Arc::clone(&self.deps.store);
        let names = self
            .remote(op, self.settings.request_timeout, store.list(filter))
            .await?;
        let count = names.len();
        let minted = self
            .session
            .write()
            .await
            .replace_committees(filter, names);
        info!(%filter, count, "committees reloaded");
        self.render_committees().await;
        Ok(minted)
    }

    async fn load_language_and_translations(&self) -> bool {
        let op = OperationKind::Startup;
        let stored = match self.deps.preferences.load_language() {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "failed to read language preference");
                None
            }
        };
        let language = match stored {
            Some(language) => Ok(language),
            None => {
                let store = Arc::clone(&self.deps.store);
                self.remote(op, self.settings.request_timeout, store.language())
                    .await
            }
        };

        let provider = Arc::clone(&self.deps.translations);
        let loaded = match language {
            Ok(language) => self
                .remote(
                    op,
                    self.settings.request_timeout,
                    provider.fetch_translations(&language),
                )
                .await
                .map(|table| (language, table)),
            Err(err) => Err(err),
        };

        let ok = loaded.is_ok();
        let (language, table) = loaded.unwrap_or_else(|err| {
            warn!(error = %err, "falling back to built-in English translations");
            (LanguageCode::english(), TranslationTable::builtin_english())
        });
        {
            let mut session = self.session.write().await;
            session.language = language;
            session.translations = table;
        }
        self.render_all_text().await;
        ok
    }

    async fn load_status(&self) -> bool {
        let store = Arc::clone(&self.deps.store);
        let status = match self
            .remote(
                OperationKind::Status,
                self.settings.request_timeout,
                store.status(),
            )
            .await
        {
            Ok(status) => status,
            Err(err) => {
                warn!(error = %err, "failed to load app status");
                self.deps.renderer.render_last_scan(FALLBACK_LAST_UPDATE);
                return false;
            }
        };

        self.session.write().await.last_scan = Some(status.last_update.clone());
        self.deps.renderer.render_last_scan(&status.last_update);

        let current = self.session.read().await.language.clone();
        if status.language != current {
            info!(from = %current, to = %status.language, "adopting backend language");
            let provider = Arc::clone(&self.deps.translations);
            let table = match self
                .remote(
                    OperationKind::Status,
                    self.settings.request_timeout,
                    provider.fetch_translations(&status.language),
                )
                .await
            {
                Ok(table) => table,
                Err(err) => {
                    warn!(error = %err, "keeping current translations");
                    return false;
                }
            };
            {
                let mut session = self.session.write().await;
                session.language = status.language.clone();
                session.translations = table;
            }
            if let Err(err) = self.deps.preferences.save_language(&status.language) {
                warn!(error = %err, "failed to persist language preference");
            }
            self.render_all_text().await;
        }
        true
    }

    async fn remote<T>(
        &self,
        op: OperationKind,
        timeout: Duration,
        call: impl Future<Output = anyhow::Result<T>>,
    ) -> SyncResult<T> {
        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                let err = SyncError::remote(op, &err);
                warn!(operation = %op, error = %err, "remote call failed");
                Err(err)
            }
            Err(_) => {
                warn!(operation = %op, ?timeout, "remote call timed out");
                Err(SyncError::TimedOut {
                    operation: op,
                    after: timeout,
                })
            }
        }
    }

    /// Remote call whose `false` result means the backend refused.
    async fn confirmed(
        &self,
        op: OperationKind,
        timeout: Duration,
        call: impl Future<Output = anyhow::Result<bool>>,
    ) -> SyncResult<()> {
        if self.remote(op, timeout, call).await? {
            Ok(())
        } else {
            warn!(operation = %op, "backend refused operation");
            Err(SyncError::rejected(op))
        }
    }

    async fn fail<T>(&self, err: SyncError, failure: Message<'_>) -> SyncResult<T> {
        self.surface(&err, failure).await;
        Err(err)
    }

    async fn surface(&self, err: &SyncError, failure: Message<'_>) {
        if !err.is_user_visible() {
            return;
        }
        let language = self.session.read().await.language.clone();
        let base = failure.text(&language);
        let text = match err {
            SyncError::OperationRejected {
                message: Some(message),
                ..
            } => message.clone(),
            SyncError::OperationRejected { message: None, .. } => base,
            other => format!("{base}: {other}"),
        };
        self.deps.renderer.notify(&Notice::error(text));
    }

    async fn notify_message(&self, level: NoticeLevel, message: Message<'_>) {
        let text = message.text(&self.session.read().await.language);
        self.deps.renderer.notify(&Notice { level, text });
    }

    async fn render_committees(&self) {
        let view = self.view().await;
        self.deps.renderer.render_committees(&view);
    }

    async fn render_all_text(&self) {
        let (labels, view) = {
            let session = self.session.read().await;
            (
                LabelSet::project(&session.language, &session.translations),
                CommitteeListView::from_session(&session),
            )
        };
        self.deps.renderer.render_labels(&labels);
        self.deps.renderer.render_scan_control(&ScanControl {
            enabled: self.arbiter.state() != BusyState::Busy(OperationKind::Scan),
            label: labels.scan_button.clone(),
        });
        self.deps.renderer.render_committees(&view);
    }

    /// Row for `id` in the current projection.
    pub async fn row(&self, id: CommitteeId) -> Option<CommitteeRow> {
        self.view().await.row_by_id(id).cloned()
    }

    /// Swaps the row at `index` into edit mode. Nothing is sent until the edit commits.
    pub async fn open_inline_edit(&self, index: usize) -> Option<CommitteeRow> {
        let row = self.view().await.row(index).cloned()?;
        self.deps.renderer.open_inline_edit(&row);
        Some(row)
    }

    /// Re-renders the committee list from session state.
    pub async fn refresh_view(&self) {
        self.render_committees().await;
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
