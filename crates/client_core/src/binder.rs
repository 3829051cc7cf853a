//! Routes user intents from the page into controller operations and owns the
//! single inline edit session.

use std::sync::Arc;

use shared::domain::{DatasetCategory, Filter, LanguageCode};
use tokio::sync::Mutex;

use crate::{
    error::{SyncError, SyncResult},
    presentation::{CommitTrigger, InlineEdit},
    SyncController,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiIntent {
    Startup { query: Option<String> },
    SelectFilter(Filter),
    SelectLanguage(LanguageCode),
    AddCommittee,
    EditIcon { index: usize },
    DoubleClick { index: usize },
    CommitEdit { value: String, trigger: CommitTrigger },
    CancelEdit,
    RemoveCommittee { index: usize },
    Scan,
    OpenDataset(DatasetCategory),
}

impl UiIntent {
    pub fn name(&self) -> &'static str {
        match self {
            UiIntent::Startup { .. } => "startup",
            UiIntent::SelectFilter(_) => "select_filter",
            UiIntent::SelectLanguage(_) => "select_language",
            UiIntent::AddCommittee => "add_committee",
            UiIntent::EditIcon { .. } => "edit_icon",
            UiIntent::DoubleClick { .. } => "double_click",
            UiIntent::CommitEdit { .. } => "commit_edit",
            UiIntent::CancelEdit => "cancel_edit",
            UiIntent::RemoveCommittee { .. } => "remove_committee",
            UiIntent::Scan => "scan",
            UiIntent::OpenDataset(_) => "open_dataset",
        }
    }
}

pub struct PresentationBinder {
    controller: Arc<SyncController>,
    editing: Mutex<Option<InlineEdit>>,
}

impl PresentationBinder {
    pub fn new(controller: Arc<SyncController>) -> Self {
        Self {
            controller,
            editing: Mutex::new(None),
        }
    }

    pub fn controller(&self) -> &Arc<SyncController> {
        &self.controller
    }

    pub async fn editing(&self) -> Option<InlineEdit> {
        self.editing.lock().await.clone()
    }

    pub async fn dispatch(&self, intent: UiIntent) -> SyncResult<()> {
        tracing::debug!(intent = intent.name(), "dispatching ui intent");
        match intent {
            UiIntent::Startup { query } => self
                .controller
                .initialize(query.as_deref())
                .await
                .map(|_| ()),
            UiIntent::SelectFilter(filter) => self.controller.switch_filter(filter).await,
            UiIntent::SelectLanguage(language) => self.controller.switch_language(language).await,
            UiIntent::AddCommittee => {
                let added = self.controller.add_committee().await?;
                if let Some(id) = added {
                    if let Some(row) = self.controller.row(id).await {
                        *self.editing.lock().await = Some(InlineEdit::open(&row));
                    }
                }
                Ok(())
            }
            UiIntent::EditIcon { index } | UiIntent::DoubleClick { index } => {
                if let Some(row) = self.controller.open_inline_edit(index).await {
                    // A newer session replaces an unsettled one without committing it.
                    *self.editing.lock().await = Some(InlineEdit::open(&row));
                }
                Ok(())
            }
            UiIntent::CommitEdit { value, trigger } => {
                let request = {
                    let mut editing = self.editing.lock().await;
                    match editing.as_mut() {
                        Some(session) if !session.is_settled() => {
                            let request = session.commit(&value, trigger);
                            *editing = None;
                            request
                        }
                        _ => return Ok(()),
                    }
                };
                match request {
                    Some(request) => {
                        let result = self
                            .controller
                            .edit_committee(request.id, &request.name)
                            .await;
                        // Skipped and stale edits return before any render; swap the field back.
                        if let Err(err) = &result {
                            if err.skip_reason().is_some()
                                || matches!(err, SyncError::StaleList { .. })
                            {
                                self.controller.refresh_view().await;
                            }
                        }
                        result
                    }
                    None => {
                        self.controller.refresh_view().await;
                        Ok(())
                    }
                }
            }
            UiIntent::CancelEdit => {
                if self.editing.lock().await.take().is_some() {
                    self.controller.refresh_view().await;
                }
                Ok(())
            }
            UiIntent::RemoveCommittee { index } => self.controller.delete_committee_at(index).await,
            UiIntent::Scan => self.controller.perform_scan().await.map(|_| ()),
            UiIntent::OpenDataset(category) => {
                self.controller.open_dataset(category).await;
                Ok(())
            }
        }
    }
}
