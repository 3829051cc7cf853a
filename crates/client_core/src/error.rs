use std::{fmt, time::Duration};

use shared::domain::Filter;
use thiserror::Error;

/// Controller operations, used for busy-state tagging and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Startup,
    Reload,
    SwitchFilter,
    AddCommittee,
    EditCommittee,
    DeleteCommittee,
    SwitchLanguage,
    Scan,
    Status,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Startup => "startup",
            OperationKind::Reload => "reload",
            OperationKind::SwitchFilter => "switch_filter",
            OperationKind::AddCommittee => "add_committee",
            OperationKind::EditCommittee => "edit_committee",
            OperationKind::DeleteCommittee => "delete_committee",
            OperationKind::SwitchLanguage => "switch_language",
            OperationKind::Scan => "scan",
            OperationKind::Status => "status",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local reasons an operation did nothing. Never shown to the user as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Busy(OperationKind),
    SameFilter,
    SameLanguage,
    EmptyName,
    UnchangedName,
    UnknownCommittee,
    Declined,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Busy(kind) => write!(f, "busy with {kind}"),
            SkipReason::SameFilter => f.write_str("filter already active"),
            SkipReason::SameLanguage => f.write_str("language already active"),
            SkipReason::EmptyName => f.write_str("name is empty"),
            SkipReason::UnchangedName => f.write_str("name unchanged"),
            SkipReason::UnknownCommittee => f.write_str("committee not in current list"),
            SkipReason::Declined => f.write_str("removal not confirmed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{operation} failed: backend unavailable: {reason}")]
    RemoteUnavailable {
        operation: OperationKind,
        reason: String,
    },
    #[error("{operation} timed out after {after:?}")]
    TimedOut {
        operation: OperationKind,
        after: Duration,
    },
    #[error("{operation} rejected by backend{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    OperationRejected {
        operation: OperationKind,
        message: Option<String>,
    },
    #[error("{operation} refused: list shows {shown:?} but {selected} is selected; reload first")]
    StaleList {
        operation: OperationKind,
        shown: Option<Filter>,
        selected: Filter,
    },
    #[error("{operation} skipped: {reason}")]
    ValidationSkipped {
        operation: OperationKind,
        reason: SkipReason,
    },
}

impl SyncError {
    pub fn remote(operation: OperationKind, err: &anyhow::Error) -> Self {
        SyncError::RemoteUnavailable {
            operation,
            reason: format!("{err:#}"),
        }
    }

    pub fn rejected(operation: OperationKind) -> Self {
        SyncError::OperationRejected {
            operation,
            message: None,
        }
    }

    pub fn skipped(operation: OperationKind, reason: SkipReason) -> Self {
        SyncError::ValidationSkipped { operation, reason }
    }

    pub fn operation(&self) -> OperationKind {
        match self {
            SyncError::RemoteUnavailable { operation, .. }
            | SyncError::TimedOut { operation, .. }
            | SyncError::OperationRejected { operation, .. }
            | SyncError::StaleList { operation, .. }
            | SyncError::ValidationSkipped { operation, .. } => *operation,
        }
    }

    /// Timeouts count as the backend being unreachable.
    pub fn is_remote_unavailable(&self) -> bool {
        matches!(
            self,
            SyncError::RemoteUnavailable { .. } | SyncError::TimedOut { .. }
        )
    }

    pub fn is_user_visible(&self) -> bool {
        !matches!(self, SyncError::ValidationSkipped { .. })
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            SyncError::ValidationSkipped { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;
