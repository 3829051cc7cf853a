use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Filter, LanguageCode};

pub type TranslationMap = BTreeMap<String, String>;

/// Named procedures exposed by the backend bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "procedure", content = "args", rename_all = "snake_case")]
pub enum BridgeRequest {
    GetCommittees {
        organization: Filter,
    },
    AddCommittee {
        organization: Filter,
        committee: String,
    },
    UpdateCommittees {
        organization: Filter,
        committees: Vec<String>,
    },
    RemoveCommittee {
        organization: Filter,
        committee: String,
    },
    PerformScan,
    GetLanguage,
    SetLanguage {
        language: LanguageCode,
    },
    GetTranslations {
        language: LanguageCode,
    },
    GetAppStatus,
    TestConnection,
}

impl BridgeRequest {
    pub fn procedure(&self) -> &'static str {
        match self {
            BridgeRequest::GetCommittees { .. } => "get_committees",
            BridgeRequest::AddCommittee { .. } => "add_committee",
            BridgeRequest::UpdateCommittees { .. } => "update_committees",
            BridgeRequest::RemoveCommittee { .. } => "remove_committee",
            BridgeRequest::PerformScan => "perform_scan",
            BridgeRequest::GetLanguage => "get_language",
            BridgeRequest::SetLanguage { .. } => "set_language",
            BridgeRequest::GetTranslations { .. } => "get_translations",
            BridgeRequest::GetAppStatus => "get_app_status",
            BridgeRequest::TestConnection => "test_connection",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanReport {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes_found: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl ScanReport {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            last_update: None,
            changes_found: None,
            duration: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppStatus {
    pub last_update: String,
    pub language: LanguageCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_committees: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionReport {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
