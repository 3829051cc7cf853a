//! In-process backend of record, used when no bridge server is running.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use shared::{
    domain::{Filter, LanguageCode},
    protocol::{AppStatus, ConnectionReport, ScanReport, TranslationMap},
};
use tokio::sync::Mutex;

use crate::{translations::keys, CommitteeStore};

const VERSION: &str = "1.0.0";
const SCAN_INTERVAL_DAYS: u32 = 30;
const INITIAL_LAST_UPDATE: &str = "23 August 2025";

const DEFAULT_CEN: &[&str] = &[
    "CEN/CLC/JTC 3", "CEN/CLC/JTC 10", "CEN/TC 102", "CEN/TC 132", "CEN/TC 145",
    "CEN/TC 146", "CEN/TC 172/WG2", "CEN/TC 172/WG3", "CEN/TC 172", "CEN 175/WG 34",
    "CEN/TC 193/WG3", "CEN/TC 193", "CEN/TC 194", "CEN/TC 198", "CEN/TC 225",
    "CEN/TC 249/WG 11", "CEN/TC 249/WG 24", "CEN/TC 249/WG 9", "CEN/TC 249",
    "CEN/TC 261/SC 4/WG 2", "CEN/TC 261/SC4/WG3", "CEN/TC 261/SC4/WG6", "CEN/TC 261/SC4/WG7",
    "CEN/TC 261/SC4/WG8", "CEN/TC 261/SC4", "CEN/TC 261/SC5/WG14", "CEN/TC 261/SC5/WG16",
    "CEN/TC 261/SC5/WG21", "CEN/TC 261/SC5/WG25", "CEN/TC 261/SC5/WG26", "CEN/TC 261/SC5/WG27",
    "CEN/TC 261/SC5/WG34", "CEN/TC 261/SC5", "CEN/TC 261/WG1", "CEN/TC 261",
    "CEN/TC 411", "CEN/TC 413", "CEN/TC 459/SC9", "CEN/TC 473", "CEN/TC 52",
    "CEN/WS 086", "CEN/WS 096", "CEN/WS COVR", "CEN/WS CircThread",
];

const DEFAULT_ISO: &[&str] = &[
    "ISO TMBG", "ISO/CASCO", "ISO/COPOLCO", "ISO/IEC JTC 1/SC 31", "ISO/TC 122/SC 3",
    "ISO/TC 122/SC 4", "ISO/TC 122", "ISO/TC 130", "ISO/TC 159/SC 4", "ISO/TC 166",
    "ISO/TC 17/SC 9", "ISO/TC 198", "ISO/TC 207/SC 3", "ISO/TC 210", "ISO/TC 215",
    "ISO/TC 217", "ISO/TC 229", "ISO/TC 287", "ISO/TC 299", "ISO/TC 313",
    "ISO/TC314", "ISO/TC 323", "ISO/TC 34/SC 12", "ISO/TC 34/SC 17", "ISO/TC 42",
    "ISO/TC 51", "ISO TC/52", "ISO/TC 6/SC 2", "ISO/TC 6", "ISO/TC 61/SC 11",
    "ISO/TC 61/SC 14", "ISO/TC 61/SC 9", "ISO/TC 63", "ISO/TC 76", "ISO/TC 84", "ISO/TC 87",
];

const DUTCH: &[(&str, &str)] = &[
    (keys::APP_TITLE, "WPSG Automatiseringstool"),
    (keys::FILTER_COMMITTEES, "Filter Commissies:"),
    (keys::SCAN_UPDATES, "Updates Scannen"),
    (keys::LAST_RUN, "Laatste Scan:"),
    (keys::LOADING, "Laden..."),
    (keys::VIEW_DATASETS, "Bekijk Datasets:"),
    (keys::STANDARDS_UNDER_DEVELOPMENT, "Normen in Ontwikkeling"),
    (keys::RECENTLY_PUBLISHED_STANDARDS, "Recent Gepubliceerde Normen"),
    (keys::ISO_DELETED_STANDARDS, "ISO Verwijderde Normen"),
    (keys::DOES_IT_NEED_MORE, "Meer Nodig?"),
    (keys::GITHUB_REPOSITORY, "Github Repository"),
    (keys::FOR_SUPPORT_CONTACT, "Voor ondersteuning, neem contact op:"),
    (keys::ADD_COMMITTEE, "Commissie Toevoegen"),
    (keys::EDIT_COMMITTEE, "Commissie bewerken"),
    (keys::REMOVE_COMMITTEE, "Commissie verwijderen"),
    (keys::NO_COMMITTEES, "Geen commissies geladen"),
];

struct LocalState {
    committees: HashMap<Filter, Vec<String>>,
    language: LanguageCode,
    last_update: String,
}

/// Clears the scanning flag however the scan ends, including a dropped future.
struct ScanInProgress<'a>(&'a AtomicBool);

impl Drop for ScanInProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct LocalCommitteeStore {
    state: Mutex<LocalState>,
    scanning: AtomicBool,
    scan_duration: Duration,
}

impl Default for LocalCommitteeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCommitteeStore {
    pub fn new() -> Self {
        Self::with_committees(
            DEFAULT_CEN.iter().map(|c| c.to_string()).collect(),
            DEFAULT_ISO.iter().map(|c| c.to_string()).collect(),
        )
    }

    pub fn with_committees(cen: Vec<String>, iso: Vec<String>) -> Self {
        let committees = HashMap::from([(Filter::Cen, cen), (Filter::Iso, iso)]);
        Self {
            state: Mutex::new(LocalState {
                committees,
                language: LanguageCode::english(),
                last_update: INITIAL_LAST_UPDATE.to_string(),
            }),
            scanning: AtomicBool::new(false),
            scan_duration: Duration::ZERO,
        }
    }

    /// Simulated scan work time.
    pub fn with_scan_duration(mut self, scan_duration: Duration) -> Self {
        self.scan_duration = scan_duration;
        self
    }

    fn translation_table(language: &LanguageCode) -> TranslationMap {
        let source: &[(&str, &str)] = if language.is_dutch() {
            DUTCH
        } else {
            crate::translations::TranslationTable::builtin_english_pairs()
        };
        source
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }
}

#[async_trait]
impl CommitteeStore for LocalCommitteeStore {
    async fn list(&self, filter: Filter) -> Result<Vec<String>> {
        let state = self.state.lock().await;
        Ok(state.committees.get(&filter).cloned().unwrap_or_default())
    }

    async fn add(&self, filter: Filter, name: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let list = state.committees.entry(filter).or_default();
        if list.iter().any(|existing| existing == name) {
            tracing::info!(%filter, name, "local store refused duplicate committee");
            return Ok(false);
        }
        list.push(name.to_string());
        Ok(true)
    }

    async fn update(&self, filter: Filter, committees: &[String]) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.committees.insert(filter, committees.to_vec());
        Ok(true)
    }

    async fn remove(&self, filter: Filter, name: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let list = state.committees.entry(filter).or_default();
        match list.iter().position(|existing| existing == name) {
            Some(index) => {
                list.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn scan(&self) -> Result<ScanReport> {
        if self
            .scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(ScanReport::failed("Scan already in progress"));
        }
        let _scanning = ScanInProgress(&self.scanning);

        if !self.scan_duration.is_zero() {
            tokio::time::sleep(self.scan_duration).await;
        }

        let mut state = self.state.lock().await;
        let new_date = Local::now().format("%d %B %Y").to_string();
        state.last_update = new_date.clone();
        tracing::info!(last_update = %new_date, "local scan completed");
        Ok(ScanReport {
            success: true,
            message: "Standards scan completed successfully".into(),
            last_update: Some(new_date),
            changes_found: Some(0),
            duration: Some(format!("{} seconds", self.scan_duration.as_secs())),
        })
    }

    async fn language(&self) -> Result<LanguageCode> {
        Ok(self.state.lock().await.language.clone())
    }

    async fn set_language(&self, language: &LanguageCode) -> Result<bool> {
        self.state.lock().await.language = language.clone();
        Ok(true)
    }

    async fn translations(&self, language: &LanguageCode) -> Result<TranslationMap> {
        Ok(Self::translation_table(language))
    }

    async fn status(&self) -> Result<AppStatus> {
        let state = self.state.lock().await;
        Ok(AppStatus {
            last_update: state.last_update.clone(),
            language: state.language.clone(),
            scan_interval: Some(SCAN_INTERVAL_DAYS),
            version: Some(VERSION.into()),
            total_committees: Some(state.committees.values().map(Vec::len).sum()),
        })
    }

    async fn test_connection(&self) -> Result<ConnectionReport> {
        Ok(ConnectionReport {
            success: true,
            message: "Local bridge connection working properly".into(),
            timestamp: Some(Local::now().to_rfc3339()),
            version: Some(VERSION.into()),
        })
    }
}
