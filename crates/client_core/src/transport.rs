//! HTTP binding of the RPC bridge: `POST {bridge}/rpc/{procedure}` with the request envelope.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{Filter, LanguageCode},
    error::{ApiError, ApiException},
    protocol::{AppStatus, BridgeRequest, ConnectionReport, ScanReport, TranslationMap},
};
use url::Url;

use crate::{config::ClientSettings, CommitteeStore};

pub struct HttpCommitteeStore {
    http: Client,
    bridge_url: Url,
}

impl HttpCommitteeStore {
    pub fn new(bridge_url: Url, timeout: Duration) -> Result<Self> {
        if bridge_url.cannot_be_a_base() {
            return Err(anyhow!("bridge url '{bridge_url}' cannot carry procedure paths"));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build bridge http client")?;
        Ok(Self { http, bridge_url })
    }

    /// Uses the scan timeout for the client so long scans are not cut short;
    /// the controller applies the shorter per-call timeout to everything else.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let timeout = settings.scan_timeout().max(settings.request_timeout());
        Self::new(settings.bridge_url()?, timeout)
    }

    pub fn endpoint(&self, procedure: &str) -> Url {
        let mut url = self.bridge_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("rpc").push(procedure);
        }
        url
    }

    async fn call<T: DeserializeOwned>(&self, request: BridgeRequest) -> Result<T> {
        let procedure = request.procedure();
        let url = self.endpoint(procedure);
        tracing::debug!(procedure, %url, "bridge call");

        let res = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("bridge call '{procedure}' failed to send"))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                return Err(anyhow::Error::new(ApiException::from(api_error))
                    .context(format!("bridge call '{procedure}' returned {status}")));
            }
            return Err(anyhow!("bridge call '{procedure}' returned {status}: {body}"));
        }

        res.json::<T>()
            .await
            .with_context(|| format!("bridge call '{procedure}' returned malformed payload"))
    }
}

#[async_trait]
impl CommitteeStore for HttpCommitteeStore {
    async fn list(&self, filter: Filter) -> Result<Vec<String>> {
        self.call(BridgeRequest::GetCommittees {
            organization: filter,
        })
        .await
    }

    async fn add(&self, filter: Filter, name: &str) -> Result<bool> {
        self.call(BridgeRequest::AddCommittee {
            organization: filter,
            committee: name.to_string(),
        })
        .await
    }

    async fn update(&self, filter: Filter, committees: &[String]) -> Result<bool> {
        self.call(BridgeRequest::UpdateCommittees {
            organization: filter,
            committees: committees.to_vec(),
        })
        .await
    }

    async fn remove(&self, filter: Filter, name: &str) -> Result<bool> {
        self.call(BridgeRequest::RemoveCommittee {
            organization: filter,
            committee: name.to_string(),
        })
        .await
    }

    async fn scan(&self) -> Result<ScanReport> {
        self.call(BridgeRequest::PerformScan).await
    }

    async fn language(&self) -> Result<LanguageCode> {
        self.call(BridgeRequest::GetLanguage).await
    }

    async fn set_language(&self, language: &LanguageCode) -> Result<bool> {
        self.call(BridgeRequest::SetLanguage {
            language: language.clone(),
        })
        .await
    }

    async fn translations(&self, language: &LanguageCode) -> Result<TranslationMap> {
        self.call(BridgeRequest::GetTranslations {
            language: language.clone(),
        })
        .await
    }

    async fn status(&self) -> Result<AppStatus> {
        self.call(BridgeRequest::GetAppStatus).await
    }

    async fn test_connection(&self) -> Result<ConnectionReport> {
        self.call(BridgeRequest::TestConnection).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
