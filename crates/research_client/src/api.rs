use client_logging::research_info;
use research_core::{ResearchConfig, ResearchResult};
use serde::{Deserialize, Serialize};

use crate::channel::{map_reqwest_error, ChannelSettings};
use crate::types::ChannelError;

/// Request body for the refinement endpoint. `add_sources` is passed
/// through to the backend uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementRequest {
    pub refinement_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_sources: Option<Vec<String>>,
}

/// Subreddit listing returned by the discovery endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubredditDiscovery {
    pub topic: String,
    #[serde(default)]
    pub subreddits: Vec<String>,
}

/// How much of a community thread the backend should read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadDepth {
    Full,
    Summary,
}

impl ThreadDepth {
    fn as_str(self) -> &'static str {
        match self {
            ThreadDepth::Full => "full",
            ThreadDepth::Summary => "summary",
        }
    }
}

/// Standalone analysis of one community thread. The post and comment
/// payloads are backend scraper output and stay untyped here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThreadAnalysis {
    pub thread_url: String,
    #[serde(default)]
    pub post: serde_json::Value,
    #[serde(default)]
    pub comments: Vec<serde_json::Value>,
    #[serde(default)]
    pub total_comments: u64,
    #[serde(default)]
    pub sentiment: serde_json::Value,
}

/// Request/response client for the backend's non-streamed endpoints.
#[derive(Debug, Clone)]
pub struct ResearchApi {
    settings: ChannelSettings,
    client: reqwest::Client,
}

impl ResearchApi {
    pub fn new(settings: ChannelSettings) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ChannelError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// Submit a research question synchronously, without streaming.
    pub async fn submit(
        &self,
        query: &str,
        config: &ResearchConfig,
    ) -> Result<ResearchResult, ChannelError> {
        let body = serde_json::json!({ "query": query, "config": config });
        let response = self
            .client
            .post(self.endpoint("/api/research"))
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_result(response).await
    }

    /// Retrieve a previously completed session.
    pub async fn fetch(&self, session_id: &str) -> Result<ResearchResult, ChannelError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/api/research/{session_id}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ChannelError::SessionNotFound(session_id.to_string()));
        }
        read_result(response).await
    }

    /// Extend a completed session with a follow-up question. The updated
    /// result replaces the stored answer; its sources extend the stored
    /// set.
    pub async fn refine(
        &self,
        session_id: &str,
        request: &RefinementRequest,
    ) -> Result<ResearchResult, ChannelError> {
        research_info!("Refining session {session_id}");
        let response = self
            .client
            .post(self.endpoint(&format!("/api/research/{session_id}/refine")))
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ChannelError::SessionNotFound(session_id.to_string()));
        }
        read_result(response).await
    }

    /// Ask the backend for subreddits relevant to a topic.
    pub async fn discover_subreddits(
        &self,
        topic: &str,
        limit: u32,
    ) -> Result<SubredditDiscovery, ChannelError> {
        let response = self
            .client
            .get(self.endpoint("/api/subreddits/discover"))
            .query(&[("topic", topic), ("limit", &limit.to_string())])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::HttpStatus(status.as_u16()));
        }
        response
            .json::<SubredditDiscovery>()
            .await
            .map_err(|err| ChannelError::Protocol(err.to_string()))
    }

    /// Analyze one community thread outside of any session.
    pub async fn analyze_thread(
        &self,
        thread_url: &str,
        depth: ThreadDepth,
    ) -> Result<ThreadAnalysis, ChannelError> {
        let response = self
            .client
            .post(self.endpoint("/api/reddit/analyze-thread"))
            .query(&[("thread_url", thread_url), ("depth", depth.as_str())])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::HttpStatus(status.as_u16()));
        }
        response
            .json::<ThreadAnalysis>()
            .await
            .map_err(|err| ChannelError::Protocol(err.to_string()))
    }

    /// Liveness probe against the backend.
    pub async fn health(&self) -> Result<(), ChannelError> {
        let response = self
            .client
            .get(self.endpoint("/health"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}

async fn read_result(response: reqwest::Response) -> Result<ResearchResult, ChannelError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ChannelError::HttpStatus(status.as_u16()));
    }
    response
        .json::<ResearchResult>()
        .await
        .map_err(|err| ChannelError::Protocol(err.to_string()))
}
