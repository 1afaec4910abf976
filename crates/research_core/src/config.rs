use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum accepted length of a trimmed research question.
pub const MIN_QUERY_LEN: usize = 3;

/// Research depth preset forwarded to the backend planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Quick,
    Standard,
    Comprehensive,
}

/// Recency window for community research.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Day,
    Week,
    Month,
    Year,
    All,
}

/// Configuration for one research request, sent verbatim to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchConfig {
    pub depth: Depth,
    pub max_iterations: u32,
    pub max_web_results: u32,
    pub include_reddit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddits: Option<Vec<String>>,
    pub time_filter: TimeFilter,
    pub max_reddit_posts: u32,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            depth: Depth::Standard,
            max_iterations: 3,
            max_web_results: 15,
            include_reddit: true,
            subreddits: None,
            time_filter: TimeFilter::Month,
            max_reddit_posts: 50,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_iterations must be within 1..=10, got {0}")]
    MaxIterations(u32),
    #[error("max_web_results must be within 1..=50, got {0}")]
    MaxWebResults(u32),
    #[error("max_reddit_posts must be within 1..=100, got {0}")]
    MaxRedditPosts(u32),
}

impl ResearchConfig {
    /// Checks the backend's accepted ranges before a request is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=10).contains(&self.max_iterations) {
            return Err(ConfigError::MaxIterations(self.max_iterations));
        }
        if !(1..=50).contains(&self.max_web_results) {
            return Err(ConfigError::MaxWebResults(self.max_web_results));
        }
        if !(1..=100).contains(&self.max_reddit_posts) {
            return Err(ConfigError::MaxRedditPosts(self.max_reddit_posts));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert_eq!(ResearchConfig::default().validate(), Ok(()));
    }

    #[test]
    fn out_of_range_values_rejected() {
        let mut config = ResearchConfig {
            max_iterations: 0,
            ..ResearchConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::MaxIterations(0)));

        config.max_iterations = 3;
        config.max_web_results = 51;
        assert_eq!(config.validate(), Err(ConfigError::MaxWebResults(51)));

        config.max_web_results = 15;
        config.max_reddit_posts = 101;
        assert_eq!(config.validate(), Err(ConfigError::MaxRedditPosts(101)));
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let json = serde_json::to_value(ResearchConfig::default()).unwrap();
        assert_eq!(json["depth"], "standard");
        assert_eq!(json["time_filter"], "month");
        assert_eq!(json["max_web_results"], 15);
        assert!(json.get("subreddits").is_none());
    }
}
