use std::time::Duration;

use clap::{Parser, ValueEnum};
use research_client::ChannelSettings;
use research_core::{Depth, ResearchConfig, TimeFilter};

use crate::logging::LogDestination;

/// Drive a deep-research pipeline session from the terminal.
#[derive(Debug, Parser)]
#[command(name = "research", version, about)]
pub struct Args {
    /// Research question to investigate.
    pub query: String,

    /// Base URL of the research backend.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub base_url: String,

    /// Research depth preset.
    #[arg(long, value_enum, default_value_t = DepthArg::Standard)]
    pub depth: DepthArg,

    /// Maximum pipeline iterations (1-10).
    #[arg(long, default_value_t = 3)]
    pub max_iterations: u32,

    /// Maximum web search results (1-50).
    #[arg(long, default_value_t = 15)]
    pub max_web_results: u32,

    /// Skip community (Reddit) research.
    #[arg(long)]
    pub no_reddit: bool,

    /// Restrict community research to these subreddits.
    #[arg(long, value_delimiter = ',')]
    pub subreddits: Vec<String>,

    /// Recency window for community research.
    #[arg(long, value_enum, default_value_t = TimeFilterArg::Month)]
    pub time_filter: TimeFilterArg,

    /// Maximum community posts to collect (1-100).
    #[arg(long, default_value_t = 50)]
    pub max_reddit_posts: u32,

    /// Follow-up refinement to run once the session completes.
    #[arg(long)]
    pub refine: Option<String>,

    /// Treat this many seconds without an event as a lost connection.
    #[arg(long)]
    pub idle_timeout_secs: Option<u64>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogArg::File)]
    pub log: LogArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DepthArg {
    Quick,
    Standard,
    Comprehensive,
}

impl From<DepthArg> for Depth {
    fn from(value: DepthArg) -> Self {
        match value {
            DepthArg::Quick => Depth::Quick,
            DepthArg::Standard => Depth::Standard,
            DepthArg::Comprehensive => Depth::Comprehensive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeFilterArg {
    Day,
    Week,
    Month,
    Year,
    All,
}

impl From<TimeFilterArg> for TimeFilter {
    fn from(value: TimeFilterArg) -> Self {
        match value {
            TimeFilterArg::Day => TimeFilter::Day,
            TimeFilterArg::Week => TimeFilter::Week,
            TimeFilterArg::Month => TimeFilter::Month,
            TimeFilterArg::Year => TimeFilter::Year,
            TimeFilterArg::All => TimeFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogArg {
    File,
    Terminal,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(value: LogArg) -> Self {
        match value {
            LogArg::File => LogDestination::File,
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::Both => LogDestination::Both,
        }
    }
}

impl Args {
    pub fn research_config(&self) -> ResearchConfig {
        ResearchConfig {
            depth: self.depth.into(),
            max_iterations: self.max_iterations,
            max_web_results: self.max_web_results,
            include_reddit: !self.no_reddit,
            subreddits: if self.subreddits.is_empty() {
                None
            } else {
                Some(self.subreddits.clone())
            },
            time_filter: self.time_filter.into(),
            max_reddit_posts: self.max_reddit_posts,
        }
    }

    pub fn channel_settings(&self) -> ChannelSettings {
        ChannelSettings {
            base_url: self.base_url.clone(),
            idle_timeout: self.idle_timeout_secs.map(Duration::from_secs),
            ..ChannelSettings::default()
        }
    }
}
