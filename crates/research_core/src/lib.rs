//! Research core: pure session state machine and view-model helpers.
mod config;
mod counters;
mod discovery;
mod effect;
mod event;
mod msg;
mod sources;
mod stage;
mod state;
mod update;
mod view_model;

pub use config::{ConfigError, Depth, ResearchConfig, TimeFilter, MIN_QUERY_LEN};
pub use counters::ProgressCounters;
pub use discovery::{Discovery, DiscoveryCategory, DiscoveryLog};
pub use effect::Effect;
pub use event::{ProgressEvent, ResearchResult, SourceKind, SourceRecord, Status};
pub use msg::Msg;
pub use sources::SourceRegistry;
pub use stage::{Stage, StagePlan};
pub use state::{FailureOrigin, Phase, SessionFailure, SessionState};
pub use update::update;
pub use view_model::{SessionViewModel, StageRowView, StageStatus};
