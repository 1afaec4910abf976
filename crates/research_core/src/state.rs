use std::collections::BTreeSet;

use crate::counters::ProgressCounters;
use crate::discovery::{DiscoveryCategory, DiscoveryLog};
use crate::event::{ProgressEvent, ResearchResult};
use crate::sources::SourceRegistry;
use crate::stage::{Stage, StagePlan};
use crate::view_model::{SessionViewModel, StageRowView, StageStatus};

/// Lifecycle of one research session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    /// A refinement round-trip is in flight; reachable only from
    /// `Completed` and always returns there.
    Refining,
    Completed,
    Failed,
}

/// Where a failure originated: the transport never reached the pipeline,
/// or the pipeline itself declared the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOrigin {
    Transport,
    Backend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub origin: FailureOrigin,
    pub message: String,
}

/// Aggregate state for one research session.
///
/// Exclusively owned and mutated by the orchestrator; readers only ever
/// get a snapshot copy via [`SessionState::view`]. Reset wholesale at the
/// next accepted start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    plan: StagePlan,
    phase: Phase,
    query: Option<String>,
    session_id: Option<String>,
    active_stage: Option<Stage>,
    completed_stages: BTreeSet<Stage>,
    counters: ProgressCounters,
    discoveries: DiscoveryLog,
    sources: SourceRegistry,
    last_result: Option<ResearchResult>,
    failure: Option<SessionFailure>,
    refine_error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(StagePlan::multi_source())
    }
}

impl SessionState {
    pub fn new(plan: StagePlan) -> Self {
        Self {
            plan,
            phase: Phase::Idle,
            query: None,
            session_id: None,
            active_stage: None,
            completed_stages: BTreeSet::new(),
            counters: ProgressCounters::new(),
            discoveries: DiscoveryLog::new(),
            sources: SourceRegistry::new(),
            last_result: None,
            failure: None,
            refine_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Drops everything from a previous session and arms a new one.
    pub(crate) fn reset_for_start(&mut self, query: String) {
        let plan = self.plan.clone();
        *self = Self::new(plan);
        self.query = Some(query);
        self.phase = Phase::Running;
    }

    pub(crate) fn apply_started(&mut self, event: &ProgressEvent) {
        if event.session_id.is_some() {
            self.session_id = event.session_id.clone();
        }
        if event.query.is_some() {
            self.query = event.query.clone();
        }
        self.discoveries
            .append(DiscoveryCategory::System, "Research session started");
    }

    pub(crate) fn apply_in_progress(&mut self, event: &ProgressEvent) {
        if let Some(node) = &event.stage {
            let stage = self.plan.resolve(node);
            self.mark_stage_active(stage);
        }
        if let Some(data) = &event.data {
            self.counters.merge(data);
            for (key, value) in data {
                if *value > 0 {
                    let (category, content) = counter_discovery(key, *value);
                    self.discoveries.append(category, content);
                }
            }
        }
        if let Some(message) = &event.message {
            self.discoveries
                .append(DiscoveryCategory::Pipeline, message.clone());
        }
        if let Some(result) = &event.result {
            self.sources.merge(&result.sources);
        }
    }

    pub(crate) fn apply_complete(
        &mut self,
        event_session_id: Option<&str>,
        result: &ResearchResult,
    ) {
        for stage in self.plan.stages().to_vec() {
            self.completed_stages.insert(stage);
        }
        self.active_stage = None;
        self.sources.merge(&result.sources);
        if self.session_id.is_none() {
            self.session_id = event_session_id
                .map(ToOwned::to_owned)
                .or_else(|| result.session_id.clone());
        }
        self.last_result = Some(result.clone());
        self.discoveries
            .append(DiscoveryCategory::System, "Research complete");
        self.phase = Phase::Completed;
    }

    pub(crate) fn apply_error(&mut self, message: &str) {
        self.failure = Some(SessionFailure {
            origin: FailureOrigin::Backend,
            message: message.to_string(),
        });
        self.discoveries
            .append(DiscoveryCategory::System, format!("Research failed: {message}"));
        self.phase = Phase::Failed;
    }

    pub(crate) fn apply_transport_failure(&mut self, message: &str) {
        self.failure = Some(SessionFailure {
            origin: FailureOrigin::Transport,
            message: message.to_string(),
        });
        self.discoveries
            .append(DiscoveryCategory::System, format!("Connection lost: {message}"));
        self.phase = Phase::Failed;
    }

    pub(crate) fn begin_refine(&mut self) {
        self.refine_error = None;
        self.phase = Phase::Refining;
    }

    pub(crate) fn record_refine_rejection(&mut self, reason: &str) {
        self.refine_error = Some(reason.to_string());
    }

    /// Refinement replaces the answer but merges its sources into the
    /// existing registry; already-surfaced sources keep their place.
    pub(crate) fn apply_refine_success(&mut self, result: &ResearchResult) {
        self.sources.merge(&result.sources);
        self.last_result = Some(result.clone());
        self.refine_error = None;
        self.discoveries
            .append(DiscoveryCategory::System, "Refinement merged into report");
        self.phase = Phase::Completed;
    }

    pub(crate) fn apply_refine_failure(&mut self, message: String) {
        self.refine_error = Some(message);
        self.phase = Phase::Completed;
    }

    /// Sets the active stage and marks every stage at a strictly lower
    /// index completed. The backend runs a sequential pipeline: a later
    /// stage becoming active implies all earlier stages finished, even
    /// when no explicit completion was ever emitted for them.
    fn mark_stage_active(&mut self, stage: Stage) {
        if let Some(index) = self.plan.index_of(&stage) {
            for earlier in &self.plan.stages()[..index] {
                self.completed_stages.insert(earlier.clone());
            }
        }
        self.active_stage = Some(stage);
    }

    /// Immutable snapshot for the rendering layer.
    pub fn view(&self) -> SessionViewModel {
        let mut stages: Vec<StageRowView> = self
            .plan
            .stages()
            .iter()
            .map(|stage| StageRowView {
                stage: stage.clone(),
                status: if self.active_stage.as_ref() == Some(stage) {
                    StageStatus::Active
                } else if self.completed_stages.contains(stage) {
                    StageStatus::Done
                } else {
                    StageStatus::Pending
                },
            })
            .collect();
        // A pass-through stage is shown after the known ones.
        if let Some(active) = &self.active_stage {
            if self.plan.index_of(active).is_none() {
                stages.push(StageRowView {
                    stage: active.clone(),
                    status: StageStatus::Active,
                });
            }
        }

        SessionViewModel {
            phase: self.phase,
            query: self.query.clone(),
            session_id: self.session_id.clone(),
            stages,
            counters: self.counters.snapshot(),
            discoveries: self.discoveries.entries().to_vec(),
            sources: self.sources.records().to_vec(),
            answer: self.last_result.as_ref().map(|r| r.response.clone()),
            failure: self.failure.clone(),
            refine_error: self.refine_error.clone(),
        }
    }
}

fn counter_discovery(key: &str, value: u64) -> (DiscoveryCategory, String) {
    match key {
        "web_results" => (
            DiscoveryCategory::Web,
            format!("Found {value} web results"),
        ),
        "reddit_posts" => (
            DiscoveryCategory::Community,
            format!("Collected {value} community posts"),
        ),
        "reddit_comments" => (
            DiscoveryCategory::Community,
            format!("Read {value} community comments"),
        ),
        "scraped_content" => (
            DiscoveryCategory::Content,
            format!("Scraped {value} pages"),
        ),
        _ => (DiscoveryCategory::Pipeline, format!("{key}: {value}")),
    }
}
