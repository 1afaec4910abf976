use std::fmt;

/// A coarse, client-defined phase of the pipeline. Many backend nodes map
/// onto one stage; nodes the client does not know pass through as their
/// own stage rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stage(String);

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Versioned node-to-stage table plus the fixed stage order for one
/// pipeline variant. The plan is the single owner of this mapping;
/// rendering surfaces never define their own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    id: &'static str,
    stages: Vec<Stage>,
    nodes: &'static [(&'static str, &'static str)],
}

impl StagePlan {
    /// The 4-stage pipeline variant.
    pub fn pipeline() -> Self {
        Self {
            id: "pipeline/v1",
            stages: ["planning", "searching", "scraping", "answering"]
                .iter()
                .map(|name| Stage::new(*name))
                .collect(),
            nodes: &[
                ("query_planner", "planning"),
                ("multi_source_searcher", "searching"),
                ("content_scraper", "scraping"),
                ("content_analyzer", "answering"),
                ("consensus_builder", "answering"),
                ("cross_reference", "answering"),
                ("synthesis", "answering"),
                ("quality_checker", "answering"),
                ("gap_filler", "searching"),
            ],
        }
    }

    /// The 8-stage multi-source variant with community research.
    pub fn multi_source() -> Self {
        Self {
            id: "multi_source/v1",
            stages: [
                "planning",
                "searching",
                "scraping",
                "analyzing",
                "consensus",
                "cross_check",
                "synthesis",
                "quality",
            ]
            .iter()
            .map(|name| Stage::new(*name))
            .collect(),
            nodes: &[
                ("query_planner", "planning"),
                ("multi_source_searcher", "searching"),
                ("content_scraper", "scraping"),
                ("content_analyzer", "analyzing"),
                ("consensus_builder", "consensus"),
                ("cross_reference", "cross_check"),
                ("synthesis", "synthesis"),
                ("quality_checker", "quality"),
                ("gap_filler", "quality"),
            ],
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Stages in their fixed total order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Maps a backend node identifier to its stage. Unknown nodes become
    /// their own stage.
    pub fn resolve(&self, node: &str) -> Stage {
        self.nodes
            .iter()
            .find(|(known, _)| *known == node)
            .map(|(_, stage)| Stage::new(*stage))
            .unwrap_or_else(|| Stage::new(node))
    }

    /// Position of a stage in the fixed order; `None` for pass-through
    /// stages the plan does not know.
    pub fn index_of(&self, stage: &Stage) -> Option<usize> {
        self.stages.iter().position(|known| known == stage)
    }
}
