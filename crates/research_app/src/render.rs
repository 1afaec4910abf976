use research_core::{Phase, SessionViewModel, StageStatus};

/// Prints stage transitions and newly appended discoveries since the
/// previous snapshot. The discovery log is append-only, so remembering a
/// single cursor is enough.
pub struct ProgressPrinter {
    printed_discoveries: usize,
    last_stage_line: String,
}

impl ProgressPrinter {
    pub fn new() -> Self {
        Self {
            printed_discoveries: 0,
            last_stage_line: String::new(),
        }
    }

    pub fn render(&mut self, view: &SessionViewModel) {
        let stage_line = stage_line(view);
        if stage_line != self.last_stage_line {
            println!("{stage_line}");
            self.last_stage_line = stage_line;
        }
        for discovery in &view.discoveries[self.printed_discoveries.min(view.discoveries.len())..] {
            println!("  [{}] {}", discovery.category, discovery.content);
        }
        self.printed_discoveries = view.discoveries.len();
    }
}

fn stage_line(view: &SessionViewModel) -> String {
    view.stages
        .iter()
        .map(|row| match row.status {
            StageStatus::Done => format!("[{}]", row.stage),
            StageStatus::Active => format!(">{}<", row.stage),
            StageStatus::Pending => format!(" {} ", row.stage),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prints the final outcome of a session.
pub fn print_final(view: &SessionViewModel) {
    match view.phase {
        Phase::Completed => {
            println!();
            if let Some(answer) = &view.answer {
                println!("{answer}");
            }
            if !view.sources.is_empty() {
                println!();
                println!("Sources:");
                for (index, source) in view.sources.iter().enumerate() {
                    let kind = source
                        .kind
                        .map(|kind| format!(" ({kind})"))
                        .unwrap_or_default();
                    println!("  {}. {}{} {}", index + 1, source.title, kind, source.url);
                }
            }
        }
        Phase::Failed => {
            eprintln!(
                "research failed: {}",
                view.error_message().unwrap_or("unknown error")
            );
            for discovery in view.recent_discoveries(5) {
                eprintln!("  last activity: [{}] {}", discovery.category, discovery.content);
            }
        }
        Phase::Idle | Phase::Running | Phase::Refining => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_core::{Stage, StageRowView};
    use std::collections::BTreeMap;

    fn view_with_stages(stages: Vec<StageRowView>) -> SessionViewModel {
        SessionViewModel {
            phase: Phase::Running,
            query: None,
            session_id: None,
            stages,
            counters: BTreeMap::new(),
            discoveries: Vec::new(),
            sources: Vec::new(),
            answer: None,
            failure: None,
            refine_error: None,
        }
    }

    #[test]
    fn stage_line_marks_done_active_and_pending() {
        let view = view_with_stages(vec![
            StageRowView {
                stage: Stage::new("planning"),
                status: StageStatus::Done,
            },
            StageRowView {
                stage: Stage::new("searching"),
                status: StageStatus::Active,
            },
            StageRowView {
                stage: Stage::new("scraping"),
                status: StageStatus::Pending,
            },
        ]);
        assert_eq!(stage_line(&view), "[planning] >searching<  scraping ");
    }
}
