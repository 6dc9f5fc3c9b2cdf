//! Stages of a single aggregation run.
//!
//! ```text
//! Start → Resolving ─(no associations)─────────────────→ Done
//!              └──→ Fetching → Normalizing ────────────→ Done
//! Resolving | Fetching ──(error)──→ Failed
//! ```

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Resolving,
    Fetching,
    Normalizing,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Resolving => "resolving",
            Stage::Fetching => "fetching",
            Stage::Normalizing => "normalizing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Whether `self → next` is a transition a run may take.
    pub fn can_transition_to(&self, next: Stage) -> bool {
        matches!(
            (self, next),
            (Stage::Start, Stage::Resolving)
                | (Stage::Start, Stage::Failed)
                | (Stage::Resolving, Stage::Fetching)
                | (Stage::Resolving, Stage::Done)
                | (Stage::Resolving, Stage::Failed)
                | (Stage::Fetching, Stage::Normalizing)
                | (Stage::Fetching, Stage::Failed)
                | (Stage::Normalizing, Stage::Done)
        )
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the stage of one run and logs each transition.
#[derive(Debug)]
pub(crate) struct StageTracker {
    current: Stage,
}

impl StageTracker {
    pub(crate) fn new() -> Self {
        Self {
            current: Stage::Start,
        }
    }

    pub(crate) fn current(&self) -> Stage {
        self.current
    }

    pub(crate) fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.current.can_transition_to(next),
            "invalid pipeline transition {} -> {}",
            self.current,
            next
        );
        tracing::debug!(from = %self.current, to = %next, "Pipeline stage transition");
        self.current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_stages() {
        assert!(Stage::Done.is_terminal());
        assert!(Stage::Failed.is_terminal());
        assert!(!Stage::Fetching.is_terminal());
    }

    #[test]
    fn test_terminal_stages_have_no_exits() {
        let all = [
            Stage::Start,
            Stage::Resolving,
            Stage::Fetching,
            Stage::Normalizing,
            Stage::Done,
            Stage::Failed,
        ];
        for next in all {
            assert!(!Stage::Done.can_transition_to(next));
            assert!(!Stage::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn test_normalizing_cannot_fail() {
        assert!(!Stage::Normalizing.can_transition_to(Stage::Failed));
        assert!(Stage::Resolving.can_transition_to(Stage::Done));
        assert!(!Stage::Fetching.can_transition_to(Stage::Done));
    }

    #[test]
    fn test_tracker_follows_happy_path() {
        let mut tracker = StageTracker::new();
        for next in [
            Stage::Resolving,
            Stage::Fetching,
            Stage::Normalizing,
            Stage::Done,
        ] {
            tracker.advance(next);
        }
        assert_eq!(tracker.current(), Stage::Done);
    }
}
