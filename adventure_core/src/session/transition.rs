use adventure_rules::SceneId;
use serde::Serialize;

/// A scene wipe in progress. It is timed state, not a blocking wait: the
/// session keeps processing events while it plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: SceneId,
    pub to: SceneId,
    pub started_at_ms: u64,
    pub duration_ms: u64,
}

/// What the presentation layer needs to draw a transition frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionView {
    pub from: SceneId,
    pub to: SceneId,
    /// 0.0 at the start, 1.0 when done.
    pub progress: f32,
}

impl Transition {
    pub fn new(from: SceneId, to: SceneId, started_at_ms: u64, duration_ms: u64) -> Self {
        Self {
            from,
            to,
            started_at_ms,
            duration_ms,
        }
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_at_ms)
    }

    pub fn is_active(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) < self.duration_ms
    }

    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms(now_ms) as f32 / self.duration_ms as f32).min(1.0)
    }

    pub fn view(&self, now_ms: u64) -> TransitionView {
        TransitionView {
            from: self.from.clone(),
            to: self.to.clone(),
            progress: self.progress(now_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress() {
        let t = Transition::new(SceneId::new("a"), SceneId::new("b"), 100, 60);
        assert_eq!(t.progress(100), 0.0);
        assert!((t.progress(115) - 0.25).abs() < 1e-6);
        assert_eq!(t.progress(500), 1.0);
        assert!(t.is_active(159));
        assert!(!t.is_active(160));
        // Clock earlier than start counts as not started
        assert_eq!(t.progress(50), 0.0);
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let t = Transition::new(SceneId::new("a"), SceneId::new("b"), 0, 0);
        assert!(!t.is_active(0));
        assert_eq!(t.progress(0), 1.0);
    }
}
