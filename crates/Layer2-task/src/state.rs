//! Task status state machine
//!
//! ```text
//! Pending ──► Running ──┬──► Completed
//!                       └──► Error
//! ```

use serde::{Deserialize, Serialize};

/// Possible states of a generation task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created, pipeline not started yet
    Pending,

    /// Pipeline is executing
    Running,

    /// All stages done, at least one output written
    Completed,

    /// Pipeline halted
    Error,
}

impl TaskStatus {
    /// Check if this is a terminal state (cannot transition further)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }

    /// Check if task is still active (pending or running)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// 허용된 전이인지 확인 (같은 상태 유지 포함)
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, Running)
                | (Running, Running)
                | (Running, Completed)
                | (Running, Error)
        )
    }

    /// Get display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Running => "Running",
            TaskStatus::Completed => "Completed",
            TaskStatus::Error => "Error",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only() {
        use TaskStatus::*;
        assert!(Pending.can_transition_to(Running));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Error));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Error));
        assert!(!Running.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Running));
        assert!(!Error.can_transition_to(Error));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert!(TaskStatus::Error.is_terminal());
        assert!(TaskStatus::Pending.is_active());
    }
}
