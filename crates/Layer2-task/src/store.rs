//! TaskStore - concurrent task registry
//!
//! - 맵 자체는 `RwLock<HashMap<..>>`, 각 작업은 별도의 `RwLock<Task>`로 보호한다.
//! - 쓰기는 작업당 하나뿐인 [`TaskWriter`]를 통해서만 가능하다.
//! - 읽기는 항상 복사본(snapshot)을 반환하므로 반쯤 쓰인 상태를 볼 수 없다.

use crate::state::TaskStatus;
use crate::task::{Task, TaskId};
use bookforge_document::FormatKind;
use bookforge_foundation::{Error, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

type Entry = Arc<RwLock<Task>>;

/// Concurrent task registry
#[derive(Clone, Default)]
pub struct TaskStore {
    tasks: Arc<RwLock<HashMap<TaskId, Entry>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new `Pending` task and hand out its only writer
    pub fn create(&self, total_steps: u32, message: impl Into<String>) -> TaskWriter {
        let task = Task::new(total_steps, message);
        let id = task.id;
        let entry = Arc::new(RwLock::new(task));
        self.tasks.write().insert(id, Arc::clone(&entry));
        debug!("Task {} created", id.short());
        TaskWriter { id, entry }
    }

    /// Snapshot of a task
    pub fn get(&self, id: &TaskId) -> Option<Task> {
        let entry = self.tasks.read().get(id).cloned()?;
        let task = entry.read().clone();
        Some(task)
    }

    /// Snapshot or `NotFound`
    pub fn snapshot(&self, id: &TaskId) -> Result<Task> {
        self.get(id)
            .ok_or_else(|| Error::NotFound(format!("task {}", id)))
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    /// Snapshots of every task, oldest first
    pub fn list(&self) -> Vec<Task> {
        let entries: Vec<Entry> = self.tasks.read().values().cloned().collect();
        let mut tasks: Vec<Task> = entries.iter().map(|e| e.read().clone()).collect();
        tasks.sort_by_key(|t| t.created_at);
        tasks
    }

    /// Remove terminal tasks created before `cutoff`
    ///
    /// 실행 중인 작업은 건드리지 않는다.
    pub fn cleanup_older_than(&self, cutoff: DateTime<Utc>) -> Vec<TaskId> {
        let mut map = self.tasks.write();
        let expired: Vec<TaskId> = map
            .iter()
            .filter(|(_, entry)| {
                let task = entry.read();
                task.is_terminal() && task.created_at < cutoff
            })
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            map.remove(id);
        }
        if !expired.is_empty() {
            debug!("Removed {} expired task(s)", expired.len());
        }
        expired
    }
}

// ============================================================================
// TaskWriter
// ============================================================================

/// Exclusive write handle for one task
///
/// `Clone`을 구현하지 않으므로 작업당 쓰는 쪽은 항상 하나다.
/// 상태 역행, 단계 감소, 종료 후 수정은 모두 거부된다.
pub struct TaskWriter {
    id: TaskId,
    entry: Entry,
}

impl TaskWriter {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Task {
        self.entry.read().clone()
    }

    pub fn total_steps(&self) -> u32 {
        self.entry.read().total_steps
    }

    /// `Pending → Running`
    pub fn start(&self, message: impl Into<String>) -> Result<()> {
        self.update(TaskStatus::Running, None, Some(message.into()))
    }

    /// Advance to `step` (must not go backwards) and replace the message
    pub fn advance(&self, step: u32, message: impl Into<String>) -> Result<()> {
        self.update(TaskStatus::Running, Some(step), Some(message.into()))
    }

    /// Replace only the message (sub-stage progress)
    pub fn message(&self, message: impl Into<String>) -> Result<()> {
        self.update(TaskStatus::Running, None, Some(message.into()))
    }

    /// `Running → Completed`, step jumps to `total_steps`
    pub fn complete(
        &self,
        outputs: BTreeMap<FormatKind, PathBuf>,
        failed_formats: Vec<FormatKind>,
        message: impl Into<String>,
    ) -> Result<()> {
        let mut task = self.entry.write();
        Self::check(&task, TaskStatus::Completed)?;
        task.status = TaskStatus::Completed;
        task.step = task.total_steps;
        task.message = message.into();
        task.outputs = outputs;
        task.failed_formats = failed_formats;
        task.updated_at = Utc::now();
        Ok(())
    }

    /// `Running → Error`
    pub fn fail(&self, message: impl Into<String>) -> Result<()> {
        self.update(TaskStatus::Error, None, Some(message.into()))
    }

    fn update(&self, status: TaskStatus, step: Option<u32>, message: Option<String>) -> Result<()> {
        let mut task = self.entry.write();
        Self::check(&task, status)?;

        if let Some(step) = step {
            if step < task.step {
                return Err(Error::Internal(format!(
                    "task {}: step {} < {}",
                    self.id.short(),
                    step,
                    task.step
                )));
            }
            task.step = step.min(task.total_steps);
        }
        if task.status == TaskStatus::Pending && status == TaskStatus::Running && task.step == 0 {
            task.step = 1;
        }

        task.status = status;
        if let Some(message) = message {
            task.message = message;
        }
        task.updated_at = Utc::now();
        Ok(())
    }

    fn check(task: &Task, next: TaskStatus) -> Result<()> {
        if task.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(Error::Internal(format!(
                "task {}: illegal transition {} -> {}",
                task.id.short(),
                task.status,
                next
            )))
        }
    }
}

impl Drop for TaskWriter {
    fn drop(&mut self) {
        // 파이프라인이 종료 상태를 남기지 못하고 사라진 경우
        let mut task = self.entry.write();
        if task.status.is_active() {
            warn!("Task {} writer dropped while {}", self.id.short(), task.status);
            task.status = TaskStatus::Error;
            task.message = "작업이 비정상적으로 중단되었습니다.".to_string();
            task.updated_at = Utc::now();
        }
    }
}
