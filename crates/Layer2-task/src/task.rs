//! Task definition and snapshots

use crate::state::TaskStatus;
use bookforge_document::FormatKind;
use bookforge_foundation::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Generate a new random TaskId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 hex chars, used in logs and file-name suffixes
    pub fn short(&self) -> String {
        let mut s = self.0.simple().to_string();
        s.truncate(8);
        s
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(TaskId)
            .map_err(|_| Error::NotFound(format!("task {}", s)))
    }
}

/// Point-in-time copy of a task record
///
/// 폴링하는 쪽은 항상 이 복사본만 받는다. 원본은 [`TaskWriter`](crate::TaskWriter)만 수정한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    pub status: TaskStatus,

    /// 현재 단계 (단조 증가)
    pub step: u32,

    /// 생성 시 고정
    pub total_steps: u32,

    pub message: String,

    /// Completed 상태에서만 채워진다
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<FormatKind, PathBuf>,

    /// 인코딩에 실패한 포맷
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_formats: Vec<FormatKind>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub(crate) fn new(total_steps: u32, message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            status: TaskStatus::Pending,
            step: 0,
            total_steps: total_steps.max(1),
            message: message.into(),
            outputs: BTreeMap::new(),
            failed_formats: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Progress view exposed to pollers
    pub fn progress(&self) -> Progress {
        Progress {
            status: self.status,
            step: self.step,
            total_steps: self.total_steps,
            message: self.message.clone(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// `{status, step, totalSteps, message}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub status: TaskStatus,
    pub step: u32,
    pub total_steps: u32,
    pub message: String,
}
