//! Text service implementations

pub mod codex;
pub mod scripted;
