//! Storage module for BookForge
//!
//! - `json`: JSON - 설정 / 토큰 파일 저장/로드

mod json;

// JSON Storage (범용)
pub use json::{JsonStore, APP_DIR_NAME};
