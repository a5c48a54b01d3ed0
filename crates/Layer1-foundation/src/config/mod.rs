//! Config - 통합 설정 관리
//!
//! - `bookforge.rs` - BookForgeConfig 통합 설정 + 부분 업데이트
//! - `pdf.rs` - 문서 레이아웃, 폰트 탐색
//! - `prompts.rs` - 기본 프롬프트

mod bookforge;
mod pdf;
mod prompts;

pub use bookforge::{BookForgeConfig, ConfigUpdate, BOOKFORGE_CONFIG_FILE, DEFAULT_API_URL};
pub use pdf::PdfSettings;
pub use prompts::DefaultPrompts;
