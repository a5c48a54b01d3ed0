//! # bookforge-foundation
//!
//! Foundation layer for BookForge:
//! - Error: 중앙 에러 분류 (Validation, Auth, AiService, ContentParse, Encoding, Io)
//! - Storage: JsonStore (설정 / 토큰 파일)
//! - Config: BookForgeConfig 통합 설정, PDF 레이아웃, 기본 프롬프트
//! - Auth: 로그인 상태 게이트 (토큰 파일 기반)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Layer4-server (HTTP, polling)                           │
//! │                     │                                    │
//! │  Layer3-engine   Orchestrator ─ Ingestor ─ Generator     │
//! │                     │                                    │
//! │  Layer2   provider (AI) · document (encoders) · task     │
//! │                     │                                    │
//! │  Layer1   foundation (error, config, storage, auth)      │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Storage
// ============================================================================
pub use storage::{JsonStore, APP_DIR_NAME};

// ============================================================================
// Config
// ============================================================================
pub use config::{
    BookForgeConfig, ConfigUpdate, DefaultPrompts, PdfSettings, BOOKFORGE_CONFIG_FILE,
    DEFAULT_API_URL,
};

// ============================================================================
// Auth
// ============================================================================
pub use auth::{AuthGate, Credentials, LoginStatus, StaticAuth, TokenData, TokenStore, TOKEN_FILE};
