//! BookForge Config - 통합 설정
//!
//! 모델, 출력 경로, PDF 레이아웃, 프롬프트 오버라이드를 하나의 파일로 관리

use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::pdf::PdfSettings;
use super::prompts::DefaultPrompts;

/// 설정 파일명
pub const BOOKFORGE_CONFIG_FILE: &str = "config.json";

/// 기본 AI 엔드포인트 (ChatGPT Codex Responses)
pub const DEFAULT_API_URL: &str = "https://chatgpt.com/backend-api/codex/responses";

// ============================================================================
// BookForge Config (통합)
// ============================================================================

/// BookForge 통합 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookForgeConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 텍스트 생성 모델
    #[serde(default = "default_model")]
    pub model: String,

    /// AI 서비스 엔드포인트
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// 호출 1회당 타임아웃 (초)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// AI 호출 최대 시도 횟수 (첫 시도 포함)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// 출력 디렉토리 (없으면 데이터 디렉토리/output)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// 목표 페이지 수 (최소)
    #[serde(default = "default_target_pages_min")]
    pub target_pages_min: u32,

    /// 목표 페이지 수 (최대)
    #[serde(default = "default_target_pages_max")]
    pub target_pages_max: u32,

    /// 참고자료 컨텍스트 최대 글자 수
    #[serde(default = "default_context_char_budget")]
    pub context_char_budget: usize,

    /// PDF/문서 레이아웃
    #[serde(default)]
    pub pdf: PdfSettings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_chapter_system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_toc_rules: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_value_system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_marketing_system: Option<String>,
}

impl Default for BookForgeConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            model: default_model(),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
            output_dir: None,
            target_pages_min: default_target_pages_min(),
            target_pages_max: default_target_pages_max(),
            context_char_budget: default_context_char_budget(),
            pdf: PdfSettings::default(),
            prompt_chapter_system: None,
            prompt_toc_rules: None,
            prompt_value_system: None,
            prompt_marketing_system: None,
        }
    }
}

impl BookForgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 저장소에서 로드 (없거나 손상되면 기본값)
    pub fn load(store: &JsonStore) -> Self {
        store.load_or_default(BOOKFORGE_CONFIG_FILE)
    }

    /// 저장소에 저장
    pub fn save(&self, store: &JsonStore) -> Result<()> {
        store.save(BOOKFORGE_CONFIG_FILE, self)
    }

    /// 출력 디렉토리 결정
    pub fn resolve_output_dir(&self, store: &JsonStore) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| store.file_path("output"))
    }

    /// 프롬프트 (오버라이드 우선, 없으면 기본값)
    pub fn prompts(&self) -> DefaultPrompts {
        let defaults = DefaultPrompts::default();
        DefaultPrompts {
            chapter_system: self
                .prompt_chapter_system
                .clone()
                .unwrap_or(defaults.chapter_system),
            toc_rules: self.prompt_toc_rules.clone().unwrap_or(defaults.toc_rules),
            value_system: self
                .prompt_value_system
                .clone()
                .unwrap_or(defaults.value_system),
            marketing_system: self
                .prompt_marketing_system
                .clone()
                .unwrap_or(defaults.marketing_system),
        }
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 부분 업데이트 병합 (update에 있는 값만 반영)
    pub fn merge(&mut self, update: ConfigUpdate) {
        // pdf 블록은 참조로 먼저 반영, 이후 필드는 move
        self.pdf.merge(&update);

        if let Some(model) = update.model {
            self.model = model;
        }
        if let Some(min) = update.target_pages_min {
            self.target_pages_min = min;
        }
        if let Some(max) = update.target_pages_max {
            self.target_pages_max = max;
        }
        if self.target_pages_max < self.target_pages_min {
            self.target_pages_max = self.target_pages_min;
        }

        if update.prompt_chapter_system.is_some() {
            self.prompt_chapter_system = update.prompt_chapter_system;
        }
        if update.prompt_toc_rules.is_some() {
            self.prompt_toc_rules = update.prompt_toc_rules;
        }
        if update.prompt_value_system.is_some() {
            self.prompt_value_system = update.prompt_value_system;
        }
        if update.prompt_marketing_system.is_some() {
            self.prompt_marketing_system = update.prompt_marketing_system;
        }
    }

    /// 프롬프트 오버라이드 초기화
    pub fn reset_prompts(&mut self) {
        self.prompt_chapter_system = None;
        self.prompt_toc_rules = None;
        self.prompt_value_system = None;
        self.prompt_marketing_system = None;
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

// ============================================================================
// Config Update (설정 API 허용 키)
// ============================================================================

/// 설정 API로 들어오는 부분 업데이트
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub model: Option<String>,
    pub pdf_font: Option<String>,
    pub pdf_font_size: Option<f32>,
    pub pdf_heading_size: Option<f32>,
    pub pdf_subheading_size: Option<f32>,
    pub pdf_line_spacing: Option<f32>,
    pub pdf_margin_top: Option<f32>,
    pub pdf_margin_bottom: Option<f32>,
    pub pdf_margin_left: Option<f32>,
    pub pdf_margin_right: Option<f32>,
    pub target_pages_min: Option<u32>,
    pub target_pages_max: Option<u32>,
    pub prompt_chapter_system: Option<String>,
    pub prompt_toc_rules: Option<String>,
    pub prompt_value_system: Option<String>,
    pub prompt_marketing_system: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

fn default_version() -> u32 {
    1
}

fn default_model() -> String {
    "gpt-5-codex".to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_max_attempts() -> u32 {
    3
}

fn default_target_pages_min() -> u32 {
    100
}

fn default_target_pages_max() -> u32 {
    150
}

fn default_context_char_budget() -> usize {
    12_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: BookForgeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BookForgeConfig::default());
        assert_eq!(config.model, "gpt-5-codex");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.pdf.font_size, 11.0);
    }

    #[test]
    fn test_merge_only_present_fields() {
        let mut config = BookForgeConfig::default();
        config.merge(ConfigUpdate {
            model: Some("gpt-5".into()),
            pdf_font_size: Some(12.0),
            prompt_toc_rules: Some("12개 챕터".into()),
            ..Default::default()
        });

        assert_eq!(config.model, "gpt-5");
        assert_eq!(config.pdf.font_size, 12.0);
        assert_eq!(config.pdf.heading_size, 16.0);
        assert_eq!(config.prompts().toc_rules, "12개 챕터");
        assert_eq!(config.target_pages_min, 100);
    }

    #[test]
    fn test_merge_keeps_page_range_ordered() {
        let mut config = BookForgeConfig::default();
        config.merge(ConfigUpdate {
            target_pages_min: Some(200),
            ..Default::default()
        });
        assert!(config.target_pages_max >= config.target_pages_min);
    }

    #[test]
    fn test_reset_prompts() {
        let mut config = BookForgeConfig::default();
        config.prompt_value_system = Some("custom".into());
        config.reset_prompts();
        assert_eq!(
            config.prompts().value_system,
            DefaultPrompts::default().value_system
        );
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let config = BookForgeConfig::new().model("gpt-5-mini");
        config.save(&store).unwrap();

        let loaded = BookForgeConfig::load(&store);
        assert_eq!(loaded.model, "gpt-5-mini");
        assert_eq!(loaded.resolve_output_dir(&store), dir.path().join("output"));
    }
}
