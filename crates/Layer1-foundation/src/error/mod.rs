//! Error types for BookForge
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// BookForge 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 요청 관련 (동기 반환, 작업 생성 전)
    // ========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication required: {0}")]
    Auth(String),

    // ========================================================================
    // 생성 파이프라인 관련 (작업에 기록)
    // ========================================================================
    #[error("AI service error: {0}")]
    AiService(String),

    #[error("Content parse error: {0}")]
    ContentParse(String),

    #[error("Encoding error ({format}): {message}")]
    Encoding { format: String, message: String },

    #[error("Cancelled")]
    Cancelled,

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 제출 시점에 바로 반환되는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Auth(_) | Error::NotFound(_)
        )
    }

    /// Polling 클라이언트에게 보여줄 실패 분류 메시지
    ///
    /// 내부 세부사항(경로, 원본 응답 등)은 포함하지 않는다.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Validation(_) => "잘못된 요청입니다.",
            Error::Auth(_) => "ChatGPT 로그인이 필요합니다.",
            Error::AiService(_) => "AI 서비스 호출에 실패했습니다.",
            Error::ContentParse(_) => "AI 응답을 해석하지 못했습니다.",
            Error::Encoding { .. } => "문서 파일 생성에 실패했습니다.",
            Error::Cancelled => "작업이 취소되었습니다.",
            Error::Config(_) => "설정 오류가 발생했습니다.",
            Error::NotFound(_) => "작업을 찾을 수 없습니다.",
            Error::Io(_) => "출력 파일 저장에 실패했습니다.",
            Error::Json(_) | Error::Internal(_) => "내부 오류가 발생했습니다.",
        }
    }

    /// Encoding 에러 생성 헬퍼
    pub fn encoding(format: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Encoding {
            format: format.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_split() {
        assert!(Error::Validation("topic".into()).is_user_facing());
        assert!(Error::Auth("no token".into()).is_user_facing());
        assert!(!Error::AiService("timeout".into()).is_user_facing());
        assert!(!Error::encoding("pdf", "font").is_user_facing());
    }

    #[test]
    fn test_category_hides_details() {
        let err = Error::AiService("HTTP 500: upstream stack trace".into());
        assert!(!err.category().contains("stack"));

        let io = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/secret/path",
        ));
        assert!(!io.category().contains("/secret"));
    }
}
