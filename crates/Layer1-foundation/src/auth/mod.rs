//! Auth gate - 로그인 상태 확인
//!
//! 브라우저 로그인 핸드셰이크는 외부에서 처리하고 토큰 파일만 남긴다.
//! 여기서는 그 파일을 읽어 "로그인 됨" 여부와 호출용 자격 증명을 제공한다.

use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};

/// 토큰 파일명
pub const TOKEN_FILE: &str = "token_data.json";

/// 만료 전 여유 시간 (초)
const EXPIRY_MARGIN_SECS: f64 = 300.0;

/// AI 호출에 사용할 자격 증명
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub account_id: Option<String>,
}

/// 로그인 상태 조회 인터페이스
///
/// 실제 생성 요청은 `is_logged_in()`이 true일 때만 허용된다.
pub trait AuthGate: Send + Sync {
    /// 현재 유효한 자격 증명
    fn credentials(&self) -> Option<Credentials>;

    fn is_logged_in(&self) -> bool {
        self.credentials().is_some()
    }
}

// ============================================================================
// Token file
// ============================================================================

/// 저장된 토큰 데이터
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenData {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default = "default_expires_in")]
    pub expires_in: f64,

    /// 저장 시각 (unix seconds)
    #[serde(default)]
    pub saved_at: f64,

    #[serde(default)]
    pub account_id: Option<String>,
}

fn default_expires_in() -> f64 {
    3600.0
}

impl TokenData {
    /// 주어진 시각 기준 유효 여부
    pub fn is_valid_at(&self, now_secs: f64) -> bool {
        match &self.access_token {
            Some(token) if !token.is_empty() => {
                now_secs < self.saved_at + self.expires_in - EXPIRY_MARGIN_SECS
            }
            _ => false,
        }
    }
}

/// 로그인 상태 요약
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginStatus {
    pub logged_in: bool,
    pub has_refresh: bool,
    pub expired: bool,
}

/// 토큰 파일 기반 AuthGate
#[derive(Debug, Clone)]
pub struct TokenStore {
    store: JsonStore,
}

impl TokenStore {
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Option<TokenData> {
        match self.store.load_optional::<TokenData>(TOKEN_FILE) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Ignoring unreadable token file: {}", e);
                None
            }
        }
    }

    /// 토큰 저장 (저장 시각 갱신)
    pub fn save(&self, mut data: TokenData) -> Result<()> {
        data.saved_at = now_secs();
        self.store.save(TOKEN_FILE, &data)
    }

    /// 로그아웃
    pub fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_FILE)
    }

    pub fn status(&self) -> LoginStatus {
        match self.load() {
            None => LoginStatus {
                logged_in: false,
                has_refresh: false,
                expired: false,
            },
            Some(data) => {
                let valid = data.is_valid_at(now_secs());
                LoginStatus {
                    logged_in: valid,
                    has_refresh: data.refresh_token.is_some(),
                    expired: !valid,
                }
            }
        }
    }
}

impl AuthGate for TokenStore {
    fn credentials(&self) -> Option<Credentials> {
        let data = self.load()?;
        if !data.is_valid_at(now_secs()) {
            return None;
        }
        Some(Credentials {
            access_token: data.access_token?,
            account_id: data.account_id,
        })
    }
}

// ============================================================================
// Static gate (테스트 / 고정 토큰)
// ============================================================================

/// 고정된 상태를 반환하는 AuthGate
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    credentials: Option<Credentials>,
}

impl StaticAuth {
    pub fn logged_in(token: impl Into<String>) -> Self {
        Self {
            credentials: Some(Credentials {
                access_token: token.into(),
                account_id: None,
            }),
        }
    }

    pub fn logged_out() -> Self {
        Self { credentials: None }
    }
}

impl AuthGate for StaticAuth {
    fn credentials(&self) -> Option<Credentials> {
        self.credentials.clone()
    }
}

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_validity_window() {
        let data = TokenData {
            access_token: Some("tok".into()),
            expires_in: 3600.0,
            saved_at: 1000.0,
            ..Default::default()
        };
        assert!(data.is_valid_at(1000.0));
        assert!(data.is_valid_at(4299.0));
        // 만료 5분 전부터는 무효
        assert!(!data.is_valid_at(4300.0));

        let empty = TokenData {
            access_token: Some(String::new()),
            saved_at: 1000.0,
            ..Default::default()
        };
        assert!(!empty.is_valid_at(1000.0));
    }

    #[test]
    fn test_token_store_gate() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new(JsonStore::new(dir.path()));
        assert!(!tokens.is_logged_in());
        assert!(!tokens.status().logged_in);

        tokens
            .save(TokenData {
                access_token: Some("abc".into()),
                account_id: Some("acct".into()),
                expires_in: 3600.0,
                ..Default::default()
            })
            .unwrap();

        let creds = tokens.credentials().unwrap();
        assert_eq!(creds.access_token, "abc");
        assert_eq!(creds.account_id.as_deref(), Some("acct"));

        tokens.clear().unwrap();
        assert!(!tokens.is_logged_in());
    }

    #[test]
    fn test_expired_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        store
            .save(
                TOKEN_FILE,
                &serde_json::json!({"access_token": "old", "saved_at": 0.0, "refresh_token": "r"}),
            )
            .unwrap();

        let tokens = TokenStore::new(store);
        let status = tokens.status();
        assert!(!status.logged_in);
        assert!(status.expired);
        assert!(status.has_refresh);
    }

    #[test]
    fn test_static_auth() {
        assert!(StaticAuth::logged_in("t").is_logged_in());
        assert!(!StaticAuth::logged_out().is_logged_in());
    }
}
