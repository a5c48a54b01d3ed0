//! JSON 파일 저장소

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// 데이터 디렉토리 이름
pub const APP_DIR_NAME: &str = "bookforge";

/// JSON 설정 저장소
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// 글로벌 데이터 디렉토리 (~/.config/bookforge/)
    pub fn global() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot find config directory".to_string()))?
            .join(APP_DIR_NAME);
        Ok(Self::new(dir))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.base_dir.exists() {
            std::fs::create_dir_all(&self.base_dir)
                .map_err(|e| Error::Config(format!("Failed to create directory: {}", e)))?;
        }
        Ok(())
    }

    /// JSON 로드
    pub fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        let path = self.file_path(filename);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// JSON 로드 (기본값)
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, filename: &str) -> T {
        match self.load(filename) {
            Ok(value) => value,
            Err(e) => {
                if self.exists(filename) {
                    tracing::warn!("{}, using defaults", e);
                }
                T::default()
            }
        }
    }

    /// JSON 로드 (Optional)
    pub fn load_optional<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        if !self.exists(filename) {
            return Ok(None);
        }
        self.load(filename).map(Some)
    }

    /// JSON 저장
    pub fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        self.ensure_dir()?;
        let path = self.file_path(filename);
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| Error::Config(format!("Failed to serialize: {}", e)))?;
        std::fs::write(&path, content)
            .map_err(|e| Error::Config(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// 파일 존재 여부
    pub fn exists(&self, filename: &str) -> bool {
        self.file_path(filename).exists()
    }

    /// 파일 삭제
    pub fn remove(&self, filename: &str) -> Result<()> {
        let path = self.file_path(filename);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| {
                Error::Config(format!("Failed to remove {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested"));

        let sample = Sample {
            name: "책".into(),
            count: 3,
        };
        store.save("sample.json", &sample).unwrap();

        let loaded: Sample = store.load("sample.json").unwrap();
        assert_eq!(loaded, sample);
        assert!(store.exists("sample.json"));
    }

    #[test]
    fn test_optional_and_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let missing: Option<Sample> = store.load_optional("missing.json").unwrap();
        assert!(missing.is_none());

        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        let fallback: Sample = store.load_or_default("broken.json");
        assert_eq!(fallback, Sample::default());

        store.remove("broken.json").unwrap();
        assert!(!store.exists("broken.json"));
    }
}
