//! PDF / 문서 레이아웃 설정과 폰트 경로 탐색

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::bookforge::ConfigUpdate;

/// 이름 → 알려진 폰트 경로
const KNOWN_FONT_PATHS: &[(&str, &str)] = &[
    (
        "AppleGothic",
        "/System/Library/Fonts/Supplemental/AppleGothic.ttf",
    ),
    (
        "AppleMyungjo",
        "/System/Library/Fonts/Supplemental/AppleMyungjo.ttf",
    ),
    ("MalgunGothic", "C:/Windows/Fonts/malgun.ttf"),
    (
        "NanumGothic",
        "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
    ),
    (
        "NanumMyeongjo",
        "/usr/share/fonts/truetype/nanum/NanumMyeongjo.ttf",
    ),
    ("Malgun", "C:/Windows/Fonts/malgun.ttf"),
    ("Batang", "C:/Windows/Fonts/batang.ttc"),
    ("Gulim", "C:/Windows/Fonts/gulim.ttc"),
    (
        "AppleSDGothicNeo",
        "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    ),
];

/// 설정한 폰트가 없을 때 차례로 시도하는 한글 폰트
const FALLBACK_FONTS: &[&str] = &[
    "MalgunGothic",
    "Malgun",
    "Batang",
    "Gulim",
    "AppleGothic",
    "AppleMyungjo",
    "AppleSDGothicNeo",
    "NanumGothic",
    "NanumMyeongjo",
    "NotoSansKR",
    "UnDotum",
];

/// 탐색 대상 폰트 파일 확장자
const FONT_EXTENSIONS: &[&str] = &["ttf", "ttc", "otf"];

/// 폰트 디렉토리 탐색 깊이
const FONT_SCAN_DEPTH: usize = 3;

/// 문서 레이아웃 설정 (단위: pt)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfSettings {
    #[serde(default = "default_font_name")]
    pub font_name: String,

    /// 명시적 폰트 파일 경로 (탐색보다 우선)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,

    #[serde(default = "default_font_size")]
    pub font_size: f32,

    #[serde(default = "default_heading_size")]
    pub heading_size: f32,

    #[serde(default = "default_subheading_size")]
    pub subheading_size: f32,

    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,

    #[serde(default = "default_margin_vertical")]
    pub margin_top: f32,

    #[serde(default = "default_margin_vertical")]
    pub margin_bottom: f32,

    #[serde(default = "default_margin_horizontal")]
    pub margin_left: f32,

    #[serde(default = "default_margin_horizontal")]
    pub margin_right: f32,

    /// 설정 폰트가 없으면 시스템 한글 폰트를 차례로 시도
    #[serde(default = "default_font_fallback")]
    pub font_fallback: bool,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            font_name: default_font_name(),
            font_path: None,
            font_size: default_font_size(),
            heading_size: default_heading_size(),
            subheading_size: default_subheading_size(),
            line_spacing: default_line_spacing(),
            margin_top: default_margin_vertical(),
            margin_bottom: default_margin_vertical(),
            margin_left: default_margin_horizontal(),
            margin_right: default_margin_horizontal(),
            font_fallback: default_font_fallback(),
        }
    }
}

impl PdfSettings {
    pub(crate) fn merge(&mut self, update: &ConfigUpdate) {
        if let Some(font) = &update.pdf_font {
            self.font_name = font.clone();
            self.font_path = None;
        }
        merge_positive(&mut self.font_size, update.pdf_font_size);
        merge_positive(&mut self.heading_size, update.pdf_heading_size);
        merge_positive(&mut self.subheading_size, update.pdf_subheading_size);
        merge_positive(&mut self.line_spacing, update.pdf_line_spacing);
        merge_non_negative(&mut self.margin_top, update.pdf_margin_top);
        merge_non_negative(&mut self.margin_bottom, update.pdf_margin_bottom);
        merge_non_negative(&mut self.margin_left, update.pdf_margin_left);
        merge_non_negative(&mut self.margin_right, update.pdf_margin_right);
    }

    /// 첫 번째 폰트 후보
    pub fn resolve_font_path(&self) -> Option<PathBuf> {
        self.font_candidates().into_iter().next()
    }

    /// 폰트 파일 후보 (우선순위 순, 중복 없음)
    ///
    /// 1. 명시적 `font_path`
    /// 2. `font_name`: 알려진 경로 테이블, 이후 OS 폰트 디렉토리 탐색
    /// 3. `font_fallback`이면 한글 폰트 목록을 같은 방식으로
    ///
    /// 파일이 실제로 임베드 가능한지는 인코더가 판단한다.
    pub fn font_candidates(&self) -> Vec<PathBuf> {
        self.font_candidates_in(&font_search_dirs())
    }

    fn font_candidates_in(&self, search_dirs: &[PathBuf]) -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        let mut push = |path: PathBuf| {
            if !candidates.contains(&path) {
                candidates.push(path);
            }
        };

        if let Some(path) = &self.font_path {
            if path.is_file() {
                push(path.clone());
            } else {
                tracing::warn!("Configured font path not found: {}", path.display());
            }
        }

        let mut names = vec![self.font_name.as_str()];
        if self.font_fallback {
            names.extend(FALLBACK_FONTS.iter().copied());
        }

        for name in names {
            if let Some(path) = known_font_path(name) {
                push(path);
            }
            let needle = name.to_lowercase();
            if let Some(path) = search_dirs
                .iter()
                .find_map(|dir| scan_font_dir(dir, &needle, FONT_SCAN_DEPTH))
            {
                push(path);
            }
        }
        candidates
    }
}

fn known_font_path(name: &str) -> Option<PathBuf> {
    KNOWN_FONT_PATHS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, path)| Path::new(path))
        .filter(|path| path.is_file())
        .map(Path::to_path_buf)
}

fn merge_positive(target: &mut f32, value: Option<f32>) {
    if let Some(v) = value.filter(|v| v.is_finite() && *v > 0.0) {
        *target = v;
    }
}

fn merge_non_negative(target: &mut f32, value: Option<f32>) {
    if let Some(v) = value.filter(|v| v.is_finite() && *v >= 0.0) {
        *target = v;
    }
}

fn font_search_dirs() -> Vec<PathBuf> {
    let mut dirs_list: Vec<PathBuf> = vec![
        // macOS
        PathBuf::from("/System/Library/Fonts/Supplemental"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("/Library/Fonts"),
        // Windows
        PathBuf::from("C:/Windows/Fonts"),
        // Linux
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
    ];
    if let Some(home) = dirs::home_dir() {
        dirs_list.push(home.join("Library/Fonts"));
        dirs_list.push(home.join(".local/share/fonts"));
        dirs_list.push(home.join(".fonts"));
    }
    if let Some(data) = dirs::data_local_dir() {
        dirs_list.push(data.join("Microsoft/Windows/Fonts"));
    }
    dirs_list
}

fn scan_font_dir(dir: &Path, needle: &str, depth: usize) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    let mut files: Vec<PathBuf> = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else {
            files.push(path);
        }
    }

    // 디렉토리 순서에 따라 결과가 달라지지 않도록 정렬
    files.sort();
    subdirs.sort();

    let found = files.into_iter().find(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let is_font = FONT_EXTENSIONS
            .iter()
            .any(|ext| name.ends_with(&format!(".{}", ext)));
        is_font && name.contains(needle)
    });
    if found.is_some() || depth == 0 {
        return found;
    }

    subdirs
        .iter()
        .find_map(|sub| scan_font_dir(sub, needle, depth - 1))
}

// ============================================================================
// Defaults
// ============================================================================

fn default_font_name() -> String {
    if cfg!(target_os = "windows") {
        "MalgunGothic".to_string()
    } else if cfg!(target_os = "macos") {
        "AppleGothic".to_string()
    } else {
        "NanumGothic".to_string()
    }
}

fn default_font_fallback() -> bool {
    true
}

fn default_font_size() -> f32 {
    11.0
}

fn default_heading_size() -> f32 {
    16.0
}

fn default_subheading_size() -> f32 {
    13.0
}

fn default_line_spacing() -> f32 {
    1.6
}

fn default_margin_vertical() -> f32 {
    72.0
}

fn default_margin_horizontal() -> f32 {
    60.0
}
