//! 파일 단위 처리 모듈
//!
//! 개별 JSON 파일의 읽기, 파싱, 경로 분류, 변환, 직렬화를 담당합니다.
//! 이 단계는 병렬로 실행되며 파일 시스템에 쓰지 않습니다.

use memmap2::Mmap;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::converters;
use crate::document::Document;
use crate::error::{ConvertError, Result};
use crate::ids::{file_stem, normalize_path};
use crate::router::{Classification, RuleTable};

/// 기본 메모리 매핑 임계값 (10MB)
pub const DEFAULT_MMAP_THRESHOLD: u64 = 10 * 1024 * 1024;

/// 파일 하나의 처리 결과
#[derive(Debug)]
pub enum Outcome {
    /// 변환 성공 (직렬화된 pretty JSON 포함)
    Converted { document: Box<Document>, json: String },
    /// 건너뛰기 규칙에 일치
    Skipped,
    /// 일치하는 규칙 없음
    Unmapped { directory: String },
    /// 읽기/파싱/변환/직렬화 실패
    Failed { error: String },
}

/// 파일 처리 결과
#[derive(Debug)]
pub struct ProcessResult {
    /// 처리된 파일 경로
    pub path: PathBuf,
    /// 소스 루트 기준 상대 경로 (`/` 구분자)
    pub relative: String,
    pub outcome: Outcome,
    /// 원본 파일 크기
    pub file_size: u64,
}

/// 파일 처리 옵션
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

impl ProcessOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, bytes: u64) -> Self {
        self.mmap_threshold = bytes;
        self
    }
}

/// 소스 루트 기준 상대 경로 키 생성
///
/// # Examples
/// ```
/// use std::path::Path;
/// use vttconvert::processor::relative_key;
///
/// let key = relative_key(Path::new("/data"), Path::new("/data/mostri/goblin.json"));
/// assert_eq!(key, "mostri/goblin.json");
/// ```
pub fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    normalize_path(&joined)
}

/// 단일 JSON 파일 처리
///
/// # Arguments
/// * `path` - 처리할 JSON 파일 경로
/// * `root` - 소스 루트 (상대 경로 계산용)
/// * `rules` - 라우팅 규칙
/// * `options` - 처리 옵션
pub fn process_file(
    path: PathBuf,
    root: &Path,
    rules: &RuleTable,
    options: &ProcessOptions,
) -> ProcessResult {
    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    let relative = relative_key(root, &path);

    let outcome = match process_file_internal(&path, &relative, file_size, rules, options) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(file = %relative, error = %e, "변환 실패");
            Outcome::Failed {
                error: e.to_string(),
            }
        }
    };

    ProcessResult {
        path,
        relative,
        outcome,
        file_size,
    }
}

/// 내부 파일 처리 로직
fn process_file_internal(
    path: &Path,
    relative: &str,
    file_size: u64,
    rules: &RuleTable,
    options: &ProcessOptions,
) -> Result<Outcome> {
    let record: Value = if file_size >= options.mmap_threshold {
        // 대용량 파일: 메모리 매핑 사용
        parse_with_mmap(path)?
    } else {
        parse_with_reader(path)?
    };

    let route = match rules.classify(relative) {
        Classification::Skip => return Ok(Outcome::Skipped),
        Classification::Unmapped => {
            return Ok(Outcome::Unmapped {
                directory: parent_directory(relative),
            })
        }
        Classification::Convert(route) => route,
    };

    let document = converters::convert(route.converter, route.doc_type, &record, relative)?;
    let json = document
        .to_pretty_json()
        .map_err(|e| ConvertError::Serialize {
            file: relative.to_string(),
            reason: e.to_string(),
        })?;

    tracing::debug!(
        file = %relative,
        converter = route.converter.as_str(),
        doc_type = %document.doc_type,
        "변환 완료"
    );

    Ok(Outcome::Converted {
        document: Box::new(document),
        json,
    })
}

/// 버퍼 리더를 사용한 JSON 파싱
fn parse_with_reader(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| ConvertError::FileOpen {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| ConvertError::Parse {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// 메모리 매핑을 사용한 JSON 파싱 (대용량 파일용)
fn parse_with_mmap(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| ConvertError::FileOpen {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mmap = unsafe {
        Mmap::map(&file).map_err(|e| ConvertError::FileOpen {
            file: path.to_path_buf(),
            reason: format!("메모리 매핑 실패: {}", e),
        })?
    };

    serde_json::from_slice(&mmap).map_err(|e| ConvertError::Parse {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// 상대 경로의 상위 폴더 (루트면 `.`)
fn parent_directory(relative: &str) -> String {
    match relative.rsplit_once('/') {
        Some((directory, _)) => directory.to_string(),
        None => ".".to_string(),
    }
}

/// 출력 파일 이름용 스템 정리
///
/// 영숫자, `-`, `_` 이외의 문자는 `_`로 바꾸고 비어 있으면 `doc`을 사용합니다.
///
/// # Examples
/// ```
/// use vttconvert::processor::sanitize_stem;
///
/// assert_eq!(sanitize_stem("mostri/Drago Rosso (adulto).json"), "Drago_Rosso__adulto_");
/// assert_eq!(sanitize_stem("armi/ascia.json"), "ascia");
/// ```
pub fn sanitize_stem(relative: &str) -> String {
    let stem: String = file_stem(relative)
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.trim_matches('_').is_empty() {
        "doc".to_string()
    } else {
        stem
    }
}

/// 출력 경로: `<output_root>/<collection>/<정리된 스템>.json`
pub fn output_path(output_root: &Path, document: &Document, relative: &str) -> PathBuf {
    output_root
        .join(document.collection.as_str())
        .join(format!("{}.json", sanitize_stem(relative)))
}

/// 직렬화된 문서를 파일로 저장하고 쓴 바이트 수 반환
pub fn write_document(path: &Path, json: &str) -> Result<u64> {
    let write_error = |reason: String| ConvertError::Write {
        file: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
    }

    let file = File::create(path).map_err(|e| write_error(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", json).map_err(|e| write_error(e.to_string()))?;
    writer.flush().map_err(|e| write_error(e.to_string()))?;

    Ok(written_len(json))
}

/// 개행 포함 기록 바이트 수 (드라이런 계산용)
pub fn written_len(json: &str) -> u64 {
    json.len() as u64 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_source(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_relative_key_uses_forward_slashes() {
        let root = Path::new("data");
        let path = root.join("mostri").join("draghi").join("rosso.json");
        assert_eq!(relative_key(root, &path), "mostri/draghi/rosso.json");
    }

    #[test]
    fn test_process_converted() {
        let temp = TempDir::new().unwrap();
        let path = write_source(temp.path(), "mostri/goblin.json", r#"{"nome": "Goblin"}"#);

        let result = process_file(
            path,
            temp.path(),
            &RuleTable::default_rules(),
            &ProcessOptions::new(),
        );
        assert_eq!(result.relative, "mostri/goblin.json");
        match result.outcome {
            Outcome::Converted { document, json } => {
                assert_eq!(document.name, "Goblin");
                assert!(json.contains("\"_id\""));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_process_skipped_and_unmapped() {
        let temp = TempDir::new().unwrap();
        let rules = RuleTable::default_rules();
        let options = ProcessOptions::new();

        let index = write_source(temp.path(), "mostri/index.json", "{}");
        let result = process_file(index, temp.path(), &rules, &options);
        assert!(matches!(result.outcome, Outcome::Skipped));

        let other = write_source(temp.path(), "varie/note/x.json", "{}");
        let result = process_file(other, temp.path(), &rules, &options);
        match result.outcome {
            Outcome::Unmapped { directory } => assert_eq!(directory, "varie/note"),
            other => panic!("unexpected {:?}", other),
        }

        let root_file = write_source(temp.path(), "solo.json", "{}");
        let result = process_file(root_file, temp.path(), &rules, &options);
        assert!(matches!(result.outcome, Outcome::Unmapped { ref directory } if directory == "."));
    }

    #[test]
    fn test_process_failures() {
        let temp = TempDir::new().unwrap();
        let rules = RuleTable::default_rules();
        let options = ProcessOptions::new();

        let broken = write_source(temp.path(), "mostri/rotto.json", r#"{"nome": "#);
        let result = process_file(broken, temp.path(), &rules, &options);
        assert!(matches!(result.outcome, Outcome::Failed { .. }));

        let array = write_source(temp.path(), "incantesimi/lista.json", "[1, 2]");
        let result = process_file(array, temp.path(), &rules, &options);
        match result.outcome {
            Outcome::Failed { error } => assert!(error.contains("incantesimi/lista.json")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mmap_path_matches_reader_path() {
        let temp = TempDir::new().unwrap();
        let rules = RuleTable::default_rules();
        let path = write_source(temp.path(), "armi/ascia.json", r#"{"nome": "Ascia"}"#);

        let small = process_file(path.clone(), temp.path(), &rules, &ProcessOptions::new());
        let mapped = process_file(
            path,
            temp.path(),
            &rules,
            &ProcessOptions::new().with_mmap_threshold(0),
        );
        match (small.outcome, mapped.outcome) {
            (Outcome::Converted { json: a, .. }, Outcome::Converted { json: b, .. }) => {
                assert_eq!(a, b)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_output_path_and_write() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), "src/incantesimi/01-luce.json", r#"{"nome": "Luce"}"#);
        let result = process_file(
            source,
            &temp.path().join("src"),
            &RuleTable::default_rules(),
            &ProcessOptions::new(),
        );
        let Outcome::Converted { document, json } = result.outcome else {
            panic!("not converted");
        };

        let out_root = temp.path().join("out");
        let target = output_path(&out_root, &document, &result.relative);
        assert_eq!(target, out_root.join("items").join("01-luce.json"));

        let bytes = write_document(&target, &json).unwrap();
        assert_eq!(bytes, written_len(&json));
        assert_eq!(fs::metadata(&target).unwrap().len(), bytes);
    }

    #[test]
    fn test_sanitize_stem_fallback() {
        assert_eq!(sanitize_stem("tabelle/???.json"), "doc");
        assert_eq!(sanitize_stem("mostri/orco-capo.json"), "orco-capo");
    }
}
