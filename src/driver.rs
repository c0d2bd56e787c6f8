//! 일괄 변환 드라이버
//!
//! 소스 트리를 탐색해 후보 파일을 모으고, 변환은 rayon으로 병렬 실행한 뒤
//! 출력 쓰기와 통계 반영은 정렬된 경로 순서대로 메인 스레드에서 수행합니다.
//! 파일 단위 실패는 기록만 하고 일괄 처리를 중단하지 않습니다.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use crate::error::{ConvertError, Result};
use crate::pattern::PatternMatcher;
use crate::processor::{
    output_path, process_file, write_document, written_len, Outcome, ProcessOptions,
    ProcessResult, DEFAULT_MMAP_THRESHOLD,
};
use crate::router::RuleTable;
use crate::stats::RunStats;

/// 실행 옵션
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 쓰기만 생략 (통계는 동일)
    pub dry_run: bool,
    /// 파일별 성공/실패 출력
    pub verbose: bool,
    /// 진행률 표시 생략
    pub quiet: bool,
    /// 최대 폴더 탐색 깊이
    pub max_depth: Option<usize>,
    /// 파일 이름 필터
    pub name_filter: PatternMatcher,
    /// 대용량 파일 임계값
    pub mmap_threshold: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            verbose: false,
            quiet: false,
            max_depth: None,
            name_filter: PatternMatcher::default(),
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

impl RunOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 드라이런 설정
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 상세 출력 설정
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// 조용한 모드 설정
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// 최대 깊이 설정
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 파일 이름 필터 설정
    pub fn with_name_filter(mut self, name_filter: PatternMatcher) -> Self {
        self.name_filter = name_filter;
        self
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, bytes: u64) -> Self {
        self.mmap_threshold = bytes;
        self
    }
}

/// 입력 폴더 확인
pub fn validate_source(source_root: &Path) -> Result<()> {
    if !source_root.exists() {
        return Err(ConvertError::SourceNotFound {
            path: source_root.to_path_buf(),
        });
    }
    if !source_root.is_dir() {
        return Err(ConvertError::NotADirectory {
            path: source_root.to_path_buf(),
        });
    }
    Ok(())
}

/// JSON 파일 수집 (이름순 정렬)
pub fn collect_json_files(
    source_root: &Path,
    max_depth: Option<usize>,
    name_filter: &PatternMatcher,
) -> Vec<PathBuf> {
    let walker = WalkDir::new(source_root).sort_by_file_name();
    let walker = match max_depth {
        Some(depth) => walker.max_depth(depth),
        None => walker,
    };

    walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| s.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|s| s.to_str())
                .map(|s| name_filter.matches(s))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// 소스 트리 전체 변환
///
/// 소스 루트가 없거나 폴더가 아닐 때만 `Err`를 반환합니다.
pub fn run(
    source_root: &Path,
    output_root: &Path,
    rules: &RuleTable,
    options: &RunOptions,
) -> Result<RunStats> {
    validate_source(source_root)?;
    let started = Instant::now();

    let files = collect_json_files(source_root, options.max_depth, &options.name_filter);
    tracing::info!(
        source = %source_root.display(),
        files = files.len(),
        rules = rules.len(),
        dry_run = options.dry_run,
        "변환 시작"
    );

    let pb = create_progress_bar(files.len(), options.quiet);
    let process_options = ProcessOptions::new().with_mmap_threshold(options.mmap_threshold);

    let results: Vec<ProcessResult> = files
        .into_par_iter()
        .map(|path| {
            let result = process_file(path, source_root, rules, &process_options);
            pb.inc(1);
            result
        })
        .collect();

    pb.finish_and_clear();

    let mut stats = RunStats::new();
    let mut written: HashSet<PathBuf> = HashSet::new();

    for result in results {
        match result.outcome {
            Outcome::Converted { document, json } => {
                let target = output_path(output_root, &document, &result.relative);
                if !written.insert(target.clone()) {
                    tracing::warn!(
                        file = %result.relative,
                        output = %target.display(),
                        "출력 경로 충돌: 이전 문서를 덮어씁니다"
                    );
                }

                let bytes = if options.dry_run {
                    Ok(written_len(&json))
                } else {
                    write_document(&target, &json)
                };

                match bytes {
                    Ok(bytes) => {
                        stats.record_converted(document.collection, result.file_size, bytes);
                        if options.verbose {
                            println!(
                                "  {} {} → {}",
                                "✓".green(),
                                result.relative,
                                document.collection
                            );
                        }
                    }
                    Err(e) => {
                        tracing::warn!(file = %result.relative, error = %e, "쓰기 실패");
                        report_failure(options, &result.relative, &e.to_string());
                        stats.record_error(&result.relative, e.to_string());
                    }
                }
            }
            Outcome::Skipped => stats.record_skipped(result.file_size),
            Outcome::Unmapped { directory } => {
                tracing::debug!(file = %result.relative, "일치하는 규칙 없음");
                stats.record_unmapped(&directory, result.file_size);
            }
            Outcome::Failed { error } => {
                report_failure(options, &result.relative, &error);
                stats.record_error(&result.relative, error);
            }
        }
    }

    stats.elapsed = started.elapsed();
    tracing::info!(
        processed = stats.processed,
        converted = stats.converted,
        skipped = stats.skipped,
        unmapped = stats.unmapped,
        errors = stats.error_count(),
        "변환 종료"
    );

    Ok(stats)
}

fn report_failure(options: &RunOptions, relative: &str, error: &str) {
    if options.verbose {
        println!("  {} {}", "✗".red(), relative);
        println!("    {}", error.dimmed());
    }
}

/// 진행률 바 생성
fn create_progress_bar(total: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("█▓▒░"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_json(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_collect_json_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_json(temp_dir.path(), "b.json", r#"{"id": 1}"#);
        create_test_json(temp_dir.path(), "a.JSON", r#"{"id": 2}"#);
        create_test_json(temp_dir.path(), "other.txt", "not json");

        let files = collect_json_files(temp_dir.path(), None, &PatternMatcher::default());

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.JSON"));
    }

    #[test]
    fn test_collect_json_files_with_pattern() {
        let temp_dir = TempDir::new().unwrap();
        create_test_json(temp_dir.path(), "mostri/drago-rosso.json", "{}");
        create_test_json(temp_dir.path(), "mostri/drago-blu.json", "{}");
        create_test_json(temp_dir.path(), "mostri/goblin.json", "{}");

        let filter = PatternMatcher::new(Some("drago*".to_string())).unwrap();
        let files = collect_json_files(temp_dir.path(), None, &filter);

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_max_depth() {
        let temp_dir = TempDir::new().unwrap();
        create_test_json(temp_dir.path(), "root.json", "{}");
        create_test_json(temp_dir.path(), "subdir/level1.json", "{}");
        create_test_json(temp_dir.path(), "subdir/deep/level2.json", "{}");

        // depth 0 = 루트 폴더, 2 = 한 단계 아래 파일까지
        let files = collect_json_files(temp_dir.path(), Some(2), &PatternMatcher::default());

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        let result = run(
            &missing,
            temp_dir.path(),
            &RuleTable::default_rules(),
            &RunOptions::new().with_quiet(true),
        );
        assert!(matches!(result, Err(ConvertError::SourceNotFound { .. })));

        let file = create_test_json(temp_dir.path(), "file.json", "{}");
        let result = run(
            &file,
            temp_dir.path(),
            &RuleTable::default_rules(),
            &RunOptions::new().with_quiet(true),
        );
        assert!(matches!(result, Err(ConvertError::NotADirectory { .. })));
    }

    #[test]
    fn test_output_collision_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        create_test_json(&source, "mostri/goblin.json", r#"{"nome": "Goblin A"}"#);
        create_test_json(&source, "mostri/varianti/goblin.json", r#"{"nome": "Goblin B"}"#);

        let output = temp_dir.path().join("out");
        let stats = run(
            &source,
            &output,
            &RuleTable::default_rules(),
            &RunOptions::new().with_quiet(true),
        )
        .unwrap();

        assert_eq!(stats.converted, 2);
        let written = fs::read_to_string(output.join("actors").join("goblin.json")).unwrap();
        assert!(written.contains("Goblin B"));
    }
}
