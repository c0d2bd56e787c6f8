//! 통계 및 유틸리티 모듈
//!
//! 파일 단위 처리 결과를 모아 실행 통계(`RunStats`)로 축약하고,
//! 실행 보고서 출력 및 포맷팅을 담당합니다.

use colored::Colorize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::document::Collection;

/// 파일 단위 에러 기록
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    /// 소스 루트 기준 상대 경로
    pub file: String,
    pub message: String,
}

/// 실행 통계
///
/// 병렬 단계가 끝난 뒤 메인 스레드에서 결과를 순서대로 반영합니다.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// 후보 `.json` 파일 수
    pub processed: usize,
    pub converted: usize,
    pub skipped: usize,
    pub unmapped: usize,
    /// 읽은 총 바이트
    pub bytes_read: u64,
    /// 쓴 총 바이트 (드라이런이면 쓸 예정이던 바이트)
    pub bytes_written: u64,
    pub errors: Vec<FileError>,
    /// 규칙이 없는 폴더 (한 번씩만 기록)
    pub unmapped_dirs: BTreeSet<String>,
    /// 컬렉션별 변환 수
    pub per_collection: BTreeMap<Collection, usize>,
    /// 처리 시간
    pub elapsed: Duration,
}

/// 비교 가능한 실행 보고서 (처리 시간 제외)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub processed: usize,
    pub converted: usize,
    pub skipped: usize,
    pub unmapped: usize,
    pub error_count: usize,
    pub bytes_written: u64,
    /// 앞쪽 N개 에러
    pub errors: Vec<FileError>,
    pub unmapped_dirs: Vec<String>,
    pub per_collection: Vec<(Collection, usize)>,
}

impl RunStats {
    /// 새 통계 인스턴스 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 변환 성공 반영
    pub fn record_converted(&mut self, collection: Collection, bytes_read: u64, bytes_written: u64) {
        self.processed += 1;
        self.converted += 1;
        self.bytes_read += bytes_read;
        self.bytes_written += bytes_written;
        *self.per_collection.entry(collection).or_insert(0) += 1;
    }

    /// 건너뛴 파일 반영
    pub fn record_skipped(&mut self, bytes_read: u64) {
        self.processed += 1;
        self.skipped += 1;
        self.bytes_read += bytes_read;
    }

    /// 규칙 없는 파일 반영
    pub fn record_unmapped(&mut self, directory: &str, bytes_read: u64) {
        self.processed += 1;
        self.unmapped += 1;
        self.bytes_read += bytes_read;
        self.unmapped_dirs.insert(directory.to_string());
    }

    /// 파일 단위 에러 반영
    pub fn record_error(&mut self, file: &str, message: impl Into<String>) {
        self.processed += 1;
        self.errors.push(FileError {
            file: file.to_string(),
            message: message.into(),
        });
    }

    /// 에러 수 반환
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 보고서 생성 (에러는 앞쪽 `max_errors`개까지)
    pub fn report(&self, max_errors: usize) -> RunReport {
        RunReport {
            processed: self.processed,
            converted: self.converted,
            skipped: self.skipped,
            unmapped: self.unmapped,
            error_count: self.error_count(),
            bytes_written: self.bytes_written,
            errors: self.errors.iter().take(max_errors).cloned().collect(),
            unmapped_dirs: self.unmapped_dirs.iter().cloned().collect(),
            per_collection: self
                .per_collection
                .iter()
                .map(|(collection, count)| (*collection, *count))
                .collect(),
        }
    }

    /// 실행 통계 요약 출력
    pub fn print_summary(&self, max_errors: usize, dry_run: bool) {
        let errors = self.error_count();

        println!("\n{}", "═".repeat(50).bright_blue());
        if dry_run {
            println!("{}", " 📊 처리 통계 (드라이런)".bright_white().bold());
        } else {
            println!("{}", " 📊 처리 통계".bright_white().bold());
        }
        println!("{}", "═".repeat(50).bright_blue());

        println!("  {} 처리 파일:    {}", "📁".bright_cyan(), self.processed);
        println!(
            "  {} 변환:         {}",
            "✅".bright_green(),
            self.converted.to_string().green()
        );
        println!(
            "  {} 건너뜀:       {}",
            "⏭️".bright_white(),
            self.skipped.to_string().dimmed()
        );
        println!(
            "  {} 규칙 없음:    {}",
            "❔".bright_yellow(),
            self.unmapped.to_string().yellow()
        );

        if errors > 0 {
            println!(
                "  {} 실패:         {}",
                "❌".bright_red(),
                errors.to_string().red()
            );
        } else {
            println!("  {} 실패:         {}", "✅".bright_green(), "0".green());
        }

        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(self.bytes_read)
        );
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(self.bytes_written)
        );

        if self.processed > 0 {
            let success_rate = (self.converted as f64 / self.processed as f64) * 100.0;
            println!(
                "  {} 변환율:       {:.1}%",
                "📈".bright_white(),
                success_rate
            );
        }

        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed)
        );

        if !self.per_collection.is_empty() {
            println!("{}", "─".repeat(50).bright_blue());
            for (collection, count) in &self.per_collection {
                println!("  {} {:<10} {}", "📦".bright_cyan(), collection.as_str(), count);
            }
        }

        println!("{}", "═".repeat(50).bright_blue());

        if !self.unmapped_dirs.is_empty() {
            println!("\n{}", "❔ 규칙이 없는 폴더:".bright_yellow());
            for directory in &self.unmapped_dirs {
                println!("  {} {}", "•".yellow(), directory);
            }
        }

        if errors > 0 {
            println!("\n{}", "❌ 오류 발생 파일:".bright_red());
            for error in self.errors.iter().take(max_errors) {
                println!("  {} {}", "•".red(), error.file);
                println!("    {}", error.message.dimmed());
            }
            if errors > max_errors {
                println!(
                    "  {} 외 {}개",
                    "…".dimmed(),
                    (errors - max_errors).to_string().red()
                );
            }
        }
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Arguments
/// * `bytes` - 바이트 수
///
/// # Returns
/// 형식화된 문자열 (예: "1.25 MB")
///
/// # Examples
/// ```
/// use vttconvert::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}시간 {}분", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}분 {}초", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
