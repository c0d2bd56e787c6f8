//! vttconvert - VTT COMPENDIUM CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use vttconvert::{
    cli::Args,
    driver,
    router::RuleTable,
    stats::{FileError, RunStats},
    ConvertError,
};

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args);

    // 스레드 풀 설정
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| ConvertError::ThreadPool {
                reason: e.to_string(),
            })?;
    }

    let rules = match args.rules {
        Some(ref path) => RuleTable::from_json_file(path)?,
        None => RuleTable::default_rules(),
    };
    let options = args.run_options()?;

    if !args.quiet {
        print_header(&args, rules.len());
    }

    let stats = driver::run(&args.input, &args.output, &rules, &options)?;
    finish(&args, &stats)
}

/// 요약, 에러 로그, 완료 메시지 (처리 파일이 없어도 항상 출력)
fn finish(args: &Args, stats: &RunStats) -> Result<()> {
    if stats.processed == 0 {
        println!("{}", "⚠️ 처리할 JSON 파일이 없습니다.".yellow());
    }

    stats.print_summary(args.max_errors, args.dry_run);

    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &stats.errors)
            .with_context(|| format!("에러 로그 저장 실패: {:?}", log_path))?;
        println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);
    }

    if args.dry_run {
        println!("\n{} 드라이런 완료 (파일 저장 없음)\n", "ℹ️".bright_blue());
    } else {
        println!("\n{} 저장 완료: {:?}\n", "✅".bright_green(), args.output);
    }

    Ok(())
}

/// 진단 로그 초기화 (stderr, `RUST_LOG` 우선)
fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 헤더 출력
fn print_header(args: &Args, rule_count: usize) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!(
        "{}",
        " 🚀 VTT COMPENDIUM CONVERTER".bright_white().bold()
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input);
    println!("  {} 출력 폴더: {:?}", "📄".bright_green(), args.output);

    match args.rules {
        Some(ref path) => println!(
            "  {} 규칙 파일: {:?} ({}개)",
            "⚙️".bright_yellow(),
            path,
            rule_count
        ),
        None => println!("  {} 기본 규칙: {}개", "⚙️".bright_yellow(), rule_count),
    }

    if let Some(ref pattern) = args.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if let Some(depth) = args.max_depth {
        println!("  {} 최대 깊이: {}", "📏".bright_white(), depth);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (파일 저장 없음)".yellow()
        );
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("\n{}", "⚡ 변환 중...".bright_cyan());
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &Path, errors: &[FileError]) -> Result<()> {
    let mut log_file = File::create(log_path)?;

    writeln!(log_file, "vttconvert 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", chrono_now())?;
    writeln!(log_file, "총 에러 수: {}", errors.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for error in errors {
        writeln!(log_file, "\n파일: {}", error.file)?;
        writeln!(log_file, "에러: {}", error.message)?;
    }

    Ok(())
}

/// 현재 시간 문자열 반환
fn chrono_now() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now();
    let duration = now
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finish_with_no_files_still_writes_log() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("errori.log");
        let args = Args::parse_from([
            "vttconvert",
            "-i",
            temp_dir.path().to_str().unwrap(),
            "--dry-run",
            "--log",
            log_path.to_str().unwrap(),
        ]);
        let stats = RunStats::default();

        finish(&args, &stats).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("총 에러 수: 0"));
    }

    #[test]
    fn test_write_error_log() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("errori.log");
        let errors = vec![
            FileError {
                file: "mostri/rotto.json".to_string(),
                message: "JSON 파싱 실패".to_string(),
            },
            FileError {
                file: "incantesimi/lista.json".to_string(),
                message: "레코드 변환 실패".to_string(),
            },
        ];

        write_error_log(&log_path, &errors).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("총 에러 수: 2"));
        assert!(content.contains("파일: mostri/rotto.json"));
        assert!(content.contains("에러: 레코드 변환 실패"));
    }
}
