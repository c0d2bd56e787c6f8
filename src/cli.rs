//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::Parser;
use std::path::PathBuf;

use crate::driver::RunOptions;
use crate::error::Result;
use crate::pattern::PatternMatcher;

/// vttconvert CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "vttconvert",
    author = "YourName <your@email.com>",
    version,
    about = "VTT COMPENDIUM CONVERTER - 이탈리아어 TRPG 콘텐츠 JSON 트리를 VTT 임포트용 문서로 변환하는 CLI 도구",
    long_about = r#"
VTT COMPENDIUM CONVERTER
========================

이탈리아어로 작성된 TRPG 콘텐츠 JSON 폴더(몬스터, 주문, 무기, 방어구,
마법 물품, 재주, 배경, 클래스, 하위 클래스, 일지, 표)를 탐색하여
VTT 임포트용 문서를 컬렉션별 폴더에 저장합니다.

특징:
  • 경로 기반 라우팅 (처음 일치한 규칙 사용)
  • 병렬 변환, 파일 단위 오류 격리
  • 결정적 ID (같은 경로 + 같은 내용 → 같은 출력)
  • 미터 → 피트, 화폐 → 금화, kg → 파운드 변환

예제:
  vttconvert -i ./compendio -o ./output
  vttconvert -i ./compendio --dry-run --verbose
  vttconvert -i ./compendio -p "drago*" -j 4
  vttconvert -i ./compendio --rules regole.json --log errori.log
"#
)]
pub struct Args {
    /// 소스 JSON 트리 루트 폴더
    #[arg(short, long)]
    pub input: PathBuf,

    /// 출력 루트 폴더 (기본값: output)
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// 파일을 쓰지 않고 통계만 계산
    #[arg(long)]
    pub dry_run: bool,

    /// 파일별 성공/실패 출력
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// 헤더와 진행률 표시 생략
    #[arg(short, long)]
    pub quiet: bool,

    /// 라우팅 규칙 JSON 파일 (기본 규칙 대체)
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// 파일 이름 패턴 필터 (glob 형식, 예: "drago*", "??-*.json")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 병렬 처리 스레드 수 (기본값: CPU 코어 수)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// 최대 폴더 탐색 깊이
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// 보고서에 표시할 최대 에러 수
    #[arg(long, default_value_t = 20)]
    pub max_errors: usize,

    /// 전체 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,
}

impl Args {
    /// 실행 옵션 생성
    pub fn run_options(&self) -> Result<RunOptions> {
        Ok(RunOptions::new()
            .with_dry_run(self.dry_run)
            .with_verbose(self.verbose)
            .with_quiet(self.quiet)
            .with_max_depth(self.max_depth)
            .with_name_filter(PatternMatcher::new(self.pattern.clone())?))
    }

    /// 로그 필터 기본값 (`RUST_LOG`가 없을 때)
    pub fn default_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["vttconvert", "-i", "dati"]);
        assert_eq!(args.output, PathBuf::from("output"));
        assert_eq!(args.max_errors, 20);
        assert!(!args.dry_run);
        assert_eq!(args.default_log_level(), "warn");
    }

    #[test]
    fn test_run_options_from_flags() {
        let args = Args::parse_from([
            "vttconvert",
            "-i",
            "dati",
            "--dry-run",
            "-v",
            "-p",
            "drago*",
            "--max-depth",
            "3",
        ]);
        let options = args.run_options().unwrap();
        assert!(options.dry_run);
        assert!(options.verbose);
        assert_eq!(options.max_depth, Some(3));
        assert!(options.name_filter.matches("drago-rosso.json"));
        assert_eq!(args.default_log_level(), "debug");
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["vttconvert", "-i", "x", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        let args = Args::parse_from(["vttconvert", "-i", "x", "-p", "[abc"]);
        assert!(args.run_options().is_err());
    }
}
