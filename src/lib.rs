//! vttconvert - VTT COMPENDIUM CONVERTER
//!
//! 이탈리아어로 작성된 TRPG 콘텐츠 JSON 트리(파일당 레코드 하나)를 읽어
//! VTT 콘텐츠 임포터가 받아들이는 정형 문서로 변환하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 🧭 **경로 라우팅**: 순서가 있는 glob 규칙 테이블, 처음 일치한 규칙 사용
//! - 🐉 **유형별 변환기**: 크리처, 주문, 무기/방어구/마법 물품, 배경, 범용
//! - 🔑 **결정적 ID**: 파일 이름 슬러그 + 상대 경로 해시
//! - 📏 **단위 정규화**: 미터 → 피트(5 단위 반올림), 화폐 → 금화, kg → 파운드
//! - 🚀 **병렬 처리**: Rayon으로 변환, 쓰기는 정렬된 순서대로
//! - 🛡️ **오류 격리**: 파일 단위 실패는 기록만 하고 계속 진행
//! - 🧪 **드라이런 모드**: 쓰기 없이 동일한 통계 계산
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법
//! vttconvert -i ./compendio -o ./output
//!
//! # 드라이런 + 파일별 출력
//! vttconvert -i ./compendio --dry-run --verbose
//!
//! # 사용자 규칙 파일
//! vttconvert -i ./compendio --rules regole.json
//! ```

pub mod cli;
pub mod converters;
pub mod dice;
pub mod document;
pub mod driver;
pub mod error;
pub mod ids;
pub mod pattern;
pub mod processor;
pub mod record;
pub mod router;
pub mod schema;
pub mod stats;
pub mod tables;
pub mod terms;
pub mod units;

// Re-exports for convenient access
pub use cli::Args;
pub use converters::{convert, ConverterKind};
pub use document::{Collection, DocType, Document};
pub use driver::{run, RunOptions};
pub use error::{ConvertError, Result};
pub use pattern::PatternMatcher;
pub use processor::{process_file, Outcome, ProcessOptions, ProcessResult};
pub use router::{Classification, Route, RuleTable};
pub use stats::{format_bytes, FileError, RunReport, RunStats};
