//! 에러 타입 정의 모듈
//!
//! vttconvert에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! 치명적 에러(실행 중단)와 파일 단위 에러(기록 후 계속)가 같은 열거형을 공유합니다.

use std::path::PathBuf;
use thiserror::Error;

/// vttconvert에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    SourceNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// JSON 파일 열기 실패
    #[error("파일을 열 수 없습니다 ({file}): {reason}")]
    FileOpen { file: PathBuf, reason: String },

    /// JSON 파싱 실패
    #[error("JSON 파싱 실패 ({file}): {reason}")]
    Parse { file: PathBuf, reason: String },

    /// 변환기가 레코드를 처리하지 못함
    #[error("레코드 변환 실패 ({file}): {reason}")]
    InvalidRecord { file: String, reason: String },

    /// JSON 직렬화 실패
    #[error("JSON 직렬화 실패 ({file}): {reason}")]
    Serialize { file: String, reason: String },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({file}): {reason}")]
    Write { file: PathBuf, reason: String },

    /// 스레드 풀 초기화 실패
    #[error("스레드 풀 초기화 실패: {reason}")]
    ThreadPool { reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 규칙 파일을 읽거나 해석할 수 없음
    #[error("규칙 파일 오류 ({file}): {reason}")]
    RulesFile { file: PathBuf, reason: String },
}

impl ConvertError {
    /// 변환기 내부 실패 생성
    pub fn invalid_record(file: &str, reason: impl Into<String>) -> Self {
        ConvertError::InvalidRecord {
            file: file.to_string(),
            reason: reason.into(),
        }
    }
}

/// vttconvert 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_pool_error_display() {
        let error = ConvertError::ThreadPool {
            reason: "The global thread pool has already been initialized.".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "스레드 풀 초기화 실패: The global thread pool has already been initialized."
        );

        let error: anyhow::Error = error.into();
        assert!(error.to_string().starts_with("스레드 풀 초기화 실패"));
    }
}
