//! 패턴 매칭 모듈
//!
//! glob 패턴을 사용한 경로/파일 이름 매칭을 담당합니다.
//! 라우팅 규칙과 `--pattern` 파일 이름 필터가 같은 매처를 사용합니다.

use glob::{MatchOptions, Pattern};

use crate::error::{ConvertError, Result};

/// 경로 매칭 옵션
///
/// 대소문자를 구분하지 않으며 `*`가 `/`를 넘어 매칭될 수 있습니다.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// 컴파일된 패턴 매처
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    pattern: Option<Pattern>,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Arguments
    /// * `pattern` - 글로브 패턴 문자열 (None이면 모든 파일 매칭)
    ///
    /// # Examples
    /// ```
    /// use vttconvert::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(Some("*drago*".to_string())).unwrap();
    /// assert!(matcher.matches("drago-rosso-adulto.json"));
    /// assert!(!matcher.matches("goblin.json"));
    /// ```
    pub fn new(pattern: Option<String>) -> Result<Self> {
        let compiled = match pattern {
            Some(ref p) => Some(
                Pattern::new(p).map_err(|_| ConvertError::InvalidPattern { pattern: p.clone() })?,
            ),
            None => None,
        };

        Ok(Self { pattern: compiled })
    }

    /// 필수 패턴으로 매처 생성 (라우팅 규칙용)
    pub fn path(pattern: &str) -> Result<Self> {
        Self::new(Some(pattern.to_string()))
    }

    /// 경로 또는 파일 이름이 패턴과 일치하는지 확인
    ///
    /// 경로는 `/` 구분자로 정규화된 상대 경로여야 합니다.
    /// 패턴이 없으면 항상 true를 반환합니다.
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.pattern {
            Some(p) => p.matches_with(candidate, MATCH_OPTIONS),
            None => true,
        }
    }

    /// 패턴이 설정되어 있는지 확인
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }

    /// 원본 패턴 문자열
    pub fn as_str(&self) -> &str {
        self.pattern.as_ref().map(Pattern::as_str).unwrap_or("*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_pattern_matches_nested_files() {
        let matcher = PatternMatcher::path("mostri/**").unwrap();
        assert!(matcher.matches("mostri/goblin.json"));
        assert!(matcher.matches("mostri/draghi/drago-rosso.json"));
        assert!(!matcher.matches("incantesimi/palla-di-fuoco.json"));
    }

    #[test]
    fn test_any_depth_file_name() {
        let matcher = PatternMatcher::path("**/index.json").unwrap();
        assert!(matcher.matches("mostri/index.json"));
        assert!(matcher.matches("a/b/c/index.json"));
        assert!(!matcher.matches("mostri/indice.json"));
    }

    #[test]
    fn test_case_insensitive() {
        let matcher = PatternMatcher::path("mostri/**").unwrap();
        assert!(matcher.matches("Mostri/Goblin.JSON"));
    }

    #[test]
    fn test_single_segment_wildcard() {
        let matcher = PatternMatcher::path("classi/*/sottoclassi/**").unwrap();
        assert!(matcher.matches("classi/mago/sottoclassi/evocatore.json"));
        assert!(!matcher.matches("classi/mago.json"));
    }

    #[test]
    fn test_pattern_matcher_none() {
        let matcher = PatternMatcher::new(None).unwrap();
        assert!(matcher.matches("anything.json"));
        assert!(!matcher.has_pattern());
        assert_eq!(matcher.as_str(), "*");
    }

    #[test]
    fn test_pattern_matcher_invalid() {
        let result = PatternMatcher::new(Some("[invalid".to_string()));
        assert!(result.is_err());
    }
}
