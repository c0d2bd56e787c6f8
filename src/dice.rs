//! 주사위/피해 문자열 파싱 모듈
//!
//! 자유 텍스트에서 `(주사위 공식, 피해 유형)` 쌍, 명중 보너스, 내성 CD를 추출합니다.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::terms::{self, ABILITIES, DAMAGE_TYPES};

/// 구조화된 매칭이 없을 때 사용하는 피해 유형
pub const DEFAULT_DAMAGE_TYPE: &str = "bludgeoning";

/// `5 (1d6 + 2) danni taglienti`, `2d6+3 danni perforanti`, `1d4 perforanti`
static DAMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d+d\d+(?:\s*[+\-−]\s*\d+(?:d\d+)?)*)\s*\)?\s*(?:dann[oi]\s+)?(?:da\s+)?(\p{L}+)",
    )
    .unwrap()
});

/// 대체용 첫 주사위/숫자 토큰
static LEADING_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d+d\d+(?:\s*[+\-−]\s*\d+)?|\d+").unwrap());

/// `+4 al tiro per colpire`
static ATTACK_BONUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([+\-−])\s*(\d+)[^.\d]{0,24}colpire").unwrap());

/// `CD 13`
static SAVE_DC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bCD\s*(\d+)").unwrap());

/// 피해 부분: `[공식, 유형]` 배열로 직렬화
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamagePart(pub String, pub String);

impl DamagePart {
    /// 새 피해 부분 생성
    pub fn new(formula: impl Into<String>, damage_type: impl Into<String>) -> Self {
        Self(formula.into(), damage_type.into())
    }

    /// 주사위 공식
    pub fn formula(&self) -> &str {
        &self.0
    }

    /// 피해 유형 코드
    pub fn damage_type(&self) -> &str {
        &self.1
    }
}

/// 공식 정규화: 공백 제거, 유니코드 마이너스 치환, 소문자
pub fn normalize_formula(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '−' { '-' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// 구조화된 `(공식, 피해 단어)` 쌍만 추출
///
/// 피해 사전에 없는 단어와 짝지어진 공식은 건너뜁니다.
pub fn extract_damage_parts(text: &str) -> Vec<DamagePart> {
    DAMAGE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let formula = caps.get(1)?.as_str();
            let word = caps.get(2)?.as_str();
            let damage_type = terms::match_term(DAMAGE_TYPES, word)?;
            Some(DamagePart::new(normalize_formula(formula), damage_type))
        })
        .collect()
}

/// 피해 문자열 파싱 (항상 최소 한 개의 부분 반환)
///
/// 구조화된 매칭이 없으면 첫 주사위/숫자 토큰과 기본 피해 유형으로 대체합니다.
/// 빈 유형은 하위 도구에서 미설정 오류로 취급되므로 사용하지 않습니다.
///
/// # Examples
/// ```
/// use vttconvert::dice::{parse_damage, DamagePart};
///
/// assert_eq!(
///     parse_damage("2d6+3 danni perforanti"),
///     vec![DamagePart::new("2d6+3", "piercing")]
/// );
/// assert_eq!(parse_damage("???"), vec![DamagePart::new("", "bludgeoning")]);
/// ```
pub fn parse_damage(text: &str) -> Vec<DamagePart> {
    let parts = extract_damage_parts(text);
    if !parts.is_empty() {
        return parts;
    }
    let formula = leading_formula(text).unwrap_or_default();
    vec![DamagePart::new(formula, DEFAULT_DAMAGE_TYPE)]
}

/// 첫 주사위 공식 또는 숫자
pub fn leading_formula(text: &str) -> Option<String> {
    LEADING_TOKEN_RE
        .find(text)
        .map(|m| normalize_formula(m.as_str()))
}

/// 명중 보너스 (`+4 al tiro per colpire` → 4)
pub fn parse_attack_bonus(text: &str) -> Option<i64> {
    let caps = ATTACK_BONUS_RE.captures(text)?;
    let value: i64 = caps.get(2)?.as_str().parse().ok()?;
    match caps.get(1)?.as_str() {
        "+" => Some(value),
        _ => Some(-value),
    }
}

/// 내성 굴림 CD
pub fn parse_save_dc(text: &str) -> Option<u32> {
    SAVE_DC_RE.captures(text)?.get(1)?.as_str().parse().ok()
}

/// 내성 굴림 능력치 (`tiro salvezza su Destrezza` → dex)
///
/// 오탐을 줄이기 위해 "salvezza" 뒤의 짧은 구간에서 능력치 전체 이름만 찾습니다.
pub fn parse_save_ability(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let start = lower.find("salvezza")? + "salvezza".len();
    let window: String = lower[start..].chars().take(40).collect();
    terms::match_term(&ABILITIES[..6], &window)
}
