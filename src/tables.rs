//! 게임 규칙 고정 테이블
//!
//! 도전 지수(CR)별 숙련 보너스/경험치, 크기별 토큰 크기.

use crate::units::parse_number;

/// CR → 경험치 (분수 CR은 0.125/0.25/0.5 키)
pub const CR_XP: [(f64, u32); 34] = [
    (0.0, 10),
    (0.125, 25),
    (0.25, 50),
    (0.5, 100),
    (1.0, 200),
    (2.0, 450),
    (3.0, 700),
    (4.0, 1100),
    (5.0, 1800),
    (6.0, 2300),
    (7.0, 2900),
    (8.0, 3900),
    (9.0, 5000),
    (10.0, 5900),
    (11.0, 7200),
    (12.0, 8400),
    (13.0, 10000),
    (14.0, 11500),
    (15.0, 13000),
    (16.0, 15000),
    (17.0, 18000),
    (18.0, 20000),
    (19.0, 22000),
    (20.0, 25000),
    (21.0, 33000),
    (22.0, 41000),
    (23.0, 50000),
    (24.0, 62000),
    (25.0, 75000),
    (26.0, 90000),
    (27.0, 105000),
    (28.0, 120000),
    (29.0, 135000),
    (30.0, 155000),
];

/// CR 문자열 해석
///
/// `1/8`, `1/4`, `1/2` 같은 분수, `0,5` 같은 소수, `2 (450 PE)` 같은 꼬리표를 허용합니다.
///
/// # Examples
/// ```
/// use vttconvert::tables::parse_cr;
///
/// assert_eq!(parse_cr("1/4"), Some(0.25));
/// assert_eq!(parse_cr("5 (1.800 PE)"), Some(5.0));
/// ```
pub fn parse_cr(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let head = trimmed.split_whitespace().next().unwrap_or(trimmed);
    if let Some((num, den)) = head.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(num / den);
    }
    parse_number(head)
}

/// CR을 표의 키로 정규화 (가장 가까운 표 항목)
pub fn normalize_cr(cr: f64) -> f64 {
    if !cr.is_finite() || cr <= 0.0 {
        return 0.0;
    }
    CR_XP
        .iter()
        .map(|(key, _)| *key)
        .min_by(|a, b| (a - cr).abs().total_cmp(&(b - cr).abs()))
        .unwrap_or(0.0)
}

/// CR별 경험치
pub fn xp_for_cr(cr: f64) -> u32 {
    let key = normalize_cr(cr);
    CR_XP
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, xp)| *xp)
        .unwrap_or(10)
}

/// CR별 숙련 보너스 (레벨이 아니라 CR 단계에서 파생)
pub fn proficiency_for_cr(cr: f64) -> i64 {
    let cr = normalize_cr(cr);
    match cr {
        c if c < 5.0 => 2,
        c if c < 9.0 => 3,
        c if c < 13.0 => 4,
        c if c < 17.0 => 5,
        c if c < 21.0 => 6,
        c if c < 25.0 => 7,
        c if c < 29.0 => 8,
        _ => 9,
    }
}

/// 크기 코드별 토큰 크기 (격자 칸)
pub fn token_footprint(size: &str) -> f64 {
    match size {
        "tiny" => 0.5,
        "lg" => 2.0,
        "huge" => 3.0,
        "grg" => 4.0,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cr_variants() {
        assert_eq!(parse_cr("0"), Some(0.0));
        assert_eq!(parse_cr("1/8"), Some(0.125));
        assert_eq!(parse_cr("1/2"), Some(0.5));
        assert_eq!(parse_cr("0,5"), Some(0.5));
        assert_eq!(parse_cr("17"), Some(17.0));
        assert_eq!(parse_cr("1/0"), None);
        assert_eq!(parse_cr("sconosciuto"), None);
    }

    #[test]
    fn test_xp_table_covers_full_range() {
        assert_eq!(xp_for_cr(0.0), 10);
        assert_eq!(xp_for_cr(0.125), 25);
        assert_eq!(xp_for_cr(0.25), 50);
        assert_eq!(xp_for_cr(0.5), 100);
        assert_eq!(xp_for_cr(1.0), 200);
        assert_eq!(xp_for_cr(10.0), 5900);
        assert_eq!(xp_for_cr(30.0), 155000);
    }

    #[test]
    fn test_proficiency_steps() {
        assert_eq!(proficiency_for_cr(0.25), 2);
        assert_eq!(proficiency_for_cr(4.0), 2);
        assert_eq!(proficiency_for_cr(5.0), 3);
        assert_eq!(proficiency_for_cr(12.0), 4);
        assert_eq!(proficiency_for_cr(13.0), 5);
        assert_eq!(proficiency_for_cr(20.0), 6);
        assert_eq!(proficiency_for_cr(24.0), 7);
        assert_eq!(proficiency_for_cr(28.0), 8);
        assert_eq!(proficiency_for_cr(30.0), 9);
    }

    #[test]
    fn test_out_of_range_cr_clamps() {
        assert_eq!(normalize_cr(-3.0), 0.0);
        assert_eq!(normalize_cr(45.0), 30.0);
        assert_eq!(xp_for_cr(f64::NAN), 10);
    }

    #[test]
    fn test_token_footprint() {
        assert_eq!(token_footprint("tiny"), 0.5);
        assert_eq!(token_footprint("med"), 1.0);
        assert_eq!(token_footprint("grg"), 4.0);
        assert_eq!(token_footprint("???"), 1.0);
    }
}
