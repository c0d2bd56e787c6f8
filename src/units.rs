//! 단위 변환 모듈
//!
//! 이탈리아어 수량 문자열("9 metri", "15 mo", "1,5 kg")을 숫자로 읽어
//! 표준 단위(피트, 금화, 파운드)로 변환합니다.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::terms::{self, CURRENCIES};

/// 1,5 m = 5 ft 비율
pub const FEET_PER_METRE: f64 = 10.0 / 3.0;

/// 거리 반올림 단위 (피트)
pub const DISTANCE_STEP: f64 = 5.0;

/// 1 kg = 2 lb 비율
pub const POUNDS_PER_KILOGRAM: f64 = 2.0;

/// 이탈리아식 숫자: `1.500` (천 단위 점), `4,5` (소수 쉼표), `1.5`
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-?(?:\d{1,3}(?:\.\d{3})+(?:,\d+)?|\d+(?:[.,]\d+)?)").unwrap()
});

/// `24/96` 형태의 거리 쌍
static PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*/\s*(\d+(?:[.,]\d+)?)").unwrap());

/// 거리 단위
#[derive(Debug, Clone, Copy, PartialEq)]
enum DistanceUnit {
    Metres,
    Kilometres,
    Feet,
    Squares,
}

impl DistanceUnit {
    /// 숫자 바로 뒤의 단위 토큰만 본다
    fn detect(rest: &str) -> Self {
        let token: String = rest
            .trim_start()
            .chars()
            .take_while(|c| c.is_alphabetic())
            .collect::<String>()
            .to_lowercase();
        match token.as_str() {
            "km" => DistanceUnit::Kilometres,
            "ft" | "feet" => DistanceUnit::Feet,
            t if t.starts_with("chilometr") => DistanceUnit::Kilometres,
            t if t.starts_with("pied") => DistanceUnit::Feet,
            t if t.starts_with("quadrett") || t.starts_with("casell") => DistanceUnit::Squares,
            _ => DistanceUnit::Metres,
        }
    }

    fn to_feet(self, value: f64) -> u32 {
        match self {
            DistanceUnit::Metres => metres_to_feet(value),
            DistanceUnit::Kilometres => metres_to_feet(value * 1000.0),
            DistanceUnit::Feet => round_to_step(value),
            DistanceUnit::Squares => round_to_step(value * DISTANCE_STEP),
        }
    }
}

/// 화폐 단위
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denomination {
    Platinum,
    Gold,
    Electrum,
    Silver,
    Copper,
}

impl Denomination {
    /// 사전 코드에서 화폐 단위 조회
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pp" => Some(Denomination::Platinum),
            "gp" => Some(Denomination::Gold),
            "ep" => Some(Denomination::Electrum),
            "sp" => Some(Denomination::Silver),
            "cp" => Some(Denomination::Copper),
            _ => None,
        }
    }

    /// 금화 환산 비율
    pub fn gold_ratio(self) -> f64 {
        match self {
            Denomination::Platinum => 10.0,
            Denomination::Gold => 1.0,
            Denomination::Electrum => 0.5,
            Denomination::Silver => 0.1,
            Denomination::Copper => 0.01,
        }
    }
}

/// 문자열에서 첫 번째 숫자 추출
///
/// # Examples
/// ```
/// use vttconvert::units::parse_number;
///
/// assert_eq!(parse_number("9 metri"), Some(9.0));
/// assert_eq!(parse_number("1,5 kg"), Some(1.5));
/// assert_eq!(parse_number("1.500 mo"), Some(1500.0));
/// assert_eq!(parse_number("nessuno"), None);
/// ```
pub fn parse_number(text: &str) -> Option<f64> {
    NUMBER_RE
        .find(text)
        .and_then(|m| number_from_match(m.as_str()))
}

fn number_from_match(raw: &str) -> Option<f64> {
    let normalized = if raw.contains(',') {
        raw.replace('.', "").replace(',', ".")
    } else if raw.matches('.').count() == 1 && raw.split('.').nth(1).is_some_and(|d| d.len() != 3)
    {
        raw.to_string()
    } else {
        raw.replace('.', "")
    };
    normalized.parse().ok()
}

/// 가장 가까운 5피트 단위로 반올림
pub fn round_to_step(feet: f64) -> u32 {
    if feet <= 0.0 {
        return 0;
    }
    ((feet / DISTANCE_STEP).round() * DISTANCE_STEP) as u32
}

/// 미터를 피트로 변환 (5피트 단위 반올림)
///
/// # Examples
/// ```
/// use vttconvert::units::metres_to_feet;
///
/// assert_eq!(metres_to_feet(9.0), 30);
/// assert_eq!(metres_to_feet(18.0), 60);
/// assert_eq!(metres_to_feet(1.0), 5);
/// ```
pub fn metres_to_feet(metres: f64) -> u32 {
    round_to_step(metres * FEET_PER_METRE)
}

/// 거리 문자열을 피트로 변환
///
/// 단위가 없으면 미터로 간주합니다. km, 피트, 칸(quadretti)을 인식합니다.
pub fn parse_distance(text: &str) -> Option<u32> {
    let m = NUMBER_RE.find(text)?;
    let value = number_from_match(m.as_str())?;
    let unit = DistanceUnit::detect(&text[m.end()..]);
    Some(unit.to_feet(value))
}

/// `24/96 metri` 같은 기본/최대 거리 쌍을 피트로 변환
pub fn parse_distance_pair(text: &str) -> Option<(u32, u32)> {
    let caps = PAIR_RE.captures(text)?;
    let whole = caps.get(0)?;
    let unit = DistanceUnit::detect(&text[whole.end()..]);
    let normal = number_from_match(caps.get(1)?.as_str())?;
    let long = number_from_match(caps.get(2)?.as_str())?;
    Some((unit.to_feet(normal), unit.to_feet(long)))
}

/// 소수점 둘째 자리 반올림
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 가격 문자열을 금화로 변환
///
/// 화폐 단위가 없으면 금화로 간주합니다.
///
/// # Examples
/// ```
/// use vttconvert::units::parse_price;
///
/// assert_eq!(parse_price("15 mo"), Some(15.0));
/// assert_eq!(parse_price("2 ma"), Some(0.2));
/// assert_eq!(parse_price("5 monete di platino"), Some(50.0));
/// ```
pub fn parse_price(text: &str) -> Option<f64> {
    let m = NUMBER_RE.find(text)?;
    let value = number_from_match(m.as_str())?;
    let denomination = detect_denomination(&text[m.end()..]).unwrap_or(Denomination::Gold);
    Some(round2(value * denomination.gold_ratio()))
}

/// 숫자 뒤의 화폐 단위 인식
pub fn detect_denomination(rest: &str) -> Option<Denomination> {
    let lower = rest.trim().to_lowercase();
    let token: String = lower.chars().take_while(|c| c.is_alphabetic()).collect();
    let code = match token.as_str() {
        "mp" => Some("pp"),
        "mo" => Some("gp"),
        "me" => Some("ep"),
        "ma" => Some("sp"),
        "mr" => Some("cp"),
        _ => terms::match_term(CURRENCIES, &lower),
    }?;
    Denomination::from_code(code)
}

/// 무게 문자열을 파운드로 변환
///
/// 단위가 없으면 킬로그램으로 간주합니다.
pub fn parse_weight(text: &str) -> Option<f64> {
    let m = NUMBER_RE.find(text)?;
    let value = number_from_match(m.as_str())?;
    let rest = text[m.end()..].trim().to_lowercase();
    let token: String = rest.chars().take_while(|c| c.is_alphabetic()).collect();

    let pounds = match token.as_str() {
        "lb" | "lbs" => value,
        t if t.starts_with("libbr") => value,
        "g" | "gr" => value * POUNDS_PER_KILOGRAM / 1000.0,
        t if t.starts_with("gramm") => value * POUNDS_PER_KILOGRAM / 1000.0,
        _ => value * POUNDS_PER_KILOGRAM,
    };
    Some(round2(pounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_distance_pairs() {
        assert_eq!(parse_distance("9 metri"), Some(30));
        assert_eq!(parse_distance("18 metri"), Some(60));
        assert_eq!(parse_distance("1 metro"), Some(5));
        assert_eq!(parse_distance("1,5 m"), Some(5));
        assert_eq!(parse_distance("36 m"), Some(120));
        assert_eq!(parse_distance("4,5 metri"), Some(15));
    }

    #[test]
    fn test_distance_other_units() {
        assert_eq!(parse_distance("30 piedi"), Some(30));
        assert_eq!(parse_distance("6 quadretti"), Some(30));
        assert_eq!(parse_distance("1,5 km"), Some(5000));
    }

    #[test]
    fn test_distance_unit_is_token_after_number() {
        assert_eq!(parse_distance("9 m (6 quadretti)"), Some(30));
        assert_eq!(parse_distance("9 metri (30 piedi)"), Some(30));
        assert_eq!(parse_distance("3 chilometri"), Some(10000));
        assert_eq!(parse_distance("30 ft."), Some(30));
        assert_eq!(parse_distance_pair("gittata 24/96 metri (80/320 piedi)"), Some((80, 320)));
    }

    #[test]
    fn test_distance_without_number() {
        assert_eq!(parse_distance("Personale"), None);
        assert_eq!(parse_distance(""), None);
    }

    #[test]
    fn test_distance_rounding_is_nearest_step() {
        // 3 m = 10 ft, 2 m = 6.67 ft -> 5, 2,5 m = 8.33 ft -> 10
        assert_eq!(metres_to_feet(3.0), 10);
        assert_eq!(metres_to_feet(2.0), 5);
        assert_eq!(metres_to_feet(2.5), 10);
        assert_eq!(metres_to_feet(0.0), 0);
    }

    #[test]
    fn test_distance_pair() {
        assert_eq!(parse_distance_pair("gittata 24/96 metri"), Some((80, 320)));
        assert_eq!(parse_distance_pair("gittata 6/18 m"), Some((20, 60)));
        assert_eq!(parse_distance_pair("portata 1,5 m"), None);
    }

    #[test]
    fn test_number_formats() {
        assert_eq!(parse_number("1.500"), Some(1500.0));
        assert_eq!(parse_number("1.5"), Some(1.5));
        assert_eq!(parse_number("2.300,5"), Some(2300.5));
        assert_eq!(parse_number("CA -1"), Some(-1.0));
    }

    #[test]
    fn test_prices() {
        assert_eq!(parse_price("10 mr"), Some(0.1));
        assert_eq!(parse_price("1 mp"), Some(10.0));
        assert_eq!(parse_price("4 me"), Some(2.0));
        assert_eq!(parse_price("25 monete d'oro"), Some(25.0));
        assert_eq!(parse_price("50"), Some(50.0));
        assert_eq!(parse_price("—"), None);
    }

    #[test]
    fn test_weights() {
        assert_eq!(parse_weight("1,5 kg"), Some(3.0));
        assert_eq!(parse_weight("3 libbre"), Some(3.0));
        assert_eq!(parse_weight("500 g"), Some(1.0));
        assert_eq!(parse_weight("2"), Some(4.0));
    }
}
