//! 소스 레코드 접근 모듈
//!
//! 느슨한 형태의 JSON 객체에서 값을 꺼내는 도우미입니다.
//! 모든 접근자는 대체 키 목록을 순서대로 시도하고, 값이 없으면 None/빈 값을 돌려줍니다.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::units::parse_number;

/// 빈 객체 (객체가 아닌 레코드를 감쌀 때 사용)
static EMPTY: Lazy<Map<String, Value>> = Lazy::new(Map::new);

/// 소스 레코드 읽기 전용 뷰
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    map: &'a Map<String, Value>,
    is_object: bool,
}

impl<'a> Record<'a> {
    /// JSON 값으로 레코드 생성 (객체가 아니면 빈 레코드)
    pub fn new(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Self {
                map,
                is_object: true,
            },
            _ => Self {
                map: &EMPTY,
                is_object: false,
            },
        }
    }

    /// 원본이 JSON 객체였는지 여부
    pub fn is_object(&self) -> bool {
        self.is_object
    }

    /// 값이 하나도 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// 첫 번째로 존재하는 non-null 값
    pub fn get(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| self.map.get(*key))
            .find(|value| !value.is_null())
    }

    /// 텍스트 값 (숫자/불리언은 문자열로 변환, 빈 문자열은 None)
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        let value = self.get(keys)?;
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// 숫자 값 (문자열이면 첫 숫자를 파싱)
    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        match self.get(keys)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_number(s),
            _ => None,
        }
    }

    /// 정수 값
    pub fn integer(&self, keys: &[&str]) -> Option<i64> {
        self.number(keys).map(|n| n.round() as i64)
    }

    /// 참/거짓 값 (`"sì"`, `"no"` 같은 문자열 허용)
    pub fn flag(&self, keys: &[&str]) -> Option<bool> {
        match self.get(keys)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|v| v != 0.0),
            Value::String(s) => parse_flag(s),
            _ => None,
        }
    }

    /// 배열 값의 항목들 (배열이 아니면 빈 목록)
    pub fn list(&self, keys: &[&str]) -> Vec<&'a Value> {
        match self.get(keys) {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// 문자열 목록 (배열, 또는 쉼표/세미콜론으로 구분된 문자열)
    pub fn strings(&self, keys: &[&str]) -> Vec<String> {
        match self.get(keys) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(s)) => split_list(s),
            _ => Vec::new(),
        }
    }

    /// 중첩 객체
    pub fn object(&self, keys: &[&str]) -> Option<Record<'a>> {
        let value = self.get(keys)?;
        if value.is_object() {
            Some(Record::new(value))
        } else {
            None
        }
    }

    /// 원본 키-값 쌍 순회
    pub fn entries(&self) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.map.iter()
    }
}

/// 쉼표/세미콜론 구분 문자열 분할
///
/// 숫자 사이의 쉼표(`1,5 m`)는 소수점이므로 나누지 않는다.
pub fn split_list(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        let decimal_comma = c == ','
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|next| next.is_ascii_digit());
        if (c == ',' || c == ';') && !decimal_comma {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 이탈리아어/영어 참거짓 문자열 해석
pub fn parse_flag(text: &str) -> Option<bool> {
    let lower = text.trim().to_lowercase();
    match lower.as_str() {
        "sì" | "si" | "true" | "vero" | "yes" | "1" => Some(true),
        "no" | "false" | "falso" | "0" => Some(false),
        _ if lower.starts_with("non ") || lower.starts_with("no ") => Some(false),
        _ if lower.starts_with("richiede") => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alternative_keys_in_order() {
        let value = json!({"name": "Goblin", "nome": "Goblin IT"});
        let record = Record::new(&value);
        assert_eq!(record.text(&["nome", "name"]), Some("Goblin IT".to_string()));
        assert_eq!(record.text(&["titolo", "name"]), Some("Goblin".to_string()));
    }

    #[test]
    fn test_null_and_blank_are_missing() {
        let value = json!({"nome": null, "alias": "  ", "name": "Orco"});
        let record = Record::new(&value);
        assert_eq!(record.text(&["nome", "name"]), Some("Orco".to_string()));
        assert_eq!(record.text(&["alias"]), None);
    }

    #[test]
    fn test_split_list_keeps_decimal_commas() {
        assert_eq!(
            split_list("1,5 m, volare 18 m; nuotare 4,5 m"),
            vec!["1,5 m", "volare 18 m", "nuotare 4,5 m"]
        );
        assert_eq!(split_list("Comune,Elfico"), vec!["Comune", "Elfico"]);
    }

    #[test]
    fn test_numbers_from_strings() {
        let value = json!({"pf": "7 (2d6)", "ca": 15, "peso": "1,5 kg"});
        let record = Record::new(&value);
        assert_eq!(record.integer(&["pf"]), Some(7));
        assert_eq!(record.integer(&["ca"]), Some(15));
        assert_eq!(record.number(&["peso"]), Some(1.5));
        assert_eq!(record.number(&["manca"]), None);
    }

    #[test]
    fn test_strings_from_array_or_text() {
        let value = json!({"a": ["Comune", " Elfico ", ""], "b": "Comune, Nanico; Gigante"});
        let record = Record::new(&value);
        assert_eq!(record.strings(&["a"]), vec!["Comune", "Elfico"]);
        assert_eq!(record.strings(&["b"]), vec!["Comune", "Nanico", "Gigante"]);
        assert!(record.strings(&["c"]).is_empty());
    }

    #[test]
    fn test_non_object_is_empty_record() {
        let value = json!([1, 2, 3]);
        let record = Record::new(&value);
        assert!(!record.is_object());
        assert!(record.is_empty());
        assert_eq!(record.text(&["nome"]), None);
    }

    #[test]
    fn test_flags() {
        let value = json!({"a": true, "b": "no", "c": "richiede sintonia", "d": "forse"});
        let record = Record::new(&value);
        assert_eq!(record.flag(&["a"]), Some(true));
        assert_eq!(record.flag(&["b"]), Some(false));
        assert_eq!(record.flag(&["c"]), Some(true));
        assert_eq!(record.flag(&["d"]), None);
    }

    #[test]
    fn test_nested_object() {
        let value = json!({"caratteristiche": {"forza": 12}});
        let record = Record::new(&value);
        let abilities = record.object(&["caratteristiche"]).unwrap();
        assert_eq!(abilities.integer(&["forza"]), Some(12));
        assert!(record.object(&["forza"]).is_none());
    }
}
