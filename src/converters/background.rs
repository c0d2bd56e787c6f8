//! 배경 변환기

use serde_json::{json, Value};

use super::{base_document, require_object, to_html, DESCRIPTION_KEYS, NAME_KEYS};
use crate::document::{DocType, Document};
use crate::error::Result;
use crate::ids::{child_id, slugify};
use crate::record::Record;
use crate::schema::set_path;
use crate::terms::{self, LANGUAGES, SKILLS, TOOLS};
use crate::units::{detect_denomination, parse_number, round2, Denomination};

/// 이탈리아어 수사 (수량 파싱용)
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("un", 1),
    ("uno", 1),
    ("una", 1),
    ("un'", 1),
    ("due", 2),
    ("tre", 3),
    ("quattro", 4),
    ("cinque", 5),
    ("sei", 6),
    ("sette", 7),
    ("otto", 8),
    ("nove", 9),
    ("dieci", 10),
    ("venti", 20),
];

/// 배경 레코드 변환
pub fn convert(record: &Value, relative_path: &str) -> Result<Document> {
    let source = require_object(record, relative_path)?;
    let mut doc = base_document(DocType::Background, &source, relative_path);
    let parent_id = doc.id.clone();

    let mechanics = source
        .text(&["meccaniche", "meccanica"])
        .map(|text| Mechanics::parse(&text))
        .unwrap_or_default();

    let mut advancement = Vec::new();
    let skill_keys = ["competenze_abilita", "competenze_abilità", "abilita"];
    if let Some(text) = merged(super::joined_text(&source, &skill_keys), &mechanics.skills) {
        let grants: Vec<String> = terms::match_all_terms(SKILLS, &text)
            .iter()
            .map(|code| format!("skills:{}", code))
            .collect();
        if !grants.is_empty() {
            let index = advancement.len();
            let title = "Competenze nelle abilità";
            advancement.push(trait_advancement(&parent_id, index, title, grants, None));
        }
    }
    let tool_text = super::joined_text(&source, &["competenze_strumenti", "strumenti"]);
    if let Some(text) = merged(tool_text, &mechanics.tools) {
        let grants: Vec<String> = terms::match_all_terms(TOOLS, &text)
            .iter()
            .map(|code| format!("tool:{}", code))
            .collect();
        if !grants.is_empty() {
            let index = advancement.len();
            let title = "Competenze negli strumenti";
            advancement.push(trait_advancement(&parent_id, index, title, grants, None));
        }
    }
    let language_text = super::joined_text(&source, &["linguaggi", "lingue"]);
    if let Some(text) = merged(language_text, &mechanics.languages) {
        let grants: Vec<String> = terms::match_all_terms(LANGUAGES, &text)
            .iter()
            .map(|code| format!("languages:standard:{}", code))
            .collect();
        let choices = language_choices(&text);
        if !grants.is_empty() || choices > 0 {
            let choice =
                (choices > 0).then(|| json!({ "count": choices, "pool": ["languages:*"] }));
            let index = advancement.len();
            advancement.push(trait_advancement(&parent_id, index, "Linguaggi", grants, choice));
        }
    }
    set_path(&mut doc.system, "advancement", json!(advancement));

    let mut equipment = Vec::new();
    let mut wealth = 0.0;
    for segment in source.strings(&["equipaggiamento", "equipaggiamento_iniziale"]) {
        if let Some(gold) = coin_value(&segment) {
            wealth += gold;
            continue;
        }
        let (count, name) = split_quantity(&segment);
        if name.is_empty() {
            continue;
        }
        equipment.push(json!({
            "_id": child_id(&parent_id, "equipaggiamento", equipment.len(), &name),
            "type": "linked",
            "count": count,
            "key": format!("Compendium.world.items.{}", slugify(&name)),
            "name": name
        }));
    }
    set_path(&mut doc.system, "startingEquipment", json!(equipment));
    if wealth > 0.0 {
        set_path(&mut doc.system, "wealth", json!(format_gold(wealth)));
    }

    match source.get(&["privilegio", "privilegi", "feature"]) {
        Some(value) if value.is_object() => {
            let feature = Record::new(value);
            set_path(
                &mut doc.system,
                "feature",
                json!({
                    "name": feature.text(NAME_KEYS).unwrap_or_default(),
                    "description": to_html(&feature.text(DESCRIPTION_KEYS).unwrap_or_default())
                }),
            );
        }
        Some(Value::String(text)) => {
            let (name, description) = match text.split_once(". ") {
                Some((name, rest)) => (name.trim(), rest.trim()),
                None => (text.trim(), ""),
            };
            set_path(
                &mut doc.system,
                "feature",
                json!({ "name": name, "description": to_html(description) }),
            );
        }
        _ => {}
    }

    Ok(doc)
}

/// `meccaniche` 서술을 문장 단위로 나눠 제목별로 분류한 결과
#[derive(Debug, Default)]
struct Mechanics {
    skills: Vec<String>,
    tools: Vec<String>,
    languages: Vec<String>,
}

impl Mechanics {
    /// `Competenze nelle abilità: Furtività, Inganno. Strumenti: ...`
    fn parse(text: &str) -> Self {
        let mut mechanics = Mechanics::default();
        for sentence in text.split(['.', '\n']).map(str::trim) {
            let Some((heading, body)) = sentence.split_once(':') else {
                continue;
            };
            let heading = heading.to_lowercase();
            let body = body.trim().to_string();
            if heading.contains("abilit") {
                mechanics.skills.push(body);
            } else if heading.contains("strument") {
                mechanics.tools.push(body);
            } else if heading.contains("linguagg") || heading.contains("lingue") {
                mechanics.languages.push(body);
            }
        }
        mechanics
    }
}

/// 전용 필드 텍스트와 `meccaniche` 문장 합치기
fn merged(field: Option<String>, extra: &[String]) -> Option<String> {
    let parts: Vec<&str> = field
        .iter()
        .map(String::as_str)
        .chain(extra.iter().map(String::as_str))
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn trait_advancement(
    parent_id: &str,
    index: usize,
    title: &str,
    grants: Vec<String>,
    choice: Option<Value>,
) -> Value {
    json!({
        "_id": child_id(parent_id, "avanzamento", index, title),
        "type": "Trait",
        "level": 0,
        "title": title,
        "configuration": {
            "grants": grants,
            "choices": choice.into_iter().collect::<Vec<_>>()
        }
    })
}

/// `Due a scelta` → 2
fn language_choices(text: &str) -> u32 {
    let lower = text.to_lowercase();
    if !lower.contains("scelta") && !lower.contains("qualsiasi") {
        return 0;
    }
    leading_quantity(&lower).map(|(n, _)| n).unwrap_or(1)
}

/// 선두 수량(숫자 또는 수사) 분리
pub fn split_quantity(segment: &str) -> (u32, String) {
    let trimmed = segment.trim();
    match leading_quantity(trimmed) {
        Some((count, rest)) => (count, rest.trim().to_string()),
        None => (1, trimmed.to_string()),
    }
}

fn leading_quantity(text: &str) -> Option<(u32, &str)> {
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        let count = digits.parse().ok()?;
        return Some((count, &text[digits.len()..]));
    }
    let lower = text.to_lowercase();
    NUMBER_WORDS.iter().find_map(|(word, count)| {
        let rest = lower.strip_prefix(word)?;
        if word.ends_with('\'') {
            return Some((*count, &text[word.len()..]));
        }
        rest.starts_with(' ')
            .then(|| (*count, &text[word.len()..]))
    })
}

/// 화폐 구간이면 금화 환산 값
fn coin_value(segment: &str) -> Option<f64> {
    let lower = segment.to_lowercase();
    let amount = parse_number(&lower)?;
    let position = lower.find(|c: char| c.is_ascii_digit())?;
    let rest = lower[position..]
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ',')
        .trim();
    let token: String = rest.chars().take_while(|c| c.is_alphabetic()).collect();
    let abbreviation = matches!(token.as_str(), "mp" | "mo" | "me" | "ma" | "mr");
    if !abbreviation && !token.starts_with("monet") {
        return None;
    }
    let denomination: Denomination = detect_denomination(rest)?;
    Some(round2(amount * denomination.gold_ratio()))
}

fn format_gold(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
