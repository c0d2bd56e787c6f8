//! 범용 변환기
//!
//! 임의의 문서 유형에 대해 템플릿과 설명을 채우고, 유형별로 가벼운 매핑만
//! 적용합니다. 객체가 아닌 입력은 빈 레코드로 취급하며 실패하지 않습니다.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use super::{base_document, equipment, to_html, DESCRIPTION_KEYS, NAME_KEYS};
use crate::document::{DocType, Document};
use crate::ids::{child_id, slugify};
use crate::record::Record;
use crate::schema::set_path;
use crate::terms::{self, ABILITIES, CLASSES, RARITIES};

/// `1d10`, `d8` 의 면 수
static HIT_DIE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)d\s*(\d+)").unwrap());

/// `1-4`, `01–05`, `7`
static ROLL_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:[-–—]\s*(\d+))?").unwrap());

const TABLE_RESULT_ICON: &str = "icons/svg/d20-black.svg";

/// 레코드를 지정된 유형의 문서로 변환
pub fn convert(record: &Value, relative_path: &str, doc_type: DocType) -> Document {
    let source = Record::new(record);
    let mut doc = base_document(doc_type, &source, relative_path);
    match doc_type {
        DocType::Feat => fill_feat(&mut doc.system, &source, relative_path),
        DocType::Class => fill_class(&mut doc, &source),
        DocType::Subclass => fill_subclass(&mut doc, &source, relative_path),
        DocType::Journal => fill_journal(&mut doc, &source),
        DocType::Table => fill_table(&mut doc, &source),
        DocType::Weapon | DocType::Equipment | DocType::Consumable | DocType::Loot => {
            equipment::apply_physical(&mut doc.system, &source);
            if let Some(rarity) = source
                .text(&["rarita", "rarità", "rarity"])
                .and_then(|text| terms::match_term(RARITIES, &text))
            {
                set_path(&mut doc.system, "rarity", json!(rarity));
            }
        }
        _ => {}
    }
    doc
}

fn fill_feat(system: &mut Value, source: &Record, relative_path: &str) {
    if let Some(requirements) =
        source.text(&["prerequisito", "prerequisiti", "requisiti", "requisito"])
    {
        set_path(system, "requirements", json!(requirements));
    }
    let kind = if relative_path.starts_with("privilegi/") {
        "class"
    } else {
        "feat"
    };
    set_path(system, "type.value", json!(kind));
}

fn class_identifier(name: &str) -> String {
    terms::match_term(CLASSES, name)
        .map(str::to_string)
        .unwrap_or_else(|| slugify(name))
}

/// 주문 시전 진행도 (`completo`, `metà`, `un terzo`, `patto`)
pub fn spellcasting_progression(value: &Value) -> &'static str {
    match value {
        Value::Bool(true) => "full",
        Value::String(text) => {
            let lower = text.to_lowercase();
            if lower.contains("terz") {
                "third"
            } else if lower.contains("met") || lower.contains("mezz") {
                "half"
            } else if lower.contains("patto") {
                "pact"
            } else if lower.contains("complet")
                || lower.contains("pien")
                || lower.contains("full")
                || lower == "sì"
                || lower == "si"
            {
                "full"
            } else {
                "none"
            }
        }
        _ => "none",
    }
}

fn fill_spellcasting(system: &mut Value, source: &Record) {
    if let Some(value) = source.get(&["incantatore", "progressione_incantesimi", "lancio_incantesimi"])
    {
        set_path(
            system,
            "spellcasting.progression",
            json!(spellcasting_progression(value)),
        );
    }
    if let Some(ability) = source
        .text(&["caratteristica_incantatore", "caratteristica_incantesimi"])
        .and_then(|text| terms::match_term(ABILITIES, &text))
    {
        set_path(system, "spellcasting.ability", json!(ability));
    }
}

fn fill_class(doc: &mut Document, source: &Record) {
    let identifier = class_identifier(&doc.name);
    let parent_id = doc.id.clone();
    let system = &mut doc.system;
    set_path(system, "identifier", json!(identifier));

    let mut advancement = Vec::new();
    if let Some(faces) = source
        .text(&["dado_vita", "dadi_vita", "dado_vita_per_livello"])
        .and_then(|text| {
            HIT_DIE_RE
                .captures(&text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
    {
        set_path(system, "hitDice", json!(format!("d{}", faces)));
        advancement.push(json!({
            "_id": child_id(&parent_id, "avanzamento", advancement.len(), "HitPoints"),
            "type": "HitPoints",
            "level": 1,
            "title": "Punti ferita",
            "configuration": {},
            "value": {}
        }));
    }
    if let Some(saves) = super::joined_text(source, &["tiri_salvezza", "ts"]) {
        let grants: Vec<String> = terms::match_all_terms(&ABILITIES[..6], &saves)
            .iter()
            .map(|code| format!("saves:{}", code))
            .collect();
        if !grants.is_empty() {
            advancement.push(json!({
                "_id": child_id(&parent_id, "avanzamento", advancement.len(), "Trait"),
                "type": "Trait",
                "level": 1,
                "title": "Tiri salvezza",
                "configuration": { "grants": grants, "choices": [] }
            }));
        }
    }
    set_path(system, "advancement", json!(advancement));
    fill_spellcasting(system, source);

    let equipment: Vec<String> = source.strings(&["equipaggiamento", "equipaggiamento_iniziale"]);
    if !equipment.is_empty() {
        let entries: Vec<Value> = equipment
            .iter()
            .enumerate()
            .map(|(index, name)| {
                json!({
                    "_id": child_id(&parent_id, "equipaggiamento", index, name),
                    "type": "linked",
                    "count": 1,
                    "key": format!("Compendium.world.items.{}", slugify(name)),
                    "name": name
                })
            })
            .collect();
        set_path(system, "startingEquipment", json!(entries));
    }
}

/// 경로의 `classi/<클래스>/sottoclassi/...`에서 상위 클래스 식별자
pub fn class_from_path(relative_path: &str) -> Option<String> {
    let segments: Vec<&str> = relative_path.split('/').collect();
    let position = segments
        .iter()
        .position(|segment| segment.eq_ignore_ascii_case("classi"))?;
    let class_dir = segments.get(position + 1)?;
    if class_dir.ends_with(".json") {
        return None;
    }
    Some(class_identifier(class_dir))
}

fn fill_subclass(doc: &mut Document, source: &Record, relative_path: &str) {
    let identifier = slugify(&doc.name);
    let class = source
        .text(&["classe", "classe_base", "class"])
        .map(|name| class_identifier(&name))
        .or_else(|| class_from_path(relative_path))
        .unwrap_or_default();
    set_path(&mut doc.system, "identifier", json!(identifier));
    set_path(&mut doc.system, "classIdentifier", json!(class));
    fill_spellcasting(&mut doc.system, source);
}

fn fill_journal(doc: &mut Document, source: &Record) {
    if let Some(category) = source.text(&["categoria", "capitolo", "category"]) {
        set_path(&mut doc.system, "category", json!(category));
    }

    let mut pages: Vec<(String, String)> = source
        .list(&["pagine", "sezioni", "pages"])
        .into_iter()
        .filter_map(|page| match page {
            Value::String(text) => Some((String::new(), text.clone())),
            Value::Object(_) => {
                let record = Record::new(page);
                Some((
                    record.text(NAME_KEYS).unwrap_or_default(),
                    record
                        .text(&["testo", "contenuto", "descrizione", "text"])
                        .unwrap_or_default(),
                ))
            }
            _ => None,
        })
        .collect();
    if pages.is_empty() {
        if let Some(text) = source.text(DESCRIPTION_KEYS) {
            pages.push((doc.name.clone(), text));
        }
    }

    let entries: Vec<Value> = pages
        .iter()
        .enumerate()
        .map(|(index, (name, text))| {
            let name = if name.is_empty() {
                format!("{} {}", doc.name, index + 1)
            } else {
                name.clone()
            };
            json!({
                "_id": child_id(&doc.id, "pagine", index, &name),
                "name": name,
                "type": "text",
                "title": { "show": true, "level": 1 },
                "text": { "content": to_html(text), "format": 1 },
                "sort": (index + 1) * 100_000
            })
        })
        .collect();
    set_path(&mut doc.system, "pages", json!(entries));
}

/// 굴림 범위 파싱 (`96-00` 처럼 00은 100으로 취급)
pub fn parse_roll_range(text: &str) -> Option<(u32, u32)> {
    let caps = ROLL_RANGE_RE.captures(text)?;
    let low: u32 = caps.get(1)?.as_str().parse().ok()?;
    let high: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => low,
    };
    let fix = |n: u32| if n == 0 { 100 } else { n };
    let (low, high) = (fix(low), fix(high));
    Some((low.min(high), low.max(high)))
}

fn range_of(value: &Value) -> Option<(u32, u32)> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| (n as u32, n as u32)),
        Value::String(s) => parse_roll_range(s),
        Value::Array(bounds) => {
            let low = bounds.first()?.as_u64()? as u32;
            let high = bounds.get(1).and_then(Value::as_u64).map(|n| n as u32).unwrap_or(low);
            Some((low, high))
        }
        _ => None,
    }
}

fn fill_table(doc: &mut Document, source: &Record) {
    let mut next = 1u32;
    let mut results = Vec::new();
    for (index, entry) in source
        .list(&["risultati", "tabella", "voci", "righe"])
        .into_iter()
        .enumerate()
    {
        let (range, text) = match entry {
            Value::String(text) => (None, text.clone()),
            Value::Object(_) => {
                let record = Record::new(entry);
                let range = record
                    .get(&["intervallo", "range", "tiro", "dado"])
                    .and_then(range_of);
                let text = record
                    .text(&["testo", "risultato", "descrizione", "nome", "text"])
                    .unwrap_or_default();
                (range, text)
            }
            _ => continue,
        };
        let (low, high) = range.unwrap_or((next, next));
        next = high + 1;
        results.push(json!({
            "_id": child_id(&doc.id, "risultati", index, &text),
            "type": "text",
            "text": text,
            "img": TABLE_RESULT_ICON,
            "weight": high - low + 1,
            "range": [low, high],
            "drawn": false
        }));
    }

    let formula = source
        .text(&["formula", "dado", "tiro"])
        .or_else(|| (next > 1).then(|| format!("1d{}", next - 1)));
    if let Some(formula) = formula {
        set_path(&mut doc.system, "formula", json!(formula));
    }
    set_path(&mut doc.system, "results", json!(results));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_object_input_never_fails() {
        for value in [json!(null), json!([1, 2]), json!("testo"), json!(42)] {
            let doc = convert(&value, "regole/x.json", DocType::Journal);
            assert_eq!(doc.doc_type, DocType::Journal);
            assert_eq!(doc.name, "X");
            assert!(doc.system["pages"].as_array().unwrap().is_empty());
        }
    }

    #[test]
    fn test_feat_prerequisite() {
        let record = json!({ "nome": "Allerta", "prerequisito": "Destrezza 13" });
        let doc = convert(&record, "talenti/allerta.json", DocType::Feat);
        assert_eq!(doc.system["requirements"], "Destrezza 13");
        assert_eq!(doc.system["type"]["value"], "feat");

        let doc = convert(&record, "privilegi/ira.json", DocType::Feat);
        assert_eq!(doc.system["type"]["value"], "class");
    }

    #[test]
    fn test_class_mapping() {
        let record = json!({
            "nome": "Chierico",
            "dado_vita": "1d8 per livello da chierico",
            "tiri_salvezza": "Saggezza, Carisma",
            "incantatore": "completo",
            "caratteristica_incantatore": "Saggezza"
        });
        let doc = convert(&record, "classi/chierico.json", DocType::Class);
        let system = &doc.system;
        assert_eq!(system["identifier"], "cleric");
        assert_eq!(system["hitDice"], "d8");
        assert_eq!(system["spellcasting"]["progression"], "full");
        assert_eq!(system["spellcasting"]["ability"], "wis");
        assert_eq!(system["advancement"][0]["type"], "HitPoints");
        assert_eq!(
            system["advancement"][1]["configuration"]["grants"],
            json!(["saves:wis", "saves:cha"])
        );
    }

    #[test]
    fn test_spellcasting_progression() {
        assert_eq!(spellcasting_progression(&json!("metà")), "half");
        assert_eq!(spellcasting_progression(&json!("un terzo")), "third");
        assert_eq!(spellcasting_progression(&json!("patto")), "pact");
        assert_eq!(spellcasting_progression(&json!(true)), "full");
        assert_eq!(spellcasting_progression(&json!("no")), "none");
    }

    #[test]
    fn test_subclass_identifier_from_path() {
        let record = json!({ "nome": "Dominio della Vita" });
        let doc = convert(
            &record,
            "classi/chierico/sottoclassi/dominio-vita.json",
            DocType::Subclass,
        );
        assert_eq!(doc.system["classIdentifier"], "cleric");
        assert_eq!(doc.system["identifier"], "dominiodellavita");
        assert_eq!(class_from_path("classi/chierico.json"), None);
    }

    #[test]
    fn test_loot_price_and_weight() {
        let record = json!({ "nome": "Corda", "costo": "1 mo", "peso": "5 kg", "quantita": 2 });
        let doc = convert(&record, "equipaggiamento/corda.json", DocType::Loot);
        assert_eq!(doc.system["price"]["value"], 1.0);
        assert_eq!(doc.system["weight"]["value"], 10.0);
        assert_eq!(doc.system["quantity"], 2);
    }

    #[test]
    fn test_journal_pages() {
        let record = json!({
            "nome": "Combattimento",
            "pagine": [
                { "titolo": "Iniziativa", "testo": "Tira un d20." },
                "Testo libero"
            ]
        });
        let doc = convert(&record, "regole/combattimento.json", DocType::Journal);
        let pages = doc.system["pages"].as_array().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0]["name"], "Iniziativa");
        assert_eq!(pages[0]["text"]["content"], "<p>Tira un d20.</p>");
        assert_eq!(pages[1]["name"], "Combattimento 2");

        let record = json!({ "nome": "Diario", "descrizione": "Giorno uno." });
        let doc = convert(&record, "diari/giorno.json", DocType::Journal);
        assert_eq!(doc.system["pages"][0]["name"], "Diario");
    }

    #[test]
    fn test_table_results_and_formula() {
        let record = json!({
            "nome": "Incontri",
            "risultati": [
                { "intervallo": "1-4", "testo": "Goblin" },
                { "intervallo": "5-6", "testo": "Orco" }
            ]
        });
        let doc = convert(&record, "tabelle/incontri.json", DocType::Table);
        assert_eq!(doc.system["formula"], "1d6");
        assert_eq!(doc.system["results"][0]["range"], json!([1, 4]));
        assert_eq!(doc.system["results"][0]["weight"], 4);
        assert_eq!(doc.system["results"][1]["text"], "Orco");

        let record = json!({ "risultati": ["a", "b", "c"], "formula": "1d3" });
        let doc = convert(&record, "tabelle/abc.json", DocType::Table);
        assert_eq!(doc.system["results"][2]["range"], json!([3, 3]));
        assert_eq!(doc.system["formula"], "1d3");
    }

    #[test]
    fn test_roll_range_parsing() {
        assert_eq!(parse_roll_range("01-05"), Some((1, 5)));
        assert_eq!(parse_roll_range("96–00"), Some((96, 100)));
        assert_eq!(parse_roll_range("7"), Some((7, 7)));
        assert_eq!(parse_roll_range("—"), None);
    }
}
