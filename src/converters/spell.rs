//! 주문 변환기

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use super::{base_document, require_object, to_html, DESCRIPTION_KEYS};
use crate::dice::{self, DamagePart};
use crate::document::{DocType, Document};
use crate::error::Result;
use crate::ids::slugify;
use crate::record::Record;
use crate::schema::set_path;
use crate::terms::{self, ABILITIES, AREA_SHAPES, CLASSES, SPELL_SCHOOLS};
use crate::units::{parse_distance, parse_number, parse_price};

/// 재료 비용 (`del valore di 50 mo`)
static MATERIAL_COST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d+(?:[.,]\d+)?\s*(?:mo|mp|ma|mr|me)\b").unwrap());

/// 괄호 안 텍스트
static PARENTHETICAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]*)\)").unwrap());

/// 사거리 표현
#[derive(Debug, Clone, PartialEq)]
pub struct SpellRange {
    pub value: Option<u32>,
    pub units: &'static str,
    pub special: String,
}

impl SpellRange {
    fn to_json(&self) -> Value {
        json!({
            "value": self.value,
            "long": null,
            "units": self.units,
            "special": self.special
        })
    }
}

/// 주문 레코드 변환
pub fn convert(record: &Value, relative_path: &str) -> Result<Document> {
    let source = require_object(record, relative_path)?;
    Ok(build(&source, relative_path))
}

/// 레코드에서 주문 문서 생성 (크리처의 내장 주문도 이 경로를 사용)
pub(crate) fn build(source: &Record, relative_path: &str) -> Document {
    let mut doc = base_document(DocType::Spell, source, relative_path);
    let system = &mut doc.system;

    let level_text = source.text(&["livello", "level"]).unwrap_or_default();
    let level = parse_level(&level_text);
    set_path(system, "level", json!(level));

    let school_text = source
        .text(&["scuola", "school"])
        .or_else(|| source.text(&["tipo"]))
        .unwrap_or_else(|| level_text.clone());
    set_path(
        system,
        "school",
        json!(terms::match_term(SPELL_SCHOOLS, &school_text).unwrap_or("")),
    );

    if let Some(casting) = source.text(&["tempo_lancio", "tempo_di_lancio", "lancio"]) {
        let (kind, cost, condition) = parse_activation(&casting);
        set_path(
            system,
            "activation",
            json!({ "type": kind, "cost": cost, "condition": condition }),
        );
    }

    let duration_text = source.text(&["durata", "duration"]).unwrap_or_default();
    let (duration_value, duration_units, concentration) = parse_duration(&duration_text);
    set_path(
        system,
        "duration",
        json!({ "value": duration_value, "units": duration_units }),
    );

    if let Some(range_text) = source.text(&["gittata", "portata", "raggio_azione"]) {
        set_path(system, "range", parse_range(&range_text).to_json());
        if let Some((shape, size)) = parse_area(&range_text) {
            set_path(
                system,
                "target.template",
                json!({ "type": shape, "size": size, "units": "ft" }),
            );
        }
    }

    if let Some(target) = source.text(&["bersaglio", "bersagli", "area"]) {
        let lower = target.to_lowercase();
        let kind = if lower.contains("creatur") {
            "creature"
        } else if lower.contains("oggett") {
            "object"
        } else {
            ""
        };
        let count = parse_number(&target)
            .map(|n| (n as i64).to_string())
            .unwrap_or_default();
        set_path(system, "target.affects", json!({ "type": kind, "count": count }));
    }

    let components = parse_components(source);
    set_path(
        system,
        "components",
        json!({
            "vocal": components.vocal,
            "somatic": components.somatic,
            "material": components.material,
            "ritual": source.flag(&["rituale", "ritual"]).unwrap_or(false)
                || level_text.to_lowercase().contains("rituale"),
            "concentration": source.flag(&["concentrazione", "concentration"])
                .unwrap_or(concentration)
        }),
    );
    set_path(
        system,
        "materials",
        json!({
            "value": components.materials,
            "consumed": components.consumed,
            "cost": components.cost,
            "supply": 0
        }),
    );

    let description = source.text(DESCRIPTION_KEYS).unwrap_or_default();
    let save_ability = source
        .text(&["tiro_salvezza", "ts", "salvezza"])
        .and_then(|text| terms::match_term(ABILITIES, &text))
        .or_else(|| dice::parse_save_ability(&description));
    if let Some(ability) = save_ability {
        set_path(system, "save.ability", json!(ability));
    }

    let damage_text = source.text(&["danni", "danno"]).unwrap_or_else(|| description.clone());
    let action_type = action_type(&description, save_ability.is_some());
    let parts: Vec<DamagePart> = if action_type == "heal" {
        dice::leading_formula(&description)
            .filter(|f| f.contains('d'))
            .map(|f| vec![DamagePart::new(f, "healing")])
            .unwrap_or_default()
    } else {
        dice::extract_damage_parts(&damage_text)
    };
    set_path(system, "damage.parts", json!(parts));
    set_path(system, "actionType", json!(action_type));

    let classes: Vec<String> = source
        .strings(&["classi", "classes", "liste"])
        .iter()
        .map(|name| {
            terms::match_term(CLASSES, name)
                .map(str::to_string)
                .unwrap_or_else(|| slugify(name))
        })
        .collect();
    set_path(system, "classes", json!(classes));

    if let Some(higher) = source.text(&["a_livelli_superiori", "livelli_superiori"]) {
        let current = doc.system["description"]["value"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        set_path(
            &mut doc.system,
            "description.value",
            json!(format!(
                "{}<p><strong>A livelli superiori.</strong> {}</p>",
                current,
                to_html(&higher).trim_start_matches("<p>").trim_end_matches("</p>")
            )),
        );
    }

    doc
}

/// 주문 레벨 (`Trucchetto` = 0)
pub fn parse_level(text: &str) -> u8 {
    if text.to_lowercase().contains("trucchett") {
        return 0;
    }
    parse_number(text)
        .map(|n| n.clamp(0.0, 9.0) as u8)
        .unwrap_or(0)
}

/// 시전 시간 → (유형, 비용, 조건)
pub fn parse_activation(text: &str) -> (&'static str, u32, String) {
    let lower = text.to_lowercase();
    let cost = parse_number(&lower).map(|n| n as u32).unwrap_or(1);
    if lower.contains("reazione") {
        let condition = text
            .split_once(',')
            .map(|(_, rest)| rest.trim().to_string())
            .unwrap_or_default();
        ("reaction", 1, condition)
    } else if lower.contains("azione bonus") {
        ("bonus", 1, String::new())
    } else if lower.contains("azion") {
        ("action", cost, String::new())
    } else if lower.contains("minut") {
        ("minute", cost, String::new())
    } else if lower.contains("ora") || lower.contains("ore") {
        ("hour", cost, String::new())
    } else {
        ("special", 0, String::new())
    }
}

/// 지속시간 → (값, 단위, 집중 여부)
pub fn parse_duration(text: &str) -> (String, &'static str, bool) {
    let lower = text.to_lowercase();
    let concentration = lower.contains("concentrazione");
    let value = parse_number(&lower)
        .map(|n| (n as i64).to_string())
        .unwrap_or_default();

    let units = if lower.trim().is_empty() || lower.contains("istantane") {
        "inst"
    } else if lower.contains("finché") || lower.contains("dissolt") {
        "perm"
    } else if lower.contains("round") {
        "round"
    } else if lower.contains("minut") {
        "minute"
    } else if lower.contains("giorn") {
        "day"
    } else if lower.contains("ora") || lower.contains("ore") {
        "hour"
    } else {
        "spec"
    };

    let value = match units {
        "inst" | "perm" | "spec" => String::new(),
        _ => value,
    };
    (value, units, concentration)
}

/// 사거리 → 숫자(피트) 또는 고정 형태
pub fn parse_range(text: &str) -> SpellRange {
    let lower = text.to_lowercase();
    let sentinel = |units: &'static str, special: &str| SpellRange {
        value: None,
        units,
        special: special.to_string(),
    };
    if lower.starts_with("personale") || lower.starts_with("incantatore") {
        sentinel("self", "")
    } else if lower.starts_with("contatto") {
        sentinel("touch", "")
    } else if lower.starts_with("vista") {
        sentinel("spec", "Vista")
    } else if lower.contains("illimitat") {
        sentinel("any", "")
    } else if lower.starts_with("special") {
        sentinel("spec", "")
    } else {
        match parse_distance(text) {
            Some(feet) => SpellRange {
                value: Some(feet),
                units: "ft",
                special: String::new(),
            },
            None => sentinel("spec", text.trim()),
        }
    }
}

/// 괄호 안 범위 형태 (`Personale (cono di 4,5 metri)` → cone, 15)
pub fn parse_area(text: &str) -> Option<(&'static str, u32)> {
    let inner = PARENTHETICAL_RE.captures(text)?.get(1)?.as_str();
    let shape = terms::match_term(AREA_SHAPES, inner)?;
    let size = parse_distance(inner).unwrap_or(0);
    Some((shape, size))
}

/// 구성 요소 파싱 결과
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Components {
    pub vocal: bool,
    pub somatic: bool,
    pub material: bool,
    pub materials: String,
    pub consumed: bool,
    pub cost: f64,
}

fn parse_components(source: &Record) -> Components {
    let mut components = Components::default();

    if let Some(block) = source.object(&["componenti", "components"]) {
        components.vocal = block.flag(&["verbale", "v"]).unwrap_or(false);
        components.somatic = block.flag(&["somatica", "somatico", "s"]).unwrap_or(false);
        components.material = block.flag(&["materiale", "m"]).unwrap_or(false);
        if let Some(text) = block.text(&["materiali", "descrizione_materiale"]) {
            components.material = true;
            apply_materials(&mut components, &text);
        }
        return components;
    }

    let text = match source.text(&["componenti", "components"]) {
        Some(text) => text,
        None => source.strings(&["componenti", "components"]).join(", "),
    };
    let (codes, materials) = match text.split_once('(') {
        Some((codes, rest)) => (codes.to_string(), rest.trim_end_matches(')').to_string()),
        None => (text.clone(), String::new()),
    };
    for code in codes.split(|c: char| c == ',' || c.is_whitespace()) {
        match code.trim().to_uppercase().as_str() {
            "V" => components.vocal = true,
            "S" => components.somatic = true,
            "M" => components.material = true,
            _ => {}
        }
    }
    if let Some(text) = source.text(&["materiali", "materiale"]) {
        components.material = true;
        apply_materials(&mut components, &text);
    } else if !materials.is_empty() {
        apply_materials(&mut components, &materials);
    }
    components
}

fn apply_materials(components: &mut Components, text: &str) {
    components.materials = text.trim().to_string();
    components.consumed = text.to_lowercase().contains("consuma");
    components.cost = MATERIAL_COST_RE
        .find(text)
        .and_then(|m| parse_price(m.as_str()))
        .unwrap_or(0.0);
}

/// 설명에서 행동 유형 결정
fn action_type(description: &str, has_save: bool) -> &'static str {
    let lower = description.to_lowercase();
    if lower.contains("attacco con incantesimo a distanza") {
        "rsak"
    } else if lower.contains("attacco con incantesimo in mischia") {
        "msak"
    } else if has_save {
        "save"
    } else if lower.contains("recupera") && lower.contains("punti ferita") {
        "heal"
    } else {
        "util"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fireball() {
        let record = json!({
            "nome": "Palla di Fuoco",
            "livello": "3",
            "scuola": "Invocazione",
            "tempo_lancio": "1 azione",
            "gittata": "45 metri (sfera di 6 metri di raggio)",
            "componenti": "V, S, M (una minuscola sfera di guano di pipistrello e zolfo)",
            "durata": "Istantanea",
            "classi": ["Mago", "Stregone"],
            "descrizione": "Ogni creatura in una sfera deve effettuare un tiro salvezza su Destrezza. \
                            Subisce 8d6 danni da fuoco se fallisce."
        });
        let doc = convert(&record, "incantesimi/palla-di-fuoco.json").unwrap();
        let system = &doc.system;
        assert_eq!(doc.doc_type, DocType::Spell);
        assert_eq!(system["level"], 3);
        assert_eq!(system["school"], "con");
        assert_eq!(system["activation"]["type"], "action");
        assert_eq!(system["range"]["value"], 150);
        assert_eq!(system["range"]["units"], "ft");
        assert_eq!(system["target"]["template"]["type"], "sphere");
        assert_eq!(system["target"]["template"]["size"], 20);
        assert_eq!(system["components"]["material"], true);
        assert_eq!(system["save"]["ability"], "dex");
        assert_eq!(system["actionType"], "save");
        assert_eq!(system["damage"]["parts"], json!([["8d6", "fire"]]));
        assert_eq!(system["classes"], json!(["wizard", "sorcerer"]));
        assert_eq!(system["duration"]["units"], "inst");
    }

    #[test]
    fn test_cantrip_and_sentinel_ranges() {
        assert_eq!(parse_level("Trucchetto di ammaliamento"), 0);
        assert_eq!(parse_level("9° livello"), 9);
        assert_eq!(parse_range("Personale").units, "self");
        assert_eq!(parse_range("Contatto").units, "touch");
        let sight = parse_range("Vista");
        assert_eq!((sight.units, sight.special.as_str()), ("spec", "Vista"));
        assert_eq!(parse_range("Illimitata").units, "any");
        assert_eq!(parse_range("18 metri").value, Some(60));
    }

    #[test]
    fn test_area_from_parenthetical() {
        assert_eq!(parse_area("Personale (cono di 4,5 metri)"), Some(("cone", 15)));
        assert_eq!(parse_area("36 metri"), None);
    }

    #[test]
    fn test_activation_and_duration() {
        assert_eq!(parse_activation("1 azione bonus").0, "bonus");
        let (kind, cost, condition) =
            parse_activation("1 reazione, che il personaggio effettua quando cade");
        assert_eq!((kind, cost), ("reaction", 1));
        assert!(condition.starts_with("che"));
        assert_eq!(parse_activation("10 minuti").0, "minute");
        assert_eq!(parse_activation("1 ora"), ("hour", 1, String::new()));

        assert_eq!(
            parse_duration("Concentrazione, fino a 1 minuto"),
            ("1".to_string(), "minute", true)
        );
        assert_eq!(parse_duration("8 ore"), ("8".to_string(), "hour", false));
        assert_eq!(parse_duration("Finché non viene dissolto").1, "perm");
        assert_eq!(parse_duration("Speciale").1, "spec");
    }

    #[test]
    fn test_material_cost_and_consumption() {
        let record = json!({
            "componenti": "V, S, M (un diamante del valore di 300 mo, che l'incantesimo consuma)"
        });
        let doc = convert(&record, "incantesimi/revivify.json").unwrap();
        assert_eq!(doc.system["materials"]["cost"], 300.0);
        assert_eq!(doc.system["materials"]["consumed"], true);
        assert_eq!(doc.system["components"]["vocal"], true);
    }

    #[test]
    fn test_spell_attack_and_healing() {
        let record = json!({
            "descrizione": "Effettua un attacco con incantesimo a distanza. Se colpisce subisce 1d10 danni da fuoco."
        });
        let doc = convert(&record, "incantesimi/dardo.json").unwrap();
        assert_eq!(doc.system["actionType"], "rsak");

        let record = json!({
            "descrizione": "Una creatura toccata recupera 1d8 punti ferita."
        });
        let doc = convert(&record, "incantesimi/cura.json").unwrap();
        assert_eq!(doc.system["actionType"], "heal");
        assert_eq!(doc.system["damage"]["parts"], json!([["1d8", "healing"]]));
    }

    #[test]
    fn test_unmapped_damage_words_are_skipped() {
        let record = json!({ "descrizione": "Infligge 2d6 danni misteriosi." });
        let doc = convert(&record, "incantesimi/x.json").unwrap();
        assert_eq!(doc.system["damage"]["parts"], json!([]));
    }
}
