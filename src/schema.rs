//! 유형별 `system` 블록 템플릿
//!
//! 각 문서 유형이 반드시 가져야 하는 전체 키 집합과 기본값을 정의합니다.
//! 변환기는 템플릿에서 출발해 소스에 있는 값만 덮어씁니다.

use serde_json::{json, Map, Value};

use crate::document::DocType;
use crate::terms::{ABILITY_CODES, SKILL_ABILITIES};

/// 설명/출처 공통 블록
fn describable() -> Value {
    json!({
        "description": { "value": "", "chat": "" },
        "source": { "book": "", "page": "", "custom": "" }
    })
}

/// 물리적 아이템 공통 블록
fn physical() -> Value {
    json!({
        "quantity": 1,
        "weight": { "value": 0.0, "units": "lb" },
        "price": { "value": 0.0, "denomination": "gp" },
        "rarity": crate::terms::DEFAULT_RARITY,
        "identified": true,
        "attunement": "",
        "attuned": false,
        "equipped": false,
        "properties": []
    })
}

fn activation(kind: &str, cost: u32) -> Value {
    json!({ "type": kind, "cost": cost, "condition": "" })
}

fn damage() -> Value {
    json!({ "parts": [], "versatile": "" })
}

fn save() -> Value {
    json!({ "ability": "", "dc": null, "scaling": "spell" })
}

fn resistance() -> Value {
    json!({ "value": [], "bypasses": [], "custom": "" })
}

fn npc() -> Value {
    let mut abilities = Map::new();
    for code in ABILITY_CODES {
        abilities.insert(
            code.to_string(),
            json!({ "value": 10, "proficient": 0, "mod": 0, "save": 0 }),
        );
    }

    let mut skills = Map::new();
    for (code, ability) in SKILL_ABILITIES {
        skills.insert(
            code.to_string(),
            json!({ "value": 0, "ability": ability, "bonus": 0, "total": 0, "passive": 10 }),
        );
    }

    json!({
        "abilities": abilities,
        "attributes": {
            "ac": { "flat": 10, "calc": "flat", "formula": "" },
            "hp": { "value": 1, "max": 1, "formula": "" },
            "init": { "ability": "dex", "bonus": 0 },
            "movement": {
                "walk": 30, "fly": 0, "swim": 0, "climb": 0, "burrow": 0,
                "hover": false, "units": "ft"
            },
            "senses": {
                "darkvision": 0, "blindsight": 0, "tremorsense": 0, "truesight": 0,
                "units": "ft", "special": ""
            },
            "prof": 2,
            "spellcasting": "int",
            "spelldc": 10,
            "spellattack": 2
        },
        "details": {
            "biography": { "value": "" },
            "alignment": "",
            "type": { "value": "", "subtype": "", "swarm": "", "custom": "" },
            "cr": 0.0,
            "xp": { "value": 10 },
            "source": { "book": "", "page": "", "custom": "" }
        },
        "traits": {
            "size": "med",
            "di": resistance(),
            "dr": resistance(),
            "dv": resistance(),
            "ci": { "value": [], "custom": "" },
            "languages": { "value": [], "custom": "" }
        },
        "skills": skills,
        "resources": {
            "legact": { "value": 0, "max": 0 },
            "legres": { "value": 0, "max": 0 },
            "lair": { "value": false, "initiative": 20 }
        }
    })
}

fn weapon() -> Value {
    json!({
        "type": { "value": "simpleM", "baseItem": "" },
        "activation": activation("action", 1),
        "actionType": "mwak",
        "ability": "",
        "attack": { "bonus": "", "flat": false },
        "damage": damage(),
        "range": { "value": 5, "long": 0, "units": "ft" },
        "magicalBonus": 0,
        "proficient": true
    })
}

fn equipment() -> Value {
    json!({
        "type": { "value": "trinket", "baseItem": "" },
        "armor": { "value": 0, "dex": null, "magicalBonus": 0 },
        "strength": 0,
        "activation": activation("", 0)
    })
}

fn consumable() -> Value {
    json!({
        "type": { "value": "potion", "subtype": "" },
        "activation": activation("action", 1),
        "uses": { "value": 1, "max": 1, "per": "charges", "autoDestroy": true },
        "damage": damage(),
        "save": save()
    })
}

fn loot() -> Value {
    json!({
        "type": { "value": "", "subtype": "" }
    })
}

fn spell() -> Value {
    json!({
        "level": 0,
        "school": "",
        "components": {
            "vocal": false, "somatic": false, "material": false,
            "ritual": false, "concentration": false
        },
        "materials": { "value": "", "consumed": false, "cost": 0.0, "supply": 0 },
        "activation": activation("action", 1),
        "duration": { "value": "", "units": "inst" },
        "range": { "value": null, "long": null, "units": "", "special": "" },
        "target": {
            "template": { "type": "", "size": 0, "units": "ft" },
            "affects": { "type": "", "count": "" }
        },
        "save": save(),
        "damage": damage(),
        "actionType": "util",
        "preparation": { "mode": "prepared", "prepared": false },
        "uses": { "value": 0, "max": 0, "per": "" },
        "classes": []
    })
}

fn feat() -> Value {
    json!({
        "type": { "value": "", "subtype": "" },
        "requirements": "",
        "activation": activation("", 0),
        "uses": { "value": 0, "max": 0, "per": "" },
        "recharge": { "value": 0, "charged": false },
        "actionType": "",
        "damage": damage(),
        "save": save(),
        "properties": []
    })
}

fn background() -> Value {
    json!({
        "advancement": [],
        "startingEquipment": [],
        "wealth": "",
        "feature": { "name": "", "description": "" }
    })
}

fn class() -> Value {
    json!({
        "identifier": "",
        "levels": 1,
        "hitDice": "d8",
        "spellcasting": { "progression": "none", "ability": "" },
        "advancement": [],
        "startingEquipment": []
    })
}

fn subclass() -> Value {
    json!({
        "identifier": "",
        "classIdentifier": "",
        "spellcasting": { "progression": "none", "ability": "" },
        "advancement": []
    })
}

fn journal() -> Value {
    json!({
        "category": "",
        "pages": []
    })
}

fn table() -> Value {
    json!({
        "formula": "1d20",
        "replacement": true,
        "displayRoll": true,
        "results": []
    })
}

/// 문서 유형별 전체 `system` 템플릿
pub fn template(doc_type: DocType) -> Value {
    let mut system = describable();
    let mut parts = vec![];
    match doc_type {
        DocType::Npc => parts.push(npc()),
        DocType::Weapon => {
            parts.push(physical());
            parts.push(weapon());
        }
        DocType::Equipment => {
            parts.push(physical());
            parts.push(equipment());
        }
        DocType::Consumable => {
            parts.push(physical());
            parts.push(consumable());
        }
        DocType::Loot => {
            parts.push(physical());
            parts.push(loot());
        }
        DocType::Spell => parts.push(spell()),
        DocType::Feat => parts.push(feat()),
        DocType::Background => parts.push(background()),
        DocType::Class => parts.push(class()),
        DocType::Subclass => parts.push(subclass()),
        DocType::Journal => parts.push(journal()),
        DocType::Table => parts.push(table()),
    }
    for part in parts {
        merge(&mut system, part);
    }
    system
}

/// 최상위 키 병합 (뒤쪽이 우선)
fn merge(target: &mut Value, source: Value) {
    if let (Value::Object(target), Value::Object(source)) = (target, source) {
        for (key, value) in source {
            target.insert(key, value);
        }
    }
}

/// 점 표기 경로에 값 설정 (중간 객체가 없으면 생성)
///
/// # Examples
/// ```
/// use serde_json::json;
/// use vttconvert::schema::set_path;
///
/// let mut system = json!({"attributes": {"hp": {"max": 1}}});
/// set_path(&mut system, "attributes.hp.max", json!(7));
/// assert_eq!(system["attributes"]["hp"]["max"], 7);
/// ```
pub fn set_path(target: &mut Value, path: &str, value: Value) {
    let mut current = target;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = ({ current }) else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// 템플릿에 있지만 실제 값에 없는 키 경로 목록
pub fn missing_keys(template: &Value, actual: &Value) -> Vec<String> {
    let mut missing = Vec::new();
    collect_missing(template, actual, "", &mut missing);
    missing
}

fn collect_missing(template: &Value, actual: &Value, prefix: &str, missing: &mut Vec<String>) {
    let Value::Object(expected) = template else {
        return;
    };
    for (key, expected_value) in expected {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match actual.get(key) {
            Some(actual_value) => collect_missing(expected_value, actual_value, &path, missing),
            None => missing.push(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_description_and_source() {
        for doc_type in DocType::ALL {
            let system = template(doc_type);
            assert!(system["description"]["value"].is_string(), "{}", doc_type);
            assert!(system["source"]["book"].is_string(), "{}", doc_type);
        }
    }

    #[test]
    fn test_npc_template_shape() {
        let system = template(DocType::Npc);
        assert_eq!(system["abilities"].as_object().unwrap().len(), 6);
        assert_eq!(system["skills"].as_object().unwrap().len(), 18);
        assert_eq!(system["skills"]["ste"]["ability"], "dex");
        assert_eq!(system["attributes"]["movement"]["walk"], 30);
    }

    #[test]
    fn test_physical_items_share_price_block() {
        for doc_type in [
            DocType::Weapon,
            DocType::Equipment,
            DocType::Consumable,
            DocType::Loot,
        ] {
            let system = template(doc_type);
            assert_eq!(system["price"]["denomination"], "gp");
            assert_eq!(system["rarity"], "common");
        }
    }

    #[test]
    fn test_set_path_creates_intermediate_objects() {
        let mut value = json!({});
        set_path(&mut value, "a.b.c", json!(1));
        assert_eq!(value, json!({"a": {"b": {"c": 1}}}));

        let mut scalar = json!({"a": 5});
        set_path(&mut scalar, "a.b", json!(true));
        assert_eq!(scalar, json!({"a": {"b": true}}));
    }

    #[test]
    fn test_missing_keys_reports_nested_paths() {
        let template = json!({"a": {"b": 1, "c": 2}, "d": []});
        let actual = json!({"a": {"b": 5}});
        assert_eq!(missing_keys(&template, &actual), vec!["a.c", "d"]);
        assert!(missing_keys(&template, &template).is_empty());
    }
}
