//! 무기/방어구/마법 물품 변환기
//!
//! 세 변환기는 가격/무게/희귀도 같은 물리적 아이템 블록을 공유합니다.
//! 마법 물품은 분류 텍스트에 따라 무기/소모품/장비로 유형이 세분화되고,
//! 설명에서 AC 보너스, 능력치 고정, 피해 저항 이펙트를 추출합니다.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use super::{base_document, build_effect, require_object, DESCRIPTION_KEYS};
use crate::dice::{self, DamagePart};
use crate::document::{DocType, Document, EffectChange, EffectMode};
use crate::error::Result;
use crate::record::Record;
use crate::schema::set_path;
use crate::terms::{self, ABILITIES, ARMOR_TYPES, DAMAGE_TYPES, RARITIES, WEAPON_PROPERTIES};
use crate::units::{parse_distance_pair, parse_number, parse_price, parse_weight};

/// 이름의 마법 보너스 (`Spada lunga +1`)
static MAGIC_BONUS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+\s*(\d+)").unwrap());

/// `+1 alla CA`, `bonus di +2 alla Classe Armatura`
static AC_BONUS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\+\s*(\d+)\s+(?:(?:alla|a)\s+)?(?:classe\s+armatura|CA)\b").unwrap()
});

/// `la tua Forza diventa 21`, `il tuo punteggio di Costituzione diventa 19`
static ABILITY_SET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:punteggio\s+di\s+|la\s+tua\s+)(\p{L}+)\s+(?:diventa|è)\s+(?:pari\s+a\s+)?(\d+)",
    )
    .unwrap()
});

/// `resistenza ai danni da fuoco`
static RESISTANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)resistenza\s+(?:ai|al)\s+danni\s+(?:da\s+|di\s+)?(\p{L}+)").unwrap()
});

/// 무기 레코드 변환
pub fn convert_weapon(record: &Value, relative_path: &str) -> Result<Document> {
    let source = require_object(record, relative_path)?;
    let mut doc = base_document(DocType::Weapon, &source, relative_path);
    apply_physical(&mut doc.system, &source);
    apply_weapon(&mut doc.system, &source, &doc.name);
    Ok(doc)
}

/// 방어구 레코드 변환
pub fn convert_armor(record: &Value, relative_path: &str) -> Result<Document> {
    let source = require_object(record, relative_path)?;
    let mut doc = base_document(DocType::Equipment, &source, relative_path);
    apply_physical(&mut doc.system, &source);
    let category = source
        .text(&["categoria", "tipo"])
        .unwrap_or_else(|| doc.name.clone());
    apply_armor(&mut doc.system, &source, &category, &doc.name);
    Ok(doc)
}

/// 마법 물품 레코드 변환
pub fn convert_magic_item(record: &Value, relative_path: &str) -> Result<Document> {
    let source = require_object(record, relative_path)?;
    let category = source
        .text(&["tipo", "categoria", "type"])
        .unwrap_or_default();
    let kind = MagicItemKind::from_category(&category);

    let mut doc = base_document(kind.doc_type(), &source, relative_path);
    apply_physical(&mut doc.system, &source);

    let rarity = source
        .text(&["rarita", "rarità", "rarity"])
        .and_then(|text| terms::match_term(RARITIES, &text))
        .or_else(|| terms::match_term(RARITIES, &category))
        .unwrap_or(terms::DEFAULT_RARITY);
    set_path(&mut doc.system, "rarity", json!(rarity));

    let attunement = match source.flag(&["sintonia", "richiede_sintonia", "attunement"]) {
        Some(false) => "",
        _ => "required",
    };
    set_path(&mut doc.system, "attunement", json!(attunement));

    let name = doc.name.clone();
    match kind {
        MagicItemKind::Weapon => apply_weapon(&mut doc.system, &source, &name),
        MagicItemKind::Armor => {
            apply_armor(&mut doc.system, &source, &category, &name);
            if magical_bonus(&name).is_none() {
                let description = source.text(DESCRIPTION_KEYS).unwrap_or_default();
                if let Some(bonus) = description_ac_bonus(&description) {
                    set_path(&mut doc.system, "armor.magicalBonus", json!(bonus));
                }
            }
        }
        MagicItemKind::Consumable(subtype) => {
            set_path(&mut doc.system, "type.value", json!(subtype));
            let description = source.text(DESCRIPTION_KEYS).unwrap_or_default();
            set_path(
                &mut doc.system,
                "damage.parts",
                json!(dice::extract_damage_parts(&description)),
            );
        }
        MagicItemKind::Wondrous => {
            set_path(&mut doc.system, "type.value", json!("trinket"));
        }
    }

    let description = source.text(DESCRIPTION_KEYS).unwrap_or_default();
    let changes = item_effect_changes(&name, &description, kind == MagicItemKind::Armor);
    if !changes.is_empty() {
        let effect = build_effect(&doc.id, 0, &name, changes);
        doc.effects.push(effect);
    }
    Ok(doc)
}

/// 마법 물품 세부 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MagicItemKind {
    Weapon,
    Armor,
    Consumable(&'static str),
    Wondrous,
}

impl MagicItemKind {
    fn from_category(category: &str) -> Self {
        let lower = category.to_lowercase();
        if lower.contains("armatura") || lower.contains("scudo") {
            MagicItemKind::Armor
        } else if lower.contains("arma") {
            MagicItemKind::Weapon
        } else if lower.contains("pozione") {
            MagicItemKind::Consumable("potion")
        } else if lower.contains("pergamena") {
            MagicItemKind::Consumable("scroll")
        } else if lower.contains("bacchetta") {
            MagicItemKind::Consumable("wand")
        } else {
            MagicItemKind::Wondrous
        }
    }

    fn doc_type(self) -> DocType {
        match self {
            MagicItemKind::Weapon => DocType::Weapon,
            MagicItemKind::Consumable(_) => DocType::Consumable,
            MagicItemKind::Armor | MagicItemKind::Wondrous => DocType::Equipment,
        }
    }
}

/// 가격, 무게, 수량 (물리적 아이템 공통)
pub(crate) fn apply_physical(system: &mut Value, source: &Record) {
    if let Some(price) = source
        .text(&["costo", "prezzo", "price", "valore"])
        .and_then(|text| parse_price(&text))
    {
        set_path(system, "price", json!({ "value": price, "denomination": "gp" }));
    }
    if let Some(weight) = source
        .text(&["peso", "weight"])
        .and_then(|text| parse_weight(&text))
    {
        set_path(system, "weight", json!({ "value": weight, "units": "lb" }));
    }
    if let Some(quantity) = source.integer(&["quantita", "quantità", "quantity"]) {
        set_path(system, "quantity", json!(quantity.max(0)));
    }
}

/// 이름의 `+N` 마법 보너스
pub(crate) fn magical_bonus(name: &str) -> Option<u32> {
    MAGIC_BONUS_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn apply_weapon(system: &mut Value, source: &Record, name: &str) {
    let category = source
        .text(&["categoria", "tipo_arma", "tipo"])
        .unwrap_or_default()
        .to_lowercase();
    let properties_text = super::joined_text(source, &["proprieta", "proprietà", "properties"])
        .unwrap_or_default();
    let properties = terms::match_all_terms(WEAPON_PROPERTIES, &properties_text);

    let ranged = category.contains("distanza") || properties.contains(&"amm");
    let martial = category.contains("marzial");
    let weapon_type = match (martial, ranged) {
        (false, false) => "simpleM",
        (false, true) => "simpleR",
        (true, false) => "martialM",
        (true, true) => "martialR",
    };
    set_path(system, "type.value", json!(weapon_type));
    set_path(system, "actionType", json!(if ranged { "rwak" } else { "mwak" }));
    set_path(system, "properties", json!(properties));

    if let Some(damage_text) = super::joined_text(source, &["danni", "danno", "damage"]) {
        let damage_text = match source.text(&["tipo_danno", "tipo_danni"]) {
            Some(kind) => format!("{} {}", damage_text, kind),
            None => damage_text,
        };
        let parts: Vec<DamagePart> = dice::parse_damage(&damage_text);
        set_path(system, "damage.parts", json!(parts));
    }

    let versatile = properties_text
        .split(|c: char| c == ',' || c == ';')
        .find(|segment| segment.to_lowercase().contains("versatile"))
        .and_then(dice::leading_formula)
        .filter(|formula| formula.contains('d'));
    if let Some(formula) = versatile {
        set_path(system, "damage.versatile", json!(formula));
    }

    let range_text = source
        .text(&["gittata", "range"])
        .unwrap_or_else(|| properties_text.clone());
    if let Some((normal, long)) = parse_distance_pair(&range_text) {
        set_path(system, "range", json!({ "value": normal, "long": long, "units": "ft" }));
    } else if properties.contains(&"rch") {
        set_path(system, "range", json!({ "value": 10, "long": 0, "units": "ft" }));
    }

    if let Some(bonus) = magical_bonus(name) {
        set_path(system, "magicalBonus", json!(bonus));
    }
}

fn apply_armor(system: &mut Value, source: &Record, category: &str, name: &str) {
    let armor_type = terms::match_term(ARMOR_TYPES, category)
        .or_else(|| terms::match_term(ARMOR_TYPES, name))
        .unwrap_or("light");
    set_path(system, "type.value", json!(armor_type));

    let ac_text = source
        .text(&["classe_armatura", "ca", "ac"])
        .unwrap_or_default();
    let ac = parse_number(&ac_text).map(|n| n as i64).unwrap_or(0);
    let dex_cap: Option<i64> = match armor_type {
        "medium" => Some(
            ac_text
                .to_lowercase()
                .split_once("max")
                .and_then(|(_, rest)| parse_number(rest))
                .map(|n| n as i64)
                .unwrap_or(2),
        ),
        "heavy" => Some(0),
        _ => None,
    };
    let magic = magical_bonus(name).unwrap_or(0);
    set_path(
        system,
        "armor",
        json!({ "value": ac, "dex": dex_cap, "magicalBonus": magic }),
    );

    let strength = source
        .text(&["forza", "requisito_forza", "strength"])
        .and_then(|text| parse_number(&text))
        .map(|n| n as i64)
        .unwrap_or(0);
    set_path(system, "strength", json!(strength));

    let stealth = source
        .text(&["furtivita", "furtività", "stealth"])
        .map(|text| text.to_lowercase().contains("svantaggio"))
        .unwrap_or(false);
    if stealth {
        set_path(system, "properties", json!(["stealthDisadvantage"]));
    }
}

/// 설명의 `+N alla CA`
fn description_ac_bonus(description: &str) -> Option<u32> {
    AC_BONUS_RE
        .captures(description)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// 설명 텍스트에서 이펙트 변경 사항 추출
///
/// 방어구의 CA 보너스는 `armor.magicalBonus`에 들어가므로 이펙트로 만들지 않는다.
fn item_effect_changes(name: &str, description: &str, is_armor: bool) -> Vec<EffectChange> {
    let mut changes = Vec::new();

    let ac_bonus = description_ac_bonus(description).or_else(|| {
        name.to_lowercase()
            .contains("protezione")
            .then(|| magical_bonus(name))
            .flatten()
    });
    if let Some(bonus) = ac_bonus.filter(|_| !is_armor) {
        changes.push(EffectChange::new(
            "system.attributes.ac.bonus",
            EffectMode::Add,
            format!("+{}", bonus),
        ));
    }

    for caps in ABILITY_SET_RE.captures_iter(description) {
        let (Some(word), Some(score)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if let Some(code) = terms::match_term(&ABILITIES[..6], word.as_str()) {
            changes.push(EffectChange::new(
                format!("system.abilities.{}.value", code),
                EffectMode::Upgrade,
                score.as_str(),
            ));
        }
    }

    for caps in RESISTANCE_RE.captures_iter(description) {
        let Some(word) = caps.get(1) else {
            continue;
        };
        if let Some(code) = terms::match_term(DAMAGE_TYPES, word.as_str()) {
            changes.push(EffectChange::new(
                "system.traits.dr.value",
                EffectMode::Add,
                code,
            ));
        }
    }

    changes
}
