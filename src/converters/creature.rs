//! 크리처 변환기
//!
//! 이탈리아어 능력치 블록을 NPC 액터로 변환합니다.
//!
//! - 능력치/내성/기술: 숙련 보너스는 CR 단계표에서 파생
//! - 이동/감각: 미터 → 피트 (5피트 단위)
//! - 피해/상태 면역, 언어: 포함 매칭 사전
//! - 특성/행동/반응/전설 행동/둥지 행동/주문: 부모 ID 아래의 하위 문서
//! - 프로토타입 토큰: 크기, 성향, 시야

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use super::{base_document, require_object, spell, to_html, DESCRIPTION_KEYS, NAME_KEYS};
use crate::dice::{self, DamagePart};
use crate::document::{DocType, Document, Metadata, PrototypeToken, Sight};
use crate::error::Result;
use crate::ids::child_id;
use crate::record::{split_list, Record};
use crate::schema::{self, set_path};
use crate::tables::{normalize_cr, parse_cr, proficiency_for_cr, token_footprint, xp_for_cr};
use crate::terms::{
    self, ability_modifier, TermTable, ABILITIES, ABILITY_CODES, CONDITIONS, CREATURE_TYPES,
    DAMAGE_TYPES, LANGUAGES, MOVEMENT, SENSES, SIZES, SKILLS, SKILL_ABILITIES,
};
use crate::units::{parse_distance, parse_distance_pair, parse_number};

/// `(Ricarica 5–6)`
static RECHARGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ricarica\s+(\d)").unwrap());

/// `(3/Giorno)`
static DAILY_USES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*/\s*giorno").unwrap());

/// `(Costa 2 Azioni)`
static ACTION_COST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)costa\s+(\d+)\s+azion").unwrap());

/// `7 (2d6)` 안의 주사위 공식
static HIT_DICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d+d\d+(?:\s*[+\-−]\s*\d+)?").unwrap());

/// 괄호 안 텍스트
static PARENTHETICAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]*)\)").unwrap());

/// 주문 목록 키
const SPELL_KEYS: &[&str] = &["incantesimi", "incantesimi_conosciuti", "spells"];

/// 하위 문서 분류
struct ChildCategory {
    keys: &'static [&'static str],
    /// ID 범위 이름
    label: &'static str,
    activation: &'static str,
    icon: &'static str,
}

static CATEGORIES: [ChildCategory; 6] = [
    ChildCategory {
        keys: &["tratti", "tratti_speciali", "capacita_speciali"],
        label: "tratti",
        activation: "",
        icon: "icons/svg/book.svg",
    },
    ChildCategory {
        keys: &["azioni", "actions"],
        label: "azioni",
        activation: "action",
        icon: "icons/svg/sword.svg",
    },
    ChildCategory {
        keys: &["azioni_bonus"],
        label: "azioni_bonus",
        activation: "bonus",
        icon: "icons/svg/clockwork.svg",
    },
    ChildCategory {
        keys: &["reazioni", "reactions"],
        label: "reazioni",
        activation: "reaction",
        icon: "icons/svg/combat.svg",
    },
    ChildCategory {
        keys: &["azioni_leggendarie"],
        label: "azioni_leggendarie",
        activation: "legendary",
        icon: "icons/svg/crown.svg",
    },
    ChildCategory {
        keys: &["azioni_tana", "azioni_del_covo"],
        label: "azioni_tana",
        activation: "lair",
        icon: "icons/svg/castle.svg",
    },
];

/// 크리처 레코드 변환
pub fn convert(record: &Value, relative_path: &str) -> Result<Document> {
    let source = require_object(record, relative_path)?;
    let mut doc = base_document(DocType::Npc, &source, relative_path);

    let cr = challenge_rating(&source);
    let prof = proficiency_for_cr(cr);
    let scores = ability_scores(&source);
    let modifier_of = |ability: &str| {
        ABILITY_CODES
            .iter()
            .position(|code| *code == ability)
            .map(|i| ability_modifier(scores[i]))
            .unwrap_or(0)
    };

    // 능력치와 내성
    let saves = bonus_pairs(
        &segments(source.get(&["tiri_salvezza", "ts", "saving_throws"])),
        ABILITIES,
    );
    let mut abilities = Map::new();
    for (i, code) in ABILITY_CODES.iter().enumerate() {
        let modifier = ability_modifier(scores[i]);
        let save = saves
            .iter()
            .find(|(ability, _)| ability == code)
            .map(|(_, bonus)| *bonus);
        abilities.insert(
            code.to_string(),
            json!({
                "value": scores[i],
                "proficient": u8::from(save.is_some()),
                "mod": modifier,
                "save": save.unwrap_or(modifier)
            }),
        );
    }
    set_path(&mut doc.system, "abilities", Value::Object(abilities));

    // 감각 (수동 지각 재정의가 기술 계산에 필요하므로 먼저)
    let senses = parse_senses(&segments(source.get(&["sensi", "senses"])));

    // 기술
    let supplied = bonus_pairs(
        &segments(source.get(&["abilita", "abilità", "competenze", "skills"])),
        SKILLS,
    );
    let mut skills = Map::new();
    for (code, ability) in SKILL_ABILITIES {
        let modifier = modifier_of(ability);
        let (tier, bonus, total) = match supplied.iter().find(|(skill, _)| *skill == code) {
            Some((_, total)) => {
                let tier = skill_tier(*total, modifier, prof);
                (tier, total - modifier - i64::from(tier) * prof, *total)
            }
            None => (0, 0, modifier),
        };
        let passive = match (code, senses.passive_perception) {
            ("prc", Some(passive)) => passive,
            _ => 10 + total,
        };
        skills.insert(
            code.to_string(),
            json!({
                "value": tier,
                "ability": ability,
                "bonus": bonus,
                "total": total,
                "passive": passive
            }),
        );
    }
    set_path(&mut doc.system, "skills", Value::Object(skills));

    // 속성
    let system = &mut doc.system;
    if let Some(ac_text) = source.text(&["classe_armatura", "ca", "ac"]) {
        let calc = if ac_text.to_lowercase().contains("naturale") {
            "natural"
        } else {
            "flat"
        };
        let flat = parse_number(&ac_text).map(|n| n as i64).unwrap_or(10);
        set_path(
            system,
            "attributes.ac",
            json!({ "flat": flat, "calc": calc, "formula": "" }),
        );
    }
    if let Some(hp_text) = source.text(&["punti_ferita", "pf", "hp"]) {
        let hp = parse_number(&hp_text).map(|n| n as i64).unwrap_or(1);
        let formula = source
            .text(&["dadi_vita"])
            .or_else(|| HIT_DICE_RE.find(&hp_text).map(|m| m.as_str().to_string()))
            .map(|f| dice::normalize_formula(&f))
            .unwrap_or_default();
        set_path(
            system,
            "attributes.hp",
            json!({ "value": hp, "max": hp, "formula": formula }),
        );
    }
    set_path(
        system,
        "attributes.movement",
        parse_movement(&segments(source.get(&["velocita", "velocità", "movimento", "speed"]))),
    );
    set_path(system, "attributes.senses", senses.to_json());
    set_path(system, "attributes.prof", json!(prof));

    // 주문 시전
    let casting_text = spellcasting_text(&source);
    let spell_ability = source
        .text(&["caratteristica_incantatore", "caratteristica_incantesimi"])
        .and_then(|text| terms::match_term(ABILITIES, &text))
        .or_else(|| casting_text.as_deref().and_then(casting_ability))
        .unwrap_or("int");
    let spell_mod = modifier_of(spell_ability);
    let spell_dc = source
        .integer(&["cd_incantesimi", "cd_incantatore"])
        .or_else(|| {
            casting_text
                .as_deref()
                .and_then(dice::parse_save_dc)
                .map(i64::from)
        })
        .unwrap_or(8 + prof + spell_mod);
    let spell_attack = source
        .integer(&["attacco_incantesimi", "bonus_attacco_incantesimi"])
        .or_else(|| casting_text.as_deref().and_then(dice::parse_attack_bonus))
        .unwrap_or(prof + spell_mod);
    set_path(system, "attributes.spellcasting", json!(spell_ability));
    set_path(system, "attributes.spelldc", json!(spell_dc));
    set_path(system, "attributes.spellattack", json!(spell_attack));

    // 세부 정보
    let type_text = source.text(&["tipo", "type"]).unwrap_or_default();
    let creature_type = parse_creature_type(&type_text);
    let type_code = creature_type["value"].as_str().unwrap_or_default().to_string();
    set_path(system, "details.type", creature_type);
    if let Some(alignment) = source.text(&["allineamento", "alignment"]) {
        set_path(system, "details.alignment", json!(alignment));
    }
    if let Some(description) = source.text(DESCRIPTION_KEYS) {
        set_path(system, "details.biography.value", json!(to_html(&description)));
    }
    let source_block = system["source"].clone();
    set_path(system, "details.source", source_block);
    set_path(system, "details.cr", json!(cr));
    set_path(system, "details.xp.value", json!(xp_for_cr(cr)));

    // 특성
    let size = source
        .text(&["taglia", "dimensione", "size"])
        .and_then(|text| terms::match_term(SIZES, &text))
        .or_else(|| {
            let without_swarm = type_text.to_lowercase();
            let head = without_swarm.split("sciame").next().unwrap_or_default();
            terms::match_term(SIZES, head)
        })
        .unwrap_or("med");
    set_path(system, "traits.size", json!(size));
    set_path(
        system,
        "traits.di",
        resistance_block(super::joined_text(&source, &["immunita_danni", "immunità_danni"])),
    );
    set_path(
        system,
        "traits.dr",
        resistance_block(super::joined_text(&source, &["resistenze_danni", "resistenza_danni"])),
    );
    set_path(
        system,
        "traits.dv",
        resistance_block(super::joined_text(
            &source,
            &["vulnerabilita_danni", "vulnerabilità_danni"],
        )),
    );
    set_path(
        system,
        "traits.ci",
        condition_block(super::joined_text(
            &source,
            &["immunita_condizioni", "immunità_condizioni"],
        )),
    );
    set_path(
        system,
        "traits.languages",
        language_block(&segments(source.get(&["linguaggi", "lingue", "languages"]))),
    );

    // 하위 문서
    let parent_id = doc.id.clone();
    let mut children = Vec::new();
    let mut counts = [0usize; 6];
    for (slot, category) in CATEGORIES.iter().enumerate() {
        for (index, (name, text)) in entries(source.get(category.keys)).into_iter().enumerate() {
            let child = build_child(&parent_id, category, index, &name, &text, relative_path);
            children.push(child);
            counts[slot] += 1;
        }
    }
    children.extend(spell_children(&source, &parent_id, relative_path));

    // 자원
    let has_legendary = counts[4] > 0;
    let legendary_actions = if has_legendary {
        source
            .integer(&["azioni_leggendarie_per_round"])
            .unwrap_or(3)
    } else {
        0
    };
    let legendary_resistance = source
        .integer(&["resistenza_leggendaria", "resistenze_leggendarie"])
        .or_else(|| {
            children
                .iter()
                .find(|child| child.name.to_lowercase().contains("resistenza leggendaria"))
                .and_then(|child| child.system["uses"]["max"].as_i64())
        })
        .unwrap_or(0);
    set_path(
        &mut doc.system,
        "resources",
        json!({
            "legact": { "value": legendary_actions, "max": legendary_actions },
            "legres": { "value": legendary_resistance, "max": legendary_resistance },
            "lair": { "value": counts[5] > 0, "initiative": 20 }
        }),
    );

    let footprint = token_footprint(size);
    doc.prototype_token = Some(PrototypeToken {
        name: doc.name.clone(),
        width: footprint,
        height: footprint,
        disposition: if type_code == "beast" { 0 } else { -1 },
        actor_link: false,
        sight: Sight {
            enabled: senses.max_range() > 0,
            range: senses.max_range(),
        },
    });
    doc.items = children;
    Ok(doc)
}

/// 공급된 기술 총합에서 숙련 단계 역산 (0–2로 고정)
///
/// 기대값 이상의 보너스는 2단계로 잘리고 나머지는 `bonus`에 남습니다.
pub fn skill_tier(total: i64, modifier: i64, prof: i64) -> u8 {
    if total >= modifier + 2 * prof {
        2
    } else if total >= modifier + prof {
        1
    } else {
        0
    }
}

fn challenge_rating(source: &Record) -> f64 {
    let raw = match source.get(&["grado_sfida", "gs", "sfida", "cr"]) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_cr(s),
        _ => None,
    };
    normalize_cr(raw.unwrap_or(0.0))
}

fn ability_scores(source: &Record) -> [i64; 6] {
    let block = source.object(&["caratteristiche", "punteggi_caratteristica", "abilities"]);
    let mut scores = [10; 6];
    for (i, code) in ABILITY_CODES.iter().enumerate() {
        let from_block = block.and_then(|block| {
            block.entries().find_map(|(key, value)| {
                if terms::match_term(ABILITIES, key) == Some(*code) {
                    value_number(value)
                } else {
                    None
                }
            })
        });
        let flat = source.number(&[ABILITIES[i].0]);
        if let Some(score) = from_block.or(flat) {
            scores[i] = score.round() as i64;
        }
    }
    scores
}

fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        Value::Object(_) => Record::new(value).number(&["valore", "value", "punteggio"]),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// 문자열/배열/객체 형태의 값을 `"이름 값"` 구간 목록으로 평탄화
fn segments(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => split_list(s),
        Some(Value::Number(n)) => vec![n.to_string()],
        Some(Value::Array(items)) => items
            .iter()
            .flat_map(|item| match item {
                Value::String(s) => split_list(s),
                other => vec![value_text(other)],
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| format!("{} {}", key.replace('_', " "), value_text(value)))
            .map(|s| s.trim().to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// `Furtività +6` 같은 구간을 (코드, 보너스) 쌍으로
fn bonus_pairs(segments: &[String], table: TermTable) -> Vec<(&'static str, i64)> {
    segments
        .iter()
        .filter_map(|segment| {
            let code = terms::match_term(table, segment)?;
            let bonus = parse_number(segment)?;
            Some((code, bonus as i64))
        })
        .collect()
}

/// 감각 파싱 결과
#[derive(Debug, Default, Clone, PartialEq)]
struct Senses {
    darkvision: u32,
    blindsight: u32,
    tremorsense: u32,
    truesight: u32,
    special: Vec<String>,
    passive_perception: Option<i64>,
}

impl Senses {
    fn max_range(&self) -> u32 {
        self.darkvision
            .max(self.blindsight)
            .max(self.tremorsense)
            .max(self.truesight)
    }

    fn to_json(&self) -> Value {
        json!({
            "darkvision": self.darkvision,
            "blindsight": self.blindsight,
            "tremorsense": self.tremorsense,
            "truesight": self.truesight,
            "units": "ft",
            "special": self.special.join(", ")
        })
    }
}

fn parse_senses(segments: &[String]) -> Senses {
    let mut senses = Senses::default();
    for segment in segments {
        let lower = segment.to_lowercase();
        if lower.contains("passiva") {
            senses.passive_perception = parse_number(&lower).map(|n| n as i64);
            continue;
        }
        let Some(code) = terms::match_term(SENSES, &lower) else {
            senses.special.push(segment.clone());
            continue;
        };
        let range = parse_distance(segment).unwrap_or(0);
        let slot = match code {
            "darkvision" => &mut senses.darkvision,
            "blindsight" => &mut senses.blindsight,
            "tremorsense" => &mut senses.tremorsense,
            _ => &mut senses.truesight,
        };
        *slot = (*slot).max(range);
    }
    senses
}

fn parse_movement(segments: &[String]) -> Value {
    let mut movement = schema::template(DocType::Npc)["attributes"]["movement"].clone();
    let mut walk: Option<u32> = None;
    let mut found = false;
    for segment in segments {
        let lower = segment.to_lowercase();
        if lower.contains("fluttu") {
            movement["hover"] = json!(true);
        }
        let Some(feet) = parse_distance(segment) else {
            continue;
        };
        found = true;
        match terms::match_term(MOVEMENT, &lower).unwrap_or("walk") {
            "walk" => walk = Some(walk.unwrap_or(0).max(feet)),
            kind => movement[kind] = json!(feet),
        }
    }
    if found {
        movement["walk"] = json!(walk.unwrap_or(0));
    }
    movement
}

fn resistance_block(text: Option<String>) -> Value {
    let text = text.unwrap_or_default();
    let lower = text.to_lowercase();
    let value = terms::match_all_terms(DAMAGE_TYPES, &text);
    let bypasses: Vec<&str> = if lower.contains("non magic") {
        vec!["mgc"]
    } else {
        Vec::new()
    };
    let custom = if value.is_empty() { text.trim() } else { "" };
    json!({ "value": value, "bypasses": bypasses, "custom": custom })
}

fn condition_block(text: Option<String>) -> Value {
    let text = text.unwrap_or_default();
    let value = terms::match_all_terms(CONDITIONS, &text);
    let custom = if value.is_empty() { text.trim() } else { "" };
    json!({ "value": value, "custom": custom })
}

fn language_block(segments: &[String]) -> Value {
    let mut value: Vec<&'static str> = Vec::new();
    let mut custom: Vec<&str> = Vec::new();
    for segment in segments {
        if !segment.chars().any(char::is_alphanumeric) {
            continue;
        }
        match terms::match_term(LANGUAGES, segment) {
            Some(code) if !value.contains(&code) => value.push(code),
            Some(_) => {}
            None => custom.push(segment),
        }
    }
    json!({ "value": value, "custom": custom.join("; ") })
}

fn parse_creature_type(text: &str) -> Value {
    let lower = text.to_lowercase();
    let value = terms::match_term(CREATURE_TYPES, &lower);
    let subtype = PARENTHETICAL_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let swarm = match lower.split_once("sciame") {
        Some((_, rest)) => terms::match_term(SIZES, rest).unwrap_or(""),
        None => "",
    };
    json!({
        "value": value.unwrap_or(""),
        "subtype": subtype,
        "swarm": swarm,
        "custom": if value.is_none() { text.trim() } else { "" }
    })
}

/// 주문 시전 특성 텍스트
fn spellcasting_text(source: &Record) -> Option<String> {
    entries(source.get(CATEGORIES[0].keys))
        .into_iter()
        .map(|(_, text)| text)
        .find(|text| text.to_lowercase().contains("incantatore"))
}

/// `caratteristica da incantatore è Saggezza` → wis
fn casting_ability(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let start = lower.find("incantatore")? + "incantatore".len();
    let window: String = lower[start..].chars().take(40).collect();
    terms::match_term(&ABILITIES[..6], &window)
}

/// 하위 항목 목록 (객체 `{nome, descrizione}`, 문자열 `"Nome. Testo"`, 이름→텍스트 맵)
fn entries(value: Option<&Value>) -> Vec<(String, String)> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(_) => {
                    let record = Record::new(item);
                    let name = record.text(NAME_KEYS).unwrap_or_default();
                    let text = record.text(DESCRIPTION_KEYS).unwrap_or_default();
                    if name.is_empty() && text.is_empty() {
                        None
                    } else {
                        Some((name, text))
                    }
                }
                Value::String(s) => split_entry(s),
                _ => None,
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, text)| (name.clone(), value_text(text)))
            .collect(),
        Some(Value::String(s)) => s.lines().filter_map(split_entry).collect(),
        _ => Vec::new(),
    }
}

fn split_entry(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.split_once(". ") {
        Some((name, rest)) if name.chars().count() <= 80 => {
            Some((name.trim().to_string(), rest.trim().to_string()))
        }
        _ => Some((String::new(), text.to_string())),
    }
}

fn is_attack(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("attacco con arma")
        || lower.contains("attacco con incantesimo")
        || lower.contains("per colpire")
}

fn build_child(
    parent_id: &str,
    category: &ChildCategory,
    index: usize,
    name: &str,
    text: &str,
    relative_path: &str,
) -> Document {
    let name = if name.is_empty() {
        format!("{} {}", category.label.replace('_', " "), index + 1)
    } else {
        name.to_string()
    };
    let markers = format!("{} {}", name, text);
    let cost = if category.activation.is_empty() {
        0
    } else {
        capture_number(&ACTION_COST_RE, &markers).unwrap_or(1)
    };
    let activation = json!({ "type": category.activation, "cost": cost, "condition": "" });

    let attack = !category.activation.is_empty() && is_attack(text);
    let doc_type = if attack { DocType::Weapon } else { DocType::Feat };
    let mut system = schema::template(doc_type);
    set_path(&mut system, "description.value", json!(to_html(text)));
    set_path(&mut system, "activation", activation);

    if attack {
        fill_attack(&mut system, text);
    } else {
        fill_feature(&mut system, &markers, text);
    }

    Document {
        id: child_id(parent_id, category.label, index, &name),
        name,
        doc_type,
        collection: doc_type.collection(),
        img: category.icon.to_string(),
        system,
        effects: Vec::new(),
        items: Vec::new(),
        prototype_token: None,
        metadata: Metadata {
            source_path: relative_path.to_string(),
            ..Metadata::default()
        },
    }
}

fn capture_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// 공격 항목 → 무기 하위 문서 필드
fn fill_attack(system: &mut Value, text: &str) {
    let lower = text.to_lowercase();
    let spell_attack = lower.contains("incantesimo");
    let ranged = lower.contains("a distanza") && !lower.contains("mischia o a distanza");
    let action_type = match (spell_attack, ranged) {
        (true, true) => "rsak",
        (true, false) => "msak",
        (false, true) => "rwak",
        (false, false) => "mwak",
    };
    set_path(system, "type.value", json!("natural"));
    set_path(system, "actionType", json!(action_type));
    set_path(system, "equipped", json!(true));
    if let Some(bonus) = dice::parse_attack_bonus(text) {
        set_path(system, "attack", json!({ "bonus": bonus.to_string(), "flat": true }));
    }

    let hit = lower.find("colpito").map(|i| &lower[i..]).unwrap_or(&lower);
    let parts: Vec<DamagePart> = dice::parse_damage(hit);
    set_path(system, "damage.parts", json!(parts));

    if let Some((normal, long)) = parse_distance_pair(&lower) {
        set_path(system, "range", json!({ "value": normal, "long": long, "units": "ft" }));
    } else if let Some(reach) = lower
        .find("portata")
        .and_then(|i| parse_distance(&lower[i..]))
    {
        set_path(system, "range", json!({ "value": reach, "long": 0, "units": "ft" }));
    }
}

/// 일반 특성/행동 → 특기 하위 문서 필드
fn fill_feature(system: &mut Value, markers: &str, text: &str) {
    set_path(system, "type.value", json!("monster"));
    if let Some(recharge) = capture_number(&RECHARGE_RE, markers) {
        set_path(system, "recharge", json!({ "value": recharge, "charged": true }));
    }
    if let Some(uses) = capture_number(&DAILY_USES_RE, markers) {
        set_path(system, "uses", json!({ "value": uses, "max": uses, "per": "day" }));
    }
    if let Some(ability) = dice::parse_save_ability(text) {
        set_path(
            system,
            "save",
            json!({
                "ability": ability,
                "dc": dice::parse_save_dc(text),
                "scaling": "flat"
            }),
        );
        set_path(system, "actionType", json!("save"));
    }
    let parts = dice::extract_damage_parts(text);
    if !parts.is_empty() {
        set_path(system, "damage.parts", json!(parts));
    }
}

/// 내장 주문 하위 문서 (배열, 빈도별 객체, 쉼표 문자열)
fn spell_children(source: &Record, parent_id: &str, relative_path: &str) -> Vec<Document> {
    let mut records: Vec<(Value, &'static str, Option<u32>)> = Vec::new();
    let mut push_list = |value: &Value, mode: &'static str, uses: Option<u32>| match value {
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(name) => records.push((json!({ "nome": name }), mode, uses)),
                    Value::Object(_) => records.push((item.clone(), mode, uses)),
                    _ => {}
                }
            }
        }
        Value::String(names) => {
            for name in split_list(names) {
                records.push((json!({ "nome": name }), mode, uses));
            }
        }
        _ => {}
    };

    match source.get(SPELL_KEYS) {
        Some(Value::Object(groups)) => {
            for (label, list) in groups {
                let lower = label.to_lowercase();
                let uses = capture_number(&DAILY_USES_RE, &lower);
                let mode = if lower.contains("volont") {
                    "atwill"
                } else if uses.is_some() {
                    "innate"
                } else {
                    "prepared"
                };
                push_list(list, mode, uses);
            }
        }
        Some(list) => push_list(list, "prepared", None),
        None => {}
    }

    records
        .iter()
        .enumerate()
        .map(|(index, (record, mode, uses))| {
            let mut doc = spell::build(&Record::new(record), relative_path);
            doc.id = child_id(parent_id, "incantesimi", index, &doc.name);
            set_path(
                &mut doc.system,
                "preparation",
                json!({ "mode": mode, "prepared": true }),
            );
            if let Some(uses) = uses {
                set_path(
                    &mut doc.system,
                    "uses",
                    json!({ "value": uses, "max": uses, "per": "day" }),
                );
            }
            doc
        })
        .collect()
}
