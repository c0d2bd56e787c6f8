//! 현지화 용어 사전 모듈
//!
//! 이탈리아어 용어를 표준 코드로 바꾸는 순서 있는 `(needle, code)` 목록입니다.
//! 매칭은 정확 일치가 아니라 포함(substring) 검사이며, 먼저 선언된 항목이 이깁니다.
//! 원문이 용어를 긴 설명문 안에 섞어 쓰기 때문에 포함 검사를 사용합니다.
//!
//! 더 긴 용어가 짧은 용어를 포함하는 경우(`sottocomune`/`comune`,
//! `non comune`/`comune`) 긴 쪽을 반드시 먼저 선언해야 합니다.

/// 순서 있는 용어 사전
pub type TermTable = &'static [(&'static str, &'static str)];

/// 입력에 포함된 첫 번째 용어의 코드 반환
///
/// # Examples
/// ```
/// use vttconvert::terms::{match_term, DAMAGE_TYPES};
///
/// assert_eq!(match_term(DAMAGE_TYPES, "danni Perforanti"), Some("piercing"));
/// assert_eq!(match_term(DAMAGE_TYPES, "nessuno"), None);
/// ```
pub fn match_term(table: TermTable, input: &str) -> Option<&'static str> {
    let lower = input.to_lowercase();
    table
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, code)| *code)
}

/// 입력에 포함된 모든 용어 코드 (사전 순서, 중복 제거)
pub fn match_all_terms(table: TermTable, input: &str) -> Vec<&'static str> {
    let lower = input.to_lowercase();
    let mut codes: Vec<&'static str> = Vec::new();
    for (needle, code) in table {
        if lower.contains(needle) && !codes.contains(code) {
            codes.push(*code);
        }
    }
    codes
}

/// 능력치 점수 수정치: floor((score - 10) / 2)
pub fn ability_modifier(score: i64) -> i64 {
    (score - 10).div_euclid(2)
}

/// 능력치 (전체 이름 먼저, 약어 나중)
pub static ABILITIES: TermTable = &[
    ("forza", "str"),
    ("destrezza", "dex"),
    ("costituzione", "con"),
    ("intelligenza", "int"),
    ("saggezza", "wis"),
    ("carisma", "cha"),
    ("for", "str"),
    ("des", "dex"),
    ("cos", "con"),
    ("int", "int"),
    ("sag", "wis"),
    ("car", "cha"),
];

/// 표준 능력치 코드 순서
pub const ABILITY_CODES: [&str; 6] = ["str", "dex", "con", "int", "wis", "cha"];

/// 기술
pub static SKILLS: TermTable = &[
    ("acrobazi", "acr"),
    ("addestrare", "ani"),
    ("arcano", "arc"),
    ("atletica", "ath"),
    ("inganno", "dec"),
    ("storia", "his"),
    ("intuizione", "ins"),
    ("intimidire", "itm"),
    ("indagare", "inv"),
    ("medicina", "med"),
    ("natura", "nat"),
    ("percezione", "prc"),
    ("intrattenere", "prf"),
    ("persuasione", "per"),
    ("religione", "rel"),
    ("rapidit", "slt"),
    ("furtivit", "ste"),
    ("sopravvivenza", "sur"),
];

/// 18개 표준 기술과 기본 능력치
pub const SKILL_ABILITIES: [(&str, &str); 18] = [
    ("acr", "dex"),
    ("ani", "wis"),
    ("arc", "int"),
    ("ath", "str"),
    ("dec", "cha"),
    ("his", "int"),
    ("ins", "wis"),
    ("itm", "cha"),
    ("inv", "int"),
    ("med", "wis"),
    ("nat", "int"),
    ("prc", "wis"),
    ("prf", "cha"),
    ("per", "cha"),
    ("rel", "int"),
    ("slt", "dex"),
    ("ste", "dex"),
    ("sur", "wis"),
];

/// 피해 유형
pub static DAMAGE_TYPES: TermTable = &[
    ("acid", "acid"),
    ("contundent", "bludgeoning"),
    ("freddo", "cold"),
    ("fuoco", "fire"),
    ("forza", "force"),
    ("fulmin", "lightning"),
    ("necrotic", "necrotic"),
    ("perforant", "piercing"),
    ("veleno", "poison"),
    ("psichic", "psychic"),
    ("radiant", "radiant"),
    ("taglient", "slashing"),
    ("tuono", "thunder"),
];

/// 상태이상
pub static CONDITIONS: TermTable = &[
    ("accecat", "blinded"),
    ("affascinat", "charmed"),
    ("assordat", "deafened"),
    ("indebolimento", "exhaustion"),
    ("spaventat", "frightened"),
    ("afferrat", "grappled"),
    ("incapacitat", "incapacitated"),
    ("invisibil", "invisible"),
    ("paralizzat", "paralyzed"),
    ("pietrificat", "petrified"),
    ("avvelenat", "poisoned"),
    ("prono", "prone"),
    ("trattenut", "restrained"),
    ("stordit", "stunned"),
    ("privo di sensi", "unconscious"),
];

/// 언어 (`sottocomune`이 `comune`보다 먼저)
pub static LANGUAGES: TermTable = &[
    ("sottocomune", "undercommon"),
    ("comune", "common"),
    ("elfico", "elvish"),
    ("nanico", "dwarvish"),
    ("gigante", "giant"),
    ("gnomesco", "gnomish"),
    ("goblin", "goblin"),
    ("halfling", "halfling"),
    ("orchesco", "orc"),
    ("abissale", "abyssal"),
    ("celestiale", "celestial"),
    ("draconico", "draconic"),
    ("gergo delle profondit", "deep"),
    ("infernale", "infernal"),
    ("primordiale", "primordial"),
    ("silvano", "sylvan"),
    ("gergo ladresco", "cant"),
    ("druidico", "druidic"),
];

/// 감각
pub static SENSES: TermTable = &[
    ("scurovision", "darkvision"),
    ("vista cieca", "blindsight"),
    ("percezione tellurica", "tremorsense"),
    ("vista pura", "truesight"),
    ("vista del vero", "truesight"),
];

/// 이동 방식 (키워드 없는 첫 항목은 걷기)
pub static MOVEMENT: TermTable = &[
    ("volare", "fly"),
    ("volo", "fly"),
    ("nuotare", "swim"),
    ("nuoto", "swim"),
    ("scalare", "climb"),
    ("scalata", "climb"),
    ("scavare", "burrow"),
    ("camminare", "walk"),
];

/// 크기
pub static SIZES: TermTable = &[
    ("minuscol", "tiny"),
    ("piccol", "sm"),
    ("medi", "med"),
    ("grand", "lg"),
    ("enorm", "huge"),
    ("mastodontic", "grg"),
];

/// 크리처 유형
pub static CREATURE_TYPES: TermTable = &[
    ("aberrazion", "aberration"),
    ("bestia", "beast"),
    ("bestie", "beast"),
    ("celestial", "celestial"),
    ("costrutt", "construct"),
    ("drago", "dragon"),
    ("elemental", "elemental"),
    ("folletto", "fey"),
    ("immondo", "fiend"),
    ("gigante", "giant"),
    ("umanoide", "humanoid"),
    ("mostruosit", "monstrosity"),
    ("melma", "ooze"),
    ("vegetale", "plant"),
    ("non morto", "undead"),
    ("non-morto", "undead"),
];

/// 주문 학파
pub static SPELL_SCHOOLS: TermTable = &[
    ("abiurazione", "abj"),
    ("ammaliamento", "enc"),
    ("divinazione", "div"),
    ("evocazione", "evo"),
    ("illusione", "ill"),
    ("invocazione", "con"),
    ("necromanzia", "nec"),
    ("trasmutazione", "trs"),
];

/// 클래스 식별자
pub static CLASSES: TermTable = &[
    ("artefice", "artificer"),
    ("barbar", "barbarian"),
    ("bardo", "bard"),
    ("chierico", "cleric"),
    ("druid", "druid"),
    ("guerrier", "fighter"),
    ("ladro", "rogue"),
    ("mago", "wizard"),
    ("monaco", "monk"),
    ("paladin", "paladin"),
    ("ranger", "ranger"),
    ("stregone", "sorcerer"),
    ("warlock", "warlock"),
];

/// 주문 범위 형태
pub static AREA_SHAPES: TermTable = &[
    ("cono", "cone"),
    ("cubo", "cube"),
    ("cilindr", "cylinder"),
    ("linea", "line"),
    ("sfera", "sphere"),
    ("emisfer", "sphere"),
    ("raggio", "radius"),
];

/// 희귀도 (`non comune`이 `comune`보다, `molto rar`가 `rar`보다 먼저)
pub static RARITIES: TermTable = &[
    ("non comune", "uncommon"),
    ("molto rar", "veryRare"),
    ("leggendari", "legendary"),
    ("artefatt", "artifact"),
    ("rar", "rare"),
    ("comune", "common"),
];

/// 희귀도가 없을 때의 기본값 (가장 낮은 등급)
pub const DEFAULT_RARITY: &str = "common";

/// 도구
pub static TOOLS: TermTable = &[
    ("strumenti da scasso", "thief"),
    ("arnesi da scasso", "thief"),
    ("strumenti da ladro", "thief"),
    ("kit da erborista", "herb"),
    ("kit dell'erborista", "herb"),
    ("kit da avvelenatore", "pois"),
    ("kit dell'avvelenatore", "pois"),
    ("kit per il camuffamento", "disg"),
    ("kit per il travestimento", "disg"),
    ("kit da falsario", "forg"),
    ("kit per la falsificazione", "forg"),
    ("strumenti da navigatore", "navg"),
    ("veicoli terrestri", "land"),
    ("veicoli acquatici", "water"),
    ("strumento musicale", "music"),
    ("strumenti musicali", "music"),
    ("set da gioco", "game"),
    ("strumenti da artigiano", "art"),
];

/// 무기 속성
pub static WEAPON_PROPERTIES: TermTable = &[
    ("accurat", "fin"),
    ("leggera", "lgt"),
    ("lancio", "thr"),
    ("pesante", "hvy"),
    ("portata", "rch"),
    ("due mani", "two"),
    ("versatile", "ver"),
    ("munizion", "amm"),
    ("ricarica", "lod"),
    ("speciale", "spc"),
    ("argentat", "sil"),
];

/// 방어구 분류 (`scudo` 먼저)
pub static ARMOR_TYPES: TermTable = &[
    ("scudo", "shield"),
    ("pesant", "heavy"),
    ("medi", "medium"),
    ("legger", "light"),
];

/// 화폐 (약어가 아닌 전체 이름)
pub static CURRENCIES: TermTable = &[
    ("platin", "pp"),
    ("electrum", "ep"),
    ("elettro", "ep"),
    ("argent", "sp"),
    ("rame", "cp"),
    ("oro", "gp"),
];

/// 코드로 능력치 이름 조회용 역방향 검색
pub fn skill_ability(skill: &str) -> Option<&'static str> {
    SKILL_ABILITIES
        .iter()
        .find(|(code, _)| *code == skill)
        .map(|(_, ability)| *ability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_semantics() {
        assert_eq!(
            match_term(DAMAGE_TYPES, "7 (2d6) danni taglienti"),
            Some("slashing")
        );
        assert_eq!(match_term(DAMAGE_TYPES, "danno tagliente"), Some("slashing"));
        assert_eq!(match_term(SKILLS, "Furtività +6"), Some("ste"));
        assert_eq!(match_term(SKILLS, "Rapidità di Mano +4"), Some("slt"));
    }

    #[test]
    fn test_longer_needles_declared_first() {
        assert_eq!(match_term(LANGUAGES, "Sottocomune"), Some("undercommon"));
        assert_eq!(match_term(LANGUAGES, "Comune"), Some("common"));
        assert_eq!(match_term(RARITIES, "non comune"), Some("uncommon"));
        assert_eq!(match_term(RARITIES, "molto rara"), Some("veryRare"));
        assert_eq!(match_term(RARITIES, "rara"), Some("rare"));
    }

    #[test]
    fn test_first_declared_wins_on_overlap() {
        // 입력 안의 위치가 아니라 사전 선언 순서가 우선한다
        assert_eq!(match_term(SIZES, "Grande o Media"), Some("med"));
    }

    #[test]
    fn test_match_all_terms_dedups_in_table_order() {
        let codes = match_all_terms(
            DAMAGE_TYPES,
            "veleno; contundenti, perforanti e taglienti da attacchi non magici, veleno",
        );
        assert_eq!(codes, vec!["bludgeoning", "piercing", "poison", "slashing"]);
    }

    #[test]
    fn test_ability_modifier_floors() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(30), 10);
    }

    #[test]
    fn test_skill_ability_lookup() {
        assert_eq!(skill_ability("ste"), Some("dex"));
        assert_eq!(skill_ability("prc"), Some("wis"));
        assert_eq!(skill_ability("xyz"), None);
        assert_eq!(SKILL_ABILITIES.len(), 18);
    }

    #[test]
    fn test_class_identifiers() {
        assert_eq!(match_term(CLASSES, "Chierico"), Some("cleric"));
        assert_eq!(match_term(CLASSES, "guerriero"), Some("fighter"));
        assert_eq!(match_term(CLASSES, "Stregone"), Some("sorcerer"));
    }
}
