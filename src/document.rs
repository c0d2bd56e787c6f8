//! 대상 문서 모델
//!
//! 변환기가 만들어내는 고정 형태의 문서와 유형별 컬렉션/아이콘 조회 테이블.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 문서 하위 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Npc,
    Weapon,
    Equipment,
    Consumable,
    Loot,
    Spell,
    Feat,
    Background,
    Class,
    Subclass,
    Journal,
    Table,
}

impl DocType {
    /// 모든 문서 유형
    pub const ALL: [DocType; 12] = [
        DocType::Npc,
        DocType::Weapon,
        DocType::Equipment,
        DocType::Consumable,
        DocType::Loot,
        DocType::Spell,
        DocType::Feat,
        DocType::Background,
        DocType::Class,
        DocType::Subclass,
        DocType::Journal,
        DocType::Table,
    ];

    /// 직렬화 이름
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::Npc => "npc",
            DocType::Weapon => "weapon",
            DocType::Equipment => "equipment",
            DocType::Consumable => "consumable",
            DocType::Loot => "loot",
            DocType::Spell => "spell",
            DocType::Feat => "feat",
            DocType::Background => "background",
            DocType::Class => "class",
            DocType::Subclass => "subclass",
            DocType::Journal => "journal",
            DocType::Table => "table",
        }
    }

    /// 문서가 속하는 컬렉션 (유형만으로 결정)
    pub fn collection(self) -> Collection {
        match self {
            DocType::Npc => Collection::Actors,
            DocType::Journal => Collection::Journal,
            DocType::Table => Collection::Tables,
            _ => Collection::Items,
        }
    }

    /// 기본 아이콘 경로
    pub fn default_icon(self) -> &'static str {
        match self {
            DocType::Npc => "icons/svg/mystery-man.svg",
            DocType::Weapon => "icons/svg/sword.svg",
            DocType::Equipment => "icons/svg/shield.svg",
            DocType::Consumable => "icons/svg/tankard.svg",
            DocType::Spell => "icons/svg/lightning.svg",
            DocType::Feat => "icons/svg/upgrade.svg",
            DocType::Background => "icons/svg/village.svg",
            DocType::Class | DocType::Subclass => "icons/svg/statue.svg",
            DocType::Journal => "icons/svg/book.svg",
            DocType::Table => "icons/svg/d20-grey.svg",
            DocType::Loot => FALLBACK_ICON,
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 알 수 없는 유형용 아이콘
pub const FALLBACK_ICON: &str = "icons/svg/item-bag.svg";

/// 대상 컬렉션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Actors,
    Items,
    Journal,
    Tables,
}

impl Collection {
    /// 출력 폴더 이름
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Actors => "actors",
            Collection::Items => "items",
            Collection::Journal => "journal",
            Collection::Tables => "tables",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 액티브 이펙트 적용 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectMode {
    Custom = 0,
    Multiply = 1,
    Add = 2,
    Downgrade = 3,
    Upgrade = 4,
    Override = 5,
}

/// 이펙트의 개별 변경 사항
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectChange {
    /// 점 표기 대상 속성 (`system.attributes.ac.bonus`)
    pub key: String,
    pub mode: u8,
    pub value: String,
    pub priority: u8,
}

impl EffectChange {
    /// 모드 기본 우선순위(mode × 10)로 변경 사항 생성
    pub fn new(key: impl Into<String>, mode: EffectMode, value: impl Into<String>) -> Self {
        let mode = mode as u8;
        Self {
            key: key.into(),
            mode,
            value: value.into(),
            priority: mode * 10,
        }
    }
}

/// 내장 액티브 이펙트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub img: String,
    pub changes: Vec<EffectChange>,
    pub disabled: bool,
    pub transfer: bool,
}

/// 출처 정보 (하위 로직이 해석하지 않고 그대로 전달)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub source_id: Option<String>,
    pub source_book: Option<String>,
    pub notes: Option<String>,
    pub source_path: String,
}

/// 토큰 시야
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sight {
    pub enabled: bool,
    pub range: u32,
}

/// 크리처 프로토타입 토큰
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrototypeToken {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub disposition: i8,
    pub actor_link: bool,
    pub sight: Sight,
}

/// 변환된 대상 문서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub collection: Collection,
    pub img: String,
    pub system: Value,
    pub effects: Vec<ActiveEffect>,
    /// 크리처의 내장 하위 문서
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype_token: Option<PrototypeToken>,
    pub metadata: Metadata,
}

impl Document {
    /// 직렬화된 pretty JSON
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
