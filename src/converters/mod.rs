//! 유형별 변환기 모음
//!
//! 모든 변환기는 `(소스 레코드, 상대 경로) → Document` 형태의 순수 함수입니다.
//! 공통 뼈대(ID, 이름, 설명, 출처, 메타데이터)는 [`base_document`]가 채우고,
//! 각 변환기는 자기 유형의 `system` 키만 채웁니다.

pub mod background;
pub mod creature;
pub mod equipment;
pub mod generic;
pub mod spell;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::document::{ActiveEffect, DocType, Document, EffectChange, Metadata};
use crate::error::{ConvertError, Result};
use crate::ids::{child_id, file_stem, generate_id, normalize_path};
use crate::record::Record;
use crate::schema::{self, set_path};

/// 이름 키 후보
pub(crate) const NAME_KEYS: &[&str] = &["nome", "name", "titolo", "title"];

/// 설명 키 후보
pub(crate) const DESCRIPTION_KEYS: &[&str] =
    &["descrizione", "description", "testo", "text", "contenuto"];

/// 출처 도서 키 후보
pub(crate) const SOURCE_KEYS: &[&str] = &["fonte", "source", "manuale"];

/// 변환기 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterKind {
    Creature,
    Spell,
    Weapon,
    Armor,
    MagicItem,
    Background,
    Generic,
}

impl ConverterKind {
    /// 규칙에 유형이 지정되지 않았을 때의 기본 문서 유형
    pub fn default_type(self) -> DocType {
        match self {
            ConverterKind::Creature => DocType::Npc,
            ConverterKind::Spell => DocType::Spell,
            ConverterKind::Weapon => DocType::Weapon,
            ConverterKind::Armor | ConverterKind::MagicItem => DocType::Equipment,
            ConverterKind::Background => DocType::Background,
            ConverterKind::Generic => DocType::Loot,
        }
    }

    /// 표시 이름
    pub fn as_str(self) -> &'static str {
        match self {
            ConverterKind::Creature => "creature",
            ConverterKind::Spell => "spell",
            ConverterKind::Weapon => "weapon",
            ConverterKind::Armor => "armor",
            ConverterKind::MagicItem => "magic_item",
            ConverterKind::Background => "background",
            ConverterKind::Generic => "generic",
        }
    }
}

/// 선택된 변환기로 레코드 변환
///
/// 변환 결과가 유형 템플릿의 키를 모두 갖추지 못하면 파일 단위 에러가 됩니다.
pub fn convert(
    kind: ConverterKind,
    doc_type: DocType,
    record: &Value,
    relative_path: &str,
) -> Result<Document> {
    let relative_path = normalize_path(relative_path);
    let document = match kind {
        ConverterKind::Creature => creature::convert(record, &relative_path)?,
        ConverterKind::Spell => spell::convert(record, &relative_path)?,
        ConverterKind::Weapon => equipment::convert_weapon(record, &relative_path)?,
        ConverterKind::Armor => equipment::convert_armor(record, &relative_path)?,
        ConverterKind::MagicItem => equipment::convert_magic_item(record, &relative_path)?,
        ConverterKind::Background => background::convert(record, &relative_path)?,
        ConverterKind::Generic => generic::convert(record, &relative_path, doc_type),
    };
    ensure_complete(&document, &relative_path)?;
    Ok(document)
}

/// 문서(와 하위 문서)의 `system`이 유형 템플릿 키를 모두 갖췄는지 확인
fn ensure_complete(document: &Document, relative_path: &str) -> Result<()> {
    let missing = schema::missing_keys(&schema::template(document.doc_type), &document.system);
    if !missing.is_empty() {
        return Err(ConvertError::invalid_record(
            relative_path,
            format!("{} 필수 키 누락: {}", document.doc_type, missing.join(", ")),
        ));
    }
    for child in &document.items {
        ensure_complete(child, relative_path)?;
    }
    Ok(())
}

/// 특화 변환기용: 레코드가 JSON 객체인지 확인
pub(crate) fn require_object<'a>(record: &'a Value, relative_path: &str) -> Result<Record<'a>> {
    let source = Record::new(record);
    if source.is_object() {
        Ok(source)
    } else {
        Err(ConvertError::invalid_record(
            relative_path,
            "최상위 값이 JSON 객체가 아닙니다",
        ))
    }
}

/// 공통 뼈대 문서 생성
pub(crate) fn base_document(doc_type: DocType, source: &Record, relative_path: &str) -> Document {
    let mut system = schema::template(doc_type);

    if let Some(description) = source.text(DESCRIPTION_KEYS) {
        set_path(&mut system, "description.value", json!(to_html(&description)));
    }
    let source_book = source.text(SOURCE_KEYS);
    if let Some(ref book) = source_book {
        set_path(&mut system, "source.book", json!(book));
    }
    if let Some(page) = source.text(&["pagina", "page"]) {
        set_path(&mut system, "source.page", json!(page));
    }

    Document {
        id: generate_id(relative_path),
        name: source
            .text(NAME_KEYS)
            .unwrap_or_else(|| title_from_stem(file_stem(relative_path))),
        doc_type,
        collection: doc_type.collection(),
        img: source
            .text(&["immagine", "img", "icona"])
            .unwrap_or_else(|| doc_type.default_icon().to_string()),
        system,
        effects: Vec::new(),
        items: Vec::new(),
        prototype_token: None,
        metadata: Metadata {
            source_id: source.text(&["id", "_id", "codice"]),
            source_book,
            notes: source.text(&["note", "note_designer", "notes"]),
            source_path: relative_path.to_string(),
        },
    }
}

/// 부모 문서 아래에 이펙트 생성
pub(crate) fn build_effect(
    parent_id: &str,
    index: usize,
    name: &str,
    changes: Vec<EffectChange>,
) -> ActiveEffect {
    ActiveEffect {
        id: child_id(parent_id, "effetti", index, name),
        name: name.to_string(),
        img: "icons/svg/aura.svg".to_string(),
        changes,
        disabled: false,
        transfer: true,
    }
}

/// 일반 텍스트를 단락 HTML로 변환 (이미 HTML이면 그대로)
pub(crate) fn to_html(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with('<') {
        return trimmed.to_string();
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// 파일 스템에서 표시 이름 생성 (`01-drago_rosso` → `Drago Rosso`)
pub(crate) fn title_from_stem(stem: &str) -> String {
    let cleaned = stem.trim_start_matches(|c: char| c.is_ascii_digit() || c == '-' || c == '_');
    let source = if cleaned.is_empty() { stem } else { cleaned };
    source
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 문자열 또는 배열 값을 하나의 텍스트로 결합
pub(crate) fn joined_text(source: &Record, keys: &[&str]) -> Option<String> {
    if let Some(text) = source.text(keys) {
        return Some(text);
    }
    let parts = source.strings(keys);
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
