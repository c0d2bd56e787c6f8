//! 라우팅 테이블 모듈
//!
//! 상대 경로만 보고 파일을 건너뛸지, 어떤 변환기로 보낼지 결정합니다.
//! 규칙은 선언 순서대로 평가되며 **처음 일치한 규칙이 이깁니다**.
//! 따라서 인덱스/메타 파일 건너뛰기 규칙은 내용 규칙보다 먼저,
//! 하위 클래스 규칙은 클래스 규칙보다 먼저 선언되어야 합니다.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::converters::ConverterKind;
use crate::document::{Collection, DocType};
use crate::error::{ConvertError, Result};
use crate::pattern::PatternMatcher;

/// 변환 경로 (변환기 + 문서 유형)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub converter: ConverterKind,
    pub doc_type: DocType,
}

impl Route {
    /// 유형 기본값으로 경로 생성
    pub fn new(converter: ConverterKind) -> Self {
        Self {
            converter,
            doc_type: converter.default_type(),
        }
    }

    /// 유형을 지정한 경로 생성
    pub fn with_type(converter: ConverterKind, doc_type: DocType) -> Self {
        Self {
            converter,
            doc_type,
        }
    }

    /// 대상 컬렉션 (유형에서 파생)
    pub fn collection(&self) -> Collection {
        self.doc_type.collection()
    }
}

/// 규칙 동작
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Skip,
    Convert(Route),
}

/// 경로 패턴과 동작의 쌍
#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: PatternMatcher,
    pub action: Action,
}

/// 분류 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// 건너뛰기 규칙에 일치
    Skip,
    /// 변환 대상
    Convert(Route),
    /// 어떤 규칙에도 일치하지 않음
    Unmapped,
}

/// 규칙 파일의 한 항목
#[derive(Debug, Deserialize)]
struct RuleEntry {
    pattern: String,
    #[serde(default)]
    skip: bool,
    #[serde(default)]
    converter: Option<ConverterKind>,
    #[serde(default, rename = "type")]
    doc_type: Option<DocType>,
}

/// 순서가 있는 라우팅 규칙 목록
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// 빈 규칙 테이블
    pub fn new() -> Self {
        Self::default()
    }

    /// 건너뛰기 규칙 추가
    pub fn skip(mut self, pattern: &str) -> Result<Self> {
        self.rules.push(Rule {
            pattern: PatternMatcher::path(pattern)?,
            action: Action::Skip,
        });
        Ok(self)
    }

    /// 변환 규칙 추가
    pub fn route(mut self, pattern: &str, route: Route) -> Result<Self> {
        self.rules.push(Rule {
            pattern: PatternMatcher::path(pattern)?,
            action: Action::Convert(route),
        });
        Ok(self)
    }

    /// 규칙 수
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 규칙이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 상대 경로 분류 (처음 일치한 규칙 사용)
    ///
    /// # Examples
    /// ```
    /// use vttconvert::router::{Classification, RuleTable};
    /// use vttconvert::document::DocType;
    ///
    /// let rules = RuleTable::default_rules();
    /// assert_eq!(rules.classify("mostri/index.json"), Classification::Skip);
    /// match rules.classify("mostri/goblin.json") {
    ///     Classification::Convert(route) => assert_eq!(route.doc_type, DocType::Npc),
    ///     other => panic!("unexpected {:?}", other),
    /// }
    /// assert_eq!(rules.classify("varie/x.json"), Classification::Unmapped);
    /// ```
    pub fn classify(&self, relative_path: &str) -> Classification {
        let normalized = crate::ids::normalize_path(relative_path);
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(&normalized))
            .map(|rule| match rule.action {
                Action::Skip => Classification::Skip,
                Action::Convert(route) => Classification::Convert(route),
            })
            .unwrap_or(Classification::Unmapped)
    }

    /// 기본 이탈리아어 폴더 구조 규칙
    pub fn default_rules() -> Self {
        use ConverterKind::*;

        let skips = [
            "**/index.json",
            "**/_*.json",
            "**/*manifest*.json",
            "**/metadata.json",
        ];
        let routes: [(&str, Route); 17] = [
            ("mostri/**", Route::new(Creature)),
            ("creature/**", Route::new(Creature)),
            ("incantesimi/**", Route::new(Spell)),
            ("armi/**", Route::new(Weapon)),
            ("armature/**", Route::new(Armor)),
            ("oggetti_magici/**", Route::new(MagicItem)),
            ("talenti/**", Route::with_type(Generic, DocType::Feat)),
            ("privilegi/**", Route::with_type(Generic, DocType::Feat)),
            ("background/**", Route::new(Background)),
            ("backgrounds/**", Route::new(Background)),
            ("classi/*/sottoclassi/**", Route::with_type(Generic, DocType::Subclass)),
            ("classi/**", Route::with_type(Generic, DocType::Class)),
            ("equipaggiamento/**", Route::with_type(Generic, DocType::Loot)),
            ("tabelle/**", Route::with_type(Generic, DocType::Table)),
            ("regole/**", Route::with_type(Generic, DocType::Journal)),
            ("diari/**", Route::with_type(Generic, DocType::Journal)),
            ("avventure/**", Route::with_type(Generic, DocType::Journal)),
        ];

        let mut rules = Vec::with_capacity(skips.len() + routes.len());
        for pattern in skips {
            if let Ok(matcher) = PatternMatcher::path(pattern) {
                rules.push(Rule {
                    pattern: matcher,
                    action: Action::Skip,
                });
            }
        }
        for (pattern, route) in routes {
            if let Ok(matcher) = PatternMatcher::path(pattern) {
                rules.push(Rule {
                    pattern: matcher,
                    action: Action::Convert(route),
                });
            }
        }
        Self { rules }
    }

    /// JSON 규칙 파일에서 규칙 테이블 로드
    ///
    /// 형식: `[{"pattern": "...", "skip": true}, {"pattern": "...", "converter": "creature", "type": "npc"}]`
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let rules_error = |reason: String| ConvertError::RulesFile {
            file: path.to_path_buf(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| rules_error(e.to_string()))?;
        let entries: Vec<RuleEntry> =
            serde_json::from_str(&content).map_err(|e| rules_error(e.to_string()))?;

        let mut table = RuleTable::new();
        for (index, entry) in entries.into_iter().enumerate() {
            table = if entry.skip {
                table.skip(&entry.pattern)?
            } else {
                let converter = entry.converter.ok_or_else(|| {
                    rules_error(format!("{}번째 규칙에 converter가 없습니다", index + 1))
                })?;
                let doc_type = entry.doc_type.unwrap_or_else(|| converter.default_type());
                table.route(&entry.pattern, Route::with_type(converter, doc_type))?
            };
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn route_of(rules: &RuleTable, path: &str) -> Route {
        match rules.classify(path) {
            Classification::Convert(route) => route,
            other => panic!("{} → {:?}", path, other),
        }
    }

    #[test]
    fn test_default_rules_count() {
        assert_eq!(RuleTable::default_rules().len(), 21);
    }

    #[test]
    fn test_skip_rules_preempt_content_rules() {
        let rules = RuleTable::default_rules();
        assert_eq!(rules.classify("mostri/index.json"), Classification::Skip);
        assert_eq!(rules.classify("incantesimi/_bozza.json"), Classification::Skip);
        assert_eq!(rules.classify("armi/pack-manifest.json"), Classification::Skip);
        assert_eq!(rules.classify("metadata.json"), Classification::Skip);
    }

    #[test]
    fn test_subclass_precedes_class() {
        let rules = RuleTable::default_rules();
        assert_eq!(
            route_of(&rules, "classi/chierico/sottoclassi/vita.json").doc_type,
            DocType::Subclass
        );
        assert_eq!(route_of(&rules, "classi/chierico.json").doc_type, DocType::Class);
    }

    #[test]
    fn test_default_routes() {
        let rules = RuleTable::default_rules();
        let cases = [
            ("mostri/goblin.json", ConverterKind::Creature, DocType::Npc),
            ("incantesimi/luce.json", ConverterKind::Spell, DocType::Spell),
            ("armi/ascia.json", ConverterKind::Weapon, DocType::Weapon),
            ("armature/cotta.json", ConverterKind::Armor, DocType::Equipment),
            ("oggetti_magici/anello.json", ConverterKind::MagicItem, DocType::Equipment),
            ("talenti/allerta.json", ConverterKind::Generic, DocType::Feat),
            ("backgrounds/eremita.json", ConverterKind::Background, DocType::Background),
            ("tabelle/incontri.json", ConverterKind::Generic, DocType::Table),
            ("diari/giorno1.json", ConverterKind::Generic, DocType::Journal),
        ];
        for (path, converter, doc_type) in cases {
            let route = route_of(&rules, path);
            assert_eq!(route.converter, converter, "{}", path);
            assert_eq!(route.doc_type, doc_type, "{}", path);
        }
        assert_eq!(route_of(&rules, "mostri/goblin.json").collection(), Collection::Actors);
    }

    #[test]
    fn test_windows_separators_and_case() {
        let rules = RuleTable::default_rules();
        assert_eq!(
            route_of(&rules, "Mostri\\Draghi\\drago.json").doc_type,
            DocType::Npc
        );
    }

    #[test]
    fn test_unmapped() {
        let rules = RuleTable::default_rules();
        assert_eq!(rules.classify("varie/appunti.json"), Classification::Unmapped);
        assert_eq!(RuleTable::new().classify("mostri/x.json"), Classification::Unmapped);
    }

    #[test]
    fn test_first_declared_rule_wins() {
        let rules = RuleTable::new()
            .route("mostri/**", Route::new(ConverterKind::Generic))
            .unwrap()
            .route("mostri/**", Route::new(ConverterKind::Creature))
            .unwrap();
        assert_eq!(route_of(&rules, "mostri/a.json").converter, ConverterKind::Generic);
    }

    #[test]
    fn test_rules_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"pattern": "**/bozze/**", "skip": true}},
                {{"pattern": "png/**", "converter": "creature"}},
                {{"pattern": "luoghi/**", "converter": "generic", "type": "journal"}}
            ]"#
        )
        .unwrap();

        let rules = RuleTable::from_json_file(file.path()).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.classify("png/bozze/x.json"), Classification::Skip);
        assert_eq!(route_of(&rules, "png/oste.json").doc_type, DocType::Npc);
        assert_eq!(route_of(&rules, "luoghi/taverna.json").doc_type, DocType::Journal);
    }

    #[test]
    fn test_rules_file_errors() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"pattern": "x/**"}}]"#).unwrap();
        assert!(matches!(
            RuleTable::from_json_file(file.path()),
            Err(ConvertError::RulesFile { .. })
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"pattern": "x/**", "converter": "dragone"}}]"#).unwrap();
        assert!(RuleTable::from_json_file(file.path()).is_err());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"pattern": "[", "skip": true}}]"#).unwrap();
        assert!(matches!(
            RuleTable::from_json_file(file.path()),
            Err(ConvertError::InvalidPattern { .. })
        ));
    }
}
