//! 결정적 ID 생성 모듈
//!
//! 파일 이름 슬러그와 상대 경로 해시를 결합하여 실행할 때마다 동일한 ID를 만듭니다.

use sha2::{Digest, Sha256};

/// 해시 부분 길이 (16진수 문자 수)
pub const HASH_LEN: usize = 8;

/// 슬러그 최대 길이
pub const MAX_SLUG_LEN: usize = 24;

/// 상대 경로를 `/` 구분자로 정규화
pub fn normalize_path(relative_path: &str) -> String {
    relative_path.replace('\\', "/").trim_start_matches("./").to_string()
}

/// 이름을 저장 키로 안전한 슬러그로 변환
///
/// 숫자 접두사(`01-`, `003_`)를 제거하고, 이탈리아어 악센트를 풀고,
/// ASCII 영숫자가 아닌 문자를 모두 제거합니다.
///
/// # Examples
/// ```
/// use vttconvert::ids::slugify;
///
/// assert_eq!(slugify("01-Drago Rosso"), "dragorosso");
/// assert_eq!(slugify("Furtività"), "furtivita");
/// ```
pub fn slugify(name: &str) -> String {
    let stripped = strip_numeric_prefix(name.trim());
    let source = if stripped.is_empty() { name } else { stripped };

    let slug: String = source
        .chars()
        .map(fold_accent)
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(MAX_SLUG_LEN)
        .collect();

    if slug.is_empty() {
        "doc".to_string()
    } else {
        slug
    }
}

/// 선행 숫자 접두사 제거 (`01-goblin` → `goblin`)
fn strip_numeric_prefix(name: &str) -> &str {
    let digits = name.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return name;
    }
    let rest = &name[digits..];
    match rest.chars().next() {
        Some('-' | '_' | '.' | ' ') => {
            rest[1..].trim_start_matches(|c: char| matches!(c, '-' | '_' | '.' | ' '))
        }
        _ => name,
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'À' | 'Á' => 'a',
        'è' | 'é' | 'ê' | 'È' | 'É' => 'e',
        'ì' | 'í' | 'î' | 'Ì' | 'Í' => 'i',
        'ò' | 'ó' | 'ô' | 'Ò' | 'Ó' => 'o',
        'ù' | 'ú' | 'û' | 'Ù' | 'Ú' => 'u',
        _ => c,
    }
}

/// 입력 문자열의 짧은 고정 길이 해시 (SHA-256 앞부분)
pub fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(HASH_LEN);
    encoded
}

/// 상대 경로에서 파일 스템 추출
pub fn file_stem(relative_path: &str) -> &str {
    let name = relative_path
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(relative_path);
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    }
}

/// 소스 상대 경로에서 문서 ID 생성
///
/// 같은 경로는 항상 같은 ID를 만들고, 파일 이름이 같아도 경로가 다르면
/// 해시 부분이 달라집니다.
///
/// # Examples
/// ```
/// use vttconvert::ids::generate_id;
///
/// let a = generate_id("mostri/goblin.json");
/// assert_eq!(a, generate_id("mostri/goblin.json"));
/// assert_ne!(a, generate_id("mostri/varianti/goblin.json"));
/// assert!(a.starts_with("goblin"));
/// ```
pub fn generate_id(relative_path: &str) -> String {
    let normalized = normalize_path(relative_path);
    format!(
        "{}{}",
        slugify(file_stem(&normalized)),
        short_hash(&normalized)
    )
}

/// 부모 문서 아래에 속한 하위 문서 ID 생성
pub fn child_id(parent_id: &str, category: &str, index: usize, name: &str) -> String {
    format!(
        "{}{}",
        slugify(name),
        short_hash(&format!("{}/{}/{}", parent_id, category, index))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_strips_prefix_and_symbols() {
        assert_eq!(slugify("001_palla-di-fuoco"), "palladifuoco");
        assert_eq!(slugify("Spada +1"), "spada1");
        assert_eq!(slugify("L'Occhio di Vecna"), "locchiodivecna");
    }

    #[test]
    fn test_slugify_numeric_only_name_is_kept() {
        assert_eq!(slugify("2024"), "2024");
        assert_eq!(slugify("5-"), "5");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify("???"), "doc");
        assert_eq!(slugify(""), "doc");
    }

    #[test]
    fn test_slugify_truncates() {
        let long = "a".repeat(100);
        assert_eq!(slugify(&long).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_id_is_alphanumeric_and_stable() {
        let id = generate_id("mostri/01-Goblin Capo.json");
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(id.starts_with("goblincapo"));
        assert_eq!(id.len(), "goblincapo".len() + HASH_LEN);
        assert_eq!(id, generate_id("mostri/01-Goblin Capo.json"));
    }

    #[test]
    fn test_id_ignores_separator_style() {
        assert_eq!(
            generate_id("mostri\\goblin.json"),
            generate_id("mostri/goblin.json")
        );
    }

    #[test]
    fn test_child_id_scoped_by_parent() {
        let a = child_id("goblin1234abcd", "azioni", 0, "Scimitarra");
        let b = child_id("hobgoblin99887766", "azioni", 0, "Scimitarra");
        assert_ne!(a, b);
        assert!(a.starts_with("scimitarra"));
        assert_eq!(a, child_id("goblin1234abcd", "azioni", 0, "Scimitarra"));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("a/b/goblin.json"), "goblin");
        assert_eq!(file_stem("goblin"), "goblin");
        assert_eq!(file_stem("a/.hidden"), ".hidden");
    }
}
