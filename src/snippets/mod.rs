use std::collections::HashMap;

use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::SnippetError;

static SNIPPET_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/snippets/data");

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A piece of code to type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub difficulty: Difficulty,
    pub description: String,
    pub code: String,
}

impl Snippet {
    /// Wrap user supplied text so it can be typed like a bundled snippet.
    pub fn custom(code: impl Into<String>) -> Self {
        Self {
            id: "custom".to_string(),
            difficulty: Difficulty::Medium,
            description: "Custom text".to_string(),
            code: code.into(),
        }
    }
}

/// All snippets for one language, as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct SnippetTable {
    pub language: String,
    pub snippets: Vec<Snippet>,
}

/// Read-only lookup of snippets by language. Built once and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct SnippetRegistry {
    by_language: HashMap<String, Vec<Snippet>>,
}

impl SnippetRegistry {
    /// Registry of the snippet tables compiled into the binary.
    pub fn bundled() -> Result<Self, SnippetError> {
        let tables = SNIPPET_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
            .map(|f| {
                let name = f.path().display().to_string();
                let text = f.contents_utf8().ok_or_else(|| SnippetError::InvalidTable {
                    name: name.clone(),
                    reason: "not valid utf-8".to_string(),
                })?;
                serde_json::from_str::<SnippetTable>(text).map_err(|e| {
                    SnippetError::InvalidTable {
                        name,
                        reason: e.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_tables(tables)
    }

    pub fn from_tables(
        tables: impl IntoIterator<Item = SnippetTable>,
    ) -> Result<Self, SnippetError> {
        let mut by_language: HashMap<String, Vec<Snippet>> = HashMap::new();

        for table in tables {
            let language = table.language.trim().to_lowercase();
            if language.is_empty() {
                return Err(SnippetError::InvalidTable {
                    name: table.language,
                    reason: "missing language name".to_string(),
                });
            }
            if let Some(empty) = table.snippets.iter().find(|s| s.code.is_empty()) {
                return Err(SnippetError::InvalidTable {
                    name: language,
                    reason: format!("snippet '{}' has no code", empty.id),
                });
            }

            debug!(%language, count = table.snippets.len(), "registered snippets");
            by_language.entry(language).or_default().extend(table.snippets);
        }

        Ok(Self { by_language })
    }

    pub fn snippets(&self, language: &str) -> Option<&[Snippet]> {
        self.by_language
            .get(&language.to_lowercase())
            .map(Vec::as_slice)
    }

    pub fn get_random(&self, language: &str) -> Result<&Snippet, SnippetError> {
        self.get_random_with(language, &mut rand::thread_rng())
    }

    /// Uniform pick among all snippets of `language`.
    pub fn get_random_with<R: Rng + ?Sized>(
        &self,
        language: &str,
        rng: &mut R,
    ) -> Result<&Snippet, SnippetError> {
        let snippet = self
            .snippets(language)
            .and_then(|all| all.choose(rng))
            .ok_or_else(|| SnippetError::UnknownLanguage(language.to_string()))?;

        trace!(language, id = %snippet.id, "picked snippet");
        Ok(snippet)
    }

    pub fn get_random_by_difficulty(
        &self,
        language: &str,
        difficulty: Difficulty,
    ) -> Result<&Snippet, SnippetError> {
        self.get_random_by_difficulty_with(language, difficulty, &mut rand::thread_rng())
    }

    /// Uniform pick among the snippets of `language` tagged `difficulty`.
    pub fn get_random_by_difficulty_with<R: Rng + ?Sized>(
        &self,
        language: &str,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<&Snippet, SnippetError> {
        let all = self
            .snippets(language)
            .ok_or_else(|| SnippetError::UnknownLanguage(language.to_string()))?;

        let matching = all
            .iter()
            .filter(|s| s.difficulty == difficulty)
            .collect::<Vec<_>>();

        let snippet = matching
            .choose(rng)
            .copied()
            .ok_or_else(|| SnippetError::NoSnippetForDifficulty {
                language: language.to_string(),
                difficulty,
            })?;

        trace!(language, %difficulty, id = %snippet.id, "picked snippet");
        Ok(snippet)
    }

    /// Random pick, filtered by difficulty when one is given.
    pub fn pick(
        &self,
        language: &str,
        difficulty: Option<Difficulty>,
    ) -> Result<&Snippet, SnippetError> {
        match difficulty {
            Some(d) => self.get_random_by_difficulty(language, d),
            None => self.get_random(language),
        }
    }

    /// Find a snippet by id across all languages, with its language key.
    pub fn get_by_id(&self, id: &str) -> Result<(&str, &Snippet), SnippetError> {
        self.by_language
            .iter()
            .find_map(|(language, snippets)| {
                snippets
                    .iter()
                    .find(|s| s.id == id)
                    .map(|s| (language.as_str(), s))
            })
            .ok_or_else(|| SnippetError::UnknownSnippet(id.to_string()))
    }

    /// Registered language keys, sorted.
    pub fn list_languages(&self) -> Vec<&str> {
        self.by_language
            .keys()
            .map(String::as_str)
            .sorted()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn snippet(id: &str, difficulty: Difficulty) -> Snippet {
        Snippet {
            id: id.to_string(),
            difficulty,
            description: format!("{id} description"),
            code: format!("// {id}"),
        }
    }

    fn small_registry() -> SnippetRegistry {
        SnippetRegistry::from_tables(vec![
            SnippetTable {
                language: "Lisp".to_string(),
                snippets: vec![
                    snippet("l-1", Difficulty::Easy),
                    snippet("l-2", Difficulty::Hard),
                    snippet("l-3", Difficulty::Hard),
                ],
            },
            SnippetTable {
                language: "empty".to_string(),
                snippets: vec![],
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_bundled_registry_loads() {
        let registry = SnippetRegistry::bundled().unwrap();
        assert_eq!(
            registry.list_languages(),
            vec!["go", "javascript", "python", "react", "rust", "typescript"]
        );
    }

    #[test]
    fn test_bundled_snippets_are_well_formed() {
        let registry = SnippetRegistry::bundled().unwrap();
        let mut ids = HashSet::new();
        for language in registry.list_languages() {
            for s in registry.snippets(language).unwrap() {
                assert!(!s.code.is_empty());
                assert!(!s.description.is_empty());
                assert!(ids.insert(s.id.clone()), "duplicate id {}", s.id);
            }
        }
        assert_eq!(ids.len(), 24);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = SnippetRegistry::bundled().unwrap();
        assert!(registry.get_random("JavaScript").is_ok());
        assert!(registry.get_random("PYTHON").is_ok());
    }

    #[test]
    fn test_unknown_language_is_not_found() {
        let registry = SnippetRegistry::bundled().unwrap();
        assert_matches!(
            registry.get_random("nonexistent-language"),
            Err(SnippetError::UnknownLanguage(lang)) if lang == "nonexistent-language"
        );
        assert_matches!(
            registry.get_random_by_difficulty("nonexistent-language", Difficulty::Easy),
            Err(SnippetError::UnknownLanguage(_))
        );
    }

    #[test]
    fn test_language_without_snippets_is_not_found() {
        let registry = small_registry();
        assert_matches!(
            registry.get_random("empty"),
            Err(SnippetError::UnknownLanguage(_))
        );
    }

    #[test]
    fn test_hard_javascript_only_returns_hard() {
        let registry = SnippetRegistry::bundled().unwrap();
        for _ in 0..50 {
            let s = registry
                .get_random_by_difficulty("javascript", Difficulty::Hard)
                .unwrap();
            assert_eq!(s.difficulty, Difficulty::Hard);
            assert!(s.id.starts_with("js-"));
        }
    }

    #[test]
    fn test_missing_difficulty_is_not_found() {
        let registry = SnippetRegistry::bundled().unwrap();
        assert_matches!(
            registry.get_random_by_difficulty("rust", Difficulty::Easy),
            Err(SnippetError::NoSnippetForDifficulty { difficulty: Difficulty::Easy, .. })
        );
    }

    #[test]
    fn test_random_pick_covers_all_candidates() {
        let registry = small_registry();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let s = registry
                .get_random_by_difficulty_with("lisp", Difficulty::Hard, &mut rng)
                .unwrap();
            seen.insert(s.id.clone());
        }
        assert_eq!(seen, HashSet::from(["l-2".to_string(), "l-3".to_string()]));
    }

    #[test]
    fn test_pick_with_and_without_difficulty() {
        let registry = small_registry();
        assert_eq!(registry.pick("lisp", Some(Difficulty::Easy)).unwrap().id, "l-1");
        assert!(registry.pick("lisp", None).is_ok());
    }

    #[test]
    fn test_get_by_id() {
        let registry = SnippetRegistry::bundled().unwrap();
        let (language, s) = registry.get_by_id("py-3").unwrap();
        assert_eq!(language, "python");
        assert_eq!(s.description, "Class with methods");

        assert_matches!(
            registry.get_by_id("nope"),
            Err(SnippetError::UnknownSnippet(_))
        );
    }

    #[test]
    fn test_tables_with_empty_code_are_rejected() {
        let result = SnippetRegistry::from_tables(vec![SnippetTable {
            language: "c".to_string(),
            snippets: vec![Snippet::custom("")],
        }]);
        assert_matches!(result, Err(SnippetError::InvalidTable { .. }));
    }

    #[test]
    fn test_snippets_keep_whitespace() {
        let registry = SnippetRegistry::bundled().unwrap();
        let (_, s) = registry.get_by_id("py-2").unwrap();
        assert!(s.code.contains("\n    return"));
    }

    #[test]
    fn test_difficulty_display_and_serde() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        let d: Difficulty = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(d, Difficulty::Medium);
    }
}
