// Language resolution for the judge
// Maps supported language names to the judge's numeric language ids.
// Defaults follow Judge0 CE; a languages.json file can override them.

use crate::error::JudgeError;
use arena_common::types::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    pub judge_id: u32,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LanguagesFile {
    languages: Vec<LanguageConfig>,
}

/// Registry of judge language ids.
/// Always covers every supported language, so a loaded registry can resolve
/// any validated problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRegistry {
    entries: BTreeMap<Language, LanguageConfig>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::judge0_ce()
    }
}

impl LanguageRegistry {
    /// Judge0 CE ids
    pub fn judge0_ce() -> Self {
        let defaults = [
            (Language::Cpp, 54, "GCC 9.2.0"),
            (Language::Java, 62, "OpenJDK 13.0.1"),
            (Language::Python, 71, "3.8.1"),
            (Language::JavaScript, 63, "Node.js 12.14.0"),
        ];

        let entries = defaults
            .into_iter()
            .map(|(language, judge_id, version)| {
                (
                    language,
                    LanguageConfig {
                        name: language.to_string(),
                        judge_id,
                        version: version.to_string(),
                    },
                )
            })
            .collect();

        Self { entries }
    }

    /// Build a registry from explicit entries
    pub fn from_configs(configs: Vec<LanguageConfig>) -> Result<Self, JudgeError> {
        let mut entries = BTreeMap::new();

        for config in configs {
            let language = Language::from_name(&config.name).ok_or_else(|| {
                JudgeError::LanguageTable(format!("unknown language '{}'", config.name))
            })?;
            if entries.insert(language, config).is_some() {
                return Err(JudgeError::LanguageTable(format!(
                    "language '{}' configured twice",
                    language
                )));
            }
        }

        let missing: Vec<&str> = Language::ALL
            .iter()
            .filter(|language| !entries.contains_key(*language))
            .map(|language| language.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(JudgeError::LanguageTable(format!(
                "no judge id configured for: {}",
                missing.join(", ")
            )));
        }

        Ok(Self { entries })
    }

    /// Load language ids from a languages.json file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, JudgeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            JudgeError::LanguageTable(format!("failed to read {}: {}", path.display(), e))
        })?;

        let file: LanguagesFile = serde_json::from_str(&content).map_err(|e| {
            JudgeError::LanguageTable(format!("failed to parse {}: {}", path.display(), e))
        })?;

        Self::from_configs(file.languages)
    }

    /// Resolve a language name, exactly as stored, to its judge id.
    pub fn resolve(&self, name: &str) -> Result<u32, JudgeError> {
        let language = Language::from_name(name)
            .ok_or_else(|| JudgeError::UnsupportedLanguage(name.to_string()))?;
        self.language_id(language)
    }

    pub fn language_id(&self, language: Language) -> Result<u32, JudgeError> {
        self.entries
            .get(&language)
            .map(|config| config.judge_id)
            .ok_or_else(|| JudgeError::UnsupportedLanguage(language.to_string()))
    }

    /// Configured languages in display order
    pub fn entries(&self) -> impl Iterator<Item = (Language, &LanguageConfig)> {
        self.entries.iter().map(|(language, config)| (*language, config))
    }
}
