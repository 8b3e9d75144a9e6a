use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Languages every problem must ship a boilerplate and a reference solution for.
/// Names are matched exactly, as they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "C++")]
    Cpp,
    Java,
    Python,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Cpp,
        Language::Java,
        Language::Python,
        Language::JavaScript,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.as_str() == name)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Easy" => Some(Difficulty::Easy),
            "Medium" => Some(Difficulty::Medium),
            "Hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Sort rank, easiest first.
    pub fn rank(&self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

/// Fixed tag vocabulary of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Array,
    #[serde(rename = "Linked List")]
    LinkedList,
    Stack,
    Queue,
    Tree,
    Graph,
    #[serde(rename = "DP")]
    Dp,
    Greedy,
    Math,
    String,
}

impl Tag {
    pub const ALL: [Tag; 10] = [
        Tag::Array,
        Tag::LinkedList,
        Tag::Stack,
        Tag::Queue,
        Tag::Tree,
        Tag::Graph,
        Tag::Dp,
        Tag::Greedy,
        Tag::Math,
        Tag::String,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Array => "Array",
            Tag::LinkedList => "Linked List",
            Tag::Stack => "Stack",
            Tag::Queue => "Queue",
            Tag::Tree => "Tree",
            Tag::Graph => "Graph",
            Tag::Dp => "DP",
            Tag::Greedy => "Greedy",
            Tag::Math => "Math",
            Tag::String => "String",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Inbound payload, as authors send it. Nothing here is trusted yet.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Option<Vec<String>>,
    pub constraints: Option<Vec<String>>,
    pub visible_test_cases: Option<Vec<VisibleTestCaseInput>>,
    pub hidden_test_cases: Option<Vec<HiddenTestCaseInput>>,
    pub boilerplate_code: Option<Vec<BoilerplateInput>>,
    pub reference_solution: Option<Vec<ReferenceSolutionInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibleTestCaseInput {
    #[serde(default)]
    pub stdin: String,
    #[serde(default)]
    pub expected_output: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HiddenTestCaseInput {
    #[serde(default)]
    pub stdin: String,
    #[serde(default)]
    pub expected_output: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoilerplateInput {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSolutionInput {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub source_code: String,
}

// ---------------------------------------------------------------------------
// Validated model. Produced once by `validate`, consumed everywhere else.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleTestCase {
    pub stdin: String,
    pub expected_output: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenTestCase {
    pub stdin: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoilerplateCode {
    pub language: Language,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSolution {
    pub language: Language,
    pub source_code: String,
}

/// Everything an author controls about a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemContent {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub tags: Vec<Tag>,
    pub constraints: Vec<String>,
    pub visible_test_cases: Vec<VisibleTestCase>,
    pub hidden_test_cases: Vec<HiddenTestCase>,
    pub boilerplate_code: Vec<BoilerplateCode>,
    pub reference_solution: Vec<ReferenceSolution>,
}

/// Validated partial update. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub tags: Option<Vec<Tag>>,
    pub constraints: Option<Vec<String>>,
    pub visible_test_cases: Option<Vec<VisibleTestCase>>,
    pub hidden_test_cases: Option<Vec<HiddenTestCase>>,
    pub boilerplate_code: Option<Vec<BoilerplateCode>>,
    pub reference_solution: Option<Vec<ReferenceSolution>>,
}

impl ProblemPatch {
    pub fn is_empty(&self) -> bool {
        *self == ProblemPatch::default()
    }

    pub fn apply_to(&self, content: &mut ProblemContent) {
        if let Some(title) = &self.title {
            content.title = title.clone();
        }
        if let Some(description) = &self.description {
            content.description = description.clone();
        }
        if let Some(difficulty) = self.difficulty {
            content.difficulty = difficulty;
        }
        if let Some(tags) = &self.tags {
            content.tags = tags.clone();
        }
        if let Some(constraints) = &self.constraints {
            content.constraints = constraints.clone();
        }
        if let Some(cases) = &self.visible_test_cases {
            content.visible_test_cases = cases.clone();
        }
        if let Some(cases) = &self.hidden_test_cases {
            content.hidden_test_cases = cases.clone();
        }
        if let Some(boilerplate) = &self.boilerplate_code {
            content.boilerplate_code = boilerplate.clone();
        }
        if let Some(solutions) = &self.reference_solution {
            content.reference_solution = solutions.clone();
        }
    }
}

/// A stored problem document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: Uuid,
    #[serde(flatten)]
    pub content: ProblemContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_creator: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Problem {
    pub fn new(content: ProblemContent, problem_creator: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content,
            problem_creator,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> ProblemSummary {
        ProblemSummary {
            id: self.id,
            title: self.content.title.clone(),
            difficulty: self.content.difficulty,
            tags: self.content.tags.clone(),
            created_at: self.created_at,
        }
    }
}

/// Catalog listing projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSummary {
    pub id: Uuid,
    pub title: String,
    pub difficulty: Difficulty,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_names_are_exact() {
        assert_eq!(Language::from_name("C++"), Some(Language::Cpp));
        assert_eq!(Language::from_name("JavaScript"), Some(Language::JavaScript));
        assert_eq!(Language::from_name("python"), None);
        assert_eq!(Language::from_name("Rust"), None);
    }

    #[test]
    fn test_language_serializes_as_display_name() {
        let json = serde_json::to_string(&Language::Cpp).unwrap();
        assert_eq!(json, "\"C++\"");
        let lang: Language = serde_json::from_str("\"JavaScript\"").unwrap();
        assert_eq!(lang, Language::JavaScript);
    }

    #[test]
    fn test_tag_vocabulary_names() {
        assert_eq!(Tag::from_name("Linked List"), Some(Tag::LinkedList));
        assert_eq!(serde_json::to_string(&Tag::Dp).unwrap(), "\"DP\"");
        assert_eq!(Tag::from_name("Heap"), None);
    }

    #[test]
    fn test_difficulty_rank_order() {
        assert!(Difficulty::Easy.rank() < Difficulty::Medium.rank());
        assert!(Difficulty::Medium.rank() < Difficulty::Hard.rank());
    }

    #[test]
    fn test_payload_uses_camel_case_fields() {
        let payload: ProblemPayload = serde_json::from_str(
            r#"{
                "title": "Two Sum",
                "visibleTestCases": [{"stdin": "1 2", "expected_output": "3"}],
                "referenceSolution": [{"language": "Java"}]
            }"#,
        )
        .unwrap();

        let cases = payload.visible_test_cases.unwrap();
        assert_eq!(cases[0].expected_output, "3");
        assert_eq!(cases[0].explanation, "");
        let solutions = payload.reference_solution.unwrap();
        assert_eq!(solutions[0].language, "Java");
        assert_eq!(solutions[0].source_code, "");
        assert!(payload.hidden_test_cases.is_none());
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut content = ProblemContent {
            title: "Old title".to_string(),
            description: "A description that is long enough".to_string(),
            difficulty: Difficulty::Easy,
            tags: vec![Tag::Array],
            constraints: vec!["1 <= n".to_string()],
            visible_test_cases: vec![],
            hidden_test_cases: vec![],
            boilerplate_code: vec![],
            reference_solution: vec![],
        };
        let patch = ProblemPatch {
            title: Some("New title".to_string()),
            difficulty: Some(Difficulty::Hard),
            ..Default::default()
        };

        patch.apply_to(&mut content);

        assert_eq!(content.title, "New title");
        assert_eq!(content.difficulty, Difficulty::Hard);
        assert_eq!(content.tags, vec![Tag::Array]);
        assert!(!patch.is_empty());
        assert!(ProblemPatch::default().is_empty());
    }
}
