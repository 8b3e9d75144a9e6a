/// Problem Payload Validation
///
/// **Core Responsibility:**
/// Turn an untrusted authoring payload into a typed `ProblemContent` (or
/// `ProblemPatch`) exactly once, before anything is sent to the judge.
///
/// **Pipeline:**
/// 1. `sanitize` - snapshot the payload and trim every string in the copy
/// 2. `validate_problem` / `validate_patch` - enforce the document invariants
///
/// The caller's payload is never modified.

use crate::error::ValidationError;
use crate::types::{
    BoilerplateCode, BoilerplateInput, Difficulty, HiddenTestCase, HiddenTestCaseInput, Language,
    ProblemContent, ProblemPatch, ProblemPayload, ReferenceSolution, ReferenceSolutionInput, Tag,
    VisibleTestCase, VisibleTestCaseInput,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::str::FromStr;

const TITLE_CHARS: RangeInclusive<usize> = 5..=150;
const MIN_DESCRIPTION_CHARS: usize = 20;
const TAG_COUNT: RangeInclusive<usize> = 1..=10;
const CONSTRAINT_COUNT: RangeInclusive<usize> = 1..=20;
const VISIBLE_CASE_COUNT: RangeInclusive<usize> = 1..=50;
const HIDDEN_CASE_COUNT: RangeInclusive<usize> = 1..=200;

/// What to do when the same tag appears twice in a payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateTagPolicy {
    /// Keep the first occurrence of each tag.
    #[default]
    Deduplicate,
    /// Refuse the payload.
    Reject,
}

impl FromStr for DuplicateTagPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deduplicate" | "dedup" => Ok(DuplicateTagPolicy::Deduplicate),
            "reject" => Ok(DuplicateTagPolicy::Reject),
            other => Err(format!("unknown duplicate tag policy '{}'", other)),
        }
    }
}

/// Trimmed copy of `payload`. Languages are left as sent: they are matched exactly.
pub fn sanitize(payload: &ProblemPayload) -> ProblemPayload {
    let mut copy = payload.clone();

    trim_in_place(&mut copy.title);
    trim_in_place(&mut copy.description);
    if let Some(tags) = copy.tags.as_mut() {
        tags.iter_mut().for_each(trim_string);
    }
    if let Some(constraints) = copy.constraints.as_mut() {
        constraints.iter_mut().for_each(trim_string);
    }
    if let Some(cases) = copy.visible_test_cases.as_mut() {
        for case in cases.iter_mut() {
            trim_string(&mut case.stdin);
            trim_string(&mut case.expected_output);
            trim_string(&mut case.explanation);
        }
    }
    if let Some(cases) = copy.hidden_test_cases.as_mut() {
        for case in cases.iter_mut() {
            trim_string(&mut case.stdin);
            trim_string(&mut case.expected_output);
        }
    }
    if let Some(entries) = copy.boilerplate_code.as_mut() {
        entries.iter_mut().for_each(|entry| trim_string(&mut entry.code));
    }
    if let Some(entries) = copy.reference_solution.as_mut() {
        entries.iter_mut().for_each(|entry| trim_string(&mut entry.source_code));
    }

    copy
}

fn trim_in_place(value: &mut Option<String>) {
    if let Some(s) = value.as_mut() {
        trim_string(s);
    }
}

fn trim_string(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Validate a sanitized creation payload. Every field is mandatory.
pub fn validate_problem(
    payload: &ProblemPayload,
    tag_policy: DuplicateTagPolicy,
) -> Result<ProblemContent, ValidationError> {
    let missing: Vec<&str> = [
        ("title", payload.title.is_none()),
        ("description", payload.description.is_none()),
        ("difficulty", payload.difficulty.is_none()),
        ("tags", payload.tags.is_none()),
        ("constraints", payload.constraints.is_none()),
        ("visibleTestCases", payload.visible_test_cases.is_none()),
        ("hiddenTestCases", payload.hidden_test_cases.is_none()),
        ("boilerplateCode", payload.boilerplate_code.is_none()),
        ("referenceSolution", payload.reference_solution.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();

    if !missing.is_empty() {
        return Err(ValidationError::malformed(format!(
            "mandatory fields are missing: {}",
            missing.join(", ")
        )));
    }

    let patch = validate_patch(payload, tag_policy)?;

    // Every field was present, so every patch field is populated.
    match patch {
        ProblemPatch {
            title: Some(title),
            description: Some(description),
            difficulty: Some(difficulty),
            tags: Some(tags),
            constraints: Some(constraints),
            visible_test_cases: Some(visible_test_cases),
            hidden_test_cases: Some(hidden_test_cases),
            boilerplate_code: Some(boilerplate_code),
            reference_solution: Some(reference_solution),
        } => Ok(ProblemContent {
            title,
            description,
            difficulty,
            tags,
            constraints,
            visible_test_cases,
            hidden_test_cases,
            boilerplate_code,
            reference_solution,
        }),
        _ => Err(ValidationError::malformed("mandatory fields are missing")),
    }
}

/// Validate a sanitized update payload. Only the fields it carries are checked.
pub fn validate_patch(
    payload: &ProblemPayload,
    tag_policy: DuplicateTagPolicy,
) -> Result<ProblemPatch, ValidationError> {
    Ok(ProblemPatch {
        title: payload.title.as_deref().map(check_title).transpose()?,
        description: payload
            .description
            .as_deref()
            .map(check_description)
            .transpose()?,
        difficulty: payload
            .difficulty
            .as_deref()
            .map(check_difficulty)
            .transpose()?,
        tags: payload
            .tags
            .as_deref()
            .map(|tags| check_tags(tags, tag_policy))
            .transpose()?,
        constraints: payload
            .constraints
            .as_deref()
            .map(check_constraints)
            .transpose()?,
        visible_test_cases: payload
            .visible_test_cases
            .as_deref()
            .map(check_visible_cases)
            .transpose()?,
        hidden_test_cases: payload
            .hidden_test_cases
            .as_deref()
            .map(check_hidden_cases)
            .transpose()?,
        boilerplate_code: payload
            .boilerplate_code
            .as_deref()
            .map(check_boilerplate)
            .transpose()?,
        reference_solution: payload
            .reference_solution
            .as_deref()
            .map(check_reference_solutions)
            .transpose()?,
    })
}

/// Sanitize then validate a creation payload.
pub fn prepare_problem(
    payload: &ProblemPayload,
    tag_policy: DuplicateTagPolicy,
) -> Result<ProblemContent, ValidationError> {
    validate_problem(&sanitize(payload), tag_policy)
}

/// Sanitize then validate an update payload.
pub fn prepare_patch(
    payload: &ProblemPayload,
    tag_policy: DuplicateTagPolicy,
) -> Result<ProblemPatch, ValidationError> {
    validate_patch(&sanitize(payload), tag_policy)
}

fn check_title(title: &str) -> Result<String, ValidationError> {
    if !TITLE_CHARS.contains(&title.chars().count()) {
        return Err(ValidationError::malformed(format!(
            "title must be a string between {} and {} characters",
            TITLE_CHARS.start(),
            TITLE_CHARS.end()
        )));
    }
    Ok(title.to_string())
}

fn check_description(description: &str) -> Result<String, ValidationError> {
    if description.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(ValidationError::malformed(format!(
            "description must be at least {} characters",
            MIN_DESCRIPTION_CHARS
        )));
    }
    Ok(description.to_string())
}

fn check_difficulty(difficulty: &str) -> Result<Difficulty, ValidationError> {
    Difficulty::from_name(difficulty)
        .ok_or_else(|| ValidationError::malformed(format!("invalid difficulty: {}", difficulty)))
}

fn check_count(field: &str, len: usize, range: &RangeInclusive<usize>) -> Result<(), ValidationError> {
    if range.contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::malformed(format!(
            "{} must be an array with {} to {} items",
            field,
            range.start(),
            range.end()
        )))
    }
}

fn check_tags(tags: &[String], policy: DuplicateTagPolicy) -> Result<Vec<Tag>, ValidationError> {
    let mut parsed: Vec<Tag> = Vec::with_capacity(tags.len());
    for name in tags {
        let tag = Tag::from_name(name)
            .ok_or_else(|| ValidationError::malformed(format!("invalid tag: {}", name)))?;
        if parsed.contains(&tag) {
            match policy {
                DuplicateTagPolicy::Deduplicate => continue,
                DuplicateTagPolicy::Reject => {
                    return Err(ValidationError::malformed(format!("duplicate tag: {}", tag)))
                }
            }
        }
        parsed.push(tag);
    }
    check_count("tags", parsed.len(), &TAG_COUNT)?;
    Ok(parsed)
}

fn check_constraints(constraints: &[String]) -> Result<Vec<String>, ValidationError> {
    check_count("constraints", constraints.len(), &CONSTRAINT_COUNT)?;
    if constraints.iter().any(|c| c.is_empty()) {
        return Err(ValidationError::malformed("constraints must not be empty"));
    }
    Ok(constraints.to_vec())
}

fn check_visible_cases(cases: &[VisibleTestCaseInput]) -> Result<Vec<VisibleTestCase>, ValidationError> {
    check_count("visibleTestCases", cases.len(), &VISIBLE_CASE_COUNT)?;
    cases
        .iter()
        .map(|case| {
            require("visible test case stdin", &case.stdin)?;
            require("visible test case expected_output", &case.expected_output)?;
            require("visible test case explanation", &case.explanation)?;
            Ok(VisibleTestCase {
                stdin: case.stdin.clone(),
                expected_output: case.expected_output.clone(),
                explanation: case.explanation.clone(),
            })
        })
        .collect()
}

fn check_hidden_cases(cases: &[HiddenTestCaseInput]) -> Result<Vec<HiddenTestCase>, ValidationError> {
    check_count("hiddenTestCases", cases.len(), &HIDDEN_CASE_COUNT)?;
    cases
        .iter()
        .map(|case| {
            require("hidden test case stdin", &case.stdin)?;
            require("hidden test case expected_output", &case.expected_output)?;
            Ok(HiddenTestCase {
                stdin: case.stdin.clone(),
                expected_output: case.expected_output.clone(),
            })
        })
        .collect()
}

fn require(what: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::malformed(format!("{} is required", what)))
    } else {
        Ok(())
    }
}

fn check_boilerplate(entries: &[BoilerplateInput]) -> Result<Vec<BoilerplateCode>, ValidationError> {
    let languages = entries
        .iter()
        .map(|entry| entry.language.as_str())
        .collect::<Vec<_>>();
    let languages = check_language_set("boilerplateCode", &languages)?;

    Ok(entries
        .iter()
        .zip(languages)
        .map(|(entry, language)| BoilerplateCode {
            language,
            code: entry.code.clone(),
        })
        .collect())
}

fn check_reference_solutions(
    entries: &[ReferenceSolutionInput],
) -> Result<Vec<ReferenceSolution>, ValidationError> {
    let languages = entries
        .iter()
        .map(|entry| entry.language.as_str())
        .collect::<Vec<_>>();
    let languages = check_language_set("referenceSolution", &languages)?;

    entries
        .iter()
        .zip(languages)
        .map(|(entry, language)| {
            if entry.source_code.is_empty() {
                return Err(ValidationError::malformed(format!(
                    "reference solution source_code is required ({})",
                    language
                )));
            }
            Ok(ReferenceSolution {
                language,
                source_code: entry.source_code.clone(),
            })
        })
        .collect()
}

/// Resolve every name, then require exactly one entry per supported language.
fn check_language_set(field: &str, names: &[&str]) -> Result<Vec<Language>, ValidationError> {
    let languages = names
        .iter()
        .map(|name| {
            Language::from_name(name)
                .ok_or_else(|| ValidationError::UnsupportedLanguage(format!("{} in {}", name, field)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    for language in &languages {
        if !seen.insert(*language) {
            return Err(ValidationError::malformed(format!(
                "{} lists {} more than once",
                field, language
            )));
        }
    }

    let missing: Vec<&str> = Language::ALL
        .iter()
        .filter(|language| !seen.contains(language))
        .map(|language| language.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::malformed(format!(
            "{} must include all supported languages (missing: {})",
            field,
            missing.join(", ")
        )));
    }

    Ok(languages)
}
