/// Submission Batch Builder
///
/// Expands {reference solution} x {visible test case} into one execution
/// request per pair. Ordering is solution-major and stable:
/// request `i` pairs solution `i / cases.len()` with case `i % cases.len()`.

use crate::error::JudgeError;
use crate::language::LanguageRegistry;
use crate::submission::SubmissionRequest;
use arena_common::types::{ReferenceSolution, VisibleTestCase};

pub fn build_submissions(
    languages: &LanguageRegistry,
    solutions: &[ReferenceSolution],
    cases: &[VisibleTestCase],
) -> Result<Vec<SubmissionRequest>, JudgeError> {
    let mut submissions = Vec::with_capacity(solutions.len() * cases.len());

    for solution in solutions {
        let language_id = languages.language_id(solution.language)?;
        let source_code = solution.source_code.trim();

        for case in cases {
            submissions.push(SubmissionRequest {
                language_id,
                source_code: source_code.to_string(),
                stdin: case.stdin.clone(),
                expected_output: case.expected_output.clone(),
            });
        }
    }

    Ok(submissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_common::types::Language;

    fn solutions() -> Vec<ReferenceSolution> {
        Language::ALL
            .iter()
            .map(|language| ReferenceSolution {
                language: *language,
                source_code: format!("  {} source\n", language),
            })
            .collect()
    }

    fn cases(n: usize) -> Vec<VisibleTestCase> {
        (0..n)
            .map(|i| VisibleTestCase {
                stdin: format!("in {}", i),
                expected_output: format!("out {}", i),
                explanation: format!("case {}", i),
            })
            .collect()
    }

    #[test]
    fn test_cross_product_size() {
        let registry = LanguageRegistry::default();
        for n in [1, 3, 50] {
            let batch = build_submissions(&registry, &solutions(), &cases(n)).unwrap();
            assert_eq!(batch.len(), 4 * n);
        }
    }

    #[test]
    fn test_language_ids_follow_their_source() {
        let registry = LanguageRegistry::default();
        let batch = build_submissions(&registry, &solutions(), &cases(2)).unwrap();

        let ids: Vec<u32> = batch.iter().map(|s| s.language_id).collect();
        assert_eq!(ids, vec![54, 54, 62, 62, 71, 71, 63, 63]);
        assert_eq!(batch[2].source_code, "Java source");
        assert_eq!(batch[5].source_code, "Python source");
    }

    #[test]
    fn test_cases_pair_in_order() {
        let registry = LanguageRegistry::default();
        let batch = build_submissions(&registry, &solutions(), &cases(3)).unwrap();

        assert_eq!(batch[0].stdin, "in 0");
        assert_eq!(batch[4].stdin, "in 1");
        assert_eq!(batch[4].expected_output, "out 1");
        assert_eq!(batch[11].stdin, "in 2");
    }

    #[test]
    fn test_empty_inputs_build_nothing() {
        let registry = LanguageRegistry::default();
        assert!(build_submissions(&registry, &solutions(), &[]).unwrap().is_empty());
        assert!(build_submissions(&registry, &[], &cases(2)).unwrap().is_empty());
    }
}
