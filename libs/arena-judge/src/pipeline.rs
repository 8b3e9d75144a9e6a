// Reference-solution validation run: build -> submit -> poll -> aggregate.
// Content failures come back as `Verdict::Rejected`; only transport, timeout
// and language problems are errors.

use crate::batch::build_submissions;
use crate::client::Judge;
use crate::config::PollPolicy;
use crate::error::JudgeError;
use crate::language::LanguageRegistry;
use crate::poll::await_results;
use crate::verdict::{self, Rejection};
use arena_common::types::{Language, ReferenceSolution, VisibleTestCase};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every solution matched every case.
    Accepted { submissions: usize },
    /// First failing run, traced back to the pair that produced it.
    Rejected {
        reason: String,
        status_id: Option<u32>,
        language: Language,
        test_case: usize,
    },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

pub async fn validate_reference_solutions(
    judge: &dyn Judge,
    languages: &LanguageRegistry,
    poll: &PollPolicy,
    solutions: &[ReferenceSolution],
    cases: &[VisibleTestCase],
) -> Result<Verdict, JudgeError> {
    let requests = build_submissions(languages, solutions, cases)?;
    if requests.is_empty() {
        return Ok(Verdict::Accepted { submissions: 0 });
    }

    let tokens = judge.submit_batch(&requests).await?;
    if tokens.len() != requests.len() {
        return Err(JudgeError::bad_response(
            "submissions/batch",
            format!("{} tokens for {} submissions", tokens.len(), requests.len()),
        ));
    }
    info!(submissions = tokens.len(), "Reference solutions submitted");

    let results = await_results(judge, &tokens, poll).await?;

    match verdict::aggregate(&results) {
        Ok(()) => Ok(Verdict::Accepted {
            submissions: results.len(),
        }),
        Err(Rejection {
            position,
            status_id,
            reason,
        }) => {
            let solution = &solutions[position / cases.len()];
            let test_case = position % cases.len();
            warn!(
                language = %solution.language,
                test_case,
                status_id = ?status_id,
                reason = %reason,
                "Reference solution rejected"
            );
            Ok(Verdict::Rejected {
                reason,
                status_id,
                language: solution.language,
                test_case,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::{SubmissionRequest, SubmissionResult, SubmissionToken};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Runs nothing: a submission is accepted when its source mentions the
    /// expected output, and wrong otherwise.
    #[derive(Default)]
    struct EchoJudge {
        submitted: Mutex<HashMap<String, SubmissionRequest>>,
        submit_calls: AtomicUsize,
    }

    #[async_trait]
    impl Judge for EchoJudge {
        async fn submit_batch(
            &self,
            requests: &[SubmissionRequest],
        ) -> Result<Vec<SubmissionToken>, JudgeError> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            let mut submitted = self.submitted.lock().unwrap();
            Ok(requests
                .iter()
                .map(|request| {
                    let token = format!("tok-{}", submitted.len());
                    submitted.insert(token.clone(), request.clone());
                    SubmissionToken(token)
                })
                .collect())
        }

        async fn fetch_batch(
            &self,
            tokens: &[SubmissionToken],
        ) -> Result<Vec<SubmissionResult>, JudgeError> {
            let submitted = self.submitted.lock().unwrap();
            Ok(tokens
                .iter()
                .map(|token| {
                    let request = &submitted[token.as_str()];
                    let status = if request.source_code.contains(&request.expected_output) {
                        verdict::ACCEPTED
                    } else {
                        4
                    };
                    SubmissionResult::with_status(status)
                })
                .collect())
        }
    }

    fn policy() -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_millis(1),
            delay_increment: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            deadline: Duration::from_secs(5),
        }
    }

    fn cases() -> Vec<VisibleTestCase> {
        vec![
            VisibleTestCase {
                stdin: "1 2".to_string(),
                expected_output: "3".to_string(),
                explanation: "sum".to_string(),
            },
            VisibleTestCase {
                stdin: "2 2".to_string(),
                expected_output: "4".to_string(),
                explanation: "sum".to_string(),
            },
        ]
    }

    fn solution(language: Language, source: &str) -> ReferenceSolution {
        ReferenceSolution {
            language,
            source_code: source.to_string(),
        }
    }

    #[tokio::test]
    async fn test_all_correct_is_accepted() {
        let judge = EchoJudge::default();
        let solutions = vec![
            solution(Language::Python, "print(3) or print(4)"),
            solution(Language::Java, "prints 3 then 4"),
        ];

        let verdict = validate_reference_solutions(
            &judge,
            &LanguageRegistry::default(),
            &policy(),
            &solutions,
            &cases(),
        )
        .await
        .unwrap();

        assert_eq!(verdict, Verdict::Accepted { submissions: 4 });
        assert_eq!(judge.submit_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_python_passes_java_fails_one_case() {
        let judge = EchoJudge::default();
        let solutions = vec![
            solution(Language::Python, "handles 3 and 4"),
            solution(Language::Java, "only ever prints 3"),
        ];

        let verdict = validate_reference_solutions(
            &judge,
            &LanguageRegistry::default(),
            &policy(),
            &solutions,
            &cases(),
        )
        .await
        .unwrap();

        assert_eq!(
            verdict,
            Verdict::Rejected {
                reason: "Wrong Answer".to_string(),
                status_id: Some(4),
                language: Language::Java,
                test_case: 1,
            }
        );
        assert!(!verdict.is_accepted());
    }

    #[tokio::test]
    async fn test_no_cases_never_reaches_judge() {
        let judge = EchoJudge::default();
        let solutions = vec![solution(Language::Cpp, "int main() {}")];

        let verdict = validate_reference_solutions(
            &judge,
            &LanguageRegistry::default(),
            &policy(),
            &solutions,
            &[],
        )
        .await
        .unwrap();

        assert_eq!(verdict, Verdict::Accepted { submissions: 0 });
        assert_eq!(judge.submit_calls.load(Ordering::SeqCst), 0);
    }
}
