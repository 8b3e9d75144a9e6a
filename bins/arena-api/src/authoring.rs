/// Problem Authoring Service
///
/// **Core Responsibility:**
/// Gate every write to the problem catalog behind structural validation and
/// a judge run of the reference solutions.
///
/// **Flow (create):**
/// received -> sanitized -> structurally validated -> judge validated -> committed
///
/// Any stage may reject. Nothing is written unless every stage passed, and the
/// write itself is one store call.
///
/// **Updates:**
/// - no `referenceSolution` in the payload: the judge is not consulted
/// - `referenceSolution` without `visibleTestCases`: refused before the judge
/// - both present: the new solutions are judged against the new cases

use crate::error::AuthoringError;
use crate::metrics;
use arena_common::query::{ListParams, ProblemQuery};
use arena_common::types::{Problem, ProblemPayload, ProblemSummary, ReferenceSolution, VisibleTestCase};
use arena_common::validate::{prepare_patch, prepare_problem, DuplicateTagPolicy};
use arena_common::ProblemStore;
use arena_judge::{validate_reference_solutions, Judge, LanguageRegistry, PollPolicy, Verdict};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_pages: u64,
    pub total_count: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProblemPage {
    pub problems: Vec<ProblemSummary>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct ProblemService {
    judge: Arc<dyn Judge>,
    store: Arc<dyn ProblemStore>,
    languages: LanguageRegistry,
    poll: PollPolicy,
    tag_policy: DuplicateTagPolicy,
}

impl ProblemService {
    pub fn new(
        judge: Arc<dyn Judge>,
        store: Arc<dyn ProblemStore>,
        languages: LanguageRegistry,
        poll: PollPolicy,
        tag_policy: DuplicateTagPolicy,
    ) -> Self {
        Self {
            judge,
            store,
            languages,
            poll,
            tag_policy,
        }
    }

    #[instrument(skip(self, payload))]
    pub async fn create(
        &self,
        payload: &ProblemPayload,
        creator: Option<String>,
    ) -> Result<Problem, AuthoringError> {
        let result = self.try_create(payload, creator).await;
        metrics::record("create", &result);
        result
    }

    async fn try_create(
        &self,
        payload: &ProblemPayload,
        creator: Option<String>,
    ) -> Result<Problem, AuthoringError> {
        let content = prepare_problem(payload, self.tag_policy)?;

        self.judge_solutions(&content.reference_solution, &content.visible_test_cases)
            .await?;

        let problem = self.store.create(content, creator).await?;
        info!(problem_id = %problem.id, title = %problem.content.title, "Problem created");
        Ok(problem)
    }

    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: &str, payload: &ProblemPayload) -> Result<Problem, AuthoringError> {
        let result = self.try_update(id, payload).await;
        metrics::record("update", &result);
        result
    }

    async fn try_update(&self, id: &str, payload: &ProblemPayload) -> Result<Problem, AuthoringError> {
        let id = parse_id(id)?;
        let patch = prepare_patch(payload, self.tag_policy)?;
        if patch.is_empty() {
            return Err(AuthoringError::MalformedPayload(
                "update carries no fields".to_string(),
            ));
        }

        if let Some(solutions) = &patch.reference_solution {
            let cases = patch.visible_test_cases.as_deref().ok_or_else(|| {
                AuthoringError::MalformedPayload(
                    "visibleTestCases must be supplied with referenceSolution".to_string(),
                )
            })?;

            // Don't spend judge time on a problem that is not there.
            if self.store.find_by_id(id).await?.is_none() {
                return Err(AuthoringError::NotFound(id.to_string()));
            }
            self.judge_solutions(solutions, cases).await?;
        }

        let problem = self
            .store
            .update(id, &patch)
            .await?
            .ok_or_else(|| AuthoringError::NotFound(id.to_string()))?;

        info!(problem_id = %problem.id, "Problem updated");
        Ok(problem)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Problem, AuthoringError> {
        let result = self.try_get(id).await;
        metrics::record("get", &result);
        result
    }

    async fn try_get(&self, id: &str) -> Result<Problem, AuthoringError> {
        let id = parse_id(id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthoringError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Problem, AuthoringError> {
        let result = self.try_delete(id).await;
        metrics::record("delete", &result);
        result
    }

    async fn try_delete(&self, id: &str) -> Result<Problem, AuthoringError> {
        let id = parse_id(id)?;
        let problem = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| AuthoringError::NotFound(id.to_string()))?;

        info!(problem_id = %problem.id, "Problem deleted");
        Ok(problem)
    }

    #[instrument(skip(self, params))]
    pub async fn list(&self, params: &ListParams) -> Result<ProblemPage, AuthoringError> {
        let result = self.try_list(params).await;
        metrics::record("list", &result);
        result
    }

    async fn try_list(&self, params: &ListParams) -> Result<ProblemPage, AuthoringError> {
        let query = ProblemQuery::from_params(params)?;
        let problems = self.store.find(&query).await?;
        let total_count = self.store.count(&query).await?;

        Ok(ProblemPage {
            problems,
            pagination: Pagination {
                total_pages: query.total_pages(total_count),
                total_count,
                page: query.page,
                limit: query.limit,
            },
        })
    }

    /// Run every reference solution against every visible case.
    async fn judge_solutions(
        &self,
        solutions: &[ReferenceSolution],
        cases: &[VisibleTestCase],
    ) -> Result<(), AuthoringError> {
        let timer = metrics::JUDGE_VALIDATION_SECONDS.start_timer();
        metrics::JUDGE_SUBMISSIONS_TOTAL.inc_by((solutions.len() * cases.len()) as u64);

        let verdict = validate_reference_solutions(
            self.judge.as_ref(),
            &self.languages,
            &self.poll,
            solutions,
            cases,
        )
        .await;
        timer.observe_duration();

        match verdict? {
            Verdict::Accepted { submissions } => {
                info!(submissions, "Reference solutions accepted");
                Ok(())
            }
            Verdict::Rejected {
                reason,
                language,
                test_case,
                ..
            } => {
                warn!(language = %language, test_case, reason = %reason, "Reference solution rejected");
                Err(AuthoringError::JudgeValidationFailed(reason))
            }
        }
    }
}

fn parse_id(id: &str) -> Result<Uuid, AuthoringError> {
    Uuid::parse_str(id.trim()).map_err(|_| AuthoringError::InvalidIdentifier(id.to_string()))
}
