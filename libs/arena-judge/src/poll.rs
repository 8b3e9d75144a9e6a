// Bounded polling for batch results.
// A single fetch right after submission can observe queued work; keep
// fetching until every status is terminal or the deadline passes. The last
// sleep is cut short so a fetch always lands on the deadline itself.

use crate::client::Judge;
use crate::config::PollPolicy;
use crate::error::JudgeError;
use crate::submission::{SubmissionResult, SubmissionToken};
use crate::verdict;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::debug;

pub async fn await_results(
    judge: &dyn Judge,
    tokens: &[SubmissionToken],
    policy: &PollPolicy,
) -> Result<Vec<SubmissionResult>, JudgeError> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let started = Instant::now();
    let deadline = started + policy.deadline;
    let mut delay = policy.initial_delay;
    let mut pending = tokens.len();
    let timed_out = |pending: usize| JudgeError::Timeout {
        pending,
        total: tokens.len(),
        waited: started.elapsed(),
    };

    let mut round: u32 = 0;
    loop {
        round += 1;
        sleep(delay.min(deadline.saturating_duration_since(Instant::now()))).await;

        // A fetch issued at the deadline still gets one backoff step to answer.
        let fetch_by = deadline.max(Instant::now() + policy.max_delay);
        let results = match timeout_at(fetch_by, judge.fetch_batch(tokens)).await {
            Ok(results) => results?,
            Err(_) => return Err(timed_out(pending)),
        };
        if results.len() != tokens.len() {
            return Err(JudgeError::bad_response(
                "submissions/batch",
                format!("{} results for {} tokens", results.len(), tokens.len()),
            ));
        }

        let mut unfinished = 0;
        for result in &results {
            match result.status_id() {
                Some(status_id) if verdict::is_terminal(status_id) => {}
                Some(_) => unfinished += 1,
                None => {
                    return Err(JudgeError::bad_response(
                        "submissions/batch",
                        "result without a status",
                    ))
                }
            }
        }

        if unfinished == 0 {
            debug!(round, submissions = results.len(), "All submissions finished");
            return Ok(results);
        }

        pending = unfinished;
        if Instant::now() >= deadline {
            return Err(timed_out(pending));
        }
        delay = (delay + policy.delay_increment).min(policy.max_delay);
        debug!(round, pending, next_delay_ms = delay.as_millis() as u64, "Submissions still running");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::SubmissionRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves scripted fetch rounds; the last round repeats forever.
    struct ScriptedJudge {
        rounds: Mutex<Vec<Vec<u32>>>,
        fetches: AtomicUsize,
    }

    impl ScriptedJudge {
        fn new(rounds: Vec<Vec<u32>>) -> Self {
            Self {
                rounds: Mutex::new(rounds),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Judge for ScriptedJudge {
        async fn submit_batch(
            &self,
            _requests: &[SubmissionRequest],
        ) -> Result<Vec<SubmissionToken>, JudgeError> {
            unreachable!("polling never submits")
        }

        async fn fetch_batch(
            &self,
            _tokens: &[SubmissionToken],
        ) -> Result<Vec<SubmissionResult>, JudgeError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let mut rounds = self.rounds.lock().unwrap();
            let statuses = if rounds.len() > 1 {
                rounds.remove(0)
            } else {
                rounds[0].clone()
            };
            Ok(statuses.into_iter().map(SubmissionResult::with_status).collect())
        }
    }

    fn tokens(n: usize) -> Vec<SubmissionToken> {
        (0..n).map(|i| SubmissionToken(format!("t{}", i))).collect()
    }

    fn fast_policy(deadline_ms: u64) -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_millis(1),
            delay_increment: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            deadline: Duration::from_millis(deadline_ms),
        }
    }

    #[tokio::test]
    async fn test_polls_until_terminal() {
        let judge = ScriptedJudge::new(vec![vec![1, 2], vec![3, 2], vec![3, 4]]);

        let results = await_results(&judge, &tokens(2), &fast_policy(2_000)).await.unwrap();

        let statuses: Vec<Option<u32>> = results.iter().map(|r| r.status_id()).collect();
        assert_eq!(statuses, vec![Some(3), Some(4)]);
        assert_eq!(judge.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_times_out_on_stalled_judge() {
        let judge = ScriptedJudge::new(vec![vec![3, 1, 2]]);

        let err = await_results(&judge, &tokens(3), &fast_policy(30)).await.unwrap_err();

        match err {
            JudgeError::Timeout { pending, total, .. } => {
                assert_eq!(pending, 2);
                assert_eq!(total, 3);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_final_fetch_uses_remaining_deadline() {
        // The second full backoff would overshoot the deadline; the poller
        // should shorten it rather than give up after one fetch.
        let judge = ScriptedJudge::new(vec![vec![2], vec![3]]);
        let policy = PollPolicy {
            initial_delay: Duration::from_millis(300),
            delay_increment: Duration::ZERO,
            max_delay: Duration::from_millis(300),
            deadline: Duration::from_millis(500),
        };

        let started = Instant::now();
        let results = await_results(&judge, &tokens(1), &policy).await.unwrap();

        assert_eq!(results[0].status_id(), Some(3));
        assert_eq!(judge.fetches.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_timeout_reported_only_after_deadline() {
        let judge = ScriptedJudge::new(vec![vec![2]]);
        let policy = PollPolicy {
            initial_delay: Duration::from_millis(300),
            delay_increment: Duration::ZERO,
            max_delay: Duration::from_millis(300),
            deadline: Duration::from_millis(500),
        };

        let err = await_results(&judge, &tokens(1), &policy).await.unwrap_err();

        match err {
            JudgeError::Timeout { pending, waited, .. } => {
                assert_eq!(pending, 1);
                assert!(waited >= Duration::from_millis(500));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(judge.fetches.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_empty_token_set_skips_fetch() {
        let judge = ScriptedJudge::new(vec![vec![]]);
        let results = await_results(&judge, &[], &fast_policy(100)).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(judge.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_status_is_bad_response() {
        struct Statusless;

        #[async_trait]
        impl Judge for Statusless {
            async fn submit_batch(
                &self,
                _requests: &[SubmissionRequest],
            ) -> Result<Vec<SubmissionToken>, JudgeError> {
                Ok(Vec::new())
            }

            async fn fetch_batch(
                &self,
                tokens: &[SubmissionToken],
            ) -> Result<Vec<SubmissionResult>, JudgeError> {
                Ok(vec![SubmissionResult::default(); tokens.len()])
            }
        }

        let err = await_results(&Statusless, &tokens(1), &fast_policy(100)).await.unwrap_err();
        assert!(matches!(err, JudgeError::BadResponse { .. }));
    }
}
