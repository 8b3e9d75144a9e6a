/// Verdict Aggregator - All-or-Nothing Acceptance
///
/// **Core Responsibility:**
/// Decide whether a finished batch proves every reference solution correct.
///
/// **Rules:**
/// - Every result must carry the Accepted status (3)
/// - The first non-accepted result stops the walk; its status is mapped to text
/// - Unmapped statuses fall back to a generic message
/// - Partial success is a rejection, never a tally

use crate::submission::SubmissionResult;

pub const IN_QUEUE: u32 = 1;
pub const PROCESSING: u32 = 2;
pub const ACCEPTED: u32 = 3;

pub const FALLBACK_REASON: &str = "reference solution failed validation";

/// Human-readable text for a judge status code
pub fn describe(status_id: u32) -> Option<&'static str> {
    let text = match status_id {
        1 => "In Queue",
        2 => "Processing",
        3 => "Accepted",
        4 => "Wrong Answer",
        5 => "Time Limit Exceeded",
        6 => "Compilation Error",
        7 => "Runtime Error (SIGSEGV)",
        8 => "Runtime Error (SIGXFSZ)",
        9 => "Runtime Error (SIGFPE)",
        10 => "Runtime Error (SIGABRT)",
        11 => "Runtime Error (NZEC)",
        12 => "Runtime Error (Other)",
        13 => "Internal Error",
        14 => "Exec Format Error",
        _ => return None,
    };
    Some(text)
}

/// Whether the judge is done with a submission in this status
pub fn is_terminal(status_id: u32) -> bool {
    status_id != IN_QUEUE && status_id != PROCESSING
}

/// First non-accepted result of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Index of the offending result in batch order
    pub position: usize,
    pub status_id: Option<u32>,
    pub reason: String,
}

/// Accept the batch only if every result is Accepted.
pub fn aggregate(results: &[SubmissionResult]) -> Result<(), Rejection> {
    for (position, result) in results.iter().enumerate() {
        let status_id = result.status_id();
        if status_id == Some(ACCEPTED) {
            continue;
        }

        let reason = status_id
            .and_then(describe)
            .unwrap_or(FALLBACK_REASON)
            .to_string();

        return Err(Rejection {
            position,
            status_id,
            reason,
        });
    }

    Ok(())
}
