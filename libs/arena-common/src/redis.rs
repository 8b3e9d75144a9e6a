use crate::error::StoreError;
use crate::query::{self, ProblemQuery};
use crate::store::ProblemStore;
use crate::types::{Problem, ProblemContent, ProblemPatch, ProblemSummary};
use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use tracing::{debug, warn};
use uuid::Uuid;

/// Redis layout for problem documents - key semantics only.
/// Each problem is one JSON string; a sorted set indexes ids by creation time.

pub const PROBLEM_PREFIX: &str = "arena:problem";
pub const PROBLEM_INDEX: &str = "arena:problems";

/// How many times an update re-reads the document after losing a race.
const UPDATE_ATTEMPTS: usize = 5;

/// Replace KEYS[1] with ARGV[2] only if it still holds ARGV[1].
const COMPARE_AND_SET: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('SET', KEYS[1], ARGV[2])
end
return false
"#;

/// Generate the document key for a problem
pub fn problem_key(id: &Uuid) -> String {
    format!("{}:{}", PROBLEM_PREFIX, id)
}

/// Write a problem document and index it, atomically
pub async fn put_problem(conn: &mut ConnectionManager, problem: &Problem) -> Result<(), StoreError> {
    let payload = serde_json::to_string(problem)?;
    let _: () = redis::pipe()
        .atomic()
        .set(problem_key(&problem.id), payload)
        .ignore()
        .zadd(
            PROBLEM_INDEX,
            problem.id.to_string(),
            problem.created_at.timestamp_millis(),
        )
        .ignore()
        .query_async(conn)
        .await?;
    Ok(())
}

/// Read a problem document
pub async fn get_problem(conn: &mut ConnectionManager, id: &Uuid) -> Result<Option<Problem>, StoreError> {
    let payload: Option<String> = conn.get(problem_key(id)).await?;
    payload
        .map(|data| serde_json::from_str(&data).map_err(StoreError::from))
        .transpose()
}

/// Load every indexed problem document
pub async fn all_problems(conn: &mut ConnectionManager) -> Result<Vec<Problem>, StoreError> {
    let ids: Vec<String> = conn.zrange(PROBLEM_INDEX, 0, -1).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let keys: Vec<String> = ids
        .iter()
        .map(|id| format!("{}:{}", PROBLEM_PREFIX, id))
        .collect();
    let payloads: Vec<Option<String>> = redis::cmd("MGET").arg(&keys).query_async(conn).await?;

    let mut problems = Vec::with_capacity(payloads.len());
    for (id, payload) in ids.iter().zip(payloads) {
        match payload {
            Some(data) => problems.push(serde_json::from_str(&data)?),
            None => warn!(problem_id = %id, "Indexed problem has no document"),
        }
    }
    Ok(problems)
}

/// Redis-backed document store
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl ProblemStore for RedisStore {
    async fn create(
        &self,
        content: ProblemContent,
        creator: Option<String>,
    ) -> Result<Problem, StoreError> {
        let problem = Problem::new(content, creator);
        let mut conn = self.conn.clone();
        put_problem(&mut conn, &problem).await?;
        Ok(problem)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Problem>, StoreError> {
        let mut conn = self.conn.clone();
        get_problem(&mut conn, &id).await
    }

    async fn update(&self, id: Uuid, patch: &ProblemPatch) -> Result<Option<Problem>, StoreError> {
        let mut conn = self.conn.clone();
        let key = problem_key(&id);
        let script = Script::new(COMPARE_AND_SET);

        for attempt in 1..=UPDATE_ATTEMPTS {
            let current: Option<String> = conn.get(&key).await?;
            let Some(current) = current else {
                return Ok(None);
            };

            let mut problem: Problem = serde_json::from_str(&current)?;
            patch.apply_to(&mut problem.content);
            problem.updated_at = Utc::now();
            let next = serde_json::to_string(&problem)?;

            let swapped: Option<String> = script
                .key(&key)
                .arg(&current)
                .arg(&next)
                .invoke_async(&mut conn)
                .await?;
            if swapped.is_some() {
                return Ok(Some(problem));
            }
            debug!(problem_id = %id, attempt, "Problem changed underneath update, retrying");
        }

        Err(StoreError::Conflict(id))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Problem>, StoreError> {
        let mut conn = self.conn.clone();
        let key = problem_key(&id);
        let (payload, _, _): (Option<String>, i64, i64) = redis::pipe()
            .atomic()
            .get(&key)
            .del(&key)
            .zrem(PROBLEM_INDEX, id.to_string())
            .query_async(&mut conn)
            .await?;

        payload
            .map(|data| serde_json::from_str(&data).map_err(StoreError::from))
            .transpose()
    }

    async fn find(&self, query: &ProblemQuery) -> Result<Vec<ProblemSummary>, StoreError> {
        let mut conn = self.conn.clone();
        let problems = all_problems(&mut conn).await?;
        Ok(query::select(query, problems))
    }

    async fn count(&self, query: &ProblemQuery) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let problems = all_problems(&mut conn).await?;
        Ok(query::count(query, &problems))
    }
}
