// Document store boundary for problem documents.
// The authoring service only ever talks to `ProblemStore`; each write is a
// single atomic operation from its point of view.

use crate::error::StoreError;
use crate::query::{self, ProblemQuery};
use crate::types::{Problem, ProblemContent, ProblemPatch, ProblemSummary};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait ProblemStore: Send + Sync {
    async fn create(
        &self,
        content: ProblemContent,
        creator: Option<String>,
    ) -> Result<Problem, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Problem>, StoreError>;

    /// Merge `patch` into the stored document. `None` when `id` does not exist.
    async fn update(&self, id: Uuid, patch: &ProblemPatch) -> Result<Option<Problem>, StoreError>;

    /// Remove and return the document. `None` when `id` does not exist.
    async fn delete(&self, id: Uuid) -> Result<Option<Problem>, StoreError>;

    async fn find(&self, query: &ProblemQuery) -> Result<Vec<ProblemSummary>, StoreError>;

    async fn count(&self, query: &ProblemQuery) -> Result<u64, StoreError>;
}

/// Process-local store. Used by tests and by the API when no Redis is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    problems: RwLock<HashMap<Uuid, Problem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.problems.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.problems.read().await.is_empty()
    }
}

#[async_trait]
impl ProblemStore for MemoryStore {
    async fn create(
        &self,
        content: ProblemContent,
        creator: Option<String>,
    ) -> Result<Problem, StoreError> {
        let problem = Problem::new(content, creator);
        self.problems
            .write()
            .await
            .insert(problem.id, problem.clone());
        Ok(problem)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Problem>, StoreError> {
        Ok(self.problems.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: &ProblemPatch) -> Result<Option<Problem>, StoreError> {
        let mut problems = self.problems.write().await;
        let Some(problem) = problems.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(&mut problem.content);
        problem.updated_at = Utc::now();
        Ok(Some(problem.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Problem>, StoreError> {
        Ok(self.problems.write().await.remove(&id))
    }

    async fn find(&self, query: &ProblemQuery) -> Result<Vec<ProblemSummary>, StoreError> {
        let problems = self.problems.read().await;
        Ok(query::select(query, problems.values().cloned()))
    }

    async fn count(&self, query: &ProblemQuery) -> Result<u64, StoreError> {
        Ok(query::count(query, self.problems.read().await.values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, Tag};
    use crate::validate::{prepare_problem, tests::valid_payload, DuplicateTagPolicy};

    fn content() -> ProblemContent {
        prepare_problem(&valid_payload(), DuplicateTagPolicy::default()).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let store = MemoryStore::new();
        let created = store.create(content(), Some("author-1".to_string())).await.unwrap();

        let found = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.problem_creator.as_deref(), Some("author-1"));
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let store = MemoryStore::new();
        let created = store.create(content(), None).await.unwrap();
        let patch = ProblemPatch {
            difficulty: Some(Difficulty::Hard),
            tags: Some(vec![Tag::Graph]),
            ..Default::default()
        };

        let updated = store.update(created.id, &patch).await.unwrap().unwrap();

        assert_eq!(updated.content.difficulty, Difficulty::Hard);
        assert_eq!(updated.content.tags, vec![Tag::Graph]);
        assert_eq!(updated.content.title, created.content.title);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        assert!(store.find_by_id(id).await.unwrap().is_none());
        assert!(store.update(id, &ProblemPatch::default()).await.unwrap().is_none());
        assert!(store.delete(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_document() {
        let store = MemoryStore::new();
        let created = store.create(content(), None).await.unwrap();

        let deleted = store.delete(created.id).await.unwrap();
        assert_eq!(deleted.map(|p| p.id), Some(created.id));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_find_and_count_share_filter() {
        let store = MemoryStore::new();
        for _ in 0..7 {
            store.create(content(), None).await.unwrap();
        }
        let query = ProblemQuery {
            limit: 5,
            page: 2,
            ..Default::default()
        };

        assert_eq!(store.find(&query).await.unwrap().len(), 2);
        assert_eq!(store.count(&query).await.unwrap(), 7);
        assert_eq!(query.total_pages(7), 2);
    }
}
