// Catalog listing: filter, sort and page problem documents.
// Stores load candidate documents and hand them to `select`, so every backend
// answers a query the same way.

use crate::error::ValidationError;
use crate::types::{Problem, ProblemSummary, Tag};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

pub const DEFAULT_LIMIT: u32 = 5;
pub const MAX_LIMIT: u32 = 100;
pub const MAX_SEARCH_CHARS: usize = 200;
pub const MAX_FILTER_TAGS: usize = 5;

/// Raw query-string parameters. Parsed leniently: junk falls back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub tags: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    DifficultyAsc,
    DifficultyDesc,
}

impl SortOrder {
    fn from_param(value: &str) -> Self {
        match value {
            "oldest" => SortOrder::Oldest,
            "difficulty_asc" => SortOrder::DifficultyAsc,
            "difficulty_desc" => SortOrder::DifficultyDesc,
            _ => SortOrder::Newest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemQuery {
    /// Case-insensitive title substring, or an exact problem id.
    pub search: Option<String>,
    /// A problem matches when it carries any of these.
    pub tags: Vec<Tag>,
    pub sort: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl Default for ProblemQuery {
    fn default() -> Self {
        Self {
            search: None,
            tags: Vec::new(),
            sort: SortOrder::default(),
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ProblemQuery {
    pub fn from_params(params: &ListParams) -> Result<Self, ValidationError> {
        let page = params
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);

        let limit = params
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<u32>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        let search = params
            .search
            .as_deref()
            .map(|s| s.chars().take(MAX_SEARCH_CHARS).collect::<String>())
            .filter(|s| !s.is_empty());

        let mut tags = Vec::new();
        if let Some(raw) = params.tags.as_deref() {
            let names = raw
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .take(MAX_FILTER_TAGS);
            for name in names {
                let tag = Tag::from_name(name)
                    .ok_or_else(|| ValidationError::malformed(format!("invalid tag: {}", name)))?;
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }

        let sort = params
            .sort
            .as_deref()
            .map(SortOrder::from_param)
            .unwrap_or_default();

        Ok(Self {
            search,
            tags,
            sort,
            page,
            limit,
        })
    }

    pub fn matches(&self, problem: &Problem) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let by_title = problem.content.title.to_lowercase().contains(&needle);
            let by_id = problem.id.to_string() == search.trim().to_lowercase();
            if !by_title && !by_id {
                return false;
            }
        }

        self.tags.is_empty() || self.tags.iter().any(|t| problem.content.tags.contains(t))
    }

    pub fn skip(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }

    pub fn total_pages(&self, total_count: u64) -> u64 {
        let limit = u64::from(self.limit.max(1));
        total_count.div_ceil(limit).max(1)
    }
}

/// Apply `query` to a set of candidate documents and return the requested page.
pub fn select(query: &ProblemQuery, problems: impl IntoIterator<Item = Problem>) -> Vec<ProblemSummary> {
    let mut matching: Vec<Problem> = problems.into_iter().filter(|p| query.matches(p)).collect();

    match query.sort {
        SortOrder::Newest => matching.sort_by_key(|p| Reverse(p.created_at)),
        SortOrder::Oldest => matching.sort_by_key(|p| p.created_at),
        SortOrder::DifficultyAsc => {
            matching.sort_by_key(|p| (p.content.difficulty.rank(), Reverse(p.created_at)))
        }
        SortOrder::DifficultyDesc => {
            matching.sort_by_key(|p| (Reverse(p.content.difficulty.rank()), Reverse(p.created_at)))
        }
    }

    matching
        .iter()
        .skip(query.skip())
        .take(query.limit as usize)
        .map(Problem::summary)
        .collect()
}

/// Number of documents in `problems` matching `query`, ignoring paging.
pub fn count<'a>(query: &ProblemQuery, problems: impl IntoIterator<Item = &'a Problem>) -> u64 {
    problems.into_iter().filter(|p| query.matches(p)).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, ProblemContent};
    use chrono::{Duration, Utc};

    fn problem(title: &str, difficulty: Difficulty, tags: Vec<Tag>, age_minutes: i64) -> Problem {
        let mut problem = Problem::new(
            ProblemContent {
                title: title.to_string(),
                description: "Some description long enough".to_string(),
                difficulty,
                tags,
                constraints: vec!["n <= 10".to_string()],
                visible_test_cases: vec![],
                hidden_test_cases: vec![],
                boilerplate_code: vec![],
                reference_solution: vec![],
            },
            None,
        );
        problem.created_at = Utc::now() - Duration::minutes(age_minutes);
        problem
    }

    fn catalog() -> Vec<Problem> {
        vec![
            problem("Two Sum", Difficulty::Easy, vec![Tag::Array], 30),
            problem("Longest Path", Difficulty::Hard, vec![Tag::Graph, Tag::Dp], 20),
            problem("Balanced Brackets", Difficulty::Medium, vec![Tag::Stack, Tag::String], 10),
            problem("Sum of Subarray", Difficulty::Medium, vec![Tag::Array, Tag::Dp], 0),
        ]
    }

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut params = ListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => params.page = value,
                "limit" => params.limit = value,
                "search" => params.search = value,
                "tags" => params.tags = value,
                "sort" => params.sort = value,
                _ => unreachable!(),
            }
        }
        params
    }

    #[test]
    fn test_defaults_for_junk_params() {
        let query = ProblemQuery::from_params(&params(&[("page", "abc"), ("limit", "0")])).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.sort, SortOrder::Newest);
    }

    #[test]
    fn test_limit_is_capped() {
        let query = ProblemQuery::from_params(&params(&[("limit", "5000")])).unwrap();
        assert_eq!(query.limit, MAX_LIMIT);
    }

    #[test]
    fn test_search_is_truncated() {
        let long = "x".repeat(500);
        let query = ProblemQuery::from_params(&params(&[("search", long.as_str())])).unwrap();
        assert_eq!(query.search.unwrap().len(), MAX_SEARCH_CHARS);
    }

    #[test]
    fn test_tag_filter_validated_and_capped() {
        let err = ProblemQuery::from_params(&params(&[("tags", "Array, Heap")])).unwrap_err();
        assert_eq!(err, ValidationError::malformed("invalid tag: Heap"));

        let query = ProblemQuery::from_params(&params(&[(
            "tags",
            "Array,Stack,Queue,Tree,Graph,Math",
        )]))
        .unwrap();
        assert_eq!(query.tags.len(), MAX_FILTER_TAGS);
        assert!(!query.tags.contains(&Tag::Math));
    }

    #[test]
    fn test_search_matches_title_case_insensitively() {
        let query = ProblemQuery::from_params(&params(&[("search", "sum")])).unwrap();
        let titles: Vec<String> = select(&query, catalog()).into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Sum of Subarray", "Two Sum"]);
    }

    #[test]
    fn test_search_matches_exact_id() {
        let problems = catalog();
        let id = problems[1].id.to_string();
        let query = ProblemQuery::from_params(&params(&[("search", id.as_str())])).unwrap();

        let found = select(&query, problems);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Longest Path");
    }

    #[test]
    fn test_tags_match_any() {
        let query = ProblemQuery::from_params(&params(&[("tags", "Stack,Graph")])).unwrap();
        assert_eq!(count(&query, &catalog()), 2);
    }

    #[test]
    fn test_sort_by_difficulty() {
        let query = ProblemQuery::from_params(&params(&[("sort", "difficulty_asc"), ("limit", "10")])).unwrap();
        let titles: Vec<String> = select(&query, catalog()).into_iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec!["Two Sum", "Sum of Subarray", "Balanced Brackets", "Longest Path"]
        );

        let query = ProblemQuery::from_params(&params(&[("sort", "difficulty_desc")])).unwrap();
        let first = select(&query, catalog()).remove(0);
        assert_eq!(first.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_sort_oldest_and_paging() {
        let query = ProblemQuery::from_params(&params(&[("sort", "oldest"), ("limit", "3"), ("page", "2")])).unwrap();
        let page = select(&query, catalog());
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Sum of Subarray");
    }

    #[test]
    fn test_total_pages() {
        let query = ProblemQuery { limit: 5, ..Default::default() };
        assert_eq!(query.total_pages(0), 1);
        assert_eq!(query.total_pages(5), 1);
        assert_eq!(query.total_pages(6), 2);
        assert_eq!(query.total_pages(101), 21);
    }
}
