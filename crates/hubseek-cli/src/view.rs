use chrono::DateTime;

use crate::model::Repository;
use crate::repo_state::RepoState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    Stars,
    Name,
    #[default]
    Updated,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stars => "stars",
            Self::Name => "name",
            Self::Updated => "updated",
        }
    }

    /// Unrecognized values fall back to recency ordering.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stars" => Self::Stars,
            "name" => Self::Name,
            _ => Self::Updated,
        }
    }
}

pub fn matches_filter(repo: &Repository, filter: &str) -> bool {
    let filter = filter.trim();
    if filter.is_empty() {
        return true;
    }

    let needle = filter.to_lowercase();
    let contains = |value: Option<&str>| {
        value.is_some_and(|value| value.to_lowercase().contains(&needle))
    };

    contains(repo.language.as_deref())
        || repo.name.to_lowercase().contains(&needle)
        || contains(repo.description.as_deref())
}

pub fn filter_repositories(repos: &[Repository], filter: &str) -> Vec<Repository> {
    repos
        .iter()
        .filter(|repo| matches_filter(repo, filter))
        .cloned()
        .collect()
}

/// Stable: equal keys keep their relative (API response) order.
pub fn sort_repositories(repos: &mut [Repository], sort_by: SortKey) {
    match sort_by {
        SortKey::Stars => repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count)),
        SortKey::Name => repos.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SortKey::Updated => repos.sort_by(|a, b| updated_sort_key(b).cmp(&updated_sort_key(a))),
    }
}

/// Missing or unparseable timestamps sort as the epoch.
pub fn updated_sort_key(repo: &Repository) -> i64 {
    DateTime::parse_from_rfc3339(&repo.updated_at)
        .map(|value| value.timestamp())
        .unwrap_or(0)
}

/// Search results take precedence over the browse list once present.
pub fn active_list(state: &RepoState) -> &[Repository] {
    if state.search_results.is_empty() {
        &state.repositories
    } else {
        &state.search_results
    }
}

/// Recomputed from current state on every render; stored entities are never
/// mutated.
pub fn derive_repo_view(state: &RepoState) -> Vec<Repository> {
    let mut repos = filter_repositories(active_list(state), &state.filter_by);
    sort_repositories(&mut repos, state.sort_by);
    repos
}
