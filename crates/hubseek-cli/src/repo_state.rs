use std::collections::HashMap;

use crate::config::{DEFAULT_PAGE, DEFAULT_PER_PAGE};
use crate::github_api::RepoSearchPage;
use crate::model::{Contributor, Repository};
use crate::view::SortKey;

/// Repository-related slice: an owner-scoped browse list and a query-scoped
/// search list, each with its own pagination cursor, plus a contributors
/// map and shared view preferences.
///
/// Completions carry a slice-scoped sequence number issued by
/// [`RepoState::begin_request`]; a completion older than the last applied
/// one is discarded wholesale, success and failure alike.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoState {
    pub repositories: Vec<Repository>,
    pub page: u32,
    pub per_page: u32,
    pub has_more: bool,

    pub search_results: Vec<Repository>,
    pub search_page: u32,
    pub search_per_page: u32,
    pub search_has_more: bool,
    pub search_query: String,
    pub total_count: u64,

    pub contributors: HashMap<u64, Vec<Contributor>>,

    pub loading: bool,
    pub error: Option<String>,
    pub sort_by: SortKey,
    pub filter_by: String,

    next_seq: u64,
    last_applied_seq: u64,
}

impl Default for RepoState {
    fn default() -> Self {
        Self {
            repositories: Vec::new(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            has_more: true,
            search_results: Vec::new(),
            search_page: DEFAULT_PAGE,
            search_per_page: DEFAULT_PER_PAGE,
            search_has_more: false,
            search_query: String::new(),
            total_count: 0,
            contributors: HashMap::new(),
            loading: false,
            error: None,
            sort_by: SortKey::default(),
            filter_by: String::new(),
            next_seq: 0,
            last_applied_seq: 0,
        }
    }
}

impl RepoState {
    /// Marks the slice loading, clears any previous error, and issues the
    /// sequence number the matching completion must carry.
    pub fn begin_request(&mut self) -> u64 {
        self.next_seq += 1;
        self.loading = true;
        self.error = None;
        self.next_seq
    }

    fn accept(&mut self, seq: u64) -> bool {
        if seq < self.last_applied_seq {
            return false;
        }
        self.last_applied_seq = seq;
        true
    }

    /// Browse-list completion: page 1 replaces, later pages append. The
    /// listing endpoint reports no total, so `has_more` is the page-size
    /// heuristic. Failures keep already-accumulated pages intact.
    pub fn apply_user_repos(
        &mut self,
        seq: u64,
        page: u32,
        per_page: u32,
        outcome: Result<Vec<Repository>, String>,
    ) {
        if !self.accept(seq) {
            return;
        }
        self.loading = false;

        match outcome {
            Ok(repos) => {
                self.has_more = repos.len() == per_page as usize;
                if page > 1 {
                    self.repositories.extend(repos);
                } else {
                    self.repositories = repos;
                }
                self.page = page;
                self.per_page = per_page;
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }

    /// Search-list completion. `search_has_more` compares the accumulated
    /// count against the server-reported total.
    pub fn apply_search(
        &mut self,
        seq: u64,
        page: u32,
        per_page: u32,
        query: &str,
        outcome: Result<RepoSearchPage, String>,
    ) {
        if !self.accept(seq) {
            return;
        }
        self.loading = false;

        match outcome {
            Ok(found) => {
                if page > 1 {
                    self.search_results.extend(found.items);
                } else {
                    self.search_results = found.items;
                }
                self.search_page = page;
                self.search_per_page = per_page;
                self.search_query = query.to_string();
                self.total_count = found.total_count;
                self.search_has_more = (self.search_results.len() as u64) < found.total_count;
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }

    /// Keyed overwrite; contributor fetches never fail at this level.
    pub fn apply_contributors(&mut self, repo_id: u64, contributors: Vec<Contributor>) {
        self.contributors.insert(repo_id, contributors);
    }

    /// Required before refetching under a different owner so stale results
    /// are never shown against the new identity.
    pub fn reset_repositories(&mut self) {
        self.repositories = Vec::new();
        self.page = DEFAULT_PAGE;
        self.per_page = DEFAULT_PER_PAGE;
        self.has_more = true;
    }

    pub fn reset_search(&mut self) {
        self.search_results = Vec::new();
        self.search_page = DEFAULT_PAGE;
        self.search_per_page = DEFAULT_PER_PAGE;
        self.search_has_more = false;
        self.search_query = String::new();
        self.total_count = 0;
        self.loading = false;
        self.error = None;
    }

    pub fn set_sort_by(&mut self, sort_by: SortKey) {
        self.sort_by = sort_by;
    }

    pub fn set_filter_by(&mut self, filter_by: &str) {
        self.filter_by = filter_by.to_string();
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    pub fn set_per_page(&mut self, per_page: u32) {
        self.per_page = per_page;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(id: u64, name: &str) -> Repository {
        Repository {
            id,
            name: name.to_string(),
            full_name: format!("octocat/{name}"),
            ..Repository::default()
        }
    }

    fn page_of(start: u64, count: usize) -> Vec<Repository> {
        (0..count as u64)
            .map(|n| repo(start + n, &format!("repo-{}", start + n)))
            .collect()
    }

    fn search_page(items: Vec<Repository>, total_count: u64) -> RepoSearchPage {
        RepoSearchPage {
            items,
            total_count,
            incomplete_results: false,
        }
    }

    #[test]
    fn repo_state_begin_request_sets_loading_and_clears_error() {
        let mut state = RepoState::default();
        state.error = Some("previous failure".to_string());

        let seq = state.begin_request();
        assert_eq!(seq, 1);
        assert!(state.loading);
        assert_eq!(state.error, None);
    }

    #[test]
    fn repo_state_first_page_replaces_browse_list() {
        let mut state = RepoState::default();
        state.repositories = page_of(100, 3);

        let seq = state.begin_request();
        state.apply_user_repos(seq, 1, 30, Ok(page_of(0, 2)));

        assert_eq!(state.repositories.len(), 2);
        assert_eq!(state.page, 1);
        assert!(!state.has_more, "2 of 30 requested means no further page");
        assert!(!state.loading);
    }

    #[test]
    fn repo_state_pagination_appends_in_order() {
        let mut state = RepoState::default();

        let seq = state.begin_request();
        state.apply_user_repos(seq, 1, 30, Ok(page_of(0, 30)));
        assert!(state.has_more, "a full page implies another may exist");

        let seq = state.begin_request();
        state.apply_user_repos(seq, 2, 30, Ok(page_of(30, 12)));

        assert_eq!(state.repositories.len(), 42);
        assert_eq!(state.repositories[0].id, 0);
        assert_eq!(state.repositories[30].id, 30);
        assert_eq!(state.page, 2);
        assert!(!state.has_more);
    }

    #[test]
    fn repo_state_failed_page_leaves_accumulated_results() {
        let mut state = RepoState::default();

        let seq = state.begin_request();
        state.apply_user_repos(seq, 1, 30, Ok(page_of(0, 30)));

        let seq = state.begin_request();
        state.apply_user_repos(seq, 2, 30, Err("boom".to_string()));

        assert_eq!(state.repositories.len(), 30, "no rollback on failure");
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert!(!state.loading);
    }

    #[test]
    fn repo_state_search_has_more_tracks_total_count() {
        let mut state = RepoState::default();

        let seq = state.begin_request();
        state.apply_search(seq, 1, 30, "rust", Ok(search_page(page_of(0, 30), 45)));
        assert!(state.search_has_more);
        assert_eq!(state.search_query, "rust");
        assert_eq!(state.total_count, 45);

        let seq = state.begin_request();
        state.apply_search(seq, 2, 30, "rust", Ok(search_page(page_of(30, 15), 45)));
        assert_eq!(state.search_results.len(), 45);
        assert!(!state.search_has_more);
    }

    #[test]
    fn repo_state_search_and_browse_lists_are_independent() {
        let mut state = RepoState::default();

        let seq = state.begin_request();
        state.apply_user_repos(seq, 1, 30, Ok(page_of(0, 5)));
        let seq = state.begin_request();
        state.apply_search(seq, 1, 30, "rust", Ok(search_page(page_of(100, 2), 2)));

        assert_eq!(state.repositories.len(), 5);
        assert_eq!(state.search_results.len(), 2);

        state.reset_search();
        assert_eq!(state.repositories.len(), 5, "reset_search leaves browse list");
        assert!(state.search_results.is_empty());
    }

    #[test]
    fn repo_state_stale_completion_is_discarded() {
        let mut state = RepoState::default();

        let slow_seq = state.begin_request();
        let fast_seq = state.begin_request();

        state.apply_user_repos(fast_seq, 2, 30, Ok(page_of(30, 10)));
        let after_fast = state.repositories.clone();

        // The slower page-1 response resolves after the page-2 one.
        state.apply_user_repos(slow_seq, 1, 30, Ok(page_of(0, 30)));

        assert_eq!(state.repositories, after_fast, "older completion discarded");
        assert_eq!(state.page, 2);
    }

    #[test]
    fn repo_state_stale_failure_is_discarded_too() {
        let mut state = RepoState::default();

        let slow_seq = state.begin_request();
        let fast_seq = state.begin_request();

        state.apply_user_repos(fast_seq, 1, 30, Ok(page_of(0, 3)));
        state.apply_user_repos(slow_seq, 1, 30, Err("timeout".to_string()));

        assert_eq!(state.error, None, "stale failure must not clobber state");
        assert_eq!(state.repositories.len(), 3);
    }

    #[test]
    fn repo_state_reset_repositories_restores_initial_cursor() {
        let mut state = RepoState::default();
        let seq = state.begin_request();
        state.apply_user_repos(seq, 3, 10, Ok(page_of(0, 4)));

        state.reset_repositories();

        assert!(state.repositories.is_empty());
        assert_eq!(state.page, DEFAULT_PAGE);
        assert_eq!(state.per_page, DEFAULT_PER_PAGE);
        assert!(state.has_more);
    }

    #[test]
    fn repo_state_reset_search_clears_query_and_error() {
        let mut state = RepoState::default();
        let seq = state.begin_request();
        state.apply_search(seq, 1, 30, "rust", Err("boom".to_string()));

        state.reset_search();

        assert_eq!(state.search_query, "");
        assert_eq!(state.total_count, 0);
        assert_eq!(state.error, None);
        assert!(!state.loading);
    }

    #[test]
    fn repo_state_contributors_overwrite_by_repo_id() {
        let mut state = RepoState::default();
        let first = vec![Contributor {
            login: "alice".to_string(),
            id: 1,
            contributions: 12,
            ..Contributor::default()
        }];
        let second = vec![Contributor {
            login: "bob".to_string(),
            id: 2,
            contributions: 4,
            ..Contributor::default()
        }];

        state.apply_contributors(42, first);
        state.apply_contributors(42, second);

        let stored = state.contributors.get(&42).expect("entry exists");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].login, "bob");
    }

    #[test]
    fn repo_state_view_preference_setters() {
        let mut state = RepoState::default();

        state.set_sort_by(SortKey::Stars);
        state.set_filter_by("rust");
        state.set_page(4);
        state.set_per_page(50);

        assert_eq!(state.sort_by, SortKey::Stars);
        assert_eq!(state.filter_by, "rust");
        assert_eq!(state.page, 4);
        assert_eq!(state.per_page, 50);
    }
}
