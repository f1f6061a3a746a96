use crate::config::{DEFAULT_PAGE, DEFAULT_PER_PAGE};
use crate::github_api::UserSearchPage;
use crate::history::push_entry;
use crate::model::User;

/// In-memory recent-query bound; the persisted logs have their own caps.
pub const SEARCH_HISTORY_CAP: usize = 10;

/// User-related slice: the authenticated user, the searched-user list with
/// its pagination cursor, the selected profile, and a bounded in-memory
/// search history.
///
/// Sequence discipline matches [`crate::repo_state::RepoState`]: stale
/// completions are discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct UserState {
    pub current_user: Option<User>,
    pub searched_users: Vec<User>,
    pub selected_user: Option<User>,

    pub loading: bool,
    pub error: Option<String>,
    pub search_history: Vec<String>,

    pub search_page: u32,
    pub search_per_page: u32,
    pub search_has_more: bool,
    pub total_count: u64,

    next_seq: u64,
    last_applied_seq: u64,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            current_user: None,
            searched_users: Vec::new(),
            selected_user: None,
            loading: false,
            error: None,
            search_history: Vec::new(),
            search_page: DEFAULT_PAGE,
            search_per_page: DEFAULT_PER_PAGE,
            search_has_more: false,
            total_count: 0,
            next_seq: 0,
            last_applied_seq: 0,
        }
    }
}

impl UserState {
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

    /// The authenticated-user slot is replaced wholesale on success.
    pub fn apply_current_user(&mut self, seq: u64, outcome: Result<User, String>) {
        if !self.accept(seq) {
            return;
        }
        self.loading = false;

        match outcome {
            Ok(user) => {
                self.current_user = Some(user);
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }

    /// Search completion: page 1 replaces, later pages append. The search
    /// endpoint reports an authoritative total, so `search_has_more`
    /// compares the accumulated count against it.
    pub fn apply_search(
        &mut self,
        seq: u64,
        page: u32,
        per_page: u32,
        outcome: Result<UserSearchPage, String>,
    ) {
        if !self.accept(seq) {
            return;
        }
        self.loading = false;

        match outcome {
            Ok(found) => {
                if page > 1 {
                    self.searched_users.extend(found.items);
                } else {
                    self.searched_users = found.items;
                }
                self.search_page = page;
                self.search_per_page = per_page;
                self.total_count = found.total_count;
                self.search_has_more = (self.searched_users.len() as u64) < found.total_count;
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }

    pub fn apply_selected_user(&mut self, seq: u64, outcome: Result<User, String>) {
        if !self.accept(seq) {
            return;
        }
        self.loading = false;

        match outcome {
            Ok(user) => {
                self.selected_user = Some(user);
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
    }

    pub fn set_selected_user(&mut self, user: Option<User>) {
        self.selected_user = user;
    }

    /// Used when returning from a profile to the result list.
    pub fn clear_selected_user(&mut self) {
        self.selected_user = None;
    }

    pub fn add_to_search_history(&mut self, query: &str) {
        push_entry(&mut self.search_history, query, SEARCH_HISTORY_CAP);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
