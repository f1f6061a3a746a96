//! Orchestration over an injected gateway and a mutable slice.
//!
//! Each operation validates its input before dispatch, issues a sequence
//! number, invokes the gateway, and applies the completion to the slice.
//! Gateway failures are recorded on the slice *and* returned, so callers can
//! branch on the classification while the state keeps the message for a
//! manual retry affordance.

use crate::error::AppError;
use crate::github_api::GitHubApi;
use crate::model::{normalize_login, normalize_query};
use crate::repo_state::RepoState;
use crate::user_state::UserState;

const CURRENT_USER_FALLBACK: &str = "failed to fetch current user";
const FETCH_USER_FALLBACK: &str = "user not found";
const USER_REPOS_FALLBACK: &str = "failed to fetch repositories";
const SEARCH_REPOS_FALLBACK: &str = "failed to search repositories";
const SEARCH_USERS_FALLBACK: &str = "failed to search users";

pub fn fetch_current_user<G: GitHubApi>(
    state: &mut UserState,
    gateway: &G,
) -> Result<(), AppError> {
    let seq = state.begin_request();
    match gateway.fetch_current_user() {
        Ok(user) => {
            state.apply_current_user(seq, Ok(user));
            Ok(())
        }
        Err(error) => {
            let app = AppError::from_github_api(error, CURRENT_USER_FALLBACK);
            state.apply_current_user(seq, Err(app.message.clone()));
            Err(app)
        }
    }
}

pub fn fetch_user<G: GitHubApi>(
    state: &mut UserState,
    gateway: &G,
    username: &str,
) -> Result<(), AppError> {
    let username = normalize_login(username, "login")?;

    let seq = state.begin_request();
    match gateway.fetch_user(&username) {
        Ok(user) => {
            state.apply_selected_user(seq, Ok(user));
            Ok(())
        }
        Err(error) => {
            let app = AppError::from_github_api(error, FETCH_USER_FALLBACK);
            state.apply_selected_user(seq, Err(app.message.clone()));
            Err(app)
        }
    }
}

pub fn search_users<G: GitHubApi>(
    state: &mut UserState,
    gateway: &G,
    query: &str,
    page: u32,
    per_page: u32,
) -> Result<(), AppError> {
    let query = normalize_query(query)?;
    state.add_to_search_history(&query);

    let seq = state.begin_request();
    match gateway.search_users(&query, page, per_page) {
        Ok(found) => {
            state.apply_search(seq, page, per_page, Ok(found));
            Ok(())
        }
        Err(error) => {
            let app = AppError::from_github_api(error, SEARCH_USERS_FALLBACK);
            state.apply_search(seq, page, per_page, Err(app.message.clone()));
            Err(app)
        }
    }
}

pub fn fetch_user_repos<G: GitHubApi>(
    state: &mut RepoState,
    gateway: &G,
    username: &str,
    page: u32,
    per_page: u32,
) -> Result<(), AppError> {
    let username = normalize_login(username, "owner")?;

    let seq = state.begin_request();
    match gateway.fetch_user_repos(&username, page, per_page) {
        Ok(repos) => {
            state.apply_user_repos(seq, page, per_page, Ok(repos));
            Ok(())
        }
        Err(error) => {
            let app = AppError::from_github_api(error, USER_REPOS_FALLBACK);
            state.apply_user_repos(seq, page, per_page, Err(app.message.clone()));
            Err(app)
        }
    }
}

pub fn search_repos<G: GitHubApi>(
    state: &mut RepoState,
    gateway: &G,
    query: &str,
    page: u32,
    per_page: u32,
) -> Result<(), AppError> {
    let query = normalize_query(query)?;

    let seq = state.begin_request();
    match gateway.search_repos(&query, page, per_page) {
        Ok(found) => {
            state.apply_search(seq, page, per_page, &query, Ok(found));
            Ok(())
        }
        Err(error) => {
            let app = AppError::from_github_api(error, SEARCH_REPOS_FALLBACK);
            state.apply_search(seq, page, per_page, &query, Err(app.message.clone()));
            Err(app)
        }
    }
}

/// Best-effort by requirement: the gateway already degrades failures to an
/// empty list, so this never errors.
pub fn fetch_repo_contributors<G: GitHubApi>(
    state: &mut RepoState,
    gateway: &G,
    owner: &str,
    repo: &str,
    repo_id: u64,
) {
    let contributors = gateway.fetch_repo_contributors(owner, repo);
    state.apply_contributors(repo_id, contributors);
}

/// Resets the browse list before fetching so results from a previous owner
/// are never shown against the new one, then accumulates pages through the
/// append path until `pages` are fetched or the slice reports the end.
pub fn browse_owner_repos<G: GitHubApi>(
    state: &mut RepoState,
    gateway: &G,
    username: &str,
    per_page: u32,
    pages: u32,
) -> Result<(), AppError> {
    state.reset_repositories();
    fetch_user_repos_pages(state, gateway, username, 1, per_page, pages)
}

pub fn fetch_user_repos_pages<G: GitHubApi>(
    state: &mut RepoState,
    gateway: &G,
    username: &str,
    first_page: u32,
    per_page: u32,
    pages: u32,
) -> Result<(), AppError> {
    for offset in 0..pages.max(1) {
        fetch_user_repos(state, gateway, username, first_page + offset, per_page)?;
        if !state.has_more {
            break;
        }
    }
    Ok(())
}

pub fn search_repos_pages<G: GitHubApi>(
    state: &mut RepoState,
    gateway: &G,
    query: &str,
    first_page: u32,
    per_page: u32,
    pages: u32,
) -> Result<(), AppError> {
    for offset in 0..pages.max(1) {
        search_repos(state, gateway, query, first_page + offset, per_page)?;
        if !state.search_has_more {
            break;
        }
    }
    Ok(())
}

pub fn search_users_pages<G: GitHubApi>(
    state: &mut UserState,
    gateway: &G,
    query: &str,
    first_page: u32,
    per_page: u32,
    pages: u32,
) -> Result<(), AppError> {
    for offset in 0..pages.max(1) {
        search_users(state, gateway, query, first_page + offset, per_page)?;
        if !state.search_has_more {
            break;
        }
    }
    Ok(())
}
