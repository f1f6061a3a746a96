use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{ACCEPT_MEDIA_TYPE, API_TIMEOUT_SECS, API_VERSION, RuntimeConfig};
use crate::model::{Contributor, Repository, User};

pub const CURRENT_USER_PATH: &str = "/user";
pub const SEARCH_USERS_PATH: &str = "/search/users";
pub const SEARCH_REPOS_PATH: &str = "/search/repositories";

const ACCEPT_HEADER: &str = "Accept";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserSearchPage {
    pub items: Vec<User>,
    pub total_count: u64,
    pub incomplete_results: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoSearchPage {
    pub items: Vec<Repository>,
    pub total_count: u64,
    pub incomplete_results: bool,
}

/// Read-only gateway to the GitHub REST API. All operations are idempotent
/// GETs; none mutates remote state.
pub trait GitHubApi {
    fn fetch_current_user(&self) -> Result<User, GitHubApiError>;
    fn fetch_user(&self, username: &str) -> Result<User, GitHubApiError>;
    fn fetch_user_repos(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, GitHubApiError>;
    fn search_users(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<UserSearchPage, GitHubApiError>;
    fn search_repos(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<RepoSearchPage, GitHubApiError>;
    /// Contributor data is enrichment only: any failure degrades to an empty
    /// list instead of surfacing an error.
    fn fetch_repo_contributors(&self, owner: &str, repo: &str) -> Vec<Contributor>;
}

#[derive(Debug, Clone)]
pub struct HttpGitHub {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl HttpGitHub {
    pub fn new(config: &RuntimeConfig) -> Result<Self, GitHubApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()
            .map_err(|error| GitHubApiError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            token: config.token.clone(),
        })
    }

    fn get(&self, path: &str, params: &[(String, String)]) -> Result<(u16, String), GitHubApiError> {
        let mut request = self
            .client
            .get(format!("{}{path}", self.api_base))
            .header(ACCEPT_HEADER, ACCEPT_MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION);

        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|error| GitHubApiError::Transport(error.to_string()))?;

        let status_code = response.status().as_u16();
        let body = response
            .text()
            .map_err(|error| GitHubApiError::Transport(error.to_string()))?;

        Ok((status_code, body))
    }
}

impl GitHubApi for HttpGitHub {
    fn fetch_current_user(&self) -> Result<User, GitHubApiError> {
        let (status_code, body) = self.get(CURRENT_USER_PATH, &[])?;
        parse_user_response(status_code, &body)
    }

    fn fetch_user(&self, username: &str) -> Result<User, GitHubApiError> {
        let (status_code, body) = self.get(&format!("/users/{username}"), &[])?;
        parse_user_response(status_code, &body)
    }

    fn fetch_user_repos(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, GitHubApiError> {
        let params = build_repo_list_query_params(page, per_page);
        let (status_code, body) = self.get(&format!("/users/{username}/repos"), &params)?;
        parse_repo_list_response(status_code, &body)
    }

    fn search_users(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<UserSearchPage, GitHubApiError> {
        let params = build_user_search_query_params(query, page, per_page);
        let (status_code, body) = self.get(SEARCH_USERS_PATH, &params)?;
        parse_user_search_response(status_code, &body)
    }

    fn search_repos(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<RepoSearchPage, GitHubApiError> {
        let params = build_repo_search_query_params(query, page, per_page);
        let (status_code, body) = self.get(SEARCH_REPOS_PATH, &params)?;
        parse_repo_search_response(status_code, &body)
    }

    fn fetch_repo_contributors(&self, owner: &str, repo: &str) -> Vec<Contributor> {
        match self.get(&format!("/repos/{owner}/{repo}/contributors"), &[]) {
            Ok((status_code, body)) => {
                parse_contributors_response(status_code, &body).unwrap_or_default()
            }
            Err(_) => Vec::new(),
        }
    }
}

pub fn build_repo_list_query_params(page: u32, per_page: u32) -> Vec<(String, String)> {
    vec![
        ("page".to_string(), page.to_string()),
        ("per_page".to_string(), per_page.to_string()),
        ("sort".to_string(), "updated".to_string()),
        ("direction".to_string(), "desc".to_string()),
    ]
}

pub fn build_user_search_query_params(query: &str, page: u32, per_page: u32) -> Vec<(String, String)> {
    vec![
        ("q".to_string(), query.to_string()),
        ("page".to_string(), page.to_string()),
        ("per_page".to_string(), per_page.to_string()),
    ]
}

pub fn build_repo_search_query_params(query: &str, page: u32, per_page: u32) -> Vec<(String, String)> {
    vec![
        ("q".to_string(), query.to_string()),
        ("page".to_string(), page.to_string()),
        ("per_page".to_string(), per_page.to_string()),
        ("sort".to_string(), "stars".to_string()),
        ("order".to_string(), "desc".to_string()),
    ]
}

pub fn parse_user_response(status_code: u16, body: &str) -> Result<User, GitHubApiError> {
    let body = check_status(status_code, body)?;
    serde_json::from_str(body).map_err(|error| GitHubApiError::InvalidResponse(error.to_string()))
}

pub fn parse_repo_list_response(
    status_code: u16,
    body: &str,
) -> Result<Vec<Repository>, GitHubApiError> {
    let body = check_status(status_code, body)?;
    serde_json::from_str(body).map_err(|error| GitHubApiError::InvalidResponse(error.to_string()))
}

pub fn parse_user_search_response(
    status_code: u16,
    body: &str,
) -> Result<UserSearchPage, GitHubApiError> {
    let body = check_status(status_code, body)?;
    let payload: SearchPayload<User> = serde_json::from_str(body)
        .map_err(|error| GitHubApiError::InvalidResponse(error.to_string()))?;

    Ok(UserSearchPage {
        items: payload.items,
        total_count: payload.total_count,
        incomplete_results: payload.incomplete_results,
    })
}

pub fn parse_repo_search_response(
    status_code: u16,
    body: &str,
) -> Result<RepoSearchPage, GitHubApiError> {
    let body = check_status(status_code, body)?;
    let payload: SearchPayload<Repository> = serde_json::from_str(body)
        .map_err(|error| GitHubApiError::InvalidResponse(error.to_string()))?;

    Ok(RepoSearchPage {
        items: payload.items,
        total_count: payload.total_count,
        incomplete_results: payload.incomplete_results,
    })
}

pub fn parse_contributors_response(
    status_code: u16,
    body: &str,
) -> Result<Vec<Contributor>, GitHubApiError> {
    let body = check_status(status_code, body)?;
    serde_json::from_str(body).map_err(|error| GitHubApiError::InvalidResponse(error.to_string()))
}

fn check_status(status_code: u16, body: &str) -> Result<&str, GitHubApiError> {
    if !(200..=299).contains(&status_code) {
        let message = extract_error_message(body).unwrap_or_else(|| format!("HTTP {status_code}"));
        return Err(GitHubApiError::Http {
            status: status_code,
            message,
        });
    }
    Ok(body)
}

fn extract_error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;

    first_non_empty_string(&[
        value.get("message").and_then(serde_json::Value::as_str),
        value
            .get("errors")
            .and_then(serde_json::Value::as_array)
            .and_then(|errors| errors.first())
            .and_then(|error| error.get("message"))
            .and_then(serde_json::Value::as_str),
        value.get("error").and_then(serde_json::Value::as_str),
    ])
}

fn first_non_empty_string(candidates: &[Option<&str>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitHubApiError {
    #[error("github api request failed: {0}")]
    Transport(String),
    #[error("github api error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("invalid github api response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct SearchPayload<T> {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    incomplete_results: bool,
    #[serde(default)]
    items: Vec<T>,
}
