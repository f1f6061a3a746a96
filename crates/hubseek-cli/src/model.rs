use serde::{Deserialize, Serialize};
use thiserror::Error;

/// GitHub account as returned by profile and search endpoints. Snapshots are
/// immutable once fetched; a refetch replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub public_gists: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub site_admin: bool,
    #[serde(default, rename = "type")]
    pub account_type: String,
    /// Search relevance; only present on search results.
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub clone_url: String,
    #[serde(default)]
    pub contributors_url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub pushed_at: Option<String>,
    #[serde(default)]
    pub owner: RepoOwner,
}

/// Committer of a repository; ordered by contribution count in API responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub contributions: u64,
}

pub fn normalize_query(raw: &str) -> Result<String, ValidationError> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(query.to_string())
}

pub fn normalize_login(raw: &str, field: &'static str) -> Result<String, ValidationError> {
    let login = raw.trim();
    if login.is_empty() {
        return Err(ValidationError::EmptyLogin(field));
    }
    Ok(login.to_string())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("{0} must not be empty")]
    EmptyLogin(&'static str),
}
