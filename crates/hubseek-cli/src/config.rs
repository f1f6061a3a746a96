use std::collections::HashMap;
use std::path::PathBuf;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
pub const ACCEPT_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
pub const API_VERSION: &str = "2022-11-28";

pub const API_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 30;
const MIN_PER_PAGE: u32 = 1;
const MAX_PER_PAGE: u32 = 100;

pub const USER_HISTORY_CAP: usize = 30;
pub const REPO_HISTORY_CAP: usize = 10;

pub const API_BASE_ENV: &str = "HUBSEEK_API_BASE";
pub const DATA_DIR_ENV: &str = "HUBSEEK_DATA_DIR";
pub const TOKEN_ENV: &str = "HUBSEEK_TOKEN";
const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
const GH_TOKEN_ENV: &str = "GH_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub data_dir: PathBuf,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env_map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        Self {
            api_base: resolve_api_base(&env_map),
            token: resolve_token(&env_map),
            data_dir: resolve_data_dir(&env_map),
        }
    }

    pub fn user_history_file(&self) -> PathBuf {
        self.data_dir.join("user-search-history.json")
    }

    pub fn repo_history_file(&self) -> PathBuf {
        self.data_dir.join("repo-search-history.json")
    }
}

fn non_empty(env_map: &HashMap<String, String>, key: &str) -> Option<String> {
    env_map
        .get(key)
        .map(String::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn resolve_api_base(env_map: &HashMap<String, String>) -> String {
    non_empty(env_map, API_BASE_ENV)
        .map(|value| value.trim_end_matches('/').to_string())
        .unwrap_or_else(|| GITHUB_API_BASE.to_string())
}

fn resolve_token(env_map: &HashMap<String, String>) -> Option<String> {
    non_empty(env_map, TOKEN_ENV)
        .or_else(|| non_empty(env_map, GITHUB_TOKEN_ENV))
        .or_else(|| non_empty(env_map, GH_TOKEN_ENV))
}

fn resolve_data_dir(env_map: &HashMap<String, String>) -> PathBuf {
    non_empty(env_map, DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("hubseek-cli"))
}

pub fn clamp_per_page(raw: u32) -> u32 {
    raw.clamp(MIN_PER_PAGE, MAX_PER_PAGE)
}
