use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use hubseek_cli::{
    config::{
        DEFAULT_PAGE, DEFAULT_PER_PAGE, REPO_HISTORY_CAP, RuntimeConfig, USER_HISTORY_CAP,
        clamp_per_page,
    },
    error::AppError,
    github_api::{GitHubApi, HttpGitHub},
    history::SearchHistory,
    model::{Contributor, Repository, User, normalize_login, normalize_query},
    repo_state::RepoState,
    service,
    user_state::UserState,
    view::{self, SortKey},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "GitHub user and repository search CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search GitHub users.
    SearchUsers {
        /// Search query text.
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,
        /// Number of successive pages to accumulate.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Search repositories, with optional filter and sort over the results.
    SearchRepos {
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Sort key: stars, name, or updated.
        #[arg(long, default_value = "updated")]
        sort: String,
        /// Case-insensitive substring match on name, language, description.
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// Show a user profile by login.
    User {
        #[arg(long)]
        login: String,
    },
    /// List a user's repositories, newest activity first.
    Repos {
        #[arg(long)]
        owner: String,
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,
        #[arg(long, default_value_t = 1)]
        pages: u32,
        #[arg(long, default_value = "updated")]
        sort: String,
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// List contributors for a repository (best-effort).
    Contributors {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        repo: String,
    },
    /// Show the authenticated user.
    Whoami,
    /// Print the persisted search history for a scope.
    History {
        #[arg(long, value_enum, default_value_t = HistoryScope::Users)]
        scope: HistoryScope,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum HistoryScope {
    Users,
    Repos,
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
        }
        Err(error) => {
            eprintln!("error: {}", error.message);
            std::process::exit(error.exit_code());
        }
    }
}

fn run(cli: Cli) -> Result<String, AppError> {
    let config = RuntimeConfig::from_env();
    let gateway = HttpGitHub::new(&config).map_err(|error| AppError::runtime(error.to_string()))?;
    run_with(cli, &config, &gateway)
}

fn run_with<G: GitHubApi>(cli: Cli, config: &RuntimeConfig, gateway: &G) -> Result<String, AppError> {
    match cli.command {
        Commands::SearchUsers {
            query,
            page,
            per_page,
            pages,
        } => {
            let query = normalize_query(&query)?;
            let per_page = clamp_per_page(per_page);
            record_history(&config.user_history_file(), USER_HISTORY_CAP, &query);

            let mut state = UserState::default();
            service::search_users_pages(&mut state, gateway, &query, page, per_page, pages)?;

            to_json(&UserSearchOutput {
                query: &query,
                page: state.search_page,
                per_page: state.search_per_page,
                total_count: state.total_count,
                has_more: state.search_has_more,
                count: state.searched_users.len(),
                items: &state.searched_users,
            })
        }
        Commands::SearchRepos {
            query,
            page,
            per_page,
            pages,
            sort,
            filter,
        } => {
            let query = normalize_query(&query)?;
            let per_page = clamp_per_page(per_page);
            record_history(&config.repo_history_file(), REPO_HISTORY_CAP, &query);

            let mut state = RepoState::default();
            state.set_sort_by(SortKey::parse(&sort));
            state.set_filter_by(&filter);
            service::search_repos_pages(&mut state, gateway, &query, page, per_page, pages)?;

            let items = view::derive_repo_view(&state);
            to_json(&RepoSearchOutput {
                query: &query,
                page: state.search_page,
                per_page: state.search_per_page,
                total_count: state.total_count,
                has_more: state.search_has_more,
                sort: state.sort_by.as_str(),
                filter: &state.filter_by,
                count: items.len(),
                items: &items,
            })
        }
        Commands::User { login } => {
            let mut state = UserState::default();
            service::fetch_user(&mut state, gateway, &login)?;

            let user = state
                .selected_user
                .as_ref()
                .ok_or_else(|| AppError::not_found("user not found"))?;
            to_json(user)
        }
        Commands::Repos {
            owner,
            page,
            per_page,
            pages,
            sort,
            filter,
        } => {
            let per_page = clamp_per_page(per_page);

            let mut state = RepoState::default();
            state.set_sort_by(SortKey::parse(&sort));
            state.set_filter_by(&filter);
            if page > 1 {
                service::fetch_user_repos_pages(&mut state, gateway, &owner, page, per_page, pages)?;
            } else {
                service::browse_owner_repos(&mut state, gateway, &owner, per_page, pages)?;
            }

            let items = view::derive_repo_view(&state);
            to_json(&RepoListOutput {
                owner: owner.trim(),
                page: state.page,
                per_page: state.per_page,
                has_more: state.has_more,
                sort: state.sort_by.as_str(),
                filter: &state.filter_by,
                count: items.len(),
                items: &items,
            })
        }
        Commands::Contributors { owner, repo } => {
            let owner = normalize_login(&owner, "owner")?;
            let repo = normalize_login(&repo, "repo")?;

            let items = gateway.fetch_repo_contributors(&owner, &repo);
            to_json(&ContributorsOutput {
                owner: &owner,
                repo: &repo,
                count: items.len(),
                items: &items,
            })
        }
        Commands::Whoami => {
            let mut state = UserState::default();
            service::fetch_current_user(&mut state, gateway)?;

            let user = state
                .current_user
                .as_ref()
                .ok_or_else(|| AppError::runtime("missing authenticated user in response"))?;
            to_json(user)
        }
        Commands::History { scope } => {
            let (path, cap, name) = match scope {
                HistoryScope::Users => (config.user_history_file(), USER_HISTORY_CAP, "users"),
                HistoryScope::Repos => (config.repo_history_file(), REPO_HISTORY_CAP, "repos"),
            };

            let history = SearchHistory::load(&path, cap);
            to_json(&HistoryOutput {
                scope: name,
                loaded: history.loaded,
                entries: &history.entries,
            })
        }
    }
}

/// Persistence is best-effort: a read-only data dir must not fail the search.
fn record_history(path: &Path, cap: usize, query: &str) {
    let mut history = SearchHistory::load(path, cap);
    history.record(query);
    if let Err(error) = history.persist() {
        eprintln!("warning: {error}");
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value)
        .map_err(|error| AppError::runtime(format!("failed to serialize output: {error}")))
}

#[derive(Debug, Serialize)]
struct UserSearchOutput<'a> {
    query: &'a str,
    page: u32,
    per_page: u32,
    total_count: u64,
    has_more: bool,
    count: usize,
    items: &'a [User],
}

#[derive(Debug, Serialize)]
struct RepoSearchOutput<'a> {
    query: &'a str,
    page: u32,
    per_page: u32,
    total_count: u64,
    has_more: bool,
    sort: &'static str,
    filter: &'a str,
    count: usize,
    items: &'a [Repository],
}

#[derive(Debug, Serialize)]
struct RepoListOutput<'a> {
    owner: &'a str,
    page: u32,
    per_page: u32,
    has_more: bool,
    sort: &'static str,
    filter: &'a str,
    count: usize,
    items: &'a [Repository],
}

#[derive(Debug, Serialize)]
struct ContributorsOutput<'a> {
    owner: &'a str,
    repo: &'a str,
    count: usize,
    items: &'a [Contributor],
}

#[derive(Debug, Serialize)]
struct HistoryOutput<'a> {
    scope: &'static str,
    loaded: bool,
    entries: &'a [String],
}
