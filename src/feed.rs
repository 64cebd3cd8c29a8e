//! Public repository feed.
//!
//! Fetches the user's most recently updated repositories, keeps the first few
//! that are not forks and carry a description, and renders them as project
//! cards. Any failure along the way collapses into a fallback message.

use std::fmt;
use std::time::Duration;

use json::JsonValue;
use thiserror::Error;

use crate::options::FeedOptions;

pub const FALLBACK_MESSAGE: &str =
    "Unable to load projects from GitHub. Please check the username or try again later.";

pub const DEFAULT_ICON: &str = "fas fa-code";

const LANGUAGE_ICONS: &[(&str, &str)] = &[
    ("JavaScript", "fab fa-js-square"),
    ("TypeScript", "fab fa-js-square"),
    ("Python", "fab fa-python"),
    ("React", "fab fa-react"),
    ("Vue", "fab fa-vuejs"),
    ("HTML", "fab fa-html5"),
    ("CSS", "fab fa-css3-alt"),
    ("Java", "fab fa-java"),
    ("PHP", "fab fa-php"),
    ("Ruby", "fas fa-gem"),
    ("Go", "fas fa-code"),
    ("Rust", "fas fa-cog"),
    ("C++", "fas fa-code"),
    ("C", "fas fa-code"),
    ("Shell", "fas fa-terminal"),
    ("Jupyter Notebook", "fas fa-chart-bar"),
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("response is not valid JSON: {0}")]
    Json(#[from] json::Error),
    #[error("unexpected response shape: {0}")]
    Shape(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Repository {
    pub name: String,
    pub description: Option<String>,
    pub fork: bool,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub updated_at: String,
    pub language: Option<String>,
    pub homepage: Option<String>,
    pub html_url: String,
}

fn optional_string(value: &JsonValue) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Repository {
    fn from_json(value: &JsonValue) -> Result<Repository, FeedError> {
        if !value.is_object() {
            return Err(FeedError::Shape("repository entry is not an object"));
        }
        let name = value["name"]
            .as_str()
            .ok_or(FeedError::Shape("repository without a name"))?;

        Ok(Repository {
            name: name.to_string(),
            description: optional_string(&value["description"]),
            fork: value["fork"].as_bool().unwrap_or(false),
            stargazers_count: value["stargazers_count"].as_u64().unwrap_or(0),
            forks_count: value["forks_count"].as_u64().unwrap_or(0),
            updated_at: value["updated_at"].as_str().unwrap_or_default().to_string(),
            language: optional_string(&value["language"]),
            homepage: optional_string(&value["homepage"]),
            html_url: value["html_url"].as_str().unwrap_or_default().to_string(),
        })
    }
}

pub fn parse_repositories(body: &str) -> Result<Vec<Repository>, FeedError> {
    let parsed = json::parse(body)?;
    if !parsed.is_array() {
        return Err(FeedError::Shape("expected a list of repositories"));
    }
    parsed.members().map(Repository::from_json).collect()
}

/// Keeps response order; skips forks and repositories without a description.
pub fn select_projects(repositories: &[Repository], max_cards: usize) -> Vec<&Repository> {
    repositories
        .iter()
        .filter(|repo| !repo.fork && repo.description.is_some())
        .take(max_cards)
        .collect()
}

pub fn language_icon(language: Option<&str>) -> &'static str {
    language
        .and_then(|language| {
            LANGUAGE_ICONS
                .iter()
                .find(|(name, _)| *name == language)
                .map(|(_, icon)| *icon)
        })
        .unwrap_or(DEFAULT_ICON)
}

/// Dashes become spaces and every word starts upper case.
pub fn prettify_name(name: &str) -> String {
    let mut pretty = String::with_capacity(name.len());
    let mut in_word = false;
    for c in name.chars() {
        let c = if c == '-' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        pretty.push(if is_word && !in_word {
            c.to_ascii_uppercase()
        } else {
            c
        });
        in_word = is_word;
    }
    pretty
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCard {
    pub title: String,
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    pub updated: String,
    pub language: Option<String>,
    pub icon: &'static str,
    pub code_url: String,
    pub demo_url: Option<String>,
}

impl ProjectCard {
    pub fn new(repo: &Repository) -> ProjectCard {
        ProjectCard {
            title: prettify_name(&repo.name),
            description: repo.description.clone().unwrap_or_default(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            updated: repo
                .updated_at
                .split('T')
                .next()
                .unwrap_or_default()
                .to_string(),
            language: repo.language.clone(),
            icon: language_icon(repo.language.as_deref()),
            code_url: repo.html_url.clone(),
            demo_url: repo.homepage.clone(),
        }
    }
}

impl fmt::Display for ProjectCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.icon, self.title)?;
        writeln!(f, "    {}", self.description)?;
        writeln!(
            f,
            "    * {}  forks {}  Updated {}",
            self.stars, self.forks, self.updated
        )?;
        if let Some(language) = &self.language {
            writeln!(f, "    <{}>", language)?;
        }
        write!(f, "    View Code: {}", self.code_url)?;
        if let Some(demo_url) = &self.demo_url {
            write!(f, "\n    Live Demo: {}", demo_url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedView {
    Cards(Vec<ProjectCard>),
    Fallback,
}

impl fmt::Display for FeedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedView::Cards(cards) => {
                for (i, card) in cards.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    writeln!(f, "{}", card)?;
                }
                Ok(())
            }
            FeedView::Fallback => writeln!(f, "{}", FALLBACK_MESSAGE),
        }
    }
}

pub fn render_feed(result: Result<Vec<Repository>, FeedError>, max_cards: usize) -> FeedView {
    let repositories = match result {
        Ok(repositories) => repositories,
        Err(error) => {
            log::error!("Error fetching GitHub projects: {}", error);
            return FeedView::Fallback;
        }
    };

    let cards: Vec<ProjectCard> = select_projects(&repositories, max_cards)
        .into_iter()
        .map(ProjectCard::new)
        .collect();
    if cards.is_empty() {
        log::warn!("No repository qualifies for a project card");
        return FeedView::Fallback;
    }
    FeedView::Cards(cards)
}

pub fn feed_url(options: &FeedOptions) -> String {
    format!(
        "{}/users/{}/repos?sort=updated&per_page={}",
        options.api_base.trim_end_matches('/'),
        options.username,
        options.page_size
    )
}

/// Performs the single blocking request for the repository list.
pub fn fetch_repositories(options: &FeedOptions) -> Result<Vec<Repository>, FeedError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let url = feed_url(options);
    log::debug!("Fetching {}", url);
    let response = client.get(&url).send()?;
    if !response.status().is_success() {
        return Err(FeedError::Status(response.status().as_u16()));
    }

    let body = response.text()?;
    parse_repositories(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_json(name: &str, fork: bool, description: Option<&str>) -> String {
        let description = match description {
            Some(d) => format!("\"{}\"", d),
            None => "null".to_string(),
        };
        format!(
            r#"{{"name": "{name}", "fork": {fork}, "description": {description},
                "stargazers_count": 4, "forks_count": 1,
                "updated_at": "2024-03-05T10:20:30Z", "language": "Rust",
                "homepage": "", "html_url": "https://github.com/x/{name}"}}"#
        )
    }

    fn six_repos() -> String {
        let entries = [
            repo_json("forked-one", true, Some("fork")),
            repo_json("audio-lab", false, Some("Sound experiments")),
            repo_json("no-docs", false, None),
            repo_json("forked-two", true, Some("another fork")),
            repo_json("site", false, Some("Personal site")),
            repo_json("dotfiles", false, Some("Config")),
        ];
        format!("[{}]", entries.join(","))
    }

    #[test]
    fn keeps_the_first_three_eligible_repositories() {
        let repos = parse_repositories(&six_repos()).unwrap();
        assert_eq!(repos.len(), 6);

        let FeedView::Cards(cards) = render_feed(Ok(repos), 3) else {
            panic!("expected cards");
        };
        let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Audio Lab", "Site", "Dotfiles"]);
    }

    #[test]
    fn no_eligible_repository_renders_the_fallback() {
        let body = format!(
            "[{},{}]",
            repo_json("a", true, Some("fork")),
            repo_json("b", false, None)
        );
        let repos = parse_repositories(&body).unwrap();
        assert_eq!(render_feed(Ok(repos), 3), FeedView::Fallback);
        assert_eq!(render_feed(Ok(vec![]), 3), FeedView::Fallback);
    }

    #[test]
    fn errors_render_the_fallback() {
        assert_eq!(
            render_feed(Err(FeedError::Status(404)), 3),
            FeedView::Fallback
        );
        assert!(matches!(
            parse_repositories("{not json"),
            Err(FeedError::Json(_))
        ));
        assert!(matches!(
            parse_repositories(r#"{"message": "Not Found"}"#),
            Err(FeedError::Shape(_))
        ));
        assert_eq!(FeedView::Fallback.to_string(), format!("{}\n", FALLBACK_MESSAGE));
    }

    #[test]
    fn card_fields() {
        let repos = parse_repositories(&six_repos()).unwrap();
        let card = ProjectCard::new(&repos[1]);

        assert_eq!(card.description, "Sound experiments");
        assert_eq!(card.stars, 4);
        assert_eq!(card.forks, 1);
        assert_eq!(card.updated, "2024-03-05");
        assert_eq!(card.language.as_deref(), Some("Rust"));
        assert_eq!(card.icon, "fas fa-cog");
        assert_eq!(card.code_url, "https://github.com/x/audio-lab");
        // Empty homepages get no demo link
        assert_eq!(card.demo_url, None);

        let text = card.to_string();
        assert!(text.contains("View Code: https://github.com/x/audio-lab"));
        assert!(!text.contains("Live Demo"));
    }

    #[test]
    fn prettified_names() {
        assert_eq!(prettify_name("my-cool-project"), "My Cool Project");
        assert_eq!(prettify_name("dotfiles"), "Dotfiles");
        assert_eq!(prettify_name("web.site-v2"), "Web.Site V2");
        assert_eq!(prettify_name("snake_case"), "Snake_case");
    }

    #[test]
    fn unknown_languages_use_the_default_icon() {
        assert_eq!(language_icon(Some("Python")), "fab fa-python");
        assert_eq!(language_icon(Some("COBOL")), DEFAULT_ICON);
        assert_eq!(language_icon(None), DEFAULT_ICON);
    }

    #[test]
    fn url_from_options() {
        let mut options = FeedOptions::default();
        options.api_base = "http://localhost:9999/".to_string();
        options.username = "someone".to_string();
        assert_eq!(
            feed_url(&options),
            "http://localhost:9999/users/someone/repos?sort=updated&per_page=6"
        );
    }
}
