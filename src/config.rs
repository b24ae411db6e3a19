use crate::cli_args::Cli;
use crate::github::DEFAULT_API_URL;
use crate::llm::ollama::OllamaSettings;
use crate::window::{parse_date, DateWindow};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_NUM_CTX: u32 = 14336;

/// Final resolved configuration for monthly-report.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub github_api_url: String,
    pub organizations: Vec<String>,
    /// `None` when model calls are disabled.
    pub ollama: Option<OllamaSettings>,
    pub window: DateWindow,
    pub timeout: Duration,
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags (`--orgs`, `--model`, ...)
    ///   2. Env vars (`GITHUB_ORGANIZATIONS`, `OLLAMA_MODEL`, ...)
    ///   3. TOML `~/.config/monthly-report.toml`
    ///   4. Hardcoded defaults, where a value has one
    pub fn from_sources(cli: &Cli) -> Result<Self> {
        let file_cfg = load_file_config().unwrap_or_else(|e| {
            log::warn!("Ignoring config file: {e:#}");
            FileConfig::default()
        });
        let today = chrono::Local::now().date_naive();

        Self::resolve(cli, file_cfg, |key| env::var(key).ok(), today)
    }

    fn resolve(
        cli: &Cli,
        file_cfg: FileConfig,
        env_var: impl Fn(&str) -> Option<String>,
        today: NaiveDate,
    ) -> Result<Self> {
        let mut missing = Vec::new();

        let github_token = first_set([
            cli.github_token.clone(),
            env_var("GITHUB_TOKEN"),
            file_cfg.github_token,
        ]);
        if github_token.is_none() {
            missing.push("GITHUB_TOKEN (--github-token)");
        }

        let organizations = first_set([
            cli.orgs.clone(),
            env_var("GITHUB_ORGANIZATIONS"),
            file_cfg.organizations,
        ])
        .map(|raw| parse_organizations(&raw))
        .unwrap_or_default();
        if organizations.is_empty() {
            missing.push("GITHUB_ORGANIZATIONS (--orgs)");
        }

        let ollama_host = first_set([
            cli.ollama_host.clone(),
            env_var("OLLAMA_HOST"),
            file_cfg.ollama_host,
        ]);
        let ollama_model = first_set([
            cli.model.clone(),
            env_var("OLLAMA_MODEL"),
            file_cfg.ollama_model,
        ]);
        if !cli.no_model {
            if ollama_host.is_none() {
                missing.push("OLLAMA_HOST (--ollama-host)");
            }
            if ollama_model.is_none() {
                missing.push("OLLAMA_MODEL (--model)");
            }
        }

        if !missing.is_empty() {
            return Err(anyhow!(
                "missing required configuration: {}",
                missing.join(", ")
            ));
        }

        let github_api_url = first_set([
            cli.github_api_url.clone(),
            env_var("GITHUB_API_URL"),
            file_cfg.github_api_url,
        ])
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout = Duration::from_secs(
            cli.timeout
                .or(file_cfg.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );
        let num_ctx = cli.num_ctx.or(file_cfg.num_ctx).unwrap_or(DEFAULT_NUM_CTX);

        let ollama = match (cli.no_model, ollama_host, ollama_model) {
            (false, Some(host), Some(model)) => Some(OllamaSettings {
                host,
                model,
                timeout,
                num_ctx,
            }),
            _ => None,
        };

        Ok(Config {
            github_token: github_token.unwrap_or_default(),
            github_api_url,
            organizations,
            ollama,
            window: resolve_window(cli, today)?,
            timeout,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    github_token: Option<String>,
    /// Comma-separated, same format as GITHUB_ORGANIZATIONS.
    organizations: Option<String>,
    github_api_url: Option<String>,
    ollama_host: Option<String>,
    ollama_model: Option<String>,
    timeout_secs: Option<u64>,
    num_ctx: Option<u32>,
}

/// Return `~/.config/monthly-report.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("monthly-report.toml"))
}

fn load_file_config() -> Result<FileConfig> {
    let Some(path) = config_path() else {
        return Ok(FileConfig::default());
    };
    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str::<FileConfig>(&data).with_context(|| format!("failed to parse {}", path.display()))
}

/// First value that is present and not blank.
fn first_set<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Split a comma-separated organization list, trimming entries and dropping
/// empty ones.
pub fn parse_organizations(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn resolve_window(cli: &Cli, today: NaiveDate) -> Result<DateWindow> {
    match (&cli.month, &cli.since, &cli.until) {
        (Some(month), _, _) => DateWindow::month(month),
        (None, Some(since), Some(until)) => DateWindow::new(parse_date(since)?, parse_date(until)?),
        (None, None, None) => DateWindow::previous_month(today),
        _ => Err(anyhow!("--since and --until must be given together")),
    }
}
