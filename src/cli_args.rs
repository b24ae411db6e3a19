use clap::{ArgAction, ArgGroup, Parser};

/// CLI options
#[derive(Parser, Debug, Default)]
#[command(
    name = "monthly-report",
    version,
    about = "Summarize your GitHub commits per repository and translate the summaries to Ukrainian"
)]
#[command(group(
    ArgGroup::new("period")
        .args(["month", "since"])
        .multiple(false)
))]
pub struct Cli {
    /// GitHub personal access token (otherwise GITHUB_TOKEN or the config file)
    #[arg(long)]
    pub github_token: Option<String>,

    /// Comma-separated organizations to scan (otherwise GITHUB_ORGANIZATIONS)
    #[arg(long)]
    pub orgs: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise (otherwise GITHUB_API_URL)
    #[arg(long)]
    pub github_api_url: Option<String>,

    /// Ollama base URL, e.g. http://10.0.0.5:11434 (otherwise OLLAMA_HOST)
    #[arg(long)]
    pub ollama_host: Option<String>,

    /// Ollama model name, e.g. phi4 (otherwise OLLAMA_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Report on a whole calendar month (YYYY-MM). Defaults to last month.
    #[arg(long)]
    pub month: Option<String>,

    /// First day of the period, inclusive (YYYY-MM-DD)
    #[arg(long, requires = "until")]
    pub since: Option<String>,

    /// Day after the period ends, exclusive (YYYY-MM-DD)
    #[arg(long, requires = "since")]
    pub until: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Context window size passed to the model
    #[arg(long)]
    pub num_ctx: Option<u32>,

    /// Disable model calls; print dummy summaries instead
    #[arg(long)]
    pub no_model: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
