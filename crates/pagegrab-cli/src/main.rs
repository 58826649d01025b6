use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pagegrab_client::{ChromiumLauncher, RedirectResolver};
use pagegrab_core::output::{write_report, write_text};
use pagegrab_core::{AppError, FetchConfig, FetchPolicy, FetchService, QualityPolicy};

/// Print the rendered text of a web page, via archive.ph for paywalled sites.
#[derive(Parser, Debug)]
#[command(name = "pagegrab", version, about)]
struct Cli {
    /// Target URL to fetch
    url: String,

    /// How to reach the page
    #[arg(
        short,
        long,
        env = "PAGEGRAB_POLICY",
        value_name = "direct|archive-routing|archive-forced|scroll-then-extract"
    )]
    policy: Option<FetchPolicy>,

    /// JSON config file (partial files keep defaults for missing keys)
    #[arg(short, long, env = "PAGEGRAB_CONFIG")]
    config: Option<PathBuf>,

    /// Content selector to try, in order (repeatable; replaces the defaults)
    #[arg(short, long = "selector")]
    selectors: Vec<String>,

    /// Minimum characters before the content is considered too short
    #[arg(long)]
    min_chars: Option<usize>,

    /// Fail instead of warning when the content is too short
    #[arg(long, default_value_t = false)]
    reject_short: bool,

    /// Do not remove paywall overlays before extracting
    #[arg(long, default_value_t = false)]
    no_overlays: bool,

    /// Follow HTTP redirects before routing (for aggregator links)
    #[arg(long, default_value_t = false)]
    resolve_redirects: bool,

    /// Chrome/Chromium executable
    #[arg(long, env = "CHROME_BIN")]
    chrome: Option<String>,

    /// Write the structured fetch report as JSON to stderr
    #[arg(long, default_value_t = false)]
    report: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Stdout is reserved for the page text; all logging goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,pagegrab=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = build_config(&cli)?;

    let mut url = cli.url.trim().to_string();
    if url.is_empty() {
        return Err(AppError::Usage("No URL provided. Usage: pagegrab <URL>".into()));
    }

    if cli.resolve_redirects {
        url = RedirectResolver::new()?.resolve(&url).await;
    }

    let service = FetchService::new(ChromiumLauncher::for_config(&config), config);
    let outcome = service.fetch(&url).await?;

    write_text(&mut std::io::stdout().lock(), &outcome)
        .map_err(|e| AppError::Generic(format!("Failed to write to stdout: {e}")))?;

    if cli.report {
        write_report(&mut std::io::stderr().lock(), &outcome)
            .map_err(|e| AppError::Generic(format!("Failed to write report: {e}")))?;
    }

    tracing::info!(
        selector = %outcome.extraction.selector,
        via_archive = outcome.route.via_archive,
        "Done"
    );
    Ok(())
}

/// Layers command-line flags over the config file (or the defaults).
fn build_config(cli: &Cli) -> Result<FetchConfig, AppError> {
    let mut config = match &cli.config {
        Some(path) => FetchConfig::from_json_file(path)?,
        None => FetchConfig::default(),
    };

    if let Some(policy) = cli.policy {
        config.policy = policy;
    }
    if !cli.selectors.is_empty() {
        config.extraction.selectors = cli.selectors.clone();
    }
    if let Some(min_chars) = cli.min_chars {
        config.extraction.min_chars = min_chars;
    }
    if cli.reject_short {
        config.extraction.quality = QualityPolicy::Reject;
    }
    if cli.no_overlays {
        config.overlays.enabled = false;
    }
    if let Some(chrome) = &cli.chrome {
        config.launch.executable = Some(chrome.clone());
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_missing_url_is_a_usage_error() {
        let err = Cli::try_parse_from(["pagegrab"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let err = Cli::try_parse_from(["pagegrab", "--policy", "sideways", "https://a.com"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "pagegrab",
            "--policy",
            "archive-forced",
            "-s",
            "main",
            "-s",
            "article",
            "--min-chars",
            "10",
            "--reject-short",
            "--no-overlays",
            "https://example.com/a",
        ]);
        let config = build_config(&cli).unwrap();

        assert_eq!(cli.url, "https://example.com/a");
        assert_eq!(config.policy, FetchPolicy::ArchiveForced);
        assert_eq!(config.extraction.selectors, vec!["main", "article"]);
        assert_eq!(config.extraction.min_chars, 10);
        assert_eq!(config.extraction.quality, QualityPolicy::Reject);
        assert!(!config.overlays.enabled);
    }

    #[test]
    fn test_missing_config_file_exits_with_two() {
        let cli = parse(&[
            "pagegrab",
            "--config",
            "/nonexistent/pagegrab.json",
            "https://example.com",
        ]);
        let err = build_config(&cli).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_empty_url_is_a_usage_error() {
        let cli = parse(&["pagegrab", "--policy", "direct", "  "]);
        let err = run(cli).await.unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
