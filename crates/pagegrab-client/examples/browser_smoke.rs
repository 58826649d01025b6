/// Smoke-test for `ChromiumLauncher`.
///
/// Launches a headless Chromium, fetches <https://example.com> directly,
/// and checks the extracted text contains the page heading.
///
/// Run with:
///   cargo run -p pagegrab-client --example browser_smoke
use pagegrab_client::ChromiumLauncher;
use pagegrab_core::{FetchConfig, FetchPolicy, FetchService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();

    let config = FetchConfig {
        policy: FetchPolicy::Direct,
        ..FetchConfig::default()
    };
    let service = FetchService::new(ChromiumLauncher::for_config(&config), config);

    let url = "https://example.com";
    println!("Fetching {url} …");
    let outcome = service.fetch(url).await?;

    assert!(
        outcome.text().contains("Example Domain"),
        "Expected heading not found in extracted text"
    );

    println!(
        "OK — matched {} with {} chars",
        outcome.extraction.selector,
        outcome.text().len()
    );
    println!("{}", outcome.text());
    Ok(())
}
