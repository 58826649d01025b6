//! Archive-routing decision.
//!
//! Decides whether a target is fetched directly or through the archive
//! snapshot service, and with which navigation budget. The allow-list and
//! forced policies are kept as separate [`FetchPolicy`] variants; neither
//! is implied by the other.

use url::Url;

use crate::config::{FetchConfig, FetchPolicy, URL_PLACEHOLDER};
use crate::models::Route;

/// Fills the archive template with the percent-encoded target.
///
/// Encoding follows JavaScript's `encodeURIComponent`: ASCII alphanumerics
/// and `-_.!~*'()` pass through, everything else is `%XX`-escaped.
pub fn archive_url(template: &str, target: &str) -> String {
    template.replace(URL_PLACEHOLDER, &encode_component(target))
}

fn encode_component(input: &str) -> String {
    // urlencoding leaves `-_.~` alone; `encodeURIComponent` also keeps `!*'()`.
    urlencoding::encode(input)
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
}

/// Returns true if the target's host equals one of `domains` or is a
/// subdomain of one. Unparseable URLs never match.
pub fn host_matches(target: &str, domains: &[String]) -> bool {
    let Ok(parsed) = Url::parse(target) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();

    domains.iter().any(|domain| {
        let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
        !domain.is_empty()
            && (host == domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.')))
    })
}

/// Picks the navigation URL and timeout for `target` under `policy`.
pub fn plan_route(target: &str, policy: FetchPolicy, config: &FetchConfig) -> Route {
    let via_archive = match policy {
        FetchPolicy::ArchiveForced => true,
        FetchPolicy::ArchiveRouting => host_matches(target, &config.archive.domains),
        FetchPolicy::Direct | FetchPolicy::ScrollThenExtract => false,
    };

    if via_archive {
        Route {
            navigation_url: archive_url(&config.archive.url_template, target),
            via_archive,
            timeout: config.archive.timeout(),
        }
    } else {
        Route {
            navigation_url: target.to_string(),
            via_archive,
            timeout: config.navigation.timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn domains() -> Vec<String> {
        FetchConfig::default().archive.domains
    }

    #[test]
    fn test_archive_url_encodes_like_encode_uri_component() {
        let url = archive_url(
            "https://archive.ph/?run=1&url={url}",
            "https://wsj.com/some-story",
        );
        assert_eq!(
            url,
            "https://archive.ph/?run=1&url=https%3A%2F%2Fwsj.com%2Fsome-story"
        );
    }

    #[test]
    fn test_archive_url_keeps_unreserved_marks() {
        let url = archive_url("{url}", "https://a.com/x?q=a b&t=(1)!*'~");
        assert_eq!(url, "https%3A%2F%2Fa.com%2Fx%3Fq%3Da%20b%26t%3D(1)!*'~");
    }

    #[test]
    fn test_host_matches_exact_and_subdomain() {
        assert!(host_matches("https://wsj.com/a", &domains()));
        assert!(host_matches("https://www.wsj.com/a", &domains()));
        assert!(host_matches("https://WWW.FT.COM/content/1", &domains()));
        assert!(host_matches("https://www.nytimes.com./x", &domains()));
    }

    #[test]
    fn test_host_matches_rejects_lookalikes() {
        assert!(!host_matches("https://notwsj.com/a", &domains()));
        assert!(!host_matches("https://wsj.com.evil.net/a", &domains()));
        assert!(!host_matches("https://example.com/?ref=wsj.com", &domains()));
        assert!(!host_matches("not a url", &domains()));
    }

    #[test]
    fn test_plan_route_allow_listed_host_goes_to_archive() {
        let config = FetchConfig::default();
        let route = plan_route(
            "https://wsj.com/some-story",
            FetchPolicy::ArchiveRouting,
            &config,
        );
        assert!(route.via_archive);
        assert_eq!(
            route.navigation_url,
            "https://archive.ph/?run=1&url=https%3A%2F%2Fwsj.com%2Fsome-story"
        );
        assert_eq!(route.timeout, Duration::from_secs(180));
    }

    #[test]
    fn test_plan_route_other_host_is_unchanged() {
        let config = FetchConfig::default();
        let route = plan_route(
            "https://example.com/article",
            FetchPolicy::ArchiveRouting,
            &config,
        );
        assert!(!route.via_archive);
        assert_eq!(route.navigation_url, "https://example.com/article");
        assert_eq!(route.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_plan_route_forced_archives_everything() {
        let config = FetchConfig::default();
        let route = plan_route(
            "https://example.com/article",
            FetchPolicy::ArchiveForced,
            &config,
        );
        assert!(route.via_archive);
        assert_eq!(
            route.navigation_url,
            "https://archive.ph/?run=1&url=https%3A%2F%2Fexample.com%2Farticle"
        );
    }

    #[test]
    fn test_plan_route_direct_ignores_allow_list() {
        let config = FetchConfig::default();
        for policy in [FetchPolicy::Direct, FetchPolicy::ScrollThenExtract] {
            let route = plan_route("https://wsj.com/some-story", policy, &config);
            assert!(!route.via_archive);
            assert_eq!(route.navigation_url, "https://wsj.com/some-story");
        }
    }
}
