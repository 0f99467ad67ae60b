//! Link collection from paginated search results

use std::sync::LazyLock;

use scraper::Selector;
use tracing::{debug, info, instrument, warn};

use crate::listing::ListingUrl;
use crate::listing::config::{FetchFailurePolicy, ScrapeConfig};
use crate::listing::document::{PageDocument, has_class};
use crate::listing::error::ScrapeError;
use crate::listing::fetch::PageFetcher;

/// Container of the results list on a search page
pub const RESULTS_MARKER: &str = r#"ul[data-testid="results"]"#;

/// Class that tags a result anchor as the listing's address link
pub const ADDRESS_CLASS: &str = "address";

static RESULTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(RESULTS_MARKER).expect("valid results selector"));
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Extract the listing links of one results page
///
/// Keeps anchors inside the results container whose href points at
/// `base_url` and whose class list carries the address marker, in
/// document order. Returns `None` if the page has no results container.
pub fn extract_listing_links(doc: &PageDocument, base_url: &str) -> Option<Vec<ListingUrl>> {
    let results = doc.find(&RESULTS)?;

    let links = results
        .select(&ANCHOR)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            (href.contains(base_url) && has_class(a, ADDRESS_CLASS)).then(|| href.to_string())
        })
        .collect();

    Some(links)
}

/// Walk `config.pages` results pages and collect listing URLs
///
/// Pages are visited in ascending order and their links concatenated
/// without deduplication.
#[instrument(skip(fetcher, config), fields(pages = config.pages))]
pub async fn collect_listing_urls<F: PageFetcher>(
    fetcher: &F,
    config: &ScrapeConfig,
) -> Result<Vec<ListingUrl>, ScrapeError> {
    info!("Generating the list of links");
    let mut url_links = Vec::new();

    for page in 1..=config.pages {
        let url = config.results_page_url(page)?;
        info!("Visiting {}", url);

        match collect_page(fetcher, &url, &config.base_url).await {
            Ok(links) => {
                debug!(page, found = links.len(), "Collected address links");
                url_links.extend(links);
            }
            Err(e) if config.on_fetch_error == FetchFailurePolicy::Skip => {
                warn!(page, error = %e, "Skipping results page");
            }
            Err(e) => return Err(e),
        }
    }

    info!(total = url_links.len(), "Link collection finished");
    Ok(url_links)
}

async fn collect_page<F: PageFetcher>(
    fetcher: &F,
    url: &str,
    base_url: &str,
) -> Result<Vec<ListingUrl>, ScrapeError> {
    let body = fetcher.fetch(url).await?;
    let doc = PageDocument::parse(&body);
    extract_listing_links(&doc, base_url).ok_or_else(|| ScrapeError::MissingElement {
        url: url.to_string(),
        marker: RESULTS_MARKER,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::mock_fetcher::MockFetcher;

    const BASE: &str = "https://www.domain.com.au";

    fn results_page(anchors: &[(&str, &str)]) -> String {
        let items: String = anchors
            .iter()
            .map(|(href, class)| {
                format!(r#"<li><a href="{}" class="{}">link</a></li>"#, href, class)
            })
            .collect();
        format!(
            r#"<html><body>
                <a class="address" href="{base}/outside-results">outside</a>
                <ul data-testid="results">{items}</ul>
            </body></html>"#,
            base = BASE,
            items = items
        )
    }

    fn config(pages: u32) -> ScrapeConfig {
        ScrapeConfig::builder().base_url(BASE).pages(pages).build()
    }

    #[test]
    fn test_only_address_links_are_kept() {
        let html = results_page(&[
            ("https://www.domain.com.au/listing/1", "address is-two-lines css-1y2bib4"),
            ("https://www.domain.com.au/agent/2", "agent-link"),
            ("https://www.domain.com.au/rent/VIC/?page=2", "pagination"),
            ("https://elsewhere.example/listing/3", "address"),
            ("https://www.domain.com.au/listing/4", "address"),
        ]);
        let doc = PageDocument::parse(&html);

        let links = extract_listing_links(&doc, BASE).unwrap();
        assert_eq!(
            links,
            vec![
                "https://www.domain.com.au/listing/1".to_string(),
                "https://www.domain.com.au/listing/4".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_results_container() {
        let doc = PageDocument::parse("<html><body><ul><li>nothing</li></ul></body></html>");
        assert!(extract_listing_links(&doc, BASE).is_none());
    }

    #[tokio::test]
    async fn test_pages_are_concatenated_in_order() {
        let cfg = config(2);
        let fetcher = MockFetcher::new()
            .with_page(
                cfg.results_page_url(1).unwrap(),
                results_page(&[
                    ("https://www.domain.com.au/listing/b", "address"),
                    ("https://www.domain.com.au/listing/a", "address"),
                ]),
            )
            .with_page(
                cfg.results_page_url(2).unwrap(),
                results_page(&[
                    ("https://www.domain.com.au/listing/a", "address"),
                    ("https://www.domain.com.au/agent/9", "agent-link"),
                ]),
            );

        let links = collect_listing_urls(&fetcher, &cfg).await.unwrap();
        assert_eq!(
            links,
            vec![
                "https://www.domain.com.au/listing/b".to_string(),
                "https://www.domain.com.au/listing/a".to_string(),
                "https://www.domain.com.au/listing/a".to_string(),
            ]
        );
        assert_eq!(
            fetcher.requests().await,
            vec![cfg.results_page_url(1).unwrap(), cfg.results_page_url(2).unwrap()]
        );
    }

    #[tokio::test]
    async fn test_zero_pages_makes_no_requests() {
        let fetcher = MockFetcher::new();
        let links = collect_listing_urls(&fetcher, &config(0)).await.unwrap();
        assert!(links.is_empty());
        assert!(fetcher.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_by_default() {
        let cfg = config(3);
        let fetcher = MockFetcher::new()
            .with_page(
                cfg.results_page_url(1).unwrap(),
                results_page(&[("https://www.domain.com.au/listing/1", "address")]),
            )
            .with_status(cfg.results_page_url(2).unwrap(), 500);

        let result = collect_listing_urls(&fetcher, &cfg).await;
        assert!(matches!(result, Err(ScrapeError::Status { status: 500, .. })));
        assert_eq!(fetcher.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_container_aborts_by_default() {
        let cfg = config(1);
        let fetcher = MockFetcher::new()
            .with_page(cfg.results_page_url(1).unwrap(), "<html><body></body></html>");

        let result = collect_listing_urls(&fetcher, &cfg).await;
        assert!(matches!(result, Err(ScrapeError::MissingElement { .. })));
    }

    #[tokio::test]
    async fn test_skip_policy_continues_after_failure() {
        let cfg = ScrapeConfig::builder()
            .base_url(BASE)
            .pages(3)
            .on_fetch_error(FetchFailurePolicy::Skip)
            .build();
        let fetcher = MockFetcher::new()
            .with_status(cfg.results_page_url(1).unwrap(), 403)
            .with_page(cfg.results_page_url(2).unwrap(), "<html></html>")
            .with_page(
                cfg.results_page_url(3).unwrap(),
                results_page(&[("https://www.domain.com.au/listing/3", "address")]),
            );

        let links = collect_listing_urls(&fetcher, &cfg).await.unwrap();
        assert_eq!(links, vec!["https://www.domain.com.au/listing/3".to_string()]);
        assert_eq!(fetcher.requests().await.len(), 3);
    }
}
