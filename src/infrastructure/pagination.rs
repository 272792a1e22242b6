//! Page count discovery for a results query
//!
//! Discovery fetches page 1 of a query once. The page HTML is handed back
//! with the count so the crawl loop can extract it without a second request.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use super::config::{CrawlingConfig, ecoauc::params};
use super::crawl_error::{DiscoveryError, SessionError};
use super::http_session::HttpSession;
use super::parsing::PaginationParser;
use crate::domain::Query;

/// Outcome of discovering a query's pages
#[derive(Debug, Clone)]
pub struct Discovery {
    pub page_count: u32,
    /// Body of page 1, already fetched
    pub first_page_html: String,
}

/// Query string of the inspection results endpoint for one page
pub fn results_params(query: &Query, crawling: &CrawlingConfig, page: u32) -> Vec<(String, String)> {
    let mut pairs = vec![
        (params::LIMIT.to_string(), query.page_size().to_string()),
        (params::SORT_KEY.to_string(), crawling.sort_key.clone()),
        (params::TABLE_TYPE.to_string(), crawling.table_type.clone()),
        (params::QUERY.to_string(), query.brand().to_string()),
        (params::PRICE_LOW.to_string(), String::new()),
        (params::PRICE_HIGH.to_string(), String::new()),
        (params::BRANDS.to_string(), String::new()),
        (params::AUCTION_LANE.to_string(), String::new()),
        (params::SHAPES.to_string(), String::new()),
        (params::RANKS.to_string(), String::new()),
        (params::PAGE.to_string(), page.to_string()),
    ];

    for (index, category) in query.categories().enumerate() {
        pairs.push((format!("{}[{index}]", params::CATEGORIES), category.id().to_string()));
    }

    pairs
}

/// Absolute URL of one results page
pub fn results_url(
    session: &HttpSession,
    results_path: &str,
    query: &Query,
    crawling: &CrawlingConfig,
    page: u32,
) -> Result<Url, SessionError> {
    let mut url = session.resolve(results_path)?;
    url.query_pairs_mut()
        .clear()
        .extend_pairs(results_params(query, crawling, page));
    Ok(url)
}

/// Determines how many results pages a query has
#[derive(Debug)]
pub struct PaginationDiscoverer {
    parser: PaginationParser,
    results_path: String,
    crawling: CrawlingConfig,
}

impl PaginationDiscoverer {
    pub fn new(parser: PaginationParser, results_path: impl Into<String>, crawling: CrawlingConfig) -> Self {
        Self {
            parser,
            results_path: results_path.into(),
            crawling,
        }
    }

    /// Fetch page 1 of `query` and read its page count
    ///
    /// Zero pages is a valid outcome, not an error.
    pub async fn discover(
        &self,
        session: &mut HttpSession,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<Discovery, DiscoveryError> {
        let fetch_error = |source| DiscoveryError::Fetch {
            brand: query.brand().to_string(),
            source,
        };

        let url = results_url(session, &self.results_path, query, &self.crawling, 1).map_err(fetch_error)?;
        debug!("Discovering pages for '{}' via {}", query.brand(), url);

        let html = session.get_page(url, cancel).await.map_err(fetch_error)?;
        let page_count = self.parser.page_count(&html);

        info!("📊 '{}' has {} result page(s)", query.brand(), page_count);

        Ok(Discovery {
            page_count,
            first_page_html: html,
        })
    }

    pub fn results_url(&self, session: &HttpSession, query: &Query, page: u32) -> Result<Url, SessionError> {
        results_url(session, &self.results_path, query, &self.crawling, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CategoryId;
    use crate::infrastructure::http_session::HttpSessionConfig;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gucci_bags_and_watches() -> Query {
        Query::new("GUCCI", [CategoryId::new(2), CategoryId::new(1)], 500)
    }

    #[test]
    fn test_results_params_order_and_categories() {
        let pairs = results_params(&gucci_bags_and_watches(), &CrawlingConfig::default(), 3);
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();

        assert_eq!(
            keys,
            vec![
                "limit",
                "sortKey",
                "tableType",
                "q",
                "low",
                "high",
                "master_item_brands",
                "auction_lane_id",
                "master_item_shapes",
                "master_item_ranks",
                "page",
                "master_item_categories[0]",
                "master_item_categories[1]",
            ]
        );
        assert_eq!(pairs[0].1, "500");
        assert_eq!(pairs[3].1, "GUCCI");
        assert_eq!(pairs[10].1, "3");
        // Categories come out in id order
        assert_eq!(pairs[11].1, "1");
        assert_eq!(pairs[12].1, "2");
    }

    #[tokio::test]
    async fn test_discover_reads_page_count_and_keeps_html() {
        let server = MockServer::start().await;
        let body = r##"<html><body><ul class="pagination"><li><a href="#">1</a></li><li><a href="#">4</a></li></ul></body></html>"##;
        Mock::given(method("GET"))
            .and(path("/client/auctions/inspect"))
            .and(query_param("q", "GUCCI"))
            .and(query_param("page", "1"))
            .and(query_param("master_item_categories[0]", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let mut session = HttpSession::new(
            Url::parse(&server.uri()).unwrap(),
            &HttpSessionConfig {
                user_agent: "test".into(),
                request_timeout: Duration::from_secs(5),
                sign_in_path: "/client/users/sign-in".into(),
            },
        )
        .unwrap();
        let discoverer = PaginationDiscoverer::new(
            PaginationParser::new().unwrap(),
            "/client/auctions/inspect",
            CrawlingConfig::default(),
        );

        let discovery = discoverer
            .discover(&mut session, &gucci_bags_and_watches(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(discovery.page_count, 4);
        assert_eq!(discovery.first_page_html, body);
    }
}
