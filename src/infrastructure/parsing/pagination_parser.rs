//! Page count detection for results pages

use scraper::{Html, Selector};
use tracing::debug;

use super::config::ListingSelectors;
use super::{ParsingResult, compile_selectors, element_text};

/// Reads the pagination control of a first results page
#[derive(Debug)]
pub struct PaginationParser {
    link_selectors: Vec<Selector>,
    card_selectors: Vec<Selector>,
}

impl PaginationParser {
    pub fn new() -> ParsingResult<Self> {
        Self::with_selectors(&ListingSelectors::default())
    }

    pub fn with_selectors(selectors: &ListingSelectors) -> ParsingResult<Self> {
        Ok(Self {
            link_selectors: compile_selectors("pagination_link", &selectors.pagination_link)?,
            card_selectors: compile_selectors("card", &selectors.card)?,
        })
    }

    /// Total pages for the query whose first page is `html`
    ///
    /// The last numeric pagination link gives the count. Without a numbered
    /// pagination control, a page that has result cards is the only page and a
    /// page without them means the query matched nothing.
    pub fn page_count(&self, html: &str) -> u32 {
        self.count_pages(&Html::parse_document(html))
    }

    fn count_pages(&self, document: &Html) -> u32 {
        let last_numeric = self
            .link_selectors
            .iter()
            .flat_map(|selector| document.select(selector))
            .filter_map(element_text)
            .filter_map(|label| label.parse::<u32>().ok())
            .last();

        if let Some(pages) = last_numeric.filter(|&pages| pages > 0) {
            debug!("Pagination control reports {} pages", pages);
            return pages;
        }

        let has_cards = self
            .card_selectors
            .iter()
            .any(|selector| document.select(selector).next().is_some());

        debug!("No numbered pagination control, result cards present: {}", has_cards);
        u32::from(has_cards)
    }
}
