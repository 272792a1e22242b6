//! Listing extraction from inspection results pages
//!
//! Each result card becomes one `Listing`. Missing fields degrade to the
//! `"N/A"` sentinel (or no image) instead of rejecting the card; only a card
//! whose image source cannot be resolved to a URL is skipped. Cards whose brand label differs from the
//! queried brand are dropped, since the site's free-text search also returns
//! near matches.

#![allow(clippy::uninlined_format_args)]

use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::{debug, warn};

use super::config::ListingSelectors;
use super::{ParseContext, ParsingError, ParsingResult, compile_selectors, element_text, select_first};
use crate::domain::constants::UNKNOWN_FIELD;
use crate::domain::{Listing, PageResult};
use crate::infrastructure::translation::TranslationPort;

/// Translator plus the language pair it is asked for
#[derive(Clone)]
struct Translation {
    port: Arc<dyn TranslationPort>,
    source_lang: String,
    target_lang: String,
}

/// Parser for result cards on one results page
pub struct ListingExtractor {
    card_selectors: Vec<Selector>,
    brand_selectors: Vec<Selector>,
    title_selectors: Vec<Selector>,
    canopy_selectors: Vec<Selector>,
    canopy_row_selectors: Vec<Selector>,
    canopy_value_selectors: Vec<Selector>,
    image_selectors: Vec<Selector>,
    time_selectors: Vec<Selector>,
    translation: Option<Translation>,
}

impl std::fmt::Debug for ListingExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingExtractor")
            .field("translates", &self.translation.is_some())
            .finish_non_exhaustive()
    }
}

impl ListingExtractor {
    /// Create an extractor with the default selectors and no translation
    pub fn new() -> ParsingResult<Self> {
        Self::with_selectors(&ListingSelectors::default())
    }

    pub fn with_selectors(selectors: &ListingSelectors) -> ParsingResult<Self> {
        Ok(Self {
            card_selectors: compile_selectors("card", &selectors.card)?,
            brand_selectors: compile_selectors("brand", &selectors.brand)?,
            title_selectors: compile_selectors("title", &selectors.title)?,
            canopy_selectors: compile_selectors("canopy", &selectors.canopy)?,
            canopy_row_selectors: compile_selectors("canopy_row", &selectors.canopy_row)?,
            canopy_value_selectors: compile_selectors("canopy_value", &selectors.canopy_value)?,
            image_selectors: compile_selectors("image", &selectors.image)?,
            time_selectors: compile_selectors("time_label", &selectors.time_label)?,
            translation: None,
        })
    }

    /// Pass titles and time labels through `port` after parsing
    #[must_use]
    pub fn with_translator(
        mut self,
        port: Arc<dyn TranslationPort>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        self.translation = Some(Translation {
            port,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        });
        self
    }

    /// Parse a results page without translation
    pub fn parse_page(&self, html: &str, context: &ParseContext) -> PageResult {
        let document = Html::parse_document(html);
        self.parse_document(&document, context)
    }

    /// Parse a results page, then translate titles and time labels when configured
    ///
    /// Translation failures keep the source text.
    pub async fn extract(&self, html: &str, context: &ParseContext) -> PageResult {
        let mut page = self.parse_page(html, context);

        if let Some(translation) = &self.translation {
            for listing in &mut page.listings {
                listing.title = translate_field(translation, &listing.title).await;
                listing.auction_time = translate_field(translation, &listing.auction_time).await;
            }
        }

        page
    }

    fn parse_document(&self, document: &Html, context: &ParseContext) -> PageResult {
        let cards: Vec<ElementRef> = self
            .card_selectors
            .iter()
            .map(|selector| document.select(selector).collect::<Vec<_>>())
            .find(|cards| !cards.is_empty())
            .unwrap_or_default();

        let mut page = PageResult {
            listings: Vec::with_capacity(cards.len()),
            has_more: !cards.is_empty(),
            cards_seen: cards.len(),
            cards_skipped: 0,
        };

        for (index, card) in cards.into_iter().enumerate() {
            match self.extract_listing(card, context) {
                Ok(listing) if listing.brand == context.expected_brand => page.listings.push(listing),
                Ok(listing) => {
                    debug!(
                        "Dropping card #{} on page {}: brand '{}' is not '{}'",
                        index, context.page, listing.brand, context.expected_brand
                    );
                }
                Err(e) => {
                    warn!("Skipping card #{} on page {}: {}", index, context.page, e);
                    page.cards_skipped += 1;
                }
            }
        }

        debug!(
            "Page {} for '{}': {} cards, {} listings kept, {} skipped",
            context.page,
            context.expected_brand,
            page.cards_seen,
            page.listings.len(),
            page.cards_skipped
        );

        page
    }

    fn extract_listing(&self, card: ElementRef<'_>, context: &ParseContext) -> ParsingResult<Listing> {
        let brand = self.text_or_unknown(card, &self.brand_selectors);
        let title = self.text_or_unknown(card, &self.title_selectors);

        let rows: Vec<ElementRef> = select_first(card, &self.canopy_selectors)
            .map(|canopy| {
                self.canopy_row_selectors
                    .iter()
                    .map(|selector| canopy.select(selector).collect::<Vec<_>>())
                    .find(|rows| !rows.is_empty())
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        let rank = rows
            .first()
            .and_then(|row| self.rank_from_row(*row))
            .unwrap_or_else(|| UNKNOWN_FIELD.to_string());

        let starting_price = rows
            .get(1)
            .and_then(|row| select_first(*row, &self.canopy_value_selectors))
            .and_then(element_text)
            .unwrap_or_else(|| UNKNOWN_FIELD.to_string());

        // Lazy-loaded cards carry no `src`; the listing is kept without an image
        let image_url = match select_first(card, &self.image_selectors)
            .and_then(|image| image.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
        {
            Some(src) => {
                let resolved = context
                    .base_url
                    .join(src)
                    .map_err(|e| ParsingError::UrlResolutionFailed {
                        url: src.to_string(),
                        reason: e.to_string(),
                    })?;
                Some(resolved.to_string())
            }
            None => None,
        };

        let auction_time = self.text_or_unknown(card, &self.time_selectors);

        Ok(Listing {
            brand,
            title,
            rank,
            starting_price,
            image_url,
            local_image_path: None,
            auction_time,
        })
    }

    /// Rank is the text right after the row's label element, e.g. `<big>評価</big>AB`
    ///
    /// A row holding only the label has no rank.
    fn rank_from_row(&self, row: ElementRef<'_>) -> Option<String> {
        select_first(row, &self.canopy_value_selectors)?
            .next_siblings()
            .find_map(|node| {
                node.value()
                    .as_text()
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty())
            })
    }

    fn text_or_unknown(&self, card: ElementRef<'_>, selectors: &[Selector]) -> String {
        select_first(card, selectors)
            .and_then(element_text)
            .unwrap_or_else(|| UNKNOWN_FIELD.to_string())
    }
}

async fn translate_field(translation: &Translation, text: &str) -> String {
    if text == UNKNOWN_FIELD {
        return text.to_string();
    }
    translation
        .port
        .translate(text, &translation.source_lang, &translation.target_lang)
        .await
}
