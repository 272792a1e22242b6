//! HTML parsing for the auction results pages
//!
//! Selectors are configured with fallbacks and compiled once per parser.
//! A card that cannot be read is skipped; it never aborts a page.

pub mod config;
pub mod context;
pub mod error;
pub mod listing_parser;
pub mod pagination_parser;

// Re-export public types
pub use config::ListingSelectors;
pub use context::ParseContext;
pub use error::{ParsingError, ParsingResult};
pub use listing_parser::ListingExtractor;
pub use pagination_parser::PaginationParser;

use scraper::{ElementRef, Selector};
use tracing::{debug, warn};

/// Compile fallback selector strings, keeping those that parse
///
/// Fails only when none of them compile.
pub(crate) fn compile_selectors(field: &str, selector_strings: &[String]) -> ParsingResult<Vec<Selector>> {
    let mut selectors = Vec::new();
    let mut errors = Vec::new();

    for selector_str in selector_strings {
        match Selector::parse(selector_str) {
            Ok(selector) => selectors.push(selector),
            Err(e) => {
                warn!("Failed to compile selector '{}': {}", selector_str, e);
                errors.push(format!("'{selector_str}': {e}"));
            }
        }
    }

    if selectors.is_empty() {
        return Err(ParsingError::NoValidSelectors {
            field: field.to_string(),
            errors: errors.join(", "),
        });
    }

    if !errors.is_empty() {
        debug!("Some '{}' selectors failed to compile: {}", field, errors.join(", "));
    }

    Ok(selectors)
}

/// First element matched by any of the fallback selectors
pub(crate) fn select_first<'a>(element: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| element.select(selector).next())
}

/// Trimmed text content, `None` when empty
pub(crate) fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_compile_selectors_skips_invalid_fallbacks() {
        let selectors = compile_selectors("card", &["div[".to_string(), "div.card".to_string()]).unwrap();
        assert_eq!(selectors.len(), 1);
    }

    #[test]
    fn test_compile_selectors_fails_when_nothing_compiles() {
        let err = compile_selectors("card", &["div[".to_string()]).unwrap_err();
        assert!(matches!(err, ParsingError::NoValidSelectors { .. }));
    }

    #[test]
    fn test_element_text_trims() {
        let html = Html::parse_fragment("<p>  <b> GUCCI </b>\n</p>");
        let b = Selector::parse("b").unwrap();
        let el = html.select(&b).next().unwrap();
        assert_eq!(element_text(el).as_deref(), Some("GUCCI"));
    }
}
