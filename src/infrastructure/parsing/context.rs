//! Context carried through the parsing of one results page

use url::Url;

/// Context information for parsing one results page
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Brand the query searched for; cards with any other brand label are dropped
    pub expected_brand: String,

    /// Page number being parsed, for log messages
    pub page: u32,

    /// Base URL for resolving relative image links
    pub base_url: Url,
}

impl ParseContext {
    pub fn new(expected_brand: impl Into<String>, page: u32, base_url: Url) -> Self {
        Self {
            expected_brand: expected_brand.into(),
            page,
            base_url,
        }
    }

    /// Same query, another page
    pub fn for_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}
