//! Selector configuration for results pages
//!
//! Each field holds fallbacks tried in order; the first selector that
//! matches wins.

use serde::{Deserialize, Serialize};

/// CSS selectors for the inspection results grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// One result card
    pub card: Vec<String>,

    /// Brand label inside a card
    pub brand: Vec<String>,

    pub title: Vec<String>,

    /// Two-row canopy block: rank row, then starting price row
    pub canopy: Vec<String>,

    /// Row inside the canopy block
    pub canopy_row: Vec<String>,

    /// Value element inside a canopy row
    pub canopy_value: Vec<String>,

    /// Item image (`src` attribute)
    pub image: Vec<String>,

    /// Market / auction time label
    pub time_label: Vec<String>,

    /// Links of the pagination control
    pub pagination_link: Vec<String>,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            card: vec!["div.col-sm-6.col-md-4.col-lg-3.mb-grid-card".to_string()],
            brand: vec!["small.show-case-bland".to_string()],
            title: vec!["b".to_string()],
            canopy: vec!["ul.canopy.canopy-3.text-default".to_string(), "ul.canopy".to_string()],
            canopy_row: vec!["li".to_string()],
            canopy_value: vec!["big.canopy-value".to_string()],
            image: vec![
                "div.item-image.item-image-min.pc-image-area img".to_string(),
                "div.item-image img".to_string(),
            ],
            time_label: vec!["span.market-title".to_string()],
            pagination_link: vec!["ul.pagination li a".to_string()],
        }
    }
}
