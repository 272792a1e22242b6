//! Crawl query value objects
//!
//! A `Query` pairs one brand with the selected item categories. It is built
//! once per brand by the orchestrator and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Item-type category id as understood by the results endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(u32);

/// (english name, korean name, id)
const CATEGORY_TABLE: [(&str, &str, u32); 8] = [
    ("watch", "시계", 1),
    ("bag", "가방", 2),
    ("precious-metal", "귀금속", 3),
    ("accessory", "악세서리", 4),
    ("small-goods", "소품", 5),
    ("clothing", "의류", 8),
    ("shoes", "신발", 9),
    ("other", "기타", 27),
];

impl CategoryId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u32 {
        self.0
    }

    /// Look up a category by its english or korean display name
    pub fn from_name(name: &str) -> Option<Self> {
        let needle = name.trim().to_lowercase();
        CATEGORY_TABLE
            .iter()
            .find(|(en, ko, _)| *en == needle || *ko == needle)
            .map(|(_, _, id)| Self(*id))
    }

    /// Every category the site's filter offers
    pub fn known() -> Vec<Self> {
        CATEGORY_TABLE.iter().map(|(_, _, id)| Self(*id)).collect()
    }

    /// English display name, if the id is one of the known categories
    pub fn name(self) -> Option<&'static str> {
        CATEGORY_TABLE
            .iter()
            .find(|(_, _, id)| *id == self.0)
            .map(|(en, _, _)| *en)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CategoryId {
    type Err = String;

    /// Accepts a numeric id or a category name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.trim().parse::<u32>() {
            return Ok(Self(id));
        }
        Self::from_name(s).ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Search over one brand and a set of categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    brand: String,
    categories: BTreeSet<CategoryId>,
    page_size: u32,
}

impl Query {
    pub fn new(brand: impl Into<String>, categories: impl IntoIterator<Item = CategoryId>, page_size: u32) -> Self {
        Self {
            brand: brand.into(),
            categories: categories.into_iter().collect(),
            page_size,
        }
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    /// Categories in ascending id order; the results endpoint receives them as an indexed array
    pub fn categories(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.categories.iter().copied()
    }

    pub const fn page_size(&self) -> u32 {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lookup_by_name() {
        assert_eq!(CategoryId::from_name("bag"), Some(CategoryId::new(2)));
        assert_eq!(CategoryId::from_name("가방"), Some(CategoryId::new(2)));
        assert_eq!(CategoryId::from_name(" Watch "), Some(CategoryId::new(1)));
        assert_eq!(CategoryId::from_name("furniture"), None);
    }

    #[test]
    fn test_category_from_str_accepts_ids_and_names() {
        assert_eq!("27".parse::<CategoryId>().unwrap(), CategoryId::new(27));
        assert_eq!("shoes".parse::<CategoryId>().unwrap(), CategoryId::new(9));
        assert!("nope".parse::<CategoryId>().is_err());
    }

    #[test]
    fn test_query_orders_categories() {
        let query = Query::new("GUCCI", [CategoryId::new(8), CategoryId::new(2), CategoryId::new(8)], 500);

        let ids: Vec<u32> = query.categories().map(CategoryId::id).collect();
        assert_eq!(ids, vec![2, 8]);
        assert_eq!(query.brand(), "GUCCI");
        assert_eq!(query.page_size(), 500);
    }
}
