//! Listing records and crawl aggregates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::constants::NO_IMAGE;

/// One auction listing extracted from a result card
///
/// `local_image_path` is written in a second phase, after the asset batch
/// completes, and is matched to the listing through `image_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub brand: String,
    pub title: String,
    pub rank: String,
    pub starting_price: String,
    pub image_url: Option<String>,
    pub local_image_path: Option<PathBuf>,
    pub auction_time: String,
}

impl Listing {
    /// Image reference as shown to front-ends: the downloaded file name or "No Image"
    pub fn image_ref(&self) -> String {
        self.local_image_path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| NO_IMAGE.to_string(), |name| name.to_string_lossy().into_owned())
    }

    /// Flatten into a row of `[brand, title, rank, starting price, image, time]`
    pub fn to_row(&self) -> ListingRow {
        [
            self.brand.clone(),
            self.title.clone(),
            self.rank.clone(),
            self.starting_price.clone(),
            self.image_ref(),
            self.auction_time.clone(),
        ]
    }
}

/// Spreadsheet-style row, column order given by `constants::ROW_HEADERS`
pub type ListingRow = [String; 6];

/// Listings from one results page plus the continuation signal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    pub listings: Vec<Listing>,
    /// False when the page had no result cards at all
    pub has_more: bool,
    /// Result cards present on the page, before brand filtering
    pub cards_seen: usize,
    /// Cards skipped because they could not be parsed
    pub cards_skipped: usize,
}

/// Aggregate counters for one crawl run
///
/// Per-item failures never surface individually; they are counted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Results pages requested across all brands, including discovery fetches
    pub pages_fetched: u32,
    /// Pages whose fetch failed without invalidating the session
    pub pages_failed: u32,
    pub cards_skipped: usize,
    /// Listings dropped because their brand label did not match the query
    pub cards_filtered: usize,
    pub images_downloaded: usize,
    pub images_failed: usize,
    /// Brands abandoned because page discovery failed
    pub failed_brands: Vec<String>,
}

/// Final output of one crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    run_id: Uuid,
    listings: Vec<Listing>,
    stats: CrawlStats,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl CrawlResult {
    pub(crate) const fn new(
        run_id: Uuid,
        listings: Vec<Listing>,
        stats: CrawlStats,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id,
            listings,
            stats,
            started_at,
            finished_at,
        }
    }

    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn into_listings(self) -> Vec<Listing> {
        self.listings
    }

    pub const fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    pub const fn pages_fetched(&self) -> u32 {
        self.stats.pages_fetched
    }

    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub const fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn rows(&self) -> Vec<ListingRow> {
        self.listings.iter().map(Listing::to_row).collect()
    }

    pub fn summary(&self) -> CrawlSummary {
        let mut per_brand = BTreeMap::new();
        let mut with_image = 0;
        for listing in &self.listings {
            *per_brand.entry(listing.brand.clone()).or_insert(0) += 1;
            if listing.local_image_path.is_some() {
                with_image += 1;
            }
        }

        CrawlSummary {
            total_listings: self.listings.len(),
            with_image,
            without_image: self.listings.len() - with_image,
            per_brand,
        }
    }
}

/// Aggregate counts for a chat reply or a log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub total_listings: usize,
    pub with_image: usize,
    pub without_image: usize,
    pub per_brand: BTreeMap<String, usize>,
}

impl std::fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} listings ({} with image, {} without)",
            self.total_listings, self.with_image, self.without_image
        )?;
        for (brand, count) in &self.per_brand {
            write!(f, "\n  {brand}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(brand: &str, image: Option<&str>) -> Listing {
        Listing {
            brand: brand.to_string(),
            title: "Marmont".to_string(),
            rank: "AB".to_string(),
            starting_price: "10,000".to_string(),
            image_url: image.map(|_| "https://img.example/a.jpg".to_string()),
            local_image_path: image.map(PathBuf::from),
            auction_time: "10/21".to_string(),
        }
    }

    #[test]
    fn test_row_uses_file_name_or_no_image() {
        let with = listing("GUCCI", Some("/tmp/out/GUCCI/images/a.jpg"));
        assert_eq!(with.to_row()[4], "a.jpg");

        let without = listing("GUCCI", None);
        assert_eq!(without.to_row()[4], NO_IMAGE);
        assert_eq!(without.to_row()[0], "GUCCI");
    }

    #[test]
    fn test_summary_counts() {
        let now = Utc::now();
        let result = CrawlResult::new(
            Uuid::new_v4(),
            vec![
                listing("GUCCI", Some("/x/a.jpg")),
                listing("GUCCI", None),
                listing("PRADA", Some("/x/b.jpg")),
            ],
            CrawlStats {
                pages_fetched: 4,
                ..CrawlStats::default()
            },
            now,
            now,
        );

        let summary = result.summary();
        assert_eq!(summary.total_listings, 3);
        assert_eq!(summary.with_image, 2);
        assert_eq!(summary.without_image, 1);
        assert_eq!(summary.per_brand.get("GUCCI"), Some(&2));
        assert!(summary.to_string().starts_with("3 listings"));
    }
}
