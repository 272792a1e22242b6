//! Results page parsing benchmarks
//!
//! Card extraction and page counting, sized up to a full 500-card page (`limit=500`).

use auction_crawler_lib::infrastructure::asset_fetcher::normalize_image_url;
use auction_crawler_lib::infrastructure::parsing::{ListingExtractor, PaginationParser, ParseContext};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use url::Url;

fn fixture_page(cards: usize) -> String {
    let body: String = (0..cards)
        .map(|i| {
            let brand = if i % 5 == 0 { "GUCCI JAPAN" } else { "GUCCI" };
            format!(
                r#"<div class="col-sm-6 col-md-4 col-lg-3 mb-grid-card">
                    <div class="item-image item-image-min pc-image-area"><img src="/img/items/{i}.jpg?w=300&h=300"></div>
                    <small class="show-case-bland">{brand}</small><b>アイテム {i}</b>
                    <ul class="canopy canopy-3 text-default">
                        <li><big class="canopy-value">ランク</big>AB</li>
                        <li><big class="canopy-value">{price}</big>円</li>
                    </ul>
                    <span class="market-title">10/25 13:00</span>
                </div>"#,
                price = 10_000 + i * 100
            )
        })
        .collect();
    let pages: String = (1..=12)
        .map(|p| format!(r#"<li><a href="?page={p}">{p}</a></li>"#))
        .collect();
    format!(r#"<html><body>{body}<ul class="pagination">{pages}</ul></body></html>"#)
}

fn bench_listing_extraction(c: &mut Criterion) {
    let extractor = ListingExtractor::new().expect("default selectors compile");
    let context = ParseContext::new("GUCCI", 1, Url::parse("https://www.ecoauc.com").expect("valid url"));

    let mut group = c.benchmark_group("listing_extraction");
    for cards in [50, 500] {
        let html = fixture_page(cards);
        group.bench_function(format!("{cards}_cards"), |b| {
            b.iter(|| extractor.parse_page(black_box(&html), &context));
        });
    }
    group.finish();
}

fn bench_page_count(c: &mut Criterion) {
    let parser = PaginationParser::new().expect("default selectors compile");
    let html = fixture_page(500);
    c.bench_function("page_count_500_cards", |b| {
        b.iter(|| parser.page_count(black_box(&html)));
    });
}

fn bench_url_normalization(c: &mut Criterion) {
    c.bench_function("normalize_image_url", |b| {
        b.iter(|| normalize_image_url(black_box("https://www.ecoauc.com/img/items/1.jpg?v=2&w=300&h=300")));
    });
}

criterion_group!(benches, bench_listing_extraction, bench_page_count, bench_url_normalization);
criterion_main!(benches);
