//! Shared wiremock fixtures for the auction site
#![allow(dead_code)]

use auction_crawler_lib::AppConfig;
use auction_crawler_lib::infrastructure::Credentials;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "tok-4f2a9c";
pub const EMAIL: &str = "buyer@example.com";
pub const PASSWORD: &str = "secret";

pub const SIGN_IN_PATH: &str = "/client/users/sign-in";
pub const POST_SIGN_IN_PATH: &str = "/client/users/post-sign-in";
pub const ACCOUNT_PATH: &str = "/client/users";
pub const RESULTS_PATH: &str = "/client/auctions/inspect";

pub fn config_for(server: &MockServer, delay_ms: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.site.base_url = server.uri();
    config.credentials = Credentials::new(EMAIL, PASSWORD);
    config.crawling.page_delay_ms = delay_ms;
    config.crawling.request_timeout_seconds = 5;
    config.assets.download_timeout_seconds = 5;
    config.assets.max_concurrent_downloads = 3;
    config
}

pub fn sign_in_page(token: Option<&str>) -> String {
    let token_input = token.map_or_else(String::new, |token| {
        format!(r#"<input type="hidden" name="_csrfToken" autocomplete="off" value="{token}">"#)
    });
    format!(
        r#"<html><body><form method="post" action="{POST_SIGN_IN_PATH}">
            <input type="hidden" name="_method" value="POST">{token_input}
            <input type="email" name="email_address"><input type="password" name="password">
        </form></body></html>"#
    )
}

pub const ACCOUNT_PAGE: &str = r#"<html><body><h2>アカウント情報</h2>
    <ul class="nav"><li><a href="/client/users/sign-out">ログアウト</a></li></ul></body></html>"#;

/// Mount sign-in page, credential POST and account page for a successful login
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(sign_in_page(Some(TOKEN))))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(POST_SIGN_IN_PATH))
        .and(body_string_contains(format!("_csrfToken={TOKEN}")))
        .and(body_string_contains("email_address=buyer%40example.com"))
        .and(body_string_contains("remember-me=remember-me"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/client/home"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/client/home"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>home</html>"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(ACCOUNT_PAGE))
        .mount(server)
        .await;
}

/// One result card as the grid renders it
pub fn card(brand: &str, title: &str, rank: &str, image_src: &str) -> String {
    format!(
        r#"<div class="col-sm-6 col-md-4 col-lg-3 mb-grid-card">
            <div class="card">
                <div class="item-image item-image-min pc-image-area"><img src="{image_src}" alt=""></div>
                <div class="card-body">
                    <small class="show-case-bland">{brand}</small>
                    <p><b>{title}</b></p>
                    <ul class="canopy canopy-3 text-default">
                        <li><big class="canopy-value">ランク</big>{rank}</li>
                        <li><big class="canopy-value">35,000</big>円</li>
                        <li><big class="canopy-value">0</big>入札</li>
                    </ul>
                    <span class="market-title">10/25 (金) 13:00</span>
                </div>
            </div>
        </div>"#
    )
}

pub fn results_page(total_pages: u32, cards: &[String]) -> String {
    let pagination = if total_pages > 1 {
        let links: String = (1..=total_pages)
            .map(|page| format!(r#"<li><a href="?page={page}">{page}</a></li>"#))
            .collect();
        format!(r#"<ul class="pagination"><li><a href="?page=1">&laquo;</a></li>{links}</ul>"#)
    } else {
        String::new()
    };
    format!(
        r#"<html><body><div class="row">{}</div>{}</body></html>"#,
        cards.concat(),
        pagination
    )
}

pub fn image_url(server: &MockServer, name: &str) -> String {
    format!("{}/img/items/{name}?w=300&h=300", server.uri())
}
