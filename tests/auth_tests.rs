//! Sign-in flow against a mock auction site
mod common;

use auction_crawler_lib::infrastructure::{AuthError, Authenticator, Credentials};
use common::{
    ACCOUNT_PATH, EMAIL, POST_SIGN_IN_PATH, SIGN_IN_PATH, TOKEN, config_for, mount_login, sign_in_page,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn login_returns_session_after_redirect_and_marker() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let config = config_for(&server, 0);

    let session = Authenticator::from_config(&config)
        .login(&config.credentials)
        .await
        .unwrap();

    // sign-in page, POST, redirect target, account page
    assert_eq!(session.requests_issued(), 4);
}

#[tokio::test]
async fn missing_token_fails_before_posting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(sign_in_page(None)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/client/home"))
        .expect(0)
        .mount(&server)
        .await;
    let config = config_for(&server, 0);

    let err = Authenticator::from_config(&config)
        .login(&config.credentials)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::TokenMissing { ref field } if field == "_csrfToken"));
}

#[tokio::test]
async fn rejected_credentials_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(sign_in_page(Some(TOKEN))))
        .mount(&server)
        .await;
    // The site re-renders the form instead of redirecting
    Mock::given(method("POST"))
        .and(path(POST_SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(sign_in_page(Some(TOKEN))))
        .mount(&server)
        .await;
    let mut config = config_for(&server, 0);
    config.credentials = Credentials::new(EMAIL, "wrong");

    let err = Authenticator::from_config(&config)
        .login(&config.credentials)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentialsOrSession { .. }));
}

#[tokio::test]
async fn account_page_without_marker_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(sign_in_page(Some(TOKEN))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(POST_SIGN_IN_PATH))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", SIGN_IN_PATH))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", SIGN_IN_PATH))
        .mount(&server)
        .await;
    let config = config_for(&server, 0);

    let err = Authenticator::from_config(&config)
        .login(&config.credentials)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentialsOrSession { .. }));
}

#[tokio::test]
async fn each_login_gets_an_independent_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let config = config_for(&server, 0);
    let authenticator = Authenticator::from_config(&config);

    let first = authenticator.login(&config.credentials).await.unwrap();
    let second = authenticator.login(&config.credentials).await.unwrap();

    assert_eq!(first.requests_issued(), 4);
    assert_eq!(second.requests_issued(), 4);
}
