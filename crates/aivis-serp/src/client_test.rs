use super::*;

#[test]
fn build_url_appends_api_key_and_params() {
    let client = SerpClient::with_base_url("test-key", 7, "https://provider.test").unwrap();
    let url = client.build_url(&[("engine", "google"), ("q", "best crm software")]);

    assert_eq!(url.path(), "/search");
    let query = url.query().unwrap();
    assert!(query.contains("api_key=test-key"));
    assert!(query.contains("engine=google"));
    assert!(query.contains("q=best+crm+software"));
}

#[test]
fn base_url_trailing_slashes_are_normalised() {
    let client = SerpClient::with_base_url("k", 7, "https://provider.test///").unwrap();
    let url = client.build_url(&[]);
    assert_eq!(url.as_str().matches("//").count(), 1, "only the scheme separator");
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = SerpClient::with_base_url("k", 7, "not a url");
    assert!(matches!(result, Err(SerpError::InvalidBaseUrl { .. })));
}
