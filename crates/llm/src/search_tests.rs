#![expect(clippy::unwrap_used, reason = "test code")]

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::search::{DisabledSearch, SearxSearch, WebSearch};

#[tokio::test]
async fn searx_results_are_mapped_and_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust ownership"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {"url": "https://doc.rust-lang.org/book/ch04-00.html", "title": "Ownership", "content": "What is ownership?"},
                {"url": "javascript:alert(1)", "title": "bad", "content": ""},
                {"url": "https://example.com/a", "title": "", "content": " A "},
                {"url": "https://example.com/b", "title": "B", "content": "B"}
            ]
        })))
        .mount(&server)
        .await;

    let search = SearxSearch::new(&server.uri()).unwrap();
    let hits = search.search("rust ownership", 2).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title, "Ownership");
    assert_eq!(hits[1].title, "https://example.com/a");
    assert_eq!(hits[1].snippet, "A");
}

#[tokio::test]
async fn searx_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let search = SearxSearch::new(&server.uri()).unwrap();
    let err = search.search("anything", 5).await.unwrap_err();

    assert!(err.is_transient());
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn disabled_search_finds_nothing() {
    assert!(DisabledSearch.search("news", 5).await.unwrap().is_empty());
}
