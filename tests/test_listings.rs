//! Listing search pagination against a scripted API.

mod common;

use common::{page, query, summary, FakeApi, PageResponse};
use listing_trends::client::search_url;
use listing_trends::{ListingFetcher, SearchQuery, TrendsError};

// ---------------------------------------------------------------------------
// fetch_all
// ---------------------------------------------------------------------------

#[test]
fn zero_total_returns_empty_after_one_call() {
    let api = FakeApi::new(vec![page(vec![], 0), page(vec![summary("x", "1", "")], 1)]);
    let outcome = ListingFetcher::new(&api, query("Acme", 200)).fetch_all();

    assert!(outcome.items.is_empty());
    assert!(outcome.error.is_none());
    assert_eq!(api.search_calls(), 1);
}

#[test]
fn paginates_until_offset_reaches_total() {
    let api = FakeApi::new(vec![
        page(vec![summary("a", "1", ""), summary("b", "2", "")], 5),
        page(vec![summary("c", "3", ""), summary("d", "4", "")], 5),
        page(vec![summary("e", "5", "")], 5),
    ]);
    let outcome = ListingFetcher::new(&api, query("Acme", 2)).fetch_all();

    let ids: Vec<&str> = outcome.items.iter().map(|s| s.item_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(outcome.pages, 3);
    assert_eq!(*api.search_offsets.borrow(), vec![0, 2, 4]);
}

#[test]
fn total_equal_to_page_size_stops_after_first_page() {
    let api = FakeApi::new(vec![page(vec![summary("a", "1", ""), summary("b", "1", "")], 2)]);
    let outcome = ListingFetcher::new(&api, query("Acme", 2)).fetch_all();

    assert_eq!(outcome.items.len(), 2);
    assert_eq!(api.search_calls(), 1);
}

#[test]
fn first_call_error_returns_empty_with_error() {
    let api = FakeApi::new(vec![PageResponse::Status(500)]);
    let outcome = ListingFetcher::new(&api, query("Acme", 200)).fetch_all();

    assert!(outcome.items.is_empty());
    assert_eq!(outcome.pages, 0);
    assert!(matches!(
        outcome.error,
        Some(TrendsError::Fetch { status: 500, .. })
    ));
    assert_eq!(api.search_calls(), 1);
}

#[test]
fn mid_pagination_error_keeps_collected_items() {
    let api = FakeApi::new(vec![
        page(vec![summary("a", "1", ""), summary("b", "2", "")], 6),
        PageResponse::Status(503),
        page(vec![summary("c", "3", "")], 6),
    ]);
    let outcome = ListingFetcher::new(&api, query("Acme", 2)).fetch_all();

    assert_eq!(outcome.items.len(), 2);
    assert!(outcome.error.is_some());
    // no retry after the failure
    assert_eq!(api.search_calls(), 2);
}

#[test]
fn expired_token_is_reported_as_token_expired() {
    let api = FakeApi::new(vec![
        page(vec![summary("a", "1", "")], 3),
        PageResponse::Status(401),
    ]);
    let outcome = ListingFetcher::new(&api, query("Acme", 1)).fetch_all();

    let err = outcome.error.expect("pagination should have failed");
    assert!(err.is_token_expired());
    assert_eq!(outcome.items.len(), 1);
}

// ---------------------------------------------------------------------------
// pages (lazy)
// ---------------------------------------------------------------------------

#[test]
fn pages_are_requested_lazily() {
    let api = FakeApi::new(vec![
        page(vec![summary("a", "1", "")], 3),
        page(vec![summary("b", "1", "")], 3),
        page(vec![summary("c", "1", "")], 3),
    ]);
    let fetcher = ListingFetcher::new(&api, query("Acme", 1));
    let mut pages = fetcher.pages();

    let first = pages.next().unwrap().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(api.search_calls(), 1);
    assert_eq!(pages.offset(), 1);
}

#[test]
fn pages_end_after_error() {
    let api = FakeApi::new(vec![PageResponse::Status(500), page(vec![], 0)]);
    let fetcher = ListingFetcher::new(&api, query("Acme", 10));
    let mut pages = fetcher.pages();

    assert!(pages.next().unwrap().is_err());
    assert!(pages.next().is_none());
    assert_eq!(api.search_calls(), 1);
}

#[test]
fn reset_restarts_from_offset_zero() {
    let api = FakeApi::new(vec![page(vec![], 0), page(vec![], 0)]);
    let fetcher = ListingFetcher::new(&api, query("Acme", 10));
    let mut pages = fetcher.pages();

    assert!(pages.next().is_some());
    assert!(pages.next().is_none());
    pages.reset();
    assert!(pages.next().is_some());
    assert_eq!(*api.search_offsets.borrow(), vec![0, 0]);
}

// ---------------------------------------------------------------------------
// SearchQuery / search_url
// ---------------------------------------------------------------------------

#[test]
fn search_query_rejects_blank_brand_and_zero_page_size() {
    assert!(matches!(
        SearchQuery::new("63861", "  ", 10),
        Err(TrendsError::InvalidArgument(_))
    ));
    assert!(matches!(
        SearchQuery::new("63861", "Acme", 0),
        Err(TrendsError::InvalidArgument(_))
    ));
}

#[test]
fn search_url_carries_brand_category_and_offset() {
    let url = search_url("https://api.example.com/buy/browse/v1/", &query("Acme Co", 200), 400)
        .unwrap();

    assert_eq!(url.path(), "/buy/browse/v1/item_summary/search");
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("q".to_string(), "Acme Co".to_string()),
            ("limit".to_string(), "200".to_string()),
            ("offset".to_string(), "400".to_string()),
            (
                "aspect_filter".to_string(),
                "categoryId:63861,Brand:{Acme Co}".to_string()
            ),
            ("category_ids".to_string(), "63861".to_string()),
        ]
    );
}
