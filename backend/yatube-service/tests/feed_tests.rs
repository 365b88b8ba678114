#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::Value;

use common::{location, TestContext};
use yatube_service::config::FeedConfig;

fn uncached() -> FeedConfig {
    FeedConfig {
        cache_enabled: false,
        ..FeedConfig::default()
    }
}

fn texts(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["text"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_group_feed_pagination_is_exact() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let author = ctx.user("leo").await;
    let cats = ctx.group("cats").await;
    for i in 0..13 {
        ctx.post(&author, &format!("cat {}", i), Some(cats)).await;
    }

    let first: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/group/cats/").to_request(),
    )
    .await;
    assert_eq!(first["page"]["items"].as_array().unwrap().len(), 10);
    assert_eq!(first["page"]["num_pages"], 2);
    assert_eq!(first["page"]["has_next"], true);
    assert_eq!(first["group"]["slug"], "cats");

    let second: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/group/cats/?page=2")
            .to_request(),
    )
    .await;
    assert_eq!(second["page"]["items"].as_array().unwrap().len(), 3);
    assert_eq!(second["page"]["has_previous"], true);

    let third: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/group/cats/?page=3")
            .to_request(),
    )
    .await;
    assert_eq!(third["page"]["number"], 2);
    assert_eq!(third["page"]["items"], second["page"]["items"]);

    let garbage: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/group/cats/?page=abc")
            .to_request(),
    )
    .await;
    assert_eq!(garbage["page"]["number"], 1);
}

#[actix_web::test]
async fn test_unknown_group_and_profile_are_404() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/group/nope/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/profile/ghost/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_global_feed_is_newest_first() {
    let ctx = TestContext::with_feed_config(uncached());
    let app = test_app!(ctx);
    let author = ctx.user("leo").await;
    for text in ["one", "two", "three"] {
        ctx.post(&author, text, None).await;
    }

    let page: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(texts(&page), vec!["three", "two", "one"]);
}

#[actix_web::test]
async fn test_empty_feed_has_one_empty_page() {
    let ctx = TestContext::with_feed_config(uncached());
    let app = test_app!(ctx);

    let page: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=9").to_request(),
    )
    .await;
    assert_eq!(page["number"], 1);
    assert_eq!(page["num_pages"], 1);
    assert!(page["items"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_followed_feed_requires_login() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/follow/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Ffollow%2F");
}

#[actix_web::test]
async fn test_followed_feed_is_empty_then_exact() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let reader = ctx.user("reader").await;
    let favourite = ctx.user("favourite").await;
    let other = ctx.user("other").await;
    ctx.post(&favourite, "from favourite", None).await;
    ctx.post(&other, "from other", None).await;

    let page: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .insert_header(ctx.bearer(&reader))
            .to_request(),
    )
    .await;
    assert!(page["items"].as_array().unwrap().is_empty());

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/profile/favourite/follow/")
            .insert_header(ctx.bearer(&reader))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/favourite/");

    let page: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .insert_header(ctx.bearer(&reader))
            .to_request(),
    )
    .await;
    assert_eq!(texts(&page), vec!["from favourite"]);
}

#[actix_web::test]
async fn test_profile_reports_live_following_flag() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let reader = ctx.user("reader").await;
    let author = ctx.user("author").await;
    ctx.post(&author, "hello", None).await;

    let profile: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/author/")
            .insert_header(ctx.bearer(&reader))
            .to_request(),
    )
    .await;
    assert_eq!(profile["following"], false);
    assert_eq!(profile["post_count"], 1);

    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/profile/author/follow/")
            .insert_header(ctx.bearer(&reader))
            .to_request(),
    )
    .await;

    let profile: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/author/")
            .insert_header(ctx.bearer(&reader))
            .to_request(),
    )
    .await;
    assert_eq!(profile["following"], true);
    assert_eq!(profile["follower_count"], 1);

    let anonymous: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/profile/author/").to_request(),
    )
    .await;
    assert_eq!(anonymous["following"], false);
}
