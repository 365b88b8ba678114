#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use common::{location, TestContext};
use yatube_service::db::ContentStore;
use yatube_service::models::{NewPost, PostFilter};

#[actix_web::test]
async fn test_create_post_redirects_to_profile() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let author = ctx.user("leo").await;
    let group = ctx.group("cats").await;
    let group_field = group.to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .insert_header(ctx.bearer(&author))
            .set_form([("text", "hello cats"), ("group", group_field.as_str())])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/leo/");

    let posts = ctx.store.list_posts(PostFilter::All, 10, 0).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].group_id, Some(group));
}

#[actix_web::test]
async fn test_create_post_with_empty_text_is_rejected() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let author = ctx.user("leo").await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .insert_header(ctx.bearer(&author))
            .set_form([("text", ""), ("group", "")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["fields"]["text"][0], "This field is required.");

    assert_eq!(ctx.store.count_posts(PostFilter::All).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_anonymous_create_redirects_to_login() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .set_form([("text", "hello")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Fcreate%2F");
}

#[actix_web::test]
async fn test_non_author_edit_redirects_to_detail() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let author = ctx.user("author").await;
    let intruder = ctx.user("intruder").await;
    let post = ctx.post(&author, "original", None).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", post.id))
            .insert_header(ctx.bearer(&intruder))
            .set_form([("text", "defaced")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let unchanged = ctx.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.text, "original");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", post.id))
            .insert_header(ctx.bearer(&author))
            .set_form([("text", "revised")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let revised = ctx.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(revised.text, "revised");
    assert_eq!(revised.pub_date, post.pub_date);
}

#[actix_web::test]
async fn test_edit_form_without_image_keeps_it() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let author = ctx.user("author").await;
    let post = ctx
        .store
        .create_post(&NewPost {
            author_id: author.id,
            text: "with picture".into(),
            group_id: None,
            image: Some("posts/cat.png".into()),
        })
        .await
        .unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", post.id))
            .insert_header(ctx.bearer(&author))
            .set_form([("text", "new caption")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let edited = ctx.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(edited.text, "new caption");
    assert_eq!(edited.image.as_deref(), Some("posts/cat.png"));
}

#[actix_web::test]
async fn test_comment_and_like_show_on_detail() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let author = ctx.user("author").await;
    let reader = ctx.user("reader").await;
    let post = ctx.post(&author, "post", None).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", post.id))
            .insert_header(ctx.bearer(&reader))
            .set_form([("text", "great post")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/posts/{}/like/", post.id))
                .insert_header(ctx.bearer(&reader))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    let detail: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", post.id))
            .insert_header(ctx.bearer(&reader))
            .to_request(),
    )
    .await;
    assert_eq!(detail["comments"][0]["text"], "great post");
    assert_eq!(detail["comments"][0]["author_username"], "reader");
    assert_eq!(detail["like_count"], 1);
    assert_eq!(detail["liked"], true);
    assert_eq!(detail["author_post_count"], 1);
}

#[actix_web::test]
async fn test_comment_on_missing_post_is_404() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let reader = ctx.user("reader").await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/9999/comment/")
            .insert_header(ctx.bearer(&reader))
            .set_form([("text", "hello?")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_follow_is_idempotent_and_unfollow_is_noop_when_absent() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let reader = ctx.user("reader").await;
    let author = ctx.user("author").await;

    for _ in 0..3 {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/profile/author/follow/")
                .insert_header(ctx.bearer(&reader))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }
    assert_eq!(ctx.store.count_followers(author.id).await.unwrap(), 1);

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/profile/author/unfollow/")
                .insert_header(ctx.bearer(&reader))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/profile/author/");
    }
    assert_eq!(ctx.store.count_followers(author.id).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_api_post_lifecycle() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);
    let author = ctx.user("author").await;
    let other = ctx.user("other").await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/posts/")
            .set_json(json!({ "text": "anonymous" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/posts/")
            .insert_header(ctx.bearer(&author))
            .set_json(json!({ "text": "via api" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["author_username"], "author");

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/posts/{}/", id))
            .insert_header(ctx.bearer(&other))
            .set_json(json!({ "text": "hijack" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let patched: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/posts/{}/", id))
            .insert_header(ctx.bearer(&author))
            .set_json(json!({ "text": "edited" }))
            .to_request(),
    )
    .await;
    assert_eq!(patched["text"], "edited");

    let listed: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/v1/posts/").to_request(),
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/posts/{}/", id))
            .insert_header(ctx.bearer(&author))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/posts/{}/", id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_signup_token_authenticates() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/signup/")
            .set_json(json!({ "username": "newbie" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/signup/")
            .set_json(json!({ "username": "newbie" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
