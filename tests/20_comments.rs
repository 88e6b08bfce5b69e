mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

#[tokio::test]
async fn comment_on_existing_post() -> Result<()> {
    let server = TestServer::start().await?;
    let post = server.create_post("u1", "Topic", "Body").await?;
    let post_id = post["id"].as_i64().unwrap();

    let res = server
        .client
        .post(server.url(&format!("/posts/{}/comments", post_id)))
        .header("Authorization", server.bearer("u2"))
        .json(&json!({ "content": "Nice", "authorName": "Bo" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["comment"]["post_id"], post_id);
    assert_eq!(body["comment"]["author_id"], "u2");
    assert_eq!(body["comment"]["author_name"], "Bo");
    assert_eq!(body["comment"]["likes"], 0);

    Ok(())
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/posts/4242/comments"))
        .header("Authorization", server.bearer("u2"))
        .json(&json!({ "content": "Hello?" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["message"], "Post not found");

    Ok(())
}

#[tokio::test]
async fn blank_comment_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let post = server.create_post("u1", "Topic", "Body").await?;

    let res = server
        .client
        .post(server.url(&format!("/posts/{}/comments", post["id"])))
        .header("Authorization", server.bearer("u2"))
        .json(&json!({ "content": "   " }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Comment content is required");
    assert_eq!(body["field_errors"]["content"], "This field is required");

    Ok(())
}

#[tokio::test]
async fn deleting_a_post_removes_its_comments() -> Result<()> {
    let server = TestServer::start().await?;
    let post = server.create_post("u1", "Topic", "Body").await?;
    let post_id = post["id"].as_i64().unwrap();
    let comment = server.create_comment("u2", post_id, "soon gone").await?;

    let res = server
        .client
        .delete(server.url(&format!("/posts/{}", post_id)))
        .header("Authorization", server.bearer("u1"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // The comment went with the post, so liking it now finds nothing
    let res = server
        .client
        .post(server.url(&format!("/comments/{}/like", comment["id"])))
        .header("Authorization", server.bearer("u3"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}
