mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use common::TestServer;

async fn post_likes(server: &TestServer, post_id: i64) -> Result<i64> {
    let body = server
        .client
        .get(server.url(&format!("/posts/{}", post_id)))
        .send()
        .await?
        .json::<Value>()
        .await?;
    Ok(body["post"]["likes"].as_i64().unwrap())
}

#[tokio::test]
async fn each_like_adds_exactly_one() -> Result<()> {
    let server = TestServer::start().await?;
    let post = server.create_post("u1", "Topic", "Body").await?;
    let post_id = post["id"].as_i64().unwrap();

    for expected in 1..=2 {
        let res = server
            .client
            .post(server.url(&format!("/posts/{}/like", post_id)))
            .header("Authorization", server.bearer("u2"))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body = res.json::<Value>().await?;
        assert_eq!(body["message"], "Post liked successfully");
        assert_eq!(post_likes(&server, post_id).await?, expected);
    }

    Ok(())
}

#[tokio::test]
async fn concurrent_likes_are_not_lost() -> Result<()> {
    let server = TestServer::start().await?;
    let post = server.create_post("u1", "Topic", "Body").await?;
    let post_id = post["id"].as_i64().unwrap();

    let likes = (0..10).map(|i| {
        server
            .client
            .post(server.url(&format!("/posts/{}/like", post_id)))
            .header("Authorization", server.bearer(&format!("fan{}", i)))
            .send()
    });
    for res in futures::future::join_all(likes).await {
        assert_eq!(res?.status(), StatusCode::OK);
    }

    assert_eq!(post_likes(&server, post_id).await?, 10);

    Ok(())
}

#[tokio::test]
async fn like_comment() -> Result<()> {
    let server = TestServer::start().await?;
    let post = server.create_post("u1", "Topic", "Body").await?;
    let comment = server.create_comment("u2", post["id"].as_i64().unwrap(), "hi").await?;

    let res = server
        .client
        .post(server.url(&format!("/comments/{}/like", comment["id"])))
        .header("Authorization", server.bearer("u3"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["message"], "Comment liked successfully");

    Ok(())
}

#[tokio::test]
async fn liking_missing_resources_is_not_found() -> Result<()> {
    let server = TestServer::start().await?;

    for (path, message) in [("/posts/77/like", "Post not found"), ("/comments/77/like", "Comment not found")] {
        let res = server
            .client
            .post(server.url(path))
            .header("Authorization", server.bearer("u1"))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.json::<Value>().await?["message"], message);
    }

    Ok(())
}
