mod common;

use shortlink::domain::repositories::UrlRepository;

#[tokio::test]
async fn test_delete_success() {
    let (server, repository) = common::create_test_server();
    repository
        .save("https://example.com/old", "bye")
        .await
        .unwrap();

    let response = server
        .delete("/bye")
        .add_header("Authorization", common::AUTH_HEADER)
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "OK");
    assert_eq!(json["url"], "https://example.com/old");

    assert!(!repository.exists("bye").await.unwrap());
    server.get("/bye").await.assert_status_not_found();
}

#[tokio::test]
async fn test_delete_not_found() {
    let (server, _repository) = common::create_test_server();

    let response = server
        .delete("/missing")
        .add_header("Authorization", common::AUTH_HEADER)
        .await;

    response.assert_status_not_found();
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "not_found"
    );
}

#[tokio::test]
async fn test_delete_twice() {
    let (server, repository) = common::create_test_server();
    repository.save("https://example.com", "once").await.unwrap();

    server
        .delete("/once")
        .add_header("Authorization", common::AUTH_HEADER)
        .await
        .assert_status_ok();

    server
        .delete("/once")
        .add_header("Authorization", common::AUTH_HEADER)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_delete_requires_auth() {
    let (server, repository) = common::create_test_server();
    repository.save("https://example.com", "keep").await.unwrap();

    let response = server.delete("/keep").await;

    response.assert_status_unauthorized();
    assert!(repository.exists("keep").await.unwrap());
}

#[tokio::test]
async fn test_alias_reusable_after_delete() {
    let (server, repository) = common::create_test_server();
    repository.save("https://example.com/1", "again").await.unwrap();

    server
        .delete("/again")
        .add_header("Authorization", common::AUTH_HEADER)
        .await
        .assert_status_ok();

    server
        .post("/url")
        .add_header("Authorization", common::AUTH_HEADER)
        .json(&serde_json::json!({ "url": "https://example.com/2", "alias": "again" }))
        .await
        .assert_status_ok();

    assert_eq!(
        server.get("/again").await.header("location"),
        "https://example.com/2"
    );
}
