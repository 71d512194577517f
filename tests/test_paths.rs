mod common;

use http::{header, Method, StatusCode};
use pathpoints::testing::StubServer;
use serde_json::{json, Value};

use common::{create_path, create_point, signup_and_login};

#[tokio::test]
async fn test_create_path_embeds_owner_and_ignores_spoofed_admin() {
    let server = StubServer::new().await;
    let (jane_id, _) = signup_and_login(&server, "jane").await;
    let (john_id, john_token) = signup_and_login(&server, "john").await;

    let response = server
        .send(
            Method::POST,
            "/paths",
            Some(john_token.as_str()),
            Some(json!({
                "name": "alice doe",
                "description": "d",
                "duration": "3 days",
                "admin_id": jane_id,
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let path: Value = StubServer::deserialize_response(response).await;
    assert_eq!(path["name"], "Alice Doe");
    assert_eq!(path["admin_id"], john_id);
    assert_eq!(path["duration"], "3 days");
    assert_eq!(path["user"]["name"], "John Walker");
    assert_eq!(path["user"]["email"], "john@example.com");
}

#[tokio::test]
async fn test_create_path_rejects_unknown_keys() {
    let server = StubServer::new().await;
    let (_, token) = signup_and_login(&server, "jane").await;

    let response = server
        .send(
            Method::POST,
            "/paths",
            Some(token.as_str()),
            Some(json!({ "name": "camino", "description": "d", "color": "red" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = StubServer::deserialize_response(response).await;
    assert_eq!(body["msg"], "wrong keys were sent");
    assert!(body["valid_keys"]
        .as_array()
        .unwrap()
        .contains(&json!("initial_date")));
    assert!(body["received_keys"]
        .as_array()
        .unwrap()
        .contains(&json!("color")));
}

#[tokio::test]
async fn test_create_path_rejects_wrong_types() {
    let server = StubServer::new().await;
    let (_, token) = signup_and_login(&server, "jane").await;

    let response = server
        .send(
            Method::POST,
            "/paths",
            Some(token.as_str()),
            Some(json!({ "name": 12, "description": "d" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = StubServer::deserialize_response(response).await;
    assert_eq!(body["msg"], "key: name must be string!");
}

#[tokio::test]
async fn test_only_owner_updates_path() {
    let server = StubServer::new().await;
    let (_, jane_token) = signup_and_login(&server, "jane").await;
    let (_, john_token) = signup_and_login(&server, "john").await;
    let path = create_path(&server, &jane_token, "camino").await;
    let uri = format!("/paths/{}", path["id"]);

    let response = server
        .send(
            Method::PATCH,
            &uri,
            Some(john_token.as_str()),
            Some(json!({ "name": "mine now" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = server
        .send(
            Method::PATCH,
            &uri,
            Some(jane_token.as_str()),
            Some(json!({ "admin_id": 2 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .send(
            Method::PATCH,
            &uri,
            Some(jane_token.as_str()),
            Some(json!({ "end_date": "2024-08-01" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = StubServer::deserialize_response(response).await;
    assert_eq!(updated["end_date"], "2024-08-01");
    assert_eq!(updated["name"], "Camino");
}

#[tokio::test]
async fn test_missing_path_messages() {
    let server = StubServer::new().await;
    let (_, token) = signup_and_login(&server, "jane").await;

    let response = server
        .send(
            Method::PATCH,
            "/paths/999",
            Some(token.as_str()),
            Some(json!({ "name": "x" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = StubServer::deserialize_response(response).await;
    assert_eq!(body, json!({ "msg": "Not found" }));

    let response = server
        .send(Method::DELETE, "/paths/999", Some(token.as_str()), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = StubServer::deserialize_response(response).await;
    assert_eq!(body, json!({ "msg": "ID Not Found" }));
}

#[tokio::test]
async fn test_delete_path() {
    let server = StubServer::new().await;
    let (_, token) = signup_and_login(&server, "jane").await;
    let path = create_path(&server, &token, "camino").await;
    let uri = format!("/paths/{}", path["id"]);

    let response = server.send(Method::DELETE, &uri, Some(token.as_str()), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server.send(Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subscribers() {
    let server = StubServer::new().await;
    let (_, jane_token) = signup_and_login(&server, "jane").await;
    let (john_id, john_token) = signup_and_login(&server, "john").await;
    let path = create_path(&server, &jane_token, "camino").await;
    let uri = format!("/paths/{}/subscribers", path["id"]);

    for _ in 0..2 {
        let response = server.send(Method::POST, &uri, Some(john_token.as_str()), None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = server.send(Method::GET, &uri, None, None).await;
    let subscribers: Value = StubServer::deserialize_response(response).await;
    assert_eq!(subscribers.as_array().unwrap().len(), 1);
    assert_eq!(subscribers[0]["user_id"], john_id);

    let response = server
        .send(Method::DELETE, &uri, Some(john_token.as_str()), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server
        .send(Method::DELETE, &uri, Some(john_token.as_str()), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_attach_and_detach_points() {
    let server = StubServer::new().await;
    let (_, jane_token) = signup_and_login(&server, "jane").await;
    let (_, john_token) = signup_and_login(&server, "john").await;
    let path = create_path(&server, &jane_token, "camino").await;
    let point = create_point(&server, &jane_token, "obradoiro").await;
    let uri = format!("/paths/{}/points", path["id"]);

    let response = server
        .send(
            Method::POST,
            &uri,
            Some(john_token.as_str()),
            Some(json!({ "point_id": point["id"] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = server
        .send(
            Method::POST,
            &uri,
            Some(jane_token.as_str()),
            Some(json!({ "point_id": point["id"] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let detail: Value = StubServer::deserialize_response(response).await;
    assert_eq!(detail["points"][0]["name"], "Obradoiro");

    let detach = format!("{uri}/{}", point["id"]);
    let response = server
        .send(Method::DELETE, &detach, Some(jane_token.as_str()), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server
        .send(Method::GET, &format!("/paths/{}", path["id"]), None, None)
        .await;
    let detail: Value = StubServer::deserialize_response(response).await;
    assert!(detail["points"].as_array().unwrap().is_empty());

    let response = server
        .send(Method::DELETE, &detach, Some(jane_token.as_str()), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_path_returns_detail() {
    let server = StubServer::new().await;
    let (_, jane_token) = signup_and_login(&server, "jane").await;
    let (john_id, john_token) = signup_and_login(&server, "john").await;
    let path = create_path(&server, &jane_token, "camino").await;
    let point = create_point(&server, &jane_token, "obradoiro").await;

    let response = server
        .send(
            Method::POST,
            &format!("/paths/{}/points", path["id"]),
            Some(jane_token.as_str()),
            Some(json!({ "point_id": point["id"] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = server
        .send(
            Method::POST,
            &format!("/paths/{}/subscribers", path["id"]),
            Some(john_token.as_str()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = server
        .send(Method::GET, &format!("/paths/{}", path["id"]), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail: Value = StubServer::deserialize_response(response).await;
    assert_eq!(detail["id"], path["id"]);
    assert_eq!(detail["name"], "Camino");
    assert_eq!(detail["points"][0]["id"], point["id"]);
    assert_eq!(detail["subscribers"][0]["user_id"], john_id);
}

#[tokio::test]
async fn test_update_path_checks_owner_before_fields() {
    let server = StubServer::new().await;
    let (_, jane_token) = signup_and_login(&server, "jane").await;
    let (_, john_token) = signup_and_login(&server, "john").await;
    let path = create_path(&server, &jane_token, "camino").await;

    let response = server
        .send(
            Method::PATCH,
            &format!("/paths/{}", path["id"]),
            Some(john_token.as_str()),
            Some(json!({ "bogus": 1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = server
        .send(
            Method::PATCH,
            "/paths/999",
            Some(john_token.as_str()),
            Some(json!({ "bogus": 1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = StubServer::deserialize_response(response).await;
    assert_eq!(body, json!({ "msg": "Not found" }));
}

#[tokio::test]
async fn test_deleted_user_token_cannot_create() {
    let server = StubServer::new().await;
    let (jane_id, jane_token) = signup_and_login(&server, "jane").await;
    let (_, john_token) = signup_and_login(&server, "john").await;
    let path = create_path(&server, &john_token, "camino").await;

    let response = server
        .send(Method::DELETE, &format!("/user/{jane_id}"), Some(jane_token.as_str()), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server
        .send(
            Method::POST,
            "/paths",
            Some(jane_token.as_str()),
            Some(json!({ "name": "ghost", "description": "a walk" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = StubServer::deserialize_response(response).await;
    assert_eq!(body, json!({ "msg": "User not found" }));

    let response = server
        .send(
            Method::POST,
            &format!("/paths/{}/subscribers", path["id"]),
            Some(jane_token.as_str()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.send(Method::GET, "/paths", None, None).await;
    let paths: Value = StubServer::deserialize_response(response).await;
    assert_eq!(paths.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_trailing_slash_is_trimmed() {
    let server = StubServer::new().await;
    let (_, token) = signup_and_login(&server, "jane").await;
    create_path(&server, &token, "camino").await;

    let response = server.send(Method::GET, "/paths/", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let paths: Value = StubServer::deserialize_response(response).await;
    assert_eq!(paths.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_content_has_no_content_type() {
    let server = StubServer::new().await;
    let (_, token) = signup_and_login(&server, "jane").await;
    let path = create_path(&server, &token, "camino").await;

    let response = server
        .send(Method::DELETE, &format!("/paths/{}", path["id"]), Some(token.as_str()), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get(header::CONTENT_TYPE).is_none());

    let response = server.send(Method::GET, "/paths", None, None).await;
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
}
