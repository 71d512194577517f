#![allow(dead_code)]

use http::{Method, StatusCode};
use pathpoints::testing::StubServer;
use serde_json::{json, Value};

pub const PASSWORD: &str = "long enough";

/// Signs up `username` and logs in, returning the new user's id and token.
pub async fn signup_and_login(server: &StubServer, username: &str) -> (i64, String) {
    let email = format!("{username}@example.com");
    let response = server
        .send(
            Method::POST,
            "/signup",
            None,
            Some(json!({
                "name": format!("{username} walker"),
                "username": username,
                "email": email,
                "birthdate": "1990-01-01",
                "password": PASSWORD,
                "password_confirmation": PASSWORD,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: Value = StubServer::deserialize_response(response).await;

    let response = server
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": email, "password": PASSWORD })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let login: Value = StubServer::deserialize_response(response).await;

    (
        user["id"].as_i64().unwrap(),
        login["access_token"].as_str().unwrap().to_owned(),
    )
}

pub async fn create_path(server: &StubServer, token: &str, name: &str) -> Value {
    let response = server
        .send(
            Method::POST,
            "/paths",
            Some(token),
            Some(json!({ "name": name, "description": "a walk" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    StubServer::deserialize_response(response).await
}

pub async fn create_point(server: &StubServer, token: &str, name: &str) -> Value {
    let response = server
        .send(
            Method::POST,
            "/points",
            Some(token),
            Some(json!({ "name": name, "latitude": 42.88, "longitude": -8.54 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    StubServer::deserialize_response(response).await
}
