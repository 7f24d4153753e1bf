mod support;

use serde_json::{Value, json};
use std::sync::Arc;
use support::server_with_players;
use town_friends::api;
use town_friends::server::Server;
use warp::Filter;
use warp::http::StatusCode;

async fn call(
    server: &Arc<Server>,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let filter = api::routes(server.clone()).recover(api::recover_error);
    let mut request = warp::test::request().method(method).path(path);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.reply(&filter).await;
    let value = serde_json::from_slice(response.body()).expect("json body");
    (response.status(), value)
}

fn pair(from: &str, to: &str) -> Option<Value> {
    Some(json!({ "fromPlayerName": from, "toPlayerName": to }))
}

#[tokio::test]
async fn signup_and_login_use_the_envelope() {
    let server = Arc::new(Server::in_memory());

    let (status, body) = call(&server, "POST", "/signup/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["databaseError"], false);
    assert_eq!(body["isOK"], true);
    assert_eq!(body["response"]["playerName"], "alice");
    assert_eq!(body["response"]["friendIds"], json!([]));
    assert_eq!(body["response"]["currentTownId"], "");
    let id = body["response"]["id"].clone();

    let (status, body) = call(&server, "POST", "/login/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isOK"], true);
    assert_eq!(body["response"]["id"], id);
}

#[tokio::test]
async fn taken_name_and_unknown_login_are_not_ok() {
    let server = server_with_players(&["alice"]).await;

    let (status, body) = call(&server, "POST", "/signup/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isOK"], false);
    assert!(body["message"].as_str().unwrap().contains("already"));
    assert!(body.get("response").is_none());

    let (status, body) = call(&server, "POST", "/login/bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isOK"], false);
    assert_eq!(body["databaseError"], false);
}

#[tokio::test]
async fn friend_request_round_trip() {
    let server = server_with_players(&["alice", "bob"]).await;

    let (status, body) = call(&server, "POST", "/friends/friendRequest", pair("alice", "bob")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["status"], "pending");
    assert_eq!(body["response"]["sendingPlayerName"], "alice");

    let (_, body) = call(&server, "GET", "/friendRequest/received/bob", None).await;
    assert_eq!(body["response"].as_array().unwrap().len(), 1);
    let (_, body) = call(&server, "GET", "/friendRequest/sent/alice", None).await;
    assert_eq!(body["response"][0]["receivingPlayerName"], "bob");

    let (status, body) = call(
        &server,
        "PUT",
        "/friends/friendRequest/accept",
        pair("alice", "bob"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["status"], "accepted");

    let (_, body) = call(&server, "GET", "/friends/bob", None).await;
    assert_eq!(body["response"][0]["playerName"], "alice");

    let (_, body) = call(&server, "GET", "/players", None).await;
    let players = body["response"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    assert!(players.iter().all(|p| p["friendIds"].as_array().unwrap().len() == 1));
}

#[tokio::test]
async fn reject_then_empty_pending_lists() {
    let server = server_with_players(&["alice", "bob"]).await;

    call(&server, "POST", "/friends/friendRequest", pair("alice", "bob")).await;
    let (status, body) = call(
        &server,
        "PUT",
        "/friends/friendRequest/reject",
        pair("alice", "bob"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["status"], "rejected");

    let (_, body) = call(&server, "GET", "/friendRequest/received/bob", None).await;
    assert_eq!(body["response"], json!([]));
    let (_, body) = call(&server, "GET", "/friends/alice", None).await;
    assert_eq!(body["response"], json!([]));
}

#[tokio::test]
async fn workflow_failures_are_500_with_a_message() {
    let server = server_with_players(&["alice", "bob"]).await;

    let (status, body) = call(&server, "POST", "/friends/friendRequest", pair("alice", "alice")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["isOK"], false);
    assert_eq!(body["databaseError"], false);
    assert!(body["message"].as_str().is_some());

    let (status, _) = call(
        &server,
        "PUT",
        "/friends/friendRequest/accept",
        pair("alice", "bob"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = call(&server, "GET", "/friends/ghost", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn town_update_round_trip() {
    let server = server_with_players(&["alice"]).await;

    let (status, body) = call(
        &server,
        "PUT",
        "/player/town",
        Some(json!({ "playerName": "alice", "townId": "lobby" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isOK"], true);

    let (_, body) = call(&server, "POST", "/login/alice", None).await;
    assert_eq!(body["response"]["currentTownId"], "lobby");

    let (status, _) = call(
        &server,
        "PUT",
        "/player/town",
        Some(json!({ "playerName": "ghost", "townId": "lobby" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn malformed_body_and_unknown_route() {
    let server = server_with_players(&["alice"]).await;

    let (status, body) = call(
        &server,
        "POST",
        "/friends/friendRequest",
        Some(json!({ "from": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["isOK"], false);

    let (status, _) = call(&server, "GET", "/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_answers() {
    let server = Arc::new(Server::in_memory());
    let (status, body) = call(&server, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "ok");
}
