use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use geodrop_backend::{
    AppState, config::Config, geo::Quantizer, proximity::ProximityQueryEngine, router::create_router,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    create_router(AppState {
        config: Config::default(),
        engine: ProximityQueryEngine::in_memory(Quantizer::default()),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

fn message_body(msg_id: &str, lat: f64, lon: f64, sent_secs_ago: i64) -> Value {
    json!({
        "userId": "u1",
        "msgId": msg_id,
        "msgContent": format!("hello from {msg_id}"),
        "specificLat": lat,
        "specificLon": lon,
        "timeSent": (Utc::now() - Duration::seconds(sent_secs_ago)).timestamp_millis(),
    })
}

#[tokio::test]
async fn test_index_is_alive() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("geodrop backend is running"));
}

#[tokio::test]
async fn test_create_then_find_by_bucket() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/messages", Some(message_body("m1", 40.7128, -74.006, 0))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["broadCoordinate"], json!({ "latitude": 40.71, "longitude": -74.01 }));

    send(&app, Method::POST, "/messages", Some(message_body("m2", 34.0522, -118.2437, 0))).await;

    let (status, body) = send(&app, Method::GET, "/messages?broadLat=40.71&broadLon=-74.01", None).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["resp_data"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["msgId"], "m1");
    // 精确坐标不对外暴露
    assert!(messages[0].get("preciseCoordinate").is_none());

    let (status, body) = send(&app, Method::GET, "/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_find_by_id_and_not_found() {
    let app = app();
    send(&app, Method::POST, "/messages", Some(message_body("m1", 1.0, 1.0, 0))).await;

    let (status, body) = send(&app, Method::GET, "/messages?msgId=m1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["msgId"], "m1");

    let (status, body) = send(&app, Method::GET, "/messages?msgId=unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn test_listing_empty_store_returns_empty_list() {
    let app = app();
    for uri in ["/messages", "/users"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["code"], 0);
        assert_eq!(body["resp_data"], json!([]));
    }
}

#[tokio::test]
async fn test_empty_user_bucket_maps_to_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/users?broadLat=10&broadLon=10", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn test_empty_bucket_maps_to_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/messages?broadLat=10&broadLon=10", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn test_bucket_and_time_window() {
    let app = app();
    send(&app, Method::POST, "/messages", Some(message_body("fresh", 51.5074, -0.1278, 10))).await;
    send(&app, Method::POST, "/messages", Some(message_body("stale", 51.5071, -0.1281, 1000))).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/messages?broadLat=51.51&broadLon=-0.13&secondsSinceCreation=30",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["resp_data"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["msgId"], "fresh");
}

#[tokio::test]
async fn test_non_numeric_query_is_validation_error() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/messages?broadLat=north&broadLon=1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);

    let (status, _) = send(&app, Method::GET, "/messages?broadLat=1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_message_validation() {
    let app = app();

    let out_of_range = message_body("m1", 91.0, 0.0, 0);
    let (status, _) = send(&app, Method::POST, "/messages", Some(out_of_range)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut mismatched = message_body("m2", 40.7128, -74.006, 0);
    mismatched["broadLat"] = json!(40.7);
    mismatched["broadLon"] = json!(-74.0);
    let (status, _) = send(&app, Method::POST, "/messages", Some(mismatched)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::POST, "/messages", Some(json!({ "msgId": "m3" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);
}

#[tokio::test]
async fn test_duplicate_message_is_conflict() {
    let app = app();
    let (status, _) = send(&app, Method::POST, "/messages", Some(message_body("m1", 1.0, 1.0, 0))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, Method::POST, "/messages", Some(message_body("m1", 2.0, 2.0, 0))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1006);
}

#[tokio::test]
async fn test_quantize_endpoint_rounds_half_down() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/messages/get/broad/0.125/-0.125", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"], json!({ "latitude": 0.12, "longitude": -0.13 }));

    let (status, _) = send(&app, Method::GET, "/messages/get/broad/91/0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_location_flow() {
    let app = app();
    for (id, name) in [("alice", "Alice"), ("bob", "Bob")] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/users",
            Some(json!({ "userId": id, "userDisplayName": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(&app, Method::PUT, "/users?userId=alice&specificLat=35.6762&specificLon=139.6503", None).await;
    assert_eq!(status, StatusCode::OK);
    send(&app, Method::PUT, "/users?userId=bob&specificLat=35.6759&specificLon=139.6498", None).await;

    let (status, body) = send(&app, Method::GET, "/users/get/specificRange/35.6761/139.6501", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"].as_array().unwrap().len(), 2);

    // alice 移动到大阪
    send(&app, Method::PUT, "/users?userId=alice&specificLat=34.6937&specificLon=135.5023", None).await;

    let (_, body) = send(&app, Method::GET, "/users/get/specificRange/35.6761/139.6501", None).await;
    let users = body["resp_data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["userId"], "bob");

    let (status, body) = send(&app, Method::GET, "/users?broadLat=34.69&broadLon=135.5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"][0]["userId"], "alice");

    let (status, body) = send(&app, Method::GET, "/users?userId=alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["broadCoordinate"], json!({ "latitude": 34.69, "longitude": 135.5 }));
}

#[tokio::test]
async fn test_update_unknown_user_is_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::PUT, "/users?userId=ghost&specificLat=1&specificLon=1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);

    let (status, _) = send(&app, Method::PUT, "/users?userId=ghost", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_user_is_conflict() {
    let app = app();
    let user = json!({ "userId": "alice", "userDisplayName": "Alice" });
    send(&app, Method::POST, "/users", Some(user.clone())).await;
    let (status, _) = send(&app, Method::POST, "/users", Some(user)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn test_user_ids_accepted_like_message_user_ids() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({ "userId": "user-42@example", "userDisplayName": "Dana" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["resp_data"]["userId"], "user-42@example");

    let (status, _) = send(&app, Method::POST, "/users", Some(json!({ "userId": " ", "userDisplayName": "Dana" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_time_window_without_bucket_is_validation_error() {
    let app = app();
    send(&app, Method::POST, "/messages", Some(message_body("m1", 1.0, 1.0, 0))).await;

    let (status, body) = send(&app, Method::GET, "/messages?secondsSinceCreation=30", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);

    let (status, _) = send(&app, Method::GET, "/users?secondsSinceUpdate=30", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
