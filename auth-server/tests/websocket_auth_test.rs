// auth-server/tests/websocket_auth_test.rs
use std::net::SocketAddr;

use actix_web::{test, App, HttpServer};
use auth_server::{api::auth::AuthResponse, socket::hub::ConnectionCount, AppState};
use chrono::{Duration, Utc};
use common::{Config, IdentityClaim, ServerEvent, TokenIssuer, TOKEN_TTL_DAYS};
use futures_util::{SinkExt, Stream, StreamExt};
use reqwest::Client;
use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::{protocol::Message, Error as WsError};

fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = "websocket-auth-secret".to_string();
    config
}

/// Bind the full app on an ephemeral port and run it in the background
fn start_server(state: &AppState) -> std::io::Result<SocketAddr> {
    let state = state.clone();
    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new().configure(move |cfg| auth_server::configure(cfg, &state))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))?;

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    Ok(addr)
}

/// Read messages until the next text event, skipping heartbeats
async fn next_event<S>(stream: &mut S) -> ServerEvent
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            other => panic!("unexpected message: {:?}", other),
        }
    }
}

/// The handshake must fail with a 401, never with an established socket
fn assert_unauthorized<T>(result: Result<T, WsError>) {
    match result {
        Err(WsError::Http(response)) => assert_eq!(response.status(), StatusCode::UNAUTHORIZED),
        Err(e) => panic!("expected 401 handshake failure, got {:?}", e),
        Ok(_) => panic!("connection should have been rejected"),
    }
}

#[actix_web::test]
async fn test_issued_token_admits_connection() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(&test_config())?;
    let addr = start_server(&state)?;

    // 1. Obtain a token for alice
    let resp = Client::new()
        .post(format!("http://{}/auth", addr))
        .json(&json!({ "username": "alice" }))
        .send()
        .await?;
    assert!(resp.status().is_success());
    let auth: AuthResponse = resp.json().await?;
    assert_eq!(auth.username, "alice");

    // 2. Present it in the handshake
    let (mut ws_stream, _) = connect_async(format!("ws://{}/ws?token={}", addr, auth.token)).await?;

    // 3. The identity attached to the connection is alice
    let welcome = next_event(&mut ws_stream).await;
    assert_eq!(welcome.event, "welcome");
    assert_eq!(welcome.from, None);
    assert_eq!(welcome.data["username"], "alice");
    assert!(welcome.data["connection_id"].is_string());

    assert_eq!(state.hub.send(ConnectionCount).await?, 1);
    Ok(())
}

#[actix_web::test]
async fn test_missing_token_is_rejected_before_any_handler() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(&test_config())?;
    let addr = start_server(&state)?;

    assert_unauthorized(connect_async(format!("ws://{}/ws", addr)).await);
    assert_unauthorized(connect_async(format!("ws://{}/ws?token=", addr)).await);

    // No session ever joined the event stream
    assert_eq!(state.hub.send(ConnectionCount).await?, 0);
    Ok(())
}

#[actix_web::test]
async fn test_forged_and_expired_tokens_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(&test_config())?;
    let addr = start_server(&state)?;

    let forged = TokenIssuer::new("attacker-secret")?.issue(IdentityClaim::new("alice"))?;
    assert_unauthorized(connect_async(format!("ws://{}/ws?token={}", addr, forged.token)).await);

    let stale = Utc::now() - Duration::days(TOKEN_TTL_DAYS + 1);
    let expired = state.issuer.issue_at(IdentityClaim::new("alice"), stale)?;
    assert_unauthorized(connect_async(format!("ws://{}/ws?token={}", addr, expired.token)).await);

    assert_eq!(state.hub.send(ConnectionCount).await?, 0);
    Ok(())
}

#[actix_web::test]
async fn test_missing_and_forged_rejections_are_identical() {
    let state = AppState::new(&test_config()).unwrap();
    let app = test::init_service(App::new().configure(move |cfg| auth_server::configure(cfg, &state))).await;

    let forged = TokenIssuer::new("attacker-secret")
        .unwrap()
        .issue(IdentityClaim::new("alice"))
        .unwrap();

    let upgrade = |uri: String| {
        test::TestRequest::get()
            .uri(&uri)
            .insert_header(("upgrade", "websocket"))
            .insert_header(("connection", "upgrade"))
            .insert_header(("sec-websocket-version", "13"))
            .insert_header(("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ=="))
            .to_request()
    };

    let missing = test::call_service(&app, upgrade("/ws".to_string())).await;
    let invalid = test::call_service(&app, upgrade(format!("/ws?token={}", forged.token))).await;

    assert_eq!(missing.status().as_u16(), 401);
    assert_eq!(missing.status(), invalid.status());

    let missing_body = test::read_body(missing).await;
    let invalid_body = test::read_body(invalid).await;
    assert_eq!(missing_body, invalid_body);
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&missing_body).unwrap(),
        json!({ "error": "Authentication error" })
    );
}

#[actix_web::test]
async fn test_bearer_header_is_accepted() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(&test_config())?;
    let addr = start_server(&state)?;
    let issued = state.issuer.issue(IdentityClaim::new("carol"))?;

    // Add JWT to the headers
    let mut request = format!("ws://{}/ws", addr).into_client_request()?;
    request.headers_mut().insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", issued.token))?,
    );

    let (mut ws_stream, _) = connect_async(request).await?;
    let welcome = next_event(&mut ws_stream).await;
    assert_eq!(welcome.data["username"], "carol");
    Ok(())
}

#[actix_web::test]
async fn test_events_are_broadcast_with_sender_identity() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(&test_config())?;
    let addr = start_server(&state)?;
    let alice_token = state.issuer.issue(IdentityClaim::new("alice"))?.token;
    let bob_token = state.issuer.issue(IdentityClaim::new("bob"))?.token;

    let (mut alice, _) = connect_async(format!("ws://{}/ws?token={}", addr, alice_token)).await?;
    assert_eq!(next_event(&mut alice).await.event, "welcome");
    let (mut bob, _) = connect_async(format!("ws://{}/ws?token={}", addr, bob_token)).await?;
    assert_eq!(next_event(&mut bob).await.event, "welcome");

    // A client cannot pick its own sender name
    alice
        .send(Message::Text(
            r#"{"event":"chat","data":"hello","from":"mallory"}"#.to_string(),
        ))
        .await?;

    for ws_stream in [&mut bob, &mut alice] {
        let event = next_event(ws_stream).await;
        assert_eq!(event.event, "chat");
        assert_eq!(event.from.as_deref(), Some("alice"));
        assert_eq!(event.data, json!("hello"));
    }

    // Malformed frames are answered to the sender only
    alice.send(Message::Text("not json".to_string())).await?;
    assert_eq!(next_event(&mut alice).await.event, "error");
    Ok(())
}
