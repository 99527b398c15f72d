#![allow(dead_code)]

use std::sync::Once;

use jiff::Timestamp;
use jsonwebtoken::{EncodingKey, Header};
use serde::Serialize;

use datagraphs::Config;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

#[derive(Serialize)]
struct Claims {
    sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    exp: i64,
}

/// HS256 token issued `age_secs` ago that expires `remaining_secs` from now.
pub fn mint_token(age_secs: i64, remaining_secs: i64) -> String {
    let now = Timestamp::now().as_second();
    encode(Claims {
        sub: "client1".into(),
        iat: Some(now - age_secs),
        exp: now + remaining_secs,
    })
}

/// Token without an `iat` claim.
pub fn mint_token_without_iat(remaining_secs: i64) -> String {
    let now = Timestamp::now().as_second();
    encode(Claims {
        sub: "client1".into(),
        iat: None,
        exp: now + remaining_secs,
    })
}

fn encode(claims: Claims) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("sign test token")
}

pub fn delegated_config(server_uri: &str) -> Config {
    Config::from_values(
        "project1",
        "apiKey1",
        Some("client1".into()),
        Some("secret1".into()),
    )
    .with_hosts(server_uri, server_uri)
}

pub fn api_key_config(server_uri: &str) -> Config {
    Config::from_values("project1", "apiKey1", None, None).with_hosts(server_uri, server_uri)
}
