use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use jiff::Timestamp;
use serde::Deserialize;

use crate::errors::Error;

// Payloads show up both url-safe and standard encoded, padded or not.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Timing claims carried in a bearer token payload, in seconds since epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenClaims {
    pub issued_at: Option<i64>,
    pub expires_at: i64,
}

impl TokenClaims {
    /// Total lifetime from issuance to expiry, when issuance is known.
    pub fn lifetime(&self) -> Option<i64> {
        self.issued_at.map(|iat| self.expires_at.saturating_sub(iat))
    }

    pub fn remaining(&self, now: i64) -> i64 {
        self.expires_at.saturating_sub(now)
    }
}

#[derive(Deserialize)]
struct RawClaims {
    exp: Option<f64>,
    iat: Option<f64>,
}

/// Reads the `iat`/`exp` claims of a `header.payload.signature` token.
///
/// The signature is never checked; the result only drives refresh timing.
pub fn decode(token: &str) -> Result<TokenClaims, Error> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(Error::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };
    let normalized = payload.replace('+', "-").replace('/', "_");
    let bytes = PAYLOAD_ENGINE
        .decode(normalized.as_bytes())
        .map_err(|e| Error::MalformedToken(format!("payload is not base64: {e}")))?;
    let raw: RawClaims = serde_json::from_slice(&bytes)
        .map_err(|e| Error::MalformedToken(format!("payload is not a JSON object: {e}")))?;
    let exp = raw
        .exp
        .ok_or_else(|| Error::MalformedToken("payload has no exp claim".into()))?;
    Ok(TokenClaims {
        issued_at: raw.iat.map(|iat| epoch_seconds("iat", iat)).transpose()?,
        expires_at: epoch_seconds("exp", exp)?,
    })
}

// Claims must name an instant jiff can represent; anything else is garbage.
fn epoch_seconds(claim: &str, value: f64) -> Result<i64, Error> {
    let seconds = value.trunc();
    if !seconds.is_finite() || seconds < i64::MIN as f64 || seconds > i64::MAX as f64 {
        return Err(Error::MalformedToken(format!(
            "{claim} claim {value} is out of range"
        )));
    }
    Timestamp::from_second(seconds as i64)
        .map(|ts| ts.as_second())
        .map_err(|e| Error::MalformedToken(format!("{claim} claim {value} is out of range: {e}")))
}
