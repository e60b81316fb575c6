//! RSA encryption of credentials for transport.
//!
//! Steam hands out a per-account RSA public key which the password must be encrypted
//! with before it is submitted to the login endpoint. The key material arrives as hex
//! strings and the ciphertext goes back out base64-encoded.

use crate::error::Error;
use crate::serialize;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest_middleware::ClientWithMiddleware;
use rsa::{BigUint, Pkcs1v15Encrypt, RsaPublicKey};
use serde::{Deserialize, Serialize};
use url::Url;

const INVALID_KEY: &str = "Invalid RSA key received";

/// An RSA public key descriptor as returned by `getrsakey`.
#[derive(Debug, Clone)]
pub struct RsaKey {
    /// The key modulus as a hex string.
    pub modulus: String,
    /// The key exponent as a hex string.
    pub exponent: String,
    /// Timestamp echo which must be sent back with the login form.
    pub timestamp: String,
}

#[derive(Serialize)]
struct GetRsaKeyRequest<'a> {
    username: &'a str,
}

#[derive(Deserialize)]
struct GetRsaKeyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    publickey_mod: Option<String>,
    #[serde(default)]
    publickey_exp: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::option_string_or_number")]
    timestamp: Option<String>,
}

/// Fetches the RSA public key for an account. This is the only unauthenticated request
/// in the login flow; it still carries the same mobile-or-web headers as the login
/// form submission that follows it.
pub async fn fetch_rsa_key(
    client: &ClientWithMiddleware,
    community: &Url,
    account_name: &str,
    mobile: bool,
) -> Result<RsaKey, Error> {
    let uri = format!("{}login/getrsakey/", community);
    let request = crate::helpers::apply_login_headers(
        client.post(&uri).form(&GetRsaKeyRequest { username: account_name }),
        community,
        mobile,
    );
    let response = request.send().await?;
    let body: GetRsaKeyResponse = crate::helpers::parses_response(response).await?;

    if !body.success {
        return Err(Error::MalformedResponse(INVALID_KEY));
    }

    match (body.publickey_mod, body.publickey_exp) {
        (Some(modulus), Some(exponent)) => Ok(RsaKey {
            modulus,
            exponent,
            timestamp: body.timestamp.unwrap_or_default(),
        }),
        _ => Err(Error::MalformedResponse(INVALID_KEY)),
    }
}

/// Encrypts a password with the given key material using PKCS#1 v1.5 padding and
/// returns the ciphertext in the base64 form the login endpoint expects.
pub fn encrypt_password(
    password: &str,
    modulus_hex: &str,
    exponent_hex: &str,
) -> Result<String, Error> {
    let n = BigUint::parse_bytes(modulus_hex.as_bytes(), 16)
        .ok_or(Error::MalformedResponse(INVALID_KEY))?;
    let e = BigUint::parse_bytes(exponent_hex.as_bytes(), 16)
        .ok_or(Error::MalformedResponse(INVALID_KEY))?;
    let key = RsaPublicKey::new(n, e)
        .map_err(|_error| Error::MalformedResponse(INVALID_KEY))?;
    let mut rng = rand::thread_rng();
    let ciphertext = key.encrypt(&mut rng, Pkcs1v15Encrypt, password.as_bytes())?;

    Ok(BASE64.encode(ciphertext))
}
