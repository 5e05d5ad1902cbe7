pub mod auth_token;
pub mod chat_token;

use base64::engine::general_purpose::URL_SAFE as b64_urlsafe;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug)]
pub enum TokenError {
    TokenInvalid,
    TokenExpired,
    TokenMissing,
}

impl std::error::Error for TokenError {}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::TokenInvalid => write!(f, "TokenInvalid"),
            TokenError::TokenExpired => write!(f, "TokenExpired"),
            TokenError::TokenMissing => write!(f, "TokenMissing"),
        }
    }
}

pub trait Expiring {
    fn expiration(&self) -> u64;
}

/// A token whose signature has been parsed but not yet checked. Claims are
/// only handed out by `verify`.
#[derive(Debug)]
pub struct DecodedToken<C>
where
    C: Expiring + DeserializeOwned,
{
    json: Vec<u8>,
    signature: Vec<u8>,
    claims: C,
}

impl<C> DecodedToken<C>
where
    C: Expiring + DeserializeOwned,
{
    pub fn verify(&self, key: &[u8]) -> Result<&C, TokenError> {
        if !signature_is_valid(&self.json, &self.signature, key) {
            return Err(TokenError::TokenInvalid);
        }

        let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) else {
            return Err(TokenError::TokenInvalid);
        };

        if self.claims.expiration() <= now.as_secs() {
            return Err(TokenError::TokenExpired);
        }

        Ok(&self.claims)
    }
}

/// Tokens are base64url(claims-JSON || HMAC-SHA256(claims-JSON)).
pub trait Token {
    type Claims: Expiring + DeserializeOwned + Serialize;

    fn sign_new(claims: Self::Claims, signing_key: &[u8]) -> String {
        let mut token_unencoded =
            serde_json::to_vec(&claims).expect("Failed to transform claims into JSON");

        let mut mac =
            HmacSha256::new_from_slice(signing_key).expect("HMAC should accept any key length");
        mac.update(&token_unencoded);
        token_unencoded.extend_from_slice(&mac.finalize().into_bytes());

        b64_urlsafe.encode(&token_unencoded)
    }

    fn decode(token: &str) -> Result<DecodedToken<Self::Claims>, TokenError> {
        const MAX_TOKEN_LENGTH: usize = 8192;
        const SIGNATURE_LENGTH: usize = 32;

        if token.len() > MAX_TOKEN_LENGTH {
            return Err(TokenError::TokenInvalid);
        }

        let decoded_token = b64_urlsafe
            .decode(token)
            .map_err(|_| TokenError::TokenInvalid)?;

        if decoded_token.len() <= SIGNATURE_LENGTH {
            return Err(TokenError::TokenInvalid);
        }

        let json_len = decoded_token.len() - SIGNATURE_LENGTH;
        let json = &decoded_token[..json_len];

        let signature = Vec::from(&decoded_token[json_len..]);
        let claims: Self::Claims =
            serde_json::from_slice(json).map_err(|_| TokenError::TokenInvalid)?;

        Ok(DecodedToken {
            json: Vec::from(json),
            signature,
            claims,
        })
    }
}

fn signature_is_valid(json: &[u8], signature: &[u8], key: &[u8]) -> bool {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC should accept any key length");
    mac.update(json);
    let correct_signature = mac.finalize().into_bytes();

    if correct_signature.len() != signature.len() || signature.is_empty() {
        return false;
    }

    // Bitwise comparison to prevent timing attacks
    let mut signatures_dont_match = 0u8;

    for (correct_sig_byte, sig_byte) in correct_signature.iter().zip(signature.iter()) {
        signatures_dont_match |= correct_sig_byte ^ sig_byte;
    }

    signatures_dont_match == 0
}
