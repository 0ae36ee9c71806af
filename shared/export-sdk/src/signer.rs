//! HMAC-SHA256 message signing

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::SigningError;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `message` keyed by the UTF-8 bytes of `secret`, as
/// 64 lowercase hex characters.
pub fn sign(secret: &str, message: &[u8]) -> Result<String, SigningError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Signing capability used by the exporter
#[async_trait]
pub trait MessageSigner: Send + Sync {
    fn algorithm(&self) -> &'static str;

    async fn sign(&self, secret: &str, message: &[u8]) -> Result<String, SigningError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256Signer;

#[async_trait]
impl MessageSigner for HmacSha256Signer {
    fn algorithm(&self) -> &'static str {
        "hmac-sha256"
    }

    async fn sign(&self, secret: &str, message: &[u8]) -> Result<String, SigningError> {
        sign(secret, message)
    }
}
