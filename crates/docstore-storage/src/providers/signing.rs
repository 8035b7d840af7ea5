//! Signed URLs for providers without native presigning.
//!
//! A URL carries `op`, `expires` (unix seconds) and `signature`, where the
//! signature is the hex SHA-256 of the secret, operation, key and expiry.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use docstore_core::traits::PresignedUrl;

/// Operation a signed URL grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedOp {
    /// Download with `GET`.
    Get,
    /// Upload with `PUT`.
    Put,
}

impl SignedOp {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
        }
    }

    fn method(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
        }
    }
}

/// Signs and verifies URLs under one base URL.
#[derive(Clone)]
pub struct UrlSigner {
    base_url: String,
    secret: String,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    /// Create a signer for URLs under `base_url`.
    pub fn new(base_url: &str, secret: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            secret: secret.to_string(),
        }
    }

    fn signature(&self, op: SignedOp, key: &str, expires: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"\n");
        hasher.update(op.as_str().as_bytes());
        hasher.update(b"\n");
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
        hasher.update(expires.to_string().as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    /// Build a signed URL for `key` valid until `expires_at`.
    pub fn sign(&self, op: SignedOp, key: &str, expires_at: DateTime<Utc>) -> PresignedUrl {
        let expires = expires_at.timestamp();
        let signature = self.signature(op, key, expires);
        PresignedUrl {
            url: format!(
                "{}/{}?op={}&expires={expires}&signature={signature}",
                self.base_url,
                key.trim_start_matches('/'),
                op.as_str(),
            ),
            method: op.method().to_string(),
            expires_at,
        }
    }

    /// Check a signature presented for `key` at time `now`.
    pub fn verify(
        &self,
        op: SignedOp,
        key: &str,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if now.timestamp() > expires {
            return false;
        }
        let expected = self.signature(op, key, expires);
        // Constant-time comparison.
        expected.len() == signature.len()
            && expected
                .bytes()
                .zip(signature.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}
