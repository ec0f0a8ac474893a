use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the Persona webhook signature
pub const SIGNATURE_HEADER: &str = "persona-signature";

/// Parsed `Persona-Signature` header.
///
/// Format: `t=<unix-seconds>,v1=<hex>`. During secret rotation Persona sends
/// one `v1` per active secret, separated by spaces or commas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Timestamp exactly as sent; it is part of the signed string.
    pub timestamp: String,
    pub signatures: Vec<String>,
}

/// Parse a `Persona-Signature` header value.
///
/// Returns `None` without a non-empty `t` or at least one non-empty `v1`.
/// Unknown keys are ignored.
pub fn parse_signature_header(header: &str) -> Option<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
    {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };

        match key {
            "t" if !value.is_empty() => timestamp = Some(value.to_string()),
            "v1" if !value.is_empty() => signatures.push(value.to_string()),
            _ => {}
        }
    }

    if signatures.is_empty() {
        return None;
    }

    Some(SignatureHeader {
        timestamp: timestamp?,
        signatures,
    })
}

/// Compute the hex HMAC-SHA256 of `timestamp + "." + body`.
pub fn create_digest(secret: &[u8], timestamp: &str, body: &[u8]) -> String {
    hex::encode(compute_mac(secret, timestamp, body))
}

fn compute_mac(secret: &[u8], timestamp: &str, body: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    mac.finalize().into_bytes().to_vec()
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Persona webhook signature verifier
///
/// Pure: the decision depends only on the secret, the raw body and the
/// header. The body must be the bytes as received, before any JSON parsing.
pub struct PersonaSignatureVerifier {
    secret: SecretString,
}

impl PersonaSignatureVerifier {
    pub fn new(secret: impl Into<SecretString>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Check a header value against the raw request body.
    ///
    /// Malformed headers and undecodable digests are invalid, never errors.
    pub fn verify(&self, body: &[u8], header: &str) -> bool {
        let Some(parsed) = parse_signature_header(header) else {
            tracing::debug!("Malformed Persona-Signature header");
            return false;
        };

        let expected = compute_mac(
            self.secret.expose_secret().as_bytes(),
            &parsed.timestamp,
            body,
        );

        // Check every candidate so the work done does not depend on which one matches
        let mut any_match = false;
        for candidate in &parsed.signatures {
            if let Ok(provided) = hex::decode(candidate) {
                any_match |= constant_time_compare(&expected, &provided);
            }
        }

        if !any_match {
            tracing::debug!("Persona webhook signature verification failed");
        }

        any_match
    }
}
