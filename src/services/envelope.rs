//! Signed result envelope and login hop token.
//!
//! Query results travel back to the client as an HS256 compact token wrapping
//! `{ "queryResult": [...] }` under the shared server secret. The signature
//! proves the payload was produced by a secret holder and was not tampered
//! with in transit; it is NOT encryption. The payload is plain base64 and
//! readable by anyone, so nothing confidential gains protection from this
//! layer alone.
//!
//! The same secret signs the short-lived hop token issued between the
//! password-check step and login finalization; that one carries an enforced
//! expiry.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::error::DomainError;

const HOP_PURPOSE: &str = "login-hop";

#[derive(Debug, Serialize, Deserialize)]
struct EnvelopeClaims {
    #[serde(rename = "queryResult")]
    query_result: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HopClaims {
    sub: String,
    purpose: String,
    exp: u64,
}

#[derive(Clone)]
pub struct Envelope {
    encoding: EncodingKey,
    decoding: DecodingKey,
    hop_token_seconds: u64,
}

impl Envelope {
    #[must_use]
    pub fn new(secret: &str, hop_token_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            hop_token_seconds,
        }
    }

    /// Wraps a result list as `{ queryResult: [...] }` and signs it.
    /// No expiry claim is enforced at this layer.
    pub fn sign(&self, rows: Vec<Value>) -> Result<String, DomainError> {
        let claims = EnvelopeClaims { query_result: rows };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::Internal(format!("Failed to sign envelope: {e}")))
    }

    /// Verifies an envelope token and unwraps the result list. A bad
    /// signature or malformed payload is an error, never empty data.
    pub fn verify(&self, token: &str) -> Result<Vec<Value>, DomainError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<EnvelopeClaims>(token, &self.decoding, &validation)
            .map_err(|e| DomainError::Token(e.to_string()))?;

        Ok(data.claims.query_result)
    }

    /// Issues the one-time hop token carrying the authenticated user's UUID.
    pub fn sign_hop(&self, user_uuid: &str) -> Result<String, DomainError> {
        let exp = jsonwebtoken::get_current_timestamp() + self.hop_token_seconds;
        let claims = HopClaims {
            sub: user_uuid.to_string(),
            purpose: HOP_PURPOSE.to_string(),
            exp,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::Internal(format!("Failed to sign hop token: {e}")))
    }

    /// Verifies a hop token (expiry enforced) and returns the user UUID.
    pub fn verify_hop(&self, token: &str) -> Result<String, DomainError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<HopClaims>(token, &self.decoding, &validation)
            .map_err(|e| DomainError::Token(e.to_string()))?;

        if data.claims.purpose != HOP_PURPOSE {
            return Err(DomainError::Token("Wrong token purpose".to_string()));
        }

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope() -> Envelope {
        Envelope::new("test-secret", 30)
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let rows = vec![
            json!({"uuid": "a", "productName": "Chilli", "id": "42"}),
            json!({"uuid": "b", "productName": "Kangkung", "id": "43"}),
        ];

        let token = envelope().sign(rows.clone()).unwrap();
        let decoded = envelope().verify(&token).unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn test_empty_result_round_trip() {
        let token = envelope().sign(vec![]).unwrap();
        assert!(envelope().verify(&token).unwrap().is_empty());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = envelope().sign(vec![json!({"uuid": "a"})]).unwrap();

        // Flip a character in the payload segment.
        let mut parts: Vec<String> = token.split('.').map(ToString::to_string).collect();
        let mut payload: Vec<u8> = parts[1].clone().into_bytes();
        payload[0] = if payload[0] == b'A' { b'B' } else { b'A' };
        parts[1] = String::from_utf8(payload).unwrap();
        let tampered = parts.join(".");

        assert!(matches!(
            envelope().verify(&tampered),
            Err(DomainError::Token(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = envelope().sign(vec![json!({"uuid": "a"})]).unwrap();
        let other = Envelope::new("other-secret", 30);
        assert!(matches!(other.verify(&token), Err(DomainError::Token(_))));
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(matches!(
            envelope().verify("not-a-token"),
            Err(DomainError::Token(_))
        ));
    }

    #[test]
    fn test_hop_round_trip() {
        let token = envelope().sign_hop("user-uuid-1").unwrap();
        assert_eq!(envelope().verify_hop(&token).unwrap(), "user-uuid-1");
    }

    #[test]
    fn test_hop_rejects_envelope_token() {
        // An envelope token must not pass as a login hop.
        let token = envelope().sign(vec![json!({"sub": "x"})]).unwrap();
        assert!(envelope().verify_hop(&token).is_err());
    }

    #[test]
    fn test_expired_hop_rejected() {
        let short = Envelope::new("test-secret", 0);
        let token = short.sign_hop("user-uuid-1").unwrap();
        // exp == now with zero leeway.
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(matches!(
            short.verify_hop(&token),
            Err(DomainError::Token(_))
        ));
    }
}
