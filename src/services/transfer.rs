//! Transfer authorization: short-lived signed credentials that let the
//! browser move payload bytes directly to and from the store.
//!
//! Downloads use the SDK's presigned GET. Uploads use a SigV4 POST
//! policy, which the SDK does not generate, so the policy document is
//! built and signed here with the standard HMAC chain.

use crate::{
    models::grant::UploadGrant,
    services::store_client::{StoreClient, StoreResult},
};
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::{collections::BTreeMap, time::Duration};
use tracing::info;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Download grants stay valid for one hour.
pub const DOWNLOAD_GRANT_TTL: Duration = Duration::from_secs(3600);
/// Upload grants stay valid for ten minutes.
pub const UPLOAD_GRANT_TTL: Duration = Duration::from_secs(600);
/// Hard cap on a single uploaded payload.
pub const MAX_UPLOAD_BYTES: u64 = 10_485_760;

#[derive(Clone)]
pub struct TransferService {
    store: StoreClient,
}

impl TransferService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// Presign a GET for `key`, valid for one hour. No existence check:
    /// a grant for a missing key fails when the client dereferences it.
    pub async fn authorize_download(&self, key: &str) -> StoreResult<String> {
        info!(key = %key, "issuing download grant");
        self.store.presign_get(key, DOWNLOAD_GRANT_TTL).await
    }

    /// Issue a signed POST policy for uploading `file_name` under
    /// `prefix`. The object key is prefixed with a random UUID so
    /// concurrent uploads of identically-named files never collide.
    /// The policy binds the declared content type (prefix match) and
    /// caps the payload size; signing failure yields no partial grant.
    pub async fn authorize_upload(
        &self,
        prefix: &str,
        file_name: &str,
        content_type: &str,
    ) -> StoreResult<UploadGrant> {
        let key = unique_key(prefix, file_name);
        StoreClient::ensure_key_safe(&key)?;
        info!(key = %key, "issuing upload grant");

        let credentials = self.store.signing_credentials().await?;
        let region = self.store.region()?;
        let signer = PolicySigner {
            bucket: self.store.bucket(),
            key: &key,
            content_type,
            access_key_id: credentials.access_key_id(),
            secret_access_key: credentials.secret_access_key(),
            session_token: credentials.session_token(),
            region: &region,
            issued_at: Utc::now(),
        };

        Ok(UploadGrant {
            url: self.store.upload_url()?,
            fields: signer.build_fields(),
        })
    }
}

/// Collision-resistant key for an upload: `prefix` + random UUID + name.
fn unique_key(prefix: &str, file_name: &str) -> String {
    format!("{prefix}{}-{file_name}", Uuid::new_v4())
}

/// Everything needed to produce one signed POST policy. Pure: the
/// caller supplies the clock and credentials, so signing is
/// deterministic for fixed inputs.
struct PolicySigner<'a> {
    bucket: &'a str,
    key: &'a str,
    content_type: &'a str,
    access_key_id: &'a str,
    secret_access_key: &'a str,
    session_token: Option<&'a str>,
    region: &'a str,
    issued_at: DateTime<Utc>,
}

impl PolicySigner<'_> {
    /// Build the full form-field set: policy document, signing
    /// metadata, and the signature over the encoded policy.
    fn build_fields(&self) -> BTreeMap<String, String> {
        let amz_date = self.issued_at.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = self.issued_at.format("%Y%m%d").to_string();
        let credential = format!(
            "{}/{}/{}/s3/aws4_request",
            self.access_key_id, date_stamp, self.region
        );
        let expiration = (self.issued_at + UPLOAD_GRANT_TTL)
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut conditions = vec![
            json!({ "bucket": self.bucket }),
            json!({ "key": self.key }),
            json!(["content-length-range", 0, MAX_UPLOAD_BYTES]),
            json!(["starts-with", "$Content-Type", self.content_type]),
            json!({ "Content-Type": self.content_type }),
            json!({ "x-amz-algorithm": "AWS4-HMAC-SHA256" }),
            json!({ "x-amz-credential": credential }),
            json!({ "x-amz-date": amz_date }),
        ];
        if let Some(token) = self.session_token {
            conditions.push(json!({ "x-amz-security-token": token }));
        }

        let policy = json!({
            "expiration": expiration,
            "conditions": conditions,
        });
        let encoded_policy = general_purpose::STANDARD.encode(policy.to_string());

        let signing_key = signing_key(self.secret_access_key, &date_stamp, self.region, "s3");
        let signature = hex::encode(hmac_sha256(&signing_key, encoded_policy.as_bytes()));

        let mut fields = BTreeMap::new();
        fields.insert("key".into(), self.key.to_string());
        fields.insert("Content-Type".into(), self.content_type.to_string());
        fields.insert("policy".into(), encoded_policy);
        fields.insert("x-amz-algorithm".into(), "AWS4-HMAC-SHA256".into());
        fields.insert("x-amz-credential".into(), credential);
        fields.insert("x-amz-date".into(), amz_date);
        fields.insert("x-amz-signature".into(), signature);
        if let Some(token) = self.session_token {
            fields.insert("x-amz-security-token".into(), token.to_string());
        }
        fields
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn signing_key(secret_key: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(
        format!("AWS4{secret_key}").as_bytes(),
        date_stamp.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer(issued_at: DateTime<Utc>) -> PolicySigner<'static> {
        PolicySigner {
            bucket: "files",
            key: "Reports/abc-invoice.pdf",
            content_type: "application/pdf",
            access_key_id: "AKIDEXAMPLE",
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            session_token: None,
            region: "us-east-1",
            issued_at,
        }
    }

    fn decode_policy(fields: &BTreeMap<String, String>) -> serde_json::Value {
        let raw = general_purpose::STANDARD.decode(&fields["policy"]).unwrap();
        serde_json::from_slice(&raw).unwrap()
    }

    #[test]
    fn upload_keys_never_collide() {
        let a = unique_key("Reports/", "invoice.pdf");
        let b = unique_key("Reports/", "invoice.pdf");
        assert_ne!(a, b);
        assert!(a.starts_with("Reports/"));
        assert!(a.ends_with("-invoice.pdf"));
    }

    #[test]
    fn policy_binds_size_and_content_type() {
        let issued_at = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let fields = signer(issued_at).build_fields();
        let policy = decode_policy(&fields);

        let conditions = policy["conditions"].as_array().unwrap();
        assert!(conditions.contains(&json!(["content-length-range", 0, 10_485_760])));
        assert!(conditions.contains(&json!([
            "starts-with",
            "$Content-Type",
            "application/pdf"
        ])));
        assert!(conditions.contains(&json!({ "bucket": "files" })));
        assert!(conditions.contains(&json!({ "key": "Reports/abc-invoice.pdf" })));
    }

    #[test]
    fn policy_expires_ten_minutes_after_issue() {
        let issued_at = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let fields = signer(issued_at).build_fields();
        let policy = decode_policy(&fields);

        assert_eq!(policy["expiration"], "2026-01-15T12:10:00.000Z");
        assert_eq!(fields["x-amz-date"], "20260115T120000Z");
        assert_eq!(
            fields["x-amz-credential"],
            "AKIDEXAMPLE/20260115/us-east-1/s3/aws4_request"
        );
    }

    #[test]
    fn signature_is_deterministic_for_fixed_inputs() {
        let issued_at = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let first = signer(issued_at).build_fields();
        let second = signer(issued_at).build_fields();

        assert_eq!(first["x-amz-signature"], second["x-amz-signature"]);
        assert_eq!(first["x-amz-signature"].len(), 64);
        assert!(
            first["x-amz-signature"]
                .chars()
                .all(|c| c.is_ascii_hexdigit())
        );
    }

    #[test]
    fn session_token_rides_along_when_present() {
        let issued_at = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let mut with_token = signer(issued_at);
        with_token.session_token = Some("FwoGZXIvYXdzEBc");
        let fields = with_token.build_fields();

        assert_eq!(fields["x-amz-security-token"], "FwoGZXIvYXdzEBc");
        let policy = decode_policy(&fields);
        let conditions = policy["conditions"].as_array().unwrap();
        assert!(conditions.contains(&json!({ "x-amz-security-token": "FwoGZXIvYXdzEBc" })));
    }
}
