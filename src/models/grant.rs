//! Transfer grants issued by the authorization service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A signed POST policy the browser uses to upload directly to the
/// store. Valid until the policy's embedded expiration; the server
/// never sees the payload bytes.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadGrant {
    /// Bucket endpoint the form POST is submitted to.
    pub url: String,

    /// Form fields the client must include verbatim, signature included.
    pub fields: BTreeMap<String, String>,
}
