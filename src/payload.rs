use std::time::{SystemTime, UNIX_EPOCH};

use serde_derive::{Deserialize, Serialize};

use crate::sign::sign_message;

/// The message the worker expects. Field order here is the key order on the
/// wire.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct UpdatePayload {
    pub addr: Box<str>,
    pub timestamp: u64,
}

/// A serialized payload together with the signature over those very bytes.
/// Only this type can be submitted, so the body can never be re-encoded
/// between signing and sending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedUpdate {
    body: Box<[u8]>,
    signature: Box<str>,
}

impl UpdatePayload {
    pub fn new(addr: Box<str>) -> Self {
        Self::at(addr, SystemTime::now())
    }

    pub fn at(addr: Box<str>, now: SystemTime) -> Self {
        let timestamp = match now.duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs(),
            Err(_) => {
                log::warn!(
                    "System clock is before the Unix epoch, the worker will reject this update"
                );
                0
            }
        };

        Self { addr, timestamp }
    }

    /// Compact JSON, UTF-8, keys in declaration order.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn sign(&self, key: &[u8]) -> Result<SignedUpdate, serde_json::Error> {
        let body = self.to_bytes()?;
        let signature = sign_message(&body, key);

        Ok(SignedUpdate {
            body: body.into_boxed_slice(),
            signature: signature.into(),
        })
    }
}

impl SignedUpdate {
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }
}
