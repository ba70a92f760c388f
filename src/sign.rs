//! HMAC-SHA256 over the exact bytes that go on the wire.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn keyed(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC can take key of any size")
}

/// Lowercase hex HMAC-SHA256 of `message` under `key`.
pub fn sign_message(message: &[u8], key: &[u8]) -> String {
    let mut mac = keyed(key);
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
pub(crate) use tests::verify_signature;
