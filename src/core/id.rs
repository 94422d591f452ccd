//! Identifier codec
//!
//! Converts externally supplied id tokens into the store's `ObjectId` key and
//! back. Only the canonical 24 hex character form is accepted; the codec never
//! checks whether a record with that key exists.

use mongodb::bson::oid::ObjectId;

/// Length of the textual form of an `ObjectId`
pub const ENCODED_LEN: usize = 24;

/// Decode an external token into a store key
///
/// Returns `None` for anything that is not exactly 24 hex characters.
pub fn decode(token: &str) -> Option<ObjectId> {
    if token.len() != ENCODED_LEN || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    ObjectId::parse_str(token).ok()
}

/// Encode a store key for clients (lowercase hex)
pub fn encode(id: &ObjectId) -> String {
    id.to_hex()
}
