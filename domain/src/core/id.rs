//! Short random identifiers.

use uuid::Uuid;

/// Return an 8-character hex identifier suitable for prefixing
/// (`INC-3fa9c1b2`, `act-…`, `find-…`, `exec-…`).
pub fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
