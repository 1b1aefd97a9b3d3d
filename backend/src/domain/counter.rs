//! Named sequence counters.

use serde::{Deserialize, Serialize};

use super::ports::{Entity, KeyKind};

/// Sequence name used when users need a numeric identifier.
pub const USER_ID_SEQUENCE: &str = "userId";

/// Monotonic counter keyed by sequence name.
///
/// `seq` starts implicitly at zero; the first increment of an unknown name
/// yields one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// Sequence name, unique per counter.
    pub id: String,
    /// Last value handed out.
    #[serde(default)]
    pub seq: i64,
}

impl Entity for Counter {
    const KEY_KIND: KeyKind = KeyKind::Name;
}
