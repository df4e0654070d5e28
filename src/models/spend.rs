//! Spend request model and the spend-reference allow-list.

use serde::{Serialize, Serializer};

/// Closed allow-list of spend references shared with the server.
///
/// The backend rejects any reference outside this set, so the client refuses
/// to submit arbitrary strings in the first place. The list is a client-side
/// literal; if the server's set changes the client needs a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendReference {
    Test,
    Tip,
    BoostProfile,
}

impl SpendReference {
    /// Parses a wire-format reference, returning `None` for anything outside
    /// the allow-list.
    pub fn parse(reference: &str) -> Option<Self> {
        match reference {
            "product:test" => Some(Self::Test),
            "product:tip" => Some(Self::Tip),
            "product:boost:profile" => Some(Self::BoostProfile),
            _ => None,
        }
    }

    /// Returns the wire-format reference string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Test => "product:test",
            Self::Tip => "product:tip",
            Self::BoostProfile => "product:boost:profile",
        }
    }

    /// All allowed references.
    pub const ALL: [SpendReference; 3] = [Self::Test, Self::Tip, Self::BoostProfile];
}

impl Serialize for SpendReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Body of `POST /coin/spend/`.
#[derive(Debug, Clone, Serialize)]
pub struct SpendRequest {
    pub amount_cents: i64,
    pub reference: SpendReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
