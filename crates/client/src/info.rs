use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Version string reported by `GET /version`.
///
/// The server answers with plain text; surrounding whitespace and quotes are
/// dropped, everything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    raw: String,
}

impl ServerVersion {
    pub fn from_body(body: &str) -> Self {
        Self {
            raw: body.trim().trim_matches('"').to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The leading `major.minor.patch` triple, if the text contains one.
    /// e.g. "v0.7.0_dev" returns `Some((0, 7, 0))`
    pub fn semver(&self) -> Option<(u64, u64, u64)> {
        let start = self.raw.find(|c: char| c.is_ascii_digit())?;
        let mut parts = self.raw[start..]
            .split(|c: char| !c.is_ascii_digit())
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u64>().ok());
        Some((parts.next()??, parts.next()??, parts.next()??))
    }
}

impl Display for ServerVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
