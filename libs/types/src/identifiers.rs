//! Vehicle identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable vehicle identifier used as the partition key for overrides and
/// cache entries.
///
/// The surrounding system hands in API keys or document ids of varying
/// shapes; everything is normalized to lowercase trimmed form once, at the
/// boundary, so that lookups never depend on caller hygiene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl AsRef<str>) -> Self {
        VehicleId(id.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(s: &str) -> Self {
        VehicleId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(VehicleId::new("  Vh-001 "), VehicleId::new("vh-001"));
    }
}
