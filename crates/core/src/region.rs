use serde::{Deserialize, Serialize};

/// One of the two independent sub-grids of a sheet.
///
/// A cell belongs to exactly one region for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Head,
    Body,
}

impl Region {
    /// Both regions in render order (head above body).
    pub const ALL: [Region; 2] = [Region::Head, Region::Body];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Head => "head",
            Region::Body => "body",
        }
    }

    /// Parse a region name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "head" => Some(Region::Head),
            "body" => Some(Region::Body),
            _ => None,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
