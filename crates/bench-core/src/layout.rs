//! Physical layout identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How Person and Company data is arranged into documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// Separate company and person documents; persons carry `company_id`.
    Referenced,
    /// Person documents each carrying a copy of their company.
    EmbeddedSingle,
    /// Company documents each carrying their list of employees.
    EmbeddedArray,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 3] = [
        LayoutKind::Referenced,
        LayoutKind::EmbeddedSingle,
        LayoutKind::EmbeddedArray,
    ];

    /// Default batch size for this layout.
    ///
    /// The embedded-array layout batches whole companies with their
    /// employees, so its unit is much larger.
    pub fn default_batch_size(self) -> usize {
        match self {
            LayoutKind::Referenced | LayoutKind::EmbeddedSingle => 2_000,
            LayoutKind::EmbeddedArray => 100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Referenced => "referenced",
            LayoutKind::EmbeddedSingle => "embedded-single",
            LayoutKind::EmbeddedArray => "embedded-array",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_sizes() {
        assert_eq!(LayoutKind::Referenced.default_batch_size(), 2_000);
        assert_eq!(LayoutKind::EmbeddedSingle.default_batch_size(), 2_000);
        assert_eq!(LayoutKind::EmbeddedArray.default_batch_size(), 100);
    }

    #[test]
    fn test_display() {
        assert_eq!(LayoutKind::EmbeddedArray.to_string(), "embedded-array");
    }
}
