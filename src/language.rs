//! Natural languages the checker supports

use serde::{Deserialize, Serialize};
use std::fmt;

/// A language grouping in the rules tree (e.g., "en" / "English")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language {
    /// Short identifier rules refer to (e.g., "en-US")
    pub id: String,

    /// Name shown in the tree and matched by the filter
    pub display_name: String,
}

impl Language {
    pub fn new(id: &str, display_name: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}
