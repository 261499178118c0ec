use serde::{Deserialize, Serialize};

/// Category chosen in the exercise picker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "name")]
pub enum CategorySelection {
    /// Every exercise is visible
    #[default]
    All,

    /// Only exercises tagged with this category
    Named(String),
}

impl CategorySelection {
    pub fn named(category: impl Into<String>) -> Self {
        Self::Named(category.into())
    }

    /// Parse a picker value, treating "all" (any case) as `All`
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }
}
