/// ID types for Drill Player entities
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exercise identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(String);

impl ExerciseId {
    /// Create a new exercise ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExerciseId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ExerciseId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_id_is_transparent_in_json() {
        let id = ExerciseId::new("scales-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"scales-1\"");

        let back: ExerciseId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_string(), "scales-1");
    }
}
