use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps participant contact and medical details so that `{:?}` and `{}` in
/// tracing macros print a mask. Serialization still emits the real value,
/// since the draft must round-trip through persisted progress and API responses.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }

    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl From<String> for Masked<String> {
    fn from(value: String) -> Self {
        Masked(value)
    }
}

impl From<&str> for Masked<String> {
    fn from(value: &str) -> Self {
        Masked(value.to_string())
    }
}

impl Masked<String> {
    /// Presence check used by form validation: blank after trimming counts as missing.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_debug_hides_value() {
        let phone = Masked::from("+44 7700 900123");
        assert_eq!(format!("{:?}", phone), "********");
        assert_eq!(format!("{}", phone), "********");
    }

    #[test]
    fn test_masked_serializes_real_value() {
        let email = Masked::from("hana@example.com");
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"hana@example.com\"");

        let back: Masked<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expose(), "hana@example.com");
    }

    #[test]
    fn test_blank_detection() {
        assert!(Masked::from("   ").is_blank());
        assert!(!Masked::from(" a ").is_blank());
    }
}
