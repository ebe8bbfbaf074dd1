use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Customer contact data that must not leak into logs.
///
/// `Debug` and `Display` print a redacted form; serialization writes the
/// real value because API payloads and the backend need it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T: AsRef<str>> Masked<T> {
    /// Redacted rendering: e-mails keep their first letter and domain,
    /// everything else keeps only its last two characters.
    pub fn redacted(&self) -> String {
        let value = self.0.as_ref();
        if let Some((local, domain)) = value.split_once('@') {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            return format!("{}***@{}", first, domain);
        }

        let count = value.chars().count();
        if count <= 2 {
            return "***".to_string();
        }
        let tail: String = value.chars().skip(count - 2).collect();
        format!("***{}", tail)
    }
}

impl<T: AsRef<str>> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Masked({})", self.redacted())
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
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
