use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "GROCERIES",
    "EATING_OUT",
    "TRANSPORTATION",
    "HOUSING",
    "HEALTHCARE",
    "PERSONAL_CARE",
    "ENTERTAINMENT",
    "SAVINGS_AND_INVESTMENTS",
    "DEBT_PAYMENT",
    "MISC",
];

pub const UNCATEGORIZED: &str = "UNCATEGORIZED";

/// A spending category drawn from the configured [`CategorySet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Known(String),
    Uncategorized,
}

impl Category {
    pub fn label(&self) -> &str {
        match self {
            Category::Known(label) => label,
            Category::Uncategorized => UNCATEGORIZED,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        if label == UNCATEGORIZED {
            Ok(Category::Uncategorized)
        } else {
            Ok(Category::Known(label))
        }
    }
}

/// Closed set of labels, fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    labels: Vec<String>,
}

impl CategorySet {
    /// Builds the set from configured labels. An absent or empty list yields
    /// the defaults.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for label in labels {
            let label = normalize(label.as_ref());
            if label.is_empty() || label == UNCATEGORIZED || normalized.contains(&label) {
                continue;
            }
            normalized.push(label);
        }

        if normalized.is_empty() {
            return Self::default();
        }
        Self { labels: normalized }
    }

    pub fn from_config(labels: Option<&[String]>) -> Self {
        match labels {
            Some(labels) => Self::from_labels(labels),
            None => Self::default(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Maps free text from a model onto the set.
    pub fn resolve(&self, raw: &str) -> Category {
        let wanted = normalize(raw);
        self.labels
            .iter()
            .find(|label| **label == wanted)
            .map(|label| Category::Known(label.clone()))
            .unwrap_or(Category::Uncategorized)
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            labels: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}
