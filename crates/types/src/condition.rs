use crate::TextError;
use std::str::FromStr;

/// Categorical risk label for a patient or a single reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    Normal,
    Critical,
}

impl Condition {
    /// Wire label, as exchanged with the store.
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Normal => "Normal",
            Condition::Critical => "Critical",
        }
    }

    pub fn is_critical(self) -> bool {
        matches!(self, Condition::Critical)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = TextError;

    /// Parses a condition label case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("normal") {
            Ok(Condition::Normal)
        } else if trimmed.eq_ignore_ascii_case("critical") {
            Ok(Condition::Critical)
        } else {
            Err(TextError::UnknownCondition(trimmed.to_owned()))
        }
    }
}

impl serde::Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Condition selector used by the patient directory.
///
/// `All` disables the condition predicate; the other variants require an exact match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConditionFilter {
    #[default]
    All,
    Only(Condition),
}

impl ConditionFilter {
    pub fn matches(self, condition: Condition) -> bool {
        match self {
            ConditionFilter::All => true,
            ConditionFilter::Only(wanted) => wanted == condition,
        }
    }
}

impl From<Condition> for ConditionFilter {
    fn from(condition: Condition) -> Self {
        ConditionFilter::Only(condition)
    }
}

impl std::fmt::Display for ConditionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionFilter::All => f.write_str("All"),
            ConditionFilter::Only(condition) => condition.fmt(f),
        }
    }
}

impl FromStr for ConditionFilter {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(ConditionFilter::All);
        }
        trimmed
            .parse::<Condition>()
            .map(ConditionFilter::Only)
            .map_err(|_| TextError::UnknownFilter(trimmed.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("Critical".parse::<Condition>(), Ok(Condition::Critical));
        assert_eq!(" normal ".parse::<Condition>(), Ok(Condition::Normal));
        assert_eq!(
            "stable".parse::<Condition>(),
            Err(TextError::UnknownCondition("stable".into()))
        );
    }

    #[test]
    fn serialises_to_wire_label() {
        let json = serde_json::to_string(&Condition::Critical).unwrap();
        assert_eq!(json, "\"Critical\"");
        let back: Condition = serde_json::from_str("\"Normal\"").unwrap();
        assert_eq!(back, Condition::Normal);
    }

    #[test]
    fn filter_all_matches_everything() {
        assert!(ConditionFilter::All.matches(Condition::Normal));
        assert!(ConditionFilter::All.matches(Condition::Critical));
        assert!(!ConditionFilter::Only(Condition::Normal).matches(Condition::Critical));
    }

    #[test]
    fn filter_parses_all_and_conditions() {
        assert_eq!("ALL".parse::<ConditionFilter>(), Ok(ConditionFilter::All));
        assert_eq!(
            "critical".parse::<ConditionFilter>(),
            Ok(ConditionFilter::Only(Condition::Critical))
        );
        assert!(matches!(
            "some".parse::<ConditionFilter>(),
            Err(TextError::UnknownFilter(_))
        ));
    }
}
