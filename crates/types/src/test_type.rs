/// Kind of clinical measurement carried by a reading.
///
/// Names the store does not recognise are kept verbatim in [`TestType::Unknown`] so that a
/// reading written by a newer client still round-trips; the risk engine gives such readings
/// no weight.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TestType {
    GlucoseLevel,
    HeartRate,
    Temperature,
    RespiratoryRate,
    OxygenSaturation,
    Unknown(String),
}

impl TestType {
    /// Every test type the risk engine has a band and a weight for.
    pub const KNOWN: [TestType; 5] = [
        TestType::GlucoseLevel,
        TestType::HeartRate,
        TestType::Temperature,
        TestType::RespiratoryRate,
        TestType::OxygenSaturation,
    ];

    /// Display name used on the wire ("Glucose Level", "Heart Rate", ...).
    pub fn as_str(&self) -> &str {
        match self {
            TestType::GlucoseLevel => "Glucose Level",
            TestType::HeartRate => "Heart Rate",
            TestType::Temperature => "Temperature",
            TestType::RespiratoryRate => "Respiratory Rate",
            TestType::OxygenSaturation => "Oxygen Saturation",
            TestType::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TestType::Unknown(_))
    }

    /// Parses a wire or CLI name.
    ///
    /// Matching ignores case, spaces, `-` and `_`, so "Glucose Level", "GlucoseLevel" and
    /// "glucose-level" are the same type. Anything else becomes [`TestType::Unknown`].
    pub fn from_name(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "glucoselevel" => TestType::GlucoseLevel,
            "heartrate" => TestType::HeartRate,
            "temperature" => TestType::Temperature,
            "respiratoryrate" => TestType::RespiratoryRate,
            "oxygensaturation" => TestType::OxygenSaturation,
            _ => TestType::Unknown(name.trim().to_owned()),
        }
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TestType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TestType::from_name(s))
    }
}

impl serde::Serialize for TestType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for TestType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TestType::from_name(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_display_and_camel_case_names() {
        assert_eq!(TestType::from_name("Glucose Level"), TestType::GlucoseLevel);
        assert_eq!(TestType::from_name("GlucoseLevel"), TestType::GlucoseLevel);
        assert_eq!(TestType::from_name("heart-rate"), TestType::HeartRate);
        assert_eq!(
            TestType::from_name("oxygen_saturation"),
            TestType::OxygenSaturation
        );
    }

    #[test]
    fn keeps_unknown_names_verbatim() {
        let t = TestType::from_name(" Blood Pressure ");
        assert_eq!(t, TestType::Unknown("Blood Pressure".into()));
        assert!(!t.is_known());
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"Blood Pressure\"");
    }

    #[test]
    fn known_types_round_trip_through_wire_names() {
        for t in TestType::KNOWN {
            let json = serde_json::to_string(&t).unwrap();
            let back: TestType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, t);
        }
    }
}
