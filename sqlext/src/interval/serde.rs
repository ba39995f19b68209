//! [`Interval`] serialized as its canonical text.
use ::serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use super::{Interval, Precision};

impl Serialize for Interval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format(Precision::Nano))
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Interval::parse(&text, Precision::Nano).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn json_text_form() {
        let i: Interval = "P1DT1.5S".parse().unwrap();
        assert_eq!(serde_json::to_string(&i).unwrap(), "\"P1DT1.5S\"");
        let back: Interval = serde_json::from_str("\"P1DT1.5S\"").unwrap();
        assert_eq!(back, i);
        assert!(serde_json::from_str::<Interval>("\"1 day\"").is_err());
    }
}
