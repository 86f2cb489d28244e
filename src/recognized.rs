use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value that was either successfully recognized as a known variant `T`,
/// or is an unrecognized raw value `Raw`.
///
/// Traces come from arbitrary capture tools, so enum-like fields (draw kinds,
/// primitive modes, component type codes) keep whatever raw value they carried.
/// Whether an unknown value is an error is decided by the code that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recognized<T, Raw = String> {
    Known(T),
    Unknown(Raw),
}

impl<T, Raw> Recognized<T, Raw> {
    /// Classify a raw value, keeping it verbatim when `T` does not recognize it.
    pub fn from_raw(raw: Raw) -> Self
    where
        T: for<'a> TryFrom<&'a Raw>,
    {
        let known = T::try_from(&raw).ok();
        match known {
            Some(known) => Recognized::Known(known),
            None => Recognized::Unknown(raw),
        }
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            Recognized::Known(t) => Some(t),
            Recognized::Unknown(_) => None,
        }
    }

    /// Convert back to the raw representation.
    pub fn to_raw(&self) -> Raw
    where
        T: Clone,
        Raw: Clone + From<T>,
    {
        match self {
            Recognized::Known(t) => Raw::from(t.clone()),
            Recognized::Unknown(raw) => raw.clone(),
        }
    }
}

impl<'de, T, Raw> Deserialize<'de> for Recognized<T, Raw>
where
    T: for<'a> TryFrom<&'a Raw>,
    Raw: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Raw::deserialize(deserializer).map(Recognized::from_raw)
    }
}

impl<T, Raw> Serialize for Recognized<T, Raw>
where
    T: Clone,
    Raw: Clone + From<T> + Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(serializer)
    }
}
