use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field of a partial update.
///
/// Servers send sparse updates: a key that is missing means "unchanged",
/// while an explicit `null` clears the value. Plain `Option<T>` cannot tell
/// the two apart, so decoded payloads carry this instead. Fields using it
/// must be annotated with `#[serde(default)]` so that missing keys decode to
/// [`FieldUpdate::Undefined`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// The key was absent from the update.
    Undefined,
    /// The key was present and explicitly `null`.
    Null,
    /// The key carried a value.
    Value(T),
}

impl<T> FieldUpdate<T> {
    /// Whether the update left this field untouched.
    pub fn is_undefined(&self) -> bool {
        matches!(self, FieldUpdate::Undefined)
    }

    /// Applies the update on top of `previous`.
    ///
    /// `Undefined` keeps `previous`, `Null` clears it, `Value` replaces it.
    pub fn resolve(self, previous: Option<T>) -> Option<T> {
        match self {
            FieldUpdate::Undefined => previous,
            FieldUpdate::Null => None,
            FieldUpdate::Value(value) => Some(value),
        }
    }

}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Undefined
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FieldUpdate::Value(value),
            None => FieldUpdate::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(FieldUpdate::from)
    }
}

impl<T> Serialize for FieldUpdate<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldUpdate::Value(value) => serializer.serialize_some(value),
            FieldUpdate::Undefined | FieldUpdate::Null => serializer.serialize_none(),
        }
    }
}
