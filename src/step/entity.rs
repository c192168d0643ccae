use std::fmt;

use super::value::StepValue;

/// Instance label of an entity in the DATA section (`#id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Named attribute values in insertion order.
///
/// Setting a name twice keeps the first position and the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Vec<(String, StepValue)>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Chaining form of [`Attributes::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<StepValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<StepValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StepValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StepValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<StepValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.set(name, value);
        }
        attributes
    }
}

/// One `#id=TYPE(...)` line before serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: EntityId,
    pub type_name: String,
    pub attributes: Attributes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_replaces_in_place() {
        let attributes = Attributes::new()
            .with("Name", "first")
            .with("Description", StepValue::Null)
            .with("Name", "second");

        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes.names().collect::<Vec<_>>(), ["Name", "Description"]);
        assert_eq!(
            attributes.get("Name"),
            Some(&StepValue::String("second".to_string()))
        );
    }

    #[test]
    fn test_entity_id_display() {
        assert_eq!(EntityId::new(42).to_string(), "#42");
    }
}
