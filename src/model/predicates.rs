use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Iri, Value};

/// Attribute map of an entity: predicate → set of values.
///
/// A predicate with no remaining values is removed, so an empty store and a
/// store whose values were all removed compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicates {
    values: BTreeMap<Iri, BTreeSet<Value>>,
}

impl Predicates {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `predicate`. Returns `false` if it was already present.
    pub fn add_value(&mut self, predicate: Iri, value: Value) -> bool {
        self.values.entry(predicate).or_default().insert(value)
    }

    /// Removes `value` from `predicate`. Returns `false` if there was nothing to remove.
    pub fn remove_value(&mut self, predicate: &Iri, value: &Value) -> bool {
        let Some(values) = self.values.get_mut(predicate) else {
            return false;
        };
        let removed = values.remove(value);
        if values.is_empty() {
            self.values.remove(predicate);
        }
        removed
    }

    #[must_use]
    pub fn has_value(&self, predicate: &Iri) -> bool {
        self.values.contains_key(predicate)
    }

    #[must_use]
    pub fn has_this_value(&self, predicate: &Iri, value: &Value) -> bool {
        self.values
            .get(predicate)
            .is_some_and(|values| values.contains(value))
    }

    /// Values stored under `predicate`; empty when there are none.
    #[must_use]
    pub fn value(&self, predicate: &Iri) -> BTreeSet<Value> {
        self.values.get(predicate).cloned().unwrap_or_default()
    }

    /// Referenced identifiers stored under `predicate`, ignoring literals.
    pub fn references<'a>(&'a self, predicate: &Iri) -> impl Iterator<Item = &'a Iri> + 'a {
        self.values
            .get(predicate)
            .into_iter()
            .flatten()
            .filter_map(Value::as_reference)
    }

    /// Every predicate/value pair in predicate order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Iri, &Value)> {
        self.values
            .iter()
            .flat_map(|(predicate, values)| values.iter().map(move |value| (predicate, value)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Iri, &BTreeSet<Value>)> {
        self.values.iter()
    }

    /// Adds every pair of `other`, returning how many were new.
    pub fn merge(&mut self, other: &Self) -> usize {
        other
            .pairs()
            .filter(|(predicate, value)| self.add_value((*predicate).clone(), (*value).clone()))
            .count()
    }

    /// Removes every pair of `other`, returning how many were present.
    pub fn subtract(&mut self, other: &Self) -> usize {
        other
            .pairs()
            .filter(|(predicate, value)| self.remove_value(predicate, value))
            .count()
    }

    /// Pairs of `self` that `other` does not hold.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.pairs()
            .filter(|(predicate, value)| !other.has_this_value(predicate, value))
            .map(|(predicate, value)| (predicate.clone(), value.clone()))
            .collect()
    }

    /// Pairs held by both `self` and `other`.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.pairs()
            .filter(|(predicate, value)| other.has_this_value(predicate, value))
            .map(|(predicate, value)| (predicate.clone(), value.clone()))
            .collect()
    }

    /// Number of predicate/value pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(Iri, Value)> for Predicates {
    fn from_iter<I: IntoIterator<Item = (Iri, Value)>>(iter: I) -> Self {
        let mut predicates = Self::new();
        for (predicate, value) in iter {
            predicates.add_value(predicate, value);
        }
        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::Predicates;
    use crate::model::{Iri, Value};

    fn iri(text: &str) -> Iri {
        Iri::new(text).expect("valid iri")
    }

    #[test]
    fn adding_is_idempotent() {
        let mut predicates = Predicates::new();
        let name = iri("http://example.org/name");
        assert!(predicates.add_value(name.clone(), Value::from("Alice")));
        assert!(!predicates.add_value(name.clone(), Value::from("Alice")));
        assert_eq!(predicates.len(), 1);
        assert!(predicates.has_this_value(&name, &Value::from("Alice")));
    }

    #[test]
    fn removing_absent_values_is_a_no_op() {
        let mut predicates = Predicates::new();
        let name = iri("http://example.org/name");
        assert!(!predicates.remove_value(&name, &Value::from("Alice")));
        predicates.add_value(name.clone(), Value::from("Alice"));
        assert!(!predicates.remove_value(&name, &Value::from("Bob")));
        assert!(predicates.remove_value(&name, &Value::from("Alice")));
        assert!(!predicates.has_value(&name));
        assert!(predicates.value(&name).is_empty());
        assert_eq!(predicates, Predicates::new());
    }

    #[test]
    fn merge_and_subtract_are_precise() {
        let name = iri("http://example.org/name");
        let mut base: Predicates = [(name.clone(), Value::from("Alice"))].into_iter().collect();
        let edit: Predicates = [
            (name.clone(), Value::from("Alice")),
            (name.clone(), Value::from("Ally")),
        ]
        .into_iter()
        .collect();

        assert_eq!(base.merge(&edit), 1);
        assert_eq!(base.len(), 2);

        let undo: Predicates = [(name.clone(), Value::from("Ally"))].into_iter().collect();
        assert_eq!(base.subtract(&undo), 1);
        assert_eq!(base.value(&name).len(), 1);
        assert!(base.has_this_value(&name, &Value::from("Alice")));
    }

    #[test]
    fn difference_and_intersection_split_on_stored_pairs() {
        let name = iri("http://example.org/name");
        let stored: Predicates = [(name.clone(), Value::from("Alice"))].into_iter().collect();
        let edit: Predicates = [
            (name.clone(), Value::from("Alice")),
            (name.clone(), Value::from("Al")),
        ]
        .into_iter()
        .collect();

        let added = edit.difference(&stored);
        assert_eq!(added.len(), 1);
        assert!(added.has_this_value(&name, &Value::from("Al")));

        let present = edit.intersection(&stored);
        assert_eq!(present, stored);
        assert!(Predicates::new().intersection(&edit).is_empty());
    }
}
