use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Value object ensuring that supplied text represents a valid IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri {
    value: String,
}

impl Iri {
    /// Validates and constructs a new [`Iri`] value object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedIdentifier`] when the text is not an
    /// absolute IRI. Malformed identifiers are never stored.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        NamedNode::new(value.as_str()).map_err(|_| Error::MalformedIdentifier {
            value: value.clone(),
        })?;
        Ok(Self { value })
    }

    /// Creates a fresh identifier inside `namespace` from a random UUID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedIdentifier`] when the namespace does not form
    /// a valid IRI prefix.
    pub fn mint(namespace: &str) -> Result<Self> {
        Self::new(format!("{namespace}{}", uuid::Uuid::new_v4()))
    }

    /// Returns the underlying textual representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the fragment or last path segment, e.g. `person` for
    /// `https://hqdmtop.github.io/hqdm#person`.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.value
            .rsplit(['#', '/'])
            .next()
            .unwrap_or(self.value.as_str())
    }

    pub(crate) fn to_named_node(&self) -> NamedNode {
        NamedNode::new_unchecked(self.value.as_str())
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Iri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for Iri {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Iri> for String {
    fn from(value: Iri) -> Self {
        value.value
    }
}

/// A single object stored against a predicate.
///
/// Values compare structurally; doubles use their total order so that every
/// value can live in an ordered set.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Reference to another entity.
    Reference(Iri),
    String(String),
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
    Integer(i64),
    Double(f64),
}

impl Value {
    /// Parses `iri` and wraps it as a reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedIdentifier`] for an invalid IRI.
    pub fn reference(iri: &str) -> Result<Self> {
        Ok(Self::Reference(Iri::new(iri)?))
    }

    /// Returns the referenced identifier, if this value is a reference.
    #[must_use]
    pub fn as_reference(&self) -> Option<&Iri> {
        match self {
            Self::Reference(iri) => Some(iri),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Reference(_) => 0,
            Self::String(_) => 1,
            Self::DateTime(_) => 2,
            Self::Date(_) => 3,
            Self::Integer(_) => 4,
            Self::Double(_) => 5,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Reference(a), Self::Reference(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a
                .cmp(b)
                .then_with(|| a.offset().local_minus_utc().cmp(&b.offset().local_minus_utc())),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Double(a), Self::Double(b)) => a.total_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Reference(iri) => iri.hash(state),
            Self::String(text) => text.hash(state),
            Self::DateTime(at) => {
                at.hash(state);
                at.offset().local_minus_utc().hash(state);
            }
            Self::Date(date) => date.hash(state),
            Self::Integer(number) => number.hash(state),
            Self::Double(number) => number.to_bits().hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference(iri) => write!(f, "<{iri}>"),
            Self::String(text) => f.write_str(text),
            Self::DateTime(at) => f.write_str(&at.to_rfc3339()),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Integer(number) => write!(f, "{number}"),
            Self::Double(number) => write!(f, "{number}"),
        }
    }
}

impl From<Iri> for Value {
    fn from(value: Iri) -> Self {
        Self::Reference(value)
    }
}

impl From<&Iri> for Value {
    fn from(value: &Iri) -> Self {
        Self::Reference(value.clone())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value.into())
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}
