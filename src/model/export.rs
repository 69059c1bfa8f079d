//! Textual RDF for a single entity.
//!
//! Both renderings go through the same value → term mapping, so a literal's
//! lexical form and datatype never differ between them.

use chrono::SecondsFormat;
use oxrdf::{vocab::xsd, Literal, LiteralRef, NamedNodeRef, Term, Triple};

use super::{Entity, Iri, Value};

/// Object position of a value: a reference or a typed literal.
enum Object<'a> {
    Reference(&'a Iri),
    Literal(String, NamedNodeRef<'static>),
}

fn object(value: &Value) -> Object<'_> {
    match value {
        Value::Reference(iri) => Object::Reference(iri),
        Value::String(text) => Object::Literal(text.clone(), xsd::STRING),
        Value::DateTime(at) => Object::Literal(
            at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            xsd::DATE_TIME,
        ),
        Value::Date(date) => Object::Literal(date.format("%Y-%m-%d").to_string(), xsd::DATE),
        Value::Integer(number) => Object::Literal(number.to_string(), xsd::INTEGER),
        Value::Double(number) => Object::Literal(double_lexical(*number), xsd::DOUBLE),
    }
}

fn double_lexical(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number.is_infinite() {
        if number.is_sign_positive() { "INF" } else { "-INF" }.to_string()
    } else {
        format!("{number:?}")
    }
}

/// RDF term for a value.
#[must_use]
pub fn to_term(value: &Value) -> Term {
    match object(value) {
        Object::Reference(iri) => iri.to_named_node().into(),
        Object::Literal(lexical, datatype) => Literal::new_typed_literal(lexical, datatype).into(),
    }
}

/// Renders a value the way it appears in object position.
///
/// References are angle-bracketed; literals always carry their datatype,
/// including `xsd:string`.
#[must_use]
pub fn format_value(value: &Value) -> String {
    match object(value) {
        Object::Reference(iri) => format!("<{iri}>"),
        Object::Literal(lexical, datatype) => {
            format!("{}^^{datatype}", LiteralRef::new_simple_literal(&lexical))
        }
    }
}

/// One Turtle subject block: the identifier on the first line, one
/// `<predicate> value;` line per pair, and a closing `.` line.
///
/// An entity without predicates renders as an empty string.
#[must_use]
pub fn to_triples(entity: &Entity) -> String {
    if entity.predicates().is_empty() {
        return String::new();
    }

    let mut out = format!("<{}>\n", entity.id());
    for (predicate, value) in entity.predicates().pairs() {
        out.push_str(&format!("    <{predicate}> {};\n", format_value(value)));
    }
    out.push_str("    .\n");
    out
}

/// Entity as RDF triples.
#[must_use]
pub fn to_oxrdf_triples(entity: &Entity) -> Vec<Triple> {
    let subject = entity.id().to_named_node();
    entity
        .predicates()
        .pairs()
        .map(|(predicate, value)| {
            Triple::new(subject.clone(), predicate.to_named_node(), to_term(value))
        })
        .collect()
}

/// Entity as N-Triples, one statement per line.
#[must_use]
pub fn to_ntriples(entity: &Entity) -> String {
    to_oxrdf_triples(entity)
        .iter()
        .map(|triple| format!("{triple} .\n"))
        .collect()
}
