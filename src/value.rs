//! Reflective value model for the objects being compared.
//!
//! Product, union, and latent metrics need runtime access to fields, case
//! tags, and nested variables, so compared objects are represented as
//! [`Value`] trees rather than arbitrary Rust types. Values are cheap to
//! clone, comparable, and hashable (floats through [`OrderedFloat`]).
use ordered_float::OrderedFloat;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::GraphValue;

/// An opaque nominal identity bound during latent matching.
///
/// Equality and hashing are defined by the name alone; the name carries no
/// meaning beyond identity.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(
    /// The name identifying the variable.
    pub String,
);

impl Variable {
    /// Creates a variable with the given name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// Returns the name of the variable.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A record value: a type name plus ordered named fields.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    /// Name of the record type, used for case discrimination.
    pub type_name: String,

    /// Ordered named fields.
    pub fields: Vec<(String, Value)>,
}

impl Record {
    /// Creates a record value.
    pub fn new<S, I, F>(type_name: S, fields: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (F, Value)>,
        F: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Returns the value of the named field, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

/// A structured value to be compared by a metric.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// An integer atom.
    Int(i64),

    /// A string atom.
    Str(String),

    /// A float atom, hashable through [`OrderedFloat`].
    Float(OrderedFloat<f64>),

    /// A boolean atom.
    Bool(bool),

    /// A latent variable.
    Var(Variable),

    /// A record with named fields.
    Record(Record),

    /// An unordered collection. Element order is only used to index the
    /// matching witness.
    Set(Vec<Value>),

    /// An ordered collection, aligned order-preservingly.
    Seq(Vec<Value>),

    /// A directed graph over values.
    Graph(GraphValue),
}

impl Value {
    /// Creates a variable value.
    pub fn var<S: Into<String>>(name: S) -> Self {
        Self::Var(Variable::new(name))
    }

    /// Creates a record value.
    pub fn record<S, I, F>(type_name: S, fields: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (F, Value)>,
        F: Into<String>,
    {
        Self::Record(Record::new(type_name, fields))
    }

    /// Creates an unordered collection value.
    pub fn set<I: IntoIterator<Item = Value>>(elements: I) -> Self {
        Self::Set(elements.into_iter().collect())
    }

    /// Creates an ordered collection value.
    pub fn seq<I: IntoIterator<Item = Value>>(elements: I) -> Self {
        Self::Seq(elements.into_iter().collect())
    }

    /// Returns the elements if the value is a collection (set or sequence).
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Self::Set(elements) | Self::Seq(elements) => Some(elements),
            _ => None,
        }
    }

    /// Returns the record if the value is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the variable if the value is one.
    pub fn as_var(&self) -> Option<&Variable> {
        match self {
            Self::Var(var) => Some(var),
            _ => None,
        }
    }

    /// Collects the variables reachable through fields and nested
    /// collections, deduplicated in first-occurrence order.
    ///
    /// Strings are opaque atoms, not collections.
    pub fn variables(&self) -> Vec<Variable> {
        let mut seen = Vec::new();
        self.collect_variables(&mut seen);
        seen
    }

    fn collect_variables(&self, seen: &mut Vec<Variable>) {
        match self {
            Self::Var(var) => {
                if !seen.contains(var) {
                    seen.push(var.clone());
                }
            }
            Self::Record(record) => {
                for (_, value) in &record.fields {
                    value.collect_variables(seen);
                }
            }
            Self::Set(elements) | Self::Seq(elements) => {
                for element in elements {
                    element.collect_variables(seen);
                }
            }
            Self::Graph(graph) => {
                for node in &graph.nodes {
                    node.collect_variables(seen);
                }
            }
            _ => {}
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(OrderedFloat(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Variable> for Value {
    fn from(v: Variable) -> Self {
        Self::Var(v)
    }
}
