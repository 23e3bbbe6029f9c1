//! Structural type descriptions consumed by metric derivation.
use std::sync::Arc;

use crate::metric::Metric;
use crate::value::Value;

/// A structural description of the type of the values being compared.
#[derive(Clone)]
pub enum Schema {
    /// An atomic type with equality (integers, strings, floats, booleans).
    Atom,

    /// The variable nominal.
    Variable,

    /// A record type with ordered named fields.
    Record {
        /// Name of the record type.
        name: String,

        /// Ordered named fields and their schemas.
        fields: Vec<(String, Schema)>,
    },

    /// A tagged union over a closed set of case types.
    Union(Vec<Schema>),

    /// A collection with one element type.
    Collection(Box<Schema>),

    /// A type carrying an attached metric, used verbatim by derivation.
    Annotated {
        /// The underlying schema.
        inner: Box<Schema>,

        /// The metric to use for values of this type.
        metric: Arc<dyn Metric>,
    },
}

impl Schema {
    /// Creates a record schema.
    pub fn record<S, I, F>(name: S, fields: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (F, Schema)>,
        F: Into<String>,
    {
        Self::Record {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(field, schema)| (field.into(), schema))
                .collect(),
        }
    }

    /// Creates a union schema.
    pub fn union<I: IntoIterator<Item = Schema>>(cases: I) -> Self {
        Self::Union(cases.into_iter().collect())
    }

    /// Creates a collection schema.
    pub fn collection(elem: Schema) -> Self {
        Self::Collection(Box::new(elem))
    }

    /// Attaches a metric to a schema.
    pub fn annotated(inner: Schema, metric: Arc<dyn Metric>) -> Self {
        Self::Annotated {
            inner: Box::new(inner),
            metric,
        }
    }

    /// Returns true if values of this type may contain a variable: the type
    /// is the variable nominal, a union with a variable case, or a record
    /// with any field satisfying this predicate.
    pub fn may_contain_variable(&self) -> bool {
        match self {
            Self::Variable => true,
            Self::Union(cases) => cases.iter().any(|case| matches!(case, Self::Variable)),
            Self::Record { fields, .. } => fields
                .iter()
                .any(|(_, schema)| schema.may_contain_variable()),
            Self::Annotated { inner, .. } => inner.may_contain_variable(),
            _ => false,
        }
    }

    /// Returns true if the value is an instance of this schema's case. Used
    /// for case discrimination in union metrics.
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            Self::Atom => matches!(
                value,
                Value::Int(_) | Value::Str(_) | Value::Float(_) | Value::Bool(_)
            ),
            Self::Variable => matches!(value, Value::Var(_)),
            Self::Record { name, .. } => value
                .as_record()
                .is_some_and(|record| record.type_name == *name),
            Self::Union(cases) => cases.iter().any(|case| case.admits(value)),
            Self::Collection(_) => matches!(value, Value::Set(_) | Value::Seq(_)),
            Self::Annotated { inner, .. } => inner.admits(value),
        }
    }

    /// Returns the field names if this schema is a record, seeing through
    /// annotations.
    pub fn record_fields(&self) -> Option<Vec<&str>> {
        match self {
            Self::Record { fields, .. } => {
                Some(fields.iter().map(|(name, _)| name.as_str()).collect())
            }
            Self::Annotated { inner, .. } => inner.record_fields(),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Atom => write!(f, "Atom"),
            Self::Variable => write!(f, "Variable"),
            Self::Record { name, fields } => f
                .debug_struct("Record")
                .field("name", name)
                .field("fields", fields)
                .finish(),
            Self::Union(cases) => f.debug_tuple("Union").field(cases).finish(),
            Self::Collection(elem) => f.debug_tuple("Collection").field(elem).finish(),
            Self::Annotated { inner, .. } => f.debug_tuple("Annotated").field(inner).finish(),
        }
    }
}
