//! Paths locating sub-objects inside structured values.
//!
//! A [`Path`] is an ordered sequence of components, each either a field name
//! or a collection index, with wildcard forms usable as selectors. Its string
//! representation follows a JMESPath-like dot/bracket notation: `@` for the
//! root, `.name` for a field step, `[3]` for an index step, and `.*` / `[*]`
//! for the wildcard forms.
use std::fmt::Display;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::errors::SimatchError;

/// A single step in a [`Path`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathComponent {
    /// A named field of a record.
    Field(String),

    /// Selector form matching any field name at this position.
    AnyField,

    /// An index into a collection.
    Index(usize),

    /// Selector form matching any index at this position.
    AnyIndex,
}

impl PathComponent {
    /// Returns true if this component, used as a selector, covers `other`.
    ///
    /// Wildcards cover any component of the same kind; concrete components
    /// cover only their exact equals. Field and index components never cover
    /// each other.
    fn covers(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Field(a), Self::Field(b)) => a == b,
            (Self::AnyField, Self::Field(_) | Self::AnyField) => true,
            (Self::Index(a), Self::Index(b)) => a == b,
            (Self::AnyIndex, Self::Index(_) | Self::AnyIndex) => true,
            _ => false,
        }
    }
}

impl From<&str> for PathComponent {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<usize> for PathComponent {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// An immutable path from the root of a structured value to a sub-object.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use simatch::Path;
///
/// let path = "a.b[1].c".parse::<Path>()?;
/// assert_eq!(format!("{path}"), "a.b[1].c");
///
/// let selector = "a.b[*].c".parse::<Path>()?;
/// assert!(selector.selects(&path));
/// # Ok(())
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    components: Vec<PathComponent>,
}

impl Path {
    /// Creates the root path.
    pub const fn root() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Creates a path from components.
    pub fn from_components<I>(components: I) -> Self
    where
        I: IntoIterator<Item = PathComponent>,
    {
        Self {
            components: components.into_iter().collect(),
        }
    }

    /// Returns true if the path is the root path.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the number of components in the path.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the path has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the components of the path.
    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    /// Returns a new path with the component placed in front.
    pub fn prepend<C>(&self, component: C) -> Self
    where
        C: Into<PathComponent>,
    {
        let mut components = Vec::with_capacity(self.components.len() + 1);
        components.push(component.into());
        components.extend(self.components.iter().cloned());
        Self { components }
    }

    /// Returns a new path with the component placed at the end.
    pub fn append<C>(&self, component: C) -> Self
    where
        C: Into<PathComponent>,
    {
        let mut components = self.components.clone();
        components.push(component.into());
        Self { components }
    }

    /// Returns true if this path, used as a selector, selects `other`.
    ///
    /// The paths must have the same length, and every component of this path
    /// must cover the corresponding component of `other`.
    pub fn selects(&self, other: &Self) -> bool {
        self.components.len() == other.components.len()
            && self
                .components
                .iter()
                .zip(&other.components)
                .all(|(sel, comp)| sel.covers(comp))
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.components.is_empty() {
            return write!(f, "@");
        }
        for (i, component) in self.components.iter().enumerate() {
            match component {
                PathComponent::Field(name) if i == 0 => write!(f, "{name}")?,
                PathComponent::Field(name) => write!(f, ".{name}")?,
                PathComponent::AnyField if i == 0 => write!(f, "*")?,
                PathComponent::AnyField => write!(f, ".*")?,
                PathComponent::Index(index) => write!(f, "[{index}]")?,
                PathComponent::AnyIndex => write!(f, "[*]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = SimatchError;

    fn from_str(s: &str) -> Result<Self> {
        let mut components = Vec::new();
        let mut chars = s.chars().peekable();
        let mut first = true;
        while let Some(&c) = chars.peek() {
            match c {
                '@' => {
                    if !first {
                        return Err(invalid_path(s));
                    }
                    chars.next();
                }
                '.' => {
                    chars.next();
                    let name = take_name(&mut chars);
                    if name.is_empty() {
                        return Err(invalid_path(s));
                    }
                    components.push(field_component(&name));
                }
                '[' => {
                    chars.next();
                    let token = take_name(&mut chars);
                    if chars.next() != Some(']') {
                        return Err(invalid_path(s));
                    }
                    if token == "*" {
                        components.push(PathComponent::AnyIndex);
                    } else {
                        let index = token.parse::<usize>().map_err(|_| invalid_path(s))?;
                        components.push(PathComponent::Index(index));
                    }
                }
                _ => {
                    if !first {
                        return Err(invalid_path(s));
                    }
                    let name = take_name(&mut chars);
                    if name.is_empty() {
                        return Err(invalid_path(s));
                    }
                    components.push(field_component(&name));
                }
            }
            first = false;
        }
        Ok(Self { components })
    }
}

fn take_name(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if matches!(c, '@' | '.' | '[' | ']') {
            break;
        }
        name.push(c);
        chars.next();
    }
    name
}

fn field_component(name: &str) -> PathComponent {
    if name == "*" {
        PathComponent::AnyField
    } else {
        PathComponent::Field(name.to_string())
    }
}

fn invalid_path(s: &str) -> SimatchError {
    SimatchError::InvalidConfiguration(format!("Invalid path: {s}"))
}
