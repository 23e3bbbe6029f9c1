//! Matching witnesses and the hook mechanism observing them.
//!
//! Every score computation can explain itself: alongside the score, a metric
//! emits a [`Matching`], the list of pair-by-pair [`Match`]es that produced
//! it. [`Hooks`] observe matches along path selectors as a matching is
//! replayed.
use std::fmt::Display;

use crate::errors::Result;
use crate::path::Path;
use crate::value::Value;

/// One matched pair of sub-objects together with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Path of the matched sub-object on the prediction side.
    pub pred_path: Path,

    /// The matched prediction sub-object.
    pub pred: Value,

    /// Path of the matched sub-object on the gold side.
    pub gold_path: Path,

    /// The matched gold sub-object.
    pub gold: Value,

    /// Score of the pair.
    pub score: f64,
}

impl Match {
    /// Creates a match of two whole objects at the root.
    pub fn at_root(pred: Value, gold: Value, score: f64) -> Self {
        Self {
            pred_path: Path::root(),
            pred,
            gold_path: Path::root(),
            gold,
            score,
        }
    }

    /// Returns true if both sides of the match are at the root.
    pub fn is_root(&self) -> bool {
        self.pred_path.is_root() && self.gold_path.is_root()
    }
}

impl Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} -> {} ({})", self.pred_path, self.gold_path, self.score)
    }
}

/// A finite collection of matches in emission order. Never mutated after
/// construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matching {
    matches: Vec<Match>,
}

impl Matching {
    /// Creates a matching from matches in emission order.
    pub fn new<I: IntoIterator<Item = Match>>(matches: I) -> Self {
        Self {
            matches: matches.into_iter().collect(),
        }
    }

    /// Creates an empty matching.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a matching holding a single root-to-root match.
    pub fn single_root(pred: Value, gold: Value, score: f64) -> Self {
        Self::new([Match::at_root(pred, gold, score)])
    }

    /// Creates a matching from index triples over two element slices: a root
    /// match carrying the total score, followed by one match per selected
    /// `(i, j, score)` pair with the element index as its path.
    pub fn from_index_triples(
        pred: &Value,
        gold: &Value,
        score: f64,
        xs: &[Value],
        ys: &[Value],
        triples: &[(usize, usize, f64)],
    ) -> Self {
        let mut matches = Vec::with_capacity(triples.len() + 1);
        matches.push(Match::at_root(pred.clone(), gold.clone(), score));
        for &(i, j, s) in triples {
            matches.push(Match {
                pred_path: Path::root().prepend(i),
                pred: xs[i].clone(),
                gold_path: Path::root().prepend(j),
                gold: ys[j].clone(),
                score: s,
            });
        }
        Self { matches }
    }

    /// Returns the matches in emission order.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Returns the number of matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Returns true if no matches were emitted.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Returns an iterator over the matches in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    /// Replays the matching through the hooks: for every match, in emission
    /// order, each hook whose selector selects the match's prediction path is
    /// invoked.
    pub fn run_with_hooks(&self, hooks: &mut Hooks<'_>, data_id: usize) {
        for m in &self.matches {
            for (selector, hook) in &mut hooks.entries {
                if selector.selects(&m.pred_path) {
                    hook(data_id, &m.pred_path, &m.pred, &m.gold_path, &m.gold, m.score);
                }
            }
        }
    }
}

impl IntoIterator for Matching {
    type Item = Match;
    type IntoIter = std::vec::IntoIter<Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a> IntoIterator for &'a Matching {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

/// A callback observing one match: receives the sample id, the prediction
/// path and object, the gold path and object, and the pair score.
pub type Hook<'a> = Box<dyn FnMut(usize, &Path, &Value, &Path, &Value, f64) + 'a>;

/// An ordered set of `(selector, hook)` pairs.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use simatch::{Hooks, Match, Matching, Value};
///
/// let mut pairs = Vec::new();
/// let mut hooks = Hooks::new();
/// hooks.on("[*]", |_, _, pred, _, gold, _| {
///     pairs.push((pred.clone(), gold.clone()));
/// })?;
///
/// let matching = Matching::from_index_triples(
///     &Value::set([Value::from(1)]),
///     &Value::set([Value::from(1)]),
///     1.0,
///     &[Value::from(1)],
///     &[Value::from(1)],
///     &[(0, 0, 1.0)],
/// );
/// matching.run_with_hooks(&mut hooks, 0);
/// drop(hooks);
/// assert_eq!(pairs, vec![(Value::from(1), Value::from(1))]);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Hooks<'a> {
    entries: Vec<(Path, Hook<'a>)>,
}

impl<'a> Hooks<'a> {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook under a string selector.
    ///
    /// # Errors
    ///
    /// * [`crate::errors::SimatchError::InvalidConfiguration`] if the
    ///   selector does not parse as a path.
    pub fn on<F>(&mut self, selector: &str, hook: F) -> Result<()>
    where
        F: FnMut(usize, &Path, &Value, &Path, &Value, f64) + 'a,
    {
        let selector = selector.parse::<Path>()?;
        self.entries.push((selector, Box::new(hook)));
        Ok(())
    }

    /// Registers a hook under a parsed selector.
    pub fn add(&mut self, selector: Path, hook: Hook<'a>) {
        self.entries.push((selector, hook));
    }

    /// Returns the number of registered hooks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matching() -> Matching {
        let xs = [Value::from(1), Value::from(2)];
        let ys = [Value::from(1), Value::from(2)];
        Matching::from_index_triples(
            &Value::set(xs.clone()),
            &Value::set(ys.clone()),
            2.0,
            &xs,
            &ys,
            &[(0, 0, 1.0), (1, 1, 1.0)],
        )
    }

    #[test]
    fn test_run_with_hooks_selects_elements() {
        let matching = sample_matching();
        let mut seen = Vec::new();
        {
            let mut hooks = Hooks::new();
            hooks
                .on("[*]", |data_id, _, pred, _, gold, score| {
                    seen.push((data_id, pred.clone(), gold.clone(), score));
                })
                .unwrap();
            matching.run_with_hooks(&mut hooks, 7);
        }
        assert_eq!(
            seen,
            vec![
                (7, Value::from(1), Value::from(1), 1.0),
                (7, Value::from(2), Value::from(2), 1.0),
            ]
        );
    }

    #[test]
    fn test_run_with_hooks_root_selector() {
        let matching = sample_matching();
        let mut roots = 0;
        {
            let mut hooks = Hooks::new();
            hooks.on("@", |_, _, _, _, _, _| roots += 1).unwrap();
            matching.run_with_hooks(&mut hooks, 0);
        }
        assert_eq!(roots, 1);
    }

    #[test]
    fn test_run_with_hooks_emission_order() {
        let matching = sample_matching();
        let mut paths = Vec::new();
        {
            let mut hooks = Hooks::new();
            hooks
                .on("[*]", |_, pred_path, _, _, _, _| {
                    paths.push(format!("{pred_path}"));
                })
                .unwrap();
            matching.run_with_hooks(&mut hooks, 0);
        }
        assert_eq!(paths, vec!["[0]", "[1]"]);
    }

    #[test]
    fn test_match_display() {
        let m = Match {
            pred_path: "[0]".parse().unwrap(),
            pred: Value::from(1),
            gold_path: "[1]".parse().unwrap(),
            gold: Value::from(1),
            score: 1.0,
        };
        assert_eq!(format!("{m}"), "[0] -> [1] (1)");
    }
}
