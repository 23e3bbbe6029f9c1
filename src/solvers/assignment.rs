//! Hungarian maximum-weight bipartite matching and assignment variants.
use crate::constraint::MatchingKind;

/// A selected pair `(i, j)` together with its weight.
pub type IndexedScore = (usize, usize, f64);

/// Computes a maximum-weight bipartite matching of a non-negative weight
/// matrix, returning the total weight and the selected pairs.
///
/// # Examples
///
/// ```
/// use approx::assert_abs_diff_eq;
/// use simatch::solvers::assignment::max_matching;
///
/// let weights = vec![vec![2.0, 1.0], vec![1.0, 2.0]];
/// let (total, pairs) = max_matching(&weights);
/// assert_abs_diff_eq!(total, 4.0);
/// assert_eq!(pairs, vec![(0, 0, 2.0), (1, 1, 2.0)]);
/// ```
pub fn max_matching(weights: &[Vec<f64>]) -> (f64, Vec<IndexedScore>) {
    IterativeMatching::new(weights)
        .last()
        .unwrap_or((0.0, Vec::new()))
}

/// Solves the assignment problem for a weight matrix under a matching kind:
/// Hungarian matching for one-to-one, column/row argmax for the asymmetric
/// kinds, and the full cell sum for many-to-many.
pub fn solve_assignment(weights: &[Vec<f64>], kind: MatchingKind) -> (f64, Vec<IndexedScore>) {
    let nx = weights.len();
    let ny = weights.first().map_or(0, Vec::len);
    if nx == 0 || ny == 0 {
        return (0.0, Vec::new());
    }
    match kind {
        MatchingKind::OneToOne => max_matching(weights),
        MatchingKind::OneToMany => {
            // Each reference column picks its best prediction row.
            let mut total = 0.0;
            let mut pairs = Vec::with_capacity(ny);
            for j in 0..ny {
                let i = argmax((0..nx).map(|i| weights[i][j]));
                total += weights[i][j];
                pairs.push((i, j, weights[i][j]));
            }
            (total, pairs)
        }
        MatchingKind::ManyToOne => {
            let mut total = 0.0;
            let mut pairs = Vec::with_capacity(nx);
            for (i, row) in weights.iter().enumerate() {
                let j = argmax(row.iter().copied());
                total += row[j];
                pairs.push((i, j, row[j]));
            }
            (total, pairs)
        }
        MatchingKind::ManyToMany => {
            let total = weights.iter().flatten().sum();
            let pairs = weights
                .iter()
                .enumerate()
                .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, &w)| (i, j, w)))
                .collect();
            (total, pairs)
        }
    }
}

fn argmax<I: Iterator<Item = f64>>(values: I) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, value) in values.enumerate() {
        if value > best_value {
            best = i;
            best_value = value;
        }
    }
    best
}

/// Iterative Hungarian matching: a lazy sequence of partial solutions.
///
/// The `k`-th item is `(total, pairs)` of the maximum-weight matching after
/// inserting the first `k + 1` rows, for `k < min(nx, ny)`. The last item
/// equals the one-shot [`max_matching`] result.
///
/// Rows are inserted one at a time by growing an alternating tree over dual
/// potentials until an unmatched column is found, then augmenting back to the
/// root. Ties break toward the lowest column index.
pub struct IterativeMatching {
    // Weight matrix in the original orientation.
    weights: Vec<Vec<f64>>,
    // Working matrix with nx <= ny; transposed if necessary.
    w: Vec<Vec<f64>>,
    transposed: bool,
    nx: usize,
    ny: usize,
    // Dual potentials.
    u: Vec<f64>,
    v: Vec<f64>,
    // pred[j] = row matched to column j.
    pred: Vec<Option<usize>>,
    row: usize,
}

impl IterativeMatching {
    /// Creates the lazy matching sequence for a non-negative weight matrix.
    pub fn new(weights: &[Vec<f64>]) -> Self {
        let nx = weights.len();
        let ny = weights.first().map_or(0, Vec::len);
        let transposed = nx > ny;
        let w = if transposed {
            (0..ny)
                .map(|j| (0..nx).map(|i| weights[i][j]).collect())
                .collect()
        } else {
            weights.to_vec()
        };
        let (nx, ny) = if transposed { (ny, nx) } else { (nx, ny) };
        Self {
            weights: weights.to_vec(),
            w,
            transposed,
            nx,
            ny,
            u: vec![0.0; nx],
            v: vec![0.0; ny],
            pred: vec![None; ny],
            row: 0,
        }
    }

    // Grows the alternating tree rooted at row `i` and augments along the
    // path to the first unmatched column reached.
    fn insert_row(&mut self, i: usize) {
        let ny = self.ny;
        let mut minv = vec![f64::INFINITY; ny];
        let mut used = vec![false; ny];
        // way[j] = predecessor column of j in the tree; None for the root.
        let mut way: Vec<Option<usize>> = vec![None; ny];
        let mut j0: Option<usize> = None;

        loop {
            let i0 = match j0 {
                None => i,
                Some(j) => self.pred[j].expect("columns in the tree are matched"),
            };
            // Reduced costs: maximization flipped to minimization.
            for j in 0..ny {
                if !used[j] {
                    let cur = -self.w[i0][j] - self.u[i0] - self.v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                }
            }
            let mut j1 = usize::MAX;
            let mut delta = f64::INFINITY;
            for j in 0..ny {
                if !used[j] && minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            // Update the dual potentials.
            for j in 0..ny {
                if used[j] {
                    self.v[j] -= delta;
                    if let Some(pj) = self.pred[j] {
                        self.u[pj] += delta;
                    }
                } else {
                    minv[j] -= delta;
                }
            }
            self.u[i] += delta;

            j0 = Some(j1);
            if self.pred[j1].is_none() {
                break;
            }
            used[j1] = true;
        }

        // Augment back to the root.
        let mut j = j0.expect("tree growth ends at a column");
        loop {
            let j_prev = way[j];
            let i_prev = match j_prev {
                None => i,
                Some(jp) => self.pred[jp].expect("columns in the tree are matched"),
            };
            self.pred[j] = Some(i_prev);
            match j_prev {
                None => break,
                Some(jp) => j = jp,
            }
        }
    }

    // Reads off the current matching in the original orientation, column
    // order on the working side.
    fn current(&self) -> (f64, Vec<IndexedScore>) {
        let mut total = 0.0;
        let mut pairs = Vec::new();
        for (j, &pi) in self.pred.iter().enumerate() {
            if let Some(i) = pi {
                let (ii, jj) = if self.transposed { (j, i) } else { (i, j) };
                let s = self.weights[ii][jj];
                pairs.push((ii, jj, s));
                total += s;
            }
        }
        (total, pairs)
    }
}

impl Iterator for IterativeMatching {
    type Item = (f64, Vec<IndexedScore>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.nx {
            return None;
        }
        let i = self.row;
        self.insert_row(i);
        self.row += 1;
        Some(self.current())
    }
}
