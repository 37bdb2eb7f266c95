//! Complete-linkage agglomerative clustering over a condensed distance matrix.
//!
//! Merges are found with the nearest-neighbour chain algorithm, which is exact
//! for complete linkage (a reducible linkage) and runs in O(n²) time. The
//! dendrogram is then cut at a distance to yield flat cluster labels.

use ndarray::Array2;

use crate::clustering::infrastructure::math;

/// Upper triangle of a symmetric matrix, row-major, diagonal omitted.
#[derive(Clone, Debug, PartialEq)]
pub struct CondensedMatrix {
    n: usize,
    data: Vec<f64>,
}

impl CondensedMatrix {
    /// Builds the matrix by evaluating `f(i, j)` once per pair `i < j`.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                data.push(f(i, j));
            }
        }
        Self { n, data }
    }

    /// Number of observations (rows of the full matrix).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Value for the pair `(i, j)`, `i != j`, in either order.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.data[self.n * i - i * (i + 1) / 2 + (j - i - 1)]
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            n: self.n,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Expands to the full symmetric matrix with a zero diagonal.
    pub fn to_square(&self) -> Array2<f64> {
        let mut square = Array2::<f64>::zeros((self.n, self.n));
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                let v = self.get(i, j);
                square[[i, j]] = v;
                square[[j, i]] = v;
            }
        }
        square
    }
}

/// One agglomeration step: the clusters represented by observations
/// `left` and `right` joined at `height`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub height: f64,
}

/// Merge history over `n` observations, ordered by non-decreasing height.
#[derive(Clone, Debug, PartialEq)]
pub struct Dendrogram {
    n: usize,
    merges: Vec<Merge>,
}

impl Dendrogram {
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Flat labels where observations share a label iff their cophenetic
    /// distance is at most `max_distance`.
    ///
    /// Labels are the representative observation index of each cluster.
    pub fn cut(&self, max_distance: f64) -> Vec<usize> {
        let mut parent: Vec<usize> = (0..self.n).collect();
        for merge in self.merges.iter().take_while(|m| m.height <= max_distance) {
            math::union(&mut parent, merge.left, merge.right);
        }
        (0..self.n).map(|i| math::find(&mut parent, i)).collect()
    }
}

/// Complete linkage: the distance between two clusters is the largest
/// distance between any of their members. Resists chaining, where one
/// borderline pair would drag two dissimilar groups together.
///
/// Distances must be finite. Ties resolve toward the lowest index so the
/// result depends only on the matrix, never on iteration accidents.
pub fn complete_linkage(distances: &CondensedMatrix) -> Dendrogram {
    let n = distances.len();
    let mut merges = Vec::with_capacity(n.saturating_sub(1));
    if n < 2 {
        return Dendrogram { n, merges };
    }

    let mut d = distances.to_square();
    let mut active = vec![true; n];
    let mut chain: Vec<usize> = Vec::with_capacity(n);

    while merges.len() < n - 1 {
        if chain.is_empty() {
            let Some(first) = active.iter().position(|&a| a) else {
                break;
            };
            chain.push(first);
        }

        let a = chain[chain.len() - 1];
        let previous = chain.len().checked_sub(2).map(|k| chain[k]);

        // The previous chain element wins ties; that guarantees termination.
        let mut best = previous;
        let mut best_distance = previous.map_or(f64::INFINITY, |p| d[[a, p]]);
        for c in 0..n {
            if c != a && active[c] && d[[a, c]] < best_distance {
                best_distance = d[[a, c]];
                best = Some(c);
            }
        }
        let Some(b) = best else {
            break;
        };

        if Some(b) != previous {
            chain.push(b);
            continue;
        }

        chain.pop();
        chain.pop();

        // Slot `keep` always holds a cluster containing observation `keep`.
        let (keep, drop) = (a.min(b), a.max(b));
        merges.push(Merge {
            left: keep,
            right: drop,
            height: best_distance,
        });
        active[drop] = false;
        for k in 0..n {
            if active[k] && k != keep {
                let v = d[[keep, k]].max(d[[drop, k]]);
                d[[keep, k]] = v;
                d[[k, keep]] = v;
            }
        }
    }

    merges.sort_by(|x, y| x.height.total_cmp(&y.height));
    Dendrogram { n, merges }
}
