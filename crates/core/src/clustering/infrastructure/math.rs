//! Union-find helpers shared by the ingestion grouper and the dendrogram cut.

use std::collections::HashMap;

/// Find root of element `i` with path halving for amortized near-O(1).
pub fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Merge the sets containing `a` and `b` by attaching `a`'s root under `b`'s.
pub fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra] = rb;
    }
}

/// Collect union-find sets into groups of associated IDs.
///
/// Takes a union-find `parent` array and `(index, id)` pairs. Each group is
/// sorted, and groups are ordered by their smallest ID for deterministic output.
pub fn collect_groups<T: Ord + Copy>(parent: &mut [usize], entries: &[(usize, T)]) -> Vec<Vec<T>> {
    let mut groups: HashMap<usize, Vec<T>> = HashMap::new();
    for &(idx, id) in entries {
        let root = find(parent, idx);
        groups.entry(root).or_default().push(id);
    }

    let mut result: Vec<Vec<T>> = groups.into_values().collect();
    for g in &mut result {
        g.sort();
    }
    result.sort_by(|a, b| a[0].cmp(&b[0]));
    result
}

/// Euclidean distance between two equal-length vectors.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
