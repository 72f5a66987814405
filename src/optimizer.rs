//! Visit-order heuristic: nearest-neighbor construction with a frozen
//! must-visit-first prefix, followed by 2-opt on the free suffix.
//!
//! Paths are open: the day ends at the last stop, so no edge back to the
//! depot is ever priced. An infinite cost marks a pair with no usable price;
//! construction ranks it after every finite cost and 2-opt never adds one
//! in exchange for another.

use crate::error::PlanError;
use crate::model::Route;

/// Smallest cost decrease that counts as an improvement.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    /// Matrix index the day starts from. Index 0 (the depot) is never part of
    /// the returned route; a non-depot start node is treated as already
    /// visited.
    pub start_node: usize,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self { start_node: 0 }
    }
}

/// Order every non-depot index of `distances`.
///
/// Members of `must_first` come first, in nearest-neighbor order among
/// themselves starting from the start node; the rest follow in
/// nearest-neighbor order from the last mandatory stop and are then improved
/// with 2-opt. Ties go to the lower matrix index.
pub fn optimize(
    distances: &[Vec<f64>],
    must_first: &[usize],
    options: &OptimizeOptions,
) -> Result<Route, PlanError> {
    let mut path = construct_path(distances, must_first, options)?;
    let fixed = 1 + mandatory_count(&path, must_first);
    two_opt_improve(distances, &mut path, fixed);
    Ok(path.split_off(1))
}

/// The nearest-neighbor order alone, before any 2-opt improvement.
pub fn nearest_neighbor_route(
    distances: &[Vec<f64>],
    must_first: &[usize],
    options: &OptimizeOptions,
) -> Result<Route, PlanError> {
    let mut path = construct_path(distances, must_first, options)?;
    Ok(path.split_off(1))
}

/// Cost of driving from `start` through `route` in order.
pub fn path_cost(distances: &[Vec<f64>], start: usize, route: &[usize]) -> f64 {
    let mut current = start;
    let mut cost = 0.0;
    for &next in route {
        cost += distances[current][next];
        current = next;
    }
    cost
}

/// First-improvement 2-opt over `path[fixed..]`. `path[..fixed]` never moves.
///
/// Reversals are priced on the whole affected stretch (entry edge, the
/// segment's own edges in their new direction, exit edge), so the path cost
/// never increases even when the matrix is asymmetric.
pub fn two_opt_improve(distances: &[Vec<f64>], path: &mut [usize], fixed: usize) {
    let fixed = fixed.max(1);
    let len = path.len();
    if len < fixed + 2 {
        return;
    }

    let mut improved = true;
    while improved {
        improved = false;
        for i in fixed..len - 1 {
            for j in i + 1..len {
                // NaN (infinite edges on both sides) never counts as a gain.
                if reversal_delta(distances, path, i, j) < -IMPROVEMENT_EPSILON {
                    path[i..=j].reverse();
                    improved = true;
                }
            }
        }
    }
}

/// Cost change from reversing `path[i..=j]`, with `i >= 1`.
fn reversal_delta(distances: &[Vec<f64>], path: &[usize], i: usize, j: usize) -> f64 {
    let prev = path[i - 1];
    let mut before = distances[prev][path[i]];
    let mut after = distances[prev][path[j]];

    for k in i..j {
        before += distances[path[k]][path[k + 1]];
        after += distances[path[k + 1]][path[k]];
    }

    if let Some(&next) = path.get(j + 1) {
        before += distances[path[j]][next];
        after += distances[path[i]][next];
    }

    after - before
}

/// Start node, then the mandatory group, then everything else.
fn construct_path(
    distances: &[Vec<f64>],
    must_first: &[usize],
    options: &OptimizeOptions,
) -> Result<Vec<usize>, PlanError> {
    let n = distances.len();
    if let Some(row) = distances.iter().find(|row| row.len() != n) {
        return Err(PlanError::MatrixDimension {
            expected: n,
            actual: row.len(),
        });
    }

    let start = options.start_node;
    if n == 0 {
        return Ok(vec![start]);
    }
    if start >= n {
        return Err(PlanError::IndexOutOfRange { index: start, len: n });
    }

    let mut is_must = vec![false; n];
    for &index in must_first {
        if index == 0 || index >= n || index == start {
            return Err(PlanError::IndexOutOfRange { index, len: n });
        }
        is_must[index] = true;
    }

    let mut visited = vec![false; n];
    visited[0] = true;
    visited[start] = true;

    let mut path = Vec::with_capacity(n);
    path.push(start);

    let mut current = start;
    while let Some(next) = nearest(&distances[current], |j| !visited[j] && is_must[j]) {
        visited[next] = true;
        path.push(next);
        current = next;
    }

    while let Some(next) = nearest(&distances[current], |j| !visited[j]) {
        visited[next] = true;
        path.push(next);
        current = next;
    }

    Ok(path)
}

fn nearest(row: &[f64], eligible: impl Fn(usize) -> bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (j, &distance) in row.iter().enumerate() {
        if !eligible(j) {
            continue;
        }
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((j, distance));
        }
    }
    best.map(|(j, _)| j)
}

/// Length of the mandatory run right after the start node.
fn mandatory_count(path: &[usize], must_first: &[usize]) -> usize {
    path.iter()
        .skip(1)
        .take_while(|index| must_first.contains(index))
        .count()
}
