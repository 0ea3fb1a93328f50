//! Node placement along a 1-D line under a metric field.
//!
//! Parameters `us` and sizes `metrics` live in parallel arrays indexed by
//! node. A line is an ordered list of node indices with ascending
//! parameters. New nodes are appended to both arrays and the functions
//! return the ordered node list of the discretized line.
//!
//! Between two nodes `a, b` the size varies linearly from `h_a` to `h_b`;
//! nodes are placed at equal metric-length spacing, which makes consecutive
//! edge lengths a geometric progression.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::mesh_error::{MeshError, MeshResult};
use crate::metric::edge_quality;

const TIE_TOL: f64 = 1e-9;

/// Largest edge count a single segment may ask for.
pub(crate) const MAX_EDGES: usize = u32::MAX as usize;

/// Edge-count policy of a subdivision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubdivideOptions {
    /// Round ideal counts up instead of to the nearest integer.
    pub force_up: bool,
    /// Round the total edge count up to an even number.
    pub force_even: bool,
    /// Minimum total edge count (≥ 1).
    pub min_n: usize,
    /// Maximum total edge count (≥ `min_n`).
    pub max_n: usize,
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self {
            force_up: false,
            force_even: false,
            min_n: 1,
            max_n: usize::MAX,
        }
    }
}

impl SubdivideOptions {
    #[must_use]
    pub const fn with_force_up(mut self, force_up: bool) -> Self {
        self.force_up = force_up;
        self
    }

    #[must_use]
    pub const fn with_force_even(mut self, force_even: bool) -> Self {
        self.force_even = force_even;
        self
    }

    #[must_use]
    pub const fn with_bounds(mut self, min_n: usize, max_n: usize) -> Self {
        self.min_n = min_n;
        self.max_n = max_n;
        self
    }

    /// Check the bounds; `first_arg` is the position of `min_n` in the
    /// caller's argument list.
    pub(crate) fn check(&self, first_arg: usize) -> MeshResult<()> {
        if self.min_n == 0 {
            return Err(MeshError::invalid(first_arg, "min_n must be > 0"));
        }
        if self.min_n > self.max_n {
            return Err(MeshError::invalid(
                first_arg + 1,
                format!("min_n {} > max_n {}", self.min_n, self.max_n),
            ));
        }
        Ok(())
    }

    /// Edge count for a metric length `x`; `InsufficientMemory` past [`MAX_EDGES`].
    fn round(&self, x: f64) -> MeshResult<usize> {
        let r = if self.force_up {
            (x * (1.0 - 1e-12)).ceil()
        } else {
            x.round()
        };
        if !(r <= MAX_EDGES as f64) {
            return Err(MeshError::InsufficientMemory);
        }
        Ok(r.max(0.0) as usize)
    }

    /// Clamp into `[min_n, max_n]`, then make even if requested.
    /// `InsufficientMemory` past [`MAX_EDGES`].
    fn total(&self, n: usize) -> MeshResult<usize> {
        let n = n.clamp(self.min_n, self.max_n);
        let n = if self.force_even && n % 2 == 1 { n.saturating_add(1) } else { n };
        if n > MAX_EDGES {
            return Err(MeshError::InsufficientMemory);
        }
        Ok(n)
    }
}

pub(crate) fn validate(us: &[f64], metrics: &[f64], nodes: &[usize], opts: &SubdivideOptions) -> MeshResult<()> {
    if metrics.len() != us.len() {
        return Err(MeshError::invalid(
            2,
            format!("{} metrics for {} parameters", metrics.len(), us.len()),
        ));
    }
    if nodes.len() < 2 {
        return Err(MeshError::invalid(3, "a line needs at least two nodes"));
    }
    if let Some(&bad) = nodes.iter().find(|&&n| n >= us.len()) {
        return Err(MeshError::invalid(3, format!("node {bad} has no parameter")));
    }
    if nodes.windows(2).any(|w| !(us[w[0]] <= us[w[1]])) {
        return Err(MeshError::invalid(1, "parameters are not sorted ascending along the line"));
    }
    if let Some(&bad) = nodes.iter().find(|&&n| !(metrics[n] > 0.0)) {
        return Err(MeshError::invalid(2, format!("metric {} at node {bad} is not > 0", metrics[bad])));
    }
    opts.check(6)
}

/// Subdivide the line `nodes`, keeping every node of it (hard anchors).
///
/// Each pair of consecutive anchors gets `round(L / mean h)` edges (or
/// `ceil` with `force_up`), at least one unless its length is zero. The
/// total is then clamped to `[min_n, max_n]` and made even if requested;
/// the difference is spread over the segments by [`allocate_edges`].
///
/// Argument positions: 1 `us`, 2 `metrics`, 3 `nodes`, then `opts` fields
/// 4 `force_up`, 5 `force_even`, 6 `min_n`, 7 `max_n`.
pub fn subdivide(us: &mut Vec<f64>, metrics: &mut Vec<f64>, nodes: &[usize], opts: &SubdivideOptions) -> MeshResult<Vec<usize>> {
    validate(us, metrics, nodes, opts)?;
    let counts = plan_edges(us, metrics, nodes, opts)?;
    place_edges(us, metrics, nodes, &counts)
}

/// Edge count of every anchor segment, see [`subdivide`]. Inputs must be valid.
pub(crate) fn plan_edges(
    us: &[f64],
    metrics: &[f64],
    nodes: &[usize],
    opts: &SubdivideOptions,
) -> MeshResult<Vec<usize>> {
    let ideal: Vec<f64> = nodes
        .windows(2)
        .map(|w| edge_quality(us[w[1]] - us[w[0]], metrics[w[0]], metrics[w[1]]))
        .collect();
    let mut counts: Vec<usize> = nodes
        .windows(2)
        .zip(&ideal)
        .map(|(w, &r)| if us[w[1]] > us[w[0]] { opts.round(r).map(|n| n.max(1)) } else { Ok(0) })
        .collect::<MeshResult<_>>()?;
    let target = opts.total(checked_sum(&counts)?)?;
    allocate_edges(&ideal, &mut counts, target);
    debug!(
        "subdivide: {} segments, {} edges (requested {target})",
        counts.len(),
        counts.iter().sum::<usize>()
    );
    Ok(counts)
}

/// Sum of edge counts, `InsufficientMemory` on overflow.
pub(crate) fn checked_sum(counts: &[usize]) -> MeshResult<usize> {
    counts
        .iter()
        .try_fold(0usize, |acc, &n| acc.checked_add(n))
        .ok_or(MeshError::InsufficientMemory)
}

/// Append `counts[k] - 1` geometric nodes inside anchor segment `k`.
pub(crate) fn place_edges(
    us: &mut Vec<f64>,
    metrics: &mut Vec<f64>,
    nodes: &[usize],
    counts: &[usize],
) -> MeshResult<Vec<usize>> {
    let total = checked_sum(counts)?;
    us.try_reserve(total)?;
    metrics.try_reserve(total)?;
    let mut out = Vec::new();
    out.try_reserve(total.checked_add(1).ok_or(MeshError::InsufficientMemory)?)?;
    out.push(nodes[0]);
    let last = counts.len().saturating_sub(1);
    for (s, (w, &n)) in nodes.windows(2).zip(counts).enumerate() {
        let (a, b) = (w[0], w[1]);
        let (ua, ub, ha, hb) = (us[a], us[b], metrics[a], metrics[b]);
        for k in 1..n {
            let (u, h) = geometric_step(ua, ub, ha, hb, k as f64 / n as f64);
            us.push(u);
            metrics.push(h);
            out.push(us.len() - 1);
        }
        if n > 0 {
            out.push(b);
        } else if s == last {
            // a trailing zero-length segment merges its ends onto the last anchor
            if let Some(end) = out.last_mut() {
                *end = b;
            }
        }
    }
    Ok(out)
}

/// Subdivide the line `nodes` seen as a background mesh: the nodes only
/// sample the metric field and interior ones are not kept.
///
/// The total metric length gives the edge count, bounded like in
/// [`subdivide`]; new nodes sit at equal metric-length spacing. The result
/// starts with `nodes[0]` and ends with the last node. Argument positions
/// are those of [`subdivide`].
pub fn subdivide_background(
    us: &mut Vec<f64>,
    metrics: &mut Vec<f64>,
    nodes: &[usize],
    opts: &SubdivideOptions,
) -> MeshResult<Vec<usize>> {
    validate(us, metrics, nodes, opts)?;
    let lengths: Vec<f64> = nodes
        .windows(2)
        .map(|w| {
            let l = us[w[1]] - us[w[0]];
            if l > 0.0 { edge_quality(l, metrics[w[0]], metrics[w[1]]) } else { 0.0 }
        })
        .collect();
    let total_length: f64 = lengths.iter().sum();
    let n = opts.total(opts.round(total_length)?.max(1))?;
    debug!("subdivide_background: metric length {total_length:.4}, {n} edges");

    us.try_reserve(n)?;
    metrics.try_reserve(n)?;
    let mut out = Vec::new();
    out.try_reserve(n.checked_add(1).ok_or(MeshError::InsufficientMemory)?)?;
    out.push(nodes[0]);
    let mut seg = 0;
    let mut start = 0.0;
    for j in 1..n {
        let s = total_length * j as f64 / n as f64;
        while seg + 1 < lengths.len() && start + lengths[seg] < s {
            start += lengths[seg];
            seg += 1;
        }
        let (a, b) = (nodes[seg], nodes[seg + 1]);
        let (u, h) = if lengths[seg] > 0.0 {
            let t = ((s - start) / lengths[seg]).clamp(0.0, 1.0);
            geometric_step(us[a], us[b], metrics[a], metrics[b], t)
        } else {
            (us[a], metrics[a])
        };
        us.push(u);
        metrics.push(h);
        out.push(us.len() - 1);
    }
    out.push(nodes[nodes.len() - 1]);
    Ok(out)
}

/// Position and size at metric-length fraction `t` of the segment
/// `[ua, ub]` whose size varies linearly from `ha` to `hb`.
pub(crate) fn geometric_step(ua: f64, ub: f64, ha: f64, hb: f64, t: f64) -> (f64, f64) {
    let len = ub - ua;
    if (hb - ha).abs() <= 1e-12 * ha.max(hb) {
        return (ua + t * len, ha + t * (hb - ha));
    }
    let h = ha * (hb / ha).powf(t);
    (ua + len * (h - ha) / (hb - ha), h)
}

/// Adjust `counts` so that they sum to `target`.
///
/// Segment shares are proportional to `ideal` (zero-length segments have a
/// zero ideal and never receive edges, unless every segment has zero
/// length, then the first one takes them all). Edges are added to the
/// segment furthest below its share and removed from the one furthest
/// above it. On ties the lower index ends up with the extra edge. Removal
/// never takes a segment below one edge, so the result may stay above
/// `target`.
pub fn allocate_edges(ideal: &[f64], counts: &mut [usize], target: usize) {
    if counts.is_empty() {
        return;
    }
    let sum_ideal: f64 = ideal.iter().filter(|&&r| r > 0.0).sum();
    if !(sum_ideal > 0.0) {
        let current: usize = counts.iter().sum();
        counts[0] = (counts[0] + target).saturating_sub(current);
        return;
    }
    let share: Vec<f64> = ideal
        .iter()
        .map(|&r| if r > 0.0 { target as f64 * r / sum_ideal } else { 0.0 })
        .collect();
    let mut current: usize = counts.iter().sum();
    while current < target {
        let k = pick(&share, counts, false, |s, c| (s > 0.0).then_some(s - c as f64));
        match k {
            Some(k) => counts[k] += 1,
            None => break,
        }
        current += 1;
    }
    while current > target {
        let k = pick(&share, counts, true, |s, c| (c > 1 && s > 0.0).then_some(c as f64 - s));
        match k {
            Some(k) => counts[k] -= 1,
            None => break,
        }
        current -= 1;
    }
}

/// Index with the largest score; ties go to the first index, or to the
/// last one with `last_on_tie`.
fn pick(
    share: &[f64],
    counts: &[usize],
    last_on_tie: bool,
    score: impl Fn(f64, usize) -> Option<f64>,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (k, (&s, &c)) in share.iter().zip(counts.iter()).enumerate() {
        let Some(v) = score(s, c) else { continue };
        let better = best.is_none_or(|(_, b)| v > b + TIE_TOL || (last_on_tie && v >= b - TIE_TOL));
        if better {
            best = Some((k, v));
        }
    }
    best.map(|(k, _)| k)
}
