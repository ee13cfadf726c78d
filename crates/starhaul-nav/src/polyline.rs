//! Arclength-parameterised polyline used by the path follower.

use glam::DVec2;

use starhaul_core::constants::EPSILON;

/// A path of at least two points with precomputed segment lengths.
///
/// `cum_len[0] == 0`, `cum_len` is non-decreasing, and
/// `cum_len[last] == total_len`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<DVec2>,
    seg_len: Vec<f64>,
    cum_len: Vec<f64>,
    total_len: f64,
}

impl Polyline {
    /// Build from points; `None` when fewer than two are given.
    pub fn new(points: Vec<DVec2>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let seg_len: Vec<f64> = points.windows(2).map(|w| w[0].distance(w[1])).collect();
        let mut cum_len = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        cum_len.push(acc);
        for len in &seg_len {
            acc += len;
            cum_len.push(acc);
        }
        Some(Self {
            points,
            seg_len,
            cum_len,
            total_len: acc,
        })
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn cum_len(&self) -> &[f64] {
        &self.cum_len
    }

    pub fn total_len(&self) -> f64 {
        self.total_len
    }

    pub fn first(&self) -> DVec2 {
        self.points[0]
    }

    pub fn last(&self) -> DVec2 {
        self.points[self.points.len() - 1]
    }

    /// Arclength of the point on the path closest to `p`.
    ///
    /// Scans every segment; paths are short so O(segments) is fine.
    pub fn project(&self, p: DVec2) -> f64 {
        self.project_from(p, 0.0)
    }

    /// Like `project`, but only considers arclengths at or beyond `min_s`.
    ///
    /// On a self-intersecting path this keeps the projection from jumping
    /// back to an earlier segment that crosses the current one.
    pub fn project_from(&self, p: DVec2, min_s: f64) -> f64 {
        let min_s = min_s.clamp(0.0, self.total_len);
        let mut best_s = min_s;
        let mut best_d2 = f64::INFINITY;
        for (i, w) in self.points.windows(2).enumerate() {
            if self.cum_len[i + 1] < min_s {
                continue;
            }
            let (a, b) = (w[0], w[1]);
            let ab = b - a;
            let len2 = ab.length_squared().max(EPSILON);
            let t_min = ((min_s - self.cum_len[i]) / self.seg_len[i].max(EPSILON)).clamp(0.0, 1.0);
            let t = ((p - a).dot(ab) / len2).clamp(t_min, 1.0);
            let d2 = (a + ab * t).distance_squared(p);
            if d2 < best_d2 {
                best_d2 = d2;
                best_s = self.cum_len[i] + self.seg_len[i] * t;
            }
        }
        best_s
    }

    /// Point at arclength `s`, clamped to the path ends.
    pub fn point_at_s(&self, s: f64) -> DVec2 {
        if s <= 0.0 {
            return self.first();
        }
        if s >= self.total_len {
            return self.last();
        }
        // Last segment whose start is at or before `s`.
        let idx = self
            .cum_len
            .partition_point(|&c| c <= s)
            .saturating_sub(1)
            .min(self.seg_len.len() - 1);
        let t = (s - self.cum_len[idx]) / self.seg_len[idx].max(EPSILON);
        self.points[idx].lerp(self.points[idx + 1], t.clamp(0.0, 1.0))
    }
}
