//! EM/MPM segmentation kernel shared by the EM/MPM filters.
//!
//! Class statistics (mean, variance, mixing weight) of a Gaussian mixture are
//! estimated from the gray-level histogram with expectation maximization.
//! Labels are then refined with iterated conditional modes over a Potts
//! prior: each cell pays `beta` for every face neighbor with a different
//! label. Labels are ordered by class mean, so label 0 is the darkest class.

use crate::data::ImageGeometry;

/// Floor for class variances, keeps degenerate classes well-defined
const MIN_VARIANCE: f64 = 1.0;
/// Floor for mixing weights before taking logarithms
const MIN_WEIGHT: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationParams {
    pub num_classes: usize,
    pub em_iterations: usize,
    pub mpm_iterations: usize,
    pub beta: f64,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            num_classes: 2,
            em_iterations: 5,
            mpm_iterations: 5,
            beta: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassStats {
    pub mean: f64,
    pub variance: f64,
    pub weight: f64,
}

impl ClassStats {
    /// Negative log-likelihood of `x` under this class, up to a constant
    fn cost(&self, x: f64) -> f64 {
        let d = x - self.mean;
        d * d / (2.0 * self.variance) + 0.5 * self.variance.ln() - self.weight.max(MIN_WEIGHT).ln()
    }
}

/// Estimate class statistics from `values`, sorted by ascending mean
pub fn estimate_classes(values: &[u8], params: &SegmentationParams) -> Vec<ClassStats> {
    let k = params.num_classes.max(1);
    let mut histogram = [0u64; 256];
    for v in values {
        histogram[*v as usize] += 1;
    }
    let total = values.len() as f64;
    let lo = histogram.iter().position(|c| *c > 0).unwrap_or(0) as f64;
    let hi = histogram.iter().rposition(|c| *c > 0).unwrap_or(0) as f64;
    let span = hi - lo;

    let mut classes: Vec<ClassStats> = (0..k)
        .map(|i| ClassStats {
            mean: lo + span * (i as f64 + 0.5) / k as f64,
            variance: (span / (2.0 * k as f64)).powi(2).max(MIN_VARIANCE),
            weight: 1.0 / k as f64,
        })
        .collect();
    if values.is_empty() {
        return classes;
    }

    let mut posterior = vec![0.0; k];
    for _ in 0..params.em_iterations {
        let mut n = vec![0.0; k];
        let mut s1 = vec![0.0; k];
        let mut s2 = vec![0.0; k];
        for (gray, count) in histogram.iter().enumerate().filter(|(_, c)| **c > 0) {
            let x = gray as f64;
            responsibilities(x, &classes, &mut posterior);
            for c in 0..k {
                let w = *count as f64 * posterior[c];
                n[c] += w;
                s1[c] += w * x;
                s2[c] += w * x * x;
            }
        }
        for (c, class) in classes.iter_mut().enumerate() {
            if n[c] > 0.0 {
                class.mean = s1[c] / n[c];
                class.variance = (s2[c] / n[c] - class.mean * class.mean).max(MIN_VARIANCE);
                class.weight = n[c] / total;
            }
        }
    }

    classes.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    classes
}

fn responsibilities(x: f64, classes: &[ClassStats], out: &mut [f64]) {
    let mut best = f64::INFINITY;
    for (slot, class) in out.iter_mut().zip(classes) {
        *slot = class.cost(x);
        best = best.min(*slot);
    }
    let mut sum = 0.0;
    for slot in out.iter_mut() {
        *slot = (best - *slot).exp();
        sum += *slot;
    }
    for slot in out.iter_mut() {
        *slot /= sum;
    }
}

fn argmin(costs: impl Iterator<Item = f64>) -> usize {
    let mut best = (0, f64::INFINITY);
    for (i, cost) in costs.enumerate() {
        if cost < best.1 {
            best = (i, cost);
        }
    }
    best.0
}

/// Segment `values` (one gray level per cell of `geometry`) into class labels
pub fn segment(values: &[u8], geometry: &ImageGeometry, params: &SegmentationParams) -> Vec<u8> {
    let classes = estimate_classes(values, params);
    let mut labels: Vec<u8> = values
        .iter()
        .map(|v| argmin(classes.iter().map(|c| c.cost(*v as f64))) as u8)
        .collect();

    if geometry.num_cells() != values.len() {
        tracing::warn!(
            "Geometry has {} cells but {} values were given, skipping MPM refinement",
            geometry.num_cells(),
            values.len()
        );
        return labels;
    }

    for iteration in 0..params.mpm_iterations {
        let mut changed = 0usize;
        for (i, v) in values.iter().enumerate() {
            let x = *v as f64;
            let best = argmin(classes.iter().enumerate().map(|(k, class)| {
                let disagreeing = geometry
                    .face_neighbors(i)
                    .filter(|j| labels[*j] as usize != k)
                    .count();
                class.cost(x) + params.beta * disagreeing as f64
            })) as u8;
            if best != labels[i] {
                labels[i] = best;
                changed += 1;
            }
        }
        tracing::trace!("MPM iteration {}: {} labels changed", iteration, changed);
        if changed == 0 {
            break;
        }
    }
    labels
}
