//! Discrete search window and the score-surface covariance.
//!
//! ## Window
//!
//! ```text
//!   offsets per axis:  -N·res  …  -res   0   +res  …  +N·res      N = floor(size / res)
//!
//!   enumeration:  for dθ (ascending)        rotate points once per dθ
//!                   for dy (ascending)
//!                     for dx (ascending)    translate + score
//! ```
//!
//! ## Covariance
//!
//! Each candidate score `s` is treated as a log-likelihood, giving weight
//! `w = exp(s − s_best)`. The covariance is the weighted second central
//! moment of the candidate offsets plus the quantisation variance `res² / 12`
//! of each axis. A flat score surface weights every candidate equally and
//! yields the covariance of the whole window; a sharp peak collapses to the
//! quantisation floor.
//!
//! The best score is not known until the search ends, so sums are kept
//! relative to the best seen so far and rescaled when it improves.

use super::config::NdtMatcherConfig;
use super::types::Covariance3;

/// Candidate offsets around an initial pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchWindow {
    /// Linear step (meters)
    pub linear_resolution: f64,
    /// Linear steps either side of zero
    pub linear_steps: usize,
    /// Angular step (radians)
    pub angular_resolution: f64,
    /// Angular steps either side of zero
    pub angular_steps: usize,
}

impl SearchWindow {
    /// Window described by a matcher configuration.
    pub fn from_config(config: &NdtMatcherConfig) -> Self {
        Self {
            linear_resolution: config.linear_resolution,
            linear_steps: config.linear_steps(),
            angular_resolution: config.angular_resolution,
            angular_steps: config.angular_steps(),
        }
    }

    /// x / y offsets, ascending. Always contains 0.
    pub fn linear_offsets(&self) -> impl Iterator<Item = f64> + Clone + '_ {
        offsets(self.linear_steps, self.linear_resolution)
    }

    /// theta offsets, ascending. Always contains 0.
    pub fn angular_offsets(&self) -> impl Iterator<Item = f64> + Clone + '_ {
        offsets(self.angular_steps, self.angular_resolution)
    }

    /// Total candidates.
    pub fn len(&self) -> usize {
        let linear = 2 * self.linear_steps + 1;
        linear * linear * (2 * self.angular_steps + 1)
    }

    /// A window always holds at least the zero offset.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Covariance when every candidate is equally likely.
    ///
    /// Returned when no match is possible: the pose is only known to lie
    /// somewhere in the window.
    pub fn uniform_covariance(&self) -> Covariance3 {
        let lin = uniform_variance(self.linear_steps, self.linear_resolution)
            + quantisation(self.linear_resolution);
        let ang = uniform_variance(self.angular_steps, self.angular_resolution)
            + quantisation(self.angular_resolution);
        Covariance3::diagonal(lin, lin, ang)
    }
}

fn offsets(steps: usize, resolution: f64) -> impl Iterator<Item = f64> + Clone {
    let n = steps as i64;
    (-n..=n).map(move |k| k as f64 * resolution)
}

/// Variance of `{k · res : k ∈ [-n, n]}` under equal weights.
fn uniform_variance(steps: usize, resolution: f64) -> f64 {
    let n = steps as f64;
    resolution * resolution * n * (n + 1.0) / 3.0
}

/// Highest-scoring candidate seen so far.
///
/// Only a strictly greater score replaces the current best, so among equal
/// scores the first offered (in enumeration order) is kept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BestCandidate {
    /// Best score, `-inf` before any offer
    pub score: f64,
    /// Offset `(dx, dy, dθ)` of the best score
    pub offset: [f64; 3],
}

impl Default for BestCandidate {
    fn default() -> Self {
        Self::new()
    }
}

impl BestCandidate {
    /// Nothing offered yet.
    pub fn new() -> Self {
        Self {
            score: f64::NEG_INFINITY,
            offset: [0.0; 3],
        }
    }

    /// Keep `offset` if `score` beats the current best. Returns true if it did.
    #[inline]
    pub fn offer(&mut self, score: f64, offset: [f64; 3]) -> bool {
        if score > self.score {
            self.score = score;
            self.offset = offset;
            true
        } else {
            false
        }
    }
}

#[inline]
fn quantisation(resolution: f64) -> f64 {
    resolution * resolution / 12.0
}

/// Streaming weighted moments of candidate offsets.
#[derive(Clone, Debug)]
pub struct SurfaceMoments {
    best: f64,
    sum_w: f64,
    sum_d: [f64; 3],
    sum_dd: [[f64; 3]; 3],
}

impl Default for SurfaceMoments {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceMoments {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self {
            best: f64::NEG_INFINITY,
            sum_w: 0.0,
            sum_d: [0.0; 3],
            sum_dd: [[0.0; 3]; 3],
        }
    }

    /// Fold in a candidate with offset `d = (dx, dy, dθ)` and score `score`.
    pub fn add(&mut self, score: f64, d: [f64; 3]) {
        if !score.is_finite() {
            return;
        }
        if score > self.best {
            // Re-express existing weights relative to the new best
            let scale = if self.best.is_finite() {
                (self.best - score).exp()
            } else {
                0.0
            };
            self.sum_w *= scale;
            for i in 0..3 {
                self.sum_d[i] *= scale;
                for j in 0..3 {
                    self.sum_dd[i][j] *= scale;
                }
            }
            self.best = score;
        }

        let w = (score - self.best).exp();
        self.sum_w += w;
        for i in 0..3 {
            self.sum_d[i] += w * d[i];
            for j in 0..3 {
                self.sum_dd[i][j] += w * d[i] * d[j];
            }
        }
    }

    /// Total weight relative to the best candidate.
    pub fn total_weight(&self) -> f64 {
        self.sum_w
    }

    /// Weighted central second moment plus quantisation on the diagonal.
    ///
    /// Falls back to the window's uniform covariance when nothing was added.
    pub fn covariance(&self, window: &SearchWindow) -> Covariance3 {
        if self.sum_w <= 0.0 {
            return window.uniform_covariance();
        }

        let mean = [
            self.sum_d[0] / self.sum_w,
            self.sum_d[1] / self.sum_w,
            self.sum_d[2] / self.sum_w,
        ];
        let floor = [
            quantisation(window.linear_resolution),
            quantisation(window.linear_resolution),
            quantisation(window.angular_resolution),
        ];

        let mut cov = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in i..3 {
                let v = self.sum_dd[i][j] / self.sum_w - mean[i] * mean[j];
                cov[i][j] = v;
                cov[j][i] = v;
            }
            // Cancellation can leave a tiny negative variance
            cov[i][i] = cov[i][i].max(0.0) + floor[i];
        }
        Covariance3(cov)
    }
}
