/**
 * @file zen-gwm/src/gnn/regularization.rs
 * @brief Dropout regularization for local and super-node tensors
 *
 * Inverted dropout: during training each element is zeroed with probability
 * `ratio` and survivors are scaled by `1 / (1 - ratio)`, so inference needs no
 * rescaling. The random source is supplied by the caller so a seeded
 * `ChaCha8Rng` reproduces a training-mode pass exactly.
 *
 * @version 1.0.0-alpha.1
 */

use ndarray::{Array, Dimension};
use rand::Rng;

use super::TrainingMode;
use crate::errors::{GNNError, GNNResult};

/// Dropout applied to tensors of any dimensionality
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dropout {
    /// Probability of zeroing an element
    ratio: f32,

    /// Scale factor for kept elements: 1/(1-ratio)
    scale: f32,
}

impl Dropout {
    /// Create a dropout operator; `ratio` must lie in `[0.0, 1.0)`
    pub fn new(ratio: f32) -> GNNResult<Self> {
        if !(0.0..1.0).contains(&ratio) {
            return Err(GNNError::InvalidConfiguration(format!(
                "Dropout ratio must be in [0.0, 1.0), got {}",
                ratio
            )));
        }
        Ok(Self {
            ratio,
            scale: 1.0 / (1.0 - ratio),
        })
    }

    /// A dropout that never drops
    pub fn disabled() -> Self {
        Self {
            ratio: 0.0,
            scale: 1.0,
        }
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Whether this operator changes its input in the given mode
    pub fn is_active(&self, mode: TrainingMode) -> bool {
        mode == TrainingMode::Training && self.ratio > 0.0
    }

    /// Apply dropout, consuming and returning the tensor
    pub fn apply<D, R>(&self, mut input: Array<f32, D>, mode: TrainingMode, rng: &mut R) -> Array<f32, D>
    where
        D: Dimension,
        R: Rng + ?Sized,
    {
        if !self.is_active(mode) {
            return input;
        }

        let ratio = f64::from(self.ratio);
        let scale = self.scale;
        input.mapv_inplace(|x| if rng.gen_bool(ratio) { 0.0 } else { x * scale });
        input
    }
}

impl Default for Dropout {
    fn default() -> Self {
        Self::disabled()
    }
}
