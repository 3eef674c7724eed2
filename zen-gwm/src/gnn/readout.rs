/**
 * @file zen-gwm/src/gnn/readout.rs
 * @brief Gated readout from per-atom states to a graph-level vector
 *
 * `readout(h, h0) = Σ_atoms sigmoid(i([h ; h0])) ⊙ j(h)`
 *
 * The `i` perceptron sees the current states next to the initial embeddings
 * and decides how much of each atom's `j` projection enters the sum.
 *
 * @version 1.0.0-alpha.1
 */

use ndarray::{Array2, ArrayView3, Axis};
use rand::Rng;

use super::layers::GraphLinear;
use super::utils::{concat_channels, sigmoid};
use super::WeightInitialization;
use crate::errors::{GNNError, GNNResult};

#[derive(Debug, Clone, PartialEq)]
pub struct GatedReadout {
    /// Gate perceptron [2 * hidden_dim, out_dim]
    pub i_layer: GraphLinear,
    /// Value perceptron [hidden_dim, out_dim]
    pub j_layer: GraphLinear,
}

impl GatedReadout {
    pub fn new<R: Rng + ?Sized>(
        hidden_dim: usize,
        out_dim: usize,
        init: WeightInitialization,
        rng: &mut R,
    ) -> GNNResult<Self> {
        Ok(Self {
            i_layer: GraphLinear::new(2 * hidden_dim, out_dim, init, rng)?,
            j_layer: GraphLinear::new(hidden_dim, out_dim, init, rng)?,
        })
    }

    pub fn out_dim(&self) -> usize {
        self.j_layer.out_dim()
    }

    /**
     * Aggregate atoms into one vector per molecule.
     *
     * @param h Current local states [mb, atom, hidden_dim]
     * @param h0 Initial local states [mb, atom, hidden_dim]
     * @return Graph vectors [mb, out_dim]
     */
    pub fn forward(&self, h: ArrayView3<f32>, h0: ArrayView3<f32>) -> GNNResult<Array2<f32>> {
        if h.dim() != h0.dim() {
            return Err(GNNError::DimensionMismatch(format!(
                "Readout inputs differ: {:?} vs {:?}",
                h.dim(),
                h0.dim()
            )));
        }

        let gate = self
            .i_layer
            .forward(concat_channels(h, h0)?.view())?
            .mapv_into(sigmoid);
        let value = self.j_layer.forward(h)?;
        Ok((gate * value).sum_axis(Axis(1)))
    }

    pub fn parameter_count(&self) -> usize {
        self.i_layer.parameter_count() + self.j_layer.parameter_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gnn::layers::Linear;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array3};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_readout_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let readout = GatedReadout::new(4, 6, WeightInitialization::LeCun, &mut rng).unwrap();
        let h = Array3::from_elem((3, 5, 4), 0.2f32);
        let out = readout.forward(h.view(), h.view()).unwrap();
        assert_eq!(out.dim(), (3, 6));
        assert_eq!(readout.parameter_count(), (8 * 6 + 6) + (4 * 6 + 6));
    }

    #[test]
    fn test_readout_zero_gate_is_half_sum() {
        // i = 0 -> gate 0.5 everywhere; j = identity
        let readout = GatedReadout {
            i_layer: GraphLinear::from_linear(
                Linear::from_parts(Array2::zeros((2, 1)), Array1::zeros(1)).unwrap(),
            ),
            j_layer: GraphLinear::from_linear(
                Linear::from_parts(Array2::ones((1, 1)), Array1::zeros(1)).unwrap(),
            ),
        };
        let h = Array3::from_shape_vec((2, 3, 1), vec![1.0, 2.0, 3.0, -1.0, 0.0, 1.0]).unwrap();
        let out = readout.forward(h.view(), h.view()).unwrap();
        assert_relative_eq!(out[[0, 0]], 3.0, epsilon = 1e-6);
        assert_relative_eq!(out[[1, 0]], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_readout_is_permutation_invariant() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let readout = GatedReadout::new(3, 4, WeightInitialization::LeCun, &mut rng).unwrap();
        let h = Array3::from_shape_fn((1, 4, 3), |(_, i, c)| (i * 3 + c) as f32 * 0.1);
        let mut permuted = h.clone();
        for i in 0..4 {
            permuted
                .index_axis_mut(Axis(1), i)
                .assign(&h.index_axis(Axis(1), 3 - i));
        }
        let a = readout.forward(h.view(), h.view()).unwrap();
        let b = readout.forward(permuted.view(), permuted.view()).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_readout_rejects_mismatched_initial_states() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let readout = GatedReadout::new(4, 6, WeightInitialization::LeCun, &mut rng).unwrap();
        let h = Array3::<f32>::zeros((1, 5, 4));
        let h0 = Array3::<f32>::zeros((1, 4, 4));
        assert!(readout.forward(h.view(), h0.view()).is_err());
    }
}
