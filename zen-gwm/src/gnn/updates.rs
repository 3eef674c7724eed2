/**
 * @file zen-gwm/src/gnn/updates.rs
 * @brief Node update mechanisms: GIN message MLP and GRU recurrent cell
 *
 * ## GIN Update
 *
 * The local message step of a Graph Isomorphism Network with a fixed epsilon
 * of zero: neighbor states are summed through the adjacency matrix, the node's
 * own state is added, and a two-layer perceptron with ReLU transforms the sum.
 *
 * ```text
 * sum_h = A @ h + h
 * out_h = relu(dropout(g2(relu(g1(sum_h)))))
 * ```
 *
 * ## GRU Cell
 *
 * The self-recurrent unit used by the Graph Warp Module. The previous hidden
 * state is carried across layers by the caller:
 *
 * 1. **Update gate**: `z = sigmoid(W_z x + U_z h)`
 * 2. **Reset gate**: `r = sigmoid(W_r x + U_r h)`
 * 3. **Candidate**: `h_bar = tanh(W x + U (r * h))`
 * 4. **Output**: `z * h_bar + (1 - z) * h`
 *
 * With no previous state the cell reduces to `z * h_bar`, where `z` and
 * `h_bar` only see the input.
 *
 * @version 1.0.0-alpha.1
 *
 * @see crate::gnn::warp Graph Warp Module
 */

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Zip};
use rand::Rng;

use super::layers::{GraphLinear, Linear};
use super::regularization::Dropout;
use super::utils::{batched_matmul, relu, sigmoid};
use super::{TrainingMode, WeightInitialization};
use crate::errors::{GNNError, GNNResult};

// === GIN MESSAGE MLP ===

/// Two-layer perceptron applied to summed neighbor states
#[derive(Debug, Clone, PartialEq)]
pub struct GinMessageMlp {
    /// First transformation [hidden_dim, hidden_dim]
    pub linear_g1: GraphLinear,

    /// Second transformation [hidden_dim, hidden_dim]
    pub linear_g2: GraphLinear,
}

impl GinMessageMlp {
    pub fn new<R: Rng + ?Sized>(
        hidden_dim: usize,
        init: WeightInitialization,
        rng: &mut R,
    ) -> GNNResult<Self> {
        Ok(Self {
            linear_g1: GraphLinear::new(hidden_dim, hidden_dim, init, rng)?,
            linear_g2: GraphLinear::new(hidden_dim, hidden_dim, init, rng)?,
        })
    }

    /**
     * Compute the new local states from `h` and the dense adjacency.
     *
     * @param h Local states [mb, atom, hidden_dim]
     * @param adj Dense adjacency [mb, atom, atom]
     * @return Transformed local states [mb, atom, hidden_dim]
     */
    pub fn forward<R: Rng + ?Sized>(
        &self,
        h: ArrayView3<f32>,
        adj: ArrayView3<f32>,
        dropout: &Dropout,
        mode: TrainingMode,
        rng: &mut R,
    ) -> GNNResult<Array3<f32>> {
        // Sum along adjacent atoms, then add the atom itself
        let fv = batched_matmul(adj, h)?;
        let sum_h = fv + &h;

        let out_h = self.linear_g1.forward(sum_h.view())?.mapv_into(relu);
        let out_h = self.linear_g2.forward(out_h.view())?;
        Ok(dropout.apply(out_h, mode, rng).mapv_into(relu))
    }

    pub fn parameter_count(&self) -> usize {
        self.linear_g1.parameter_count() + self.linear_g2.parameter_count()
    }
}

// === GRU CELL ===

/// Gated recurrent unit operating on `(n, dim)` row batches
#[derive(Debug, Clone, PartialEq)]
pub struct GRUCell {
    /// Input-to-update-gate [in_dim, out_dim]
    pub w_z: Linear,
    /// Input-to-reset-gate [in_dim, out_dim]
    pub w_r: Linear,
    /// Input-to-candidate [in_dim, out_dim]
    pub w: Linear,
    /// State-to-update-gate [out_dim, out_dim]
    pub u_z: Linear,
    /// State-to-reset-gate [out_dim, out_dim]
    pub u_r: Linear,
    /// State-to-candidate [out_dim, out_dim]
    pub u: Linear,
}

impl GRUCell {
    pub fn new<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        init: WeightInitialization,
        rng: &mut R,
    ) -> GNNResult<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(GNNError::InvalidConfiguration(
                "GRU dimensions must be positive".to_string(),
            ));
        }

        Ok(Self {
            w_z: Linear::new(in_dim, out_dim, init, rng)?,
            w_r: Linear::new(in_dim, out_dim, init, rng)?,
            w: Linear::new(in_dim, out_dim, init, rng)?,
            u_z: Linear::new(out_dim, out_dim, init, rng)?,
            u_r: Linear::new(out_dim, out_dim, init, rng)?,
            u: Linear::new(out_dim, out_dim, init, rng)?,
        })
    }

    pub fn in_dim(&self) -> usize {
        self.w.in_dim()
    }

    pub fn out_dim(&self) -> usize {
        self.w.out_dim()
    }

    /**
     * Advance the cell by one step.
     *
     * @param x Input rows [n, in_dim]
     * @param prev Previous hidden state [n, out_dim], `None` on the first step
     * @return New hidden state [n, out_dim]
     */
    pub fn step(&self, x: ArrayView2<f32>, prev: Option<ArrayView2<f32>>) -> GNNResult<Array2<f32>> {
        let mut z = self.w_z.forward(x)?;
        let mut h_bar = self.w.forward(x)?;

        if let Some(prev) = prev {
            if prev.dim() != (x.nrows(), self.out_dim()) {
                return Err(GNNError::DimensionMismatch(format!(
                    "GRU state shape {:?} doesn't match ({}, {})",
                    prev.dim(),
                    x.nrows(),
                    self.out_dim()
                )));
            }
            let r = (self.w_r.forward(x)? + self.u_r.forward(prev)?).mapv_into(sigmoid);
            z = z + self.u_z.forward(prev)?;
            let gated = &r * &prev;
            h_bar = h_bar + self.u.forward(gated.view())?;
        }

        let z = z.mapv_into(sigmoid);
        let h_bar = h_bar.mapv_into(f32::tanh);

        match prev {
            Some(prev) => {
                let mut out = Array2::zeros(h_bar.raw_dim());
                Zip::from(&mut out)
                    .and(&z)
                    .and(&h_bar)
                    .and(&prev)
                    .for_each(|o, &z, &cand, &old| *o = z * cand + (1.0 - z) * old);
                Ok(out)
            }
            None => Ok(z * h_bar),
        }
    }

    pub fn parameter_count(&self) -> usize {
        [&self.w_z, &self.w_r, &self.w, &self.u_z, &self.u_r, &self.u]
            .iter()
            .map(|layer| layer.parameter_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1, Array3};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn identity_graph_linear(dim: usize) -> GraphLinear {
        GraphLinear::from_linear(Linear::from_parts(Array2::eye(dim), Array1::zeros(dim)).unwrap())
    }

    fn constant_linear(in_dim: usize, out_dim: usize, value: f32) -> Linear {
        Linear::from_parts(Array2::from_elem((in_dim, out_dim), value), Array1::zeros(out_dim))
            .unwrap()
    }

    #[test]
    fn test_gin_message_with_identity_weights() {
        let mlp = GinMessageMlp {
            linear_g1: identity_graph_linear(1),
            linear_g2: identity_graph_linear(1),
        };

        // Star graph: atom 0 connected to atoms 1 and 2
        let mut adj = Array3::<f32>::zeros((1, 3, 3));
        for j in 1..3 {
            adj[[0, 0, j]] = 1.0;
            adj[[0, j, 0]] = 1.0;
        }
        let h = Array3::from_shape_vec((1, 3, 1), vec![1.0, 2.0, -5.0]).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = mlp
            .forward(h.view(), adj.view(), &Dropout::disabled(), TrainingMode::Inference, &mut rng)
            .unwrap();

        // atom 0: 2 - 5 + 1 = -2 -> relu 0; atom 1: 1 + 2 = 3; atom 2: 1 - 5 = -4 -> 0
        assert_eq!(out.into_raw_vec(), vec![0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_gin_message_shape_errors() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mlp = GinMessageMlp::new(4, WeightInitialization::LeCun, &mut rng).unwrap();
        let h = Array3::<f32>::zeros((2, 3, 4));
        let adj = Array3::<f32>::zeros((2, 5, 5));
        let result = mlp.forward(
            h.view(),
            adj.view(),
            &Dropout::disabled(),
            TrainingMode::Inference,
            &mut rng,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_gru_first_step_without_state() {
        let cell = GRUCell {
            w_z: constant_linear(1, 1, 0.0),
            w_r: constant_linear(1, 1, 0.0),
            w: constant_linear(1, 1, 1.0),
            u_z: constant_linear(1, 1, 0.0),
            u_r: constant_linear(1, 1, 0.0),
            u: constant_linear(1, 1, 0.0),
        };
        let out = cell.step(array![[2.0f32]].view(), None).unwrap();
        // z = sigmoid(0) = 0.5, h_bar = tanh(2)
        assert_relative_eq!(out[[0, 0]], 0.5 * 2.0f32.tanh(), epsilon = 1e-6);
    }

    #[test]
    fn test_gru_interpolates_with_previous_state() {
        let cell = GRUCell {
            w_z: constant_linear(1, 1, 0.0),
            w_r: constant_linear(1, 1, 0.0),
            w: constant_linear(1, 1, 1.0),
            u_z: constant_linear(1, 1, 0.0),
            u_r: constant_linear(1, 1, 0.0),
            u: constant_linear(1, 1, 2.0),
        };
        let prev = array![[0.4f32]];
        let out = cell.step(array![[1.0f32]].view(), Some(prev.view())).unwrap();

        // r = 0.5, h_bar = tanh(1 + 2 * 0.5 * 0.4), z = 0.5
        let h_bar = (1.0f32 + 0.4).tanh();
        assert_relative_eq!(out[[0, 0]], 0.5 * h_bar + 0.5 * 0.4, epsilon = 1e-6);
    }

    #[test]
    fn test_gru_rejects_mismatched_state() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let cell = GRUCell::new(3, 3, WeightInitialization::LeCun, &mut rng).unwrap();
        let x = Array2::<f32>::zeros((2, 3));
        let prev = Array2::<f32>::zeros((4, 3));
        assert!(cell.step(x.view(), Some(prev.view())).is_err());
    }

    #[test]
    fn test_gru_parameter_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let cell = GRUCell::new(4, 3, WeightInitialization::LeCun, &mut rng).unwrap();
        // three input maps (4*3+3) and three state maps (3*3+3)
        assert_eq!(cell.parameter_count(), 3 * 15 + 3 * 12);
    }
}
