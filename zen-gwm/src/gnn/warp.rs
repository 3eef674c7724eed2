/**
 * @file zen-gwm/src/gnn/warp.rs
 * @brief Graph Warp Module (GWM)
 *
 * The Graph Warp Module augments a message-passing GNN with a global
 * super-node per graph. At every layer it:
 *
 * 1. **Updates the super-node** non-linearly: `g_new = relu(L(g))`
 * 2. **Transmits super -> local** with `SuperNodeTransmitter`: a tanh
 *    projection of `g` broadcast over all atoms
 * 3. **Transmits local -> super** with `GraphTransmitter`: multi-head
 *    attention over atoms, keyed by the current super-node state
 * 4. **Merges** each stream with its transmitted counterpart through a
 *    learned `WarpGate`
 * 5. **Self-recurs** through a GRU per stream whose state lives for one
 *    forward pass (`WarpState`)
 *
 * All per-layer units are stored in vectors indexed by weight set; under
 * weight tying the vectors hold a single element. The GRUs are always shared.
 *
 * @version 1.0.0-alpha.1
 *
 * @see crate::gnn::updates::GRUCell
 */

use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3};
use rand::Rng;

use super::layers::{GraphLinear, Linear};
use super::regularization::Dropout;
use super::updates::GRUCell;
use super::utils::{
    broadcast_atoms, flatten_atoms, lerp_gate, relu, sigmoid, softmax_last_axis, unflatten_atoms,
};
use super::{GinGwmConfig, TrainingMode, WeightInitialization};
use crate::errors::{GNNError, GNNResult};

// === WARP GATE ===

/**
 * Learned gate mixing two states of the same width.
 *
 * `z = sigmoid(dropout(H x + G y))`, `merged = (1 - z) * x + z * y`.
 * A scalar gate (width 1) is broadcast over every channel of a row.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct WarpGate {
    /// Projection of the own state [dim, gate_dim]
    pub h: Linear,
    /// Projection of the transmitted state [dim, gate_dim]
    pub g: Linear,
}

impl WarpGate {
    pub fn new<R: Rng + ?Sized>(
        dim: usize,
        scalar: bool,
        init: WeightInitialization,
        rng: &mut R,
    ) -> GNNResult<Self> {
        let gate_dim = if scalar { 1 } else { dim };
        Ok(Self {
            h: Linear::new(dim, gate_dim, init, rng)?,
            g: Linear::new(dim, gate_dim, init, rng)?,
        })
    }

    pub fn is_scalar(&self) -> bool {
        self.h.out_dim() == 1
    }

    /// Merge row batches `x` (own) and `y` (transmitted), both `[n, dim]`
    pub fn forward<R: Rng + ?Sized>(
        &self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        dropout: &Dropout,
        mode: TrainingMode,
        rng: &mut R,
    ) -> GNNResult<Array2<f32>> {
        if x.dim() != y.dim() {
            return Err(GNNError::DimensionMismatch(format!(
                "Warp gate inputs differ: {:?} vs {:?}",
                x.dim(),
                y.dim()
            )));
        }

        if self.h.out_dim() != self.g.out_dim() {
            return Err(GNNError::mismatch("Warp gate projection width", self.h.out_dim(), self.g.out_dim()));
        }

        let logits = self.h.forward(x)? + self.g.forward(y)?;
        let z = dropout.apply(logits, mode, rng).mapv_into(sigmoid);

        let z = if z.ncols() == x.ncols() {
            z
        } else {
            z.broadcast(x.raw_dim())
                .ok_or_else(|| GNNError::mismatch("Warp gate width", x.ncols(), z.ncols()))?
                .to_owned()
        };

        Ok(lerp_gate(z.view(), x, y))
    }

    pub fn parameter_count(&self) -> usize {
        self.h.parameter_count() + self.g.parameter_count()
    }
}

// === SUPER -> LOCAL TRANSMITTER ===

/// Projects the super-node state into the local space of every atom
#[derive(Debug, Clone, PartialEq)]
pub struct SuperNodeTransmitter {
    /// [hidden_dim_super, hidden_dim]
    pub f_super: Linear,
}

impl SuperNodeTransmitter {
    pub fn new<R: Rng + ?Sized>(
        hidden_dim_super: usize,
        hidden_dim: usize,
        init: WeightInitialization,
        rng: &mut R,
    ) -> GNNResult<Self> {
        Ok(Self {
            f_super: Linear::new(hidden_dim_super, hidden_dim, init, rng)?,
        })
    }

    /// `(mb, hidden_dim_super) -> (mb, n_atoms, hidden_dim)`
    pub fn forward<R: Rng + ?Sized>(
        &self,
        g: ArrayView2<f32>,
        n_atoms: usize,
        dropout: &Dropout,
        mode: TrainingMode,
        rng: &mut R,
    ) -> GNNResult<Array3<f32>> {
        let projected = self.f_super.forward(g)?;
        let projected = dropout.apply(projected, mode, rng).mapv_into(f32::tanh);
        broadcast_atoms(projected.view(), n_atoms)
    }

    pub fn parameter_count(&self) -> usize {
        self.f_super.parameter_count()
    }
}

// === LOCAL -> SUPER TRANSMITTER ===

/**
 * Multi-head attention pooling of atom states into the super-node space.
 *
 * For head `k` and atom `i` of molecule `m`:
 * - value `v[m,i,k] = V(h)[m, i, k*hidden_dim..(k+1)*hidden_dim]`
 * - key `b[m,i,k] = B(v)[m, i, k*hidden_dim_super..(k+1)*hidden_dim_super]`
 * - weight `a[m,k,:] = softmax_i(<b[m,i,k], g[m]>)`
 * - head `sum_i a[m,k,i] * v[m,i,k]`
 *
 * Heads are concatenated and mapped by `W` with a tanh activation.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct GraphTransmitter {
    /// Value projection [hidden_dim, hidden_dim * n_heads]
    pub v_super: GraphLinear,
    /// Key projection [hidden_dim * n_heads, hidden_dim_super * n_heads]
    pub b: GraphLinear,
    /// Output projection [hidden_dim * n_heads, hidden_dim_super]
    pub w_super: Linear,
    pub n_heads: usize,
}

impl GraphTransmitter {
    pub fn new<R: Rng + ?Sized>(
        hidden_dim: usize,
        hidden_dim_super: usize,
        n_heads: usize,
        init: WeightInitialization,
        rng: &mut R,
    ) -> GNNResult<Self> {
        if n_heads == 0 {
            return Err(GNNError::InvalidConfiguration(
                "Graph transmitter needs at least one attention head".to_string(),
            ));
        }
        Ok(Self {
            v_super: GraphLinear::new(hidden_dim, hidden_dim * n_heads, init, rng)?,
            b: GraphLinear::new(hidden_dim * n_heads, hidden_dim_super * n_heads, init, rng)?,
            w_super: Linear::new(hidden_dim * n_heads, hidden_dim_super, init, rng)?,
            n_heads,
        })
    }

    fn hidden_dim(&self) -> usize {
        self.v_super.in_dim()
    }

    fn hidden_dim_super(&self) -> usize {
        self.w_super.out_dim()
    }

    /**
     * Pool local states into a super-node message.
     *
     * @param h Local states [mb, atom, hidden_dim]
     * @param g Super-node states [mb, hidden_dim_super]
     * @return (message [mb, hidden_dim_super], attention [mb, n_heads, atom])
     */
    pub fn forward<R: Rng + ?Sized>(
        &self,
        h: ArrayView3<f32>,
        g: ArrayView2<f32>,
        dropout: &Dropout,
        mode: TrainingMode,
        rng: &mut R,
    ) -> GNNResult<(Array2<f32>, Array3<f32>)> {
        let (mb, atom, _) = h.dim();
        if g.dim() != (mb, self.hidden_dim_super()) {
            return Err(GNNError::DimensionMismatch(format!(
                "Super-node state shape {:?} doesn't match ({}, {})",
                g.dim(),
                mb,
                self.hidden_dim_super()
            )));
        }

        let ch = self.hidden_dim();
        let cs = self.hidden_dim_super();
        let values = self.v_super.forward(h)?;
        let keys = self.b.forward(values.view())?;

        let mut attention = Array3::zeros((mb, self.n_heads, atom));
        for m in 0..mb {
            let g_m = g.row(m);
            for k in 0..self.n_heads {
                for i in 0..atom {
                    let key = keys.slice(s![m, i, k * cs..(k + 1) * cs]);
                    attention[[m, k, i]] = key.dot(&g_m);
                }
            }
        }
        softmax_last_axis(&mut attention);

        let mut pooled = Array2::zeros((mb, self.n_heads * ch));
        for m in 0..mb {
            for k in 0..self.n_heads {
                let mut head = pooled.slice_mut(s![m, k * ch..(k + 1) * ch]);
                for i in 0..atom {
                    let value = values.slice(s![m, i, k * ch..(k + 1) * ch]);
                    head.scaled_add(attention[[m, k, i]], &value);
                }
            }
        }

        let message = self.w_super.forward(pooled.view())?;
        let message = dropout.apply(message, mode, rng).mapv_into(f32::tanh);
        Ok((message, attention))
    }

    pub fn parameter_count(&self) -> usize {
        self.v_super.parameter_count() + self.b.parameter_count() + self.w_super.parameter_count()
    }
}

// === STATE ===

/// Recurrent state of the two GWM GRUs for one forward pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarpState {
    /// Local GRU state [mb * atom, hidden_dim]
    pub local: Option<Array2<f32>>,
    /// Super-node GRU state [mb, hidden_dim_super]
    pub super_node: Option<Array2<f32>>,
}

impl WarpState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget both recurrent states
    pub fn reset(&mut self) {
        self.local = None;
        self.super_node = None;
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_none() && self.super_node.is_none()
    }
}

/// Result of one GWM layer
#[derive(Debug, Clone)]
pub struct WarpOutput {
    /// Updated local states [mb, atom, hidden_dim]
    pub h: Array3<f32>,
    /// Updated super-node states [mb, hidden_dim_super]
    pub g: Array2<f32>,
    /// Graph transmitter attention [mb, n_heads, atom]
    pub attention: Array3<f32>,
}

// === GRAPH WARP MODULE ===

#[derive(Debug, Clone, PartialEq)]
pub struct GraphWarpModule {
    pub update_super: Vec<Linear>,
    pub super_transmitters: Vec<SuperNodeTransmitter>,
    pub graph_transmitters: Vec<GraphTransmitter>,
    pub local_gates: Vec<WarpGate>,
    pub super_gates: Vec<WarpGate>,
    pub gru_local: GRUCell,
    pub gru_super: GRUCell,
    pub dropout: Dropout,
}

impl GraphWarpModule {
    /// Allocate one unit per weight set as dictated by the configuration
    pub fn new<R: Rng + ?Sized>(config: &GinGwmConfig, rng: &mut R) -> GNNResult<Self> {
        let hd = config.hidden_dim;
        let hs = config.hidden_dim_super;
        let init = config.weight_init;
        let n = config.num_weight_sets();

        let mut module = Self {
            update_super: Vec::with_capacity(n),
            super_transmitters: Vec::with_capacity(n),
            graph_transmitters: Vec::with_capacity(n),
            local_gates: Vec::with_capacity(n),
            super_gates: Vec::with_capacity(n),
            gru_local: GRUCell::new(hd, hd, init, rng)?,
            gru_super: GRUCell::new(hs, hs, init, rng)?,
            dropout: Dropout::new(config.dropout_ratio)?,
        };

        for _ in 0..n {
            module.update_super.push(Linear::new(hs, hs, init, rng)?);
            module
                .super_transmitters
                .push(SuperNodeTransmitter::new(hs, hd, init, rng)?);
            module
                .graph_transmitters
                .push(GraphTransmitter::new(hd, hs, config.n_heads, init, rng)?);
            module
                .local_gates
                .push(WarpGate::new(hd, config.scalar_merger, init, rng)?);
            module
                .super_gates
                .push(WarpGate::new(hs, config.scalar_merger, init, rng)?);
        }

        Ok(module)
    }

    pub fn num_weight_sets(&self) -> usize {
        self.update_super.len()
    }

    /**
     * Run one GWM layer.
     *
     * @param h Local states entering the layer [mb, atom, hidden_dim]
     * @param h_new Local states produced by the GIN update [mb, atom, hidden_dim]
     * @param g Super-node states entering the layer [mb, hidden_dim_super]
     * @param weight_index Parameter set to use
     * @param state GRU states, updated in place
     */
    #[allow(clippy::too_many_arguments)]
    pub fn forward<R: Rng + ?Sized>(
        &self,
        h: ArrayView3<f32>,
        h_new: ArrayView3<f32>,
        g: ArrayView2<f32>,
        weight_index: usize,
        state: &mut WarpState,
        mode: TrainingMode,
        rng: &mut R,
    ) -> GNNResult<WarpOutput> {
        if weight_index >= self.num_weight_sets() {
            return Err(GNNError::InvalidInput(format!(
                "Weight set {} out of range ({} available)",
                weight_index,
                self.num_weight_sets()
            )));
        }
        if h.dim() != h_new.dim() {
            return Err(GNNError::DimensionMismatch(format!(
                "Local states differ: {:?} vs {:?}",
                h.dim(),
                h_new.dim()
            )));
        }
        let (mb, atom, _) = h.dim();

        // Non-linear update of the super-node
        let g_new = self.update_super[weight_index].forward(g)?.mapv_into(relu);

        // Inter-module message passing
        let h_trans = self.super_transmitters[weight_index].forward(
            g,
            atom,
            &self.dropout,
            mode,
            rng,
        )?;
        let (g_trans, attention) =
            self.graph_transmitters[weight_index].forward(h, g, &self.dropout, mode, rng)?;

        // Warp gates, local rows flattened to (mb * atom, hidden_dim)
        let h_new_flat = flatten_atoms(h_new)?;
        let h_trans_flat = flatten_atoms(h_trans.view())?;
        let merged_h = self.local_gates[weight_index].forward(
            h_new_flat.view(),
            h_trans_flat.view(),
            &self.dropout,
            mode,
            rng,
        )?;
        let merged_g = self.super_gates[weight_index].forward(
            g_new.view(),
            g_trans.view(),
            &self.dropout,
            mode,
            rng,
        )?;

        // Self recurrence
        let out_h = self
            .gru_local
            .step(merged_h.view(), state.local.as_ref().map(|s| s.view()))?;
        let out_g = self
            .gru_super
            .step(merged_g.view(), state.super_node.as_ref().map(|s| s.view()))?;

        let h = unflatten_atoms(out_h.view(), mb, atom)?;
        state.local = Some(out_h);
        state.super_node = Some(out_g.clone());

        Ok(WarpOutput {
            h,
            g: out_g,
            attention,
        })
    }

    pub fn parameter_count(&self) -> usize {
        let per_layer: usize = self.update_super.iter().map(Linear::parameter_count).sum::<usize>()
            + self
                .super_transmitters
                .iter()
                .map(SuperNodeTransmitter::parameter_count)
                .sum::<usize>()
            + self
                .graph_transmitters
                .iter()
                .map(GraphTransmitter::parameter_count)
                .sum::<usize>()
            + self.local_gates.iter().map(WarpGate::parameter_count).sum::<usize>()
            + self.super_gates.iter().map(WarpGate::parameter_count).sum::<usize>();

        per_layer + self.gru_local.parameter_count() + self.gru_super.parameter_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1, Axis};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_config() -> GinGwmConfig {
        GinGwmConfig {
            hidden_dim: 4,
            hidden_dim_super: 3,
            n_heads: 2,
            n_layers: 3,
            dropout_ratio: 0.0,
            ..Default::default()
        }
    }

    fn zero_linear(in_dim: usize, out_dim: usize) -> Linear {
        Linear::from_parts(Array2::zeros((in_dim, out_dim)), Array1::zeros(out_dim)).unwrap()
    }

    #[test]
    fn test_warp_gate_zero_weights_is_midpoint() {
        let gate = WarpGate {
            h: zero_linear(2, 2),
            g: zero_linear(2, 2),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = gate
            .forward(
                array![[0.0f32, 2.0]].view(),
                array![[4.0f32, 6.0]].view(),
                &Dropout::disabled(),
                TrainingMode::Inference,
                &mut rng,
            )
            .unwrap();
        assert_eq!(out, array![[2.0f32, 4.0]]);
    }

    #[test]
    fn test_scalar_gate_broadcasts() {
        let gate = WarpGate {
            h: Linear::from_parts(Array2::zeros((3, 1)), array![100.0]).unwrap(),
            g: zero_linear(3, 1),
        };
        assert!(gate.is_scalar());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let x = array![[1.0f32, 2.0, 3.0]];
        let y = array![[7.0f32, 8.0, 9.0]];
        let out = gate
            .forward(x.view(), y.view(), &Dropout::disabled(), TrainingMode::Inference, &mut rng)
            .unwrap();
        // sigmoid(100) ~ 1: output follows y on every channel
        for (o, t) in out.iter().zip(y.iter()) {
            assert_relative_eq!(*o, *t, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_scalar_gate_on_single_channel() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let scalar = WarpGate::new(1, true, WeightInitialization::LeCun, &mut rng).unwrap();
        assert!(scalar.is_scalar());
        let vector = WarpGate::new(3, false, WeightInitialization::LeCun, &mut rng).unwrap();
        assert!(!vector.is_scalar());
        assert!(WarpGate::new(3, true, WeightInitialization::LeCun, &mut rng)
            .unwrap()
            .is_scalar());
    }

    #[test]
    fn test_gate_rejects_mismatched_projections() {
        let gate = WarpGate {
            h: zero_linear(2, 2),
            g: zero_linear(2, 1),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let x = array![[1.0f32, 2.0]];
        assert!(gate
            .forward(x.view(), x.view(), &Dropout::disabled(), TrainingMode::Inference, &mut rng)
            .is_err());
    }

    #[test]
    fn test_super_transmitter_is_shared_across_atoms() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let unit = SuperNodeTransmitter::new(3, 4, WeightInitialization::LeCun, &mut rng).unwrap();
        let g = Array2::from_shape_fn((2, 3), |(m, c)| (m * 3 + c) as f32 * 0.2);
        let out = unit
            .forward(g.view(), 5, &Dropout::disabled(), TrainingMode::Inference, &mut rng)
            .unwrap();
        assert_eq!(out.dim(), (2, 5, 4));
        for m in 0..2 {
            let first = out.slice(s![m, 0, ..]).to_owned();
            for i in 1..5 {
                assert_eq!(out.slice(s![m, i, ..]), first);
            }
        }
        assert!(out.iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn test_graph_transmitter_attention_normalized() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let unit = GraphTransmitter::new(4, 3, 2, WeightInitialization::LeCun, &mut rng).unwrap();
        let h = Array3::from_shape_fn((2, 5, 4), |(m, i, c)| ((m + i + c) % 3) as f32 - 1.0);
        let g = Array2::from_elem((2, 3), 0.5f32);

        let (message, attention) = unit
            .forward(h.view(), g.view(), &Dropout::disabled(), TrainingMode::Inference, &mut rng)
            .unwrap();
        assert_eq!(message.dim(), (2, 3));
        assert_eq!(attention.dim(), (2, 2, 5));
        for lane in attention.lanes(Axis(2)) {
            assert_relative_eq!(lane.sum(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_graph_transmitter_uniform_keys_average_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut unit = GraphTransmitter::new(2, 2, 1, WeightInitialization::LeCun, &mut rng).unwrap();
        unit.v_super = GraphLinear::from_linear(
            Linear::from_parts(Array2::eye(2), Array1::zeros(2)).unwrap(),
        );
        unit.b = GraphLinear::from_linear(zero_linear(2, 2));
        unit.w_super = Linear::from_parts(Array2::eye(2), Array1::zeros(2)).unwrap();

        let h = array![[[1.0f32, 0.0], [3.0, 2.0]]];
        let g = array![[1.0f32, 1.0]];
        let (message, attention) = unit
            .forward(h.view(), g.view(), &Dropout::disabled(), TrainingMode::Inference, &mut rng)
            .unwrap();

        assert_relative_eq!(attention[[0, 0, 0]], 0.5, epsilon = 1e-6);
        assert_relative_eq!(message[[0, 0]], 2.0f32.tanh(), epsilon = 1e-6);
        assert_relative_eq!(message[[0, 1]], 1.0f32.tanh(), epsilon = 1e-6);
    }

    #[test]
    fn test_graph_transmitter_rejects_bad_super_state() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let unit = GraphTransmitter::new(4, 3, 2, WeightInitialization::LeCun, &mut rng).unwrap();
        let h = Array3::<f32>::zeros((2, 5, 4));
        let g = Array2::<f32>::zeros((2, 4));
        assert!(unit
            .forward(h.view(), g.view(), &Dropout::disabled(), TrainingMode::Inference, &mut rng)
            .is_err());
    }

    #[test]
    fn test_gwm_weight_sets_follow_tying() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tied = GraphWarpModule::new(&small_config(), &mut rng).unwrap();
        assert_eq!(tied.num_weight_sets(), 1);

        let untied_config = GinGwmConfig {
            weight_tying: false,
            ..small_config()
        };
        let untied = GraphWarpModule::new(&untied_config, &mut rng).unwrap();
        assert_eq!(untied.num_weight_sets(), 3);
        assert!(untied.parameter_count() > tied.parameter_count());
    }

    #[test]
    fn test_gwm_forward_updates_state() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let gwm = GraphWarpModule::new(&small_config(), &mut rng).unwrap();
        let h = Array3::from_shape_fn((2, 3, 4), |(m, i, c)| (m + i) as f32 * 0.1 + c as f32 * 0.05);
        let h_new = h.mapv(|v| v * 2.0);
        let g = Array2::from_elem((2, 3), 0.3f32);

        let mut state = WarpState::new();
        assert!(state.is_empty());

        let first = gwm
            .forward(h.view(), h_new.view(), g.view(), 0, &mut state, TrainingMode::Inference, &mut rng)
            .unwrap();
        assert_eq!(first.h.dim(), (2, 3, 4));
        assert_eq!(first.g.dim(), (2, 3));
        assert_eq!(first.attention.dim(), (2, 2, 3));
        assert_eq!(state.local.as_ref().map(|s| s.dim()), Some((6, 4)));
        assert_eq!(state.super_node.as_ref(), Some(&first.g));

        // Same inputs with a carried state give a different result
        let second = gwm
            .forward(h.view(), h_new.view(), g.view(), 0, &mut state, TrainingMode::Inference, &mut rng)
            .unwrap();
        assert_ne!(first.h, second.h);

        state.reset();
        let replay = gwm
            .forward(h.view(), h_new.view(), g.view(), 0, &mut state, TrainingMode::Inference, &mut rng)
            .unwrap();
        assert_eq!(first.h, replay.h);
        assert_eq!(first.g, replay.g);
    }

    #[test]
    fn test_gwm_rejects_unknown_weight_set() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let gwm = GraphWarpModule::new(&small_config(), &mut rng).unwrap();
        let h = Array3::<f32>::zeros((1, 2, 4));
        let g = Array2::<f32>::zeros((1, 3));
        let result = gwm.forward(
            h.view(),
            h.view(),
            g.view(),
            1,
            &mut WarpState::new(),
            TrainingMode::Inference,
            &mut rng,
        );
        assert!(matches!(result, Err(GNNError::InvalidInput(_))));
    }
}
