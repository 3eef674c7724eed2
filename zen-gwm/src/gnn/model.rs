/**
 * @file zen-gwm/src/gnn/model.rs
 * @brief GIN-GWM model: parameter ownership and forward pass
 *
 * ## Forward Algorithm
 *
 * 1. **Embedding**: `h = embed(atom_ids)` (or precomputed features),
 *    `g = embed_super(super_node)`, `h0 = h`
 * 2. **Reset** the GWM recurrent state
 * 3. **Layers**: for each step
 *    - `out_h = relu(dropout(g2(relu(g1(A @ h + h)))))`
 *    - `(h, g) = gwm(h, out_h, g)`
 *    - with `concat_hidden`, record `readout(h, h0, step)`
 * 4. **Output**:
 *    - `concat_hidden`: concatenation of the per-layer readouts
 *    - otherwise `relu(linear_for_concat_super([readout(h, h0) ; g]))`
 *
 * With weight tying a single parameter set (index 0) serves every step.
 *
 * @version 1.0.0-alpha.1
 *
 * @see crate::gnn::warp Graph Warp Module
 * @see crate::gnn::readout Gated readout
 */

use ndarray::{concatenate, Array2, Array3, ArrayView2, ArrayView3, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::data::{AtomInput, MolecularBatch};
use super::layers::{EmbedAtomID, Linear};
use super::readout::GatedReadout;
use super::regularization::Dropout;
use super::updates::GinMessageMlp;
use super::utils::{concat_columns, relu};
use super::warp::{GraphWarpModule, WarpState};
use super::{GinGwmConfig, TrainingMode, WeightInitialization};
use crate::errors::{GNNError, GNNResult};

// === MODEL ===

/**
 * Graph Isomorphism Network equipped with a Graph Warp Module.
 *
 * The model is immutable during a forward pass: recurrent state and dropout
 * randomness are owned by the caller of `forward_with_rng`, so one model can
 * serve concurrent inference.
 *
 * ```rust,no_run
 * use zen_gwm::gnn::{GinGwmModel, MolecularBatch, TrainingMode};
 * # fn example(batch: MolecularBatch) -> zen_gwm::GNNResult<()> {
 * let model = GinGwmModel::builder()
 *     .out_dim(32)
 *     .n_layers(4)
 *     .seed(7)
 *     .build()?;
 * let fingerprints = model.forward(&batch, TrainingMode::Inference)?;
 * # Ok(())
 * # }
 * ```
 */
#[derive(Debug, Clone, PartialEq)]
pub struct GinGwmModel {
    pub config: GinGwmConfig,

    /// Atom id embedding [n_atom_types, hidden_dim]
    pub embed: EmbedAtomID,

    /// Super-node projector [n_super_feature, hidden_dim_super]
    pub embed_super: Linear,

    /// Local message perceptrons, one per weight set
    pub message_mlps: Vec<GinMessageMlp>,

    pub gwm: GraphWarpModule,

    /// Readout perceptrons, one per layer with `concat_hidden`
    pub readouts: Vec<GatedReadout>,

    /// Final projection of `[readout ; g]`, absent with `concat_hidden`
    pub linear_for_concat_super: Option<Linear>,

    dropout: Dropout,
}

/// Fingerprints plus the intermediate states of a forward pass
#[derive(Debug, Clone)]
pub struct ForwardOutput {
    /// [mb, fingerprint_dim]
    pub fingerprint: Array2<f32>,
    /// Final local states [mb, atom, hidden_dim]
    pub node_states: Array3<f32>,
    /// Final super-node states [mb, hidden_dim_super]
    pub super_state: Array2<f32>,
    /// Graph transmitter attention per layer [mb, n_heads, atom]
    pub attention: Vec<Array3<f32>>,
}

/// Model information and statistics
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub model_type: String,
    pub config: GinGwmConfig,
    pub parameter_count: usize,
    pub fingerprint_dim: usize,
}

impl GinGwmModel {
    /// Create a model builder for fluent configuration
    pub fn builder() -> GinGwmModelBuilder {
        GinGwmModelBuilder::default()
    }

    /// Create a model with the given configuration
    pub fn with_config(config: GinGwmConfig) -> GNNResult<Self> {
        Self::builder().config(config).build()
    }

    /**
     * Initialize every parameter from `rng`.
     *
     * Allocation order is fixed, so the same configuration and RNG state
     * always produce identical parameters.
     */
    pub fn initialize<R: Rng + ?Sized>(config: GinGwmConfig, rng: &mut R) -> GNNResult<Self> {
        config.validate()?;
        let init = config.weight_init;

        let embed = EmbedAtomID::new(config.n_atom_types, config.hidden_dim, rng)?;
        let embed_super = Linear::new(config.n_super_feature, config.hidden_dim_super, init, rng)?;

        let message_mlps = (0..config.num_weight_sets())
            .map(|_| GinMessageMlp::new(config.hidden_dim, init, rng))
            .collect::<GNNResult<Vec<_>>>()?;

        let gwm = GraphWarpModule::new(&config, rng)?;

        let readouts = (0..config.num_readout_sets())
            .map(|_| GatedReadout::new(config.hidden_dim, config.out_dim, init, rng))
            .collect::<GNNResult<Vec<_>>>()?;

        let linear_for_concat_super = if config.concat_hidden {
            None
        } else {
            Some(Linear::new(
                config.out_dim + config.hidden_dim_super,
                config.out_dim,
                init,
                rng,
            )?)
        };

        let dropout = Dropout::new(config.dropout_ratio)?;

        let model = Self {
            config,
            embed,
            embed_super,
            message_mlps,
            gwm,
            readouts,
            linear_for_concat_super,
            dropout,
        };

        log::debug!(
            "Initialized GIN-GWM: {} layers, {} weight set(s), {} parameters",
            model.config.n_layers,
            model.config.num_weight_sets(),
            model.count_parameters()
        );

        Ok(model)
    }

    /**
     * Compute fingerprints for a minibatch.
     *
     * Training mode samples dropout masks from the thread-local RNG; use
     * `forward_with_rng` for reproducible training-mode passes.
     *
     * @return Fingerprints [mb, fingerprint_dim]
     */
    pub fn forward(&self, batch: &MolecularBatch, mode: TrainingMode) -> GNNResult<Array2<f32>> {
        let mut rng = rand::thread_rng();
        self.forward_with_rng(batch, mode, &mut rng)
    }

    /// Compute fingerprints drawing dropout masks from `rng`
    pub fn forward_with_rng<R: Rng + ?Sized>(
        &self,
        batch: &MolecularBatch,
        mode: TrainingMode,
        rng: &mut R,
    ) -> GNNResult<Array2<f32>> {
        Ok(self.forward_detailed(batch, mode, rng)?.fingerprint)
    }

    /// Forward pass returning final states and attention maps alongside the fingerprint
    pub fn forward_detailed<R: Rng + ?Sized>(
        &self,
        batch: &MolecularBatch,
        mode: TrainingMode,
        rng: &mut R,
    ) -> GNNResult<ForwardOutput> {
        batch.validate_against(&self.config)?;

        let mb = batch.batch_size();
        let atom = batch.num_atoms();
        log::debug!(
            "GIN-GWM forward: batch={}, atoms={}, mode={:?}",
            mb,
            atom,
            mode
        );

        let adj = batch.adjacency.to_dense();
        let mut h = match &batch.atoms {
            AtomInput::Ids(ids) => self.embed.forward(ids.view())?,
            AtomInput::Features(features) => features.clone(),
        };
        let mut g = self.embed_super.forward(batch.super_node.view())?;
        let h0 = h.clone();

        let mut state = WarpState::new();
        let mut layer_readouts = Vec::with_capacity(self.config.num_readout_sets());
        let mut attention = Vec::with_capacity(self.config.n_layers);

        for step in 0..self.config.n_layers {
            let (new_h, new_g, layer_attention) =
                self.update(h.view(), adj.view(), g.view(), step, &mut state, mode, rng)?;
            h = new_h;
            g = new_g;
            attention.push(layer_attention);

            if self.config.concat_hidden {
                layer_readouts.push(self.readout(h.view(), h0.view(), step)?);
            }
            log::trace!("Layer {} done: |h|={:.4}, |g|={:.4}", step, l2(h.iter()), l2(g.iter()));
        }

        let fingerprint = if self.config.concat_hidden {
            let views: Vec<ArrayView2<f32>> = layer_readouts.iter().map(|r| r.view()).collect();
            concatenate(Axis(1), &views)?
        } else {
            let projector = self.linear_for_concat_super.as_ref().ok_or_else(|| {
                GNNError::InvalidConfiguration(
                    "Super-node projector missing without concat_hidden".to_string(),
                )
            })?;
            let graph_vector = self.readout(h.view(), h0.view(), 0)?;
            let joined = concat_columns(graph_vector.view(), g.view())?;
            projector.forward(joined.view())?.mapv_into(relu)
        };

        Ok(ForwardOutput {
            fingerprint,
            node_states: h,
            super_state: g,
            attention,
        })
    }

    /**
     * One message-passing layer.
     *
     * @param h Local states [mb, atom, hidden_dim]
     * @param adj Dense adjacency [mb, atom, atom]
     * @param g Super-node states [mb, hidden_dim_super]
     * @param step Layer index
     * @return Updated local states, super-node states and attention weights
     */
    #[allow(clippy::too_many_arguments, clippy::type_complexity)]
    pub fn update<R: Rng + ?Sized>(
        &self,
        h: ArrayView3<f32>,
        adj: ArrayView3<f32>,
        g: ArrayView2<f32>,
        step: usize,
        state: &mut WarpState,
        mode: TrainingMode,
        rng: &mut R,
    ) -> GNNResult<(Array3<f32>, Array2<f32>, Array3<f32>)> {
        let index = self.layer_index(step)?;

        let out_h = self.message_mlps[index].forward(h, adj, &self.dropout, mode, rng)?;
        let warped = self
            .gwm
            .forward(h, out_h.view(), g, index, state, mode, rng)?;

        Ok((warped.h, warped.g, warped.attention))
    }

    /// Gated readout of `h` against the initial states `h0`
    pub fn readout(&self, h: ArrayView3<f32>, h0: ArrayView3<f32>, step: usize) -> GNNResult<Array2<f32>> {
        let index = if self.config.concat_hidden { step } else { 0 };
        let readout = self.readouts.get(index).ok_or_else(|| {
            GNNError::InvalidInput(format!(
                "Readout {} out of range ({} available)",
                index,
                self.readouts.len()
            ))
        })?;
        readout.forward(h, h0)
    }

    /// Total number of trainable parameters
    pub fn count_parameters(&self) -> usize {
        self.embed.parameter_count()
            + self.embed_super.parameter_count()
            + self
                .message_mlps
                .iter()
                .map(GinMessageMlp::parameter_count)
                .sum::<usize>()
            + self.gwm.parameter_count()
            + self
                .readouts
                .iter()
                .map(GatedReadout::parameter_count)
                .sum::<usize>()
            + self
                .linear_for_concat_super
                .as_ref()
                .map_or(0, Linear::parameter_count)
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_type: "gin_gwm".to_string(),
            config: self.config.clone(),
            parameter_count: self.count_parameters(),
            fingerprint_dim: self.config.fingerprint_dim(),
        }
    }

    fn layer_index(&self, step: usize) -> GNNResult<usize> {
        if step >= self.config.n_layers {
            return Err(GNNError::InvalidInput(format!(
                "Layer {} out of range for {} layers",
                step, self.config.n_layers
            )));
        }
        Ok(self.config.weight_index(step))
    }
}

fn l2<'a>(values: impl Iterator<Item = &'a f32>) -> f32 {
    values.map(|v| v * v).sum::<f32>().sqrt()
}

// === BUILDER PATTERN ===

/// Fluent builder for `GinGwmModel`
#[derive(Debug, Default)]
pub struct GinGwmModelBuilder {
    config: GinGwmConfig,
}

impl GinGwmModelBuilder {
    /// Set complete configuration
    pub fn config(mut self, config: GinGwmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn out_dim(mut self, dim: usize) -> Self {
        self.config.out_dim = dim;
        self
    }

    pub fn hidden_dim(mut self, dim: usize) -> Self {
        self.config.hidden_dim = dim;
        self
    }

    pub fn hidden_dim_super(mut self, dim: usize) -> Self {
        self.config.hidden_dim_super = dim;
        self
    }

    pub fn n_layers(mut self, layers: usize) -> Self {
        self.config.n_layers = layers;
        self
    }

    pub fn n_heads(mut self, heads: usize) -> Self {
        self.config.n_heads = heads;
        self
    }

    pub fn n_atom_types(mut self, types: usize) -> Self {
        self.config.n_atom_types = types;
        self
    }

    pub fn n_super_feature(mut self, features: usize) -> Self {
        self.config.n_super_feature = features;
        self
    }

    pub fn n_edge_types(mut self, types: usize) -> Self {
        self.config.n_edge_types = types;
        self
    }

    pub fn dropout_ratio(mut self, ratio: f32) -> Self {
        self.config.dropout_ratio = ratio;
        self
    }

    pub fn concat_hidden(mut self, enabled: bool) -> Self {
        self.config.concat_hidden = enabled;
        self
    }

    pub fn weight_tying(mut self, enabled: bool) -> Self {
        self.config.weight_tying = enabled;
        self
    }

    pub fn scalar_merger(mut self, enabled: bool) -> Self {
        self.config.scalar_merger = enabled;
        self
    }

    pub fn weight_init(mut self, init: WeightInitialization) -> Self {
        self.config.weight_init = init;
        self
    }

    /// Seed parameter initialization for reproducible models
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Validate the configuration and initialize parameters
    pub fn build(self) -> GNNResult<GinGwmModel> {
        self.config.validate()?;
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        GinGwmModel::initialize(self.config, &mut rng)
    }
}

// === TESTS ===
