/**
 * @file zen-gwm/src/gnn/mod.rs
 * @brief Graph Isomorphism Network with Graph Warp Module (GIN-GWM)
 *
 * This module implements the GIN message-passing stack augmented with a Graph
 * Warp Module for computing fixed-size molecular fingerprints. Each molecule in
 * a minibatch carries per-atom ("local") hidden states and one global
 * super-node state; every layer updates both and exchanges information between
 * them through attention-based transmitters and learned warp gates.
 *
 * ## Architecture Overview
 *
 * ### Core Components:
 * - **Atom Embedding**: `EmbedAtomID` lookup table from atomic number to hidden vector
 * - **Super-node Projector**: linear map from the super-node observation vector
 * - **GIN Message MLP**: `relu(g2(relu(g1(A·h + h))))` per layer (or shared when tied)
 * - **Graph Warp Module**: super-node update, transmitters, warp gates and GRUs
 * - **Gated Readout**: `Σ_atoms sigmoid(i([h; h0])) ⊙ j(h)`
 *
 * ### Data Flow:
 *
 * ```text
 * atom ids ──embed──► h0 ─┬─► [GIN MLP ─► GWM] × n_layers ─► h ─► readout ─┐
 * super obs ─linear─► g0 ─┘                          └──────► g ─────────────┴─► relu(linear) ─► fingerprint
 * ```
 *
 * ### Shape Conventions:
 * All tensors are batch-first `f32`:
 * - local states `(mb, atom, hidden_dim)`
 * - super-node states `(mb, hidden_dim_super)`
 * - adjacency `(mb, atom, atom)` or `(mb, n_edge_types, atom, atom)`
 *
 * @version 1.0.0-alpha.1
 *
 * @see model.rs Forward pass orchestration
 * @see warp.rs Graph Warp Module
 */

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{GNNError, GNNResult};

// === MODULE DECLARATIONS ===

/// Molecular minibatch structures (atom input, adjacency, super-node observation)
pub mod data;

/// Linear, graph-linear and embedding layers with weight initialization
pub mod layers;

/// Dropout regularization
pub mod regularization;

/// GIN message MLP and GRU recurrent cell
pub mod updates;

/// Graph Warp Module: transmitters, warp gates and self-recurrent units
pub mod warp;

/// Gated readout producing graph-level vectors
pub mod readout;

/// GIN-GWM model and builder
pub mod model;

/// Tensor helpers shared by the layers
pub mod utils;

// === RE-EXPORTS ===

pub use data::{Adjacency, AtomInput, MolecularBatch};
pub use layers::{EmbedAtomID, GraphLinear, Linear};
pub use model::{ForwardOutput, GinGwmModel, GinGwmModelBuilder, ModelInfo};
pub use readout::GatedReadout;
pub use regularization::Dropout;
pub use updates::{GRUCell, GinMessageMlp};
pub use warp::{
    GraphTransmitter, GraphWarpModule, SuperNodeTransmitter, WarpGate, WarpOutput, WarpState,
};

// === CONSTANTS ===

/// Largest atomic number handled by the atom embedding table
pub const MAX_ATOMIC_NUM: usize = 117;

/// Default width of the super-node observation vector.
///
/// Matches the feature layout produced by the graph-transformer preprocessor:
/// 4 + 2 + 4 summary statistics plus two atom-type histograms.
pub const DEFAULT_SUPER_FEATURES: usize = 4 + 2 + 4 + MAX_ATOMIC_NUM * 2;

/// Number of bond types in the multi-relational adjacency tensor
pub const NUM_EDGE_TYPES: usize = 4;

// === CONFIGURATION TYPES ===

/// Weight initialization strategies
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightInitialization {
    /// LeCun normal: `N(0, 1/fan_in)` (default for linear layers)
    LeCun,
    /// He initialization (uniform, scale `sqrt(2/fan_in)`)
    He,
    /// Xavier/Glorot uniform initialization
    Xavier,
    /// Random normal distribution
    Normal { mean: f32, std: f32 },
    /// Random uniform distribution
    Uniform { min: f32, max: f32 },
}

impl WeightInitialization {
    /// Reject distribution parameters the samplers cannot draw from
    pub fn validate(&self) -> GNNResult<()> {
        match *self {
            WeightInitialization::Normal { mean, std } => {
                if !mean.is_finite() || !std.is_finite() || std < 0.0 {
                    return Err(GNNError::InvalidConfiguration(format!(
                        "Normal initialization requires a finite mean and a finite non-negative std, got N({}, {})",
                        mean, std
                    )));
                }
            }
            WeightInitialization::Uniform { min, max } => {
                if !min.is_finite() || !max.is_finite() || !(min < max) || !(max - min).is_finite() {
                    return Err(GNNError::InvalidConfiguration(format!(
                        "Uniform initialization requires finite bounds with min < max, got [{}, {})",
                        min, max
                    )));
                }
            }
            WeightInitialization::LeCun | WeightInitialization::He | WeightInitialization::Xavier => {}
        }
        Ok(())
    }
}

/// Training modes controlling dropout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingMode {
    /// Dropout masks are sampled
    Training,
    /// Deterministic pass, dropout disabled
    Inference,
}

/**
 * Configuration for the GIN-GWM network.
 *
 * Defaults follow the reference model: 16-wide local and super-node states,
 * four layers with tied weights, eight attention heads and dropout 0.5.
 */
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct GinGwmConfig {
    /// Dimension of the output fingerprint
    pub out_dim: usize,

    /// Dimension of per-atom hidden vectors
    pub hidden_dim: usize,

    /// Dimension of the super-node hidden vector
    pub hidden_dim_super: usize,

    /// Number of message passing layers
    pub n_layers: usize,

    /// Number of attention heads in the graph transmitter
    pub n_heads: usize,

    /// Size of the atom embedding table
    pub n_atom_types: usize,

    /// Width of the super-node observation vector
    pub n_super_feature: usize,

    /// Number of relation types accepted in a multi-relational adjacency
    pub n_edge_types: usize,

    /// Dropout ratio; 0.0 disables dropout
    pub dropout_ratio: f32,

    /// Run the readout after every layer and concatenate the results
    pub concat_hidden: bool,

    /// Share one parameter set across all layers
    pub weight_tying: bool,

    /// Reduce warp gates to a single scalar per row
    pub scalar_merger: bool,

    /// Weight initialization for linear layers
    pub weight_init: WeightInitialization,

    /// Seed for parameter initialization; random when absent
    pub seed: Option<u64>,
}

impl Default for GinGwmConfig {
    fn default() -> Self {
        Self {
            out_dim: 16,
            hidden_dim: 16,
            hidden_dim_super: 16,
            n_layers: 4,
            n_heads: 8,
            n_atom_types: MAX_ATOMIC_NUM,
            n_super_feature: DEFAULT_SUPER_FEATURES,
            n_edge_types: NUM_EDGE_TYPES,
            dropout_ratio: 0.5,
            concat_hidden: false,
            weight_tying: true,
            scalar_merger: false,
            weight_init: WeightInitialization::LeCun,
            seed: None,
        }
    }
}

impl GinGwmConfig {
    /// Validate dimensions and ratios
    pub fn validate(&self) -> GNNResult<()> {
        let dims = [
            ("out_dim", self.out_dim),
            ("hidden_dim", self.hidden_dim),
            ("hidden_dim_super", self.hidden_dim_super),
            ("n_layers", self.n_layers),
            ("n_heads", self.n_heads),
            ("n_atom_types", self.n_atom_types),
            ("n_super_feature", self.n_super_feature),
            ("n_edge_types", self.n_edge_types),
        ];
        for (name, value) in dims {
            if value == 0 {
                return Err(GNNError::InvalidConfiguration(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        if !(0.0..1.0).contains(&self.dropout_ratio) {
            return Err(GNNError::InvalidConfiguration(format!(
                "Dropout ratio must be in [0.0, 1.0), got {}",
                self.dropout_ratio
            )));
        }

        self.weight_init.validate()
    }

    /// Number of distinct per-layer parameter sets
    pub fn num_weight_sets(&self) -> usize {
        if self.weight_tying {
            1
        } else {
            self.n_layers
        }
    }

    /// Number of readout perceptron pairs
    pub fn num_readout_sets(&self) -> usize {
        if self.concat_hidden {
            self.n_layers
        } else {
            1
        }
    }

    /// Width of the fingerprint produced by a forward pass
    pub fn fingerprint_dim(&self) -> usize {
        self.out_dim * self.num_readout_sets()
    }

    /// Parameter set used at a given layer
    pub fn weight_index(&self, step: usize) -> usize {
        if self.weight_tying {
            0
        } else {
            step
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> GNNResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as pretty-printed JSON
    #[cfg(feature = "serde")]
    pub fn to_json_string(&self) -> GNNResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// === TESTS ===
