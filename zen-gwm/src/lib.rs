//! Graph Isomorphism Network with Graph Warp Module (GIN-GWM)
//!
//! This crate computes fixed-size molecular fingerprints from atom-level
//! graphs. A GIN message-passing stack updates per-atom hidden states while a
//! Graph Warp Module maintains one global super-node per molecule and
//! exchanges information with the atoms through attention transmitters, warp
//! gates and GRU cells.
//!
//! - **Batch-first tensors** built on `ndarray`
//! - **Weight tying** across layers or one parameter set per layer
//! - **Reproducible** parameter initialization from a seeded ChaCha8 RNG
//! - **Inference and training modes** with dropout in training mode only
//!
//! ### Quick Start:
//!
//! ```rust,no_run
//! use zen_gwm::gnn_api::*;
//! use ndarray::{Array2, Array3};
//!
//! # fn example() -> GNNResult<()> {
//! // Two molecules, three atoms each (0 pads the second one)
//! let ids = Array2::from_shape_vec((2, 3), vec![6, 6, 8, 6, 8, 0])?;
//! let adjacency = Array3::<f32>::zeros((2, 3, 3));
//! let super_node = Array2::<f32>::zeros((2, DEFAULT_SUPER_FEATURES));
//! let batch = MolecularBatch::from_ids(ids, adjacency, super_node)?;
//!
//! let model = GinGwmModel::builder()
//!     .out_dim(32)
//!     .hidden_dim(16)
//!     .n_layers(4)
//!     .seed(42)
//!     .build()?;
//!
//! let fingerprints = model.forward(&batch, TrainingMode::Inference)?;
//! assert_eq!(fingerprints.dim(), (2, 32));
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod gnn;

pub use errors::{GNNError, GNNResult};

/// Convenience re-exports for building and running GIN-GWM models
pub mod gnn_api {
    //! Everything needed to configure a model, assemble minibatches and
    //! compute fingerprints.
    //!
    //! ```rust,no_run
    //! use zen_gwm::gnn_api::*;
    //!
    //! # fn example() -> GNNResult<()> {
    //! let config = GinGwmConfig {
    //!     concat_hidden: true,
    //!     ..GinGwmConfig::default()
    //! };
    //! let model = GinGwmModel::with_config(config)?;
    //! assert_eq!(model.model_info().fingerprint_dim, 16 * 4);
    //! # Ok(())
    //! # }
    //! ```

    // Core types and error handling
    pub use crate::errors::{GNNError, GNNResult};

    // Configuration
    pub use crate::gnn::{
        GinGwmConfig, TrainingMode, WeightInitialization, DEFAULT_SUPER_FEATURES,
        MAX_ATOMIC_NUM, NUM_EDGE_TYPES,
    };

    // Input data
    pub use crate::gnn::{Adjacency, AtomInput, MolecularBatch};

    // Model
    pub use crate::gnn::{ForwardOutput, GinGwmModel, GinGwmModelBuilder, ModelInfo};

    // Building blocks
    pub use crate::gnn::{
        Dropout, EmbedAtomID, GRUCell, GatedReadout, GinMessageMlp, GraphLinear,
        GraphTransmitter, GraphWarpModule, Linear, SuperNodeTransmitter, WarpGate, WarpOutput,
        WarpState,
    };
}
