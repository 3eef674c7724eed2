/**
 * @file zen-gwm/src/gnn/layers.rs
 * @brief Parameterized building blocks of the GIN-GWM network
 *
 * ## Layer Types:
 *
 * - **Linear**: `output = input @ weight + bias` on `(n, in_dim)` matrices
 * - **GraphLinear**: the same affine map applied to the channel axis of a
 *   batch of per-atom states `(mb, atom, in_dim)`
 * - **EmbedAtomID**: lookup table from integer atom ids to dense vectors
 *
 * ## Weight Initialization:
 *
 * Weights are drawn from a caller-supplied RNG so that a seeded model is fully
 * reproducible; biases start at zero. Weight matrices are stored as
 * `[in_dim, out_dim]` so the forward pass is a plain `input.dot(weight)`.
 *
 * @version 1.0.0-alpha.1
 *
 * @see crate::gnn::WeightInitialization
 */

use ndarray::{Array1, Array2, Array3, ArrayView2, ArrayView3, Axis};
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::Normal;

use super::utils::{flatten_atoms, unflatten_atoms};
use super::WeightInitialization;
use crate::errors::{GNNError, GNNResult};

/**
 * Create a weight matrix of shape `[fan_in, fan_out]` with the given strategy.
 *
 * - LeCun: `N(0, sqrt(1/fan_in))`
 * - He: `U(-s, s)`, `s = sqrt(2/fan_in)`
 * - Xavier: `U(-s, s)`, `s = sqrt(6/(fan_in + fan_out))`
 */
pub fn create_weight_matrix<R: Rng + ?Sized>(
    shape: (usize, usize),
    init: WeightInitialization,
    rng: &mut R,
) -> GNNResult<Array2<f32>> {
    let (fan_in, fan_out) = shape;

    init.validate()?;

    if fan_in == 0 || fan_out == 0 {
        return Ok(Array2::zeros(shape));
    }

    let weights = match init {
        WeightInitialization::LeCun => {
            let std = (1.0f32 / fan_in as f32).sqrt();
            Array2::random_using(shape, normal(0.0, std)?, rng)
        }
        WeightInitialization::He => {
            let scale = (2.0f32 / fan_in as f32).sqrt();
            Array2::random_using(shape, Uniform::new(-scale, scale), rng)
        }
        WeightInitialization::Xavier => {
            let scale = (6.0f32 / (fan_in + fan_out) as f32).sqrt();
            Array2::random_using(shape, Uniform::new(-scale, scale), rng)
        }
        WeightInitialization::Normal { mean, std } => {
            Array2::random_using(shape, normal(mean, std)?, rng)
        }
        WeightInitialization::Uniform { min, max } => {
            Array2::random_using(shape, Uniform::new(min, max), rng)
        }
    };

    Ok(weights)
}

fn normal(mean: f32, std: f32) -> GNNResult<Normal<f32>> {
    Normal::new(mean, std).map_err(|e| {
        GNNError::InvalidConfiguration(format!("Invalid normal distribution: {}", e))
    })
}

// === LINEAR ===

/// Fully connected layer on `(n, in_dim)` matrices
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    /// Transformation matrix [in_dim, out_dim]
    pub weight: Array2<f32>,

    /// Bias vector [out_dim]
    pub bias: Array1<f32>,
}

impl Linear {
    /// Create a layer with initialized weights and zero bias
    pub fn new<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        init: WeightInitialization,
        rng: &mut R,
    ) -> GNNResult<Self> {
        if in_dim == 0 || out_dim == 0 {
            return Err(GNNError::InvalidConfiguration(format!(
                "Layer dimensions must be positive: in_dim={}, out_dim={}",
                in_dim, out_dim
            )));
        }

        Ok(Self {
            weight: create_weight_matrix((in_dim, out_dim), init, rng)?,
            bias: Array1::zeros(out_dim),
        })
    }

    /// Build a layer from explicit parameters
    pub fn from_parts(weight: Array2<f32>, bias: Array1<f32>) -> GNNResult<Self> {
        if bias.len() != weight.ncols() {
            return Err(GNNError::mismatch("Bias length", weight.ncols(), bias.len()));
        }
        Ok(Self { weight, bias })
    }

    pub fn in_dim(&self) -> usize {
        self.weight.nrows()
    }

    pub fn out_dim(&self) -> usize {
        self.weight.ncols()
    }

    /// `input @ weight + bias`
    pub fn forward(&self, input: ArrayView2<f32>) -> GNNResult<Array2<f32>> {
        if input.ncols() != self.in_dim() {
            return Err(GNNError::DimensionMismatch(format!(
                "Input dimension {} doesn't match weight input dimension {}",
                input.ncols(),
                self.in_dim()
            )));
        }

        if self.bias.len() != self.out_dim() {
            return Err(GNNError::mismatch("Bias length", self.out_dim(), self.bias.len()));
        }

        Ok(input.dot(&self.weight) + &self.bias)
    }

    pub fn parameter_count(&self) -> usize {
        self.weight.len() + self.bias.len()
    }
}

// === GRAPH LINEAR ===

/// Linear layer applied independently to every atom of every molecule
#[derive(Debug, Clone, PartialEq)]
pub struct GraphLinear {
    pub linear: Linear,
}

impl GraphLinear {
    pub fn new<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        init: WeightInitialization,
        rng: &mut R,
    ) -> GNNResult<Self> {
        Ok(Self {
            linear: Linear::new(in_dim, out_dim, init, rng)?,
        })
    }

    pub fn from_linear(linear: Linear) -> Self {
        Self { linear }
    }

    pub fn in_dim(&self) -> usize {
        self.linear.in_dim()
    }

    pub fn out_dim(&self) -> usize {
        self.linear.out_dim()
    }

    /// `(mb, atom, in_dim) -> (mb, atom, out_dim)`
    pub fn forward(&self, input: ArrayView3<f32>) -> GNNResult<Array3<f32>> {
        let (mb, atom, _) = input.dim();
        let flat = flatten_atoms(input)?;
        let out = self.linear.forward(flat.view())?;
        unflatten_atoms(out.view(), mb, atom)
    }

    pub fn parameter_count(&self) -> usize {
        self.linear.parameter_count()
    }
}

// === ATOM EMBEDDING ===

/**
 * Embedding table mapping atom ids (atomic numbers) to hidden vectors.
 *
 * Rows are initialized from a standard normal distribution. Id 0 is an
 * ordinary row, which is what padded atoms in a minibatch look up.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedAtomID {
    /// Embedding table [n_atom_types, out_dim]
    pub table: Array2<f32>,
}

impl EmbedAtomID {
    pub fn new<R: Rng + ?Sized>(n_atom_types: usize, out_dim: usize, rng: &mut R) -> GNNResult<Self> {
        if n_atom_types == 0 || out_dim == 0 {
            return Err(GNNError::InvalidConfiguration(format!(
                "Embedding dimensions must be positive: n_atom_types={}, out_dim={}",
                n_atom_types, out_dim
            )));
        }
        Ok(Self {
            table: Array2::random_using((n_atom_types, out_dim), normal(0.0, 1.0)?, rng),
        })
    }

    pub fn from_table(table: Array2<f32>) -> Self {
        Self { table }
    }

    pub fn n_atom_types(&self) -> usize {
        self.table.nrows()
    }

    pub fn out_dim(&self) -> usize {
        self.table.ncols()
    }

    /// `(mb, atom)` ids `-> (mb, atom, out_dim)`
    pub fn forward(&self, ids: ArrayView2<usize>) -> GNNResult<Array3<f32>> {
        let (mb, atom) = ids.dim();
        let mut out = Array3::zeros((mb, atom, self.out_dim()));

        for ((m, i), &id) in ids.indexed_iter() {
            if id >= self.n_atom_types() {
                return Err(GNNError::InvalidInput(format!(
                    "Atom id {} at ({}, {}) out of range for {} atom types",
                    id,
                    m,
                    i,
                    self.n_atom_types()
                )));
            }
            out.index_axis_mut(Axis(0), m)
                .row_mut(i)
                .assign(&self.table.row(id));
        }

        Ok(out)
    }

    pub fn parameter_count(&self) -> usize {
        self.table.len()
    }
}
