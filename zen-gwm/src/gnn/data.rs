/**
 * @file zen-gwm/src/gnn/data.rs
 * @brief Molecular minibatch structures
 *
 * A `MolecularBatch` bundles the three inputs of a forward pass:
 *
 * - **atoms**: integer atom ids `(mb, atom)` to be embedded, or precomputed
 *   per-atom feature vectors `(mb, atom, hidden_dim)` used as-is
 * - **adjacency**: dense `(mb, atom, atom)` matrices, or multi-relational
 *   `(mb, n_edge_types, atom, atom)` tensors that are summed over relations
 * - **super_node**: the observation vector of each molecule's super-node
 *   `(mb, n_super_feature)`
 *
 * Construction checks the shape contracts that do not depend on the model;
 * `validate_against` checks the ones that do.
 *
 * @version 1.0.0-alpha.1
 */

use ndarray::{Array2, Array3, Array4, Axis};

use super::GinGwmConfig;
use crate::errors::{GNNError, GNNResult};

/// Per-atom input of a minibatch
#[derive(Debug, Clone, PartialEq)]
pub enum AtomInput {
    /// Atom ids (atomic numbers), embedded by the model [mb, atom]
    Ids(Array2<usize>),
    /// Precomputed local states [mb, atom, hidden_dim]
    Features(Array3<f32>),
}

impl AtomInput {
    pub fn batch_size(&self) -> usize {
        match self {
            AtomInput::Ids(ids) => ids.nrows(),
            AtomInput::Features(features) => features.dim().0,
        }
    }

    pub fn num_atoms(&self) -> usize {
        match self {
            AtomInput::Ids(ids) => ids.ncols(),
            AtomInput::Features(features) => features.dim().1,
        }
    }
}

/// Bond structure of a minibatch
#[derive(Debug, Clone, PartialEq)]
pub enum Adjacency {
    /// One weighted adjacency per molecule [mb, atom, atom]
    Dense(Array3<f32>),
    /// One adjacency per bond type [mb, n_edge_types, atom, atom]
    MultiRelational(Array4<f32>),
}

impl Adjacency {
    pub fn batch_size(&self) -> usize {
        match self {
            Adjacency::Dense(adj) => adj.dim().0,
            Adjacency::MultiRelational(adj) => adj.dim().0,
        }
    }

    /// Number of atoms, taken from the row axis
    pub fn num_atoms(&self) -> usize {
        match self {
            Adjacency::Dense(adj) => adj.dim().1,
            Adjacency::MultiRelational(adj) => adj.dim().2,
        }
    }

    /// Number of relation types (1 for the dense form)
    pub fn num_relations(&self) -> usize {
        match self {
            Adjacency::Dense(_) => 1,
            Adjacency::MultiRelational(adj) => adj.dim().1,
        }
    }

    fn is_square(&self) -> bool {
        match self {
            Adjacency::Dense(adj) => adj.dim().1 == adj.dim().2,
            Adjacency::MultiRelational(adj) => adj.dim().2 == adj.dim().3,
        }
    }

    /// Collapse to `(mb, atom, atom)`; GIN sums neighbors regardless of bond type
    pub fn to_dense(&self) -> Array3<f32> {
        match self {
            Adjacency::Dense(adj) => adj.clone(),
            Adjacency::MultiRelational(adj) => adj.sum_axis(Axis(1)),
        }
    }
}

/// Inputs of one forward pass
#[derive(Debug, Clone, PartialEq)]
pub struct MolecularBatch {
    pub atoms: AtomInput,
    pub adjacency: Adjacency,
    /// Super-node observations [mb, n_super_feature]
    pub super_node: Array2<f32>,
}

impl MolecularBatch {
    /**
     * Create a batch, checking that batch sizes and atom counts agree.
     *
     * @return `InvalidInput` for empty batches or molecules without atoms,
     *         `DimensionMismatch` for inconsistent shapes
     */
    pub fn new(atoms: AtomInput, adjacency: Adjacency, super_node: Array2<f32>) -> GNNResult<Self> {
        Self::check_structure(&atoms, &adjacency, &super_node)?;
        Ok(Self {
            atoms,
            adjacency,
            super_node,
        })
    }

    /// Model-independent contracts: non-empty, consistent batch and atom counts, square adjacency
    fn check_structure(
        atoms: &AtomInput,
        adjacency: &Adjacency,
        super_node: &Array2<f32>,
    ) -> GNNResult<()> {
        let mb = atoms.batch_size();
        let atom = atoms.num_atoms();

        if mb == 0 {
            return Err(GNNError::InvalidInput(
                "Minibatch must contain at least one molecule".to_string(),
            ));
        }
        if atom == 0 {
            return Err(GNNError::InvalidInput(
                "Molecules must contain at least one atom".to_string(),
            ));
        }
        if adjacency.batch_size() != mb {
            return Err(GNNError::mismatch("Adjacency batch size", mb, adjacency.batch_size()));
        }
        if super_node.nrows() != mb {
            return Err(GNNError::mismatch("Super-node batch size", mb, super_node.nrows()));
        }
        if !adjacency.is_square() {
            return Err(GNNError::DimensionMismatch(
                "Adjacency matrices must be square over atoms".to_string(),
            ));
        }
        if adjacency.num_atoms() != atom {
            return Err(GNNError::mismatch("Adjacency atom count", atom, adjacency.num_atoms()));
        }

        Ok(())
    }

    /// Shorthand for the common id + dense adjacency case
    pub fn from_ids(ids: Array2<usize>, adjacency: Array3<f32>, super_node: Array2<f32>) -> GNNResult<Self> {
        Self::new(AtomInput::Ids(ids), Adjacency::Dense(adjacency), super_node)
    }

    pub fn batch_size(&self) -> usize {
        self.atoms.batch_size()
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.num_atoms()
    }

    /// Check the construction contracts again, then id range, feature widths and relation count
    pub fn validate_against(&self, config: &GinGwmConfig) -> GNNResult<()> {
        // Batches can also be assembled directly from the public fields
        Self::check_structure(&self.atoms, &self.adjacency, &self.super_node)?;

        match &self.atoms {
            AtomInput::Ids(ids) => {
                if let Some(&max_id) = ids.iter().max() {
                    if max_id >= config.n_atom_types {
                        return Err(GNNError::InvalidInput(format!(
                            "Atom id {} out of range for {} atom types",
                            max_id, config.n_atom_types
                        )));
                    }
                }
            }
            AtomInput::Features(features) => {
                if features.dim().2 != config.hidden_dim {
                    return Err(GNNError::mismatch(
                        "Atom feature width",
                        config.hidden_dim,
                        features.dim().2,
                    ));
                }
            }
        }

        if let Adjacency::MultiRelational(_) = self.adjacency {
            if self.adjacency.num_relations() != config.n_edge_types {
                return Err(GNNError::mismatch(
                    "Relation count",
                    config.n_edge_types,
                    self.adjacency.num_relations(),
                ));
            }
        }

        if self.super_node.ncols() != config.n_super_feature {
            return Err(GNNError::mismatch(
                "Super-node feature width",
                config.n_super_feature,
                self.super_node.ncols(),
            ));
        }

        Ok(())
    }
}
