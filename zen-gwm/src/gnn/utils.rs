/**
 * @file zen-gwm/src/gnn/utils.rs
 * @brief Tensor helpers for batched graph operations
 *
 * Batch-first 3-D tensors `(mb, atom, ch)` are flattened to `(mb * atom, ch)`
 * whenever a row-wise operation (linear layer, gate, GRU) applies, and restored
 * afterwards.
 *
 * @version 1.0.0-alpha.1
 */

use ndarray::{concatenate, Array2, Array3, ArrayView2, ArrayView3, Axis, Zip};
use num_traits::Float;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::errors::{GNNError, GNNResult};

/// Logistic sigmoid
#[inline]
pub fn sigmoid<T: Float>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

/// Rectified linear unit
#[inline]
pub fn relu<T: Float>(x: T) -> T {
    x.max(T::zero())
}

/// Collapse the batch and atom axes: `(mb, atom, ch) -> (mb * atom, ch)`
pub fn flatten_atoms(x: ArrayView3<f32>) -> GNNResult<Array2<f32>> {
    let (mb, atom, ch) = x.dim();
    Ok(Array2::from_shape_vec((mb * atom, ch), x.iter().copied().collect())?)
}

/// Restore the batch and atom axes: `(mb * atom, ch) -> (mb, atom, ch)`
pub fn unflatten_atoms(x: ArrayView2<f32>, mb: usize, atom: usize) -> GNNResult<Array3<f32>> {
    let (rows, ch) = x.dim();
    if rows != mb * atom {
        return Err(GNNError::mismatch("Flattened row count", mb * atom, rows));
    }
    Ok(Array3::from_shape_vec((mb, atom, ch), x.iter().copied().collect())?)
}

/// Per-molecule matrix product `out[m] = adj[m] @ h[m]`
pub fn batched_matmul(adj: ArrayView3<f32>, h: ArrayView3<f32>) -> GNNResult<Array3<f32>> {
    let (mb, rows, inner) = adj.dim();
    let (h_mb, h_rows, _) = h.dim();
    if mb != h_mb {
        return Err(GNNError::mismatch("Batch size", mb, h_mb));
    }
    if inner != h_rows {
        return Err(GNNError::mismatch("Adjacency inner dimension", h_rows, inner));
    }
    if rows != h_rows {
        return Err(GNNError::mismatch("Adjacency row count", h_rows, rows));
    }

    #[cfg(feature = "parallel")]
    {
        batched_matmul_parallel(adj, h)
    }

    #[cfg(not(feature = "parallel"))]
    {
        Ok(batched_matmul_serial(adj, h))
    }
}

#[cfg_attr(feature = "parallel", allow(dead_code))]
fn batched_matmul_serial(adj: ArrayView3<f32>, h: ArrayView3<f32>) -> Array3<f32> {
    let (mb, rows, _) = adj.dim();
    let mut out = Array3::zeros((mb, rows, h.dim().2));
    for m in 0..mb {
        let product = adj.index_axis(Axis(0), m).dot(&h.index_axis(Axis(0), m));
        out.index_axis_mut(Axis(0), m).assign(&product);
    }
    out
}

/// One molecule per rayon task
#[cfg(feature = "parallel")]
fn batched_matmul_parallel(adj: ArrayView3<f32>, h: ArrayView3<f32>) -> GNNResult<Array3<f32>> {
    let (mb, rows, _) = adj.dim();
    let products: Vec<Array2<f32>> = (0..mb)
        .into_par_iter()
        .map(|m| adj.index_axis(Axis(0), m).dot(&h.index_axis(Axis(0), m)))
        .collect();
    let views: Vec<ArrayView2<f32>> = products.iter().map(|p| p.view()).collect();
    if views.is_empty() {
        return Ok(Array3::zeros((0, rows, h.dim().2)));
    }
    Ok(ndarray::stack(Axis(0), &views)?)
}

/// Concatenate two `(mb, atom, _)` tensors along the channel axis
pub fn concat_channels(a: ArrayView3<f32>, b: ArrayView3<f32>) -> GNNResult<Array3<f32>> {
    if a.dim().0 != b.dim().0 || a.dim().1 != b.dim().1 {
        return Err(GNNError::DimensionMismatch(format!(
            "Cannot concatenate channels of {:?} and {:?}",
            a.dim(),
            b.dim()
        )));
    }
    Ok(concatenate(Axis(2), &[a.view(), b.view()])?)
}

/// Concatenate two `(n, _)` matrices along the column axis
pub fn concat_columns(a: ArrayView2<f32>, b: ArrayView2<f32>) -> GNNResult<Array2<f32>> {
    if a.nrows() != b.nrows() {
        return Err(GNNError::mismatch("Row count", a.nrows(), b.nrows()));
    }
    Ok(concatenate(Axis(1), &[a.view(), b.view()])?)
}

/// Repeat a `(mb, ch)` matrix over `atom` positions: `(mb, atom, ch)`
pub fn broadcast_atoms(x: ArrayView2<f32>, atom: usize) -> GNNResult<Array3<f32>> {
    let (mb, ch) = x.dim();
    x.insert_axis(Axis(1))
        .broadcast((mb, atom, ch))
        .map(|view| view.to_owned())
        .ok_or_else(|| {
            GNNError::DimensionMismatch(format!(
                "Cannot broadcast {:?} over {} atoms",
                (mb, ch),
                atom
            ))
        })
}

/// Numerically stable softmax along the last axis, in place
pub fn softmax_last_axis(x: &mut Array3<f32>) {
    for mut lane in x.lanes_mut(Axis(2)) {
        let max = lane.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        lane.mapv_inplace(|v| (v - max).exp());
        let sum = lane.sum();
        if sum > 0.0 {
            lane.mapv_inplace(|v| v / sum);
        }
    }
}

/// Element-wise interpolation `(1 - z) * x + z * y`
pub fn lerp_gate(z: ArrayView2<f32>, x: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
    let mut out = Array2::zeros(x.raw_dim());
    Zip::from(&mut out)
        .and(&z)
        .and(&x)
        .and(&y)
        .for_each(|o, &z, &a, &b| *o = (1.0 - z) * a + z * b);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array3};

    #[test]
    fn test_flatten_roundtrip_preserves_order() {
        let x = Array3::from_shape_fn((2, 3, 4), |(m, i, c)| (m * 100 + i * 10 + c) as f32);
        let flat = flatten_atoms(x.view()).unwrap();
        assert_eq!(flat.dim(), (6, 4));
        assert_eq!(flat[[4, 2]], 112.0);
        let back = unflatten_atoms(flat.view(), 2, 3).unwrap();
        assert_eq!(back, x);
    }

    #[test]
    fn test_unflatten_rejects_wrong_rows() {
        let flat = Array2::<f32>::zeros((5, 2));
        assert!(unflatten_atoms(flat.view(), 2, 3).is_err());
    }

    #[test]
    fn test_batched_matmul_sums_neighbors() {
        // Path graph 0-1-2 in the first molecule, no edges in the second
        let mut adj = Array3::<f32>::zeros((2, 3, 3));
        adj[[0, 0, 1]] = 1.0;
        adj[[0, 1, 0]] = 1.0;
        adj[[0, 1, 2]] = 1.0;
        adj[[0, 2, 1]] = 1.0;
        let h = Array3::from_shape_fn((2, 3, 1), |(_, i, _)| (i + 1) as f32);

        let out = batched_matmul(adj.view(), h.view()).unwrap();
        assert_eq!(out[[0, 0, 0]], 2.0);
        assert_eq!(out[[0, 1, 0]], 4.0);
        assert_eq!(out[[0, 2, 0]], 2.0);
        assert!(out.index_axis(Axis(0), 1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_batched_matmul_rejects_batch_mismatch() {
        let adj = Array3::<f32>::zeros((2, 3, 3));
        let h = Array3::<f32>::zeros((1, 3, 4));
        assert!(matches!(
            batched_matmul(adj.view(), h.view()),
            Err(GNNError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_batched_matmul_rejects_non_square_adjacency() {
        // Two rows against three atoms
        let adj = Array3::<f32>::zeros((1, 2, 3));
        let h = Array3::<f32>::zeros((1, 3, 4));
        assert!(matches!(
            batched_matmul(adj.view(), h.view()),
            Err(GNNError::DimensionMismatch(_))
        ));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matmul_matches_serial() {
        let adj = Array3::from_shape_fn((5, 4, 4), |(m, i, j)| ((m + i * j) % 3) as f32 * 0.5);
        let h = Array3::from_shape_fn((5, 4, 3), |(m, i, c)| (m * 7 + i * 3 + c) as f32 * 0.1);
        let serial = batched_matmul_serial(adj.view(), h.view());
        let parallel = batched_matmul_parallel(adj.view(), h.view()).unwrap();
        assert_eq!(serial, parallel);
        assert_eq!(batched_matmul(adj.view(), h.view()).unwrap(), serial);
    }

    #[test]
    fn test_concat_helpers() {
        let a = Array3::from_elem((2, 3, 1), 1.0f32);
        let b = Array3::from_elem((2, 3, 2), 2.0f32);
        let joined = concat_channels(a.view(), b.view()).unwrap();
        assert_eq!(joined.dim(), (2, 3, 3));
        assert_eq!(joined[[1, 2, 0]], 1.0);
        assert_eq!(joined[[1, 2, 2]], 2.0);

        let x = array![[1.0f32], [2.0]];
        let y = array![[3.0f32, 4.0], [5.0, 6.0]];
        assert_eq!(
            concat_columns(x.view(), y.view()).unwrap(),
            array![[1.0f32, 3.0, 4.0], [2.0, 5.0, 6.0]]
        );
        assert!(concat_columns(x.view(), y.slice(ndarray::s![..1, ..])).is_err());
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let mut x = Array3::from_shape_fn((2, 2, 5), |(m, k, i)| (m + k * i) as f32 * 0.7);
        softmax_last_axis(&mut x);
        for lane in x.lanes(Axis(2)) {
            assert_relative_eq!(lane.sum(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_softmax_handles_large_logits() {
        let mut x = Array3::from_shape_vec((1, 1, 2), vec![1000.0, 1000.0]).unwrap();
        softmax_last_axis(&mut x);
        assert_relative_eq!(x[[0, 0, 0]], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_broadcast_atoms() {
        let g = array![[1.0f32, 2.0], [3.0, 4.0]];
        let out = broadcast_atoms(g.view(), 3).unwrap();
        assert_eq!(out.dim(), (2, 3, 2));
        assert_eq!(out[[1, 2, 0]], 3.0);
    }

    #[test]
    fn test_lerp_gate_endpoints() {
        let x = array![[1.0f32, 1.0]];
        let y = array![[3.0f32, 3.0]];
        let z = array![[0.0f32, 1.0]];
        let out = lerp_gate(z.view(), x.view(), y.view());
        assert_eq!(out, array![[1.0f32, 3.0]]);
    }

    #[test]
    fn test_scalar_activations() {
        assert_relative_eq!(sigmoid(0.0f32), 0.5);
        assert_eq!(relu(-2.0f32), 0.0);
        assert_eq!(relu(1.5f32), 1.5);
    }
}
