//! Helpers around the `kryst` CSR matrix used for the pressure system.

use nalgebra::{DMatrix, DVector};

pub type CsrMatrix = kryst::matrix::sparse::CsrMatrix<f64>;

/// Build an `n x n` matrix from `(row, col, value)` entries. Repeated
/// positions are summed.
pub fn csr_from_triplets(n: usize, mut triplets: Vec<(usize, usize, f64)>) -> CsrMatrix {
    triplets.sort_unstable_by_key(|&(r, c, _)| (r, c));

    let mut indptr = Vec::with_capacity(n + 1);
    let mut indices: Vec<usize> = Vec::with_capacity(triplets.len());
    let mut data: Vec<f64> = Vec::with_capacity(triplets.len());
    indptr.push(0);

    let mut row = 0;
    for (r, c, v) in triplets {
        debug_assert!(r < n && c < n, "entry ({r}, {c}) outside {n}x{n}");
        while row < r {
            indptr.push(indices.len());
            row += 1;
        }
        if indices.len() > indptr[row] && indices.last() == Some(&c) {
            if let Some(last) = data.last_mut() {
                *last += v;
            }
        } else {
            indices.push(c);
            data.push(v);
        }
    }
    while row < n {
        indptr.push(indices.len());
        row += 1;
    }

    CsrMatrix::from_csr(n, n, indptr, indices, data)
}

pub fn nrows(a: &CsrMatrix) -> usize {
    a.row_ptr().len() - 1
}

pub fn nnz(a: &CsrMatrix) -> usize {
    a.values().len()
}

/// Entry `(i, j)`, zero when not stored.
pub fn entry(a: &CsrMatrix, i: usize, j: usize) -> f64 {
    let (start, end) = (a.row_ptr()[i], a.row_ptr()[i + 1]);
    (start..end)
        .find(|&k| a.col_idx()[k] == j)
        .map_or(0.0, |k| a.values()[k])
}

pub fn diagonal(a: &CsrMatrix) -> DVector<f64> {
    let n = nrows(a);
    DVector::from_iterator(n, (0..n).map(|i| entry(a, i, i)))
}

pub fn mul_vec(a: &CsrMatrix, x: &DVector<f64>) -> DVector<f64> {
    let n = nrows(a);
    let (row_ptr, col_idx, values) = (a.row_ptr(), a.col_idx(), a.values());
    DVector::from_iterator(
        n,
        (0..n).map(|i| {
            (row_ptr[i]..row_ptr[i + 1])
                .map(|k| values[k] * x[col_idx[k]])
                .sum::<f64>()
        }),
    )
}

/// Copy of `a` with row `i` divided by `scale[i]`.
pub fn row_scaled(a: &CsrMatrix, scale: &DVector<f64>) -> CsrMatrix {
    let n = nrows(a);
    let row_ptr = a.row_ptr().to_vec();
    let mut data = a.values().to_vec();
    for i in 0..n {
        for v in &mut data[row_ptr[i]..row_ptr[i + 1]] {
            *v /= scale[i];
        }
    }
    CsrMatrix::from_csr(n, n, row_ptr, a.col_idx().to_vec(), data)
}

pub fn to_dense(a: &CsrMatrix) -> DMatrix<f64> {
    let n = nrows(a);
    let mut m = DMatrix::zeros(n, n);
    for i in 0..n {
        for k in a.row_ptr()[i]..a.row_ptr()[i + 1] {
            m[(i, a.col_idx()[k])] = a.values()[k];
        }
    }
    m
}
