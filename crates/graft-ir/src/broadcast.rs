//! NumPy-style broadcasting for static and partially known shapes.

use crate::{Error, Result};

/// Compute NumPy-style broadcast output shape from two input shapes.
///
/// Implements NumPy broadcasting rules:
/// - Shapes are aligned from the rightmost dimension
/// - Dimensions match if they are equal or one of them is 1
/// - Missing dimensions in shorter shapes are treated as 1
///
/// # Example
///
/// ```text
/// broadcast_shape(&[2, 3, 4], &[3, 4])    -> [2, 3, 4]
/// broadcast_shape(&[2, 3, 4], &[2, 1, 4]) -> [2, 3, 4]
/// broadcast_shape(&[8, 1, 6, 1], &[7, 1, 5]) -> [8, 7, 6, 5]
/// ```
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    let a: Vec<_> = a.iter().map(|&d| Some(d)).collect();
    let b: Vec<_> = b.iter().map(|&d| Some(d)).collect();
    Ok(broadcast_dims(&a, &b)?.into_iter().flatten().collect())
}

/// Broadcast two partially known shapes (`None` marks a run-time dimension).
///
/// A run-time dimension against a fixed `d != 1` resolves to `d`; any valid
/// run-time value must equal it. Against `1` or another run-time dimension it
/// stays unknown.
pub fn broadcast_dims(a: &[Option<usize>], b: &[Option<usize>]) -> Result<Vec<Option<usize>>> {
    let max_rank = a.len().max(b.len());
    let mut result = Vec::with_capacity(max_rank);

    for i in 0..max_rank {
        let da = if i < max_rank - a.len() {
            Some(1)
        } else {
            a[i - (max_rank - a.len())]
        };
        let db = if i < max_rank - b.len() {
            Some(1)
        } else {
            b[i - (max_rank - b.len())]
        };

        let dim = match (da, db) {
            (Some(x), Some(y)) if x == y => Some(x),
            (Some(1), other) | (other, Some(1)) => other,
            (Some(x), Some(y)) => {
                return Err(Error::Shape(format!(
                    "Cannot broadcast shapes {:?} and {:?} at dimension {i} ({x} vs {y})",
                    a, b
                )));
            }
            (Some(x), None) | (None, Some(x)) => Some(x),
            (None, None) => None,
        };
        result.push(dim);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_same_shape() {
        assert_eq!(
            broadcast_shape(&[2, 3, 4], &[2, 3, 4]).unwrap(),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn test_broadcast_missing_dims() {
        assert_eq!(broadcast_shape(&[2, 3, 4], &[3, 4]).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_broadcast_ones() {
        assert_eq!(
            broadcast_shape(&[8, 1, 6, 1], &[7, 1, 5]).unwrap(),
            vec![8, 7, 6, 5]
        );
    }

    #[test]
    fn test_broadcast_incompatible() {
        assert!(broadcast_shape(&[2, 3], &[2, 4]).is_err());
    }

    #[test]
    fn test_broadcast_scalar() {
        assert_eq!(broadcast_shape(&[], &[3, 4]).unwrap(), vec![3, 4]);
        assert_eq!(broadcast_shape(&[5, 6], &[1]).unwrap(), vec![5, 6]);
    }

    #[test]
    fn test_broadcast_partial_dims() {
        assert_eq!(
            broadcast_dims(&[None, Some(3)], &[Some(4), Some(1)]).unwrap(),
            vec![Some(4), Some(3)]
        );
        assert_eq!(
            broadcast_dims(&[None], &[Some(1)]).unwrap(),
            vec![None]
        );
        assert!(broadcast_dims(&[None, Some(2)], &[Some(3)]).is_err());
    }
}
