use nalgebra::{Matrix3, Vector3};

use crate::MagmomError;

/// Orthogonal Procrustes problem: the `R` in O(3) minimizing
/// `sum_i |R a_i - b_i|^2`.
///
/// With `B^T A = U S V^T` the minimizer is `R = U V^T`.
pub fn solve_procrustes(a: &[Vector3<f64>], b: &[Vector3<f64>]) -> Result<Matrix3<f64>, MagmomError> {
    assert_eq!(a.len(), b.len());

    let bta = a
        .iter()
        .zip(b.iter())
        .fold(Matrix3::zeros(), |acc, (ai, bi)| acc + bi * ai.transpose());

    let svd = bta
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or(MagmomError::SvdFailed)?;

    let u = svd.u.ok_or(MagmomError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(MagmomError::SvdFailed)?;

    Ok(u * v_t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_procrustes() {
        let a = vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let r = Matrix3::new(
            -0.03831202, 0.99710779, 0.06563723,
            0.28470653, -0.05207084, 0.95719947,
            0.95784883, 0.05535959, -0.28188816,
        );
        let b: Vec<Vector3<f64>> = a.iter().map(|ai| r * ai).collect();

        let r_actual = solve_procrustes(&a, &b).unwrap();

        assert_relative_eq!(r_actual, r, epsilon = 1.0e-6);
    }

    #[test]
    fn test_procrustes_result_is_orthogonal() {
        let a = vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, -1.0)];
        let b = vec![Vector3::new(0.0, 0.0, -1.0), Vector3::new(0.0, 0.0, 1.0)];

        let r = solve_procrustes(&a, &b).unwrap();

        assert_relative_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1.0e-10);
        assert_relative_eq!(r * a[0], b[0], epsilon = 1.0e-10);
    }
}
