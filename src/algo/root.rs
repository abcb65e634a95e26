//! Two-dimensional Newton-Raphson root finding.
//!
//! Used wherever intuitive user-facing parameters have to be inverted into
//! the internal parameters of a distribution. The solver is deliberately
//! plain: analytic Jacobians, a residual-norm stopping rule, and hard errors
//! on singular Jacobians or iteration exhaustion.

use nalgebra::{Matrix2, Vector2};
use thiserror::Error;

/// Threshold for considering a Jacobian determinant as zero
const DETERMINANT_EPSILON: f64 = 1e-12;

/// Errors from a two-dimensional Newton solve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("singular Jacobian: determinant={determinant:.6e}")]
    SingularJacobian {
        /// The determinant value (zero or near-zero)
        determinant: f64,
    },
    #[error("no convergence after {iterations} iterations (residual norm {residual:.6e})")]
    DidNotConverge {
        /// Iterations performed before giving up
        iterations: usize,
        /// Infinity norm of the residual at the last iterate
        residual: f64,
    },
}

/// Solve `f(p) = 0` for a two-component system by Newton-Raphson iteration.
///
/// `system` evaluates the residual vector and its Jacobian at a point.
/// Convergence is declared when the residual's infinity norm drops below
/// `tolerance`, so callers should scale their two equations to comparable
/// magnitudes (relative residuals work well).
///
/// # Arguments
/// * `system` - Residual and Jacobian evaluation at a point
/// * `seed` - Starting point for the iteration
/// * `tolerance` - Residual infinity-norm bound declaring convergence
/// * `max_iterations` - Iteration cap before giving up
///
/// # Returns
/// * `Ok(Vector2<f64>)` - A root within tolerance
/// * `Err(SolveError)` - If the Jacobian degenerates or iterations run out
pub fn newton_raphson_2d<F>(
    system: F,
    seed: Vector2<f64>,
    tolerance: f64,
    max_iterations: usize,
) -> Result<Vector2<f64>, SolveError>
where
    F: Fn(&Vector2<f64>) -> (Vector2<f64>, Matrix2<f64>),
{
    let mut p = seed;
    let mut residual_norm = f64::INFINITY;

    for _ in 0..max_iterations {
        let (residual, jacobian) = system(&p);
        residual_norm = residual.amax();
        if residual_norm < tolerance {
            return Ok(p);
        }

        let determinant = jacobian.determinant();
        if determinant.abs() < DETERMINANT_EPSILON {
            return Err(SolveError::SingularJacobian { determinant });
        }

        // Closed-form 2x2 inverse; the determinant guard above keeps it finite.
        let inverse = Matrix2::new(jacobian.m22, -jacobian.m12, -jacobian.m21, jacobian.m11)
            / determinant;
        p -= inverse * residual;
    }

    Err(SolveError::DidNotConverge {
        iterations: max_iterations,
        residual: residual_norm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Circle of radius sqrt(5) intersected with the line x - y = 1.
    fn circle_line(p: &Vector2<f64>) -> (Vector2<f64>, Matrix2<f64>) {
        let residual = Vector2::new(p.x * p.x + p.y * p.y - 5.0, p.x - p.y - 1.0);
        let jacobian = Matrix2::new(2.0 * p.x, 2.0 * p.y, 1.0, -1.0);
        (residual, jacobian)
    }

    #[test]
    fn test_converges_to_known_root() {
        let root = newton_raphson_2d(circle_line, Vector2::new(1.5, 0.5), 1e-12, 50).unwrap();

        assert_relative_eq!(root.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(root.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_linear_system_in_one_step() {
        let system = |p: &Vector2<f64>| {
            let residual = Vector2::new(2.0 * p.x + p.y - 4.0, p.x - p.y - 2.0);
            let jacobian = Matrix2::new(2.0, 1.0, 1.0, -1.0);
            (residual, jacobian)
        };

        let root = newton_raphson_2d(system, Vector2::new(100.0, -100.0), 1e-12, 3).unwrap();

        assert_relative_eq!(root.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(root.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_singular_jacobian_detected() {
        let system = |p: &Vector2<f64>| {
            let residual = Vector2::new(p.x + p.y - 1.0, p.x + p.y - 1.0);
            let jacobian = Matrix2::new(1.0, 1.0, 1.0, 1.0);
            (residual, jacobian)
        };

        let result = newton_raphson_2d(system, Vector2::new(0.0, 0.0), 1e-12, 10);

        assert!(matches!(result, Err(SolveError::SingularJacobian { .. })));
    }

    #[test]
    fn test_cycling_iteration_reports_no_convergence() {
        // Newton on x^3 - 2x + 2 from x = 0 cycles between 0 and 1 forever.
        let system = |p: &Vector2<f64>| {
            let residual = Vector2::new(p.x.powi(3) - 2.0 * p.x + 2.0, p.y);
            let jacobian = Matrix2::new(3.0 * p.x * p.x - 2.0, 0.0, 0.0, 1.0);
            (residual, jacobian)
        };

        let result = newton_raphson_2d(system, Vector2::new(0.0, 0.0), 1e-12, 40);

        match result {
            Err(SolveError::DidNotConverge { iterations, residual }) => {
                assert_eq!(iterations, 40);
                assert!(residual >= 1.0);
            }
            other => panic!("expected DidNotConverge, got {other:?}"),
        }
    }
}
