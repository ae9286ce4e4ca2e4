//! Orientation and in-sphere predicates over extended homogeneous points.
//!
//! Purpose
//! - `ccw` and `incircle` drive every decision the incremental engine
//!   makes: which half-space a query lies in, whether a facet is locally
//!   Delaunay, and the orientation sign stored on every half-facet.
//! - Both accept a `homogeneous` flag. In extended mode a trailing weight
//!   of 0 marks a point at infinity; the predicates handle those
//!   combinatorially instead of special-casing the hull boundary.
//!
//! Robustness
//! - Signs come from floating-point determinants through [`sign_det`],
//!   the single seam behind which an exact or adaptive implementation
//!   could be swapped without touching the engine. The zero band is a
//!   relative tolerance against the Hadamard bound of the matrix.
//!
//! Callers always pass an explicit sequence; results never depend on the
//! iteration order of a set-valued container.

use crate::error::{Error, Result};
use crate::point::{lift_vector, square_matrix, Matrix, Point, Vector};

/// Relative width of the zero band in [`sign_det`]. Scaled by the product
/// of column norms, which bounds |det| from above, so the band tracks the
/// magnitude of the input rather than a fixed absolute cutoff.
const SIGN_EPS: f64 = 1e-12;

/// Sign of the determinant in {-1, 0, +1}, with a relative zero band.
///
/// Panics if `m` is not square; the predicates assemble their matrices
/// through [`crate::point::square_matrix`].
pub fn sign_det(m: &Matrix) -> i8 {
    let det = m.determinant();
    let scale: f64 = m.column_iter().map(|c| c.norm()).product();
    let tol = SIGN_EPS * scale.max(1.0);
    if det > tol {
        1
    } else if det < -tol {
        -1
    } else {
        0
    }
}

/// Orientation of `points` (n+1 points for the n-dimensional test).
///
/// Returns +1 if counterclockwise (positively oriented), 0 if
/// co-hyperplanar, -1 if clockwise.
///
/// - `homogeneous = false`: each point is lifted by a trailing 1.
/// - `homogeneous = true` with at least one finite point (w = 1): the
///   extended coordinates form the matrix directly.
/// - every point at infinity: recurse one dimension higher with a finite
///   witness at (0, .., 0, -1), which orients the hyperplane at infinity.
pub fn ccw(points: &[Point], homogeneous: bool) -> Result<i8> {
    if points.is_empty() {
        return Err(Error::EmptyInput);
    }
    if !homogeneous {
        let cols: Vec<Vector> = points
            .iter()
            .map(|p| p.lift(|_| 1.0).to_vector())
            .collect();
        return Ok(sign_det(&square_matrix(&cols)?));
    }
    if points.iter().any(|p| p.weight() == 1.0) {
        let cols: Vec<Vector> = points.iter().map(|p| p.to_vector()).collect();
        return Ok(sign_det(&square_matrix(&cols)?));
    }
    let len = points[0].len();
    let mut witness = vec![0.0; len];
    witness[len - 1] = -1.0;
    let mut extended = points.to_vec();
    extended.push(Point::new(witness)?);
    ccw(&extended, false)
}

/// Position of the last point relative to the oriented sphere through the
/// first n+1 points: +1 inside, 0 on the sphere, -1 outside.
///
/// Each extended point is lifted by the squared norm of its affine part;
/// the layout differs from the classical in-sphere matrix by one row
/// swap, which the final negation compensates.
///
/// With k >= 1 points at infinity the sphere test is not well-defined, so
/// we evaluate once per infinite argument with that column replaced by
/// (0, .., 0, -1) (the -1 sits in the lifted slot and cancels the swap,
/// hence no outer negation) and combine the distinct outcomes. With two
/// infinite points in the plane this produces an X-shaped partition: two
/// opposing quadrants 0, one +1, one -1.
pub fn incircle(points: &[Point], homogeneous: bool) -> Result<i8> {
    if points.is_empty() {
        return Err(Error::EmptyInput);
    }
    let vectors: Vec<Vector> = if homogeneous {
        points.iter().map(|p| p.to_vector()).collect()
    } else {
        points
            .iter()
            .map(|p| p.lift(|_| 1.0).to_vector())
            .collect()
    };
    let lifted: Vec<Vector> = vectors
        .iter()
        .map(|v| lift_vector(v, |v| v.rows(0, v.len() - 1).norm_squared()))
        .collect();
    // After the lift the homogeneous weight sits second-to-last.
    let infinite: Vec<usize> = lifted
        .iter()
        .enumerate()
        .filter(|(_, v)| v[v.len() - 2] == 0.0)
        .map(|(i, _)| i)
        .collect();
    if infinite.is_empty() {
        return Ok(-sign_det(&square_matrix(&lifted)?));
    }
    let mut seen = [false; 3];
    for &i in &infinite {
        let mut replaced = lifted.clone();
        let mut repl = Vector::zeros(lifted.len());
        repl[lifted.len() - 1] = -1.0;
        replaced[i] = repl;
        let sign = sign_det(&square_matrix(&replaced)?);
        seen[(sign + 1) as usize] = true;
    }
    let mut total = 0i8;
    if seen[0] {
        total -= 1;
    }
    if seen[2] {
        total += 1;
    }
    Ok(total)
}
