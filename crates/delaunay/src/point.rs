//! Points in extended homogeneous coordinates, plus the vector/matrix layer.
//!
//! Purpose
//! - An n-dimensional affine point is stored with a trailing homogeneous
//!   weight w: w = 1 is a finite position, w = 0 a direction ("point at
//!   infinity"). The convention lets the unbounded exterior of a
//!   triangulation be made of ordinary faces.
//! - Heavy lifting (determinants, inverses, solves) stays in nalgebra;
//!   this module only adds the domain conventions on top: lifting, the
//!   weight slot, and a total order usable for canonical face listings.
//!
//! The order is lexicographic via `f64::total_cmp`, and `Eq`/`Hash` agree
//! with it bit-for-bit, so points can key sets and maps.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// Free vector in R^n.
pub type Vector = DVector<f64>;
/// Dense column matrix.
pub type Matrix = DMatrix<f64>;

/// A point with at least one coordinate. The trailing coordinate is, by
/// convention, the homogeneous weight whenever the context is "extended".
#[derive(Clone, Debug)]
pub struct Point {
    coords: DVector<f64>,
}

/// Flush negative zeros so the bit-based order and equality agree with
/// numeric equality (an LU solve happily produces -0.0 coordinates).
fn canonical(mut coords: DVector<f64>) -> DVector<f64> {
    for c in coords.iter_mut() {
        if *c == 0.0 {
            *c = 0.0;
        }
    }
    coords
}

impl Point {
    /// Construct from owned coordinates. Zero-length input is rejected.
    pub fn new(coords: Vec<f64>) -> Result<Self> {
        if coords.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(Self {
            coords: canonical(DVector::from_vec(coords)),
        })
    }

    pub fn from_slice(coords: &[f64]) -> Result<Self> {
        Self::new(coords.to_vec())
    }

    /// Number of stored coordinates (affine + weight in extended form).
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        false // by construction
    }

    /// The trailing coordinate, i.e. the homogeneous weight in extended form.
    pub fn weight(&self) -> f64 {
        self.coords[self.coords.len() - 1]
    }

    /// True iff the extended point is a direction (w = 0).
    pub fn is_infinite(&self) -> bool {
        self.weight() == 0.0
    }

    /// Checked coordinate access.
    pub fn try_coord(&self, index: usize) -> Result<f64> {
        if index < self.coords.len() {
            Ok(self.coords[index])
        } else {
            Err(Error::OutOfBounds {
                index,
                len: self.coords.len(),
            })
        }
    }

    pub fn coords(&self) -> &DVector<f64> {
        &self.coords
    }

    /// Append `f(self)` as a new trailing coordinate.
    pub fn lift<F: FnOnce(&Point) -> f64>(&self, f: F) -> Point {
        Point {
            coords: canonical(self.coords.push(f(self))),
        }
    }

    /// The point as a vector from the origin.
    pub fn to_vector(&self) -> Vector {
        self.coords.clone()
    }

    /// Componentwise difference; both points must have equal length.
    pub fn sub(&self, other: &Point) -> Result<Vector> {
        if self.len() != other.len() {
            return Err(Error::DimensionMismatch {
                expected: self.len(),
                got: other.len(),
            });
        }
        Ok(&self.coords - &other.coords)
    }

    /// The affine part: every coordinate but the trailing weight.
    pub fn affine_part(&self) -> Result<Point> {
        if self.len() < 2 {
            return Err(Error::EmptyInput);
        }
        Point::new(self.coords.as_slice()[..self.len() - 1].to_vec())
    }
}

impl Index<usize> for Point {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.coords[index]
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Point {}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    /// Lexicographic on coordinates (`total_cmp`), then on length.
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.coords.iter().zip(other.coords.iter()) {
            match a.total_cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.coords.len().cmp(&other.coords.len())
    }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Bit-based, consistent with total_cmp equality.
        for c in self.coords.iter() {
            state.write_u64(c.to_bits());
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

/// Append `f(v)` as a new trailing component of a vector.
pub fn lift_vector<F: FnOnce(&Vector) -> f64>(v: &Vector, f: F) -> Vector {
    v.push(f(v))
}

/// Assemble equal-length column vectors into a matrix.
pub fn column_matrix(columns: &[Vector]) -> Result<Matrix> {
    let first = columns.first().ok_or(Error::EmptyInput)?;
    for col in columns {
        if col.len() != first.len() {
            return Err(Error::DimensionMismatch {
                expected: first.len(),
                got: col.len(),
            });
        }
    }
    Ok(Matrix::from_columns(columns))
}

/// Like [`column_matrix`], but additionally requires the result square
/// (the shape every sign-of-determinant predicate needs).
pub fn square_matrix(columns: &[Vector]) -> Result<Matrix> {
    let m = column_matrix(columns)?;
    if m.nrows() != m.ncols() {
        return Err(Error::DimensionMismatch {
            expected: m.nrows(),
            got: m.ncols(),
        });
    }
    Ok(m)
}
