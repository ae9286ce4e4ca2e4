//! Voronoi dual of a completed Delaunay triangulation.
//!
//! One Voronoi vertex per finite Delaunay face (its circumcenter), one
//! edge per facet between two finite faces, and one ray per facet whose
//! neighbor is infinite. Rays are encoded with an endpoint of weight 0
//! holding the outward normal direction; a renderer scales the direction
//! by a large constant.
//!
//! The builder takes a read-only borrow of the triangulation and produces
//! independent points and edges.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::point::{Matrix, Point, Vector};
use crate::triangulation::{DelaunayTriangulation, FaceId, HalfFacet};

/// Circumcenter of d+1 affine points in R^d.
///
/// Solves `A x = b` with rows `v_i - v_0` and
/// `b_i = (|v_i|^2 - |v_0|^2) / 2`; the solution is equidistant from all
/// inputs. Affinely dependent inputs make `A` singular and fail with
/// [`Error::SingularMatrix`].
pub fn circumcenter(points: &[Point]) -> Result<Point> {
    let first = points.first().ok_or(Error::EmptyInput)?;
    let d = first.len();
    if points.len() != d + 1 {
        return Err(Error::DimensionMismatch {
            expected: d + 1,
            got: points.len(),
        });
    }
    let mut a = Matrix::zeros(d, d);
    let mut b = Vector::zeros(d);
    let n0 = first.to_vector().norm_squared();
    for (i, p) in points.iter().skip(1).enumerate() {
        let row = p.sub(first)?;
        for j in 0..d {
            a[(i, j)] = row[j];
        }
        b[i] = 0.5 * (p.to_vector().norm_squared() - n0);
    }
    let x = a.lu().solve(&b).ok_or(Error::SingularMatrix)?;
    Point::new(x.iter().copied().collect())
}

/// The Voronoi diagram dual to a Delaunay triangulation.
#[derive(Clone, Debug)]
pub struct Voronoi {
    /// One point per finite Delaunay face: its circumcenter with weight 1,
    /// or a weight-0 direction when the circumcenter escaped to infinity.
    pub points: Vec<Point>,
    /// Segments between duals of adjacent finite faces, plus rays (second
    /// endpoint of weight 0) where the neighbor is infinite.
    pub edges: Vec<(Point, Point)>,
}

impl Voronoi {
    pub fn new(dt: &DelaunayTriangulation) -> Result<Voronoi> {
        let d = dt.dimension();
        let mut centers: BTreeMap<FaceId, Point> = BTreeMap::new();
        for (id, face) in dt.live_faces() {
            if face
                .vertices
                .iter()
                .any(|v| dt.vertex_point(*v).is_infinite())
            {
                continue;
            }
            let affine: Vec<Point> = face
                .vertices
                .iter()
                .map(|v| dt.vertex_point(*v).affine_part())
                .collect::<Result<_>>()?;
            let center = match circumcenter(&affine) {
                Ok(c) => c.lift(|_| 1.0),
                Err(Error::SingularMatrix) => {
                    // An affinely dependent face slipped through: degrade to
                    // a direction-only dual instead of failing the build.
                    debug!(face = id.0, "singular circumcenter, emitting direction");
                    let rows: Vec<Vector> = affine[1..d]
                        .iter()
                        .map(|p| p.sub(&affine[0]))
                        .collect::<Result<_>>()?;
                    let n = cross_normal(&rows, d)?;
                    let mut coords: Vec<f64> = n.iter().copied().collect();
                    coords.push(0.0);
                    Point::new(coords)?
                }
                Err(e) => return Err(e),
            };
            centers.insert(id, center);
        }

        let mut edges = Vec::new();
        for (id, face) in dt.live_faces() {
            if !centers.contains_key(&id) {
                continue;
            }
            for hf in face.iter_facets() {
                match hf.twin {
                    Some(t) if centers.contains_key(&t.face) => {
                        // Interior facet between two finite faces: emit once.
                        if id < t.face {
                            edges.push((centers[&id].clone(), centers[&t.face].clone()));
                        }
                    }
                    _ => {
                        let ray = ray_to_infinity(dt, hf)?;
                        edges.push((centers[&id].clone(), ray));
                    }
                }
            }
        }
        debug!(points = centers.len(), edges = edges.len(), "voronoi built");
        Ok(Voronoi {
            points: centers.into_values().collect(),
            edges,
        })
    }
}

/// Endpoint at infinity for the ray dual to a hull facet: the normal of
/// the facet's supporting hyperplane, oriented away from the finite
/// face's opposite vertex, with weight 0 appended.
fn ray_to_infinity(dt: &DelaunayTriangulation, facet: &HalfFacet) -> Result<Point> {
    let d = dt.dimension();
    let pts: Vec<Point> = facet
        .vertices
        .iter()
        .map(|v| dt.vertex_point(*v).affine_part())
        .collect::<Result<_>>()?;
    let rows: Vec<Vector> = pts[1..]
        .iter()
        .map(|p| p.sub(&pts[0]))
        .collect::<Result<_>>()?;
    let mut n = cross_normal(&rows, d)?;
    let opp = dt.vertex_point(facet.opposite).affine_part()?;
    if n.dot(&opp.sub(&pts[0])?) > 0.0 {
        n = -n;
    }
    let mut coords: Vec<f64> = n.iter().copied().collect();
    coords.push(0.0);
    Point::new(coords)
}

/// Generalized cross product: a vector of R^d orthogonal to the given
/// d-1 rows, by cofactor expansion (alternating minors of the row
/// matrix with one column removed at a time).
fn cross_normal(rows: &[Vector], d: usize) -> Result<Vector> {
    if rows.len() + 1 != d {
        return Err(Error::DimensionMismatch {
            expected: d - 1,
            got: rows.len(),
        });
    }
    let mut n = Vector::zeros(d);
    for j in 0..d {
        let mut minor = Matrix::zeros(d - 1, d - 1);
        for (r, row) in rows.iter().enumerate() {
            let mut col = 0;
            for c in 0..d {
                if c == j {
                    continue;
                }
                minor[(r, col)] = row[c];
                col += 1;
            }
        }
        let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
        n[j] = sign * minor.determinant();
    }
    Ok(n)
}
