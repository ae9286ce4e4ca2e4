//! Data types for the simplicial complex: vertices, faces, half-facets.
//!
//! Kept small and explicit so the engine in `mod.rs` stays readable.
//!
//! The face/twin graph is cyclic, so faces live in an arena indexed by
//! [`FaceId`] and a twin pointer is an (arena index, slot) pair rather
//! than a reference. Half-facets live inline in their owning face; they
//! exist exactly as long as it does.

use std::fmt;

use crate::error::{Error, Result};
use crate::point::Point;
use crate::predicates::ccw;

/// Identifier types for clarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub usize);

/// Arena address of a half-facet: the owning face and the slot inside it.
///
/// Two half-facets with identical vertex sets are still distinct (the two
/// sides of one facet); identity is this address, never the vertex set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HalfFacetRef {
    pub face: FaceId,
    pub slot: usize,
}

/// A vertex owns its point. The point is never reassigned: ordering and
/// hashing derive from it.
#[derive(Clone, Debug)]
pub struct Vertex {
    pub point: Point,
}

/// A directed (d-1)-face inside a specific d-simplex.
///
/// `side` records which half-space of the facet contains `opposite`: it is
/// the sign of `ccw(facet points, opposite point)` and is never 0 (a zero
/// is a co-hyperplanar degeneracy and fails construction). `twin` is the
/// paired half-facet in the adjacent face, or None on the boundary of the
/// complex.
#[derive(Clone, Debug)]
pub struct HalfFacet {
    pub opposite: VertexId,
    pub vertices: Vec<VertexId>,
    pub side: i8,
    pub twin: Option<HalfFacetRef>,
}

/// A d-simplex: d+1 vertices, stored sorted by id, and one half-facet per
/// vertex in the parallel slot (`half_facets[k].opposite == vertices[k]`).
#[derive(Clone, Debug)]
pub struct Face {
    pub vertices: Vec<VertexId>,
    pub half_facets: Vec<HalfFacet>,
}

impl Face {
    /// Build a face over `vertices`, computing every half-facet fresh.
    pub(crate) fn new(vertices: Vec<VertexId>, verts: &[Vertex]) -> Result<Face> {
        Face::build(vertices, verts, None)
    }

    /// Build a face that adopts `reused` as the half-facet opposite
    /// `reused_for`, keeping its orientation sign and twin link intact.
    /// Used when a cavity-boundary facet becomes part of the new star.
    pub(crate) fn with_reused(
        vertices: Vec<VertexId>,
        verts: &[Vertex],
        reused_for: VertexId,
        reused: HalfFacet,
    ) -> Result<Face> {
        Face::build(vertices, verts, Some((reused_for, reused)))
    }

    fn build(
        mut vertices: Vec<VertexId>,
        verts: &[Vertex],
        mut reused: Option<(VertexId, HalfFacet)>,
    ) -> Result<Face> {
        vertices.sort_unstable();
        let reused_for = reused.as_ref().map(|(v, _)| *v);
        let mut half_facets = Vec::with_capacity(vertices.len());
        for (k, &v) in vertices.iter().enumerate() {
            if reused_for == Some(v) {
                let (_, facet) = reused.take().expect("reused facet is taken once");
                half_facets.push(HalfFacet {
                    opposite: v,
                    vertices: facet.vertices,
                    side: facet.side,
                    twin: facet.twin,
                });
                continue;
            }
            let others: Vec<VertexId> = vertices
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != k)
                .map(|(_, &u)| u)
                .collect();
            half_facets.push(fresh_facet(v, others, verts)?);
        }
        Ok(Face {
            vertices,
            half_facets,
        })
    }

    /// The points of this face, in vertex-id order.
    pub fn points(&self, verts: &[Vertex]) -> Vec<Point> {
        self.vertices.iter().map(|v| verts[v.0].point.clone()).collect()
    }

    /// Iterate the half-facets in stable slot order.
    pub fn iter_facets(&self) -> impl Iterator<Item = &HalfFacet> {
        self.half_facets.iter()
    }

    pub(crate) fn slot_of(&self, vertex: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }
}

fn fresh_facet(opposite: VertexId, facet_vertices: Vec<VertexId>, verts: &[Vertex]) -> Result<HalfFacet> {
    let mut pts: Vec<Point> = facet_vertices
        .iter()
        .map(|v| verts[v.0].point.clone())
        .collect();
    pts.push(verts[opposite.0].point.clone());
    let side = ccw(&pts, true)?;
    if side == 0 {
        return Err(Error::GeneralPosition);
    }
    Ok(HalfFacet {
        opposite,
        vertices: facet_vertices,
        side,
        twin: None,
    })
}

/// Construction options for [`super::DelaunayTriangulation`].
#[derive(Clone, Debug)]
pub struct DtCfg {
    /// Shuffle the input before insertion (expected O(n log n) in 2D).
    pub randomize: bool,
    /// Inputs already carry a trailing homogeneous weight.
    pub homogeneous: bool,
    /// Label carried into log lines, for telling runs apart.
    pub name: String,
}

impl Default for DtCfg {
    fn default() -> Self {
        Self {
            randomize: true,
            homogeneous: true,
            name: "anon".to_string(),
        }
    }
}

/// Optional visualization hooks, invoked synchronously at fixed points of
/// the algorithm. The engine never depends on their presence; each hook
/// receives resolved point sequences only.
#[derive(Default)]
pub struct Observers {
    /// Called with the current face's points at every visibility-walk step.
    pub on_locate: Option<Box<dyn Fn(&[Point])>>,
    /// Called with a neighbor face's points before its circumsphere test.
    pub on_circumcircle: Option<Box<dyn Fn(&[Point])>>,
    /// Called with a facet's points when it is kept as cavity boundary.
    pub on_highlight_edge: Option<Box<dyn Fn(&[Point])>>,
    /// Called with a facet's points when its owning face is excavated.
    pub on_delete_edge: Option<Box<dyn Fn(&[Point])>>,
    /// Called once after an insertion completes.
    pub on_redraw: Option<Box<dyn Fn()>>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("on_locate", &self.on_locate.is_some())
            .field("on_circumcircle", &self.on_circumcircle.is_some())
            .field("on_highlight_edge", &self.on_highlight_edge.is_some())
            .field("on_delete_edge", &self.on_delete_edge.is_some())
            .field("on_redraw", &self.on_redraw.is_some())
            .finish()
    }
}
