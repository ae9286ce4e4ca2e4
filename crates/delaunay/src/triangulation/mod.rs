//! Incremental Delaunay triangulation over a simplicial complex with an
//! explicit boundary at infinity.
//!
//! Purpose
//! - Maintain the Delaunay property of a d-dimensional point set under
//!   one-at-a-time insertion (Bowyer-Watson in the half-facet
//!   formulation): locate by visibility walk, excavate the cavity of
//!   faces whose circumsphere contains the new point, re-triangulate by
//!   linking the new vertex to every cavity-boundary facet, and restore
//!   twin links.
//!
//! Why this design
//! - The domain is closed with d+1 vertices at infinity spanning an outer
//!   simplex that contains all of R^d, so the convex-hull boundary is made
//!   of ordinary faces and the walk never falls off the complex.
//! - Faces sit in an arena (`Vec<Option<Face>>`); excavation `take`s a
//!   slot. Twin refs into an excavated slot dangle only inside one
//!   insertion and are re-linked before any read.
//!
//! Notes
//! - No external handle into faces survives a `delaunay_add`: insertion
//!   destroys faces.
//! - Strict degeneracies (an orientation or in-sphere sign of exactly 0
//!   where sidedness is required) surface as `Error::GeneralPosition` and
//!   leave the triangulation undefined; callers retry with jittered
//!   input. Duplicate insertion resolves to the same error.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::thread_rng;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::point::Point;
use crate::predicates::{ccw, incircle};

mod types;
#[cfg(test)]
mod tests;

pub use types::{DtCfg, Face, FaceId, HalfFacet, HalfFacetRef, Observers, Vertex, VertexId};

/// Points whose simplex contains all of R^dimension: the d standard
/// directions plus the all-negative direction, every one at infinity.
pub(crate) fn outer_face_points(dimension: usize) -> Vec<Point> {
    let mut result = Vec::with_capacity(dimension + 1);
    for i in 0..dimension {
        let mut coords = vec![0.0; dimension + 1];
        coords[i] = 1.0;
        result.push(Point::new(coords).expect("dimension + 1 coordinates"));
    }
    let mut neg = vec![-1.0; dimension + 1];
    neg[dimension] = 0.0;
    result.push(Point::new(neg).expect("dimension + 1 coordinates"));
    result
}

/// A Delaunay triangulation of a finite point set.
#[derive(Debug)]
pub struct DelaunayTriangulation {
    dimension: usize,
    vertices: Vec<Vertex>,
    faces: Vec<Option<Face>>,
    live: usize,
    point_history: Vec<Point>,
    homogeneous_input: bool,
    name: String,
    observers: Observers,
}

impl DelaunayTriangulation {
    /// Triangulate `points` under `cfg`. The dimension is inferred from
    /// the first point (+1 lift if inputs arrive without weights).
    pub fn new(points: Vec<Point>, cfg: DtCfg) -> Result<Self> {
        Self::with_observers(points, cfg, Observers::default())
    }

    /// Like [`Self::new`], with visualization hooks attached.
    pub fn with_observers(points: Vec<Point>, cfg: DtCfg, observers: Observers) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut points: Vec<Point> = if cfg.homogeneous {
            points
        } else {
            points.iter().map(|p| p.lift(|_| 1.0)).collect()
        };
        let dimension = points[0].len() - 1;
        if dimension == 0 {
            return Err(Error::EmptyInput);
        }
        let mut dt = Self {
            dimension,
            vertices: Vec::new(),
            faces: Vec::new(),
            live: 0,
            point_history: Vec::new(),
            homogeneous_input: cfg.homogeneous,
            name: cfg.name,
            observers,
        };
        let outer: Vec<VertexId> = outer_face_points(dimension)
            .into_iter()
            .map(|p| dt.add_vertex(p))
            .collect();
        let outer_face = Face::new(outer, &dt.vertices)?;
        dt.add_face(outer_face);
        if cfg.randomize {
            points.shuffle(&mut thread_rng());
        }
        for point in points {
            dt.insert(point)?;
        }
        Ok(dt)
    }

    /// Insert one more point (same coordinate convention as construction).
    pub fn delaunay_add(&mut self, point: Point) -> Result<()> {
        let point = if self.homogeneous_input {
            point
        } else {
            point.lift(|_| 1.0)
        };
        self.insert(point)
    }

    /// Point location by visibility walk: repeatedly cross any facet whose
    /// oriented side of the query is negative; a face where every lineside
    /// is non-negative contains the point (ties stay put).
    pub fn locate(&self, point: &Point) -> Result<FaceId> {
        let lifted = if self.homogeneous_input {
            point.clone()
        } else {
            point.lift(|_| 1.0)
        };
        self.locate_lifted(&lifted)
    }

    /// The set of finite faces, each as its set of points. A face is
    /// finite iff none of its vertices lies at infinity. Weights are
    /// stripped unless `homogeneous`.
    pub fn face_point_sets(&self, homogeneous: bool) -> BTreeSet<BTreeSet<Point>> {
        let mut result = BTreeSet::new();
        for (_, face) in self.live_faces() {
            if face
                .vertices
                .iter()
                .any(|v| self.vertices[v.0].point.is_infinite())
            {
                trace!(name = %self.name, "skipping infinite face");
                continue;
            }
            let set: BTreeSet<Point> = face
                .vertices
                .iter()
                .map(|v| {
                    let p = &self.vertices[v.0].point;
                    if homogeneous {
                        p.clone()
                    } else {
                        p.affine_part().expect("extended points have an affine part")
                    }
                })
                .collect();
            result.insert(set);
        }
        result
    }

    /// Global Delaunay test oracle: every half-facet of every live face is
    /// locally Delaunay.
    pub fn is_delaunay(&self) -> bool {
        self.live_faces().all(|(_, face)| {
            face.iter_facets()
                .all(|hf| self.locally_delaunay(hf, None).unwrap_or(false))
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of live faces, the simplex at infinity included.
    pub fn face_count(&self) -> usize {
        self.live
    }

    /// Inserted points in insertion order (post-shuffle).
    pub fn point_history(&self) -> &[Point] {
        &self.point_history
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.0).and_then(|f| f.as_ref())
    }

    pub fn live_faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.as_ref().map(|face| (FaceId(i), face)))
    }

    pub fn vertex_point(&self, id: VertexId) -> &Point {
        &self.vertices[id.0].point
    }

    pub fn face_points(&self, face: &Face) -> Vec<Point> {
        face.points(&self.vertices)
    }

    // ---- internals -----------------------------------------------------

    fn add_vertex(&mut self, point: Point) -> VertexId {
        self.vertices.push(Vertex { point });
        VertexId(self.vertices.len() - 1)
    }

    fn add_face(&mut self, face: Face) -> FaceId {
        self.faces.push(Some(face));
        self.live += 1;
        FaceId(self.faces.len() - 1)
    }

    /// Bowyer-Watson insertion of an already-lifted point.
    fn insert(&mut self, point: Point) -> Result<()> {
        self.point_history.push(point.clone());
        let start = self.locate_lifted(&point)?;
        let mut stack = self.shatter(start);
        let new_vertex = self.add_vertex(point.clone());

        // Cavity excavation: a popped facet either bounds the cavity
        // (locally Delaunay against the new point) or opens into a
        // neighbor whose circumsphere contains the point.
        let mut boundary: Vec<HalfFacet> = Vec::new();
        while let Some(facet) = stack.pop() {
            if self.locally_delaunay(&facet, Some(&point))? {
                self.emit_highlight(&facet);
                boundary.push(facet);
            } else {
                let twin = facet
                    .twin
                    .expect("a facet without a twin is always locally Delaunay");
                if self.faces[twin.face.0].is_none() {
                    continue; // neighbor already excavated
                }
                stack.extend(self.shatter_except(twin.face, twin.slot));
            }
        }

        // Star re-triangulation: one face per boundary facet, reusing the
        // facet opposite the new vertex so the outside stays linked.
        let mut new_faces: Vec<FaceId> = Vec::with_capacity(boundary.len());
        for facet in boundary {
            let outer_twin = facet.twin;
            let mut ids = facet.vertices.clone();
            ids.push(new_vertex);
            let face = Face::with_reused(ids, &self.vertices, new_vertex, facet)?;
            let slot = face
                .slot_of(new_vertex)
                .expect("the new vertex belongs to its own star");
            let id = self.add_face(face);
            if let Some(t) = outer_twin {
                let outside = self.faces[t.face.0]
                    .as_mut()
                    .expect("cavity boundary neighbor is alive");
                outside.half_facets[t.slot].twin = Some(HalfFacetRef { face: id, slot });
            }
            new_faces.push(id);
        }
        self.link_star(&new_faces);
        self.emit_redraw();
        debug!(name = %self.name, faces = self.live, "inserted point");
        Ok(())
    }

    /// Twin-link the interior of a freshly built star by brute force: two
    /// star faces are neighbors iff their vertex sets differ in exactly
    /// two vertices. O(k^2) in the star size, which is bounded by the
    /// local degree.
    fn link_star(&mut self, new_faces: &[FaceId]) {
        for i in 0..new_faces.len() {
            for j in (i + 1)..new_faces.len() {
                let (fi, fj) = (new_faces[i], new_faces[j]);
                let (slot_i, slot_j) = {
                    let a = self.faces[fi.0].as_ref().expect("star face is alive");
                    let b = self.faces[fj.0].as_ref().expect("star face is alive");
                    let (only_a, only_b) = symmetric_difference(&a.vertices, &b.vertices);
                    if only_a.len() != 1 || only_b.len() != 1 {
                        continue;
                    }
                    (
                        a.slot_of(only_a[0]).expect("difference vertex is in face"),
                        b.slot_of(only_b[0]).expect("difference vertex is in face"),
                    )
                };
                self.faces[fi.0].as_mut().expect("star face is alive").half_facets[slot_i].twin =
                    Some(HalfFacetRef { face: fj, slot: slot_j });
                self.faces[fj.0].as_mut().expect("star face is alive").half_facets[slot_j].twin =
                    Some(HalfFacetRef { face: fi, slot: slot_i });
            }
        }
    }

    /// Remove a face from the arena and hand back its half-facets.
    fn shatter(&mut self, id: FaceId) -> Vec<HalfFacet> {
        let face = self.faces[id.0].take().expect("shattering a live face");
        self.live -= 1;
        self.emit_delete_edges(&face);
        face.half_facets
    }

    /// Shatter, but drop the half-facet at `slot` (the one we entered
    /// through, whose two sides both vanish with the cavity interior).
    fn shatter_except(&mut self, id: FaceId, slot: usize) -> Vec<HalfFacet> {
        let mut facets = self.shatter(id);
        facets.remove(slot);
        facets
    }

    fn locate_lifted(&self, point: &Point) -> Result<FaceId> {
        let mut current = self.arbitrary_face().expect("at least one live face");
        // A correct walk visits each face at most once; degenerate inputs
        // could cycle along zero linesides, so cap the crossings.
        let max_crossings = self.live * (self.dimension + 1) + 1;
        let mut crossings = 0;
        'walk: loop {
            let face = self.faces[current.0]
                .as_ref()
                .expect("the walk stays on live faces");
            self.emit_locate(face);
            for hf in face.iter_facets() {
                if self.lineside(hf, point)? == -1 {
                    if let Some(t) = hf.twin {
                        crossings += 1;
                        if crossings > max_crossings {
                            return Err(Error::GeneralPosition);
                        }
                        current = t.face;
                        continue 'walk;
                    }
                }
            }
            trace!(name = %self.name, face = current.0, "located point");
            return Ok(current);
        }
    }

    /// 1, 0, or -1: the query is on the same side as `facet.opposite`,
    /// co-hyperplanar, or on the other side.
    fn lineside(&self, facet: &HalfFacet, point: &Point) -> Result<i8> {
        let mut pts = self.facet_points(facet);
        pts.push(point.clone());
        Ok(ccw(&pts, true)? * facet.side)
    }

    /// A facet is locally Delaunay iff it has no twin or the query (the
    /// facet's own opposite vertex unless `alt` overrides it) does not lie
    /// strictly inside the circumsphere of the face across it. The twin's
    /// side corrects for the twin's own orientation.
    fn locally_delaunay(&self, facet: &HalfFacet, alt: Option<&Point>) -> Result<bool> {
        let Some(t) = facet.twin else {
            return Ok(true); // bordering on the infinite
        };
        let Some(neighbor) = self.faces[t.face.0].as_ref() else {
            // The neighbor is already excavated; the test that excavated it
            // would fail again, deterministically.
            return Ok(false);
        };
        let twin = &neighbor.half_facets[t.slot];
        let query = alt.unwrap_or(&self.vertices[facet.opposite.0].point);
        let mut pts = self.facet_points(twin);
        pts.push(self.vertices[twin.opposite.0].point.clone());
        self.emit_circumcircle(&pts);
        pts.push(query.clone());
        let result = twin.side * incircle(&pts, true)?;
        Ok(result <= 0)
    }

    fn facet_points(&self, facet: &HalfFacet) -> Vec<Point> {
        facet
            .vertices
            .iter()
            .map(|v| self.vertices[v.0].point.clone())
            .collect()
    }

    /// Any live face; recent faces first, which also starts the walk near
    /// the last insertion.
    fn arbitrary_face(&self) -> Option<FaceId> {
        self.faces.iter().rposition(|f| f.is_some()).map(FaceId)
    }

    fn emit_locate(&self, face: &Face) {
        if let Some(hook) = &self.observers.on_locate {
            hook(&self.face_points(face));
        }
    }

    fn emit_circumcircle(&self, points: &[Point]) {
        if let Some(hook) = &self.observers.on_circumcircle {
            hook(points);
        }
    }

    fn emit_highlight(&self, facet: &HalfFacet) {
        if let Some(hook) = &self.observers.on_highlight_edge {
            hook(&self.facet_points(facet));
        }
    }

    fn emit_delete_edges(&self, face: &Face) {
        if let Some(hook) = &self.observers.on_delete_edge {
            for hf in face.iter_facets() {
                hook(&self.facet_points(hf));
            }
        }
    }

    fn emit_redraw(&self) {
        if let Some(hook) = &self.observers.on_redraw {
            hook();
        }
    }
}

/// Elements only in `a` and only in `b`, both inputs sorted.
fn symmetric_difference(a: &[VertexId], b: &[VertexId]) -> (Vec<VertexId>, Vec<VertexId>) {
    let mut only_a = Vec::new();
    let mut only_b = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => {
                only_a.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                only_b.push(b[j]);
                j += 1;
            }
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    only_a.extend_from_slice(&a[i..]);
    only_b.extend_from_slice(&b[j..]);
    (only_a, only_b)
}
