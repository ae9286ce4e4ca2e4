//! Incremental Delaunay triangulation and its Voronoi dual in d
//! dimensions (d = 2 and 3 being the primary targets).
//!
//! Points carry extended homogeneous coordinates: a trailing weight of 1
//! marks a finite position, 0 a direction at infinity. The triangulation
//! seeds itself with an outer simplex of d+1 infinite vertices whose
//! interior is all of R^d, then inserts points one at a time with
//! Bowyer-Watson over twinned half-facets. The Voronoi builder dualizes a
//! completed triangulation into circumcenters, edges, and rays.
//!
//! The construction is single-threaded and synchronous; strict
//! degeneracies surface as [`error::Error::GeneralPosition`].

pub mod error;
pub mod point;
pub mod predicates;
pub mod triangulation;
pub mod voronoi;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, Result};
pub use point::{Matrix, Point, Vector};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::point::{Matrix, Point, Vector};
    pub use crate::predicates::{ccw, incircle, sign_det};
    pub use crate::triangulation::{DelaunayTriangulation, DtCfg, Observers};
    pub use crate::voronoi::{circumcenter, Voronoi};
}
