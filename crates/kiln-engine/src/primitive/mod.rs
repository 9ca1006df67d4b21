//! Drawable shapes with cached transforms.
//!
//! A [`Primitive`] keeps its transform attributes in a [`Transform`] and the
//! five derived matrices in a [`MatrixSet`]. Setters only flag the matrices
//! that depend on the changed attribute; the next draw recomputes and uploads
//! exactly those.

mod geometry;
mod matrix;
mod shape;

pub use geometry::circle_to_polygon;
pub use matrix::{CachedMatrix, KindSet, MatrixKind, MatrixSet, Transform};
pub use shape::{Primitive, Shape};
