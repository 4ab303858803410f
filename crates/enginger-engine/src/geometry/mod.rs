//! Vertex layout and GPU-resident geometry.

mod buffer;
mod error;
mod vertex;

pub use buffer::{draw, GeometryBuffer};
pub use error::GeometryError;
pub use vertex::{quad, Color, Position, Uv, Vertex, QUAD_INDICES};
