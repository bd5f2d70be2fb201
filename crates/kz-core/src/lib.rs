pub mod document;
pub mod gradient;
pub mod grid;
pub mod id;
pub mod model;
pub mod mutation;
pub mod store;
pub mod transform;

pub use document::Document;
pub use gradient::{ColorStop, Gradient, GradientKind, Rgb};
pub use grid::{Axis, GridConfig, snap};
pub use id::ElementId;
pub use model::*;
pub use mutation::{Applied, Mutation};
pub use store::{ElementStore, ReorderAction};
pub use transform::Viewport;
