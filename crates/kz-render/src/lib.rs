pub mod hit;
pub mod paint;
pub mod path;

pub use hit::{hit_test, hit_test_rect};
pub use paint::{ClipRect, PaintItem, paint_order};
pub use path::path_geometry;
