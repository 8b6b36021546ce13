pub mod bounds;
pub mod plane;

pub use bounds::Aabb;
pub use plane::Plane;
