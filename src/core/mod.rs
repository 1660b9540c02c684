pub mod bearing;
pub mod route;
pub mod waypoint;

pub use bearing::bearing;
pub use route::Route;
pub use waypoint::Waypoint;
