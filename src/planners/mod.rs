pub mod base;
pub mod params;
pub mod rrg;
pub mod rrt;
pub mod rrtstar;

pub use base::{EdgeCallback, Planner, VertexCallback};
pub use params::Parameters;
pub use rrg::Rrg;
pub use rrt::Rrt;
pub use rrtstar::{optimal_gamma, RrtStar};
