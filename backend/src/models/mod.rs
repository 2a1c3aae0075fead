pub mod light_curve;
pub mod transit;

pub use light_curve::*;
pub use transit::*;
