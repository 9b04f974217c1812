pub mod arc;
pub mod geodesy;

pub use arc::*;
pub use geodesy::*;
