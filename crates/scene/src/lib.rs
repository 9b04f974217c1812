pub mod artifact;
pub mod lifecycle;
pub mod recording;
pub mod surface;

pub use artifact::*;
pub use lifecycle::*;
pub use recording::*;
pub use surface::*;
