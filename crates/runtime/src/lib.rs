pub mod event_bus;
pub mod frame;
pub mod random;
pub mod timer;

pub use event_bus::*;
pub use frame::*;
pub use random::*;
pub use timer::*;
