//! Flight-route animation: per-route sessions, their phase scheduler and the
//! board that hosts them on one map.

pub mod board;
pub mod config;
pub mod error;
pub mod host;
pub mod phase;
pub mod popup;
pub mod recording;
pub mod route;
pub mod scheduler;
pub mod session;
pub mod symbology;

pub use board::*;
pub use config::*;
pub use error::*;
pub use host::*;
pub use phase::*;
pub use popup::*;
pub use recording::*;
pub use route::*;
pub use scheduler::*;
pub use session::*;
pub use symbology::*;
