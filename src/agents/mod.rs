pub mod logistics;
pub mod traffic;

pub use logistics::*;
pub use traffic::*;
