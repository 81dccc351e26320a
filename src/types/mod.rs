pub mod ids;
pub mod session;

pub use ids::*;
pub use session::*;
