mod audit;
mod batch;
mod org;

pub use audit::*;
pub use batch::*;
pub use org::*;
