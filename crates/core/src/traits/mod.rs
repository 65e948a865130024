pub mod scoring;
pub mod store;

pub use scoring::*;
pub use store::*;
