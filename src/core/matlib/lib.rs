
mod linalg;
mod neighbors;

pub use linalg::*;
pub use neighbors::*;
