mod index;
mod master;
mod read;

pub use index::*;
pub use master::*;
pub use read::*;

pub mod write;
pub use write::*;
