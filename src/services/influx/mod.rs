pub mod types;
pub mod point;
pub mod writer;

pub use types::*;
pub use point::*;
pub use writer::*;
