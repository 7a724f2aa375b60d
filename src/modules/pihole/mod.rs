pub mod model;

pub use model::{GravityLastUpdated, RelativeAge, StatusSnapshot};
