pub mod engine;
pub mod mapper;
pub mod shutdown;

pub use engine::{ForwardError, Forwarder};
pub use mapper::map_snapshot;
pub use shutdown::wait_for_signal;
