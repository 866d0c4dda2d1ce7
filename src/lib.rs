pub mod activation;
pub mod document;
pub mod input_node;
pub mod params;
pub mod state_snapshot;
pub mod surface;
pub mod visualization;

mod types;
mod util;
