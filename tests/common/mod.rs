pub mod fixtures;
pub mod nodes;

pub use fixtures::*;
pub use nodes::*;
