mod definition;
mod result;
mod status;

pub use definition::{Definition, Node};
pub use result::NodeResult;
pub use status::RunStatus;
