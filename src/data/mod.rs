pub mod model;
pub mod script;

pub use model::*;
pub use script::*;
