pub mod booking;
pub mod model;
pub mod update;

pub use booking::*;
pub use model::*;
pub use update::*;
