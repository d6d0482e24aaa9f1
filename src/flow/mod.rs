pub mod catalog;
pub mod key;
pub mod screen;

pub use catalog::*;
pub use key::*;
pub use screen::*;
