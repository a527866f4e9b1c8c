pub mod decision;
pub mod reading;
pub mod treatment;

pub use decision::*;
pub use reading::*;
pub use treatment::*;
