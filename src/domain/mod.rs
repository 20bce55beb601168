pub mod forecast;
pub mod plant;
pub mod position;

pub use forecast::*;
pub use plant::*;
pub use position::*;
