pub mod angle;
pub mod site;
pub mod status;

pub use angle::*;
pub use site::*;
pub use status::*;
