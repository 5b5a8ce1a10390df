pub mod file;
pub mod health_check;

pub use file::*;
pub use health_check::*;
