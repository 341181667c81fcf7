pub mod lectures;
pub mod tasks;

pub use lectures::*;
pub use tasks::*;
