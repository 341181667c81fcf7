pub mod lecture;

pub use lecture::*;
