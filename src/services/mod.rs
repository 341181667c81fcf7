pub mod normalize;
pub mod markers;
pub mod task_parser;
pub mod cache;
pub mod outline;
pub mod lecture_store;
pub mod backticks;

pub use cache::TasksCache;
pub use lecture_store::{FsLectureSource, LectureSource};
pub use markers::MarkerTable;
pub use task_parser::TasksParser;
