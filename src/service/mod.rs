pub mod classifier;
pub mod dispatcher;
pub mod manual;
pub mod render;

pub use classifier::{is_overdue, select_overdue};
pub use dispatcher::NoticeDispatcher;
pub use manual::prepare_notice;
