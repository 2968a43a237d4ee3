pub mod list;
pub mod priority;
pub mod task;
pub mod user;

pub use list::{List, ListSummary, ListWithTasks};
pub use priority::Priority;
pub use task::Task;
pub use user::{Role, User};
