pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskInput, TaskList, TaskSummary, TaskUpdate};
pub use user::{NewUser, User, UserProfile};
