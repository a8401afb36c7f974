pub mod task;
pub mod user;

pub use task::TaskService;
pub use user::{IssuedToken, UserService};
