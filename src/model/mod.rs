pub mod config;
pub mod profile;
pub mod task;
pub mod task_list;

pub use config::*;
pub use profile::*;
pub use task::*;
pub use task_list::*;
