//! Concrete to-do tables and their typed rows.

pub mod priority;
pub mod table;
pub mod task;

pub use priority::{Priority, PriorityTable};
pub use table::Table;
pub use task::{NewTask, Task, TaskTable};
