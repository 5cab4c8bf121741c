//! Command implementations

mod groups;
mod list;
mod load;

pub use groups::run_groups;
pub use list::{run_list, run_show};
pub use load::run_load;
