pub mod identity;
pub mod listing;

pub use identity::{Actor, CallerClass, Identity};
pub use listing::{ColumnFilter, PageParams, parse_filters};
