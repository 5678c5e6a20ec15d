//! View and query results with registry based rehydration of row values.
mod row_wrapper;
mod view_results;
mod view_row;

pub use row_wrapper::*;
pub use view_results::*;
pub use view_row::*;
