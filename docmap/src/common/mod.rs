//! Common types shared by every layer of the mapper: the value universe,
//! the explicit serialization contract, constants and small helpers.

mod constants;
mod convertible;
mod util;
mod value;

pub use constants::*;
pub use convertible::*;
pub use util::*;
pub use value::*;
