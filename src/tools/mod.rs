pub mod list_franchises;
pub mod search;

pub use list_franchises::*;
pub use search::*;
