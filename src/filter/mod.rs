pub mod error;
pub mod filter_order;
pub mod filter_where;
pub mod list_query;
pub mod page;
pub mod params;
pub mod types;

pub use error::FilterError;
pub use list_query::ListQuery;
pub use page::{ListResult, PageRef, PageWindow, PaginationMeta};
pub use params::{ParamValue, RawParams};
pub use types::*;
