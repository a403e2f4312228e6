//! Turns untrusted list-endpoint query parameters into a filtered, sorted,
//! field-limited and paginated document query.

mod config;
mod filter;
mod operator;
mod pagination;
mod params;
mod projection;
mod query;
mod refiner;
mod sort;

pub use config::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DEFAULT_SORT_FIELD, REVISION_FIELD, RefineConfig,
};
pub use filter::{FilterSpec, RESERVED_KEYS, is_reserved};
pub use operator::Comparison;
pub use pagination::Pagination;
pub use params::{MAX_DEPTH, ParamValue, RawParams};
pub use projection::{Projection, projection_spec};
pub use query::{Queryable, RefinedQuery, merge_criteria};
pub use refiner::QueryRefiner;
pub use sort::{Sort, SortDirection, parse_sort, sort_spec, sort_string};
