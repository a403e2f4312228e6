mod collection;
mod error;
mod eval;
mod expression;
mod parse_filter;
mod projection;

pub use collection::{CollectionConfig, Cursor, MemoryCollection};
pub use error::CollectionError;
pub use expression::Expression;
pub use parse_filter::parse_filter;
