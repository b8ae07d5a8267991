//! Data shapes shared by the engine, its backends and its persistence layer.

mod query;
mod result;

pub use query::{
	DateFilter, DateType, FileCategory, FileTypeFilter, SearchOptions, SearchQuery, SizeFilter,
	SizeUnit, create_default_options,
};
pub use result::{LineMatch, MAX_RELEVANCE, MatchType, SearchResult};
