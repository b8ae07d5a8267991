//! Asynchronous search orchestration for `trawl`.
//!
//! A [`SearchFacade`] drives one [`SearchBackend`], tracks every search it
//! starts as a session, streams results into those sessions and derives
//! sorted, filtered and paginated views on demand. Executed queries land in a
//! bounded history and users can keep named saved searches; both persist
//! through a [`KeyValueStore`].

pub mod app_dirs;
pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod facade;
pub mod gateway;
pub mod history;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod saved;
pub mod session;
pub mod testing;
pub mod view;

pub use backend::LocalBackend;
pub use config::EngineSettings;
pub use error::{EngineError, EngineResult};
pub use facade::{ActiveResults, SearchFacade};
pub use gateway::{BackendError, BackendEvent, EventSink, SearchBackend};
pub use history::{HistoryManager, MAX_HISTORY_ENTRIES, SearchHistoryEntry};
pub use model::{
	DateFilter, DateType, FileCategory, FileTypeFilter, LineMatch, MatchType, SearchOptions,
	SearchQuery, SearchResult, SizeFilter, SizeUnit, create_default_options,
};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, SharedStore, StorageError};
pub use saved::{NewSavedSearch, SavedSearch, SavedSearchRegistry};
pub use session::{SearchId, SearchState, SearchStatus};
pub use view::{RenderMode, RenderOverride, ResultFilter, SortKey, SortOrder, SortSpec};
