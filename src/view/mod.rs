//! Pure derivations over a session's result buffer: ordering, filtering,
//! pagination and the paginated/virtualized presentation decision.

mod filter;
mod pagination;
mod render_mode;
mod sort;

pub use filter::ResultFilter;
pub use pagination::{Pagination, clamp_page, paginate, total_pages};
pub use render_mode::{DEFAULT_VIRTUALIZE_THRESHOLD, RenderMode, RenderOverride, select_mode};
pub use sort::{SortKey, SortOrder, SortSpec, derive_view};
