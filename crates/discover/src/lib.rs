//! Paginated TMDB discovery client with deterministic fault injection.
//!
//! The pager translates free-text keyword filters into resolved ids,
//! merges the active filter dimensions into one discover query, and
//! re-pages until a fixed-size delivery batch is satisfied even when
//! individual pages are sparse. A seed-stable corruption layer can
//! mutate successful responses on the way in, simulating backend
//! defects reproducibly for resilience tests.

pub mod client;
pub mod error;
pub mod fault;
pub mod filters;
pub mod item;
pub mod keywords;
pub mod page;
pub mod pager;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

pub use client::{ClientConfig, TmdbClient};
pub use error::{BAD_DATA_MESSAGE, DiscoverError};
pub use fault::{FaultConfig, FaultConfigSource, FaultMode, FaultPick, SessionFaultStore};
pub use filters::{DiscoverFilters, MediaKind, SortBy};
pub use item::SearchMediaItem;
pub use page::PagedResults;
pub use pager::{DiscoverPager, PagerStatus};
pub use transport::Transport;
