//! Query shaping for list endpoints: untrusted query-string parameters in, a bounded and
//! deterministic retrieval plan out, plus the paged result contract.
//!
//! Sort keys are explicit allow-list enums per record type ([`SortField`]); each maps to a
//! static column identifier for SQL and to a typed comparator for in-memory stores. Filters
//! are typed per record ([`RecordFilter`]). Invalid `page`/`per_page` input is coerced to
//! defaults, never rejected.

mod filter;
mod params;
mod plan;
mod shaper;

pub use filter::{Match, Predicate, RecordFilter};
pub use params::{cmp_text, contains_ci, int_filter, parse_page, parse_per_page, text_filter};
pub use plan::{ListPlan, Listing, PageLimits, SortField, SortOrder};
pub use shaper::{total_pages, ListSource, Listed, Page, QueryShaper};
