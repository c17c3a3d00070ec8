//! Coerced list request: page window, allow-listed sort key, order and typed filter.

use super::{parse_page, parse_per_page, RecordFilter};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `desc` (any ASCII case) is descending; anything else, including absence, is ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// Allow-listed sort key. Implementors are field-less enums; `Default` is the fallback key.
pub trait SortField: Copy + Eq + Default + Debug + Send + Sync + 'static {
    const ALLOWED: &'static [Self];

    /// Name accepted in the `sort` query parameter and echoed back in results.
    fn name(self) -> &'static str;

    /// Column identifier used in ORDER BY.
    fn column(self) -> &'static str;

    /// Exact, case-sensitive lookup against the allow-list; unknown names fall back to the default.
    fn resolve(raw: Option<&str>) -> Self {
        raw.map(str::trim)
            .and_then(|name| Self::ALLOWED.iter().copied().find(|f| f.name() == name))
            .unwrap_or_default()
    }
}

/// A record type that can be listed through the shaper.
pub trait Listing: Clone + Send + Sync + 'static {
    type Sort: SortField;
    type Filter: RecordFilter<Self>;

    /// Table holding the records.
    const TABLE: &'static str;
    /// Columns selected for each record, in `FromRow` order.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;

    /// Typed comparator for one sort key (ascending).
    fn compare_by(&self, other: &Self, sort: Self::Sort) -> Ordering;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLimits {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        PageLimits {
            default_per_page: 10,
            max_per_page: 100,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ListPlan<L: Listing> {
    pub page: u32,
    pub per_page: u32,
    pub sort: L::Sort,
    pub order: SortOrder,
    pub filter: L::Filter,
}

impl<L: Listing> ListPlan<L> {
    pub fn from_params(params: &HashMap<String, String>, limits: &PageLimits) -> Self {
        let get = |k: &str| params.get(k).map(String::as_str);
        ListPlan {
            page: parse_page(get("page")),
            per_page: parse_per_page(get("per_page"), limits),
            sort: L::Sort::resolve(get("sort")),
            order: SortOrder::parse(get("order")),
            filter: L::Filter::from_params(params),
        }
    }

    pub fn limit(&self) -> u64 {
        self.per_page as u64
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Full ordering for the plan: the sort key in the requested order, then id ascending.
    pub fn compare(&self, a: &L, b: &L) -> Ordering {
        self.order
            .apply(a.compare_by(b, self.sort))
            .then_with(|| a.id().cmp(&b.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_parse_is_lenient() {
        assert_eq!(SortOrder::parse(None), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("descending")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("random()")), SortOrder::Asc);
    }

    #[test]
    fn order_reverses_comparisons() {
        assert_eq!(SortOrder::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortOrder::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortOrder::Desc.as_sql(), "DESC");
    }
}
