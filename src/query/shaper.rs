//! Plan execution against an injected store and the paged result contract.

use super::{ListPlan, Listing, PageLimits, SortField, SortOrder};
use crate::error::AppError;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

/// One window of a filtered record set plus the size of the whole set.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

/// Read-only access to one record type. Implemented by every store.
#[async_trait]
pub trait ListSource<L: Listing>: Send + Sync {
    async fn fetch_page(&self, plan: &ListPlan<L>) -> Result<Page<L>, AppError>;
}

#[derive(Clone, Debug, Serialize)]
pub struct Listed<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub sort: &'static str,
    pub order: SortOrder,
    pub total_count: u64,
    pub total_pages: u64,
}

/// `ceil(total_count / per_page)`; zero when there is nothing to page through.
pub fn total_pages(total_count: u64, per_page: u32) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total_count.div_ceil(per_page as u64)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct QueryShaper {
    limits: PageLimits,
}

impl QueryShaper {
    pub fn new(limits: PageLimits) -> Self {
        QueryShaper { limits }
    }

    pub fn limits(&self) -> &PageLimits {
        &self.limits
    }

    pub fn shape<L: Listing>(&self, params: &HashMap<String, String>) -> ListPlan<L> {
        ListPlan::from_params(params, &self.limits)
    }

    pub async fn execute<L, S>(&self, store: &S, plan: ListPlan<L>) -> Result<Listed<L>, AppError>
    where
        L: Listing,
        S: ListSource<L> + ?Sized,
    {
        tracing::debug!(
            table = L::TABLE,
            page = plan.page,
            per_page = plan.per_page,
            sort = plan.sort.name(),
            order = plan.order.as_sql(),
            "shaped list query"
        );
        let Page { items, total_count } = store.fetch_page(&plan).await?;
        Ok(Listed {
            items,
            page: plan.page,
            per_page: plan.per_page,
            sort: plan.sort.name(),
            order: plan.order,
            total_count,
            total_pages: total_pages(total_count, plan.per_page),
        })
    }

    /// Shape and execute in one step.
    pub async fn list<L, S>(&self, store: &S, params: &HashMap<String, String>) -> Result<Listed<L>, AppError>
    where
        L: Listing,
        S: ListSource<L> + ?Sized,
    {
        let plan = self.shape::<L>(params);
        self.execute(store, plan).await
    }
}
