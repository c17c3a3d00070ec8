//! Typed bind values for dynamically assembled statements.

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::{QueryAs, QueryScalar};

/// A value bound to a `$n` placeholder. Nulls keep their column type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindValue {
    Text(Option<String>),
    Int(Option<i64>),
}

impl BindValue {
    pub fn text(s: impl Into<String>) -> Self {
        BindValue::Text(Some(s.into()))
    }

    pub fn int(n: i64) -> Self {
        BindValue::Int(Some(n))
    }
}

pub fn bind_as<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for p in params {
        query = match p {
            BindValue::Text(s) => query.bind(s.clone()),
            BindValue::Int(n) => query.bind(*n),
        };
    }
    query
}

pub fn bind_scalar<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    params: &[BindValue],
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for p in params {
        query = match p {
            BindValue::Text(s) => query.bind(s.clone()),
            BindValue::Int(n) => query.bind(*n),
        };
    }
    query
}
