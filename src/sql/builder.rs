//! Builds parameterized SELECT and COUNT statements for shaped list queries.

use super::BindValue;
use crate::query::{Match, Predicate, SortOrder};

/// Quote identifier for PostgreSQL (safe: only from static record metadata).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Escape LIKE wildcards so user input only ever matches literally.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }

    fn where_clause(&mut self, predicates: &[Predicate]) -> String {
        let mut parts = Vec::with_capacity(predicates.len());
        for p in predicates {
            let part = match &p.rule {
                Match::Contains(needle) => {
                    let n = self.push_param(BindValue::text(format!("%{}%", escape_like(needle))));
                    format!("{} ILIKE ${} ESCAPE '\\'", quoted(p.column), n)
                }
                Match::Equals(value) => {
                    let n = self.push_param(BindValue::int(*value));
                    format!("{} = ${}", quoted(p.column), n)
                }
            };
            parts.push(part);
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", parts.join(" AND "))
        }
    }
}

pub fn column_list(columns: &[&str]) -> String {
    columns.iter().map(|c| quoted(c)).collect::<Vec<_>>().join(", ")
}

/// ORDER BY the sort column, then the primary key so ties are stable. NULLs sort before
/// values ascending and after them descending.
fn order_clause(sort_column: &str, order: SortOrder) -> String {
    let pk = quoted("id");
    if sort_column == "id" {
        return format!(" ORDER BY {} {}", pk, order.as_sql());
    }
    let nulls = match order {
        SortOrder::Asc => "NULLS FIRST",
        SortOrder::Desc => "NULLS LAST",
    };
    format!(
        " ORDER BY {} {} {}, {} ASC",
        quoted(sort_column),
        order.as_sql(),
        nulls,
        pk
    )
}

/// SELECT one page: filters ANDed, ordered, LIMIT/OFFSET bound as parameters.
pub fn select_page(
    table: &str,
    columns: &[&str],
    predicates: &[Predicate],
    sort_column: &str,
    order: SortOrder,
    limit: u64,
    offset: u64,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = q.where_clause(predicates);
    let limit_n = q.push_param(BindValue::int(i64::try_from(limit).unwrap_or(i64::MAX)));
    let offset_n = q.push_param(BindValue::int(i64::try_from(offset).unwrap_or(i64::MAX)));
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT ${} OFFSET ${}",
        column_list(columns),
        quoted(table),
        where_clause,
        order_clause(sort_column, order),
        limit_n,
        offset_n
    );
    q
}

/// COUNT(*) over the same filters as [`select_page`].
pub fn count(table: &str, predicates: &[Predicate]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = q.where_clause(predicates);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(table), where_clause);
    q
}

/// SELECT by primary key. Caller binds the id as `$1`.
pub fn select_by_id(table: &str, columns: &[&str]) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1",
        column_list(columns),
        quoted(table),
        quoted("id")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["id", "title", "author", "year"];

    #[test]
    fn page_without_filters() {
        let q = select_page("books", COLUMNS, &[], "id", SortOrder::Asc, 10, 20);
        assert_eq!(
            q.sql,
            r#"SELECT "id", "title", "author", "year" FROM "books" ORDER BY "id" ASC LIMIT $1 OFFSET $2"#
        );
        assert_eq!(q.params, vec![BindValue::int(10), BindValue::int(20)]);
    }

    #[test]
    fn filters_are_parameters() {
        let predicates = vec![Predicate::contains("author", "Orwell"), Predicate::equals("year", 1949)];
        let q = select_page("books", COLUMNS, &predicates, "title", SortOrder::Desc, 5, 0);
        assert_eq!(
            q.sql,
            r#"SELECT "id", "title", "author", "year" FROM "books" WHERE "author" ILIKE $1 ESCAPE '\' AND "year" = $2 ORDER BY "title" DESC NULLS LAST, "id" ASC LIMIT $3 OFFSET $4"#
        );
        assert_eq!(
            q.params,
            vec![
                BindValue::text("%Orwell%"),
                BindValue::int(1949),
                BindValue::int(5),
                BindValue::int(0)
            ]
        );
    }

    #[test]
    fn count_shares_the_where_clause() {
        let q = count("books", &[Predicate::contains("title", "50%_off")]);
        assert_eq!(q.sql, r#"SELECT COUNT(*) FROM "books" WHERE "title" ILIKE $1 ESCAPE '\'"#);
        assert_eq!(q.params, vec![BindValue::text(r"%50\%\_off%")]);
    }

    #[test]
    fn huge_offsets_saturate() {
        let q = select_page("books", COLUMNS, &[], "id", SortOrder::Asc, 100, u64::MAX);
        assert_eq!(q.params[1], BindValue::int(i64::MAX));
    }

    #[test]
    fn by_id() {
        assert_eq!(
            select_by_id("teachers", &["id", "name"]),
            r#"SELECT "id", "name" FROM "teachers" WHERE "id" = $1"#
        );
    }
}
