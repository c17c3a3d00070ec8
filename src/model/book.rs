use super::nullable;
use crate::query::{cmp_text, contains_ci, int_filter, text_filter, Listing, Predicate, RecordFilter, SortField};
use crate::service::{FieldRule, ValidationRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub isbn: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
}

/// Partial update. Only present fields change; `year` and `isbn` may be cleared with `null`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub isbn: Option<Option<String>>,
}

impl Book {
    pub fn apply(&mut self, patch: BookPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(isbn) = patch.isbn {
            self.isbn = isbn;
        }
    }
}

pub const BOOK_RULES: &[FieldRule] = &[
    FieldRule {
        field: "title",
        rule: ValidationRule {
            required: true,
            max_length: Some(200),
            ..ValidationRule::NONE
        },
    },
    FieldRule {
        field: "author",
        rule: ValidationRule {
            required: true,
            max_length: Some(100),
            ..ValidationRule::NONE
        },
    },
    FieldRule {
        field: "isbn",
        rule: ValidationRule {
            max_length: Some(20),
            ..ValidationRule::NONE
        },
    },
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BookSort {
    #[default]
    Id,
    Title,
    Author,
    Year,
    CreatedAt,
}

impl SortField for BookSort {
    const ALLOWED: &'static [Self] = &[
        BookSort::Id,
        BookSort::Title,
        BookSort::Author,
        BookSort::Year,
        BookSort::CreatedAt,
    ];

    fn name(self) -> &'static str {
        match self {
            BookSort::Id => "id",
            BookSort::Title => "title",
            BookSort::Author => "author",
            BookSort::Year => "year",
            BookSort::CreatedAt => "created_at",
        }
    }

    fn column(self) -> &'static str {
        self.name()
    }
}

/// `q` matches the title, `author` the author (both partial, case-insensitive), `year` exactly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i64>,
}

impl RecordFilter<Book> for BookFilter {
    fn from_params(params: &HashMap<String, String>) -> Self {
        BookFilter {
            title: text_filter(params, "q"),
            author: text_filter(params, "author"),
            year: int_filter(params, "year"),
        }
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(title) = &self.title {
            out.push(Predicate::contains("title", title));
        }
        if let Some(author) = &self.author {
            out.push(Predicate::contains("author", author));
        }
        if let Some(year) = self.year {
            out.push(Predicate::equals("year", year));
        }
        out
    }

    fn matches(&self, book: &Book) -> bool {
        self.title.as_deref().map_or(true, |t| contains_ci(&book.title, t))
            && self.author.as_deref().map_or(true, |a| contains_ci(&book.author, a))
            && self.year.map_or(true, |y| book.year.map(i64::from) == Some(y))
    }
}

impl Listing for Book {
    type Sort = BookSort;
    type Filter = BookFilter;

    const TABLE: &'static str = "books";
    const COLUMNS: &'static [&'static str] = &["id", "title", "author", "year", "isbn", "created_at"];

    fn id(&self) -> i64 {
        self.id
    }

    fn compare_by(&self, other: &Self, sort: BookSort) -> Ordering {
        match sort {
            BookSort::Id => self.id.cmp(&other.id),
            BookSort::Title => cmp_text(&self.title, &other.title),
            BookSort::Author => cmp_text(&self.author, &other.author),
            BookSort::Year => self.year.cmp(&other.year),
            BookSort::CreatedAt => self.created_at.cmp(&other.created_at),
        }
    }
}
