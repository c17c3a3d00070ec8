//! School directory: teachers teach courses, students enrol in one course.

use crate::query::{cmp_text, contains_ci, int_filter, text_filter, Listing, Predicate, RecordFilter, SortField};
use crate::service::{FieldRule, Format, ValidationRule};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

const NAME_RULE: ValidationRule = ValidationRule {
    required: true,
    max_length: Some(100),
    ..ValidationRule::NONE
};

const EMAIL_RULE: ValidationRule = ValidationRule {
    required: true,
    max_length: Some(120),
    format: Some(Format::Email),
    ..ValidationRule::NONE
};

const REFERENCE_RULE: ValidationRule = ValidationRule {
    required: true,
    minimum: Some(1),
    ..ValidationRule::NONE
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewTeacher {
    pub name: String,
    pub email: String,
}

pub const TEACHER_RULES: &[FieldRule] = &[
    FieldRule { field: "name", rule: NAME_RULE },
    FieldRule { field: "email", rule: EMAIL_RULE },
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TeacherSort {
    #[default]
    Id,
    Name,
    Email,
}

impl SortField for TeacherSort {
    const ALLOWED: &'static [Self] = &[TeacherSort::Id, TeacherSort::Name, TeacherSort::Email];

    fn name(self) -> &'static str {
        match self {
            TeacherSort::Id => "id",
            TeacherSort::Name => "name",
            TeacherSort::Email => "email",
        }
    }

    fn column(self) -> &'static str {
        self.name()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TeacherFilter {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl RecordFilter<Teacher> for TeacherFilter {
    fn from_params(params: &HashMap<String, String>) -> Self {
        TeacherFilter {
            name: text_filter(params, "name"),
            email: text_filter(params, "email"),
        }
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(name) = &self.name {
            out.push(Predicate::contains("name", name));
        }
        if let Some(email) = &self.email {
            out.push(Predicate::contains("email", email));
        }
        out
    }

    fn matches(&self, t: &Teacher) -> bool {
        self.name.as_deref().map_or(true, |n| contains_ci(&t.name, n))
            && self.email.as_deref().map_or(true, |e| contains_ci(&t.email, e))
    }
}

impl Listing for Teacher {
    type Sort = TeacherSort;
    type Filter = TeacherFilter;

    const TABLE: &'static str = "teachers";
    const COLUMNS: &'static [&'static str] = &["id", "name", "email"];

    fn id(&self) -> i64 {
        self.id
    }

    fn compare_by(&self, other: &Self, sort: TeacherSort) -> Ordering {
        match sort {
            TeacherSort::Id => self.id.cmp(&other.id),
            TeacherSort::Name => cmp_text(&self.name, &other.name),
            TeacherSort::Email => cmp_text(&self.email, &other.email),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub teacher_id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewCourse {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub teacher_id: i64,
}

pub const COURSE_RULES: &[FieldRule] = &[
    FieldRule { field: "name", rule: NAME_RULE },
    FieldRule {
        field: "teacher_id",
        rule: REFERENCE_RULE,
    },
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CourseSort {
    #[default]
    Id,
    Name,
    TeacherId,
}

impl SortField for CourseSort {
    const ALLOWED: &'static [Self] = &[CourseSort::Id, CourseSort::Name, CourseSort::TeacherId];

    fn name(self) -> &'static str {
        match self {
            CourseSort::Id => "id",
            CourseSort::Name => "name",
            CourseSort::TeacherId => "teacher_id",
        }
    }

    fn column(self) -> &'static str {
        self.name()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub name: Option<String>,
    pub teacher_id: Option<i64>,
}

impl RecordFilter<Course> for CourseFilter {
    fn from_params(params: &HashMap<String, String>) -> Self {
        CourseFilter {
            name: text_filter(params, "name"),
            teacher_id: int_filter(params, "teacher_id"),
        }
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(name) = &self.name {
            out.push(Predicate::contains("name", name));
        }
        if let Some(teacher_id) = self.teacher_id {
            out.push(Predicate::equals("teacher_id", teacher_id));
        }
        out
    }

    fn matches(&self, c: &Course) -> bool {
        self.name.as_deref().map_or(true, |n| contains_ci(&c.name, n))
            && self.teacher_id.map_or(true, |t| c.teacher_id == t)
    }
}

impl Listing for Course {
    type Sort = CourseSort;
    type Filter = CourseFilter;

    const TABLE: &'static str = "courses";
    const COLUMNS: &'static [&'static str] = &["id", "name", "description", "teacher_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn compare_by(&self, other: &Self, sort: CourseSort) -> Ordering {
        match sort {
            CourseSort::Id => self.id.cmp(&other.id),
            CourseSort::Name => cmp_text(&self.name, &other.name),
            CourseSort::TeacherId => self.teacher_id.cmp(&other.teacher_id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub course_id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub course_id: i64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StudentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub course_id: Option<i64>,
}

impl Student {
    pub fn apply(&mut self, patch: StudentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(course_id) = patch.course_id {
            self.course_id = course_id;
        }
    }
}

pub const STUDENT_RULES: &[FieldRule] = &[
    FieldRule { field: "name", rule: NAME_RULE },
    FieldRule { field: "email", rule: EMAIL_RULE },
    FieldRule {
        field: "course_id",
        rule: REFERENCE_RULE,
    },
];

/// Students list by name unless told otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StudentSort {
    Id,
    #[default]
    Name,
    Email,
    CourseId,
}

impl SortField for StudentSort {
    const ALLOWED: &'static [Self] = &[
        StudentSort::Id,
        StudentSort::Name,
        StudentSort::Email,
        StudentSort::CourseId,
    ];

    fn name(self) -> &'static str {
        match self {
            StudentSort::Id => "id",
            StudentSort::Name => "name",
            StudentSort::Email => "email",
            StudentSort::CourseId => "course_id",
        }
    }

    fn column(self) -> &'static str {
        self.name()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course_id: Option<i64>,
}

impl RecordFilter<Student> for StudentFilter {
    fn from_params(params: &HashMap<String, String>) -> Self {
        StudentFilter {
            name: text_filter(params, "name"),
            email: text_filter(params, "email"),
            course_id: int_filter(params, "course_id"),
        }
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(name) = &self.name {
            out.push(Predicate::contains("name", name));
        }
        if let Some(email) = &self.email {
            out.push(Predicate::contains("email", email));
        }
        if let Some(course_id) = self.course_id {
            out.push(Predicate::equals("course_id", course_id));
        }
        out
    }

    fn matches(&self, s: &Student) -> bool {
        self.name.as_deref().map_or(true, |n| contains_ci(&s.name, n))
            && self.email.as_deref().map_or(true, |e| contains_ci(&s.email, e))
            && self.course_id.map_or(true, |c| s.course_id == c)
    }
}

impl Listing for Student {
    type Sort = StudentSort;
    type Filter = StudentFilter;

    const TABLE: &'static str = "students";
    const COLUMNS: &'static [&'static str] = &["id", "name", "email", "course_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn compare_by(&self, other: &Self, sort: StudentSort) -> Ordering {
        match sort {
            StudentSort::Id => self.id.cmp(&other.id),
            StudentSort::Name => cmp_text(&self.name, &other.name),
            StudentSort::Email => cmp_text(&self.email, &other.email),
            StudentSort::CourseId => self.course_id.cmp(&other.course_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn students_default_to_name_order() {
        assert_eq!(StudentSort::resolve(None), StudentSort::Name);
        assert_eq!(StudentSort::resolve(Some("password_hash")), StudentSort::Name);
        assert_eq!(StudentSort::resolve(Some("course_id")), StudentSort::CourseId);
    }

    #[test]
    fn teacher_name_filter_is_partial() {
        let params: HashMap<String, String> = [("name".to_string(), "john".to_string())].into_iter().collect();
        let filter = TeacherFilter::from_params(&params);
        let john = Teacher {
            id: 1,
            name: "John Smith".into(),
            email: "john@example.com".into(),
        };
        let alice = Teacher {
            id: 2,
            name: "Alice Johnson".into(),
            email: "alice@example.com".into(),
        };
        let bob = Teacher {
            id: 3,
            name: "Bob Stone".into(),
            email: "bob@example.com".into(),
        };
        assert!(filter.matches(&john));
        assert!(filter.matches(&alice));
        assert!(!filter.matches(&bob));
    }
}
