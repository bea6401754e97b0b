//! Domain DTOs for the student API.
//!
//! # Design
//! `Student` is the server's canonical record: it always carries an `id`
//! and may carry server-managed metadata. `StudentInput` is what the client
//! sends (and what a form edits): it has no `id` field at all, so a create
//! payload can never smuggle one in. Update targets an id passed separately.
//!
//! These types are defined independently from the mock-server crate;
//! integration tests catch schema drift between the two.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Program names a student may be enrolled in. The first entry is the
/// default for new drafts.
pub const MAJORS: [&str; 6] = [
    "计算机",
    "土木工程",
    "理学院",
    "工商管理",
    "电子信息",
    "自动化",
];

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SORT: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    #[serde(rename = "男")]
    Male,
    #[serde(rename = "女")]
    Female,
    #[serde(rename = "其他")]
    Other,
    /// A label outside the three known ones, as stored by an older or more
    /// permissive server. Never valid in a draft.
    #[serde(other)]
    Unknown,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
            Gender::Other => "其他",
            Gender::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "男" | "male" | "m" => Ok(Gender::Male),
            "女" | "female" | "f" => Ok(Gender::Female),
            "其他" | "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// A student record as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub name: String,
    pub gender: Gender,
    pub phone: String,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_place: Option<String>,
    pub major: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_delete: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<i64>,
}

impl Student {
    /// Copy the editable fields into a draft, dropping identity and metadata.
    pub fn to_input(&self) -> StudentInput {
        StudentInput {
            user_id: self.user_id,
            name: self.name.clone(),
            gender: self.gender,
            phone: self.phone.clone(),
            age: self.age,
            native_place: self.native_place.clone(),
            major: self.major.clone(),
            email: self.email.clone(),
            tag: self.tag.clone(),
            remark: self.remark.clone(),
        }
    }

    pub fn is_soft_deleted(&self) -> bool {
        self.is_delete.unwrap_or(0) != 0
    }
}

/// Request payload for create and update, and the draft a form edits.
///
/// Update has full-replacement semantics: every field is sent, and an
/// absent optional field clears the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub name: String,
    pub gender: Gender,
    pub phone: String,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_place: Option<String>,
    pub major: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl Default for StudentInput {
    fn default() -> Self {
        Self {
            user_id: None,
            name: String::new(),
            gender: Gender::Male,
            phone: String::new(),
            age: 18,
            native_place: None,
            major: MAJORS[0].to_string(),
            email: None,
            tag: None,
            remark: None,
        }
    }
}

/// A page of results plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    #[serde(rename = "students")]
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.current_page + 1 < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 0
    }

    /// Whether the envelope satisfies the pagination invariants for a
    /// request of page size `size`.
    pub fn is_consistent(&self, size: u32) -> bool {
        if self.items.len() > size as usize {
            return false;
        }
        if self.total_items == 0 {
            return self.current_page == 0 && self.total_pages <= 1;
        }
        self.current_page < self.total_pages
    }
}

/// Zero-based page index plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn first(size: u32) -> Self {
        Self { page: 0, size }
    }

    pub fn with_page(self, page: u32) -> Self {
        Self { page, ..self }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Parameters of the unfiltered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: PageRequest,
    pub sort: String,
    pub order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: PageRequest::default(),
            sort: DEFAULT_SORT.to_string(),
            order: SortOrder::Asc,
        }
    }
}

/// Which collection a list view is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StudentQuery {
    #[default]
    All,
    Keyword(String),
    Name(String),
    Phone(String),
}

impl StudentQuery {
    /// Blank search terms collapse to `All`.
    pub fn normalized(self) -> Self {
        let blank = match &self {
            StudentQuery::All => false,
            StudentQuery::Keyword(t) | StudentQuery::Name(t) | StudentQuery::Phone(t) => {
                t.trim().is_empty()
            }
        };
        if blank {
            StudentQuery::All
        } else {
            self
        }
    }

    pub fn is_search(&self) -> bool {
        !matches!(self, StudentQuery::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_uses_display_labels_on_the_wire() {
        assert_eq!(serde_json::to_value(Gender::Female).unwrap(), "女");
        let g: Gender = serde_json::from_str(r#""其他""#).unwrap();
        assert_eq!(g, Gender::Other);
        let g: Gender = serde_json::from_str(r#""male""#).unwrap();
        assert_eq!(g, Gender::Unknown);
        assert!("unknown".parse::<Gender>().is_err());
    }

    #[test]
    fn student_parses_server_record_with_metadata() {
        let raw = r#"{
            "id": 7, "userId": null, "name": "张三", "gender": "男",
            "phone": "1234567890", "age": 20, "nativePlace": null,
            "major": "计算机", "email": "a@b.cn", "tag": null, "remark": null,
            "createTime": "2024-03-01T08:30:00", "modifyTime": "2024-03-01T08:30:00.123",
            "isDelete": 0, "creator": 1
        }"#;
        let student: Student = serde_json::from_str(raw).unwrap();
        assert_eq!(student.id, 7);
        assert_eq!(student.email.as_deref(), Some("a@b.cn"));
        assert!(student.create_time.is_some());
        assert!(!student.is_soft_deleted());
    }

    #[test]
    fn input_serializes_camel_case_without_id() {
        let input = StudentInput {
            native_place: Some("北京".to_string()),
            ..StudentInput::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["nativePlace"], "北京");
        assert_eq!(json["gender"], "男");
        assert_eq!(json["age"], 18);
        assert_eq!(json["major"], "计算机");
        assert!(json.get("email").is_none());
    }

    #[test]
    fn to_input_keeps_editable_fields() {
        let raw = r#"{"id":3,"name":"李四","gender":"女","phone":"139","age":21,"major":"自动化","remark":"r","isDelete":0}"#;
        let student: Student = serde_json::from_str(raw).unwrap();
        let input = student.to_input();
        assert_eq!(input.name, "李四");
        assert_eq!(input.gender, Gender::Female);
        assert_eq!(input.remark.as_deref(), Some("r"));
    }

    #[test]
    fn page_envelope_uses_students_key() {
        let raw = r#"{"students":[],"currentPage":0,"totalItems":0,"totalPages":0}"#;
        let page: PageResponse<Student> = serde_json::from_str(raw).unwrap();
        assert!(page.is_empty());
        assert!(page.is_consistent(10));
        assert!(!page.has_next());
    }

    #[test]
    fn page_consistency_rules() {
        let page = PageResponse {
            items: vec![1, 2],
            current_page: 1,
            total_items: 12,
            total_pages: 2,
        };
        assert!(page.is_consistent(10));
        assert!(page.has_previous());
        assert!(!page.has_next());
        assert!(!page.is_consistent(1));

        let past_end = PageResponse::<i32> {
            items: vec![],
            current_page: 5,
            total_items: 12,
            total_pages: 2,
        };
        assert!(!past_end.is_consistent(10));
    }

    #[test]
    fn blank_search_normalizes_to_all() {
        assert_eq!(
            StudentQuery::Keyword("  ".to_string()).normalized(),
            StudentQuery::All
        );
        assert_eq!(
            StudentQuery::Phone("138".to_string()).normalized(),
            StudentQuery::Phone("138".to_string())
        );
    }
}
