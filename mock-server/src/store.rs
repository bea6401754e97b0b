//! In-memory student table with soft delete, sorting and paging.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

const DEFAULT_CREATOR: i64 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub gender: String,
    pub phone: String,
    pub age: i64,
    pub native_place: Option<String>,
    pub major: String,
    pub email: Option<String>,
    pub tag: Option<String>,
    pub remark: Option<String>,
    pub create_time: Option<NaiveDateTime>,
    pub modify_time: Option<NaiveDateTime>,
    pub is_delete: i32,
    pub creator: Option<i64>,
}

/// Validated payload of a create or update.
#[derive(Clone, Debug)]
pub struct StudentFields {
    pub user_id: Option<i64>,
    pub name: String,
    pub gender: String,
    pub phone: String,
    pub age: i64,
    pub native_place: Option<String>,
    pub major: String,
    pub email: Option<String>,
    pub tag: Option<String>,
    pub remark: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Gender,
    Phone,
    Age,
    Major,
    CreateTime,
    ModifyTime,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "gender" => SortField::Gender,
            "phone" => SortField::Phone,
            "age" => SortField::Age,
            "major" => SortField::Major,
            "createTime" => SortField::CreateTime,
            "modifyTime" => SortField::ModifyTime,
            _ => return None,
        })
    }

    fn compare(self, a: &Student, b: &Student) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Gender => a.gender.cmp(&b.gender),
            SortField::Phone => a.phone.cmp(&b.phone),
            SortField::Age => a.age.cmp(&b.age),
            SortField::Major => a.major.cmp(&b.major),
            SortField::CreateTime => a.create_time.cmp(&b.create_time),
            SortField::ModifyTime => a.modify_time.cmp(&b.modify_time),
        }
    }
}

/// Which active rows a page draws from.
#[derive(Clone, Debug)]
pub enum Filter {
    All,
    Keyword(String),
    Name(String),
    Phone(String),
}

impl Filter {
    fn matches(&self, s: &Student) -> bool {
        fn contains(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
        match self {
            Filter::All => true,
            Filter::Keyword(k) => {
                contains(&s.name, k)
                    || contains(&s.phone, k)
                    || s.email.as_deref().is_some_and(|e| contains(e, k))
            }
            Filter::Name(n) => contains(&s.name, n),
            Filter::Phone(p) => contains(&s.phone, p),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub students: Vec<Student>,
    pub current_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

#[derive(Debug, Default)]
pub struct Store {
    rows: BTreeMap<i64, Student>,
    next_id: i64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    pub fn insert(&mut self, fields: StudentFields) -> Student {
        self.next_id += 1;
        let now = Self::now();
        let student = Student {
            id: self.next_id,
            user_id: fields.user_id,
            name: fields.name,
            gender: fields.gender,
            phone: fields.phone,
            age: fields.age,
            native_place: fields.native_place,
            major: fields.major,
            email: fields.email,
            tag: fields.tag,
            remark: fields.remark,
            create_time: Some(now),
            modify_time: Some(now),
            is_delete: 0,
            creator: Some(DEFAULT_CREATOR),
        };
        self.rows.insert(student.id, student.clone());
        student
    }

    /// Active (not soft-deleted) row by id.
    pub fn get(&self, id: i64) -> Option<&Student> {
        self.rows.get(&id).filter(|s| s.is_delete == 0)
    }

    /// Full replacement of the editable fields; identity, creation time,
    /// creator and delete flag are kept.
    pub fn replace(&mut self, id: i64, fields: StudentFields) -> Option<Student> {
        let row = self.rows.get_mut(&id).filter(|s| s.is_delete == 0)?;
        row.user_id = fields.user_id;
        row.name = fields.name;
        row.gender = fields.gender;
        row.phone = fields.phone;
        row.age = fields.age;
        row.native_place = fields.native_place;
        row.major = fields.major;
        row.email = fields.email;
        row.tag = fields.tag;
        row.remark = fields.remark;
        row.modify_time = Some(Self::now());
        Some(row.clone())
    }

    /// Flag the row deleted. Returns false when it is missing or already gone.
    pub fn soft_delete(&mut self, id: i64) -> bool {
        match self.rows.get_mut(&id).filter(|s| s.is_delete == 0) {
            Some(row) => {
                row.is_delete = 1;
                row.modify_time = Some(Self::now());
                true
            }
            None => false,
        }
    }

    pub fn page(
        &self,
        filter: &Filter,
        sort: SortField,
        descending: bool,
        page: u32,
        size: u32,
    ) -> Page {
        let mut matching: Vec<&Student> = self
            .rows
            .values()
            .filter(|s| s.is_delete == 0 && filter.matches(s))
            .collect();
        matching.sort_by(|a, b| {
            let ord = sort.compare(a, b);
            let ord = if descending { ord.reverse() } else { ord };
            ord.then(a.id.cmp(&b.id))
        });

        let total_items = matching.len() as u64;
        let total_pages = total_items.div_ceil(size as u64) as u32;
        let students = matching
            .into_iter()
            .skip(page as usize * size as usize)
            .take(size as usize)
            .cloned()
            .collect();
        Page {
            students,
            current_page: page,
            total_items,
            total_pages,
        }
    }
}
