//! Command-line definition for the `students` binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use student_core::{Field, SortOrder};

use crate::config::Overrides;

/// Manage student records on a student-records server
#[derive(Parser, Debug)]
#[command(name = "students", version)]
pub struct Cli {
    /// Server base URL, e.g. http://localhost:8080/api
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Rows per page
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            page_size: self.page_size,
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List students one page at a time
    List {
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Sort field (id, name, age, createTime, ...)
        #[arg(long, default_value = "id")]
        sort: String,

        #[arg(long, value_enum, default_value_t = Order::Asc)]
        order: Order,
    },

    /// Search by keyword, name or phone
    Search {
        keyword: String,

        #[arg(long, value_enum, default_value_t = SearchBy::Any)]
        by: SearchBy,

        #[arg(long, default_value_t = 0)]
        page: u32,
    },

    /// Show one student
    Show { id: i64 },

    /// Create a student
    Create(CreateArgs),

    /// Replace a student's fields; unspecified fields keep their value
    Edit {
        id: i64,

        #[command(flatten)]
        fields: StudentFields,
    },

    /// Delete a student
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Interactive paged browser
    Browse,

    /// Print the effective configuration
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortOrder::Asc,
            Order::Desc => SortOrder::Desc,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchBy {
    /// Name, phone or email
    Any,
    Name,
    Phone,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    /// 男, 女, 其他 (or male, female, other)
    #[arg(long)]
    pub gender: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub age: String,

    #[arg(long)]
    pub major: String,

    #[command(flatten)]
    pub optional: OptionalFields,
}

#[derive(Args, Debug, Default)]
pub struct OptionalFields {
    #[arg(long)]
    pub native_place: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub tag: Option<String>,

    #[arg(long)]
    pub remark: Option<String>,
}

/// Every field as an optional flag, for edits.
#[derive(Args, Debug, Default)]
pub struct StudentFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub age: Option<String>,

    #[arg(long)]
    pub major: Option<String>,

    #[command(flatten)]
    pub optional: OptionalFields,
}

/// The long flag that sets `field`, without the leading dashes.
pub fn flag_name(field: Field) -> &'static str {
    match field {
        Field::Name => "name",
        Field::Gender => "gender",
        Field::Phone => "phone",
        Field::Age => "age",
        Field::NativePlace => "native-place",
        Field::Major => "major",
        Field::Email => "email",
        Field::Tag => "tag",
        Field::Remark => "remark",
    }
}

impl OptionalFields {
    fn push_into(&self, out: &mut Vec<(Field, String)>) {
        let pairs = [
            (Field::NativePlace, &self.native_place),
            (Field::Email, &self.email),
            (Field::Tag, &self.tag),
            (Field::Remark, &self.remark),
        ];
        out.extend(
            pairs
                .into_iter()
                .filter_map(|(field, value)| value.clone().map(|v| (field, v))),
        );
    }
}

impl CreateArgs {
    pub fn assignments(&self) -> Vec<(Field, String)> {
        let mut out = vec![
            (Field::Name, self.name.clone()),
            (Field::Gender, self.gender.clone()),
            (Field::Phone, self.phone.clone()),
            (Field::Age, self.age.clone()),
            (Field::Major, self.major.clone()),
        ];
        self.optional.push_into(&mut out);
        out
    }
}

impl StudentFields {
    /// Only the flags that were given. An empty string clears an optional field.
    pub fn assignments(&self) -> Vec<(Field, String)> {
        let required = [
            (Field::Name, &self.name),
            (Field::Gender, &self.gender),
            (Field::Phone, &self.phone),
            (Field::Age, &self.age),
            (Field::Major, &self.major),
        ];
        let mut out: Vec<(Field, String)> = required
            .into_iter()
            .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
            .collect();
        self.optional.push_into(&mut out);
        out
    }
}
