//! Terminal rendering of students and pages.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use student_core::view::ListView;
use student_core::{PageResponse, Student, StudentQuery};

const EMPTY: &str = "-";

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|l| {
            Cell::new(l)
                .set_alignment(CellAlignment::Center)
                .add_attribute(Attribute::Bold)
        })
        .collect()
}

fn styled() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or(EMPTY)
}

pub fn student_table(students: &[Student]) -> Table {
    let mut table = styled();
    table.set_header(header(&["ID", "Name", "Gender", "Phone", "Age", "Major", "Email"]));
    for s in students {
        table.add_row(vec![
            Cell::new(s.id).set_alignment(CellAlignment::Right),
            Cell::new(&s.name),
            Cell::new(s.gender).set_alignment(CellAlignment::Center),
            Cell::new(&s.phone),
            Cell::new(s.age).set_alignment(CellAlignment::Right),
            Cell::new(&s.major),
            Cell::new(opt(&s.email)),
        ]);
    }
    table
}

/// "Page 2 of 3 (25 students)"; an empty collection reads as page 1 of 1.
pub fn page_footer(current_page: u32, total_pages: u32, total_items: u64) -> String {
    format!(
        "Page {} of {} ({} students)",
        current_page + 1,
        total_pages.max(1),
        total_items
    )
}

pub fn page(page: &PageResponse<Student>) -> String {
    listing(&page.items, page.current_page, page.total_pages, page.total_items)
}

pub fn list_view(view: &ListView) -> String {
    let mut out = listing(
        view.students(),
        view.current_page(),
        view.total_pages(),
        view.total_items(),
    );
    if let StudentQuery::Keyword(t) | StudentQuery::Name(t) | StudentQuery::Phone(t) = view.query() {
        out.push_str(&format!(" matching \"{t}\""));
    }
    out
}

fn listing(students: &[Student], current_page: u32, total_pages: u32, total_items: u64) -> String {
    let footer = page_footer(current_page, total_pages, total_items);
    if students.is_empty() {
        return format!("No students found.\n{footer}");
    }
    format!("{}\n{footer}", student_table(students))
}

pub fn detail(s: &Student) -> String {
    let mut table = styled();
    table.set_header(header(&["Field", "Value"]));
    let time = |t: &Option<chrono::NaiveDateTime>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| EMPTY.to_string())
    };
    let rows: [(&str, String); 12] = [
        ("ID", s.id.to_string()),
        ("Name", s.name.clone()),
        ("Gender", s.gender.to_string()),
        ("Phone", s.phone.clone()),
        ("Age", s.age.to_string()),
        ("Native place", opt(&s.native_place).to_string()),
        ("Major", s.major.clone()),
        ("Email", opt(&s.email).to_string()),
        ("Tag", opt(&s.tag).to_string()),
        ("Remark", opt(&s.remark).to_string()),
        ("Created", time(&s.create_time)),
        ("Modified", time(&s.modify_time)),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table.to_string()
}
