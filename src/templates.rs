use askama::Template;

use crate::render::Row;

#[derive(Template)]
#[template(path = "user_table.html")]
pub struct UserTableTemplate<'a> {
    pub element_id: &'a str,
    pub header: Option<&'a Row>,
    pub body: &'a [Row],
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub user_count: usize,
    pub rendered_at: String,
    /// Pre-rendered, already escaped table markup.
    pub table_html: String,
}
