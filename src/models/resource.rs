#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Resource {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub kind: String,
    pub url: String,
}

text_enum! {
    ResourceKind {
        Document => ("document", "Document"),
        Link => ("link", "Link"),
        Design => ("design", "Design"),
        Repository => ("repository", "Repository"),
    }
}
