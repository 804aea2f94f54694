#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub notes: Option<String>,
}
