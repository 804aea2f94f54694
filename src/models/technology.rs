#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Technology {
    pub id: i32,
    pub name: String,
    pub category: String,
}
