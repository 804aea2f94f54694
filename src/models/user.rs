#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
}

text_enum! {
    UserRole {
        Admin => ("admin", "Admin"),
        Manager => ("manager", "Manager"),
        Member => ("member", "Member"),
    }
}
