use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Vote {
    pub id: i32,
    pub user_id: i32,
    pub question_id: i32,
    pub choice_id: i32,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub user_id: i32,
    pub question_id: i32,
    pub choice_id: i32,
}

pub static NO_CHOICE_MESSAGE: &str = "вы не сделали выбор";
