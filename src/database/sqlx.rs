use crate::core::models::{
    choice::{Choice, Insert as ChoiceInsert},
    question::{Insert as QuestionInsert, Query as QuestionQuery, Question},
    user::{Insert as UserInsert, Patch as UserPatch, User},
    vote::{Insert as VoteInsert, Vote},
};
use crate::core::ports::repository::{ChoiceCommon, Common, QuestionCommon, Store, TxStore, UserCommon, VoteCommon};
use crate::error::Error;
use sqlx::pool::PoolConnection;
use sqlx::{query, query_as, query_scalar, Executor, PgPool, Postgres, QueryBuilder, Transaction};

pub struct PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    executor: E,
}

impl<E> PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E> UserCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO users (username, email, password, salt, avatar) VALUES ($1, $2, $3, $4, $5) RETURNING id")
            .bind(user.username)
            .bind(user.email)
            .bind(user.password)
            .bind(user.salt)
            .bind(user.avatar)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(&mut self.executor).await?;
        Ok(user)
    }

    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(user)
    }

    async fn exists_username(&mut self, username: &str, exclude_id: Option<i32>) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM users WHERE username = $1 AND ($2::INT IS NULL OR id <> $2))")
            .bind(username)
            .bind(exclude_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn patch(&mut self, id: i32, patch: UserPatch) -> Result<(), Error> {
        query(
            "
        UPDATE users
        SET username = COALESCE($1, username),
            email = COALESCE($2, email),
            avatar = COALESCE($3, avatar)
        WHERE id = $4",
        )
        .bind(patch.username)
        .bind(patch.email)
        .bind(patch.avatar)
        .bind(id)
        .execute(&mut self.executor)
        .await?;
        Ok(())
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        query("DELETE FROM users WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }
}

fn push_question_filters(stmt: &mut QueryBuilder<'_, Postgres>, param: &QuestionQuery) {
    stmt.push(" WHERE 1 = 1");
    if let Some(id) = param.id_eq {
        stmt.push(" AND id = ").push_bind(id);
    }
    if let Some(now) = param.open_at {
        stmt.push(" AND (expires_at IS NULL OR expires_at > ").push_bind(now).push(")");
    }
}

impl<E> QuestionCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, question: QuestionInsert) -> Result<i32, Error> {
        let id = query_scalar(
            "
        INSERT INTO questions (question_text, question_description, picture, pub_date, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id",
        )
        .bind(question.question_text)
        .bind(question.question_description)
        .bind(question.picture)
        .bind(question.pub_date)
        .bind(question.expires_at)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(id)
    }

    async fn query(&mut self, param: &QuestionQuery) -> Result<Vec<Question>, Error> {
        let mut stmt = QueryBuilder::new("SELECT * FROM questions");
        push_question_filters(&mut stmt, param);
        stmt.push(" ORDER BY pub_date DESC, id DESC");
        let questions = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(questions)
    }

    async fn get(&mut self, param: &QuestionQuery) -> Result<Option<Question>, Error> {
        let mut stmt = QueryBuilder::new("SELECT * FROM questions");
        push_question_filters(&mut stmt, param);
        stmt.push(" LIMIT 1");
        let question = stmt.build_query_as().fetch_optional(&mut self.executor).await?;
        Ok(question)
    }
}

impl<E> ChoiceCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, choice: ChoiceInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO choices (question_id, choice_text) VALUES ($1, $2) RETURNING id")
            .bind(choice.question_id)
            .bind(choice.choice_text)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn query_by_question(&mut self, question_id: i32) -> Result<Vec<Choice>, Error> {
        let choices = query_as("SELECT * FROM choices WHERE question_id = $1 ORDER BY id")
            .bind(question_id)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(choices)
    }

    async fn get(&mut self, question_id: i32, id: i32) -> Result<Option<Choice>, Error> {
        let choice = query_as("SELECT * FROM choices WHERE question_id = $1 AND id = $2")
            .bind(question_id)
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(choice)
    }

    async fn increment(&mut self, id: i32) -> Result<(), Error> {
        query("UPDATE choices SET votes = votes + 1 WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }

    async fn decrement(&mut self, id: i32) -> Result<(), Error> {
        query("UPDATE choices SET votes = GREATEST(votes - 1, 0) WHERE id = $1")
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn decrement_for_user(&mut self, user_id: i32) -> Result<(), Error> {
        query(
            "
        UPDATE choices
        SET votes = GREATEST(votes - 1, 0)
        WHERE id IN (SELECT choice_id FROM votes WHERE user_id = $1)",
        )
        .bind(user_id)
        .execute(&mut self.executor)
        .await?;
        Ok(())
    }
}

impl<E> VoteCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, vote: VoteInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO votes (user_id, question_id, choice_id) VALUES ($1, $2, $3) RETURNING id")
            .bind(vote.user_id)
            .bind(vote.question_id)
            .bind(vote.choice_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get(&mut self, user_id: i32, question_id: i32) -> Result<Option<Vote>, Error> {
        let vote = query_as("SELECT * FROM votes WHERE user_id = $1 AND question_id = $2")
            .bind(user_id)
            .bind(question_id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(vote)
    }

    async fn get_for_update(&mut self, user_id: i32, question_id: i32) -> Result<Option<Vote>, Error> {
        let vote = query_as("SELECT * FROM votes WHERE user_id = $1 AND question_id = $2 FOR UPDATE")
            .bind(user_id)
            .bind(question_id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(vote)
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        query("DELETE FROM votes WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }
}

impl Common for PgSqlx<PoolConnection<Postgres>> {}
impl<'a> Common for PgSqlx<Transaction<'a, Postgres>> {}
impl Store for PgSqlx<PoolConnection<Postgres>> {}
impl<'a> Store for PgSqlx<Transaction<'a, Postgres>> {}

impl<'a> TxStore for PgSqlx<Transaction<'a, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.executor.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.executor.rollback().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgSqlxManager {
    pool: PgPool,
}

impl PgSqlxManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<PgSqlx<Transaction<'static, Postgres>>, Error> {
        let tx = self.pool.begin().await?;
        Ok(PgSqlx::new(tx))
    }

    pub async fn acquire(&self) -> Result<PgSqlx<PoolConnection<Postgres>>, Error> {
        let conn = self.pool.acquire().await?;
        Ok(PgSqlx::new(conn))
    }
}
