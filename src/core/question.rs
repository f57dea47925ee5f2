//! Question record, its relationships and rankings.

use crate::core::record::{self, Record};
use crate::core::{Follow, Like, Reply, User};
use crate::db::Connection;
use crate::error::Result;
use rusqlite::Row;
use rusqlite::types::Value;
use serde::Deserialize;

/// A question asked by a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub body: String,
    pub author_id: i64,
}

/// A question together with how many likes or follows it has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedQuestion {
    pub question: Question,
    pub count: i64,
}

impl RankedQuestion {
    /// Map a row of question columns plus a `total` count column.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            question: Question::from_row(row)?,
            count: row.get("total")?,
        })
    }
}

impl Record for Question {
    const ENTITY: &'static str = "Question";
    const TABLE: &'static str = "questions";
    const COLUMNS: &'static [&'static str] = &["title", "body", "author_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            body: row.get("body")?,
            author_id: row.get("author_id")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.title.clone().into(),
            self.body.clone().into(),
            self.author_id.into(),
        ]
    }
}

impl Question {
    /// New, unsaved question.
    pub fn new(title: impl Into<String>, body: impl Into<String>, author_id: i64) -> Self {
        Self {
            id: None,
            title: title.into(),
            body: body.into(),
            author_id,
        }
    }

    pub fn find_by_author_id(conn: &Connection, author_id: i64) -> Result<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM questions WHERE questions.author_id = ?1 ORDER BY questions.id",
            record::select_list::<Question>()
        );
        conn.query(&sql, [author_id], Question::from_row)
    }

    /// The user who asked this question.
    pub fn author(&self, conn: &Connection) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users
             WHERE users.id = (SELECT questions.author_id FROM questions WHERE questions.id = ?1)",
            record::select_list::<User>()
        );
        conn.query_row(&sql, [self.persisted_id()?], User::from_row)
    }

    pub fn followers(&self, conn: &Connection) -> Result<Vec<User>> {
        Follow::followers_for_question_id(conn, self.persisted_id()?)
    }

    pub fn num_followers(&self, conn: &Connection) -> Result<i64> {
        Follow::num_followers_for_question_id(conn, self.persisted_id()?)
    }

    pub fn likers(&self, conn: &Connection) -> Result<Vec<User>> {
        Like::likers_for_question_id(conn, self.persisted_id()?)
    }

    pub fn num_likes(&self, conn: &Connection) -> Result<i64> {
        Like::num_likes_for_question_id(conn, self.persisted_id()?)
    }

    pub fn replies(&self, conn: &Connection) -> Result<Vec<Reply>> {
        Reply::find_by_question_id(conn, self.persisted_id()?)
    }

    /// The `n` questions with the most likes.
    pub fn most_liked(conn: &Connection, n: u32) -> Result<Vec<RankedQuestion>> {
        Like::most_liked_questions(conn, n)
    }

    /// The `n` questions with the most followers.
    pub fn most_followed(conn: &Connection, n: u32) -> Result<Vec<RankedQuestion>> {
        Follow::most_followed_questions(conn, n)
    }
}
