//! Question follows (`question_followers`).

use crate::core::question::RankedQuestion;
use crate::core::record::{self, Record};
use crate::core::{Question, User};
use crate::db::Connection;
use crate::error::Result;
use rusqlite::Row;
use rusqlite::types::Value;
use serde::Deserialize;

/// A user following a question.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Follow {
    #[serde(default)]
    pub id: Option<i64>,
    pub follower_id: i64,
    pub question_id: i64,
}

impl Record for Follow {
    const ENTITY: &'static str = "Follow";
    const TABLE: &'static str = "question_followers";
    const COLUMNS: &'static [&'static str] = &["follower_id", "question_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            follower_id: row.get("follower_id")?,
            question_id: row.get("question_id")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![self.follower_id.into(), self.question_id.into()]
    }
}

impl Follow {
    pub fn new(follower_id: i64, question_id: i64) -> Self {
        Self {
            id: None,
            follower_id,
            question_id,
        }
    }

    pub fn followers_for_question_id(conn: &Connection, question_id: i64) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users
             JOIN question_followers ON question_followers.follower_id = users.id
             WHERE question_followers.question_id = ?1
             ORDER BY users.id",
            record::select_list::<User>()
        );
        conn.query(&sql, [question_id], User::from_row)
    }

    pub fn followed_questions_for_user_id(conn: &Connection, user_id: i64) -> Result<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM questions
             JOIN question_followers ON question_followers.question_id = questions.id
             WHERE question_followers.follower_id = ?1
             ORDER BY questions.id",
            record::select_list::<Question>()
        );
        conn.query(&sql, [user_id], Question::from_row)
    }

    pub fn num_followers_for_question_id(conn: &Connection, question_id: i64) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM question_followers WHERE question_id = ?1",
            [question_id],
            |row| row.get(0),
        )?;
        Ok(count.unwrap_or(0))
    }

    /// Questions ranked by follower count, highest first; equal counts keep
    /// id order. Unfollowed questions are left out.
    pub fn most_followed_questions(conn: &Connection, n: u32) -> Result<Vec<RankedQuestion>> {
        let sql = format!(
            "SELECT {}, COUNT(question_followers.id) AS total
             FROM questions
             JOIN question_followers ON questions.id = question_followers.question_id
             GROUP BY questions.id
             ORDER BY total DESC, questions.id ASC
             LIMIT ?1",
            record::select_list::<Question>()
        );
        conn.query(&sql, [i64::from(n)], RankedQuestion::from_row)
    }
}
