//! Question likes (`question_likes`).

use crate::core::question::RankedQuestion;
use crate::core::record::{self, Record};
use crate::core::{Question, User};
use crate::db::Connection;
use crate::error::Result;
use rusqlite::Row;
use rusqlite::types::Value;
use serde::Deserialize;

/// A user liking a question. `author_id` always mirrors the liked question's
/// author.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Like {
    #[serde(default)]
    pub id: Option<i64>,
    pub liker_id: i64,
    pub question_id: i64,
    #[serde(default)]
    pub author_id: Option<i64>,
}

impl Record for Like {
    const ENTITY: &'static str = "Like";
    const TABLE: &'static str = "question_likes";
    const COLUMNS: &'static [&'static str] = &["liker_id", "question_id", "author_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            liker_id: row.get("liker_id")?,
            question_id: row.get("question_id")?,
            author_id: row.get("author_id")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.liker_id.into(),
            self.question_id.into(),
            self.author_id.into(),
        ]
    }

    /// Takes `author_id` from the liked question, whatever the caller set.
    fn create(&mut self, conn: &Connection) -> Result<i64> {
        if self.id.is_none() {
            self.author_id = question_author(conn, self.question_id)?;
        }
        record::insert(conn, self)
    }

    /// Stores the liked question's author, whatever `author_id` holds.
    fn update(&self, conn: &Connection) -> Result<()> {
        let like = Like {
            author_id: question_author(conn, self.question_id)?,
            ..self.clone()
        };
        record::update_row(conn, &like)
    }
}

fn question_author(conn: &Connection, question_id: i64) -> Result<Option<i64>> {
    Ok(Question::find_by_id(conn, question_id)?.map(|q| q.author_id))
}

impl Like {
    pub fn new(liker_id: i64, question_id: i64) -> Self {
        Self {
            id: None,
            liker_id,
            question_id,
            author_id: None,
        }
    }

    pub fn likers_for_question_id(conn: &Connection, question_id: i64) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users
             JOIN question_likes ON question_likes.liker_id = users.id
             WHERE question_likes.question_id = ?1
             ORDER BY users.id",
            record::select_list::<User>()
        );
        conn.query(&sql, [question_id], User::from_row)
    }

    pub fn num_likes_for_question_id(conn: &Connection, question_id: i64) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM question_likes WHERE question_id = ?1",
            [question_id],
            |row| row.get(0),
        )?;
        Ok(count.unwrap_or(0))
    }

    pub fn liked_questions_for_user_id(conn: &Connection, user_id: i64) -> Result<Vec<Question>> {
        let sql = format!(
            "SELECT {} FROM questions
             JOIN question_likes ON question_likes.question_id = questions.id
             WHERE question_likes.liker_id = ?1
             ORDER BY questions.id",
            record::select_list::<Question>()
        );
        conn.query(&sql, [user_id], Question::from_row)
    }

    /// Questions ranked by like count, highest first; equal counts keep id
    /// order. Unliked questions are left out.
    pub fn most_liked_questions(conn: &Connection, n: u32) -> Result<Vec<RankedQuestion>> {
        let sql = format!(
            "SELECT {}, COUNT(question_likes.id) AS total
             FROM questions
             JOIN question_likes ON questions.id = question_likes.question_id
             GROUP BY questions.id
             ORDER BY total DESC, questions.id ASC
             LIMIT ?1",
            record::select_list::<Question>()
        );
        conn.query(&sql, [i64::from(n)], RankedQuestion::from_row)
    }
}
