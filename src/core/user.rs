//! User record and its relationships.

use crate::core::record::{self, Record};
use crate::core::{Follow, Like, Question, Reply};
use crate::db::Connection;
use crate::error::Result;
use rusqlite::Row;
use rusqlite::types::Value;
use serde::Deserialize;

/// A person who asks, answers, follows and likes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    pub fname: String,
    pub lname: String,
}

impl Record for User {
    const ENTITY: &'static str = "User";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["fname", "lname"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            fname: row.get("fname")?,
            lname: row.get("lname")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![self.fname.clone().into(), self.lname.clone().into()]
    }
}

impl User {
    /// New, unsaved user.
    pub fn new(fname: impl Into<String>, lname: impl Into<String>) -> Self {
        Self {
            id: None,
            fname: fname.into(),
            lname: lname.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.fname, self.lname)
    }

    /// First user (lowest id) with exactly this name.
    pub fn find_by_name(conn: &Connection, fname: &str, lname: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE users.fname = ?1 AND users.lname = ?2
             ORDER BY users.id LIMIT 1",
            record::select_list::<User>()
        );
        conn.query_row(&sql, [fname, lname], User::from_row)
    }

    pub fn authored_questions(&self, conn: &Connection) -> Result<Vec<Question>> {
        Question::find_by_author_id(conn, self.persisted_id()?)
    }

    pub fn authored_replies(&self, conn: &Connection) -> Result<Vec<Reply>> {
        Reply::find_by_user_id(conn, self.persisted_id()?)
    }

    pub fn followed_questions(&self, conn: &Connection) -> Result<Vec<Question>> {
        Follow::followed_questions_for_user_id(conn, self.persisted_id()?)
    }

    pub fn liked_questions(&self, conn: &Connection) -> Result<Vec<Question>> {
        Like::liked_questions_for_user_id(conn, self.persisted_id()?)
    }

    /// Likes received across this user's questions divided by the number of
    /// questions they authored. `0.0` for a user who asked nothing.
    pub fn average_karma(&self, conn: &Connection) -> Result<f64> {
        let karma: Option<Option<f64>> = conn.query_row(
            "SELECT CAST(COUNT(question_likes.id) AS REAL) / COUNT(DISTINCT questions.id)
             FROM questions
             LEFT OUTER JOIN question_likes ON questions.id = question_likes.question_id
             WHERE questions.author_id = ?1",
            [self.persisted_id()?],
            |row| row.get(0),
        )?;
        Ok(karma.flatten().unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Schema;
    use crate::error::Error;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        Schema::init(&conn).unwrap();
        conn
    }

    fn user(conn: &Connection, fname: &str, lname: &str) -> User {
        let mut u = User::new(fname, lname);
        u.create(conn).unwrap();
        u
    }

    fn question(conn: &Connection, author: &User, title: &str) -> Question {
        let mut q = Question::new(title, "body", author.id.unwrap());
        q.create(conn).unwrap();
        q
    }

    #[test]
    fn test_create_first_user() {
        let conn = setup();
        let ada = user(&conn, "Ada", "Lovelace");
        assert_eq!(ada.id, Some(1));
        assert_eq!(ada.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_find_by_name() {
        let conn = setup();
        user(&conn, "Ada", "Lovelace");
        let grace = user(&conn, "Grace", "Hopper");

        let found = User::find_by_name(&conn, "Grace", "Hopper").unwrap();
        assert_eq!(found, Some(grace));
        assert!(User::find_by_name(&conn, "Alan", "Turing").unwrap().is_none());
    }

    #[test]
    fn test_authored_questions() {
        let conn = setup();
        let ada = user(&conn, "Ada", "Lovelace");
        let grace = user(&conn, "Grace", "Hopper");
        let q1 = question(&conn, &ada, "Q1");
        question(&conn, &grace, "Q2");
        let q3 = question(&conn, &ada, "Q3");

        assert_eq!(ada.authored_questions(&conn).unwrap(), vec![q1, q3]);
    }

    #[test]
    fn test_relationships_empty() {
        let conn = setup();
        let ada = user(&conn, "Ada", "Lovelace");

        assert!(ada.authored_questions(&conn).unwrap().is_empty());
        assert!(ada.authored_replies(&conn).unwrap().is_empty());
        assert!(ada.followed_questions(&conn).unwrap().is_empty());
        assert!(ada.liked_questions(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_relationships_require_persisted_user() {
        let conn = setup();
        let ghost = User::new("No", "Body");
        assert!(matches!(
            ghost.followed_questions(&conn).unwrap_err(),
            Error::NotPersisted { entity: "User" }
        ));
    }

    #[test]
    fn test_followed_and_liked_questions() {
        let conn = setup();
        let ada = user(&conn, "Ada", "Lovelace");
        let grace = user(&conn, "Grace", "Hopper");
        let q1 = question(&conn, &ada, "Q1");
        let q2 = question(&conn, &ada, "Q2");

        Follow::new(grace.id.unwrap(), q2.id.unwrap())
            .create(&conn)
            .unwrap();
        Like::new(grace.id.unwrap(), q1.id.unwrap())
            .create(&conn)
            .unwrap();

        assert_eq!(grace.followed_questions(&conn).unwrap(), vec![q2]);
        assert_eq!(grace.liked_questions(&conn).unwrap(), vec![q1]);
    }

    #[test]
    fn test_authored_replies() {
        let conn = setup();
        let ada = user(&conn, "Ada", "Lovelace");
        let grace = user(&conn, "Grace", "Hopper");
        let q = question(&conn, &ada, "Q1");

        let mut r = Reply::new(q.id.unwrap(), grace.id.unwrap(), "answer");
        r.create(&conn).unwrap();

        assert_eq!(grace.authored_replies(&conn).unwrap(), vec![r]);
        assert!(ada.authored_replies(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_average_karma() {
        let conn = setup();
        let ada = user(&conn, "Ada", "Lovelace");
        let grace = user(&conn, "Grace", "Hopper");
        let alan = user(&conn, "Alan", "Turing");
        let q1 = question(&conn, &ada, "Q1");
        question(&conn, &ada, "Q2");

        for liker in [&grace, &alan] {
            Like::new(liker.id.unwrap(), q1.id.unwrap())
                .create(&conn)
                .unwrap();
        }
        Like::new(grace.id.unwrap(), 2).create(&conn).unwrap();

        // three likes over two questions
        assert_eq!(ada.average_karma(&conn).unwrap(), 1.5);
    }

    #[test]
    fn test_average_karma_without_likes_or_questions() {
        let conn = setup();
        let ada = user(&conn, "Ada", "Lovelace");
        assert_eq!(ada.average_karma(&conn).unwrap(), 0.0);

        question(&conn, &ada, "Q1");
        assert_eq!(ada.average_karma(&conn).unwrap(), 0.0);
    }
}
