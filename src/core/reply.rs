//! Reply record. Replies hang off a question and may answer another reply.

use crate::core::record::{self, Record};
use crate::core::{Question, User};
use crate::db::Connection;
use crate::error::{Error, Result};
use rusqlite::Row;
use rusqlite::types::Value;
use serde::Deserialize;

/// A reply to a question, optionally nested under a parent reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub id: Option<i64>,
    pub reply_text: String,
    pub question_id: i64,
    /// Parent reply; `None` for a top-level reply.
    #[serde(rename = "reply_id", default)]
    pub parent_id: Option<i64>,
    pub replier_id: i64,
}

impl Record for Reply {
    const ENTITY: &'static str = "Reply";
    const TABLE: &'static str = "replies";
    const COLUMNS: &'static [&'static str] =
        &["reply_text", "question_id", "reply_id", "replier_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            reply_text: row.get("reply_text")?,
            question_id: row.get("question_id")?,
            parent_id: row.get("reply_id")?,
            replier_id: row.get("replier_id")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.reply_text.clone().into(),
            self.question_id.into(),
            self.parent_id.into(),
            self.replier_id.into(),
        ]
    }

    /// Rejects a parent that would break the reply tree.
    fn create(&mut self, conn: &Connection) -> Result<i64> {
        if self.id.is_none() {
            self.check_thread(conn)?;
        }
        record::insert(conn, self)
    }

    fn update(&self, conn: &Connection) -> Result<()> {
        self.persisted_id()?;
        self.check_thread(conn)?;
        record::update_row(conn, self)
    }
}

impl Reply {
    /// New, unsaved top-level reply.
    pub fn new(question_id: i64, replier_id: i64, reply_text: impl Into<String>) -> Self {
        Self {
            id: None,
            reply_text: reply_text.into(),
            question_id,
            parent_id: None,
            replier_id,
        }
    }

    /// New, unsaved reply answering `parent`, on the same question.
    pub fn child_of(parent: &Reply, replier_id: i64, reply_text: impl Into<String>) -> Result<Self> {
        Ok(Self {
            parent_id: Some(parent.persisted_id()?),
            ..Self::new(parent.question_id, replier_id, reply_text)
        })
    }

    /// A parent must already exist, sit on the same question and not be one
    /// of this reply's own answers. A persisted reply also keeps its answers
    /// on its question.
    fn check_thread(&self, conn: &Connection) -> Result<()> {
        if let Some(id) = self.id {
            if Self::has_answers_elsewhere(conn, id, self.question_id)? {
                return Err(Error::AnswersOnOtherQuestion {
                    id,
                    question: self.question_id,
                });
            }
        }

        let Some(parent_id) = self.parent_id else {
            return Ok(());
        };
        if self.id == Some(parent_id) {
            return Err(Error::SelfParent(parent_id));
        }

        let parent = Reply::find_by_id(conn, parent_id)?.ok_or(Error::NotFound {
            entity: Self::ENTITY,
            id: parent_id,
        })?;
        if parent.question_id != self.question_id {
            return Err(Error::ParentOnOtherQuestion {
                parent: parent_id,
                parent_question: parent.question_id,
                question: self.question_id,
            });
        }

        if let Some(id) = self.id {
            if Self::in_thread_above(conn, id, parent_id)? {
                return Err(Error::ParentCycle {
                    id,
                    parent: parent_id,
                });
            }
        }
        Ok(())
    }

    /// Whether `id` is `reply_id` or one of its ancestors.
    fn in_thread_above(conn: &Connection, id: i64, reply_id: i64) -> Result<bool> {
        let found = conn.query_row(
            "WITH RECURSIVE chain(id, reply_id) AS (
                 SELECT id, reply_id FROM replies WHERE id = ?1
                 UNION
                 SELECT replies.id, replies.reply_id
                 FROM replies JOIN chain ON replies.id = chain.reply_id
             )
             SELECT EXISTS(SELECT 1 FROM chain WHERE id = ?2)",
            [reply_id, id],
            |row| row.get(0),
        )?;
        Ok(found.unwrap_or(false))
    }

    fn has_answers_elsewhere(conn: &Connection, id: i64, question_id: i64) -> Result<bool> {
        let found = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM replies WHERE reply_id = ?1 AND question_id != ?2)",
            [id, question_id],
            |row| row.get(0),
        )?;
        Ok(found.unwrap_or(false))
    }

    pub fn find_by_question_id(conn: &Connection, question_id: i64) -> Result<Vec<Reply>> {
        let sql = format!(
            "SELECT {} FROM replies WHERE replies.question_id = ?1 ORDER BY replies.id",
            record::select_list::<Reply>()
        );
        conn.query(&sql, [question_id], Reply::from_row)
    }

    pub fn find_by_user_id(conn: &Connection, user_id: i64) -> Result<Vec<Reply>> {
        let sql = format!(
            "SELECT {} FROM replies WHERE replies.replier_id = ?1 ORDER BY replies.id",
            record::select_list::<Reply>()
        );
        conn.query(&sql, [user_id], Reply::from_row)
    }

    /// The user who wrote this reply.
    pub fn author(&self, conn: &Connection) -> Result<Option<User>> {
        User::find_by_id(conn, self.replier_id)
    }

    /// The question this reply belongs to.
    pub fn question(&self, conn: &Connection) -> Result<Option<Question>> {
        Question::find_by_id(conn, self.question_id)
    }

    /// The reply this one answers. Only one level up.
    pub fn parent_reply(&self, conn: &Connection) -> Result<Option<Reply>> {
        match self.parent_id {
            Some(parent_id) => Reply::find_by_id(conn, parent_id),
            None => Ok(None),
        }
    }

    /// Direct answers to this reply. Grandchildren are not included.
    pub fn child_replies(&self, conn: &Connection) -> Result<Vec<Reply>> {
        let sql = format!(
            "SELECT {} FROM replies
             JOIN replies AS parent ON replies.reply_id = parent.id
             WHERE parent.id = ?1
             ORDER BY replies.id",
            record::select_list::<Reply>()
        );
        conn.query(&sql, [self.persisted_id()?], Reply::from_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Schema;
    use crate::error::Error;
    use serde_json::json;

    struct Fixture {
        conn: Connection,
        ada: User,
        grace: User,
        question: Question,
    }

    fn setup() -> Fixture {
        let conn = Connection::open_in_memory().unwrap();
        Schema::init(&conn).unwrap();
        let mut ada = User::new("Ada", "Lovelace");
        ada.create(&conn).unwrap();
        let mut grace = User::new("Grace", "Hopper");
        grace.create(&conn).unwrap();
        let mut question = Question::new("Q1", "...", ada.id.unwrap());
        question.create(&conn).unwrap();
        Fixture {
            conn,
            ada,
            grace,
            question,
        }
    }

    #[test]
    fn test_round_trip() {
        let f = setup();
        let mut r = Reply::new(f.question.id.unwrap(), f.grace.id.unwrap(), "try this");
        r.create(&f.conn).unwrap();
        assert_eq!(Reply::find_by_id(&f.conn, r.id.unwrap()).unwrap(), Some(r));
    }

    #[test]
    fn test_parent_and_children() {
        let f = setup();
        let mut r1 = Reply::new(f.question.id.unwrap(), f.grace.id.unwrap(), "first");
        r1.create(&f.conn).unwrap();
        let mut r2 = Reply::child_of(&r1, f.ada.id.unwrap(), "second").unwrap();
        r2.create(&f.conn).unwrap();

        assert_eq!(r2.question_id, r1.question_id);
        assert_eq!(r1.child_replies(&f.conn).unwrap(), vec![r2.clone()]);
        assert_eq!(r2.parent_reply(&f.conn).unwrap(), Some(r1.clone()));
        assert_eq!(r1.parent_reply(&f.conn).unwrap(), None);
        assert!(r2.child_replies(&f.conn).unwrap().is_empty());
    }

    #[test]
    fn test_child_replies_one_level_only() {
        let f = setup();
        let mut r1 = Reply::new(f.question.id.unwrap(), f.grace.id.unwrap(), "a");
        r1.create(&f.conn).unwrap();
        let mut r2 = Reply::child_of(&r1, f.ada.id.unwrap(), "b").unwrap();
        r2.create(&f.conn).unwrap();
        let mut r3 = Reply::child_of(&r2, f.grace.id.unwrap(), "c").unwrap();
        r3.create(&f.conn).unwrap();

        assert_eq!(r1.child_replies(&f.conn).unwrap(), vec![r2.clone()]);
        assert_eq!(r3.parent_reply(&f.conn).unwrap(), Some(r2));
    }

    #[test]
    fn test_child_of_unsaved_parent() {
        let f = setup();
        let parent = Reply::new(f.question.id.unwrap(), f.grace.id.unwrap(), "draft");
        assert!(matches!(
            Reply::child_of(&parent, f.ada.id.unwrap(), "child").unwrap_err(),
            Error::NotPersisted { entity: "Reply" }
        ));
    }

    #[test]
    fn test_question_and_author() {
        let f = setup();
        let mut r = Reply::new(f.question.id.unwrap(), f.grace.id.unwrap(), "hi");
        r.create(&f.conn).unwrap();

        assert_eq!(r.question(&f.conn).unwrap(), Some(f.question.clone()));
        assert_eq!(r.author(&f.conn).unwrap(), Some(f.grace.clone()));
    }

    #[test]
    fn test_find_by_user_id() {
        let f = setup();
        let mut mine = Reply::new(f.question.id.unwrap(), f.ada.id.unwrap(), "mine");
        mine.create(&f.conn).unwrap();
        Reply::new(f.question.id.unwrap(), f.grace.id.unwrap(), "theirs")
            .create(&f.conn)
            .unwrap();

        assert_eq!(
            Reply::find_by_user_id(&f.conn, f.ada.id.unwrap()).unwrap(),
            vec![mine]
        );
    }

    #[test]
    fn test_from_fields_uses_column_names() {
        let serde_json::Value::Object(fields) = json!({
            "id": 4,
            "reply_text": "hello",
            "question_id": 1,
            "reply_id": null,
            "replier_id": 2,
        }) else {
            unreachable!()
        };
        let reply = Reply::from_fields(fields).unwrap();
        assert_eq!(reply.id, Some(4));
        assert_eq!(reply.parent_id, None);
        assert_eq!(reply.replier_id, 2);
    }

    #[test]
    fn test_update_moves_reply() {
        let f = setup();
        let mut other = Question::new("Q2", "...", f.ada.id.unwrap());
        other.create(&f.conn).unwrap();
        let mut r = Reply::new(f.question.id.unwrap(), f.grace.id.unwrap(), "misplaced");
        r.create(&f.conn).unwrap();

        r.question_id = other.id.unwrap();
        r.update(&f.conn).unwrap();

        assert!(f.question.replies(&f.conn).unwrap().is_empty());
        assert_eq!(other.replies(&f.conn).unwrap(), vec![r]);
    }

    #[test]
    fn test_create_with_missing_parent_fails() {
        let f = setup();
        let mut r = Reply::new(f.question.id.unwrap(), f.ada.id.unwrap(), "loop");
        r.parent_id = Some(1);

        assert!(matches!(
            r.create(&f.conn).unwrap_err(),
            Error::NotFound {
                entity: "Reply",
                id: 1
            }
        ));
        assert_eq!(r.id, None);
        assert!(Reply::all(&f.conn).unwrap().is_empty());
    }

    #[test]
    fn test_create_with_parent_on_other_question_fails() {
        let f = setup();
        let mut other = Question::new("Q2", "...", f.ada.id.unwrap());
        other.create(&f.conn).unwrap();
        let mut r1 = Reply::new(f.question.id.unwrap(), f.grace.id.unwrap(), "first");
        r1.create(&f.conn).unwrap();

        let mut stray = Reply::new(other.id.unwrap(), f.ada.id.unwrap(), "stray");
        stray.parent_id = r1.id;
        assert!(matches!(
            stray.create(&f.conn).unwrap_err(),
            Error::ParentOnOtherQuestion {
                parent: 1,
                parent_question: 1,
                question: 2
            }
        ));
        assert!(r1.child_replies(&f.conn).unwrap().is_empty());
        assert!(other.replies(&f.conn).unwrap().is_empty());
    }

    #[test]
    fn test_update_self_parent_fails() {
        let f = setup();
        let mut r = Reply::new(f.question.id.unwrap(), f.ada.id.unwrap(), "me");
        r.create(&f.conn).unwrap();

        r.parent_id = r.id;
        assert!(matches!(
            r.update(&f.conn).unwrap_err(),
            Error::SelfParent(1)
        ));
        let stored = Reply::find_by_id(&f.conn, 1).unwrap().unwrap();
        assert_eq!(stored.parent_id, None);
    }

    #[test]
    fn test_update_parent_to_descendant_fails() {
        let f = setup();
        let mut r1 = Reply::new(f.question.id.unwrap(), f.grace.id.unwrap(), "a");
        r1.create(&f.conn).unwrap();
        let mut r2 = Reply::child_of(&r1, f.ada.id.unwrap(), "b").unwrap();
        r2.create(&f.conn).unwrap();
        let mut r3 = Reply::child_of(&r2, f.grace.id.unwrap(), "c").unwrap();
        r3.create(&f.conn).unwrap();

        r1.parent_id = r3.id;
        assert!(matches!(
            r1.update(&f.conn).unwrap_err(),
            Error::ParentCycle { id: 1, parent: 3 }
        ));

        r1.parent_id = r2.id;
        assert!(matches!(
            r1.update(&f.conn).unwrap_err(),
            Error::ParentCycle { id: 1, parent: 2 }
        ));
    }

    #[test]
    fn test_update_reparent_within_question() {
        let f = setup();
        let mut r1 = Reply::new(f.question.id.unwrap(), f.grace.id.unwrap(), "a");
        r1.create(&f.conn).unwrap();
        let mut r2 = Reply::new(f.question.id.unwrap(), f.ada.id.unwrap(), "b");
        r2.create(&f.conn).unwrap();

        r2.parent_id = r1.id;
        r2.update(&f.conn).unwrap();
        assert_eq!(r1.child_replies(&f.conn).unwrap(), vec![r2]);
    }

    #[test]
    fn test_update_moving_reply_with_answers_fails() {
        let f = setup();
        let mut other = Question::new("Q2", "...", f.ada.id.unwrap());
        other.create(&f.conn).unwrap();
        let mut r1 = Reply::new(f.question.id.unwrap(), f.grace.id.unwrap(), "a");
        r1.create(&f.conn).unwrap();
        Reply::child_of(&r1, f.ada.id.unwrap(), "b")
            .unwrap()
            .create(&f.conn)
            .unwrap();

        r1.question_id = other.id.unwrap();
        assert!(matches!(
            r1.update(&f.conn).unwrap_err(),
            Error::AnswersOnOtherQuestion { id: 1, question: 2 }
        ));
        assert_eq!(f.question.replies(&f.conn).unwrap().len(), 2);
    }
}
