//! Database schema for the Q&A store.

use crate::db::Connection;
use crate::error::{Error, Result};
use tracing::info;

/// The five tables, in dependency order.
pub const TABLES: [&str; 5] = [
    "users",
    "questions",
    "replies",
    "question_followers",
    "question_likes",
];

const CREATE_TABLES: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        fname TEXT NOT NULL,
        lname TEXT NOT NULL
    );

    CREATE TABLE questions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        author_id INTEGER NOT NULL,
        FOREIGN KEY (author_id) REFERENCES users(id)
    );

    CREATE TABLE replies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        reply_text TEXT NOT NULL,
        question_id INTEGER NOT NULL,
        reply_id INTEGER,
        replier_id INTEGER NOT NULL,
        FOREIGN KEY (question_id) REFERENCES questions(id),
        FOREIGN KEY (reply_id) REFERENCES replies(id),
        FOREIGN KEY (replier_id) REFERENCES users(id)
    );

    CREATE TABLE question_followers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        follower_id INTEGER NOT NULL,
        question_id INTEGER NOT NULL,
        UNIQUE (follower_id, question_id),
        FOREIGN KEY (follower_id) REFERENCES users(id),
        FOREIGN KEY (question_id) REFERENCES questions(id)
    );

    CREATE TABLE question_likes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        liker_id INTEGER NOT NULL,
        question_id INTEGER NOT NULL,
        author_id INTEGER NOT NULL,
        UNIQUE (liker_id, question_id),
        FOREIGN KEY (liker_id) REFERENCES users(id),
        FOREIGN KEY (question_id) REFERENCES questions(id),
        FOREIGN KEY (author_id) REFERENCES users(id)
    );

    CREATE INDEX idx_questions_author_id ON questions(author_id);
    CREATE INDEX idx_replies_question_id ON replies(question_id);
    CREATE INDEX idx_replies_reply_id ON replies(reply_id);
    CREATE INDEX idx_replies_replier_id ON replies(replier_id);
    CREATE INDEX idx_question_followers_follower_id ON question_followers(follower_id);
    CREATE INDEX idx_question_followers_question_id ON question_followers(question_id);
    CREATE INDEX idx_question_likes_liker_id ON question_likes(liker_id);
    CREATE INDEX idx_question_likes_question_id ON question_likes(question_id);
";

/// Schema management.
pub struct Schema;

impl Schema {
    /// Create all tables and indexes.
    ///
    /// Returns an error if the database is already initialized.
    pub fn init(conn: &Connection) -> Result<()> {
        if Self::is_initialized(conn)? {
            return Err(Error::AlreadyInitialized);
        }

        conn.as_conn().execute_batch(CREATE_TABLES)?;
        info!("created questions schema");
        Ok(())
    }

    /// Check whether the tables exist.
    pub fn is_initialized(conn: &Connection) -> Result<bool> {
        conn.table_exists("users")
    }

    /// Fail with `NotInitialized` unless the tables exist.
    pub fn require(conn: &Connection) -> Result<()> {
        if Self::is_initialized(conn)? {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }
}
