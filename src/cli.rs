use crate::db::DEFAULT_DB_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qadb")]
#[command(about = "Questions and answers store")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Database file
    #[arg(long, global = true, default_value = DEFAULT_DB_FILE)]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the tables
    Init,

    /// Add a user
    AddUser {
        /// First name
        fname: String,
        /// Last name
        lname: String,
    },

    /// Ask a question
    Ask {
        /// Author's user ID
        author_id: i64,
        /// Question title
        title: String,
        /// Question body
        #[arg(long)]
        body: String,
    },

    /// Reply to a question
    Reply {
        /// Question ID
        question_id: i64,
        /// Replier's user ID
        replier_id: i64,
        /// Reply text
        text: String,
        /// Reply ID this one answers
        #[arg(long)]
        parent: Option<i64>,
    },

    /// Follow a question
    Follow {
        /// User ID
        user_id: i64,
        /// Question ID
        question_id: i64,
    },

    /// Like a question
    Like {
        /// User ID
        user_id: i64,
        /// Question ID
        question_id: i64,
    },

    /// List all users
    Users,

    /// List all questions
    Questions,

    /// Show a user's activity
    User {
        /// User ID
        id: i64,
    },

    /// Show a question with its replies, likes and followers
    Show {
        /// Question ID
        id: i64,
    },

    /// Questions with the most likes
    MostLiked {
        /// How many to list
        #[arg(default_value_t = 5)]
        n: u32,
    },

    /// Questions with the most followers
    MostFollowed {
        /// How many to list
        #[arg(default_value_t = 5)]
        n: u32,
    },
}
