//! Records for the Q&A domain and the relationships between them.

pub mod follow;
pub mod like;
pub mod question;
pub mod record;
pub mod reply;
pub mod user;

pub use follow::Follow;
pub use like::Like;
pub use question::{Question, RankedQuestion};
pub use record::Record;
pub use reply::Reply;
pub use user::User;
