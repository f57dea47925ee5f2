//! Error types for the Q&A store.

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the Q&A store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failure surfaced by SQLite (syntax, constraint, I/O).
    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),

    /// `create` called on a record that already has an id.
    #[error("{entity} #{id} is already persisted")]
    AlreadyPersisted { entity: &'static str, id: i64 },

    /// `update` called on a record that was never inserted.
    #[error("{entity} has not been persisted yet, create it first")]
    NotPersisted { entity: &'static str },

    /// No row with the given id.
    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A field mapping could not be turned into a record.
    #[error("Invalid fields: {0}")]
    Fields(#[from] serde_json::Error),

    /// Schema already created.
    #[error("Already initialized, tables exist")]
    AlreadyInitialized,

    /// Schema missing.
    #[error("Not initialized. Run `qadb init` first")]
    NotInitialized,

    /// A reply named as its own parent.
    #[error("Reply #{0} cannot answer itself")]
    SelfParent(i64),

    /// Parent reply belongs to a different question.
    #[error("Reply #{parent} is on question #{parent_question}, not question #{question}")]
    ParentOnOtherQuestion {
        parent: i64,
        parent_question: i64,
        question: i64,
    },

    /// Parent reply is one of the reply's own answers.
    #[error("Reply #{id} cannot answer #{parent}: #{parent} is already in its thread")]
    ParentCycle { id: i64, parent: i64 },

    /// Moving a reply would leave its answers on the old question.
    #[error("Reply #{id} has answers on another question, cannot move it to question #{question}")]
    AnswersOnOtherQuestion { id: i64, question: i64 },
}

impl Error {
    /// Whether the error came from a violated SQLite constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Error::Store(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_already_persisted() {
        let err = Error::AlreadyPersisted {
            entity: "User",
            id: 3,
        };
        assert_eq!(err.to_string(), "User #3 is already persisted");
    }

    #[test]
    fn test_display_not_found() {
        let err = Error::NotFound {
            entity: "Question",
            id: 42,
        };
        assert_eq!(err.to_string(), "Question #42 not found");
    }

    #[test]
    fn test_display_parent_on_other_question() {
        let err = Error::ParentOnOtherQuestion {
            parent: 1,
            parent_question: 1,
            question: 2,
        };
        assert_eq!(
            err.to_string(),
            "Reply #1 is on question #1, not question #2"
        );
    }

    #[test]
    fn test_constraint_violation_detection() {
        let sqlite_err = rusqlite::ffi::Error {
            code: rusqlite::ErrorCode::ConstraintViolation,
            extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
        };
        let err = Error::from(rusqlite::Error::SqliteFailure(sqlite_err, None));
        assert!(err.is_constraint_violation());

        assert!(!Error::from(rusqlite::Error::QueryReturnedNoRows).is_constraint_violation());
        assert!(!Error::NotInitialized.is_constraint_violation());
    }
}
