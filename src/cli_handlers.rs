use crate::core::{Follow, Like, Question, RankedQuestion, Record, Reply, User};
use crate::db::{Connection, DbPath, Schema};
use crate::error::{Error, Result};

/// Open the store and make sure the tables exist.
fn open(db: &DbPath) -> Result<Connection> {
    let conn = Connection::open(db.as_path())?;
    Schema::require(&conn)?;
    Ok(conn)
}

fn find<R: Record>(conn: &Connection, id: i64) -> Result<R> {
    R::find_by_id(conn, id)?.ok_or(Error::NotFound {
        entity: R::ENTITY,
        id,
    })
}

/// Handle the init command
pub fn handle_init(db: &DbPath) -> Result<()> {
    let conn = Connection::open(db.as_path())?;
    Schema::init(&conn)?;

    println!(
        "Initialized questions database at {}",
        db.as_path().display()
    );
    Ok(())
}

/// Handle the add-user command
pub fn handle_add_user(db: &DbPath, fname: &str, lname: &str) -> Result<()> {
    let conn = open(db)?;
    let mut user = User::new(fname, lname);
    let id = user.create(&conn)?;

    println!("Created user #{id}: {}", user.full_name());
    Ok(())
}

/// Handle the ask command
pub fn handle_ask(db: &DbPath, author_id: i64, title: &str, body: &str) -> Result<()> {
    let conn = open(db)?;
    let mut question = Question::new(title, body, author_id);
    let id = question.create(&conn)?;

    println!("Created question #{id}: {}", question.title);
    Ok(())
}

/// Handle the reply command
pub fn handle_reply(
    db: &DbPath,
    question_id: i64,
    replier_id: i64,
    text: &str,
    parent: Option<i64>,
) -> Result<()> {
    let conn = open(db)?;
    let mut reply = match parent {
        Some(parent_id) => {
            let parent: Reply = find(&conn, parent_id)?;
            if parent.question_id != question_id {
                return Err(Error::ParentOnOtherQuestion {
                    parent: parent_id,
                    parent_question: parent.question_id,
                    question: question_id,
                });
            }
            Reply::child_of(&parent, replier_id, text)?
        }
        None => Reply::new(question_id, replier_id, text),
    };
    let id = reply.create(&conn)?;

    match parent {
        Some(parent) => println!("Created reply #{id} to reply #{parent}"),
        None => println!("Created reply #{id} on question #{question_id}"),
    }
    Ok(())
}

/// Handle the follow command
pub fn handle_follow(db: &DbPath, user_id: i64, question_id: i64) -> Result<()> {
    let conn = open(db)?;
    Follow::new(user_id, question_id).create(&conn)?;

    println!("User #{user_id} now follows question #{question_id}");
    Ok(())
}

/// Handle the like command
pub fn handle_like(db: &DbPath, user_id: i64, question_id: i64) -> Result<()> {
    let conn = open(db)?;
    Like::new(user_id, question_id).create(&conn)?;

    println!("User #{user_id} likes question #{question_id}");
    Ok(())
}

/// Handle the users command
pub fn handle_users(db: &DbPath) -> Result<()> {
    let conn = open(db)?;
    let users = User::all(&conn)?;

    if users.is_empty() {
        println!("No users");
    }
    for user in users {
        println!("#{} {}", user.id.unwrap_or_default(), user.full_name());
    }
    Ok(())
}

/// Handle the questions command
pub fn handle_questions(db: &DbPath) -> Result<()> {
    let conn = open(db)?;
    let questions = Question::all(&conn)?;

    if questions.is_empty() {
        println!("No questions");
    }
    for q in questions {
        println!(
            "#{} {} (by #{})",
            q.id.unwrap_or_default(),
            q.title,
            q.author_id
        );
    }
    Ok(())
}

/// Handle the user command
pub fn handle_user(db: &DbPath, id: i64) -> Result<()> {
    let conn = open(db)?;
    let user: User = find(&conn, id)?;

    println!("[#{id}] {}", user.full_name());
    println!("Karma:      {:.2}", user.average_karma(&conn)?);

    print_questions("Questions:", &user.authored_questions(&conn)?);

    let replies = user.authored_replies(&conn)?;
    println!("Replies:");
    if replies.is_empty() {
        println!("  (none)");
    }
    for reply in replies {
        println!(
            "  #{} on #{}: {}",
            reply.id.unwrap_or_default(),
            reply.question_id,
            reply.reply_text
        );
    }

    print_questions("Following:", &user.followed_questions(&conn)?);
    print_questions("Liked:", &user.liked_questions(&conn)?);
    Ok(())
}

/// Handle the show command
pub fn handle_show(db: &DbPath, id: i64) -> Result<()> {
    let conn = open(db)?;
    let question: Question = find(&conn, id)?;

    let author = question
        .author(&conn)?
        .map(|u| u.full_name())
        .unwrap_or_else(|| format!("#{}", question.author_id));

    println!("[#{id}] {}", question.title);
    println!("Author:     {author}");
    println!("Likes:      {}", question.num_likes(&conn)?);
    println!("Followers:  {}", question.num_followers(&conn)?);
    println!();
    println!("{}", question.body);
    println!();

    print_users("Liked by:", &question.likers(&conn)?);
    print_users("Followed by:", &question.followers(&conn)?);

    let replies = question.replies(&conn)?;
    println!("Replies:");
    if replies.is_empty() {
        println!("  (none)");
    }
    for reply in replies {
        let name = reply
            .author(&conn)?
            .map(|u| u.full_name())
            .unwrap_or_else(|| format!("#{}", reply.replier_id));
        match reply.parent_id {
            Some(parent) => println!(
                "    #{} re #{parent} {name}: {}",
                reply.id.unwrap_or_default(),
                reply.reply_text
            ),
            None => println!(
                "  #{} {name}: {}",
                reply.id.unwrap_or_default(),
                reply.reply_text
            ),
        }
    }
    Ok(())
}

/// Handle the most-liked command
pub fn handle_most_liked(db: &DbPath, n: u32) -> Result<()> {
    let conn = open(db)?;
    print_ranking(&Question::most_liked(&conn, n)?, "likes");
    Ok(())
}

/// Handle the most-followed command
pub fn handle_most_followed(db: &DbPath, n: u32) -> Result<()> {
    let conn = open(db)?;
    print_ranking(&Question::most_followed(&conn, n)?, "followers");
    Ok(())
}

fn print_questions(heading: &str, questions: &[Question]) {
    println!("{heading}");
    if questions.is_empty() {
        println!("  (none)");
    }
    for q in questions {
        println!("  #{} {}", q.id.unwrap_or_default(), q.title);
    }
}

fn print_users(heading: &str, users: &[User]) {
    println!("{heading}");
    if users.is_empty() {
        println!("  (none)");
    }
    for u in users {
        println!("  #{} {}", u.id.unwrap_or_default(), u.full_name());
    }
}

fn print_ranking(ranking: &[RankedQuestion], unit: &str) {
    if ranking.is_empty() {
        println!("No {unit} yet");
    }
    for (rank, entry) in ranking.iter().enumerate() {
        println!(
            "{:>3}. #{} {} ({} {unit})",
            rank + 1,
            entry.question.id.unwrap_or_default(),
            entry.question.title,
            entry.count
        );
    }
}
