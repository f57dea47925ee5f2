use clap::Parser;
use qadb::DbPath;
use qadb::cli::{Cli, Commands};
use qadb::cli_handlers;
use std::process;

fn main() {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = DbPath::new(&cli.db);

    let result = match cli.command {
        Commands::Init => cli_handlers::handle_init(&db),
        Commands::AddUser { fname, lname } => cli_handlers::handle_add_user(&db, &fname, &lname),
        Commands::Ask {
            author_id,
            title,
            body,
        } => cli_handlers::handle_ask(&db, author_id, &title, &body),
        Commands::Reply {
            question_id,
            replier_id,
            text,
            parent,
        } => cli_handlers::handle_reply(&db, question_id, replier_id, &text, parent),
        Commands::Follow {
            user_id,
            question_id,
        } => cli_handlers::handle_follow(&db, user_id, question_id),
        Commands::Like {
            user_id,
            question_id,
        } => cli_handlers::handle_like(&db, user_id, question_id),
        Commands::Users => cli_handlers::handle_users(&db),
        Commands::Questions => cli_handlers::handle_questions(&db),
        Commands::User { id } => cli_handlers::handle_user(&db, id),
        Commands::Show { id } => cli_handlers::handle_show(&db, id),
        Commands::MostLiked { n } => cli_handlers::handle_most_liked(&db, n),
        Commands::MostFollowed { n } => cli_handlers::handle_most_followed(&db, n),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
