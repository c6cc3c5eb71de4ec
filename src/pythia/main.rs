use clap::Parser;
use colored::*;
use pythia::db::AnswerView;
use pythia::error::{ErrorKind, Result};
use pythia::model::{Answer, Level, RecordId, User};
use pythia::Database;

mod args;
use args::{AnswerCommands, Cli, Commands, UserCommands};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(exit_code(e.kind()));
    }
}

fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Storage => 1,
        ErrorKind::BadRequest => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Unauthorized => 4,
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let db = Database::open(&cli.data)?;

    let result = match cli.command {
        Commands::Answer(cmd) => handle_answer(&db, cmd),
        Commands::Tags => handle_tags(&db),
        Commands::User(cmd) => handle_user(&db, cmd),
        Commands::Login { login, password } => handle_login(&db, &login, &password),
    };

    db.close();
    result
}

fn handle_answer(db: &Database, cmd: AnswerCommands) -> Result<()> {
    match cmd {
        AnswerCommands::Add {
            question,
            answer,
            tags,
            actor,
        } => {
            let id = db.create_answer(Answer::new(question, answer, tags), &actor)?;
            println!("{} answer {}", "Created".green(), id);
        }
        AnswerCommands::Show { id } => {
            let answer = db.find_answer(&id)?;
            print_answer(&db.describe_answer(answer));
        }
        AnswerCommands::List => print_answer_list(&db.find_answers()?),
        AnswerCommands::Search { tags } => print_answer_list(&db.search_answers(&tags.join(" "))?),
        AnswerCommands::Edit {
            id,
            question,
            answer,
            tags,
            actor,
        } => {
            let mut current = db.find_answer(&id)?;
            if let Some(question) = question {
                current.question = question;
            }
            if let Some(answer) = answer {
                current.answer = answer;
            }
            if let Some(tags) = tags {
                current.tags = tags;
            }
            let id = db.update_answer(current, &actor)?;
            println!("{} answer {}", "Updated".green(), id);
        }
        AnswerCommands::Delete { id } => {
            db.delete_answer(&id)?;
            println!("{} answer {}", "Deleted".green(), id);
        }
    }
    Ok(())
}

fn handle_tags(db: &Database) -> Result<()> {
    let tags = db.available_tags();
    if tags.is_empty() {
        println!("{}", "No tags yet.".dimmed());
    }
    for tag in tags {
        println!("{}", tag);
    }
    Ok(())
}

fn handle_user(db: &Database, cmd: UserCommands) -> Result<()> {
    match cmd {
        UserCommands::Add {
            name,
            login,
            password,
            admin,
        } => {
            let level = if admin { Level::Admin } else { Level::User };
            let id = db.create_user(User::new(name, login, level), &password)?;
            println!("{} user {}", "Created".green(), id);
        }
        UserCommands::Show { id } => print_user(&db.find_user(&id)?),
        UserCommands::List => {
            for user in db.find_users()? {
                print_user(&user);
            }
        }
        UserCommands::Edit {
            id,
            name,
            login,
            password,
            admin,
            revoke_admin,
        } => {
            let mut current = db.find_user(&id)?;
            if let Some(name) = name {
                current.name = name;
            }
            if let Some(login) = login {
                current.login = login;
            }
            if admin {
                current.level = Level::Admin;
            } else if revoke_admin {
                current.level = Level::User;
            }
            let id = db.update_user(current, password.as_deref())?;
            println!("{} user {}", "Updated".green(), id);
        }
        UserCommands::Delete { id } => {
            db.delete_user(&id)?;
            println!("{} user {}", "Deleted".green(), id);
        }
    }
    Ok(())
}

fn handle_login(db: &Database, login: &str, password: &str) -> Result<()> {
    let user = db.authenticate(login, password)?;
    println!("{} as", "Logged in".green());
    print_user(&user);
    Ok(())
}

fn record_id(id: Option<RecordId>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

fn print_answer_list(answers: &[Answer]) {
    if answers.is_empty() {
        println!("{}", "No answers found.".dimmed());
        return;
    }
    for answer in answers {
        println!(
            "{:>4}. {}  {}",
            record_id(answer.id),
            answer.question.bold(),
            answer.tags.cyan()
        );
    }
}

fn print_answer(view: &AnswerView) {
    let answer = &view.answer;
    println!("{}. {}", record_id(answer.id), answer.question.bold());
    println!();
    println!("{}", answer.answer);
    println!();
    if !answer.tags.trim().is_empty() {
        println!("{} {}", "Tags:".dimmed(), answer.tags.cyan());
    }
    println!(
        "{} {} by {}",
        "Created".dimmed(),
        answer.created_at.format("%Y-%m-%d %H:%M"),
        view.created_by.as_deref().unwrap_or("unknown")
    );
    println!(
        "{} {} by {}",
        "Updated".dimmed(),
        answer.updated_at.format("%Y-%m-%d %H:%M"),
        view.updated_by.as_deref().unwrap_or("unknown")
    );
}

fn print_user(user: &User) {
    println!(
        "{:>4}. {} ({}) {}",
        record_id(user.id),
        user.name.bold(),
        user.login,
        user.level.to_string().dimmed()
    );
}
