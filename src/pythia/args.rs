use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pythia")]
#[command(about = "Tag-searchable knowledge base over a directory of JSON files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory holding the answers/ and users/ collections
    #[arg(short, long, global = true, env = "PYTHIA_DATA", default_value = "data")]
    pub data: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage answers
    #[command(subcommand, alias = "a")]
    Answer(AnswerCommands),

    /// List every tag in use
    Tags,

    /// Manage users
    #[command(subcommand, alias = "u")]
    User(UserCommands),

    /// Check a login and password
    Login { login: String, password: String },
}

#[derive(Subcommand, Debug)]
pub enum AnswerCommands {
    /// Add a new answer
    #[command(alias = "n")]
    Add {
        #[arg(short, long)]
        question: String,

        #[arg(short, long)]
        answer: String,

        /// Whitespace separated tags
        #[arg(short, long, default_value = "")]
        tags: String,

        /// Id of the user making the change
        #[arg(long, default_value = "1")]
        actor: String,
    },

    /// Show one answer
    #[command(alias = "v")]
    Show { id: String },

    /// List every answer
    #[command(alias = "ls")]
    List,

    /// Find answers carrying all of the given tags
    #[command(alias = "s")]
    Search {
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Change an answer
    #[command(alias = "e")]
    Edit {
        id: String,

        #[arg(short, long)]
        question: Option<String>,

        #[arg(short, long)]
        answer: Option<String>,

        #[arg(short, long)]
        tags: Option<String>,

        /// Id of the user making the change
        #[arg(long, default_value = "1")]
        actor: String,
    },

    /// Delete an answer
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Add a new user
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        login: String,

        #[arg(short, long)]
        password: String,

        /// Grant administrator level
        #[arg(long)]
        admin: bool,
    },

    /// Show one user
    #[command(alias = "v")]
    Show { id: String },

    /// List every user
    #[command(alias = "ls")]
    List,

    /// Change a user. The password is kept unless a new one is given
    #[command(alias = "e")]
    Edit {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        login: Option<String>,

        #[arg(short, long)]
        password: Option<String>,

        /// Grant administrator level
        #[arg(long, conflicts_with = "revoke_admin")]
        admin: bool,

        /// Drop back to user level
        #[arg(long)]
        revoke_admin: bool,
    },

    /// Delete a user
    #[command(alias = "rm")]
    Delete { id: String },
}
