//! User directory command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use anyhow::Error;

use user_directory_model::request::user::UserRequest;

use crate::directory::{DirectoryError, UserDirectory};

/// The command line arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration file path.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// The command to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Operational commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "create-user")]
    CreateUser(CreateUser),
    #[command(name = "list-users")]
    ListUsers,
}

/// Creates a user directly, bypassing the API.
///
/// Useful for bootstrapping an admin account.
#[derive(clap::Args, Debug)]
pub struct CreateUser {
    /// The name of the user.
    pub name: String,
    /// The password of the user.
    pub password: String,
    /// The starting balance.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub money: i64,
    /// Makes the user an admin.
    #[arg(long)]
    pub admin: bool,
}

/// Runs an operational command.
pub async fn run_command(command: &Command, directory: &UserDirectory) -> Result<(), Error> {
    match command {
        Command::CreateUser(user) => {
            tracing::info!("creating user {}", user.name);

            let id = directory
                .create(UserRequest {
                    name: user.name.clone(),
                    password: user.password.clone(),
                    money: user.money,
                    admin: user.admin,
                })
                .await?;

            // export id
            println!("{}", id);
        }
        Command::ListUsers => match directory.list_all().await {
            Ok(users) => {
                for user in users {
                    println!("{}", serde_json::to_string(&user)?);
                }
            }
            Err(DirectoryError::Empty) => tracing::info!("no users"),
            Err(err) => return Err(err.into()),
        },
    }

    Ok(())
}
