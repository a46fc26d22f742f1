//! Atelier Admin CLI
//!
//! Manages the admin accounts allowed to sign in to `atelier-server`.
//!
//! # Usage
//!
//! ```bash
//! atelier-admin user add owner@example.com --password s3cret
//! atelier-admin user list
//! atelier-admin user passwd owner@example.com
//! atelier-admin user remove owner@example.com
//! ```
//!
//! Without `--password` the password is read from stdin.
//!
//! # Environment Variables
//!
//! - `ATELIER_CONFIG`: Admin file (default: ~/.config/atelier-server/config.yaml)

use std::io::{self, BufRead, Write};
use std::path::Path;

use atelier::auth::{AdminDirectory, DirectoryError};
use atelier::config::ServerConfig;
use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "atelier-admin")]
#[command(version)]
#[command(about = "Atelier server administration tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin accounts
    User(UserCommand),
}

#[derive(Args)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand)]
enum UserSubcommand {
    /// Add a new admin
    Add {
        /// Admin's email address
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long, short)]
        password: Option<String>,
    },
    /// List all admins
    List,
    /// Change an admin's password
    Passwd {
        email: String,
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Remove an admin
    Remove {
        /// Admin's email address
        email: String,
    },
}

// ============================================================================
// Commands
// ============================================================================

fn read_password(given: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    let password = match given {
        Some(password) => password,
        None => {
            print!("Password: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        return Err("Password must not be empty".into());
    }
    Ok(password)
}

fn add_user(path: &Path, email: String, password: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut directory = AdminDirectory::read(path)?;
    if directory.find(&email).is_some() {
        return Err(DirectoryError::Exists(email).into());
    }

    let password = read_password(password)?;
    directory.add(&email, &password)?;
    directory.save(path)?;

    println!("Added admin: {}", email);
    Ok(())
}

fn list_users(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let directory = AdminDirectory::read(path)?;

    if directory.admins.is_empty() {
        println!("No admins registered.");
        return Ok(());
    }

    println!("{:<40}", "EMAIL");
    println!("{}", "-".repeat(40));
    for admin in &directory.admins {
        println!("{:<40}", admin.email);
    }

    println!();
    println!("Total: {} admin(s)", directory.admins.len());

    Ok(())
}

fn change_password(
    path: &Path,
    email: String,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut directory = AdminDirectory::read(path)?;
    if directory.find(&email).is_none() {
        return Err(DirectoryError::NotFound(email).into());
    }

    let password = read_password(password)?;
    directory.set_password(&email, &password)?;
    directory.save(path)?;

    println!("Password changed for {}", email);
    Ok(())
}

fn remove_user(path: &Path, email: String) -> Result<(), Box<dyn std::error::Error>> {
    let mut directory = AdminDirectory::read(path)?;
    directory.remove(&email)?;
    directory.save(path)?;

    println!("Removed admin: {}", email);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let path = ServerConfig::from_env().config_path;

    let result = match cli.command {
        Commands::User(user_cmd) => match user_cmd.command {
            UserSubcommand::Add { email, password } => add_user(&path, email, password),
            UserSubcommand::List => list_users(&path),
            UserSubcommand::Passwd { email, password } => change_password(&path, email, password),
            UserSubcommand::Remove { email } => remove_user(&path, email),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
