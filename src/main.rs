use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use atelier::config::Config;
use commands::{
    CategoriesCommand, CliError, ContactsCommand, ContentCommand, Context, GalleryCommand,
    ServicesCommand, SocialCommand, WatchCommand,
};

#[derive(Parser)]
#[command(name = "atelier")]
#[command(version)]
#[command(about = "Edit the studio website from the command line", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Answer yes to confirmation prompts
    #[arg(long, short, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as an admin
    Login {
        /// Admin email
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, short)]
        password: Option<String>,
    },

    /// Sign out and forget the saved session
    Logout,

    /// Show store connection and session status
    Status,

    /// Read and edit page content slots
    Content(ContentCommand),

    /// Manage gallery categories
    Categories(CategoriesCommand),

    /// Manage services
    Services(ServicesCommand),

    /// Manage gallery works
    Gallery(GalleryCommand),

    /// Manage social links
    Social(SocialCommand),

    /// Review contact requests
    Contacts(ContactsCommand),

    /// Follow live updates of a collection
    Watch(WatchCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;
    let mut ctx = Context::new(config, cli.yes);

    let result = match cli.command {
        Some(Commands::Login { email, password }) => {
            commands::login(&ctx, &email, password).await
        }
        Some(Commands::Logout) => commands::logout(&ctx).await,
        Some(Commands::Status) => commands::status(&ctx).await,
        Some(Commands::Content(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Categories(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Services(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Gallery(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Social(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Contacts(cmd)) => cmd.run(&ctx).await,
        Some(Commands::Watch(cmd)) => cmd.run(&ctx).await,
        None => {
            println!("Use --help to see available commands");
            Ok(())
        }
    };

    ctx.flush_notices();
    result
}
