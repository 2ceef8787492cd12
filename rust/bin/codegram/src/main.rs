//! `codegram`: command-line client for CodeGram.
//!
//! Manages contexts and sessions, pages through the feed, toggles likes and
//! bookmarks, and watches notifications over the push channel.

mod commands;
mod config;

use clap::{Parser, Subcommand, ValueEnum};

use codegram_client::FeedSource;
use codegram_types::InteractionKind;

/// CodeGram CLI tool.
#[derive(Parser, Debug)]
#[command(name = "codegram", about = "CodeGram CLI client")]
struct Cli {
    /// Path to client config file (default: ~/.codegram/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage contexts.
    #[command(name = "context")]
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    #[command(name = "use")]
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Save a session cookie for the current context.
    Login {
        /// Cookie header value issued by the identity provider,
        /// e.g. "connect.sid=s%3A...".
        #[arg(long)]
        cookie: String,
    },

    /// Clear the session from the current context.
    Logout,

    /// Show the current context and signed-in user.
    Status,

    /// Page through a feed.
    Feed {
        #[arg(long, value_enum, default_value_t = Source::Home)]
        source: Source,
        /// Number of pages to load.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Toggle a like on a feed item.
    Like {
        id: String,
        /// Feed pages to search for the item.
        #[arg(long, default_value_t = 5)]
        max_pages: u32,
    },

    /// Toggle a bookmark on a feed item.
    Bookmark {
        id: String,
        /// Feed pages to search for the item.
        #[arg(long, default_value_t = 5)]
        max_pages: u32,
    },

    /// List notifications.
    Notifications {
        /// Mark everything read after listing.
        #[arg(long)]
        read_all: bool,
        /// Stay connected and print events as they arrive.
        #[arg(long)]
        watch: bool,
    },

    /// Show (and optionally add to) the comments on an item.
    Comments {
        /// snippet, doc or bug.
        kind: String,
        id: String,
        #[arg(long)]
        add: Option<String>,
    },

    /// Follow or unfollow a user.
    Follow { user_id: String },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a context or update its endpoints.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        push: Option<String>,
    },
    /// List all contexts.
    List,
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Source {
    Home,
    Bugs,
}

impl From<Source> for FeedSource {
    fn from(s: Source) -> Self {
        match s {
            Source::Home => FeedSource::Home,
            Source::Bugs => FeedSource::Bugs,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);
    let json_output = cli.output == "json";

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Set { name, server, push } => {
                commands::context::set(&name, server.as_deref(), push.as_deref(), &config_path)?;
            }
            ContextAction::List => {
                commands::context::list(&config_path)?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, &config_path)?;
            }
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => {
                commands::context::use_context(&name, &config_path)?;
            }
        },

        Commands::Login { cookie } => {
            commands::login::login(&cookie, &config_path).await?;
        }

        Commands::Logout => {
            commands::login::logout(&config_path)?;
        }

        Commands::Status => {
            commands::login::status(&config_path).await?;
        }

        Commands::Feed { source, pages } => {
            if pages == 0 {
                anyhow::bail!("--pages must be at least 1.");
            }
            commands::feed::list(source.into(), pages, json_output, &config_path).await?;
        }

        Commands::Like { id, max_pages } => {
            commands::interact::toggle(&id, InteractionKind::Like, max_pages, &config_path).await?;
        }

        Commands::Bookmark { id, max_pages } => {
            commands::interact::toggle(&id, InteractionKind::Bookmark, max_pages, &config_path)
                .await?;
        }

        Commands::Notifications { read_all, watch } => {
            commands::notifications::run(read_all, watch, json_output, &config_path).await?;
        }

        Commands::Comments { kind, id, add } => {
            commands::interact::comments(&kind, &id, add.as_deref(), &config_path).await?;
        }

        Commands::Follow { user_id } => {
            commands::interact::follow(&user_id, &config_path).await?;
        }

        Commands::Version => {
            println!("codegram cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
