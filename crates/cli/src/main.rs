//! UIGen CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Write the default config
//! - `serve`: Start the HTTP gateway
//! - `chat`: Send one prompt to a running gateway and render the stream
//! - `completions`: Print shell completions

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "uigen",
    about = "UIGen: generate React components with a tool-calling agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Onboard,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind host
        #[arg(long)]
        host: Option<String>,
    },

    /// Send a prompt to a running gateway
    Chat {
        /// What to build or change
        prompt: String,

        /// Gateway base URL
        #[arg(long, env = "UIGEN_URL", default_value = "http://127.0.0.1:3000")]
        url: String,

        /// Snapshot JSON to start from
        #[arg(short, long)]
        files: Option<PathBuf>,

        /// Where to write the resulting snapshot
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Project id to persist the result under
        #[arg(long)]
        project: Option<String>,
    },

    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::Chat {
            prompt,
            url,
            files,
            out,
            project,
        } => {
            commands::chat::run(commands::chat::ChatArgs {
                prompt,
                url,
                files,
                out,
                project,
            })
            .await?
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "uigen", &mut std::io::stdout());
        }
    }

    Ok(())
}
