mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "chatops",
    about = "Chat commands that ask for what they need, then run their tasks in order",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: nearest directory containing .chatops/)
    #[arg(long, global = true, env = "CHATOPS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .chatops/config.yaml
    Init {
        /// Bot name (default: the root directory's name)
        #[arg(long)]
        bot_name: Option<String>,
    },

    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value_t = 3142)]
        port: u16,
    },

    /// Start a command and run one turn of it
    Dispatch {
        /// Registered command name
        command: String,
        /// Known parameter, as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Reuse an existing conversation message
        #[arg(long)]
        correlation_id: Option<String>,
        /// Channel the command was typed in
        #[arg(long)]
        channel: Option<String>,
        /// User who typed the command
        #[arg(long)]
        user: Option<String>,
        /// Do not show the parameter summary
        #[arg(long)]
        hide_summary: bool,
    },

    /// Continue an invocation from a button payload
    Click {
        /// Invocation JSON as printed next to a button
        payload: String,
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },

    /// List registered commands
    Commands,

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { bot_name } => cmd::init::run(&root, bot_name.as_deref()),
        Commands::Serve { port } => cmd::serve::run(&root, port),
        Commands::Dispatch {
            command,
            params,
            correlation_id,
            channel,
            user,
            hide_summary,
        } => cmd::dispatch::run(
            &root,
            cmd::dispatch::DispatchArgs {
                command,
                params,
                correlation_id,
                channel,
                user,
                hide_summary,
            },
            cli.json,
        ),
        Commands::Click {
            payload,
            channel,
            user,
        } => cmd::dispatch::click(&root, &payload, channel, user, cli.json),
        Commands::Commands => cmd::commands::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
