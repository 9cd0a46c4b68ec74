//! repolink CLI - inspect git hosting services from the terminal
//!
//! Resolves pasted repository URLs into precise locations and browses the
//! namespaces, repositories, branches and pull requests of a configured host.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    BranchesCommand, ContextCommand, LastCommitCommand, NamespacesCommand, PrsCommand,
    RenderCommand, ReposCommand, ResolveCommand, WhoamiCommand,
};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "REPOLINK_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "REPOLINK_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a repository URL and resolve pull request links
    Resolve(ResolveCommand),
    /// Resolve a repository URL into a commit-pinned location
    Context(ContextCommand),
    /// Print the newest commit of the branch a URL points at
    LastCommit(LastCommitCommand),
    /// Print the canonical browsable URL for a repository URL
    Render(RenderCommand),
    /// List the namespaces of the authenticated user
    Namespaces(NamespacesCommand),
    /// List the repositories of a namespace
    Repos(ReposCommand),
    /// List the branches of a repository
    Branches(BranchesCommand),
    /// List the open pull requests of a repository
    Prs(PrsCommand),
    /// Show the authenticated user
    Whoami(WhoamiCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // If RUST_LOG is set, use it as-is; otherwise apply the level to our crates only
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()?
    } else {
        tracing_subscriber::EnvFilter::new(format!(
            "repolink={level},\
             repolink_git={level},\
             h2=warn,\
             hyper=warn,\
             reqwest=warn,\
             rustls=warn",
            level = cli.log_level
        ))
    };

    // Logs go to stderr so JSON output stays pipeable
    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Resolve(cmd) => cmd.execute(),
        Commands::Context(cmd) => cmd.execute(),
        Commands::LastCommit(cmd) => cmd.execute(),
        Commands::Render(cmd) => cmd.execute(),
        Commands::Namespaces(cmd) => cmd.execute(),
        Commands::Repos(cmd) => cmd.execute(),
        Commands::Branches(cmd) => cmd.execute(),
        Commands::Prs(cmd) => cmd.execute(),
        Commands::Whoami(cmd) => cmd.execute(),
    }
}
