use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use urlshort_registry::{DatabaseConfig, Registry, RegistryOptions, DEFAULT_TTL_DAYS};
use urlshort_server::ServerConfig;

mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "urlshort",
    author,
    version,
    about = "Self-hosted url shortener with expiring links",
    long_about = "Register urls under six-character ids, redirect ids back to their urls, \
                  and forget entries once their time to live has passed."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still wins when set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API
    Start(StartArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct StartArgs {
    /// Address to bind the HTTP server to
    #[arg(long, env = "URLSHORT_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to bind the HTTP server to
    #[arg(long, env = "URLSHORT_PORT", default_value_t = 8080)]
    port: u16,

    /// Days a registered url stays resolvable
    #[arg(long, env = "URLSHORT_EXPIRATION", default_value_t = DEFAULT_TTL_DAYS)]
    expiration: u32,

    /// Database config file (default: res/db_config.toml)
    #[arg(long = "db-config", env = "URLSHORT_DB_CONFIG", value_name = "PATH")]
    db_config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Start(args) => run_start(args).await?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

async fn run_start(args: StartArgs) -> Result<()> {
    let db_config = match &args.db_config {
        Some(path) => DatabaseConfig::load_from(path)
            .with_context(|| format!("failed to load database config from {}", path.display()))?,
        None => DatabaseConfig::load().context("failed to load database config")?,
    };
    tracing::info!(
        database = %db_config.target(),
        expiration_days = args.expiration,
        "Opening url registry"
    );

    let registry = Registry::connect(&db_config, RegistryOptions::new(args.expiration))
        .await
        .context("failed to open url registry")?;
    let registry = Arc::new(registry);

    let config = ServerConfig {
        bind_addr: SocketAddr::new(args.host, args.port),
    };
    let served = urlshort_server::run_server(registry.clone(), config).await;

    registry.shutdown().await;
    served.context("HTTP server failed")
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
