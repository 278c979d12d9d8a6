//! Host bridge CLI - serve the tool gateway over local HTTP

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use bridge_core::{credentials, CorsConfig, GatewayConfig, GatewayContext};
use bridge_registry::builtin;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bridge", version)]
#[command(about = "Host bridge - authenticated HTTP gateway for local tool execution")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway and serve until interrupted
    Start(ServeArgs),
    /// Resolve the token and validate configuration without serving
    Check(ServeArgs),
    /// List the built-in tools
    Tools,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind. Anything but loopback exposes the bridge to the network
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Comma-separated origins allowed to call from a browser
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Take client addresses from X-Forwarded-For
    #[arg(
        long,
        env = "TRUST_PROXY",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    trust_proxy: bool,

    /// JSON file consulted for `authToken` when BRIDGE_AUTH_TOKEN is unset
    #[arg(short, long, default_value = credentials::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

impl ServeArgs {
    fn gateway_config(&self) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.server.host = self.host.clone();
        config.server.port = self.port;
        config.server.trust_proxy = self.trust_proxy;
        config.cors = CorsConfig::from_list(&self.cors_origins.join(","));
        config
    }

    /// `env_token` is the `BRIDGE_AUTH_TOKEN` value, if set.
    fn context(&self, env_token: Option<String>) -> anyhow::Result<GatewayContext> {
        let token = credentials::load_token(env_token, &self.config)?;
        let ctx = GatewayContext::new(self.gateway_config(), token, builtin::default_tools())?;
        Ok(ctx)
    }
}

fn env_token() -> Option<String> {
    std::env::var(credentials::TOKEN_ENV).ok()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn start(args: &ServeArgs) -> anyhow::Result<ExitCode> {
    let ctx = args.context(env_token())?.shared();
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let reason = runtime.block_on(bridge_core::serve(ctx))?;
    Ok(ExitCode::from(reason.exit_code()))
}

fn check(args: &ServeArgs) -> anyhow::Result<ExitCode> {
    let ctx = args.context(env_token())?;
    let config = &ctx.config;
    println!("Configuration OK");
    println!("  listen:      {}", config.server.bind_address());
    println!(
        "  exposure:    {}",
        if config.server.is_loopback() { "loopback only" } else { "NETWORK EXPOSED" }
    );
    println!("  trust proxy: {}", config.server.trust_proxy);
    println!(
        "  cors:        {}",
        if config.cors.origins.is_empty() {
            "same-origin only".to_string()
        } else {
            config.cors.origins.join(", ")
        }
    );
    println!(
        "  rate limit:  {} requests / {}s",
        config.limits.rate_limit_max, config.limits.rate_limit_window_secs
    );
    println!("  tools:       {}", ctx.registry.len());
    println!("  auth token:  configured");
    Ok(ExitCode::SUCCESS)
}

fn tools() -> ExitCode {
    for tool in builtin::default_tools() {
        println!("{:<16} {}", tool.name, tool.description);
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Some(Commands::Start(args)) => start(&args),
        Some(Commands::Check(args)) => check(&args),
        Some(Commands::Tools) => Ok(tools()),
        None => {
            println!(
                "Host bridge v{} - Use --help for commands",
                env!("CARGO_PKG_VERSION")
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{e:#}"), "bridge failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_start_flags() {
        let cli = Cli::try_parse_from([
            "bridge",
            "start",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--cors-origins",
            "https://a.example,https://b.example",
            "--trust-proxy",
        ])
        .unwrap();
        let Some(Commands::Start(args)) = cli.command else {
            panic!("expected start");
        };
        let config = args.gateway_config();
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.is_loopback());
        assert!(config.server.trust_proxy);
        assert_eq!(config.cors.origins.len(), 2);
    }

    #[test]
    fn test_check_missing_token_fails() {
        let missing = std::env::temp_dir().join("bridge-cli-no-such-config.json");
        let cli = Cli::try_parse_from(["bridge", "check", "--config", missing.to_str().unwrap()])
            .unwrap();
        let Some(Commands::Check(args)) = cli.command else {
            panic!("expected check");
        };
        assert!(args.context(None).is_err());
        assert!(args.context(Some(String::new())).is_err());
    }

    #[test]
    fn test_check_with_env_token_succeeds() {
        let missing = std::env::temp_dir().join("bridge-cli-no-such-config.json");
        let cli = Cli::try_parse_from(["bridge", "check", "--config", missing.to_str().unwrap()])
            .unwrap();
        let Some(Commands::Check(args)) = cli.command else {
            panic!("expected check");
        };
        let ctx = args.context(Some("cli-test-token".to_string())).unwrap();
        assert_eq!(ctx.registry.len(), 4);
    }
}
