//! Bank-Over-UDP client: entry point.
//!
//! Runs one banking operation against the server and prints the result.
//! Every operation is a subcommand; the connection settings come from the
//! config file, then environment variables, then command-line flags (later
//! sources win).
//!
//! # Usage
//!
//! ```text
//! bank-client [OPTIONS] <COMMAND>
//!
//! Commands:
//!   open         Open a new account
//!   close        Close an account
//!   balance      Query an account's balance
//!   deposit      Add money to an account
//!   withdraw     Take money out of an account
//!   transfer     Move money to another account
//!   monitor      Print account updates pushed by the server for a while
//!   check-state  List every account the server holds
//!   init-config  Write the effective settings to the config file
//!
//! Options:
//!   --config      <PATH>      Config file [default: platform config dir]
//!   --host        <HOST>      Server host name or IP
//!   --port        <PORT>      Server UDP port
//!   --semantic    <SEMANTIC>  maybe | at-least-once | at-most-once
//!   --timeout-ms  <MS>        Per-attempt reply timeout
//!   --max-retries <N>         Attempt limit, negative for unbounded
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable            | Flag            |
//! |---------------------|-----------------|
//! | `BANK_CONFIG`       | `--config`      |
//! | `BANK_HOST`         | `--host`        |
//! | `BANK_PORT`         | `--port`        |
//! | `BANK_SEMANTIC`     | `--semantic`    |
//! | `BANK_TIMEOUT_MS`   | `--timeout-ms`  |
//! | `BANK_MAX_RETRIES`  | `--max-retries` |
//!
//! `RUST_LOG` controls log output; without it the `[logging] level` from the
//! config file applies.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bank_client::application::{BankService, Credentials};
use bank_client::infrastructure::network::{self, InvocationSemantic, MonitorOutcome};
use bank_client::infrastructure::storage::config::{
    config_file_path, load_config, save_config, ClientConfig,
};
use bank_core::{Currency, Value};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Command-line client for the Bank-Over-UDP banking service.
#[derive(Debug, Parser)]
#[command(
    name = "bank-client",
    about = "Command-line client for the Bank-Over-UDP banking service",
    version
)]
struct Cli {
    /// Config file to read.  Defaults to the platform config directory.
    #[arg(long, env = "BANK_CONFIG")]
    config: Option<PathBuf>,

    /// Server host name or IP address.
    #[arg(long, env = "BANK_HOST")]
    host: Option<String>,

    /// Server UDP port.
    #[arg(long, env = "BANK_PORT")]
    port: Option<u16>,

    /// Invocation semantic used for every request.
    #[arg(long, value_enum, env = "BANK_SEMANTIC")]
    semantic: Option<InvocationSemantic>,

    /// How long to wait for each reply, in milliseconds.
    #[arg(long, env = "BANK_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Maximum number of attempts per request.  Negative means unbounded.
    #[arg(long, env = "BANK_MAX_RETRIES", allow_negative_numbers = true)]
    max_retries: Option<i64>,

    #[command(subcommand)]
    command: Command,
}

/// Account owner identity shared by most subcommands.
#[derive(Debug, clap::Args)]
struct AccountArgs {
    /// Account number.
    #[arg(long)]
    account: i64,

    /// Account holder name.
    #[arg(long)]
    name: String,

    /// Account password.
    #[arg(long)]
    password: String,
}

impl From<AccountArgs> for Credentials {
    fn from(args: AccountArgs) -> Self {
        Self {
            account_number: args.account,
            name: args.name,
            password: args.password,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open a new account.
    Open {
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        /// ISO 4217 currency code, e.g. SGD.
        #[arg(long)]
        currency: Currency,
        /// Opening balance.
        #[arg(long, default_value_t = 0.0)]
        balance: f64,
    },
    /// Close an account.
    Close {
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Query an account's balance.
    Balance {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(long)]
        currency: Currency,
    },
    /// Add money to an account.
    Deposit {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(long)]
        currency: Currency,
        #[arg(long)]
        amount: f64,
    },
    /// Take money out of an account.
    Withdraw {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(long)]
        currency: Currency,
        #[arg(long)]
        amount: f64,
    },
    /// Move money to another account.
    Transfer {
        #[command(flatten)]
        account: AccountArgs,
        #[arg(long)]
        currency: Currency,
        #[arg(long)]
        amount: f64,
        /// Destination account number.
        #[arg(long)]
        to: i64,
    },
    /// Print account updates pushed by the server for a while.
    Monitor {
        /// How long to receive updates, in seconds.
        #[arg(long, default_value_t = 60)]
        interval: u64,
    },
    /// List every account the server holds.
    CheckState,
    /// Write the effective settings to the config file.
    InitConfig,
}

impl Cli {
    /// Loads the config file and applies the flag and environment overrides
    /// on top of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    fn resolve_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = load_config(self.config.as_deref()).context("failed to load config")?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(semantic) = self.semantic {
            config.invocation.semantic = semantic;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.invocation.timeout_ms = timeout_ms;
        }
        if let Some(max_retries) = self.max_retries {
            config.invocation.max_retries = max_retries;
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    // `RUST_LOG` wins; otherwise the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    if let Command::InitConfig = cli.command {
        return write_config(&config, cli.config.as_deref());
    }

    config.validate().context("invalid configuration")?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        semantic = %config.invocation.semantic,
        "bank client starting"
    );

    let socket = network::connect(&config.server.host, config.server.port)
        .context("failed to open UDP socket")?;
    let service = BankService::new(socket, config.invocation.transport());

    run(&service, cli.command)
}

/// Runs one subcommand and prints its result to stdout.
fn run<C: network::Connection>(service: &BankService<C>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Open {
            name,
            password,
            currency,
            balance,
        } => {
            let account = service
                .open(&name, &password, currency, balance)
                .context("open failed")?;
            println!("Account opened.\n{account}");
        }
        Command::Close { account } => {
            let reply = service.close(&account.into()).context("close failed")?;
            println!("Account closed: {reply}");
        }
        Command::Balance { account, currency } => {
            let reply = service
                .balance(&account.into(), currency)
                .context("balance query failed")?;
            println!("Balance: {reply}");
        }
        Command::Deposit {
            account,
            currency,
            amount,
        } => {
            let updated = service
                .deposit(&account.into(), currency, amount)
                .context("deposit failed")?;
            println!("Deposit successful.\n{updated}");
        }
        Command::Withdraw {
            account,
            currency,
            amount,
        } => {
            let updated = service
                .withdraw(&account.into(), currency, amount)
                .context("withdrawal failed")?;
            println!("Withdrawal successful.\n{updated}");
        }
        Command::Transfer {
            account,
            currency,
            amount,
            to,
        } => {
            let updated = service
                .transfer(&account.into(), currency, amount, to)
                .context("transfer failed")?;
            println!("Transfer successful.\n{updated}");
        }
        Command::Monitor { interval } => {
            println!("Monitoring updates for {interval} seconds...");
            let outcome = service
                .monitor(Duration::from_secs(interval), |update: Value| {
                    println!("Update: {update}");
                })
                .context("monitoring failed")?;
            match outcome {
                MonitorOutcome::Stopped => println!("Server stopped monitoring."),
                MonitorOutcome::Expired => println!("Monitoring interval ended."),
            }
        }
        Command::CheckState => {
            let accounts = service.check_state().context("check state failed")?;
            if accounts.is_empty() {
                println!("No accounts.");
            }
            for account in &accounts {
                println!("{account}");
            }
        }
        Command::InitConfig => {}
    }
    Ok(())
}

fn write_config(config: &ClientConfig, path: Option<&Path>) -> anyhow::Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path().context("no config path given and no platform config dir")?,
    };
    save_config(config, &path)
        .with_context(|| format!("failed to write config to {}", path.display()))?;
    println!("Config written to {}", path.display());
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
