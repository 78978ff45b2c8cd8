//! Headscale Admin - command line front end for the Headscale REST API
//!
//! Each invocation loads configuration, builds the client and store, runs a
//! single command and prints the result as JSON on stdout. Logs go to stderr
//! and/or a log file depending on configuration.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;

use headscale_admin::config::{self, LogFormat, LogTarget};
use headscale_admin::{
    AppConfig, AppState, ExpireOutcome, RequestOptions, UserFilter, UserFilterParts,
};

/// A single CLI command
#[derive(Debug, PartialEq)]
enum Command {
    Users(Option<UserFilter>),
    Nodes,
    PreAuthKeys(Vec<String>),
    ApiKeys,
    Policy,
    SetPolicy(PathBuf),
    DeleteUser(String),
    DeleteNode(String),
    DeletePreAuthKey(String),
    ExpireApiKey(String),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    // Check for --help flag
    if args.is_empty() || args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    // Check for --version flag
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("Headscale Admin {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args[0] == "--init-config" {
        let path = args
            .get(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.yaml"));
        AppConfig::create_default_config(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let command = parse_command(&args)?;

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must be kept alive for the duration of the program
    // to ensure log messages are flushed to files
    let _log_guard = init_logging(&config);

    info!("Connecting to Headscale at {}", config.headscale.url);
    let state = AppState::new(config).context("Failed to initialize Headscale client")?;

    run(&state, command).await
}

fn parse_command(args: &[String]) -> Result<Command> {
    let (name, rest) = match args.split_first() {
        Some((name, rest)) => (name.as_str(), rest),
        None => bail!("No command given, see --help"),
    };

    let single = |what: &str| -> Result<String> {
        match rest {
            [value] => Ok(value.clone()),
            _ => bail!("{} expects exactly one {}", name, what),
        }
    };

    let command = match name {
        "users" => {
            let mut parts = UserFilterParts::default();
            let mut iter = rest.iter();
            while let Some(flag) = iter.next() {
                let value = iter
                    .next()
                    .cloned()
                    .with_context(|| format!("{} requires a value", flag))?;
                let slot = match flag.as_str() {
                    "--id" => &mut parts.id,
                    "--name" => &mut parts.name,
                    "--email" => &mut parts.email,
                    other => bail!("Unknown option for users: {}", other),
                };
                if slot.is_some() {
                    bail!("{} given more than once", flag);
                }
                *slot = Some(value);
            }
            if rest.is_empty() {
                Command::Users(None)
            } else {
                Command::Users(Some(UserFilter::try_from(parts)?))
            }
        }
        "nodes" => Command::Nodes,
        "preauthkeys" => Command::PreAuthKeys(rest.to_vec()),
        "apikeys" => Command::ApiKeys,
        "policy" => Command::Policy,
        "set-policy" => Command::SetPolicy(PathBuf::from(single("file")?)),
        "delete-user" => Command::DeleteUser(single("user id")?),
        "delete-node" => Command::DeleteNode(single("node id")?),
        "delete-preauthkey" => Command::DeletePreAuthKey(single("pre-auth key id")?),
        "expire-apikey" => Command::ExpireApiKey(single("API key")?),
        other => bail!("Unknown command: {}, see --help", other),
    };

    Ok(command)
}

async fn run(state: &AppState, command: Command) -> Result<()> {
    let headscale = &state.headscale;
    let opts = RequestOptions::default();
    debug!("Running command {:?}", command);

    match command {
        Command::Users(filter) => print_json(&headscale.get_users(filter.as_ref(), &opts).await?),
        Command::Nodes => print_json(&headscale.get_nodes(&opts).await?),
        Command::PreAuthKeys(user_ids) => {
            print_json(&headscale.get_pre_auth_keys(Some(user_ids.as_slice()), &opts).await?)
        }
        Command::ApiKeys => print_json(&headscale.get_api_keys(&opts).await?),
        Command::Policy => {
            println!("{}", headscale.get_policy(&opts).await?);
            Ok(())
        }
        Command::SetPolicy(path) => {
            let policy = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read policy file: {:?}", path))?;
            println!("{}", headscale.set_policy(&policy, &opts).await?);
            Ok(())
        }
        Command::DeleteUser(id) => {
            headscale.refresh(&opts).await?;
            let user = state
                .store()
                .user(&id)
                .await
                .with_context(|| format!("User {} not found", id))?;
            print_json(&headscale.delete_user(&user).await?)
        }
        Command::DeleteNode(id) => {
            headscale.refresh(&opts).await?;
            let node = state
                .store()
                .node(&id)
                .await
                .with_context(|| format!("Node {} not found", id))?;
            print_json(&headscale.delete_node(&node).await?)
        }
        Command::DeletePreAuthKey(id) => {
            headscale.refresh(&opts).await?;
            let pak = state
                .store()
                .pre_auth_key(&id)
                .await
                .with_context(|| format!("Pre-auth key {} not found", id))?;
            print_json(&headscale.delete_pre_auth_key(&pak).await?)
        }
        Command::ExpireApiKey(key) => match headscale.expire_api_key(&key).await? {
            ExpireOutcome::Expired { prefix } => {
                println!("Expired API key with prefix {}", prefix);
                Ok(())
            }
            ExpireOutcome::Skipped => {
                println!("No API key prefix found, nothing expired");
                Ok(())
            }
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize logging based on configuration
fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_config = &config.logging;

    match &log_config.target {
        LogTarget::Console => {
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_console_logging(subscriber, &log_config.format);
            None
        }
        LogTarget::File => {
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_file_logging(subscriber, &log_config.format, writer);
            Some(guard)
        }
        LogTarget::Both => {
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_file_logging(
                subscriber.with(console_layer(&log_config.format)),
                &log_config.format,
                writer,
            );
            Some(guard)
        }
    }
}

/// Create a file writer with optional daily rotation
fn create_file_writer(
    log_config: &config::LoggingConfig,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    // Ensure log directory exists
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let file_appender = if log_config.daily_rotation {
        tracing_appender::rolling::daily(&log_config.log_dir, &log_config.log_prefix)
    } else {
        tracing_appender::rolling::never(&log_config.log_dir, &log_config.log_prefix)
    };

    tracing_appender::non_blocking(file_appender)
}

/// Console layer writing to stderr, keeping stdout for command output
fn console_layer<S>(format: &LogFormat) -> Box<dyn tracing_subscriber::Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    use tracing_subscriber::fmt;

    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .boxed(),
    }
}

/// Initialize console-only logging
fn init_console_logging<S>(subscriber: S, format: &LogFormat)
where
    S: tracing::Subscriber
        + for<'a> tracing_subscriber::registry::LookupSpan<'a>
        + Send
        + Sync
        + 'static,
{
    subscriber.with(console_layer(format)).init();
}

/// Initialize file logging on top of whatever layers `subscriber` already has
fn init_file_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber
        + for<'a> tracing_subscriber::registry::LookupSpan<'a>
        + Send
        + Sync
        + 'static,
{
    use tracing_subscriber::fmt;

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(writer))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(writer),
                )
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
        }
    }
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        r#"Headscale Admin {}

USAGE:
    headscale-admin <COMMAND> [ARGS]

COMMANDS:
    users [--id ID | --name NAME | --email EMAIL]
                            List users, optionally filtered by one criterion
    nodes                   List nodes
    preauthkeys [USER_ID...]
                            List pre-auth keys, optionally only those owned
                            by the given users
    apikeys                 List API key prefixes
    policy                  Print the policy document
    set-policy FILE         Replace the policy document with FILE
    delete-user ID          Delete a user
    delete-node ID          Delete a node
    delete-preauthkey ID    Delete a pre-auth key
    expire-apikey KEY       Expire the API key identified by KEY's prefix

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --init-config [PATH]    Write a default configuration file (default: config.yaml)

ENVIRONMENT:
    HEADSCALE_ADMIN_CONFIG  Path to configuration file
    HEADSCALE_URL           Headscale server URL
    HEADSCALE_API_KEY       API key used as bearer token
    HEADSCALE_TIMEOUT       Request timeout in seconds
    HEADSCALE_SSL_CA        Extra CA bundle (PEM) trusted for the server
    RUST_LOG                Log filter (default: warn)
    HEADSCALE_ADMIN_LOG_FORMAT
                            Log format: pretty, json or compact

CONFIGURATION:
    The application looks for configuration files in the following order:
    1. Path specified by HEADSCALE_ADMIN_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/headscale-admin/config.yaml
    5. $XDG_CONFIG_HOME/headscale-admin/config.yaml"#,
        env!("CARGO_PKG_VERSION")
    )
}
