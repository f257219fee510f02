use anyhow::{Context, Result};
use clap::Parser;
use reqdispatch::{Account, BrowserProfile, Dispatcher, Method, RealRuntime, Settings};
use serde_json::Value;
use std::path::PathBuf;

/// reqdispatch - JSON API dispatcher with browser headers and backoff
///
/// Sends one request on behalf of an account and prints the JSON response.
/// Failed calls are retried with capped exponential backoff.
///
/// Examples:
///   reqdispatch get https://api.example.com/api/earn/info --token $TOKEN
///   reqdispatch post https://api.example.com/api/network/ping --data '{"id":"abc"}'
#[derive(Parser, Debug)]
#[command(author, version = env!("REQDISPATCH_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (overrides the default location; also via REQDISPATCH_CONFIG)
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Per-call timeout in seconds (overrides the settings file)
    #[arg(long, value_name = "SECS", global = true)]
    timeout: Option<u64>,

    /// Maximum number of attempts (overrides the settings file)
    #[arg(long, value_name = "N", global = true)]
    max_retries: Option<usize>,

    /// Always use this browser profile instead of a random one
    #[arg(long, value_name = "NAME", global = true)]
    profile: Option<BrowserProfile>,

    /// Seed the random source so profile choice and backoff jitter repeat
    #[arg(long, value_name = "N", global = true)]
    seed: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Send a GET request
    Get(RequestArgs),

    /// Send a POST request
    Post(RequestArgs),

    /// Send a PUT request
    Put(RequestArgs),
}

#[derive(clap::Args, Debug)]
pub struct RequestArgs {
    /// Target URL
    #[arg(value_name = "URL")]
    pub url: String,

    /// JSON object sent as the request body
    #[arg(long, short = 'd', value_name = "JSON")]
    pub data: Option<String>,

    /// Bearer token of the account
    #[arg(long, env = "REQDISPATCH_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Proxy URL used for both http and https
    #[arg(long, env = "REQDISPATCH_PROXY")]
    pub proxy: Option<String>,

    /// Account ordinal shown in log lines
    #[arg(long, default_value_t = 1)]
    pub index: usize,
}

impl Cli {
    fn settings(&self, runtime: &RealRuntime) -> Result<Settings> {
        let mut settings = Settings::load(runtime, self.config.as_deref())?;
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout.max(1);
        }
        if let Some(max_retries) = self.max_retries {
            settings.max_retries = max_retries;
        }
        if let Some(profile) = self.profile {
            settings.fixed_profile = Some(profile);
        }
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime::default();
    let settings = cli.settings(&runtime)?;

    let (method, args) = match cli.command {
        Commands::Get(args) => (Method::Get, args),
        Commands::Post(args) => (Method::Post, args),
        Commands::Put(args) => (Method::Put, args),
    };

    let payload: Option<Value> = args
        .data
        .as_deref()
        .map(|data| serde_json::from_str(data))
        .transpose()
        .context("--data is not valid JSON")?;

    let account = Account::new(args.token, args.proxy, args.index);
    let dispatcher = Dispatcher::new(settings);
    let value = dispatcher
        .retry(&args.url, payload.as_ref(), &account, method)
        .await?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_get_parsing() {
        let cli = Cli::try_parse_from([
            "reqdispatch",
            "get",
            "https://api.example.com/info",
            "--token",
            "abc",
        ])
        .unwrap();
        match cli.command {
            Commands::Get(args) => {
                assert_eq!(args.url, "https://api.example.com/info");
                assert_eq!(args.token, "abc");
                assert_eq!(args.index, 1);
                assert_eq!(args.data, None);
            }
            _ => panic!("Expected Get command"),
        }
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_cli_post_with_data_and_globals() {
        let cli = Cli::try_parse_from([
            "reqdispatch",
            "--timeout",
            "5",
            "post",
            "https://api.example.com/ping",
            "--data",
            r#"{"id":"x"}"#,
            "--token",
            "abc",
            "--proxy",
            "http://127.0.0.1:8080",
            "--index",
            "4",
            "--profile",
            "edge101",
            "--seed",
            "7",
        ])
        .unwrap();
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.profile, Some(BrowserProfile::Edge101));
        assert_eq!(cli.seed, Some(7));
        match cli.command {
            Commands::Post(args) => {
                assert_eq!(args.data.as_deref(), Some(r#"{"id":"x"}"#));
                assert_eq!(args.proxy.as_deref(), Some("http://127.0.0.1:8080"));
                assert_eq!(args.index, 4);
            }
            _ => panic!("Expected Post command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_profile() {
        let result = Cli::try_parse_from([
            "reqdispatch",
            "--profile",
            "netscape",
            "get",
            "https://api.example.com",
            "--token",
            "abc",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["reqdispatch", "https://api.example.com"]);
        assert!(result.is_err());
    }
}
