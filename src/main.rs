use incidens_console::{
    api::ApiClient, config::Config, console::Console, error::ConsoleError, observability,
    session::SessionStore,
};
use std::{path::PathBuf, sync::Arc};

const USAGE: &str = "\
Usage: incidens-console [OPTIONS]

Options:
  -c, --config <path>   Path to YAML config file
      --base-url <url>  Incidens API base URL (overrides config)
  -h, --help            Print help
";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliOptions {
    config_path: Option<PathBuf>,
    base_url: Option<String>,
    help: bool,
}

fn parse_cli_args<I>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                options.help = true;
            }
            "-c" | "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --config".to_string())?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--base-url" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --base-url".to_string())?;
                options.base_url = Some(value);
            }
            _ if arg.starts_with("--config=") => {
                let value = arg.trim_start_matches("--config=");
                if value.is_empty() {
                    return Err("missing value for --config".to_string());
                }
                options.config_path = Some(PathBuf::from(value));
            }
            _ if arg.starts_with("--base-url=") => {
                let value = arg.trim_start_matches("--base-url=");
                if value.is_empty() {
                    return Err("missing value for --base-url".to_string());
                }
                options.base_url = Some(value.to_string());
            }
            _ => return Err(format!("unknown argument: {arg}")),
        }
    }
    Ok(options)
}

#[tokio::main]
async fn main() {
    let options = match parse_cli_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    if options.help {
        println!("{USAGE}");
        return;
    }

    let loaded = match options.config_path {
        Some(config_path) => Config::from_env_with_config_file(config_path),
        None => Config::from_env(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(2);
        }
    };
    if let Some(base_url) = options.base_url {
        config.api_base_url = base_url;
    }

    let tracing_settings = observability::init_from_env(&config.log_level);
    tracing::debug!(
        log_filter = tracing_settings.filter,
        log_format = tracing_settings.log_format.as_str(),
        "initialized tracing subscriber"
    );

    if let Err(err) = run(config).await {
        eprintln!("console error: {err}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), ConsoleError> {
    let session = Arc::new(SessionStore::open(config.session_file()).await);
    let api = ApiClient::new(&config.api_base_url, config.request_timeout_ms, session)?;
    Console::new(api, config.page_size).run().await
}
