use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::browser::{LogNotifier, OfflineFetch, StaticTabs, TabEnumerator, TabsFile};
use crate::config::{self, Config, ConfigError};
use crate::core_service::{CoreService, ServiceError};
use crate::cql::CqlStyle;
use crate::links;
use crate::omnibox::OmniboxAction;
use crate::search_url::{ResultsPage, SearchEndpoint};
use crate::settings::{self, KEY_LIMIT, KEY_ROOT_URL, KEY_SPACE_KEY};
use crate::store::{SqliteStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Service(#[from] ServiceError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "confluence-crx", about = "Confluence search shortcuts from the command line")]
pub struct CliOptions {
    /// Config file (TOML); defaults to the per-user app data directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log debug output (resolved spaces, compiled CQL).
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the search URL for a query.
    Search {
        /// Always use the REST search endpoint.
        #[arg(long, conflicts_with = "site")]
        api: bool,
        /// Always use the site search page.
        #[arg(long)]
        site: bool,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Render a saved `content/search` response body.
    Results {
        /// URL the body was fetched from; its `start=` sets the range.
        request_url: String,
        body: PathBuf,
    },
    /// Print the CQL for a query.
    Cql {
        #[arg(long)]
        web: bool,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Show which space a query is scoped to.
    Space {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Resolve an omnibox entry to the URL it opens.
    Omnibox {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Manage label shortcuts.
    Labels {
        #[command(subcommand)]
        action: LabelAction,
    },
    /// Read or change stored options.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Build a clean link for a Confluence page URL.
    Link {
        url: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Answer JSON requests, one per stdin line.
    Serve,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum LabelAction {
    List,
    Add { label: String, shortcut: Option<String> },
    Remove { label: String, shortcut: Option<String> },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum SettingsAction {
    Show,
    Set { key: String, value: String },
}

pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, String> {
    CliOptions::try_parse_from(std::iter::once("confluence-crx".to_string()).chain(args.iter().cloned()))
        .map_err(|error| error.to_string())
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    let config = config::load(options.config.as_deref())?;
    let level = if options.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    if let Err(error) = crate::logging::init(&config.log_dir, level) {
        eprintln!("[confluence-crx] logging disabled: {error}");
    }
    if !config.config_path.exists() {
        config::save(&config)?;
        log::info!("wrote default config to {}", config.config_path.display());
    }

    let service = build_service(&config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(&service, options.command))
}

pub fn build_service(config: &Config) -> Result<CoreService, RuntimeError> {
    let store = SqliteStore::open_file(&config.store_path)?;
    let tabs: Arc<dyn TabEnumerator> = match &config.tabs_path {
        Some(path) => Arc::new(TabsFile::new(path)),
        None => Arc::new(StaticTabs::default()),
    };
    Ok(CoreService::new(
        Arc::new(store),
        tabs,
        Arc::new(OfflineFetch),
        Arc::new(LogNotifier),
    ))
}

pub async fn execute(service: &CoreService, command: Command) -> Result<(), RuntimeError> {
    match command {
        Command::Search { api, site, query } => {
            let endpoint = match (api, site) {
                (true, _) => Some(SearchEndpoint::Api),
                (_, true) => Some(SearchEndpoint::Site),
                _ => None,
            };
            let plan = service.search_with(&query.join(" "), endpoint).await?;
            println!("{}", plan.url);
        }
        Command::Results { request_url, body } => {
            let raw = std::fs::read_to_string(&body)?;
            let body: Value = serde_json::from_str(&raw)
                .map_err(|e| RuntimeError::Invalid(format!("{}: {e}", body.display())))?;
            print_results(&service.read_results(&request_url, body).await?);
        }
        Command::Cql { web, query } => {
            let style = if web { CqlStyle::Web } else { CqlStyle::Rest };
            println!("{}", service.cql(&query.join(" "), style).await?);
        }
        Command::Space { query } => {
            let space = service.resolve_space(&query.join(" ")).await?;
            let status = space.status_text();
            match space.key {
                Some(key) if status.is_empty() => println!("{key}"),
                Some(key) => println!("{key} ({status})"),
                None if status.is_empty() => println!("(no space restriction)"),
                None => println!("(no space restriction: {status})"),
            }
        }
        Command::Omnibox { query } => match service.omnibox(&query.join(" ")).await? {
            OmniboxAction::NoSpace => return Err(ServiceError::SpaceKeyNotFound.into()),
            action => {
                if let Some(url) = action.url() {
                    println!("{url}");
                }
            }
        },
        Command::Labels { action } => run_label_action(service, action).await?,
        Command::Settings { action } => run_settings_action(service, action).await?,
        Command::Link { url, title } => {
            let settings = service.settings().await?;
            let link = links::nice_link(
                &url,
                title.as_deref().unwrap_or(url.as_str()),
                &settings.root_url,
            );
            log::info!("{}", link.hint());
            match title {
                Some(_) => println!("{}", link.html()),
                None => println!("{}", link.url),
            }
        }
        Command::Serve => {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                println!("{}", crate::transport::handle_json(service, &line).await);
            }
        }
    }
    Ok(())
}

fn print_results(page: &ResultsPage) {
    if let Some(url) = &page.quick_open_url {
        println!("{url}");
        return;
    }
    println!("{}", page.range_message);
    for result in &page.results {
        match &result.space_key {
            Some(key) => println!("{}\t{}\t{key}", result.title, result.url),
            None => println!("{}\t{}", result.title, result.url),
        }
    }
    if let Some(prev) = &page.prev_url {
        println!("prev: {prev}");
    }
    if let Some(next) = &page.next_url {
        println!("next: {next}");
    }
}

async fn run_label_action(service: &CoreService, action: LabelAction) -> Result<(), RuntimeError> {
    let labels = service.labels();
    let saved = match action {
        LabelAction::List => {
            for (label, shortcuts) in labels.get().await {
                println!("{label}: {}", shortcuts.join(", "));
            }
            return Ok(());
        }
        LabelAction::Add { label, shortcut } => {
            labels
                .add(shortcut.as_deref().unwrap_or_default(), &label)
                .await
        }
        LabelAction::Remove { label, shortcut } => labels.remove(&label, shortcut.as_deref()).await,
        LabelAction::Clear => labels.clear().await,
    };
    if saved {
        Ok(())
    } else {
        Err(RuntimeError::Invalid(
            "failed to save label dictionary".to_string(),
        ))
    }
}

async fn run_settings_action(
    service: &CoreService,
    action: SettingsAction,
) -> Result<(), RuntimeError> {
    match action {
        SettingsAction::Show => {
            let current = service.settings().await?;
            println!("rooturl = {}", current.root_url);
            println!("spacekey = {}", current.space_key.unwrap_or_default());
            println!(
                "defspace = {}",
                current
                    .default_space
                    .map(|mode| mode.as_str())
                    .unwrap_or_default()
            );
            println!("type = {}", current.content_type.as_str());
            println!("limit = {}", current.limit);
            println!("advancedsearch = {}", current.advanced_search);
        }
        SettingsAction::Set { key, value } => {
            let value = normalize_setting(&key, &value).map_err(RuntimeError::Invalid)?;
            service.store().set(&key, value).await?;
        }
    }
    Ok(())
}

/// Applies the same cleanup the options page does before saving.
pub fn normalize_setting(key: &str, value: &str) -> Result<Value, String> {
    match key {
        KEY_ROOT_URL => settings::normalize_root_url(value).map(Value::String),
        KEY_SPACE_KEY => Ok(Value::String(
            settings::normalize_space_keys(value).unwrap_or_default(),
        )),
        KEY_LIMIT => {
            let limit: u32 = value
                .trim()
                .parse()
                .map_err(|_| format!("Limit must be a number, got '{value}'."))?;
            settings::validate_limit(limit)?;
            Ok(Value::String(limit.to_string()))
        }
        _ => Ok(Value::String(value.to_string())),
    }
}
