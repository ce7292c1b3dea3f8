use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use weathernow_core::{
    Config, SearchOutcome, SearchSession, provider_from_config, summarizer_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathernow", version, about = "Current weather with a short summary")]
pub struct Cli {
    /// OpenWeather API key; takes precedence over the config file.
    #[arg(long, env = "WEATHERNOW_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Log debug output to stderr (RUST_LOG overrides this).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `interactive`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show weather for a city.
    Show {
        /// City name, e.g. "Paris".
        city: String,

        /// Print the record and summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Prompt for cities until Esc or Ctrl-C.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show { ref city, json }) => {
                let config = self.load_config()?;
                let session = build_session(&config)?;
                show(&session, &config, city, json).await
            }
            Some(Command::Interactive) | None => {
                let config = self.load_config()?;
                let session = build_session(&config)?;
                interactive(&session, &config).await
            }
        }
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load()?;
        if let Some(key) = &self.api_key {
            config.set_api_key(key.clone());
        }
        Ok(config)
    }
}

fn build_session(config: &Config) -> anyhow::Result<Arc<SearchSession>> {
    let provider = provider_from_config(config)?;
    let summarizer = summarizer_from_config(&config.summary)
        .context("Failed to set up the text generation client")?;
    Ok(Arc::new(SearchSession::new(provider, summarizer)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let key = key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(key.to_string());
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    session: &Arc<SearchSession>,
    config: &Config,
    city: &str,
    json: bool,
) -> anyhow::Result<()> {
    session.set_input(city).await;

    match search(session, !json).await? {
        SearchOutcome::Ignored => {
            eprintln!("Please enter a city name.");
            Ok(())
        }
        SearchOutcome::Failed(err) => Err(err.into()),
        SearchOutcome::Found { record, summary } if json => {
            let out = serde_json::json!({
                "record": record,
                "icon_url": record.icon_url(&config.weather.icon_base_url),
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
        SearchOutcome::Found { .. } | SearchOutcome::Superseded => {
            let state = session.snapshot().await;
            println!("{}", render::format_state(&state, &config.weather.icon_base_url));
            Ok(())
        }
    }
}

async fn interactive(session: &Arc<SearchSession>, config: &Config) -> anyhow::Result<()> {
    loop {
        let input = Text::new("City:")
            .with_help_message("Enter to search, Esc to quit")
            .prompt();

        let input = match input {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read city name"),
        };

        session.set_input(input).await;
        if let SearchOutcome::Ignored = search(session, true).await? {
            continue;
        }

        let state = session.snapshot().await;
        println!("{}\n", render::format_state(&state, &config.weather.icon_base_url));
    }

    Ok(())
}

/// Run one search, reporting the busy flags on stderr while it is in flight.
async fn search(session: &Arc<SearchSession>, progress: bool) -> anyhow::Result<SearchOutcome> {
    let mut updates = session.subscribe();
    let mut task = {
        let session = Arc::clone(session);
        tokio::spawn(async move { session.submit().await })
    };

    let mut watching = progress;
    let mut announced_fetch = false;
    let mut announced_summary = false;
    loop {
        tokio::select! {
            outcome = &mut task => return outcome.context("Search task failed"),
            changed = updates.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }
                let state = updates.borrow_and_update().clone();
                if state.is_loading && !announced_fetch {
                    eprintln!("Searching…");
                    announced_fetch = true;
                }
                if state.is_summarizing && !announced_summary {
                    eprintln!("Generating summary…");
                    announced_summary = true;
                }
            }
        }
    }
}
