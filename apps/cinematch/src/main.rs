use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    config::{load_settings_from, DEFAULT_SETTINGS_FILE},
    ClassificationController, ClientSettings, Controllers, ConversationController,
    EndpointProfile, ExamplePlot, Rejection,
};
use shared::domain::LifecycleState;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

mod render;
mod repl;

#[derive(Parser, Debug)]
#[command(name = "cinematch", about = "Cinematch assistant and movie genre classifier")]
struct Cli {
    /// Endpoint preset; overrides the settings file and environment.
    #[arg(long, value_enum)]
    profile: Option<Profile>,
    /// Explicit backend URL; wins over --profile.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Profile {
    Local,
    Hosted,
}

impl From<Profile> for EndpointProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Local => EndpointProfile::Local,
            Profile::Hosted => EndpointProfile::Hosted,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive conversation with the assistant.
    Chat,
    /// Send a single message and print the reply.
    Ask {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Predict the genre of a movie plot. Reads stdin when no text is given.
    Classify {
        #[arg(conflicts_with_all = ["example", "file"])]
        text: Option<String>,
        #[arg(long, conflicts_with = "file")]
        example: Option<ExamplePlot>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List the built-in example plots.
    Examples,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let settings = resolve_settings(&cli, |key| std::env::var(key).ok())?;
    let connect = || Controllers::from_settings(&settings);

    match cli.command {
        Command::Examples => {
            for example in ExamplePlot::ALL {
                println!("{}", render::example(example));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Chat => {
            repl::run(&connect()?.conversation).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Ask { message } => ask(&connect()?.conversation, message.join(" ")).await,
        Command::Classify {
            text,
            example,
            file,
        } => {
            let controllers = connect()?;
            let classifier = &controllers.classification;
            match (text, example, file) {
                (_, Some(example), _) => classifier.use_example(example),
                (_, _, Some(path)) => classifier.set_draft(
                    tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("failed to read plot from {}", path.display()))?,
                ),
                (Some(text), _, _) => classifier.set_draft(text),
                (None, None, None) => {
                    let mut text = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut text)
                        .await
                        .context("failed to read plot from stdin")?;
                    classifier.set_draft(text);
                }
            }
            classify(classifier).await
        }
    }
}

/// Settings file and environment first, then command-line flags on top.
/// `--base-url` wins over `--profile`.
fn resolve_settings(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<ClientSettings> {
    let mut settings = load_settings_from(&cli.config, env)
        .with_context(|| format!("failed to load settings from {}", cli.config.display()))?;
    if let Some(profile) = cli.profile {
        settings.set_base_url(EndpointProfile::from(profile).base_url())?;
    }
    if let Some(base_url) = &cli.base_url {
        settings.set_base_url(base_url)?;
    }
    if let Some(secs) = cli.timeout_secs {
        settings.request_timeout = Duration::from_secs(secs);
    }
    Ok(settings)
}

async fn ask(chat: &ConversationController, message: String) -> Result<ExitCode> {
    chat.set_draft(message);
    if let Err(Rejection::EmptyDraft) = chat.submit_and_wait().await {
        eprintln!("{}", chat.view().notice.unwrap_or_default());
        return Ok(ExitCode::FAILURE);
    }

    let view = chat.view();
    if let Some(reply) = view.history.last() {
        println!("{}", reply.content());
    }
    Ok(match view.state {
        LifecycleState::Error => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

async fn classify(classifier: &ClassificationController) -> Result<ExitCode> {
    let mut views = classifier.subscribe();
    eprintln!("{}", render::draft_stats(&classifier.view().draft_stats));

    let handle = match classifier.submit() {
        Ok(handle) => handle,
        Err(_) => {
            eprintln!("{}", classifier.view().notice.unwrap_or_default());
            return Ok(ExitCode::FAILURE);
        }
    };
    eprintln!("Analyzing...");
    while views.borrow_and_update().state.is_pending() {
        if views.changed().await.is_err() {
            break;
        }
    }
    handle.await.context("classification task failed")?;

    let view = classifier.view();
    println!("{}", render::outcome(&view.outcome));
    Ok(match view.state {
        LifecycleState::Success => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
