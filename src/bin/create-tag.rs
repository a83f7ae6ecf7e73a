use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use std::io::Write;
use std::sync::Arc;
use tagform::{
    config::Config,
    tags::{
        derive_slug, CreateTagForm, FormHooks, HttpTagService, SubmitOutcome, TagDraft,
        TagRecord,
    },
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Terminal stand-in for the dialog hosting the form.
struct ConsoleHooks;

impl FormHooks for ConsoleHooks {
    fn created(&self, record: &TagRecord) {
        match &record.id {
            Some(id) => println!("Created tag '{}' ({}) with id {}", record.title, record.slug, id),
            None => println!("Created tag '{}' ({})", record.title, record.slug),
        }
    }

    fn cancelled(&self) {
        println!("Cancelled, nothing was saved");
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let config_file = matches.get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or("tagform.toml");

    // Override config with command line arguments
    let endpoint = matches.get_one::<String>("endpoint").map(|s| s.as_str());
    Config::resolve(config_file, endpoint).with_context(|| match endpoint {
        Some(_) => format!("Cannot use config {} with --endpoint", config_file),
        None => format!("Cannot load config {} (or pass --endpoint)", config_file),
    })
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let log_level = match config.loglevel() {
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Submit, abandoning the request if the user presses Ctrl+C.
async fn submit_interruptible(form: &CreateTagForm) -> SubmitOutcome {
    tokio::select! {
        outcome = form.submit() => outcome,
        _ = tokio::signal::ctrl_c() => {
            form.cancel();
            SubmitOutcome::Cancelled
        }
    }
}

/// Returns true when a tag was created.
fn report(outcome: &SubmitOutcome) -> bool {
    match outcome {
        SubmitOutcome::Created(_) => true,
        SubmitOutcome::Invalid(err) | SubmitOutcome::Rejected(err) => {
            eprintln!("{}: {}", err.field, err.message);
            false
        }
        SubmitOutcome::Failed(message) => {
            eprintln!("Error: {}", message);
            false
        }
        SubmitOutcome::Busy => {
            eprintln!("A submission is already in progress");
            false
        }
        SubmitOutcome::Cancelled => false,
    }
}

async fn run_once(form: &CreateTagForm, title: &str) -> bool {
    form.set_title(title);
    println!("Slug: {}", form.slug());
    report(&submit_interruptible(form).await)
}

async fn run_interactive(form: &CreateTagForm) -> anyhow::Result<bool> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("Tag name: ");
        std::io::stdout().flush()?;

        let title = match lines.next_line().await? {
            Some(line) if !line.is_empty() => line,
            _ => {
                form.cancel();
                return Ok(false);
            }
        };

        form.set_title(title);
        println!("Slug: {}", form.slug());

        let outcome = submit_interruptible(form).await;
        if report(&outcome) {
            return Ok(true);
        }
        if outcome == SubmitOutcome::Cancelled {
            return Ok(false);
        }
        debug!("Prompting again after unsuccessful submit");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("create-tag")
        .version("1.0")
        .about("Create a tag (title + derived slug) on a tag service")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .value_name("URL")
                .help("Base URL of the tag service, overrides the config file")
        )
        .arg(
            Arg::new("title")
                .short('t')
                .long("title")
                .value_name("TEXT")
                .help("Tag name; prompts interactively when omitted")
        )
        .arg(
            Arg::new("slug-only")
                .long("slug-only")
                .action(clap::ArgAction::SetTrue)
                .requires("title")
                .help("Print the slug derived from the title and exit")
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(clap::ArgAction::SetTrue)
                .requires("title")
                .help("Validate and print the request body without sending it")
        )
        .get_matches();

    let title = matches.get_one::<String>("title");

    if matches.get_flag("slug-only") {
        println!("{}", derive_slug(title.map(|s| s.as_str()).unwrap_or_default()));
        return Ok(());
    }

    if matches.get_flag("dry-run") {
        let draft = TagDraft::new(title.cloned().unwrap_or_default());
        if let Err(err) = draft.validate() {
            eprintln!("{}: {}", err.field, err.message);
            std::process::exit(1);
        }
        println!("{}", serde_json::to_string_pretty(&draft.to_new_tag())?);
        return Ok(());
    }

    let config = load_config(&matches)?;
    init_logging(&config)?;

    let service = Arc::new(HttpTagService::new(&config)?);
    info!("Using tag service at {}", service.base_url());

    let form = CreateTagForm::new(service, Arc::new(ConsoleHooks));

    let created = match title {
        Some(title) => run_once(&form, title).await,
        None => run_interactive(&form).await?,
    };

    if !created {
        std::process::exit(1);
    }

    Ok(())
}
