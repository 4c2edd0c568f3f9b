//! Command-line tool for duplicating content with its nested entities.
//!
//! # Usage
//!
//! ```bash
//! # Duplicate node 1 as user 3, without the confirmation prompt
//! duplicate-node duplicate node 1 --actor 3 --yes
//!
//! # Show a stored entity
//! duplicate-node show node 1
//!
//! # Settings
//! duplicate-node settings show
//! duplicate-node settings title --prefix "Duplicate of" --duplicate-status false
//! duplicate-node settings exclude paragraph text field_body
//! ```
//!
//! # Environment Variables
//!
//! See [`duplicate_node::config`] for the full list. A `.env` file is read if present.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use tracing_subscriber::EnvFilter;

use duplicate_node::config::{self, Config};
use duplicate_node::domain::repositories::EntityRepository;
use duplicate_node::error::DuplicateError;
use duplicate_node::state::AppState;

/// Duplicates content entities together with the entities they compose.
#[derive(Parser)]
#[command(name = "duplicate-node")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Duplicate a stored entity and save the copy
    Duplicate {
        /// Entity type, e.g. "node"
        entity_type: String,

        /// Id of the entity to duplicate
        id: u64,

        /// User id that will own the duplicate (defaults to DEFAULT_ACTOR)
        #[arg(short, long)]
        actor: Option<u64>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print a stored entity as JSON
    Show {
        entity_type: String,
        id: u64,
    },

    /// Manage duplication settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

/// Settings subcommands.
#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show,

    /// Update the title prefix and the publication status flag
    Title {
        /// Text placed before duplicated titles (empty string clears it)
        #[arg(short, long)]
        prefix: Option<String>,

        /// Keep the publication status of the source
        #[arg(short, long)]
        duplicate_status: Option<bool>,
    },

    /// Replace the excluded fields of one bundle (no fields clears the bundle)
    Exclude {
        entity_type: String,
        bundle: String,
        fields: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    init_tracing(&config);
    config.print_summary();

    let state = AppState::load(config)
        .await
        .map_err(describe)
        .context("Failed to load content store")?;

    match cli.command {
        Commands::Duplicate {
            entity_type,
            id,
            actor,
            yes,
        } => duplicate(&state, &entity_type, id, actor, yes).await?,
        Commands::Show { entity_type, id } => show(&state, &entity_type, id).await?,
        Commands::Settings { action } => handle_settings_action(&state, action).await?,
    }

    Ok(())
}

/// Initializes the tracing subscriber on stderr, as text or JSON.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Adds the error code and details to a library error.
fn describe(e: DuplicateError) -> anyhow::Error {
    anyhow::anyhow!("{} [{}] {}", e, e.code(), e.details())
}

/// Duplicates an entity with a confirmation prompt.
///
/// # Flow
///
/// 1. Build the duplicate in memory
/// 2. Show what will be created
/// 3. Confirm (unless `--yes` flag)
/// 4. Save the tree and reattach group memberships
/// 5. Write the content store back to disk
async fn duplicate(
    state: &AppState,
    entity_type: &str,
    id: u64,
    actor: Option<u64>,
    skip_confirm: bool,
) -> Result<()> {
    let service = &state.duplication_service;
    let actor = actor.unwrap_or(state.config.default_actor);

    let prepared = service
        .prepare(entity_type, id, actor)
        .await
        .map_err(describe)?;
    let title = service
        .duplicate_page_title(&prepared.source)
        .await
        .map_err(describe)?;

    println!("{}", "Duplicate content".bright_blue().bold());
    println!();
    println!("  Source:       {} {}", entity_type.cyan(), id.to_string().cyan());
    println!("  Title:        {}", title.bright_yellow().bold());
    println!("  Bundle:       {}", prepared.entity.bundle);
    println!(
        "  Translations: {}",
        prepared.entity.langcodes().join(", ")
    );
    println!(
        "  Nested:       {}",
        prepared.entity.nested_entities().len()
    );
    println!("  Groups:       {}", prepared.memberships.len());
    println!("  Owner:        {}", actor);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Save this duplicate?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let saved = match service.commit(prepared).await {
        Ok(saved) => saved,
        Err(e @ DuplicateError::MembershipsIncomplete { .. }) => {
            state.persist().await.map_err(describe)?;
            println!(
                "{} {} {}",
                "Created".green().bold(),
                entity_type,
                e.details()["id"].to_string().bright_white().bold()
            );
            println!(
                "{} {}",
                "Warning:".yellow().bold(),
                "some group memberships were not attached".yellow()
            );
            println!("  {}", e.details()["reason"].as_str().unwrap_or_default());
            println!();
            return Ok(());
        }
        Err(e) => {
            println!("{}", "The duplicate could not be saved.".red().bold());
            return Err(describe(e));
        }
    };
    state.persist().await.map_err(describe)?;

    println!(
        "{} {} {}",
        "Created".green().bold(),
        saved.entity_type,
        saved
            .id
            .map(|id| id.to_string())
            .unwrap_or_default()
            .bright_white()
            .bold()
    );
    println!();

    Ok(())
}

/// Prints a stored entity as pretty JSON.
async fn show(state: &AppState, entity_type: &str, id: u64) -> Result<()> {
    let entity = state
        .entities
        .find_by_id(entity_type, id)
        .await
        .map_err(describe)?;

    match entity {
        Some(entity) => println!("{}", serde_json::to_string_pretty(&entity)?),
        None => println!("{} {} {}", "Not found:".yellow(), entity_type, id),
    }

    Ok(())
}

/// Dispatches settings commands.
async fn handle_settings_action(state: &AppState, action: SettingsAction) -> Result<()> {
    let service = &state.settings_service;

    match action {
        SettingsAction::Show => {
            let settings = service.get().await.map_err(describe)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Title {
            prefix,
            duplicate_status,
        } => {
            let settings = service
                .update_title_settings(prefix, duplicate_status)
                .await
                .map_err(describe)?;

            println!("{}", "Title settings saved".green().bold());
            println!(
                "  Prefix:           {}",
                settings.title_prefix().unwrap_or("(none)").cyan()
            );
            println!("  Duplicate status: {}", settings.duplicate_status);
        }
        SettingsAction::Exclude {
            entity_type,
            bundle,
            fields,
        } => {
            let current = service.get().await.map_err(describe)?;
            let mut selection: BTreeMap<String, Vec<String>> =
                current.exclude.get(&entity_type).cloned().unwrap_or_default();
            selection.insert(bundle.clone(), fields);

            let settings = service
                .set_exclusions(&entity_type, selection)
                .await
                .map_err(describe)?;

            let excluded = settings.excluded_fields(&entity_type, &bundle);
            println!("{}", "Exclusion settings saved".green().bold());
            if excluded.is_empty() {
                println!("  {}.{}: {}", entity_type, bundle, "(none)".bright_black());
            } else {
                println!("  {}.{}: {}", entity_type, bundle, excluded.join(", ").cyan());
            }
        }
    }

    Ok(())
}
