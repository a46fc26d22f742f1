use clap::{Args, Subcommand};

use atelier::content::{ContentRegistry, EditableField, Sections};
use atelier::models::{section_ids, ContentKind};
use atelier::site::slots;
use atelier::store::{Fields, RemoteStore};

use super::{load, CliError, Context, OutputFormat};

#[derive(Args)]
pub struct ContentCommand {
    #[command(subcommand)]
    pub command: ContentSubcommand,
}

#[derive(Subcommand)]
pub enum ContentSubcommand {
    /// Show the value of a content slot
    Get {
        /// Slot id (e.g. hero-title)
        id: String,

        /// Fallback when the slot is unknown and unset
        #[arg(long)]
        default: Option<String>,
    },

    /// Edit a content slot
    Set {
        /// Slot id (e.g. hero-title)
        id: String,

        /// New value
        value: String,

        /// Content type: text, link or image
        #[arg(long)]
        kind: Option<String>,
    },

    /// List every home page slot with its current value
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or edit a page section (hero-section, about-section, ...)
    Section {
        /// Section id
        id: String,

        /// Values to merge into the section, as key=value
        #[arg(value_name = "KEY=VALUE")]
        values: Vec<String>,
    },
}

impl ContentCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), CliError> {
        match &self.command {
            ContentSubcommand::Get { id, default } => self.get(ctx, id, default.as_deref()).await,
            ContentSubcommand::Set { id, value, kind } => {
                self.set(ctx, id, value, kind.as_deref()).await
            }
            ContentSubcommand::List { format } => self.list(ctx, *format).await,
            ContentSubcommand::Section { id, values } => self.section(ctx, id, values).await,
        }
    }

    /// Registry over the configured store, or the offline defaults.
    async fn registry(&self, ctx: &Context) -> Result<ContentRegistry<RemoteStore>, CliError> {
        let store = match ctx.config.store_url() {
            Some(_) => Some(ctx.store()?),
            None => None,
        };
        let registry = ContentRegistry::open(store, ctx.notifier.clone()).await;
        load("content", registry.ready()).await?;
        Ok(registry)
    }

    async fn get(&self, ctx: &Context, id: &str, default: Option<&str>) -> Result<(), CliError> {
        let fallback = match default {
            Some(default) => default,
            None => slots::find(id).map(|slot| slot.default).unwrap_or_default(),
        };
        let registry = self.registry(ctx).await?;
        println!("{}", registry.get(id, fallback));
        Ok(())
    }

    async fn set(
        &self,
        ctx: &Context,
        id: &str,
        value: &str,
        kind: Option<&str>,
    ) -> Result<(), CliError> {
        let session = ctx.admin_session()?;
        let registry = self.registry(ctx).await?;

        let mut field = match slots::find(id) {
            Some(slot) => slot.field(),
            None => EditableField::new(id, ""),
        };
        if let Some(kind) = kind {
            let kind: ContentKind = kind.parse().map_err(CliError::Usage)?;
            field = field.with_kind(kind);
        }

        field.begin_edit(&registry, &session)?;
        field.set_draft(value)?;
        let report = field.save(&registry, &session).await?;

        if let Some(warning) = report.remote {
            return Err(CliError::Usage(format!(
                "{} was not saved to the store: {}",
                warning.id, warning.error
            )));
        }
        println!("{} = {}", id, report.value);
        Ok(())
    }

    async fn list(&self, ctx: &Context, format: OutputFormat) -> Result<(), CliError> {
        let registry = self.registry(ctx).await?;
        let values: Vec<(&str, String)> = slots::all()
            .into_iter()
            .map(|slot| (slot.id, registry.get(slot.id, slot.default)))
            .collect();

        match format {
            OutputFormat::Json => {
                let map: serde_json::Map<String, serde_json::Value> = values
                    .into_iter()
                    .map(|(id, value)| (id.to_string(), serde_json::Value::String(value)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
            }
            OutputFormat::Text => {
                println!("{:<24} VALUE", "SLOT");
                println!("{}", "-".repeat(72));
                for (id, value) in values {
                    println!("{:<24} {}", id, super::truncate(&value, 48));
                }
            }
        }
        Ok(())
    }

    async fn section(&self, ctx: &Context, id: &str, values: &[String]) -> Result<(), CliError> {
        let sections = Sections::open(ctx.store()?, ctx.notifier.clone()).await?;
        load("sections", sections.ready()).await?;

        if values.is_empty() {
            match sections.section(id) {
                Some(blob) => println!("{}", serde_json::to_string_pretty(&blob.fields)?),
                None if is_known_section(id) => println!("{} has no saved values.", id),
                None => return Err(CliError::Usage(format!("Unknown section: {}", id))),
            }
            return Ok(());
        }

        let session = ctx.admin_session()?;
        let fields = parse_assignments(values)?;
        sections.save(&session, id, fields).await?;
        println!("Updated {}", id);
        Ok(())
    }
}

fn is_known_section(id: &str) -> bool {
    [
        section_ids::HERO,
        section_ids::ABOUT,
        section_ids::NAV,
        section_ids::NAV_SHOP,
        section_ids::FOOTER,
    ]
    .contains(&id)
}

/// Parses `key=value` arguments into section fields.
fn parse_assignments(values: &[String]) -> Result<Fields, CliError> {
    let mut fields = Fields::new();
    for value in values {
        let Some((key, text)) = value.split_once('=') else {
            return Err(CliError::Usage(format!(
                "Expected KEY=VALUE, got '{}'",
                value
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::Usage(format!("Missing key in '{}'", value)));
        }
        fields.insert(key.to_string(), serde_json::Value::String(text.to_string()));
    }
    Ok(fields)
}
