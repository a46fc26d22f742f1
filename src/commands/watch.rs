use clap::Args;

use atelier::store::{sort_by_order, validate_collection, DocumentStore, StoreEvent};

use super::{CliError, Context, OutputFormat};

/// Print every snapshot pushed for a collection until interrupted
#[derive(Args)]
pub struct WatchCommand {
    /// Collection to watch (content, categories, services, gallery, ...)
    pub collection: String,

    /// Exit after the first snapshot
    #[arg(long)]
    pub once: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl WatchCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), CliError> {
        validate_collection(&self.collection)?;
        let store = ctx.store()?;
        let mut subscription = store.subscribe(&self.collection).await?;

        if !self.once {
            eprintln!("Watching {} (Ctrl+C to stop)", self.collection);
        }

        loop {
            let event = tokio::select! {
                event = subscription.next() => event,
                _ = tokio::signal::ctrl_c() => {
                    eprintln!();
                    return Ok(());
                }
            };

            match event {
                Some(StoreEvent::Snapshot(mut documents)) => {
                    sort_by_order(&mut documents);
                    match self.format {
                        OutputFormat::Json => {
                            let rows: Vec<_> = documents
                                .iter()
                                .map(|doc| {
                                    let mut fields = doc.fields.clone();
                                    fields.insert("id".to_string(), doc.id.clone().into());
                                    fields
                                })
                                .collect();
                            println!("{}", serde_json::to_string(&rows)?);
                        }
                        OutputFormat::Text => {
                            println!(
                                "[{}] {}: {} document(s)",
                                chrono::Local::now().format("%H:%M:%S"),
                                self.collection,
                                documents.len()
                            );
                            for doc in &documents {
                                let fields = serde_json::Value::Object(doc.fields.clone());
                                println!("  {} {}", doc.id, fields);
                            }
                        }
                    }
                    if self.once {
                        return Ok(());
                    }
                }
                Some(StoreEvent::Error(message)) => {
                    eprintln!("! {}: {}", self.collection, message);
                    if self.once {
                        return Err(CliError::Usage(message));
                    }
                }
                None => {
                    eprintln!("Subscription closed by the server.");
                    return Ok(());
                }
            }
        }
    }
}
