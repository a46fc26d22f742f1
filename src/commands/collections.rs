use clap::{Args, Subcommand};
use std::path::PathBuf;

use atelier::admin::{
    CategoryPatch, CollectionEditor, ContactPatch, DeleteOutcome, GalleryPatch, ImageInput,
    NewCategory, NewGalleryItem, NewService, NewSocialLink, ServicePatch, SocialPatch,
};
use atelier::icons::SocialPreset;
use atelier::models::{
    Category, ContactStatus, ContactSubmission, GalleryItem, Record, Service, SocialLink,
};
use atelier::upload::{ImageHost, ImageUpload};
use atelier::RemoteStore;

use super::{load, truncate, CliError, Context, OutputFormat};

type Editor<T> = CollectionEditor<RemoteStore, T>;

/// Opens the editor for `T` and waits for its first snapshot.
async fn open<T: Record>(ctx: &Context) -> Result<Editor<T>, CliError> {
    let editor = Editor::<T>::open(ctx.store()?, ctx.session()?, ctx.notifier.clone()).await?;
    load(T::COLLECTION, editor.ready()).await?;
    Ok(editor)
}

/// Like [`open`] for writes: fails early without a session.
async fn open_for_write<T: Record>(ctx: &Context) -> Result<Editor<T>, CliError> {
    ctx.admin_session()?;
    open(ctx).await
}

async fn remove<T: Record>(ctx: &Context, id: &str) -> Result<(), CliError> {
    let editor = open_for_write::<T>(ctx).await?;
    if editor.find(id).is_none() {
        return Err(CliError::Usage(format!("No {} with id {}", T::NOUN, id)));
    }

    let confirm = |prompt: &str| ctx.confirm(prompt);
    match editor.delete(id, &confirm).await? {
        DeleteOutcome::Deleted => println!("Deleted {} {}", T::NOUN, id),
        DeleteOutcome::Cancelled => println!("Cancelled."),
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(items: &[T]) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(items)?);
    Ok(())
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Args)]
pub struct CategoriesCommand {
    #[command(subcommand)]
    pub command: CategoriesSubcommand,
}

#[derive(Subcommand)]
pub enum CategoriesSubcommand {
    /// List gallery categories
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Add a category
    Add {
        /// Display name
        name: String,
        /// URL slug (derived from the name when omitted)
        #[arg(long)]
        slug: Option<String>,
    },
    /// Rename a category or change its slug
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Delete a category
    Remove { id: String },
}

impl CategoriesCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), CliError> {
        match &self.command {
            CategoriesSubcommand::List { format } => {
                let editor = open::<Category>(ctx).await?;
                let items = editor.items();
                match format {
                    OutputFormat::Json => print_json(&items)?,
                    OutputFormat::Text if items.is_empty() => println!("No categories."),
                    OutputFormat::Text => {
                        println!("{:<22} {:<24} SLUG", "ID", "NAME");
                        println!("{}", "-".repeat(70));
                        for category in items {
                            println!(
                                "{:<22} {:<24} {}",
                                category.id,
                                truncate(&category.name, 24),
                                category.slug
                            );
                        }
                    }
                }
            }
            CategoriesSubcommand::Add { name, slug } => {
                let editor = open_for_write::<Category>(ctx).await?;
                let id = editor
                    .create(NewCategory {
                        name: name.clone(),
                        slug: slug.clone(),
                    })
                    .await?;
                println!("Added category {} ({})", name, id);
            }
            CategoriesSubcommand::Update { id, name, slug } => {
                let editor = open_for_write::<Category>(ctx).await?;
                editor
                    .update(
                        id,
                        CategoryPatch {
                            name: name.clone(),
                            slug: slug.clone(),
                        },
                    )
                    .await?;
                println!("Updated category {}", id);
            }
            CategoriesSubcommand::Remove { id } => remove::<Category>(ctx, id).await?,
        }
        Ok(())
    }
}

// ============================================================================
// Services
// ============================================================================

#[derive(Args)]
pub struct ServicesCommand {
    #[command(subcommand)]
    pub command: ServicesSubcommand,
}

#[derive(Subcommand)]
pub enum ServicesSubcommand {
    /// List services
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Add a service
    Add {
        title: String,
        #[arg(long)]
        description: String,
        /// Icon name (Hammer, Palette, Brush, ...)
        #[arg(long)]
        icon: String,
    },
    /// Update a service
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a service
    Remove { id: String },
}

impl ServicesCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), CliError> {
        match &self.command {
            ServicesSubcommand::List { format } => {
                let editor = open::<Service>(ctx).await?;
                let items = editor.items();
                match format {
                    OutputFormat::Json => print_json(&items)?,
                    OutputFormat::Text if items.is_empty() => println!("No services."),
                    OutputFormat::Text => {
                        println!("{:<22} {:<3} {:<28} DESCRIPTION", "ID", "", "TITLE");
                        println!("{}", "-".repeat(90));
                        for service in items {
                            println!(
                                "{:<22} {:<3} {:<28} {}",
                                service.id,
                                service.icon().symbol(),
                                truncate(&service.title, 28),
                                truncate(&service.description, 36)
                            );
                        }
                    }
                }
            }
            ServicesSubcommand::Add {
                title,
                description,
                icon,
            } => {
                let editor = open_for_write::<Service>(ctx).await?;
                let id = editor
                    .create(NewService {
                        title: title.clone(),
                        description: description.clone(),
                        icon: icon.clone(),
                    })
                    .await?;
                println!("Added service {} ({})", title, id);
            }
            ServicesSubcommand::Update {
                id,
                title,
                description,
                icon,
            } => {
                let editor = open_for_write::<Service>(ctx).await?;
                editor
                    .update(
                        id,
                        ServicePatch {
                            title: title.clone(),
                            description: description.clone(),
                            icon: icon.clone(),
                        },
                    )
                    .await?;
                println!("Updated service {}", id);
            }
            ServicesSubcommand::Remove { id } => remove::<Service>(ctx, id).await?,
        }
        Ok(())
    }
}

// ============================================================================
// Gallery
// ============================================================================

#[derive(Args)]
pub struct GalleryCommand {
    #[command(subcommand)]
    pub command: GallerySubcommand,
}

#[derive(Subcommand)]
pub enum GallerySubcommand {
    /// List gallery works
    List {
        /// Only works in this category slug
        #[arg(long)]
        category: Option<String>,
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Add a work, either from an image URL or by uploading a file
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Category slug
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, conflicts_with = "image_file")]
        image_url: Option<String>,
        /// Local image to upload to the image host
        #[arg(long)]
        image_file: Option<PathBuf>,
    },
    /// Update a work
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Delete a work
    Remove { id: String },
}

impl GalleryCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), CliError> {
        match &self.command {
            GallerySubcommand::List { category, format } => {
                let editor = open::<GalleryItem>(ctx).await?;
                let items: Vec<GalleryItem> = editor
                    .items()
                    .into_iter()
                    .filter(|item| category.as_ref().map_or(true, |c| &item.category == c))
                    .collect();
                match format {
                    OutputFormat::Json => print_json(&items)?,
                    OutputFormat::Text if items.is_empty() => println!("No works."),
                    OutputFormat::Text => {
                        println!("{:<22} {:<28} {:<16} IMAGE", "ID", "TITLE", "CATEGORY");
                        println!("{}", "-".repeat(100));
                        for item in items {
                            println!(
                                "{:<22} {:<28} {:<16} {}",
                                item.id,
                                truncate(&item.title, 28),
                                truncate(&item.category, 16),
                                item.image_url
                            );
                        }
                    }
                }
            }
            GallerySubcommand::Add {
                title,
                description,
                category,
                image_url,
                image_file,
            } => {
                let editor = open_for_write::<GalleryItem>(ctx).await?;
                let image = match (image_url, image_file) {
                    (Some(url), _) => ImageInput::url(url.clone()),
                    (None, Some(path)) => ImageInput::upload(ImageUpload::from_path(path)?),
                    (None, None) => ImageInput::default(),
                };
                let host = ImageHost::from_config(&ctx.config).ok();
                let id = editor
                    .create(
                        NewGalleryItem {
                            title: title.clone(),
                            description: description.clone(),
                            category: category.clone(),
                            image,
                        },
                        host.as_ref(),
                    )
                    .await?;
                println!("Added work {} ({})", title, id);
            }
            GallerySubcommand::Update {
                id,
                title,
                description,
                category,
                image_url,
            } => {
                let editor = open_for_write::<GalleryItem>(ctx).await?;
                editor
                    .update(
                        id,
                        GalleryPatch {
                            title: title.clone(),
                            description: description.clone(),
                            category: category.clone(),
                            image_url: image_url.clone(),
                        },
                    )
                    .await?;
                println!("Updated work {}", id);
            }
            GallerySubcommand::Remove { id } => remove::<GalleryItem>(ctx, id).await?,
        }
        Ok(())
    }
}

// ============================================================================
// Social links
// ============================================================================

#[derive(Args)]
pub struct SocialCommand {
    #[command(subcommand)]
    pub command: SocialSubcommand,
}

#[derive(Subcommand)]
pub enum SocialSubcommand {
    /// List social links
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Add a link, from a preset (vk.com, Instagram, ...) or by hand
    Add {
        url: String,
        /// Preset name or domain; fills platform and icon
        #[arg(long)]
        preset: Option<String>,
        #[arg(long, default_value = "")]
        platform: String,
        /// Icon class (e.g. "fab fa-vk")
        #[arg(long, default_value = "")]
        icon: String,
    },
    /// Update a link
    Update {
        id: String,
        #[arg(long)]
        platform: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a link
    Remove { id: String },
}

impl SocialCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), CliError> {
        match &self.command {
            SocialSubcommand::List { format } => {
                let editor = open::<SocialLink>(ctx).await?;
                let items = editor.items();
                match format {
                    OutputFormat::Json => print_json(&items)?,
                    OutputFormat::Text if items.is_empty() => println!("No social links."),
                    OutputFormat::Text => {
                        println!("{:<22} {:<16} URL", "ID", "PLATFORM");
                        println!("{}", "-".repeat(80));
                        for link in items {
                            println!(
                                "{:<22} {:<16} {}",
                                link.id,
                                truncate(&link.platform, 16),
                                link.url
                            );
                        }
                    }
                }
            }
            SocialSubcommand::Add {
                url,
                preset,
                platform,
                icon,
            } => {
                let input = match preset {
                    Some(key) => {
                        let preset = SocialPreset::find(key).ok_or_else(|| {
                            CliError::Usage(format!("Unknown social preset: {}", key))
                        })?;
                        NewSocialLink::from_preset(preset, url)
                    }
                    None => NewSocialLink {
                        platform: platform.clone(),
                        url: url.clone(),
                        icon: icon.clone(),
                    },
                };
                let editor = open_for_write::<SocialLink>(ctx).await?;
                let platform = input.platform.clone();
                let id = editor.create(input).await?;
                println!("Added {} link ({})", platform, id);
            }
            SocialSubcommand::Update {
                id,
                platform,
                url,
                icon,
            } => {
                let editor = open_for_write::<SocialLink>(ctx).await?;
                editor
                    .update(
                        id,
                        SocialPatch {
                            platform: platform.clone(),
                            url: url.clone(),
                            icon: icon.clone(),
                        },
                    )
                    .await?;
                println!("Updated link {}", id);
            }
            SocialSubcommand::Remove { id } => remove::<SocialLink>(ctx, id).await?,
        }
        Ok(())
    }
}

// ============================================================================
// Contacts
// ============================================================================

#[derive(Args)]
pub struct ContactsCommand {
    #[command(subcommand)]
    pub command: ContactsSubcommand,
}

#[derive(Subcommand)]
pub enum ContactsSubcommand {
    /// List contact requests
    List {
        /// Only requests with this status (new, in-progress, completed)
        #[arg(long)]
        status: Option<String>,
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Move a request to another status
    Status { id: String, status: String },
    /// Correct a request's details
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },
    /// Delete a request
    Remove { id: String },
}

impl ContactsCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), CliError> {
        match &self.command {
            ContactsSubcommand::List { status, format } => {
                let wanted = status
                    .as_deref()
                    .map(str::parse::<ContactStatus>)
                    .transpose()
                    .map_err(CliError::Usage)?;
                let inbox = open_for_write::<ContactSubmission>(ctx).await?;
                let items: Vec<ContactSubmission> = inbox
                    .items()
                    .into_iter()
                    .filter(|c| wanted.map_or(true, |s| c.status == s))
                    .collect();

                match format {
                    OutputFormat::Json => print_json(&items)?,
                    OutputFormat::Text => {
                        if items.is_empty() {
                            println!("No contact requests.");
                        } else {
                            print_contacts(&items);
                        }
                        println!();
                        let counts = inbox
                            .count_by_status()
                            .iter()
                            .map(|(status, n)| format!("{}: {}", status, n))
                            .collect::<Vec<_>>()
                            .join(", ");
                        println!("Total: {} ({})", inbox.len(), counts);
                    }
                }
            }
            ContactsSubcommand::Status { id, status } => {
                let status: ContactStatus = status.parse().map_err(CliError::Usage)?;
                let inbox = open_for_write::<ContactSubmission>(ctx).await?;
                inbox.set_status(id, status).await?;
                println!("{} is now {}", id, status);
            }
            ContactsSubcommand::Update {
                id,
                name,
                email,
                phone,
                service,
                message,
            } => {
                let inbox = open_for_write::<ContactSubmission>(ctx).await?;
                inbox
                    .update(
                        id,
                        ContactPatch {
                            name: name.clone(),
                            email: email.clone(),
                            phone: phone.clone(),
                            service: service.clone(),
                            message: message.clone(),
                            status: None,
                        },
                    )
                    .await?;
                println!("Updated request {}", id);
            }
            ContactsSubcommand::Remove { id } => remove::<ContactSubmission>(ctx, id).await?,
        }
        Ok(())
    }
}

fn print_contacts(items: &[ContactSubmission]) {
    println!(
        "{:<22} {:<12} {:<20} {:<26} MESSAGE",
        "ID", "STATUS", "NAME", "EMAIL"
    );
    println!("{}", "-".repeat(110));
    for contact in items {
        println!(
            "{:<22} {:<12} {:<20} {:<26} {}",
            contact.id,
            contact.status.to_string(),
            truncate(&contact.name, 20),
            truncate(&contact.email, 26),
            truncate(&contact.message, 30)
        );
    }
}
