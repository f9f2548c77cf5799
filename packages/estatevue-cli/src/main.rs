//! EstateVue terminal front end.
//!
//! Drives the same stores a browser front end would: every command starts
//! the app, dispatches user intents, and prints the settled state.

mod console;
mod demo;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estatevue::{
    sample_listings, App, AppConfig, AppDeps, AppEvent, AppHandle, CatalogEvent, DraftEdit,
    ImageRef, InMemoryPropertyRepository, JsonFilePreferenceStore, ListingId, PropertyFilter,
    PropertyType, SubmissionStatus, ThemePreference, WizardEvent, WizardStep,
};
use property_client::{GraphQLPropertyRepository, TokenAuthProvider};

use crate::console::ConsoleNotifier;
use crate::demo::DemoAuthProvider;

#[derive(Parser)]
#[command(name = "ev")]
#[command(about = "Browse, favorite and list properties")]
struct Cli {
    /// Use built-in sample listings and a signed-in demo agent
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the first page of the catalog
    List {
        /// Match against title or location
        #[arg(long)]
        search: Option<String>,

        /// house, apartment, condo, land, commercial or all
        #[arg(long = "type", value_parser = parse_filter)]
        property_type: Option<PropertyFilter>,
    },

    /// Mark a property as a favorite
    Favorite {
        id: i64,

        /// Remove from favorites instead
        #[arg(long)]
        remove: bool,
    },

    /// Ask to be put in touch with a listing's agent
    Contact { id: i64 },

    /// List a new property through the four-step wizard
    Create(CreateArgs),

    /// Show or switch the color theme
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long = "type", value_parser = parse_property_type)]
    property_type: Option<PropertyType>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    zip: Option<String>,
    #[arg(long)]
    bedrooms: Option<String>,
    #[arg(long)]
    bathrooms: Option<String>,
    #[arg(long)]
    square_feet: Option<String>,

    /// Repeatable, e.g. --feature Pool --feature Garage
    #[arg(long = "feature")]
    features: Vec<String>,

    /// Image files to attach, in order
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

impl CreateArgs {
    fn edits(&self) -> Vec<DraftEdit> {
        let text_fields: [(&Option<String>, fn(String) -> DraftEdit); 10] = [
            (&self.title, DraftEdit::Title),
            (&self.description, DraftEdit::Description),
            (&self.price, DraftEdit::Price),
            (&self.address, DraftEdit::Address),
            (&self.city, DraftEdit::City),
            (&self.state, DraftEdit::State),
            (&self.zip, DraftEdit::Zip),
            (&self.bedrooms, DraftEdit::Bedrooms),
            (&self.bathrooms, DraftEdit::Bathrooms),
            (&self.square_feet, DraftEdit::SquareFeet),
        ];

        let mut edits: Vec<DraftEdit> = text_fields
            .into_iter()
            .filter_map(|(value, edit)| value.clone().map(edit))
            .collect();
        if let Some(property_type) = self.property_type {
            edits.push(DraftEdit::PropertyType(property_type));
        }
        edits
    }
}

fn parse_filter(value: &str) -> Result<PropertyFilter, String> {
    PropertyFilter::parse(value).ok_or_else(|| format!("unknown property type '{}'", value))
}

fn parse_property_type(value: &str) -> Result<PropertyType, String> {
    PropertyType::parse(value).ok_or_else(|| format!("unknown property type '{}'", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Theme { toggle } => theme(&config, toggle),
        Commands::List {
            search,
            property_type,
        } => {
            let mut frontend = Frontend::start(&config, cli.demo).await;
            frontend.list(search, property_type).await
        }
        Commands::Favorite { id, remove } => {
            let mut frontend = Frontend::start(&config, cli.demo).await;
            frontend.favorite(ListingId(id), !remove).await
        }
        Commands::Contact { id } => {
            let mut frontend = Frontend::start(&config, cli.demo).await;
            frontend.contact(ListingId(id)).await
        }
        Commands::Create(args) => {
            let mut frontend = Frontend::start(&config, cli.demo).await;
            frontend.create(args).await
        }
    }
}

// ============================================================================
// Frontend
// ============================================================================

/// A started app plus the handle user intents go through.
struct Frontend {
    app: App,
    handle: AppHandle,
}

impl Frontend {
    async fn start(config: &AppConfig, demo: bool) -> Self {
        let deps = if demo {
            AppDeps {
                repository: Arc::new(InMemoryPropertyRepository::with_listings(sample_listings())),
                auth: Arc::new(DemoAuthProvider::new()),
                notifier: Arc::new(ConsoleNotifier),
            }
        } else {
            AppDeps {
                repository: Arc::new(GraphQLPropertyRepository::from_config(config)),
                auth: Arc::new(TokenAuthProvider::from_config(config)),
                notifier: Arc::new(ConsoleNotifier),
            }
        };

        let (mut app, handle) = App::new(deps, config);
        app.start().await;
        app.settle().await;
        Self { app, handle }
    }

    async fn dispatch(&mut self, event: impl Into<AppEvent>) {
        self.handle.dispatch(event);
        self.app.settle().await;
    }

    fn require_sign_in(&self) -> Result<()> {
        if self.app.session().is_authenticated {
            return Ok(());
        }
        bail!("Not signed in. Set ESTATEVUE_API_TOKEN or pass --demo");
    }

    async fn list(&mut self, search: Option<String>, filter: Option<PropertyFilter>) -> Result<()> {
        self.require_sign_in()?;

        // Set the query before mounting so only one fetch goes out.
        if let Some(search) = search {
            self.handle.dispatch(CatalogEvent::SearchChanged(search));
        }
        if let Some(filter) = filter {
            self.handle.dispatch(CatalogEvent::FilterChanged(filter));
        }
        self.dispatch(CatalogEvent::Mounted).await;

        let catalog = self.app.catalog();
        if let Some(error) = &catalog.error {
            bail!("Failed to load properties: {}", error);
        }

        let title = match catalog.active_filter {
            PropertyFilter::All => "All properties".to_string(),
            filter => format!("{} listings", filter.label()),
        };
        console::print_banner(&title);
        console::print_listings(&catalog.visible());
        Ok(())
    }

    async fn favorite(&mut self, id: ListingId, is_favorite: bool) -> Result<()> {
        self.dispatch(CatalogEvent::Mounted).await;
        self.dispatch(CatalogEvent::FavoriteToggled { id, is_favorite })
            .await;

        if let Some(listing) = self.app.catalog().find(id) {
            console::print_listing(listing);
        }
        Ok(())
    }

    async fn contact(&mut self, id: ListingId) -> Result<()> {
        self.require_sign_in()?;
        self.dispatch(CatalogEvent::Mounted).await;
        if let Some(error) = &self.app.catalog().error {
            bail!("Failed to load properties: {}", error);
        }

        self.dispatch(CatalogEvent::ContactRequested { id }).await;
        if let Some(listing) = self.app.catalog().find(id) {
            console::print_listing(listing);
        }
        Ok(())
    }

    async fn create(&mut self, args: CreateArgs) -> Result<()> {
        self.require_sign_in()?;

        for edit in args.edits() {
            self.handle.dispatch(WizardEvent::FieldEdited(edit));
        }
        for feature in &args.features {
            self.handle.dispatch(WizardEvent::FeatureToggled(feature.clone()));
        }
        let mut images = Vec::with_capacity(args.images.len());
        for path in &args.images {
            images.push(read_image(path).await?);
        }
        if !images.is_empty() {
            self.handle.dispatch(WizardEvent::ImagesAdded(images));
        }
        self.app.settle().await;

        while self.app.wizard().step() != WizardStep::LAST {
            let step = self.app.wizard().step();
            self.dispatch(WizardEvent::Advanced).await;
            if self.app.wizard().step() == step {
                console::print_step_errors(step, self.app.wizard().errors());
                bail!("Step {} is incomplete", step.number());
            }
            println!("{} {}", "✓".bright_green(), step.title());
        }

        self.dispatch(WizardEvent::SubmitRequested).await;

        let wizard = self.app.wizard();
        match wizard.status() {
            SubmissionStatus::Completed => {
                println!("{} {}", "✓".bright_green(), WizardStep::LAST.title());
                Ok(())
            }
            _ => {
                if !wizard.errors().is_empty() {
                    console::print_step_errors(wizard.step(), wizard.errors());
                }
                match wizard.submission_error() {
                    Some(error) => bail!("Listing was not created: {}", error),
                    None => bail!("Listing was not created"),
                }
            }
        }
    }
}

async fn read_image(path: &Path) -> Result<ImageRef> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ImageRef::new(name, content_type_for(path), data))
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

// ============================================================================
// Theme
// ============================================================================

/// `COLORFGBG` is "fg;bg"; a background of 0-6 or 8 is a dark terminal.
fn system_prefers_dark() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|value| value.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
        .map(|bg| bg < 7 || bg == 8)
        .unwrap_or(false)
}

fn theme(config: &AppConfig, toggle: bool) -> Result<()> {
    let store = JsonFilePreferenceStore::new(&config.preferences_path);
    let mut theme = ThemePreference::load(&store, system_prefers_dark())
        .context("Failed to read preferences")?;

    if toggle {
        theme
            .toggle(&store)
            .context("Failed to save preferences")?;
    }

    let name = if theme.dark_mode { "dark" } else { "light" };
    println!("Theme: {}", name.bold());
    Ok(())
}
