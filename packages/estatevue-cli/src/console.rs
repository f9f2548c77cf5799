//! Terminal rendering: toasts, listing cards, wizard errors.

use colored::Colorize;

use estatevue::{
    format_price, FieldErrors, NotificationLevel, NotificationSink, PropertyListing, WizardStep,
};

/// Prints notifications as colored one-line toasts on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        let line = match level {
            NotificationLevel::Info => format!("ℹ {}", message).bright_blue(),
            NotificationLevel::Success => format!("✓ {}", message).bright_green(),
            NotificationLevel::Warning => format!("⚠ {}", message).bright_yellow(),
            NotificationLevel::Error => format!("✗ {}", message).bright_red(),
        };
        eprintln!("{}", line);
    }
}

pub fn print_listing(listing: &PropertyListing) {
    let heart = if listing.is_favorite { "♥" } else { "♡" };
    println!(
        "{} {} {}",
        format!("#{}", listing.id).dimmed(),
        listing.title.bold(),
        heart.bright_red()
    );
    println!(
        "   {}  ·  {}  ·  ${}",
        listing.location(),
        listing.property_type.label(),
        format_price(listing.price).bright_green()
    );
    println!(
        "   {} bd  ·  {} ba  ·  {} sqft",
        listing.bedrooms,
        listing.bathrooms.normalize(),
        listing.square_feet
    );
}

pub fn print_listings(listings: &[&PropertyListing]) {
    if listings.is_empty() {
        println!("{}", "No properties found".dimmed());
        return;
    }
    for listing in listings {
        print_listing(listing);
        println!();
    }
    println!("{}", format!("{} properties", listings.len()).dimmed());
}

pub fn print_step_errors(step: WizardStep, errors: &FieldErrors) {
    println!(
        "{}",
        format!("Step {} of 4 · {}", step.number(), step.title())
            .bright_yellow()
            .bold()
    );
    for (field, message) in errors.iter().filter(|(field, _)| field.step() == step) {
        println!("  {} {}: {}", "✗".bright_red(), field.as_str(), message);
    }
}

pub fn print_banner(text: &str) {
    println!("{}", format!("══ {} ══", text).bright_cyan());
}
