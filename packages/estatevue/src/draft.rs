//! The in-progress, unpersisted listing built by the wizard.
//!
//! Numeric fields are kept as the raw text the user typed so that invalid
//! input can be shown back with an error. Conversion to typed values happens
//! once, at submission, in [`Draft::to_new_listing`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{Address, ImageRef, NewListing, PropertyType};
use crate::validation::{self, first_invalid_step, Field, FieldErrors};

/// One edit to one draft field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum DraftEdit {
    Title(String),
    Description(String),
    Price(String),
    PropertyType(PropertyType),
    Address(String),
    City(String),
    State(String),
    Zip(String),
    Bedrooms(String),
    Bathrooms(String),
    SquareFeet(String),
}

impl DraftEdit {
    pub fn field(&self) -> Field {
        match self {
            DraftEdit::Title(_) => Field::Title,
            DraftEdit::Description(_) => Field::Description,
            DraftEdit::Price(_) => Field::Price,
            DraftEdit::PropertyType(_) => Field::PropertyType,
            DraftEdit::Address(_) => Field::Address,
            DraftEdit::City(_) => Field::City,
            DraftEdit::State(_) => Field::State,
            DraftEdit::Zip(_) => Field::Zip,
            DraftEdit::Bedrooms(_) => Field::Bedrooms,
            DraftEdit::Bathrooms(_) => Field::Bathrooms,
            DraftEdit::SquareFeet(_) => Field::SquareFeet,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub price: String,
    pub property_type: PropertyType,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub square_feet: String,
    pub features: BTreeSet<String>,
    pub images: Vec<ImageRef>,
}

impl Draft {
    /// Write one field. Returns the field that changed.
    pub fn apply(&mut self, edit: DraftEdit) -> Field {
        let field = edit.field();
        match edit {
            DraftEdit::Title(v) => self.title = v,
            DraftEdit::Description(v) => self.description = v,
            DraftEdit::Price(v) => self.price = v,
            DraftEdit::PropertyType(v) => self.property_type = v,
            DraftEdit::Address(v) => self.address = v,
            DraftEdit::City(v) => self.city = v,
            DraftEdit::State(v) => self.state = v,
            DraftEdit::Zip(v) => self.zip = v,
            DraftEdit::Bedrooms(v) => self.bedrooms = v,
            DraftEdit::Bathrooms(v) => self.bathrooms = v,
            DraftEdit::SquareFeet(v) => self.square_feet = v,
        }
        field
    }

    /// Add the feature if absent, remove it if present.
    /// Returns whether the feature is selected afterwards.
    pub fn toggle_feature(&mut self, name: &str) -> bool {
        if self.features.remove(name) {
            false
        } else {
            self.features.insert(name.to_string());
            true
        }
    }

    pub fn add_images(&mut self, images: impl IntoIterator<Item = ImageRef>) {
        self.images.extend(images);
    }

    /// Remove the image at `index`; later images shift down.
    /// Out-of-range indexes are ignored.
    pub fn remove_image(&mut self, index: usize) -> Option<ImageRef> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    pub fn is_empty(&self) -> bool {
        *self == Draft::default()
    }

    /// Convert to the typed creation payload, validating every step.
    pub fn to_new_listing(&self) -> Result<NewListing, FieldErrors> {
        if let Some((_, errors)) = first_invalid_step(self) {
            return Err(errors);
        }

        let invalid = |field: Field| {
            let mut errors = FieldErrors::new();
            errors.insert(field, "Invalid value");
            errors
        };

        Ok(NewListing {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: validation::parse_price(&self.price).ok_or_else(|| invalid(Field::Price))?,
            address: Address {
                street: self.address.trim().to_string(),
                city: self.city.trim().to_string(),
                state: self.state.trim().to_string(),
                zip: self.zip.trim().to_string(),
            },
            property_type: self.property_type,
            bedrooms: validation::parse_count(&self.bedrooms)
                .ok_or_else(|| invalid(Field::Bedrooms))?,
            bathrooms: validation::parse_bathrooms(&self.bathrooms)
                .ok_or_else(|| invalid(Field::Bathrooms))?,
            square_feet: validation::parse_area(&self.square_feet)
                .ok_or_else(|| invalid(Field::SquareFeet))?,
            features: self.features.clone(),
            images: self.images.clone(),
        })
    }
}
