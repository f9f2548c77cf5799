//! Domain types shared by the stores, the repository and the view layer.

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Externally assigned id of a persisted listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub i64);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Property Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    House,
    Apartment,
    Land,
    Commercial,
    Condo,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Land => "land",
            PropertyType::Commercial => "commercial",
            PropertyType::Condo => "condo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Apartment => "Apartment",
            PropertyType::Land => "Land",
            PropertyType::Commercial => "Commercial",
            PropertyType::Condo => "Condo",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "house" => Some(PropertyType::House),
            "apartment" => Some(PropertyType::Apartment),
            "land" => Some(PropertyType::Land),
            "commercial" => Some(PropertyType::Commercial),
            "condo" => Some(PropertyType::Condo),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog filter tab. `All` matches every property type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyFilter {
    #[default]
    All,
    House,
    Apartment,
    Condo,
    Land,
    Commercial,
}

impl PropertyFilter {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyFilter::All => "All Properties",
            PropertyFilter::House => "Houses",
            PropertyFilter::Apartment => "Apartments",
            PropertyFilter::Condo => "Condos",
            PropertyFilter::Land => "Land",
            PropertyFilter::Commercial => "Commercial",
        }
    }

    pub fn variants() -> &'static [PropertyFilter] {
        &[
            PropertyFilter::All,
            PropertyFilter::House,
            PropertyFilter::Apartment,
            PropertyFilter::Condo,
            PropertyFilter::Land,
            PropertyFilter::Commercial,
        ]
    }

    pub fn property_type(&self) -> Option<PropertyType> {
        match self {
            PropertyFilter::All => None,
            PropertyFilter::House => Some(PropertyType::House),
            PropertyFilter::Apartment => Some(PropertyType::Apartment),
            PropertyFilter::Condo => Some(PropertyType::Condo),
            PropertyFilter::Land => Some(PropertyType::Land),
            PropertyFilter::Commercial => Some(PropertyType::Commercial),
        }
    }

    /// Value sent to the repository: empty for `All`.
    pub fn as_query_param(&self) -> &'static str {
        self.property_type().map(|t| t.as_str()).unwrap_or("")
    }

    pub fn matches(&self, property_type: PropertyType) -> bool {
        self.property_type().map_or(true, |t| t == property_type)
    }

    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(PropertyFilter::All);
        }
        PropertyType::parse(value).map(Self::from)
    }
}

impl From<PropertyType> for PropertyFilter {
    fn from(value: PropertyType) -> Self {
        match value {
            PropertyType::House => PropertyFilter::House,
            PropertyType::Apartment => PropertyFilter::Apartment,
            PropertyType::Land => PropertyFilter::Land,
            PropertyType::Commercial => PropertyFilter::Commercial,
            PropertyType::Condo => PropertyFilter::Condo,
        }
    }
}

// ============================================================================
// Listing Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    /// Short "City, ST" form shown on cards and matched by search.
    pub fn location(&self) -> String {
        match (self.city.is_empty(), self.state.is_empty()) {
            (false, false) => format!("{}, {}", self.city, self.state),
            (false, true) => self.city.clone(),
            (true, false) => self.state.clone(),
            (true, true) => String::new(),
        }
    }
}

/// A binary image attached to a listing, in upload order.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub name: String,
    pub content_type: String,
    #[serde(default)]
    pub data: Vec<u8>,
}

impl ImageRef {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRef")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A persisted listing as returned by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub address: Address,
    pub property_type: PropertyType,
    pub bedrooms: u32,
    pub bathrooms: Decimal,
    pub square_feet: u32,
    #[serde(default)]
    pub features: BTreeSet<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl PropertyListing {
    pub fn location(&self) -> String {
        self.address.location()
    }

    /// Case-insensitive substring match against title or location.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.location().to_lowercase().contains(&needle)
    }
}

/// Typed payload for creating a listing, produced from a validated draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub address: Address,
    pub property_type: PropertyType,
    pub bedrooms: u32,
    pub bathrooms: Decimal,
    pub square_feet: u32,
    pub features: BTreeSet<String>,
    pub images: Vec<ImageRef>,
}

impl NewListing {
    pub fn into_listing(self, id: ListingId) -> PropertyListing {
        PropertyListing {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            address: self.address,
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            square_feet: self.square_feet,
            features: self.features,
            images: self.images,
            is_favorite: false,
        }
    }
}

/// Partial update sent to the repository. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl ListingPatch {
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
        }
    }

    pub fn apply_to(&self, listing: &mut PropertyListing) {
        if let Some(is_favorite) = self.is_favorite {
            listing.is_favorite = is_favorite;
        }
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Format a price with thousands separators, e.g. `1250000` -> `1,250,000`.
///
/// Fractional cents are kept as-is (`99.5` -> `99.5`).
pub fn format_price(price: Decimal) -> String {
    let normalized = price.normalize().to_string();
    let (sign, unsigned) = match normalized.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", normalized.as_str()),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
