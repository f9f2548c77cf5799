//! Wire shapes of the listings API and their conversion to domain types.
//!
//! The API stores a listing's location as one "City, ST" string, its square
//! footage as `area`, and images as strings: either a URL or a base64
//! `data:` URI.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use estatevue::{
    Address, ImageRef, ListingId, ListingPatch, NewListing, PropertyListing, PropertyType,
    RepositoryError,
};

/// A property as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyNode {
    /// GraphQL `ID`, numeric on this backend.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub zip: String,
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: Decimal,
    #[serde(default)]
    pub area: u32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl TryFrom<PropertyNode> for PropertyListing {
    type Error = RepositoryError;

    fn try_from(node: PropertyNode) -> Result<Self, Self::Error> {
        let id = node
            .id
            .parse::<i64>()
            .map_err(|_| RepositoryError::Query(format!("invalid property id {:?}", node.id)))?;
        let property_type = PropertyType::parse(&node.property_type).ok_or_else(|| {
            RepositoryError::Query(format!(
                "property {} has unknown type {:?}",
                id, node.property_type
            ))
        })?;
        let (city, state) = split_location(&node.location);

        Ok(PropertyListing {
            id: ListingId(id),
            title: node.title,
            description: node.description,
            price: node.price,
            address: Address {
                street: node.street,
                city,
                state,
                zip: node.zip,
            },
            property_type,
            bedrooms: node.bedrooms,
            bathrooms: node.bathrooms,
            square_feet: node.area,
            features: node.features.into_iter().collect(),
            images: node
                .images
                .iter()
                .enumerate()
                .map(|(index, image)| decode_image(index, image))
                .collect(),
            is_favorite: node.is_favorite,
        })
    }
}

/// Input for `createProperty`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInput {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub street: String,
    pub location: String,
    pub zip: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub bedrooms: u32,
    pub bathrooms: Decimal,
    pub area: u32,
    pub features: Vec<String>,
    pub images: Vec<String>,
}

impl From<&NewListing> for PropertyInput {
    fn from(listing: &NewListing) -> Self {
        Self {
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price,
            street: listing.address.street.clone(),
            location: listing.address.location(),
            zip: listing.address.zip.clone(),
            property_type: listing.property_type.as_str().to_string(),
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            area: listing.square_feet,
            features: listing.features.iter().cloned().collect(),
            images: listing.images.iter().map(encode_image).collect(),
        }
    }
}

/// Input for `updateProperty`. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPatchInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl From<&ListingPatch> for PropertyPatchInput {
    fn from(patch: &ListingPatch) -> Self {
        Self {
            is_favorite: patch.is_favorite,
        }
    }
}

fn split_location(location: &str) -> (String, String) {
    match location.rsplit_once(',') {
        Some((city, state)) => (city.trim().to_string(), state.trim().to_string()),
        None => (location.trim().to_string(), String::new()),
    }
}

pub fn encode_image(image: &ImageRef) -> String {
    format!(
        "data:{};base64,{}",
        image.content_type,
        STANDARD.encode(&image.data)
    )
}

/// Data URIs are decoded; anything else is kept as a by-reference image with
/// no bytes.
pub fn decode_image(index: usize, value: &str) -> ImageRef {
    let name = format!("image-{}", index + 1);

    let decoded = value
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .and_then(|(content_type, payload)| {
            STANDARD
                .decode(payload)
                .ok()
                .map(|data| ImageRef::new(name.clone(), content_type, data))
        });

    decoded.unwrap_or_else(|| ImageRef::new(value, "", Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: serde_json::Value) -> PropertyNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_node_converts_to_listing() {
        let listing = PropertyListing::try_from(node(json!({
            "id": "3",
            "title": "Suburban Family Home",
            "price": 550000,
            "street": "78 Oak Hollow Ln",
            "location": "Austin, TX",
            "type": "house",
            "bedrooms": 3,
            "bathrooms": "2.5",
            "area": 2100,
            "features": ["Garage", "Pool"],
            "isFavorite": true
        })))
        .unwrap();

        assert_eq!(listing.id, ListingId(3));
        assert_eq!(listing.address.city, "Austin");
        assert_eq!(listing.address.state, "TX");
        assert_eq!(listing.location(), "Austin, TX");
        assert_eq!(listing.property_type, PropertyType::House);
        assert_eq!(listing.bathrooms, Decimal::new(25, 1));
        assert_eq!(listing.square_feet, 2100);
        assert!(listing.features.contains("Pool"));
        assert!(listing.is_favorite);
    }

    #[test]
    fn test_unknown_type_is_a_query_error() {
        let err = PropertyListing::try_from(node(json!({
            "id": "8",
            "title": "Castle",
            "price": 1,
            "type": "castle"
        })))
        .unwrap_err();

        assert!(matches!(err, RepositoryError::Query(message) if message.contains("castle")));
    }

    #[test]
    fn test_non_numeric_id_is_a_query_error() {
        let err = PropertyListing::try_from(node(json!({
            "id": "abc",
            "title": "Lot",
            "price": 1,
            "type": "land"
        })))
        .unwrap_err();

        assert!(matches!(err, RepositoryError::Query(_)));
    }

    #[test]
    fn test_images_are_sent_as_data_uris() {
        let image = ImageRef::new("front.png", "image/png", vec![0x89, b'P', b'N', b'G']);

        let uri = encode_image(&image);
        assert_eq!(uri, "data:image/png;base64,iVBORw==");

        let decoded = decode_image(0, &uri);
        assert_eq!(decoded.content_type, "image/png");
        assert_eq!(decoded.data, image.data);
    }

    #[test]
    fn test_plain_url_image_is_kept_by_reference() {
        let image = decode_image(2, "https://cdn.example.com/a.jpg");

        assert_eq!(image.name, "https://cdn.example.com/a.jpg");
        assert!(image.data.is_empty());
    }

    #[test]
    fn test_patch_input_omits_unset_fields() {
        let input = PropertyPatchInput::from(&ListingPatch::favorite(false));

        assert_eq!(
            serde_json::to_value(input).unwrap(),
            json!({ "isFavorite": false })
        );
        assert_eq!(
            serde_json::to_value(PropertyPatchInput::default()).unwrap(),
            json!({})
        );
    }
}
