//! GraphQL operation definitions for the listings API

// ============================================================================
// PROPERTY QUERIES
// ============================================================================

pub const FETCH_PROPERTIES: &str = r#"
  query FetchProperties($searchQuery: String, $propertyType: String, $limit: Int, $offset: Int) {
    properties(searchQuery: $searchQuery, propertyType: $propertyType, limit: $limit, offset: $offset) {
      id
      title
      description
      price
      street
      location
      zip
      type
      bedrooms
      bathrooms
      area
      features
      images
      isFavorite
    }
  }
"#;

pub const GET_PROPERTY: &str = r#"
  query GetProperty($id: ID!) {
    property(id: $id) {
      id
      title
      description
      price
      street
      location
      zip
      type
      bedrooms
      bathrooms
      area
      features
      images
      isFavorite
    }
  }
"#;

// ============================================================================
// PROPERTY MUTATIONS
// ============================================================================

pub const UPDATE_PROPERTY: &str = r#"
  mutation UpdateProperty($id: ID!, $input: PropertyPatchInput!) {
    updateProperty(id: $id, input: $input) {
      id
      title
      description
      price
      street
      location
      zip
      type
      bedrooms
      bathrooms
      area
      features
      images
      isFavorite
    }
  }
"#;

pub const CREATE_PROPERTY: &str = r#"
  mutation CreateProperty($input: PropertyInput!) {
    createProperty(input: $input) {
      id
      title
      description
      price
      street
      location
      zip
      type
      bedrooms
      bathrooms
      area
      features
      images
      isFavorite
    }
  }
"#;

// ============================================================================
// AUTHENTICATION QUERIES
// ============================================================================

pub const VIEWER: &str = r#"
  query Viewer {
    viewer {
      id
      name
      email
    }
  }
"#;
