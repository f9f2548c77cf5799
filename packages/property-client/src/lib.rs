//! GraphQL adapters for EstateVue.
//!
//! [`GraphQLPropertyRepository`] implements the catalog's
//! [`PropertyRepository`](estatevue::PropertyRepository) against the listings
//! API, and [`TokenAuthProvider`] resolves the signed-in user from an API
//! token.

mod auth;
mod client;
mod queries;
mod repository;
mod wire;

pub use auth::TokenAuthProvider;
pub use client::{
    ClientError, GraphQLClient, GraphQLError, GraphQLErrorLocation, GraphQLRequest, GraphQLResponse,
};
pub use queries::*;
pub use repository::GraphQLPropertyRepository;
pub use wire::{decode_image, encode_image, PropertyInput, PropertyNode, PropertyPatchInput};
