use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use estatevue::{
    AppConfig, FetchQuery, ListingId, ListingPatch, NewListing, PropertyListing,
    PropertyRepository, RepositoryError,
};

use crate::client::{ClientError, GraphQLClient};
use crate::queries::{CREATE_PROPERTY, FETCH_PROPERTIES, GET_PROPERTY, UPDATE_PROPERTY};
use crate::wire::{PropertyInput, PropertyNode, PropertyPatchInput};

impl From<ClientError> for RepositoryError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Network(err) => RepositoryError::Transport(err.to_string()),
            ClientError::GraphQL(message) => RepositoryError::Query(message),
            ClientError::NoData => RepositoryError::Query("no data returned".to_string()),
            ClientError::Serialization(err) => {
                RepositoryError::Query(format!("malformed response: {}", err))
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchVariables<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    search_query: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    property_type: &'a str,
    limit: u32,
    offset: u32,
}

#[derive(Debug, Serialize)]
struct IdVariables {
    id: String,
}

#[derive(Debug, Serialize)]
struct UpdateVariables {
    id: String,
    input: PropertyPatchInput,
}

#[derive(Debug, Serialize)]
struct CreateVariables {
    input: PropertyInput,
}

#[derive(Debug, Deserialize)]
struct PropertiesData {
    properties: Vec<PropertyNode>,
}

#[derive(Debug, Deserialize)]
struct PropertyData {
    property: Option<PropertyNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePropertyData {
    update_property: Option<PropertyNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePropertyData {
    create_property: PropertyNode,
}

/// Property repository backed by the listings GraphQL API.
#[derive(Clone)]
pub struct GraphQLPropertyRepository {
    client: GraphQLClient,
}

impl GraphQLPropertyRepository {
    pub fn new(client: GraphQLClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut client = GraphQLClient::new(&config.api_url);
        if let Some(token) = &config.api_token {
            client = client.with_token(token);
        }
        Self::new(client)
    }
}

#[async_trait]
impl PropertyRepository for GraphQLPropertyRepository {
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<PropertyListing>, RepositoryError> {
        let variables = FetchVariables {
            search_query: &query.search_query,
            property_type: &query.property_type,
            limit: query.limit,
            offset: query.offset,
        };
        let data: PropertiesData = self.client.query(FETCH_PROPERTIES, Some(variables)).await?;

        debug!(count = data.properties.len(), "fetched properties");
        data.properties
            .into_iter()
            .map(PropertyListing::try_from)
            .collect()
    }

    async fn get_by_id(&self, id: ListingId) -> Result<Option<PropertyListing>, RepositoryError> {
        let variables = IdVariables { id: id.to_string() };
        let data: PropertyData = self.client.query(GET_PROPERTY, Some(variables)).await?;

        data.property.map(PropertyListing::try_from).transpose()
    }

    async fn update(
        &self,
        id: ListingId,
        patch: &ListingPatch,
    ) -> Result<PropertyListing, RepositoryError> {
        let variables = UpdateVariables {
            id: id.to_string(),
            input: PropertyPatchInput::from(patch),
        };
        let data: UpdatePropertyData = self.client.mutate(UPDATE_PROPERTY, Some(variables)).await?;

        let node = data.update_property.ok_or(RepositoryError::NotFound(id))?;
        PropertyListing::try_from(node)
    }

    async fn create(&self, listing: &NewListing) -> Result<PropertyListing, RepositoryError> {
        let variables = CreateVariables {
            input: PropertyInput::from(listing),
        };
        let data: CreatePropertyData = self.client.mutate(CREATE_PROPERTY, Some(variables)).await?;

        let created = PropertyListing::try_from(data.create_property)?;
        info!(property = %created.id, "property created");
        Ok(created)
    }
}
