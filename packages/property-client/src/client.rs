//! GraphQL client for making requests to the listings API

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

/// GraphQL request body
#[derive(Debug, Serialize)]
pub struct GraphQLRequest<V: Serialize> {
    pub query: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
}

/// GraphQL response wrapper
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

impl<T> GraphQLResponse<T> {
    /// First reported error wins; a response with neither data nor errors is `NoData`.
    pub fn into_result(self) -> Result<T, ClientError> {
        if let Some(errors) = self.errors {
            if let Some(first_error) = errors.into_iter().next() {
                return Err(ClientError::GraphQL(first_error.message));
            }
        }

        self.data.ok_or(ClientError::NoData)
    }
}

/// GraphQL error
#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    pub locations: Option<Vec<GraphQLErrorLocation>>,
    pub path: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLErrorLocation {
    pub line: i32,
    pub column: i32,
}

/// Error type for GraphQL operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GraphQL error: {0}")]
    GraphQL(String),

    #[error("No data returned")]
    NoData,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// GraphQL client for making requests
#[derive(Clone)]
pub struct GraphQLClient {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl GraphQLClient {
    /// Create a new GraphQL client
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            auth_token: None,
        }
    }

    /// Create a client with authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_token(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Execute a GraphQL query
    pub async fn query<V, R>(&self, query: &'static str, variables: Option<V>) -> Result<R, ClientError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let request = GraphQLRequest { query, variables };

        let mut req = self.client.post(&self.endpoint).json(&request);

        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        debug!(endpoint = %self.endpoint, "sending GraphQL request");
        let response = req.send().await?;
        let body = response.text().await?;
        let graphql_response: GraphQLResponse<R> = serde_json::from_str(&body)?;

        graphql_response.into_result()
    }

    /// Execute a GraphQL mutation (same as query, but semantically different)
    pub async fn mutate<V, R>(&self, mutation: &'static str, variables: Option<V>) -> Result<R, ClientError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        self.query(mutation, variables).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Ping {
        ok: bool,
    }

    #[test]
    fn test_first_error_is_surfaced() {
        let response: GraphQLResponse<Ping> = serde_json::from_value(json!({
            "data": null,
            "errors": [
                { "message": "property 9 not found", "path": ["property"] },
                { "message": "second" }
            ]
        }))
        .unwrap();

        match response.into_result() {
            Err(ClientError::GraphQL(message)) => assert_eq!(message, "property 9 not found"),
            other => panic!("expected GraphQL error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_data_is_no_data() {
        let response: GraphQLResponse<Ping> =
            serde_json::from_value(json!({ "data": null })).unwrap();

        assert!(matches!(response.into_result(), Err(ClientError::NoData)));
    }

    #[test]
    fn test_data_is_returned() {
        let response: GraphQLResponse<Ping> =
            serde_json::from_value(json!({ "data": { "ok": true }, "errors": [] })).unwrap();

        assert_eq!(response.into_result().unwrap(), Ping { ok: true });
    }

    #[test]
    fn test_request_omits_missing_variables() {
        let body = serde_json::to_value(GraphQLRequest::<()> {
            query: "{ ping }",
            variables: None,
        })
        .unwrap();

        assert_eq!(body, json!({ "query": "{ ping }" }));
    }
}
