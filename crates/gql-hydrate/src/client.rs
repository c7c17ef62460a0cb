//! Client construction and the combined transport + cache handle.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use gql_client::{
    CredentialPolicy, FileUpload, GraphqlClient, GraphqlClientError, GraphqlOperation,
    GraphqlResponse,
};

use crate::cache::{DocumentCache, SnapshotCache};
use crate::pagination::{OffsetPagination, PageArgs};
use crate::snapshot::CacheSnapshot;

/// Fixed build-time configuration for client construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Absolute GraphQL endpoint URL.
    pub endpoint: String,
    /// Whether cross-origin requests carry credentials.
    pub credentials: CredentialPolicy,
    /// Root collection field merged positionally across pages.
    pub paginated_field: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/graphql".to_string(),
            credentials: CredentialPolicy::Include,
            paginated_field: "allProducts".to_string(),
        }
    }
}

/// Produces ready-to-use client handles.
///
/// Configuration is fixed when the factory is built; `create` itself never
/// signals an error — failures surface during request execution.
#[derive(Debug, Clone)]
pub struct ClientFactory {
    config: ClientConfig,
}

impl ClientFactory {
    /// Create a factory for a fixed configuration.
    #[must_use]
    pub const fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// The configuration handles are built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a handle wired with transport, error logging, and cache policy.
    #[must_use]
    pub fn create(&self) -> Arc<ClientHandle> {
        debug!(endpoint = %self.config.endpoint, "creating client handle");
        let transport = GraphqlClient::new(self.config.endpoint.clone());
        let cache = SnapshotCache::new()
            .with_policy(self.config.paginated_field.clone(), Arc::new(OffsetPagination));
        Arc::new(ClientHandle { transport, cache })
    }
}

/// A single long-lived client: transport plus snapshot cache.
#[derive(Debug)]
pub struct ClientHandle {
    transport: GraphqlClient,
    cache: SnapshotCache,
}

impl ClientHandle {
    /// Execute a query and fold the returned root fields into the cache.
    pub async fn query<O: GraphqlOperation>(
        &self,
        variables: O::Variables,
    ) -> Result<GraphqlResponse<O::ResponseData>, GraphqlClientError> {
        self.query_paged::<O>(variables, PageArgs::default()).await
    }

    /// Execute a paginated query; `page` routes the result through the
    /// field's merge policy at the right positions.
    pub async fn query_paged<O: GraphqlOperation>(
        &self,
        variables: O::Variables,
        page: PageArgs,
    ) -> Result<GraphqlResponse<O::ResponseData>, GraphqlClientError> {
        let response = self.transport.execute::<O>(variables).await?;
        if let Some(data) = &response.data {
            self.write_data(data, &page)?;
        }
        Ok(response)
    }

    /// Execute a mutation carrying file uploads.
    pub async fn mutate_upload<O: GraphqlOperation>(
        &self,
        variables: O::Variables,
        files: Vec<FileUpload>,
    ) -> Result<GraphqlResponse<O::ResponseData>, GraphqlClientError> {
        let response = self.transport.execute_upload::<O>(variables, files).await?;
        if let Some(data) = &response.data {
            self.write_data(data, &PageArgs::default())?;
        }
        Ok(response)
    }

    /// Snapshot the cache contents.
    #[must_use]
    pub fn extract(&self) -> CacheSnapshot {
        self.cache.extract()
    }

    /// Replace the cache contents with a snapshot.
    pub fn restore(&self, snapshot: CacheSnapshot) {
        self.cache.restore(snapshot);
    }

    /// Read one cached root field.
    #[must_use]
    pub fn cached(&self, field: &str) -> Option<Value> {
        self.cache.read(field)
    }

    fn write_data<T: serde::Serialize>(
        &self,
        data: &T,
        page: &PageArgs,
    ) -> Result<(), GraphqlClientError> {
        let value = serde_json::to_value(data)?;
        if let Value::Object(fields) = value {
            for (field, incoming) in &fields {
                self.cache.write(field, incoming, page);
            }
        }
        Ok(())
    }
}
