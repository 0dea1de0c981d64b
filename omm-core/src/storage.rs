use async_trait::async_trait;

use crate::BoxError;

/// Durable string key-value storage for client-side state such as saved
/// booking progress.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, BoxError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), BoxError>;

    async fn delete(&self, key: &str) -> Result<(), BoxError>;
}
