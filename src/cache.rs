use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::type_source::TypeDetailsSource;
use schema::TypeDetails;

/// Memoizes type records from an inner source across requests.
///
/// Only successful lookups are stored; a miss is retried on the next call.
#[derive(Debug, Default)]
pub struct CachedTypeSource<S> {
    inner: S,
    entries: RwLock<HashMap<String, TypeDetails>>,
}

impl<S> CachedTypeSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl<S> TypeDetailsSource for CachedTypeSource<S>
where
    S: TypeDetailsSource,
{
    async fn type_details(&self, type_name: &str) -> Option<TypeDetails> {
        if let Some(hit) = self.entries.read().await.get(type_name) {
            debug!(type_name, "type details cache hit");
            return Some(hit.clone());
        }

        let details = self.inner.type_details(type_name).await?;
        self.entries
            .write()
            .await
            .insert(type_name.to_string(), details.clone());
        Some(details)
    }
}
