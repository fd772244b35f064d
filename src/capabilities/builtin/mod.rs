//! Capabilities shipped with the toolkit.

mod apps;
mod dynamic;
mod items;
mod manager;

use std::sync::Arc;

pub use apps::{CreateApp, ListApps};
pub use dynamic::{AllApi, GetGraphQlSchema};
pub use items::{CreateItem, DeleteItem, GetBoardItems};
pub use manager::ManageCapabilities;

use super::factory::CapabilityConstructor;
use crate::api::{PlatformClient, SchemaCache, TtlSchemaCache};

/// Capabilities over the GraphQL API.
///
/// Every schema capability built from this list shares one schema cache.
pub fn api_capabilities() -> Vec<CapabilityConstructor> {
    let cache: Arc<dyn SchemaCache> = Arc::new(TtlSchemaCache::default());

    vec![
        CapabilityConstructor::remote_api(|client, _, _| Arc::new(AllApi::new(client))),
        CapabilityConstructor::remote_api(move |client, _, _| {
            Arc::new(GetGraphQlSchema::new(client, Arc::clone(&cache)))
        }),
        CapabilityConstructor::remote_api(|client, _, context| {
            Arc::new(GetBoardItems::new(client, context))
        }),
        CapabilityConstructor::remote_api(|client, _, context| Arc::new(CreateItem::new(client, context))),
        CapabilityConstructor::remote_api(|client, _, _| Arc::new(DeleteItem::new(client))),
    ]
}

/// App-platform management capabilities against `platform_url`.
pub fn apps_capabilities(platform_url: &str) -> Vec<CapabilityConstructor> {
    let list_url = platform_url.to_string();
    let create_url = platform_url.to_string();
    vec![
        CapabilityConstructor::platform(move |token| {
            Arc::new(ListApps::new(PlatformClient::new(token).with_base_url(list_url.clone())))
        }),
        CapabilityConstructor::platform(move |token| {
            Arc::new(CreateApp::new(PlatformClient::new(token).with_base_url(create_url.clone())))
        }),
    ]
}
