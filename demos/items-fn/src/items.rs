//! In-memory `items` resource.

use std::{collections::BTreeMap, sync::Arc};

use function_router::{
    handler_fn, FunctionRouter, HttpError, NormalizedResponse, Reply, RequestContext, Routed,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct NewItem {
    name: String,
}

#[derive(Default)]
struct Inner {
    next_id: u32,
    items: BTreeMap<u32, Item>,
}

#[derive(Clone, Default)]
pub struct ItemStore {
    inner: Arc<RwLock<Inner>>,
}

impl ItemStore {
    async fn get(&self, id: u32) -> Option<Item> {
        self.inner.read().await.items.get(&id).cloned()
    }

    async fn list(&self) -> Vec<Item> {
        self.inner.read().await.items.values().cloned().collect()
    }

    /// Fails with `507` once the id space is used up.
    async fn insert(&self, name: String) -> anyhow::Result<Item> {
        let mut inner = self.inner.write().await;
        let id = inner
            .next_id
            .checked_add(1)
            .ok_or_else(|| HttpError::with_message(507, "item ids exhausted"))?;
        inner.next_id = id;
        let item = Item { id, name };
        inner.items.insert(id, item.clone());
        Ok(item)
    }

    async fn rename(&self, id: u32, name: String) -> Option<Item> {
        let mut inner = self.inner.write().await;
        let item = inner.items.get_mut(&id)?;
        item.name = name;
        Some(item.clone())
    }

    async fn remove(&self, id: u32) -> Option<Item> {
        self.inner.write().await.items.remove(&id)
    }
}

fn validated_name(input: NewItem) -> anyhow::Result<String> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(HttpError::bad_request("name must not be empty").into());
    }
    Ok(name.to_string())
}

/// Register the `items` routes on `router`.
pub fn register<C>(router: &mut FunctionRouter<Item, C>, store: ItemStore) -> anyhow::Result<()>
where
    C: RequestContext + Send + 'static,
{
    let s = store.clone();
    router.get(
        "/items",
        handler_fn(move |_req: Routed<C>| {
            let store = s.clone();
            async move {
                let items = store.list().await;
                Ok::<_, anyhow::Error>(Reply::Response(NormalizedResponse::json(200, &items)?))
            }
        }),
    )?;

    let s = store.clone();
    router.get(
        "/items/{id}",
        handler_fn(move |req: Routed<C>| {
            let store = s.clone();
            async move {
                let id: u32 = req.parse_param("id")?;
                let item = store.get(id).await.ok_or_else(HttpError::not_found)?;
                Ok::<_, anyhow::Error>(Reply::Resource(item))
            }
        }),
    )?;

    let s = store.clone();
    router.post(
        "/items",
        handler_fn(move |req: Routed<C>| {
            let store = s.clone();
            async move {
                let name = validated_name(req.json_body()?)?;
                let item = store.insert(name).await?;
                tracing::info!(id = item.id, "item created");
                Ok::<_, anyhow::Error>(Reply::Created(item))
            }
        }),
    )?;

    let s = store.clone();
    router.put(
        "/items/{id}",
        handler_fn(move |req: Routed<C>| {
            let store = s.clone();
            async move {
                let id: u32 = req.parse_param("id")?;
                let name = validated_name(req.json_body()?)?;
                let item = store
                    .rename(id, name)
                    .await
                    .ok_or_else(HttpError::not_found)?;
                Ok::<_, anyhow::Error>(Reply::Resource(item))
            }
        }),
    )?;

    router.delete(
        "/items/{id}",
        handler_fn(move |req: Routed<C>| {
            let store = store.clone();
            async move {
                let id: u32 = req.parse_param("id")?;
                store.remove(id).await.ok_or_else(HttpError::not_found)?;
                Ok::<_, anyhow::Error>(Reply::NoContent)
            }
        }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use function_router::StaticRequest;

    fn router() -> FunctionRouter<Item, StaticRequest> {
        let mut router = FunctionRouter::new();
        register(&mut router, ItemStore::default()).unwrap();
        router
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let router = router();
        let created = router
            .handle_request(StaticRequest::new("POST", "/items").with_body(r#"{"name":" lamp "}"#))
            .await;
        assert_eq!(created.status_code, 201);
        assert_eq!(created.body.as_deref(), Some(r#"{"id":1,"name":"lamp"}"#));

        let fetched = router
            .handle_request(StaticRequest::new("GET", "/items/1"))
            .await;
        assert_eq!(fetched.status_code, 200);
        assert_eq!(fetched.body, created.body);

        let listed = router
            .handle_request(StaticRequest::new("GET", "/items"))
            .await;
        let list: serde_json::Value = serde_json::from_str(listed.body_str()).unwrap();
        assert_eq!(list, serde_json::json!([{"id": 1, "name": "lamp"}]));
    }

    #[tokio::test]
    async fn rename_and_delete() {
        let router = router();
        router
            .handle_request(StaticRequest::new("POST", "/items").with_body(r#"{"name":"a"}"#))
            .await;

        let renamed = router
            .handle_request(StaticRequest::new("PUT", "/items/1").with_body(r#"{"name":"b"}"#))
            .await;
        assert_eq!(renamed.body.as_deref(), Some(r#"{"id":1,"name":"b"}"#));

        let deleted = router
            .handle_request(StaticRequest::new("DELETE", "/items/1"))
            .await;
        assert_eq!(deleted.status_code, 204);

        let gone = router
            .handle_request(StaticRequest::new("DELETE", "/items/1"))
            .await;
        assert_eq!(gone.status_code, 404);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let router = router();
        let resp = router
            .handle_request(StaticRequest::new("POST", "/items").with_body(r#"{"name":"  "}"#))
            .await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.body.as_deref(), Some("name must not be empty"));
    }

    #[tokio::test]
    async fn exhausted_ids_are_reported_not_wrapped() {
        let store = ItemStore::default();
        store.inner.write().await.next_id = u32::MAX;
        let mut router = FunctionRouter::<Item, StaticRequest>::new();
        register(&mut router, store.clone()).unwrap();

        let resp = router
            .handle_request(StaticRequest::new("POST", "/items").with_body(r#"{"name":"a"}"#))
            .await;
        assert_eq!(resp.status_code, 507);
        assert_eq!(resp.body.as_deref(), Some("item ids exhausted"));
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let router = router();
        let resp = router
            .handle_request(StaticRequest::new("GET", "/items/99"))
            .await;
        assert_eq!(resp, NormalizedResponse::new(404));
    }
}
