//! Item capabilities with fixed GraphQL operations.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::ApiClient;
use crate::capabilities::capability::{contract_for, parse_input};
use crate::capabilities::{
    Capability, CapabilityAnnotations, CapabilityCategory, CapabilityError, CapabilityOutput,
};
use crate::context::ToolkitContext;

const DEFAULT_PAGE_SIZE: u32 = 25;

const BOARD_ITEMS_QUERY: &str = r#"query GetBoardItems($boardId: ID!, $limit: Int) {
  boards(ids: [$boardId]) {
    id
    name
    items_page(limit: $limit) {
      items { id name group { id title } }
    }
  }
}"#;

const CREATE_ITEM_MUTATION: &str = r#"mutation CreateItem($boardId: ID!, $itemName: String!, $groupId: String, $columnValues: JSON) {
  create_item(board_id: $boardId, item_name: $itemName, group_id: $groupId, column_values: $columnValues) {
    id
    name
  }
}"#;

const DELETE_ITEM_MUTATION: &str = r#"mutation DeleteItem($itemId: ID!) {
  delete_item(item_id: $itemId) { id }
}"#;

/// Board id from the input, falling back to the toolkit context.
fn resolve_board_id(
    explicit: Option<String>,
    context: Option<&ToolkitContext>,
) -> Result<String, CapabilityError> {
    explicit
        .or_else(|| context.and_then(|c| c.board_id.clone()))
        .ok_or_else(|| CapabilityError::MissingArgument("boardId".to_string()))
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct BoardItemsInput {
    /// Board to read; defaults to the board in the toolkit context.
    #[serde(default)]
    board_id: Option<String>,
    /// Maximum number of items to return.
    #[serde(default)]
    limit: Option<u32>,
}

pub struct GetBoardItems {
    client: Arc<dyn ApiClient>,
    context: Option<ToolkitContext>,
}

impl GetBoardItems {
    pub const NAME: &'static str = "get_board_items";

    /// `context` supplies the board when the input names none.
    pub fn new(client: Arc<dyn ApiClient>, context: Option<ToolkitContext>) -> Self {
        Self { client, context }
    }
}

#[async_trait]
impl Capability for GetBoardItems {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        "List the items of a board with their groups.".to_string()
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::Read
    }

    fn annotations(&self) -> CapabilityAnnotations {
        CapabilityAnnotations::titled("Get Board Items").read_only().idempotent()
    }

    fn input_contract(&self) -> Option<Value> {
        Some(contract_for::<BoardItemsInput>())
    }

    async fn execute(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        let input: BoardItemsInput = parse_input(input)?;
        let board_id = resolve_board_id(input.board_id, self.context.as_ref())?;
        let variables = json!({
            "boardId": board_id,
            "limit": input.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        });

        let data = self.client.request(BOARD_ITEMS_QUERY, Some(variables)).await?;
        let items = data["boards"][0]["items_page"]["items"].clone();
        if items.is_null() {
            return Err(CapabilityError::Execution(format!("Board {} not found", board_id)));
        }
        Ok(CapabilityOutput::text(items.to_string()))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct CreateItemInput {
    #[serde(default)]
    board_id: Option<String>,
    item_name: String,
    #[serde(default)]
    group_id: Option<String>,
    /// Column values keyed by column id.
    #[serde(default)]
    column_values: Option<Value>,
}

pub struct CreateItem {
    client: Arc<dyn ApiClient>,
    context: Option<ToolkitContext>,
}

impl CreateItem {
    pub const NAME: &'static str = "create_item";

    /// `context` supplies the board when the input names none.
    pub fn new(client: Arc<dyn ApiClient>, context: Option<ToolkitContext>) -> Self {
        Self { client, context }
    }
}

#[async_trait]
impl Capability for CreateItem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        "Create an item on a board, optionally in a group and with column values.".to_string()
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::Write
    }

    fn annotations(&self) -> CapabilityAnnotations {
        let mut annotations = CapabilityAnnotations::titled("Create Item");
        annotations.destructive_hint = Some(false);
        annotations
    }

    fn input_contract(&self) -> Option<Value> {
        Some(contract_for::<CreateItemInput>())
    }

    async fn execute(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        let input: CreateItemInput = parse_input(input)?;
        let board_id = resolve_board_id(input.board_id, self.context.as_ref())?;
        // The API expects column values as a JSON-encoded string.
        let column_values = input.column_values.map(|v| v.to_string());
        let variables = json!({
            "boardId": board_id,
            "itemName": input.item_name,
            "groupId": input.group_id,
            "columnValues": column_values,
        });

        let data = self.client.request(CREATE_ITEM_MUTATION, Some(variables)).await?;
        let id = data["create_item"]["id"]
            .as_str()
            .ok_or_else(|| CapabilityError::Execution("API did not return the new item id".to_string()))?;
        Ok(CapabilityOutput::text(format!(
            "Item {} created on board {}",
            id, board_id
        ))
        .with_metadata(data["create_item"].clone()))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct DeleteItemInput {
    item_id: String,
}

/// Hidden until explicitly enabled.
pub struct DeleteItem {
    client: Arc<dyn ApiClient>,
}

impl DeleteItem {
    pub const NAME: &'static str = "delete_item";

    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Capability for DeleteItem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        "Permanently delete an item.".to_string()
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::Write
    }

    fn annotations(&self) -> CapabilityAnnotations {
        CapabilityAnnotations::titled("Delete Item").destructive()
    }

    fn default_enabled(&self) -> Option<bool> {
        Some(false)
    }

    fn input_contract(&self) -> Option<Value> {
        Some(contract_for::<DeleteItemInput>())
    }

    async fn execute(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        let input: DeleteItemInput = parse_input(input)?;
        self.client
            .request(DELETE_ITEM_MUTATION, Some(json!({ "itemId": input.item_id })))
            .await?;
        Ok(CapabilityOutput::text(format!("Item {} deleted", input.item_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubApiClient;

    #[tokio::test]
    async fn test_board_items_fall_back_to_context_board() {
        let client = Arc::new(StubApiClient::responding(json!({
            "boards": [{"items_page": {"items": [{"id": "1", "name": "Task"}]}}]
        })));
        let cap = GetBoardItems::new(client.clone(), Some(ToolkitContext::new().with_board_id("77")));

        let output = cap.execute(json!({})).await.unwrap();

        assert!(output.content.contains("Task"));
        let requests = client.requests.lock();
        let vars = requests[0].1.clone().unwrap();
        assert_eq!(vars["boardId"], "77");
        assert_eq!(vars["limit"], DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_board_items_without_board_is_missing_argument() {
        let cap = GetBoardItems::new(Arc::new(StubApiClient::default()), None);
        let err = cap.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, CapabilityError::MissingArgument(ref a) if a == "boardId"));
    }

    #[tokio::test]
    async fn test_create_item_encodes_column_values() {
        let client = Arc::new(StubApiClient::responding(json!({"create_item": {"id": "501"}})));
        let cap = CreateItem::new(client.clone(), None);

        let output = cap
            .execute(json!({"boardId": "3", "itemName": "Ship", "columnValues": {"status": "Done"}}))
            .await
            .unwrap();

        assert_eq!(output.content, "Item 501 created on board 3");
        let vars = client.requests.lock()[0].1.clone().unwrap();
        assert_eq!(vars["columnValues"], r#"{"status":"Done"}"#);
    }

    #[test]
    fn test_delete_item_is_disabled_by_default() {
        let cap = DeleteItem::new(Arc::new(StubApiClient::default()));
        assert_eq!(cap.default_enabled(), Some(false));
        assert_eq!(cap.category(), CapabilityCategory::Write);
    }
}
