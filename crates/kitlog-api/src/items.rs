// Item endpoints
//
// The collection lives at `/items`; the listing is wrapped in an
// `{ "items": [...] }` envelope while create echoes the bare entity.

use tracing::debug;

use crate::auth::SessionToken;
use crate::client::{InventoryClient, Operation};
use crate::error::Error;
use crate::models::{ItemResponse, NewItem};

impl InventoryClient {
    /// List every item owned by the authenticated user.
    ///
    /// `GET /items`. A body without a usable `items` array is treated as
    /// an empty inventory.
    pub async fn list_items(&self, token: &SessionToken) -> Result<Vec<ItemResponse>, Error> {
        let url = self.url("items")?;
        debug!("listing items");
        let mut body = self.get_value(Operation::ListItems, url, token).await?;
        let items = body.get_mut("items").map(serde_json::Value::take);
        Ok(Self::decode_list(Operation::ListItems, items))
    }

    /// Create an item.
    ///
    /// `POST /items` with `{"name", "category", "purchaseDate", "serialNumber"}`
    pub async fn create_item(
        &self,
        token: &SessionToken,
        item: &NewItem,
    ) -> Result<ItemResponse, Error> {
        let url = self.url("items")?;
        debug!(name = %item.name, category = %item.category, "creating item");
        self.post(Operation::CreateItem, url, token, item).await
    }

    /// Delete an item by id.
    ///
    /// `DELETE /items/{id}`
    pub async fn delete_item(&self, token: &SessionToken, id: &str) -> Result<(), Error> {
        let url = self.member_url("items", id)?;
        debug!(id, "deleting item");
        self.delete(Operation::DeleteItem, url, token).await
    }
}
