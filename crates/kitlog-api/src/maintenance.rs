// Maintenance record endpoints
//
// Records are append-only and always addressed through their owning
// item: reads filter with `?itemId=`, writes carry `itemId` in the body.

use tracing::debug;

use crate::auth::SessionToken;
use crate::client::{InventoryClient, Operation};
use crate::error::Error;
use crate::models::{MaintenanceResponse, NewMaintenance};

impl InventoryClient {
    /// Service history for one item, in the order the service returns it.
    ///
    /// `GET /maintenance?itemId={id}`
    pub async fn list_maintenance(
        &self,
        token: &SessionToken,
        item_id: &str,
    ) -> Result<Vec<MaintenanceResponse>, Error> {
        let mut url = self.url("maintenance")?;
        url.query_pairs_mut().append_pair("itemId", item_id);
        debug!(item_id, "listing maintenance records");
        let body = self
            .get_value(Operation::ListMaintenance, url, token)
            .await?;
        Ok(Self::decode_list(Operation::ListMaintenance, Some(body)))
    }

    /// Append a maintenance record to an item's history.
    ///
    /// `POST /maintenance` with `{"itemId", "serviceType", "dateOfService", "cost"}`
    pub async fn create_maintenance(
        &self,
        token: &SessionToken,
        record: &NewMaintenance,
    ) -> Result<MaintenanceResponse, Error> {
        let url = self.url("maintenance")?;
        debug!(
            item_id = %record.item_id,
            service_type = %record.service_type,
            "creating maintenance record"
        );
        self.post(Operation::CreateMaintenance, url, token, record)
            .await
    }
}
