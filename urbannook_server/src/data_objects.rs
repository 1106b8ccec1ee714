use serde::{Deserialize, Serialize};
use urbannook_engine::{db_types::TrackingUpdate, order_objects::StatusUpdateRequest};

/// The body of a status change request. The order id comes from the path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeParams {
    pub status: Option<String>,
    pub note: Option<String>,
    pub tracking_info: Option<TrackingUpdate>,
}

impl StatusChangeParams {
    pub fn into_request(self, order_id: String) -> StatusUpdateRequest {
        StatusUpdateRequest {
            order_id: Some(order_id),
            status: self.status,
            note: self.note,
            tracking_info: self.tracking_info,
        }
    }
}
