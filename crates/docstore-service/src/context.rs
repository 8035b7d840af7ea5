//! Request context carrying the acting owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current request.
///
/// The owner identity comes from whatever verified the caller; every
/// service call is scoped to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The owner on whose behalf the request runs.
    pub owner_id: Uuid,
    /// When the request was received. Used as the soft-delete timestamp.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped with the current time.
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            request_time: Utc::now(),
        }
    }
}
