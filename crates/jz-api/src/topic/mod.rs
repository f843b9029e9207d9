pub mod model;
pub mod routes;

pub use routes::routes;

use jz_db::models::Topic;

use crate::{error::ApiError, store::Store};

/// Parse an id from the URL; anything unparsable is a missing resource
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("{what} {raw:?} does not exist")))
}

/// Load a topic or fail with 404
pub(crate) async fn load_topic(store: &dyn Store, topic_id: i64) -> Result<Topic, ApiError> {
    store
        .topic(topic_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("topic {topic_id} does not exist")))
}
