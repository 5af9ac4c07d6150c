//! Concurrent delete fan-out.
//!
//! Deletes are independent, so every request is spawned at once and the call
//! resolves only when all of them have settled. One request's failure never
//! aborts the others. Results are written back into input order even though
//! execution order is arbitrary.

use crate::platform::PlatformId;
use crate::transport::PlatformTransport;
use crate::types::{DeleteRequest, DeleteResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Fallback message when a failure carries no usable text (e.g. a panicked
/// task). Operator UIs key on this string.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Metadata for a spawned delete task, used to place its result at the right
/// index and to synthesize a failure entry if the task dies.
struct TaskMeta {
    index: usize,
    uid: String,
    platform: PlatformId,
}

/// Execute every delete request concurrently, returning one result per
/// request in the same order as the input.
pub async fn delete_users(
    transport: Arc<dyn PlatformTransport>,
    requests: Vec<DeleteRequest>,
) -> Vec<DeleteResult> {
    let mut join_set = JoinSet::new();
    let mut task_meta: HashMap<tokio::task::Id, TaskMeta> = HashMap::new();
    let total = requests.len();

    for (index, request) in requests.into_iter().enumerate() {
        let transport = Arc::clone(&transport);
        let DeleteRequest { uid, platform } = request;
        let task_uid = uid.clone();

        let handle = join_set.spawn(async move { transport.delete(platform, &task_uid).await });
        task_meta.insert(
            handle.id(),
            TaskMeta {
                index,
                uid,
                platform,
            },
        );
    }

    let mut slots: Vec<Option<DeleteResult>> = (0..total).map(|_| None).collect();

    while let Some(joined) = join_set.join_next_with_id().await {
        let (task_id, outcome) = match joined {
            Ok((id, outcome)) => (id, Some(outcome)),
            Err(join_err) => (join_err.id(), None),
        };

        let Some(meta) = task_meta.remove(&task_id) else {
            tracing::error!("delete task finished without tracked metadata");
            continue;
        };

        let result = match outcome {
            Some(Ok(data)) => DeleteResult::ok(meta.uid, meta.platform, data),
            Some(Err(err)) => {
                tracing::warn!(platform = %meta.platform, uid = %meta.uid, error = %err, "delete failed");
                let message = if err.message.trim().is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    err.message
                };
                DeleteResult::failed(meta.uid, meta.platform, message)
            }
            None => {
                tracing::error!(platform = %meta.platform, uid = %meta.uid, "delete task died");
                DeleteResult::failed(meta.uid, meta.platform, UNKNOWN_ERROR.to_string())
            }
        };

        slots[meta.index] = Some(result);
    }

    slots.into_iter().flatten().collect()
}
