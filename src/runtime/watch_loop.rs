//! # Watch Loop
//!
//! Watches TLS secrets and feeds their keys into the work queue.
//!
//! Every apply, initial-list and delete event becomes a `namespace/name` key.
//! Deletions are queued as well; the reconciler resolves them to a skip once
//! it finds the secret gone.

use crate::constants::TLS_SECRET_TYPE;
use crate::controller::credential::ObjectKey;
use crate::controller::queue::WorkQueue;
use crate::controller::server::ServerState;
use crate::runtime::error_policy::handle_watch_stream_error;
use futures::{pin_mut, StreamExt};
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use kube_runtime::{watcher, WatchStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Watch TLS secrets until the stream ends or the queue shuts down
///
/// Readiness is reported once the initial list has been queued.
pub async fn run_watch_loop(
    client: Client,
    watch_namespace: Option<String>,
    queue: WorkQueue,
    server_state: Arc<ServerState>,
) {
    let secrets: Api<Secret> = match &watch_namespace {
        Some(namespace) => Api::namespaced(client, namespace),
        None => Api::all(client),
    };

    info!(
        "Starting watch for {} secrets in {}",
        TLS_SECRET_TYPE,
        watch_namespace.as_deref().unwrap_or("all namespaces")
    );

    let config = watcher::Config::default().fields(&format!("type={TLS_SECRET_TYPE}"));
    let stream = watcher(secrets, config).default_backoff();
    pin_mut!(stream);

    while let Some(event_result) = stream.next().await {
        if queue.is_shutting_down() {
            break;
        }
        match event_result {
            Ok(watcher::Event::InitDone) => {
                info!("Initial secret list queued ({} keys pending)", queue.len());
                server_state.set_ready(true);
            }
            Ok(event) => {
                enqueue_event(&queue, &event);
            }
            Err(e) => {
                let error_string = format!("{e:?}");
                handle_watch_stream_error(&error_string);
            }
        }
    }

    warn!("Secret watch stream ended");
}

/// Queue the key of the secret carried by `event`
///
/// Returns `true` when a key was queued.
pub fn enqueue_event(queue: &WorkQueue, event: &watcher::Event<Secret>) -> bool {
    let secret = match event {
        watcher::Event::Apply(secret)
        | watcher::Event::InitApply(secret)
        | watcher::Event::Delete(secret) => secret,
        watcher::Event::Init | watcher::Event::InitDone => return false,
    };

    match ObjectKey::for_secret(secret) {
        Some(key) => {
            debug!("Queueing {}", key);
            queue.add(&key.to_string());
            true
        }
        None => {
            warn!("Ignoring secret event without a name");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::queue::ItemRateLimiter;
    use kube::api::ObjectMeta;
    use std::time::Duration;

    fn queue() -> WorkQueue {
        WorkQueue::new(ItemRateLimiter::new(
            Duration::from_millis(10),
            Duration::from_millis(100),
        ))
    }

    fn secret(namespace: Option<&str>, name: Option<&str>) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: name.map(str::to_string),
                namespace: namespace.map(str::to_string),
                ..Default::default()
            },
            type_: Some(TLS_SECRET_TYPE.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_apply_and_delete_events_are_queued() {
        let queue = queue();

        assert!(enqueue_event(
            &queue,
            &watcher::Event::Apply(secret(Some("web"), Some("a")))
        ));
        assert!(enqueue_event(
            &queue,
            &watcher::Event::Delete(secret(Some("web"), Some("b")))
        ));
        assert!(enqueue_event(
            &queue,
            &watcher::Event::InitApply(secret(None, Some("c")))
        ));

        assert_eq!(queue.get().await.as_deref(), Some("web/a"));
        assert_eq!(queue.get().await.as_deref(), Some("web/b"));
        assert_eq!(queue.get().await.as_deref(), Some("default/c"));
    }

    #[test]
    fn test_repeated_events_are_deduplicated() {
        let queue = queue();
        let event = watcher::Event::Apply(secret(Some("web"), Some("a")));

        enqueue_event(&queue, &event);
        enqueue_event(&queue, &event);

        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_marker_events_and_unnamed_secrets_are_ignored() {
        let queue = queue();

        assert!(!enqueue_event(&queue, &watcher::Event::Init));
        assert!(!enqueue_event(&queue, &watcher::Event::InitDone));
        assert!(!enqueue_event(
            &queue,
            &watcher::Event::Apply(secret(Some("web"), None))
        ));
        assert!(queue.is_empty());
    }
}
