use queue_facade::{LastReceived, QueueFacade, ReceiveOptions};
use serde_json::{json, Value};
use tracing::info;

use crate::cli::Command;

/// Runs one command against the facade and returns its JSON output
///
/// # Errors
///
/// Returns the facade error of the failed operation; by then the credential
/// manager has already seen it
pub async fn run(facade: &QueueFacade, command: Command) -> anyhow::Result<Value> {
    let output = match command {
        Command::Create { queue_name } => {
            let created = facade.create_queue(&queue_name).await?;
            info!("Queue {} available at {}", queue_name, created.queue_url);
            json!(created)
        }
        Command::List => json!({ "queue_urls": facade.queue_urls().await? }),
        Command::Send { queue_url, body } => json!(facade.send_message(&queue_url, &body).await?),
        Command::Receive {
            queue_url,
            ids,
            show,
            max_messages,
        } => {
            let facade = match max_messages {
                Some(max_messages) => facade.clone().with_receive_options(
                    ReceiveOptions {
                        max_messages,
                        ..facade.receive_options()
                    }
                    .clamped(),
                ),
                None => facade.clone(),
            };
            receive(&facade, &queue_url, ids, show).await?
        }
        Command::Delete {
            queue_name,
            receipt_handle,
        } => {
            facade.delete_message(&queue_name, &receipt_handle).await?;
            json!({ "deleted": receipt_handle })
        }
        Command::Arn { queue_url } => json!({ "queue_arn": facade.queue_arn(&queue_url).await? }),
        Command::AllowNotifications {
            queue_url,
            topic_arn,
        } => {
            facade.allow_notifications(&queue_url, &topic_arn).await?;
            json!({ "queue_url": queue_url, "allowed_topic_arn": topic_arn })
        }
    };

    Ok(output)
}

async fn receive(
    facade: &QueueFacade,
    queue_url: &str,
    ids: bool,
    show: Option<usize>,
) -> anyhow::Result<Value> {
    let mut last = LastReceived::new();

    let mut output = if ids {
        json!({ "message_ids": facade.receive_message_ids(queue_url, &mut last).await? })
    } else {
        json!({ "bodies": facade.receive_message_bodies(queue_url, &mut last).await? })
    };
    if last.is_empty() {
        info!("No messages available on {}", queue_url);
    }
    output["received"] = json!(last.len());
    output["messages"] = json!(last.messages());

    if let Some(index) = show {
        output["shown"] = json!(last.message_body(index)?);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use queue_facade::mock::{MockQueueService, RecordingCredentialManager, MOCK_QUEUE_URL_PREFIX};
    use queue_facade::{Operation, ServiceError};
    use std::sync::Arc;

    fn facade() -> (QueueFacade, Arc<MockQueueService>, Arc<RecordingCredentialManager>) {
        let service = Arc::new(MockQueueService::new());
        let credentials = Arc::new(RecordingCredentialManager::new());
        (
            QueueFacade::new(service.clone(), credentials.clone()),
            service,
            credentials,
        )
    }

    #[tokio::test]
    async fn test_create_send_receive() {
        let (facade, _service, _credentials) = facade();
        let queue_url = format!("{MOCK_QUEUE_URL_PREFIX}cli");

        let created = run(
            &facade,
            Command::Create {
                queue_name: "cli".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(created, json!({ "queue_url": queue_url }));

        for body in ["a", "b"] {
            run(
                &facade,
                Command::Send {
                    queue_url: queue_url.clone(),
                    body: body.to_string(),
                },
            )
            .await
            .unwrap();
        }

        let received = run(
            &facade,
            Command::Receive {
                queue_url: queue_url.clone(),
                ids: false,
                show: Some(1),
                max_messages: Some(5),
            },
        )
        .await
        .unwrap();

        assert_eq!(received["bodies"], json!(["a", "b"]));
        assert_eq!(received["received"], 2);
        assert_eq!(received["shown"], "b");
        assert_eq!(received["messages"][0]["receipt_handle"], "receipt-0");
    }

    #[tokio::test]
    async fn test_receive_from_empty_queue_reports_zero() {
        let (facade, _service, _credentials) = facade();
        let queue_url = format!("{MOCK_QUEUE_URL_PREFIX}quiet");
        run(
            &facade,
            Command::Create {
                queue_name: "quiet".to_string(),
            },
        )
        .await
        .unwrap();

        let received = run(
            &facade,
            Command::Receive {
                queue_url,
                ids: true,
                show: None,
                max_messages: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(received["received"], 0);
        assert_eq!(received["message_ids"], json!([]));
        assert_eq!(received["messages"], json!([]));
    }

    #[tokio::test]
    async fn test_receive_show_out_of_range_fails() {
        let (facade, _service, _credentials) = facade();
        run(
            &facade,
            Command::Create {
                queue_name: "empty".to_string(),
            },
        )
        .await
        .unwrap();

        let result = run(
            &facade,
            Command::Receive {
                queue_url: format!("{MOCK_QUEUE_URL_PREFIX}empty"),
                ids: true,
                show: Some(0),
                max_messages: None,
            },
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_service_error_propagates_after_report() {
        let (facade, service, credentials) = facade();
        service.fail_next(
            Operation::ListQueues,
            ServiceError::new(Operation::ListQueues, Some("ExpiredToken"), "expired"),
        );

        let result = run(&facade, Command::List).await;

        assert!(result.is_err());
        assert_eq!(credentials.reported().len(), 1);
    }
}
