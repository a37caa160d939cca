//! Integration tests for the facade against `LocalStack` SQS

mod common;

use crate::common::QueueTestContext;
use aws_sdk_sqs::types::QueueAttributeName;
use pretty_assertions::assert_eq;
use queue_facade::{LastReceived, QueueError};

#[tokio::test]
#[ignore = "requires LocalStack on localhost:4566"]
async fn test_send_receive_delete_happy_path() {
    let mut ctx = QueueTestContext::new("facade-happy-path").await;
    let queue_url = ctx.create_queue().await;
    assert!(queue_url.ends_with(&ctx.queue_name));

    let receipt = ctx
        .facade
        .send_message(&queue_url, "hello from the facade")
        .await
        .expect("Failed to send message");
    assert!(!receipt.message_id.is_empty(), "Message ID should not be empty");

    let mut last = LastReceived::new();
    let ids = ctx
        .facade
        .receive_message_ids(&queue_url, &mut last)
        .await
        .expect("Failed to receive messages");
    assert_eq!(ids, vec![receipt.message_id.clone()]);
    assert_eq!(last.message_body(0).unwrap(), "hello from the facade");

    let receipt_handle = last.receipt_handle(0).unwrap().to_string();
    ctx.facade
        .delete_message(&ctx.queue_name, &receipt_handle)
        .await
        .expect("Failed to delete message");

    // Receive again - should be empty
    let bodies = ctx
        .facade
        .receive_message_bodies(&queue_url, &mut last)
        .await
        .expect("Failed to receive messages");
    assert!(bodies.is_empty(), "Queue should be empty after delete");
    assert!(matches!(
        last.message_body(0),
        Err(QueueError::MessageIndexOutOfRange { index: 0, len: 0 })
    ));
    assert!(ctx.credentials.reported().is_empty());
}

#[tokio::test]
#[ignore = "requires LocalStack on localhost:4566"]
async fn test_created_queue_is_listed() {
    let mut ctx = QueueTestContext::new("facade-list").await;
    let queue_url = ctx.create_queue().await;

    let urls = ctx.facade.queue_urls().await.expect("Failed to list queues");

    assert!(urls.contains(&queue_url));
}

#[tokio::test]
#[ignore = "requires LocalStack on localhost:4566"]
async fn test_allow_notifications_sets_policy() {
    let mut ctx = QueueTestContext::new("facade-policy").await;
    let queue_url = ctx.create_queue().await;
    let topic_arn = "arn:aws:sns:us-east-1:000000000000:facade-topic";

    let queue_arn = ctx
        .facade
        .queue_arn(&queue_url)
        .await
        .expect("Failed to get queue ARN");
    assert!(queue_arn.ends_with(&ctx.queue_name));

    ctx.facade
        .allow_notifications(&queue_url, topic_arn)
        .await
        .expect("Failed to set policy");

    let attributes = ctx
        .sqs_client
        .get_queue_attributes()
        .queue_url(&queue_url)
        .attribute_names(QueueAttributeName::Policy)
        .send()
        .await
        .expect("Failed to read policy");
    let policy = attributes
        .attributes()
        .and_then(|attributes| attributes.get(&QueueAttributeName::Policy))
        .expect("Policy attribute not returned");
    let policy: serde_json::Value = serde_json::from_str(policy).unwrap();

    assert_eq!(policy["Statement"][0]["Resource"], queue_arn.as_str());
    assert_eq!(
        policy["Statement"][0]["Condition"]["StringEquals"]["aws:SourceArn"],
        topic_arn
    );
}

#[tokio::test]
#[ignore = "requires LocalStack on localhost:4566"]
async fn test_missing_queue_reports_service_error() {
    let ctx = QueueTestContext::new("facade-missing").await;
    let queue_url = format!("http://localhost:4566/000000000000/{}", ctx.queue_name);

    let result = ctx.facade.send_message(&queue_url, "nobody home").await;

    assert!(matches!(result, Err(QueueError::Service(_))));
    assert_eq!(ctx.credentials.reported().len(), 1);
}
