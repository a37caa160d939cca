//! Queue access policy documents
//!
//! Builds the policy attached to a queue so that a notification topic may
//! publish into it.

use serde::Serialize;

use crate::error::QueueResult;

/// Policy language version understood by the queue service
const POLICY_VERSION: &str = "2008-10-17";

/// Access policy attached to a queue through its `Policy` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueuePolicy {
    /// Policy language version
    pub version: &'static str,
    /// Policy identifier
    pub id: String,
    /// Permission statements
    pub statement: Vec<PolicyStatement>,
}

/// A single permission statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    /// Statement identifier
    pub sid: String,
    /// `Allow` or `Deny`
    pub effect: &'static str,
    /// Who the statement applies to
    pub principal: Principal,
    /// Permitted action
    pub action: &'static str,
    /// ARN of the queue the statement protects
    pub resource: String,
    /// Condition restricting the statement
    pub condition: Condition,
}

/// Statement principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// Account principal, `*` for anyone
    #[serde(rename = "AWS")]
    pub aws: &'static str,
}

/// Statement condition block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    /// Exact-match conditions
    #[serde(rename = "StringEquals")]
    pub string_equals: SourceArnCondition,
}

/// Restricts a statement to requests originating from one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceArnCondition {
    /// ARN the request must originate from
    #[serde(rename = "aws:SourceArn")]
    pub source_arn: String,
}

impl QueuePolicy {
    /// Policy allowing anyone to send messages into `queue_arn`, as long as
    /// the message originates from `topic_arn`
    #[must_use]
    pub fn allow_topic(queue_arn: &str, topic_arn: &str) -> Self {
        Self {
            version: POLICY_VERSION,
            id: format!("{queue_arn}/policyId"),
            statement: vec![PolicyStatement {
                sid: format!("{queue_arn}/statementId"),
                effect: "Allow",
                principal: Principal { aws: "*" },
                action: "SQS:SendMessage",
                resource: queue_arn.to_string(),
                condition: Condition {
                    string_equals: SourceArnCondition {
                        source_arn: topic_arn.to_string(),
                    },
                },
            }],
        }
    }

    /// Serializes the policy to the JSON text expected by the `Policy` attribute
    ///
    /// # Errors
    ///
    /// Returns `QueueError::PolicySerialization` if serialization fails
    pub fn to_json(&self) -> QueueResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
