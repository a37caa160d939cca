use clap::{Parser, Subcommand};

/// Drive SQS queues through the queue facade
#[derive(Debug, Parser)]
#[command(name = "queue-cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create a queue (or look up an existing one) and print its URL
    Create { queue_name: String },

    /// List the URLs of all queues
    List,

    /// Send a message to a queue
    Send { queue_url: String, body: String },

    /// Receive messages from a queue
    Receive {
        queue_url: String,

        /// Print message IDs instead of bodies
        #[arg(long)]
        ids: bool,

        /// Also print the body of the received message at this index
        #[arg(long)]
        show: Option<usize>,

        /// Maximum number of messages to receive (1 to 10)
        #[arg(long)]
        max_messages: Option<i32>,
    },

    /// Delete a message from the named queue using its receipt handle
    Delete {
        queue_name: String,
        receipt_handle: String,
    },

    /// Print the ARN of a queue
    Arn { queue_url: String },

    /// Allow a notification topic to send messages into a queue
    AllowNotifications { queue_url: String, topic_arn: String },
}
