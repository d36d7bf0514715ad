//! Defines the rosbridge JSON envelopes exchanged over the WebSocket.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames sent from this client to the bridge.
///
/// Serialises with `op` first, e.g.
/// `{"op":"publish","topic":"/t","type":"std_msgs/String","msg":{...}}`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum OutgoingFrame {
    /// Publishes `msg` on `topic`. The bridge sends no acknowledgement.
    Publish {
        topic: String,
        #[serde(rename = "type")]
        message_type: String,
        msg: Value,
    },
    /// Asks the bridge to forward messages published on `topic`.
    Subscribe { topic: String },
}

impl OutgoingFrame {
    pub fn publish(topic: &str, message_type: &str, msg: Value) -> Self {
        Self::Publish {
            topic: topic.to_string(),
            message_type: message_type.to_string(),
            msg,
        }
    }

    pub fn subscribe(topic: &str) -> Self {
        Self::Subscribe {
            topic: topic.to_string(),
        }
    }

    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A frame received from the bridge.
///
/// Only the fields needed for subscription matching are modelled; everything
/// else (status reports, service responses) is tolerated and ignored.
#[derive(Deserialize, Debug, Clone)]
pub struct IncomingFrame {
    pub op: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub msg: Option<Value>,
}

impl IncomingFrame {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// True for a `publish` frame delivered on `topic`.
    pub fn is_publish_on(&self, topic: &str) -> bool {
        self.op == "publish" && self.topic.as_deref() == Some(topic)
    }
}
