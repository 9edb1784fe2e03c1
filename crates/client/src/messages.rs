//! Messages posted to the worker by controlled pages.

use nammy_core::PartitionInfo;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Inbound message, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// Activate a waiting worker without waiting for pages to close.
    SkipWaiting,
    /// Ask for partition names and entry counts.
    GetCacheInfo,
}

/// Reply to [`WorkerMessage::GetCacheInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    /// Static partition name, the one the page shows as "the cache".
    pub cache_name: String,
    /// Entries in the static partition.
    pub cache_size: u64,
    /// Every live partition.
    pub partitions: Vec<PartitionInfo>,
}

/// Outbound reply, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerReply {
    CacheInfo(CacheInfo),
}

/// Port a reply is posted on. Dropped receivers are not an error.
pub type ReplyPort = oneshot::Sender<WorkerReply>;

/// Open a reply channel for one message.
pub fn reply_channel() -> (ReplyPort, oneshot::Receiver<WorkerReply>) {
    oneshot::channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_format() {
        let msg: WorkerMessage = serde_json::from_str(r#"{"type":"SKIP_WAITING"}"#).unwrap();
        assert_eq!(msg, WorkerMessage::SkipWaiting);
        let msg: WorkerMessage = serde_json::from_str(r#"{"type":"GET_CACHE_INFO"}"#).unwrap();
        assert_eq!(msg, WorkerMessage::GetCacheInfo);
        assert!(serde_json::from_str::<WorkerMessage>(r#"{"type":"CLEAR_ALL"}"#).is_err());
    }

    #[test]
    fn test_reply_wire_format() {
        let reply = WorkerReply::CacheInfo(CacheInfo {
            cache_name: "nammy-static-v1.0.2".into(),
            cache_size: 3,
            partitions: vec![PartitionInfo { name: "nammy-static-v1.0.2".into(), entries: 3 }],
        });
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "CACHE_INFO");
        assert_eq!(json["cacheName"], "nammy-static-v1.0.2");
        assert_eq!(json["cacheSize"], 3);
        assert_eq!(json["partitions"][0]["entries"], 3);
    }
}
