//! Request pipeline for the nammy offline worker.
//!
//! This crate provides the network fetcher, request classification, the
//! caching strategies, the install/activate lifecycle and the event entry
//! points (fetch, message, push, notification click, sync) shared by the
//! server.

pub mod classify;
pub mod clients;
pub mod fallback;
pub mod fetch;
pub mod lifecycle;
pub mod messages;
pub mod notifications;
pub mod placeholder;
pub mod strategy;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{Classifier, DomainPolicy, RequestClass};
pub use clients::{ClientRegistry, WindowClient};
pub use fetch::{Destination, FetchConfig, FetchError, Fetcher, HttpFetcher, Request, RequestMode, Response, ResponseSource};
pub use lifecycle::{LifecycleController, WorkerState};
pub use messages::{CacheInfo, WorkerMessage, WorkerReply, reply_channel};
pub use notifications::{Notification, PushPayload};
pub use placeholder::placeholder;
pub use strategy::StrategyEngine;
pub use worker::{ClickOutcome, ServiceWorker, SyncOutcome};
