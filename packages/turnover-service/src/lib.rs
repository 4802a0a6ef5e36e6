pub mod cache;
pub mod client;
pub mod codec;
pub mod coalescer;
pub mod layout;
pub mod limiter;
pub mod service;

mod error;

pub use cache::ReadCache;
pub use client::{CacheStatus, ClientOptions, RemoteStoreClient};
pub use coalescer::{SaveCoalescer, WriteFn};
pub use codec::Row;
pub use error::{Error, Result};
pub use limiter::RateLimiter;
pub use service::{Outcome, TurnoverService};

use std::{future::Future, pin::Pin};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
