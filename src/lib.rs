//! calorie-scale - keyword activity as a live intensity signal.
//!
//! Samples recent posts matching a keyword, turns the spacing between them
//! into an intensity score in `[0, 100]`, and keeps republishing the latest
//! score over OSC so a downstream patch always has a current value.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        calorie-scale                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │   Source    │──▶│  Estimator  │──▶│    Cell     │         │
//! │  │ (search 6s) │   │ (gap+ease)  │   │  (atomic)   │         │
//! │  └─────────────┘   └─────────────┘   └──────┬──────┘         │
//! │                                             │                │
//! │                                             ▼                │
//! │                                      ┌─────────────┐         │
//! │                                      │  Publisher  │──▶ OSC  │
//! │                                      │    (1s)     │         │
//! │                                      └─────────────┘         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use calorie_scale::{Config, Engine, OscTransport, ShutdownController, TwitterClient, TwitterConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let source = TwitterClient::new(TwitterConfig::new(
//!     &config.api_base_url,
//!     &config.twitter_client_id,
//!     &config.twitter_client_secret,
//! ))?;
//! let transport = OscTransport::bind(&config.osc_host, config.osc_port).await?;
//!
//! let controller = ShutdownController::new();
//! let handle = Engine::new(&config, Arc::new(source), Arc::new(transport))
//!     .start(controller.signal());
//!
//! controller.shutdown();
//! handle.join().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod logging;
pub mod source;
pub mod transport;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    ease_in_out_cubic, Estimate, EstimateError, GapStats, Intensity, IntensityCell,
    IntensityEstimator, SharedIntensityCell,
};
pub use engine::{
    Engine, EngineHandle, PublishOutcome, Publisher, SampleOutcome, Sampler, ShutdownController,
    ShutdownSignal,
};
pub use source::{
    EventSource, SearchQuery, SourceError, SourceItem, TimestampParseError, TwitterClient,
    TwitterConfig,
};
pub use transport::{OscTransport, Transport, TransportError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
