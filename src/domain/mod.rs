//! Domain layer for the vidshelf library host.
//!
//! Core types independent of the filesystem, the JSON store, and the request
//! bridge.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`outcome`]: The `Scanned` and `Persisted` result shapes
//! - [`video`]: Scan results and channel save inputs
//!
//! # Examples
//!
//! ```
//! use vidshelf::domain::{ChannelInput, VideoInput};
//!
//! let channel = ChannelInput {
//!     name: "A".to_string(),
//!     path: "/lib/A".to_string(),
//!     videos: vec![VideoInput {
//!         name: "a.mp4".to_string(),
//!         path: "/lib/A/a.mp4".to_string(),
//!         size: 1000,
//!         modified: None,
//!         duration: Some(120),
//!     }],
//! };
//! assert_eq!(channel.total_duration(), 120);
//! ```

pub mod error;
pub mod outcome;
pub mod video;

pub use error::{Result, VidshelfError};
pub use outcome::{Persisted, SaveReceipt, Scanned};
pub use video::{ChannelInput, ScannedChannel, VideoFile, VideoInput};
