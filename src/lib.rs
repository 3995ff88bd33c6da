#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod media;
pub mod model;
pub mod overlay;

pub use client::PlotterClient;
pub use config::Config;
pub use error::{FrameplotError, FrameplotResult};
pub use media::{Frame, FrameContainer};
pub use model::{FrameId, FrameOptions, VideoOptions};
