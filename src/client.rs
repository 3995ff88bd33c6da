//! Blocking HTTP client for the remote plotting backend.
//!
//! Wraps the backend's `plot_frame`/`plot_video` endpoints: a request
//! descriptor is serialized to JSON, posted as a form field, and the raw
//! response bytes are decoded into an image or returned as video data.

use std::{io::Read as _, path::Path};

use anyhow::Context as _;

use crate::{
    error::{FrameplotError, FrameplotResult},
    model::{FrameOptions, VideoOptions},
};

/// Client for a single plotting backend instance.
pub struct PlotterClient {
    client: reqwest::blocking::Client,
    server_address: String,
}

impl PlotterClient {
    /// Create a client for the backend at `server_address` (`host:port`).
    ///
    /// No request timeout is configured; a hung connection blocks the
    /// calling thread until the peer closes it.
    pub fn new(server_address: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            server_address: server_address.into(),
        }
    }

    fn command_url(&self, command: &str) -> String {
        format!("http://{}/plotter/{}/", self.server_address, command)
    }

    /// Issue a request against a backend command and return the raw
    /// response body.
    ///
    /// `method` must be `"GET"` or `"POST"`; anything else fails before any
    /// network activity. `form` is sent form-encoded on POST and ignored on
    /// GET. A non-200 status fails with [`FrameplotError::Backend`] carrying
    /// the status code; the body is captured for the error message but never
    /// decoded as an artifact.
    #[tracing::instrument(skip(self, form))]
    pub fn execute_request(
        &self,
        command: &str,
        method: &str,
        form: &[(&str, String)],
    ) -> FrameplotResult<Vec<u8>> {
        let request = match method {
            "GET" => self.client.get(self.command_url(command)),
            "POST" => self.client.post(self.command_url(command)).form(form),
            other => {
                return Err(FrameplotError::UnsupportedMethod(other.to_string()));
            }
        };

        let mut response = request.send()?;

        let status = response.status();
        if status.as_u16() != 200 {
            let mut body = String::new();
            if response.read_to_string(&mut body).is_err() {
                body = "<unreadable body>".to_string();
            }
            return Err(FrameplotError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let mut buf = Vec::new();
        response
            .read_to_end(&mut buf)
            .context("failed to read response body")?;
        tracing::debug!(command, bytes = buf.len(), "backend response received");
        Ok(buf)
    }

    /// Request the rendered frame image from the backend.
    pub fn get_image(&self, opts: &FrameOptions) -> FrameplotResult<image::DynamicImage> {
        opts.validate()?;
        tracing::debug!(markers = opts.marker_count(), "requesting frame plot");
        let form = [("frame_options", opts.to_json()?)];
        let buf = self.execute_request("plot_frame", "POST", &form)?;
        image::load_from_memory(&buf)
            .map_err(|e| FrameplotError::serde(format!("frame image decode failed: {e}")))
    }

    /// Request the rendered video from the backend and return the raw
    /// container bytes.
    pub fn get_video(&self, opts: &VideoOptions) -> FrameplotResult<Vec<u8>> {
        opts.validate()?;
        let form = [("video_options", opts.to_json()?)];
        self.execute_request("plot_video", "POST", &form)
    }

    /// Request the rendered video and write it to `out_path`.
    pub fn save_video(&self, opts: &VideoOptions, out_path: &Path) -> FrameplotResult<()> {
        let buf = self.get_video(opts)?;
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
        std::fs::write(out_path, &buf)
            .with_context(|| format!("failed to write video '{}'", out_path.display()))?;
        tracing::info!(path = %out_path.display(), bytes = buf.len(), "video saved");
        Ok(())
    }
}
