use crate::error::{FrameplotError, FrameplotResult};

/// Identifier of a frame known to the backend, either a numeric index or a
/// symbolic name.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum FrameId {
    Index(u64),
    Name(String),
}

/// Per-frame plotting options sent to the backend.
///
/// The marker vectors `xs`, `ys`, `angles`, `sizes`, `colors` and `labels`
/// are parallel: index `i` of each present vector describes marker `i`.
/// Unset fields are omitted from the serialized payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<FrameId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xs: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ys: Option<Vec<f64>>,
    /// Marker rotations in radians, rendered as arrows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angles: Option<Vec<f64>>,
    /// Circle radii.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    /// Text printed at each marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    /// Text plotted in the upper left corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Resizing applied to the image prior to plotting.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Restricts the plot to a sub-region of the image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_coordinates: Option<[f64; 4]>,
}

fn default_scale() -> f64 {
    0.5
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            frame_id: None,
            xs: None,
            ys: None,
            angles: None,
            sizes: None,
            colors: None,
            labels: None,
            title: None,
            scale: default_scale(),
            crop_coordinates: None,
        }
    }
}

impl FrameOptions {
    pub fn validate(&self) -> FrameplotResult<()> {
        if !(self.scale > 0.0) {
            return Err(FrameplotError::validation("scale must be > 0"));
        }

        let mut expected: Option<(&'static str, usize)> = None;
        let mut check = |name: &'static str, len: Option<usize>| -> FrameplotResult<()> {
            let Some(len) = len else { return Ok(()) };
            match expected {
                None => {
                    expected = Some((name, len));
                    Ok(())
                }
                Some((first, want)) if want != len => Err(FrameplotError::validation(format!(
                    "marker vector '{name}' has length {len}, but '{first}' has length {want}"
                ))),
                Some(_) => Ok(()),
            }
        };

        check("xs", self.xs.as_ref().map(Vec::len))?;
        check("ys", self.ys.as_ref().map(Vec::len))?;
        check("angles", self.angles.as_ref().map(Vec::len))?;
        check("sizes", self.sizes.as_ref().map(Vec::len))?;
        check("colors", self.colors.as_ref().map(Vec::len))?;
        check("labels", self.labels.as_ref().map(Vec::len))?;

        Ok(())
    }

    /// Number of markers described by the present vectors, 0 if none are set.
    pub fn marker_count(&self) -> usize {
        self.xs
            .as_ref()
            .or(self.ys.as_ref())
            .or(self.angles.as_ref())
            .or(self.sizes.as_ref())
            .map_or(0, Vec::len)
    }

    pub fn to_json(&self) -> FrameplotResult<String> {
        serde_json::to_string(self)
            .map_err(|e| FrameplotError::serde(format!("frame options encode failed: {e}")))
    }

    pub fn from_json(data: &str) -> FrameplotResult<Self> {
        serde_json::from_str(data)
            .map_err(|e| FrameplotError::serde(format!("frame options parse failed: {e}")))
    }
}

/// Video-level plotting options: an ordered sequence of frame options plus
/// settings applied across the whole clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<Vec<FrameOptions>>,

    /// Auto-crop margin around the supplied marker coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_margin: Option<f64>,
    /// Whether the backend fills in frames missing from `frames`.
    #[serde(default = "default_fill_gaps")]
    pub fill_gaps: bool,

    /// Overrides the per-frame crop boxes uniformly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_coordinates: Option<[f64; 4]>,
    /// Overrides the per-frame scales uniformly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

fn default_fill_gaps() -> bool {
    true
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            frames: None,
            crop_margin: None,
            fill_gaps: default_fill_gaps(),
            crop_coordinates: None,
            scale: None,
        }
    }
}

impl VideoOptions {
    pub fn validate(&self) -> FrameplotResult<()> {
        if let Some(scale) = self.scale
            && !(scale > 0.0)
        {
            return Err(FrameplotError::validation("scale override must be > 0"));
        }
        for frame in self.frames.iter().flatten() {
            frame.validate()?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> FrameplotResult<String> {
        serde_json::to_string(self)
            .map_err(|e| FrameplotError::serde(format!("video options encode failed: {e}")))
    }

    pub fn from_json(data: &str) -> FrameplotResult<Self> {
        serde_json::from_str(data)
            .map_err(|e| FrameplotError::serde(format!("video options parse failed: {e}")))
    }
}
