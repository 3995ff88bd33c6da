use frameplot::{FrameId, FrameOptions, VideoOptions};

fn populated_frame() -> FrameOptions {
    FrameOptions {
        frame_id: Some(FrameId::Index(17)),
        xs: Some(vec![10.0, 20.5]),
        ys: Some(vec![30.0, 40.25]),
        angles: Some(vec![0.0, 1.5707]),
        sizes: Some(vec![4.0, 4.0]),
        colors: Some(vec!["yellow".to_string(), "red".to_string()]),
        labels: Some(vec!["a".to_string(), "b".to_string()]),
        title: Some("frame 17".to_string()),
        scale: 0.75,
        crop_coordinates: Some([0.0, 0.0, 100.0, 100.0]),
    }
}

#[test]
fn frame_options_round_trip() {
    let opts = populated_frame();
    let json = opts.to_json().unwrap();
    let back = FrameOptions::from_json(&json).unwrap();
    assert_eq!(opts, back);
}

#[test]
fn sparse_frame_options_round_trip() {
    let opts = FrameOptions {
        frame_id: Some(FrameId::Name("cam1_3".to_string())),
        title: Some("only a title".to_string()),
        ..Default::default()
    };
    let json = opts.to_json().unwrap();
    let back = FrameOptions::from_json(&json).unwrap();
    assert_eq!(opts, back);
}

#[test]
fn serialization_contains_exactly_the_set_fields() {
    let opts = FrameOptions {
        frame_id: Some(FrameId::Index(2)),
        xs: Some(vec![1.0]),
        ys: Some(vec![2.0]),
        ..Default::default()
    };

    let value: serde_json::Value = serde_json::from_str(&opts.to_json().unwrap()).unwrap();
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();

    // `scale` carries a non-unset default and is always present.
    assert_eq!(keys, ["frame_id", "scale", "xs", "ys"]);
}

#[test]
fn default_serialization_is_scale_only() {
    let value: serde_json::Value =
        serde_json::from_str(&FrameOptions::default().to_json().unwrap()).unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    assert_eq!(obj["scale"], serde_json::json!(0.5));
}

#[test]
fn video_options_round_trip() {
    let opts = VideoOptions {
        frames: Some(vec![populated_frame(), FrameOptions::default()]),
        crop_margin: Some(25.0),
        fill_gaps: false,
        crop_coordinates: None,
        scale: Some(1.0),
    };
    let json = opts.to_json().unwrap();
    let back = VideoOptions::from_json(&json).unwrap();
    assert_eq!(opts, back);
}

#[test]
fn video_serialization_skips_unset_fields() {
    let value: serde_json::Value =
        serde_json::from_str(&VideoOptions::default().to_json().unwrap()).unwrap();
    let obj = value.as_object().unwrap();

    // `fill_gaps` defaults to true and is always present, like `scale` on
    // frames; the unset frame list and overrides are omitted.
    assert_eq!(obj.len(), 1);
    assert_eq!(obj["fill_gaps"], serde_json::json!(true));
}

#[test]
fn video_serialization_keeps_a_set_frame_list() {
    let opts = VideoOptions {
        frames: Some(vec![FrameOptions::default()]),
        ..Default::default()
    };
    let value: serde_json::Value = serde_json::from_str(&opts.to_json().unwrap()).unwrap();
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["fill_gaps", "frames"]);
}

#[test]
fn malformed_payload_is_a_serde_error() {
    let err = FrameOptions::from_json("{not json").unwrap_err();
    assert!(matches!(err, frameplot::FrameplotError::Serde(_)));
}
