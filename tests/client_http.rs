use std::{
    io::{Cursor, Read as _, Write as _},
    net::TcpListener,
    thread,
};

use frameplot::{FrameOptions, FrameplotError, PlotterClient};

/// Surface the client's `tracing` output when running with `--nocapture`.
fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Serve a single canned HTTP response on a loopback port and return the
/// bound address.
fn stub_server(status_line: &str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let status_line = status_line.to_string();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();

        // Drain the request head (and any form body) before answering.
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf);

        let header = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(header.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
    });

    addr
}

#[test]
fn success_returns_exact_body_bytes() {
    init_logging();
    let payload = b"\x89PNG fake image bytes".to_vec();
    let addr = stub_server("200 OK", payload.clone());

    let client = PlotterClient::new(addr);
    let buf = client
        .execute_request("plot_frame", "POST", &[("frame_options", "{}".to_string())])
        .unwrap();
    assert_eq!(buf, payload);
}

#[test]
fn get_is_accepted() {
    let addr = stub_server("200 OK", b"ok".to_vec());

    let client = PlotterClient::new(addr);
    let buf = client.execute_request("plot_frame", "GET", &[]).unwrap();
    assert_eq!(buf, b"ok");
}

#[test]
fn non_200_surfaces_the_status_code() {
    let addr = stub_server("500 Internal Server Error", b"render crashed".to_vec());

    let client = PlotterClient::new(addr);
    let err = client
        .execute_request("plot_frame", "POST", &[("frame_options", "{}".to_string())])
        .unwrap_err();

    match err {
        FrameplotError::Backend { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "render crashed");
        }
        other => panic!("expected Backend error, got {other}"),
    }
}

#[test]
fn get_image_decodes_a_served_png() {
    init_logging();
    let mut png = Vec::new();
    image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let addr = stub_server("200 OK", png);

    let client = PlotterClient::new(addr);
    let img = client.get_image(&FrameOptions::default()).unwrap();
    assert_eq!((img.width(), img.height()), (3, 2));
}

#[test]
fn get_image_on_error_status_never_decodes() {
    // The error body is not valid image data; a decode attempt would turn
    // this into a Serde error instead of Backend.
    let addr = stub_server("500 Internal Server Error", b"not an image".to_vec());

    let client = PlotterClient::new(addr);
    let err = client.get_image(&FrameOptions::default()).unwrap_err();
    assert!(matches!(err, FrameplotError::Backend { status: 500, .. }));
}

#[test]
fn unsupported_method_fails_before_dialing() {
    // No listener exists on this address; reaching the network would fail
    // with `Request` instead.
    let client = PlotterClient::new("127.0.0.1:9");
    let err = client.execute_request("plot_frame", "PUT", &[]).unwrap_err();
    assert!(matches!(err, FrameplotError::UnsupportedMethod(m) if m == "PUT"));
}

#[test]
fn connection_failure_is_a_request_error() {
    let client = PlotterClient::new("127.0.0.1:9");
    let err = client.execute_request("plot_frame", "GET", &[]).unwrap_err();
    assert!(matches!(err, FrameplotError::Request(_)));
}
