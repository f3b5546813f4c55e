#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;

    use image::codecs::gif::GifEncoder;
    use image::{Delay, Rgba, RgbaImage};

    use crate::core::ViewerConfig;
    use crate::media::{GifLoader, LoadError, LoaderOptions};

    /// Canned reply written for one accepted connection.
    struct Reply {
        status: &'static str,
        headers: Vec<String>,
        body: Vec<u8>,
        stall: bool,
    }

    impl Reply {
        fn ok(body: Vec<u8>) -> Self {
            Self { status: "200 OK", headers: vec!["Content-Type: image/gif".to_string()], body, stall: false }
        }

        fn status(status: &'static str) -> Self {
            Self { status, headers: Vec::new(), body: b"nope".to_vec(), stall: false }
        }

        fn redirect(location: String) -> Self {
            Self { status: "302 Found", headers: vec![format!("Location: {}", location)], body: Vec::new(), stall: false }
        }

        fn stall() -> Self {
            Self { status: "200 OK", headers: Vec::new(), body: Vec::new(), stall: true }
        }
    }

    /// Serve `replies` in order, one per connection, and return the base URL.
    fn serve(replies: Vec<Reply>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let base = format!("http://{}", listener.local_addr().unwrap());

        thread::spawn(move || {
            for reply in replies {
                let Ok((stream, _)) = listener.accept() else { return };
                respond(stream, reply);
            }
        });

        base
    }

    fn respond(mut stream: TcpStream, reply: Reply) {
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
            if line == "\r\n" {
                break;
            }
            line.clear();
        }

        if reply.stall {
            thread::sleep(Duration::from_secs(3));
            return;
        }

        let mut head = format!("HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n", reply.status, reply.body.len());
        for header in &reply.headers {
            head.push_str(header);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&reply.body);
        let _ = stream.flush();
    }

    fn tiny_gif(frames: usize) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            let frames = (0..frames).map(|i| {
                let buffer = RgbaImage::from_pixel(3, 2, Rgba([i as u8 * 80, 10, 10, 255]));
                image::Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(50, 1))
            });
            encoder.encode_frames(frames).expect("encode test gif");
        }
        bytes
    }

    fn loader() -> GifLoader {
        let options = LoaderOptions {
            timeout: Duration::from_millis(500),
            ..LoaderOptions::default()
        };
        GifLoader::new(options).expect("client builds")
    }

    #[test]
    fn test_load_success() {
        let base = serve(vec![Reply::ok(tiny_gif(3))]);
        let animation = loader().load(&format!("{}/anim.gif", base)).expect("loads");

        assert_eq!(animation.frames.len(), 3);
        assert_eq!(animation.frames.dimensions(), (3, 2));
        assert_eq!(animation.delay.as_duration(), Duration::from_millis(50));
    }

    #[test]
    fn test_load_follows_redirects() {
        let target = serve(vec![Reply::ok(tiny_gif(2))]);
        let base = serve(vec![Reply::redirect(format!("{}/real.gif", target))]);

        let animation = loader().load(&format!("{}/moved.gif", base)).expect("redirect followed");
        assert_eq!(animation.frames.len(), 2);
    }

    #[test]
    fn test_non_success_status_is_network_error() {
        for status in ["404 Not Found", "500 Internal Server Error"] {
            let base = serve(vec![Reply::status(status)]);
            let err = loader().load(&format!("{}/missing.gif", base)).expect_err("must fail");
            assert!(matches!(err, LoadError::Network { .. }), "unexpected error: {:?}", err);
            assert_eq!(err.stage(), "download");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn test_timeout_is_network_error() {
        let base = serve(vec![Reply::stall()]);
        let options = LoaderOptions {
            timeout: Duration::from_millis(200),
            ..LoaderOptions::default()
        };
        let err = GifLoader::new(options)
            .unwrap()
            .load(&format!("{}/slow.gif", base))
            .expect_err("must time out");
        assert!(matches!(err, LoadError::Network { .. }));
    }

    #[test]
    fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = loader().load(&format!("http://{}/gone.gif", addr)).expect_err("refused");
        assert!(matches!(err, LoadError::Network { .. }));
    }

    #[test]
    fn test_invalid_payload_is_decode_error() {
        let base = serve(vec![Reply::ok(b"definitely not a gif".to_vec())]);
        let err = loader().load(&format!("{}/bad.gif", base)).expect_err("must fail");
        assert!(matches!(err, LoadError::Decode(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_frameless_container_is_empty_error() {
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&[1, 0, 1, 0, 0x00, 0, 0, 0x3B]);
        let base = serve(vec![Reply::ok(bytes)]);

        let err = loader().load(&format!("{}/empty.gif", base)).expect_err("must fail");
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let base = serve(vec![Reply::ok(tiny_gif(2))]);
        let options = LoaderOptions {
            max_bytes: 8,
            ..LoaderOptions::default()
        };
        let err = GifLoader::new(options)
            .unwrap()
            .fetch(&format!("{}/big.gif", base))
            .expect_err("too large");
        assert!(matches!(err, LoadError::Network { .. }));
    }

    #[test]
    fn test_unbounded_size_limit_still_downloads() {
        let config = ViewerConfig {
            max_download_mib: u64::MAX,
            ..ViewerConfig::default()
        };
        let options = config.loader_options();
        assert_eq!(options.max_bytes, u64::MAX);

        let payload = tiny_gif(2);
        let base = serve(vec![Reply::ok(payload.clone())]);
        let body = GifLoader::new(options)
            .unwrap()
            .fetch(&format!("{}/huge-limit.gif", base))
            .expect("no size overflow");
        assert_eq!(body, payload);
    }

    #[test]
    fn test_insecure_client_still_builds() {
        let options = LoaderOptions {
            accept_invalid_certs: true,
            ..LoaderOptions::default()
        };
        assert!(GifLoader::new(options).is_ok());
        assert!(!LoaderOptions::default().accept_invalid_certs);
    }
}
