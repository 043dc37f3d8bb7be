use std::io::Cursor;

use spinframe::{FramePreloader, FsFrameFetcher, LoadState, decode_frame};

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "spinframe_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn png_bytes(shade: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(2, 2, [shade, 0, 0, 255].repeat(4)).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn sources(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("frame-{i:02}.png")).collect()
}

#[test]
fn fetch_all_loads_every_slot_positionally() {
    let tmp = temp_dir("fetch_all");
    std::fs::create_dir_all(&tmp).unwrap();
    for (i, name) in sources(6).iter().enumerate() {
        std::fs::write(tmp.join(name), png_bytes(i as u8 * 10)).unwrap();
    }

    let mut preloader = FramePreloader::new(sources(6)).unwrap();
    let set = preloader
        .fetch_all(&FsFrameFetcher::new(&tmp))
        .unwrap()
        .expect("all frames present, set should be ready");

    assert_eq!(set.len(), 6);
    for i in 0..6 {
        assert_eq!(set.get(i).unwrap().rgba8_premul[0], i as u8 * 10);
    }
    assert!(preloader.is_ready());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_file_withholds_readiness_and_flags_the_slot() {
    let tmp = temp_dir("missing_file");
    std::fs::create_dir_all(&tmp).unwrap();
    // slot 1 has no backing file
    for (i, name) in sources(3).iter().enumerate() {
        if i != 1 {
            std::fs::write(tmp.join(name), png_bytes(i as u8)).unwrap();
        }
    }

    let mut preloader = FramePreloader::new(sources(3)).unwrap();
    let set = preloader.fetch_all(&FsFrameFetcher::new(&tmp)).unwrap();
    assert!(set.is_none());
    assert!(!preloader.is_ready());
    assert!(preloader.has_errors());
    assert_eq!(preloader.state(1), Some(LoadState::Errored));
    assert_eq!(preloader.loaded_count(), 2);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn completion_order_does_not_matter() {
    // in-order, reverse, and interleaved delivery all fire readiness exactly
    // once, on the final completion
    let orders: [&[usize]; 3] = [&[0, 1, 2, 3], &[3, 2, 1, 0], &[2, 0, 3, 1]];

    for order in orders {
        let mut preloader = FramePreloader::new(sources(4)).unwrap();
        let mut ready_count = 0;
        for (step, &index) in order.iter().enumerate() {
            let frame = decode_frame(&png_bytes(index as u8)).unwrap();
            if let Some(set) = preloader.complete(index, Ok(frame)).unwrap() {
                ready_count += 1;
                assert_eq!(step, order.len() - 1, "readiness fired early");
                // slots reflect source order, not completion order
                for i in 0..4 {
                    assert_eq!(set.get(i).unwrap().rgba8_premul[0], i as u8);
                }
            }
        }
        assert_eq!(ready_count, 1, "order {order:?}");
    }
}

#[test]
fn decoding_garbage_bytes_marks_the_slot_errored() {
    struct GarbageFetcher;
    impl spinframe::FrameFetcher for GarbageFetcher {
        fn fetch(&self, _source: &str) -> spinframe::SpinframeResult<Vec<u8>> {
            Ok(b"definitely not a png".to_vec())
        }
    }

    let mut preloader = FramePreloader::new(sources(2)).unwrap();
    let set = preloader.fetch_all(&GarbageFetcher).unwrap();
    assert!(set.is_none());
    assert!(preloader.has_errors());
    assert_eq!(preloader.loaded_count(), 0);
}
