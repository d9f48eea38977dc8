use ppmgrid::ppm::{
    self, DecodeError, DecodeOptions, Pixel, PixelGrid, TokenRole, decode_str, encode_to_string,
};

fn sample_grid(width: u32, height: u32, max_value: u32) -> PixelGrid {
    let pixels = (0..width * height)
        .map(|i| Pixel::new(i % (max_value + 1), (i * 7) % (max_value + 1), max_value - i % (max_value + 1)))
        .collect();
    PixelGrid::from_pixels(width, height, max_value, pixels).unwrap()
}

#[test]
fn encode_then_decode_is_identity() {
    for (w, h, max) in [(1, 1, 255), (5, 3, 255), (17, 4, 65535), (3, 9, 1), (0, 0, 255)] {
        let grid = sample_grid(w, h, max);
        let text = encode_to_string(&grid);
        assert_eq!(ppm::decode(text.as_bytes()).unwrap(), grid, "{w}x{h} max {max}");
    }
}

#[test]
fn at_matches_read_order() {
    let (w, h) = (4u32, 3u32);
    let mut text = format!("P3\n{w} {h}\n255\n");
    for i in 0..w * h {
        text.push_str(&format!("{} {} {}\n", i, i + 1, i + 2));
    }

    let grid = decode_str(&text, &DecodeOptions::default()).unwrap();
    assert_eq!(grid.pixels().len(), (w * h) as usize);
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            assert_eq!(grid.at(x, y), Some(Pixel::new(i, i + 1, i + 2)));
        }
    }
}

#[test]
fn comments_and_blank_lines_do_not_change_result() {
    let plain = "P3\n2 2\n255\n1 2 3 4 5 6\n7 8 9 10 11 12\n";
    let noisy = "# leading\n\n# again\nP3\n# after magic\n2 2\n\n255\n# pixels follow\n# really\n1 2 3 4 5 6\n\n7 8 9 10 11 12\n# trailing";

    let opts = DecodeOptions::default();
    assert_eq!(decode_str(plain, &opts).unwrap(), decode_str(noisy, &opts).unwrap());
}

#[test]
fn two_by_two_with_three_triples_is_truncated() {
    let err = decode_str("P3\n2 2\n255\n0 0 0\n1 1 1\n2 2 2\n", &DecodeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TruncatedInput {
            role: TokenRole::Red,
            ..
        }
    ));
}

#[test]
fn p6_header_is_invalid_magic() {
    let err = ppm::decode(&b"P6\n1 1\n255\n\x00\x00\x00"[..]).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidMagic { .. }));
}

#[test]
fn decode_from_file_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("red.ppm");
    std::fs::write(&path, "P3 1 1 255 255 0 0").unwrap();

    let grid = ppm::decode(std::fs::File::open(&path).unwrap()).unwrap();
    assert_eq!(grid.at(0, 0), Some(Pixel::new(255, 0, 0)));
}
