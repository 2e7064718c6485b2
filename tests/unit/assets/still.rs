use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(width, height, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_keeps_straight_alpha() {
    let buf = png_bytes(1, 1, vec![100, 50, 200, 128]);
    let img = decode_image(&buf).unwrap();
    assert_eq!((img.width(), img.height()), (1, 1));
    assert_eq!(img.data(), &[100, 50, 200, 128]);
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn png_round_trip_through_disk() {
    let dir = std::env::temp_dir().join(format!("reelcast_png_{}", std::process::id()));
    let path = dir.join("nested").join("frame.png");
    let buffer = ImageBuffer::from_raw(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 7]).unwrap();

    save_png(&buffer, &path).unwrap();
    let loaded = load_image(&path).unwrap();
    assert_eq!(loaded, buffer);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_image(Path::new("/definitely/not/here.png")).is_err());
}
