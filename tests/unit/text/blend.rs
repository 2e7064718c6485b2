use super::*;

#[test]
fn transparent_overlay_leaves_destination() {
    let mut dst = vec![10u8, 20, 30, 255];
    over_premul_onto_straight(&mut dst, &[0, 0, 0, 0]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn opaque_overlay_replaces_destination() {
    let mut dst = vec![10u8, 20, 30, 255];
    over_premul_onto_straight(&mut dst, &[200, 100, 50, 255]).unwrap();
    assert_eq!(dst, vec![200, 100, 50, 255]);
}

#[test]
fn half_black_over_white_is_mid_gray() {
    let mut dst = vec![255u8, 255, 255, 255];
    over_premul_onto_straight(&mut dst, &[0, 0, 0, 128]).unwrap();
    assert_eq!(dst[3], 255);
    assert!((126..=128).contains(&dst[0]), "got {}", dst[0]);
}

#[test]
fn mismatched_lengths_fail() {
    let mut dst = vec![0u8; 8];
    assert!(over_premul_onto_straight(&mut dst, &[0u8; 4]).is_err());
}
