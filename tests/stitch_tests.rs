//! Stitching tests: canvas size and overwrite order.

mod common;

use common::solid_png;
use image::Rgba;
use pagestitch::capture::{ImageStitcher, Tile};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn tile(color: Rgba<u8>, offset: u32) -> Tile {
    Tile {
        data: solid_png(64, 100, color),
        offset,
    }
}

#[test]
fn test_canvas_has_exact_dimensions() {
    let tiles = vec![tile(RED, 0), tile(GREEN, 80), tile(BLUE, 150)];
    let out = ImageStitcher::stitch(tiles, 250, 64).unwrap();

    assert_eq!((out.width, out.height), (64, 250));
    let img = image::load_from_memory(&out.data).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (64, 250));
}

#[test]
fn test_later_tile_wins_in_overlap() {
    let tiles = vec![tile(RED, 0), tile(GREEN, 80), tile(BLUE, 150)];
    let out = ImageStitcher::stitch(tiles, 250, 64).unwrap();
    let img = image::load_from_memory(&out.data).unwrap().to_rgba8();

    // red alone
    assert_eq!(img.get_pixel(0, 79), &RED);
    // red/green band [80, 100)
    assert_eq!(img.get_pixel(0, 80), &GREEN);
    assert_eq!(img.get_pixel(63, 99), &GREEN);
    // green/blue band [150, 180)
    assert_eq!(img.get_pixel(0, 150), &BLUE);
    assert_eq!(img.get_pixel(0, 179), &BLUE);
    assert_eq!(img.get_pixel(0, 249), &BLUE);
}

#[test]
fn test_application_order_decides_overlap() {
    // Same geometry, reversed application order.
    let tiles = vec![tile(GREEN, 80), tile(RED, 0)];
    let out = ImageStitcher::stitch(tiles, 180, 64).unwrap();
    let img = image::load_from_memory(&out.data).unwrap().to_rgba8();

    assert_eq!(img.get_pixel(0, 90), &RED);
    assert_eq!(img.get_pixel(0, 120), &GREEN);
}

#[test]
fn test_tile_taller_than_page_is_clipped() {
    let out = ImageStitcher::stitch(vec![tile(RED, 0)], 40, 64).unwrap();
    let img = image::load_from_memory(&out.data).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (64, 40));
    assert_eq!(img.get_pixel(10, 39), &RED);
}

#[test]
fn test_narrow_tile_leaves_white_margin() {
    let out = ImageStitcher::stitch(vec![tile(RED, 0)], 100, 80).unwrap();
    let img = image::load_from_memory(&out.data).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(63, 50), &RED);
    assert_eq!(img.get_pixel(70, 50), &Rgba([255, 255, 255, 255]));
}
