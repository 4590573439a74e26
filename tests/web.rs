#![cfg(target_arch = "wasm32")]

use image::{Rgba, RgbaImage};
use wasm_bindgen_test::*;

use relight_wasm::engine::surface::encode_png;
use relight_wasm::{relight_directional, relight_image, RelightEditor};

fn png(px: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(4, 4, Rgba(px))).unwrap()
}

#[wasm_bindgen_test]
fn relight_directional_front_light_is_identity() {
    let base: Vec<u8> = [200u8, 150, 100, 255].repeat(4);
    let normal: Vec<u8> = [128u8, 128, 255, 255].repeat(4);
    let mut out = vec![0u8; 16];
    relight_directional(&base, &normal, None, 2, 2, &[0.0, 0.0, 1.0, 1.0, 0.0], &mut out).unwrap();
    assert_eq!(out, base);
}

#[wasm_bindgen_test]
fn relight_directional_rejects_short_buffer() {
    let mut out = vec![0u8; 16];
    assert!(relight_directional(&[0; 3], &[0; 16], None, 2, 2, &[], &mut out).is_err());
}

#[wasm_bindgen_test]
fn editor_create_move_apply() {
    let mut editor = RelightEditor::new(&png([200, 150, 100, 255]), &png([128, 128, 255, 255]), None, None, None).unwrap();
    assert_eq!(editor.light_count(), 0);
    assert_eq!(editor.active_index(), -1);

    assert_eq!(editor.create_light("spot").unwrap(), 0);
    assert!(editor.create_light("area").is_err());
    assert!(editor.pointer_move(0.0, 0.0, 0.0, 0.0, 100.0, 100.0));
    assert_eq!(editor.light_position(0).unwrap()[..2], [-1.0, 1.0]);
    assert!(editor.begin_target_edit());
    editor.pointer_move(100.0, 100.0, 0.0, 0.0, 100.0, 100.0);
    editor.end_target_edit();
    assert_eq!(editor.light_target(0).unwrap(), vec![1.0, -1.0, 0.0]);

    // stale indices are ignored
    assert!(!editor.delete_light(3));
    assert!(!editor.set_intensity(-1, 2.0));

    let mut frame = vec![0u8; 4 * 4 * 4];
    editor.render(&mut frame).unwrap();

    let saved = editor.save_config().unwrap();
    let applied = editor.apply().unwrap();
    assert!(!applied.png().is_empty());
    assert_eq!(applied.config(), saved);
}

#[wasm_bindgen_test]
fn editor_restores_saved_config() {
    let base = png([90, 90, 90, 255]);
    let normal = png([128, 128, 255, 255]);
    let mut editor = RelightEditor::new(&base, &normal, None, None, None).unwrap();
    editor.create_light("point").unwrap();
    editor.create_light("point").unwrap();
    editor.toggle_visibility(1);
    let saved = editor.save_config().unwrap();
    editor.cancel();

    let reopened = RelightEditor::new(&base, &normal, None, None, Some(saved)).unwrap();
    assert_eq!(reopened.light_count(), 2);
    assert!(reopened.light_visible(0));
    assert!(!reopened.light_visible(1));
}

#[wasm_bindgen_test]
fn relight_image_without_config_uses_default_light() {
    let out = relight_image(&png([200, 150, 100, 255]), &png([128, 128, 255, 255]), None, None, None).unwrap();
    let decoded = image::load_from_memory(&out).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (4, 4));
}
