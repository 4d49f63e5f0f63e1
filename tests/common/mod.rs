#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const SAMPLE_XML: &str = include_str!("../fixtures/sample_rotated.xml");

pub fn write_rgb_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    image::RgbImage::new(width, height)
        .save(path)
        .expect("write rgb png");
}

pub fn write_gray_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    image::GrayImage::new(width, height)
        .save(path)
        .expect("write gray png");
}

pub fn write_text(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, content).expect("write text file");
}
