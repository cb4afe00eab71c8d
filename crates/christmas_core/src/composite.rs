// SPDX-License-Identifier: MIT OR Apache-2.0
//! Composite export: the rendered 3D frame over the captured background.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Pixel, Rgba, RgbaImage};

/// Layer `foreground` over `background`.
///
/// The background is scaled to the foreground's height keeping its aspect
/// ratio, centred horizontally (cropped or letterboxed with opaque black)
/// and drawn first. The output always has the foreground's size. Without a
/// background the foreground is returned unchanged.
pub fn compose(background: Option<&DynamicImage>, foreground: &DynamicImage) -> DynamicImage {
    let Some(background) = background else {
        return foreground.clone();
    };

    let (fg_width, fg_height) = foreground.dimensions();
    let (bg_width, bg_height) = background.dimensions();
    if bg_width == 0 || bg_height == 0 || fg_width == 0 || fg_height == 0 {
        tracing::warn!("Empty image in composite, exporting foreground only");
        return foreground.clone();
    }

    let scale = f64::from(fg_height) / f64::from(bg_height);
    let scaled_width = (f64::from(bg_width) * scale).round().max(1.0) as u32;
    let offset_x = ((f64::from(fg_width) - f64::from(bg_width) * scale) / 2.0).round() as i64;

    let scaled = if (scaled_width, fg_height) == (bg_width, bg_height) {
        background.to_rgba8()
    } else {
        imageops::resize(background, scaled_width, fg_height, FilterType::Triangle)
    };

    let mut canvas = RgbaImage::from_pixel(fg_width, fg_height, Rgba([0, 0, 0, u8::MAX]));
    layer(&mut canvas, &scaled, offset_x);
    layer(&mut canvas, &foreground.to_rgba8(), 0);

    tracing::debug!(
        width = fg_width,
        height = fg_height,
        scaled_width,
        offset_x,
        "Composite rendered"
    );
    DynamicImage::ImageRgba8(canvas)
}

/// Source-over `top` onto `canvas`, shifted horizontally and clipped
fn layer(canvas: &mut RgbaImage, top: &RgbaImage, offset_x: i64) {
    let (width, height) = canvas.dimensions();
    for (x, y, pixel) in top.enumerate_pixels() {
        let cx = i64::from(x) + offset_x;
        if cx < 0 || cx >= i64::from(width) || y >= height {
            continue;
        }
        let target = canvas.get_pixel_mut(cx as u32, y);
        match pixel[3] {
            0 => {}
            u8::MAX => *target = *pixel,
            _ => target.blend(pixel),
        }
    }
}
