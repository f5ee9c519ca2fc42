//! Region rasterisation.
//!
//! Regions are painted by classifying pixel centres, so a pixel is covered
//! iff `(x + 0.5, y + 0.5)` lies inside the region. Painting uses straight
//! alpha source-over compositing.

use crate::color::Color;
use image::{Rgba, RgbaImage};
use umbra_core::math::{Rect, Vec2};
use umbra_core::profiling::profile_function;
use umbra_geometry::Region;

/// Composite `src` over `dst`.
pub fn blend(dst: &mut Rgba<u8>, src: Color) {
    let sa = src.a.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }

    let [dr, dg, db, da] = dst.0.map(|c| c as f32 / 255.0);
    let out_a = sa + da * (1.0 - sa);
    let mix = |s: f32, d: f32| (s * sa + d * da * (1.0 - sa)) / out_a;
    *dst = Rgba(
        Color::rgba(mix(src.r, dr), mix(src.g, dg), mix(src.b, db), out_a).to_rgba_u8(),
    );
}

/// Paint every pixel covered by `region` with `color`.
pub fn fill_region<R: Region + ?Sized>(image: &mut RgbaImage, region: &R, color: Color) {
    fill_region_with(image, region, |_| color);
}

/// Paint every pixel covered by `region` with the color `paint` returns for
/// its centre.
pub fn fill_region_with<R, F>(image: &mut RgbaImage, region: &R, paint: F)
where
    R: Region + ?Sized,
    F: Fn(Vec2) -> Color,
{
    profile_function!();
    let Some((x0, y0, x1, y1)) = region.bounds().and_then(|b| pixel_span(image, b)) else {
        return;
    };

    for y in y0..y1 {
        for x in x0..x1 {
            let centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if region.contains(centre) {
                blend(image.get_pixel_mut(x, y), paint(centre));
            }
        }
    }
}

/// Pixel range `[x0, x1) × [y0, y1)` of `bounds` clipped to the image.
fn pixel_span(image: &RgbaImage, bounds: Rect) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = image.dimensions();
    let x0 = bounds.x.floor().max(0.0) as u32;
    let y0 = bounds.y.floor().max(0.0) as u32;
    let x1 = (bounds.right().ceil().max(0.0) as u32).min(width);
    let y1 = (bounds.bottom().ceil().max(0.0) as u32).min(height);
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_geometry::Shape;

    #[test]
    fn test_blend_over_transparent_keeps_source() {
        let mut px = Rgba([0, 0, 0, 0]);
        blend(&mut px, Color::from_rgba_u8(255, 0, 0, 128));
        assert_eq!(px, Rgba([255, 0, 0, 128]));
    }

    #[test]
    fn test_blend_opaque_source_replaces() {
        let mut px = Rgba([10, 20, 30, 255]);
        blend(&mut px, Color::WHITE);
        assert_eq!(px, Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_fill_samples_pixel_centres() {
        let mut image = RgbaImage::new(10, 10);
        let shape = Shape::rect_from(Rect::new(2.0, 2.0, 3.0, 3.0));
        fill_region(&mut image, &shape, Color::BLACK);

        assert_eq!(image.get_pixel(2, 2)[3], 255);
        assert_eq!(image.get_pixel(4, 4)[3], 255);
        assert_eq!(image.get_pixel(5, 5)[3], 0);
        assert_eq!(image.get_pixel(1, 2)[3], 0);
    }

    #[test]
    fn test_fill_clips_to_image() {
        let mut image = RgbaImage::new(4, 4);
        let shape = Shape::rect_from(Rect::new(-10.0, -10.0, 100.0, 100.0));
        fill_region(&mut image, &shape, Color::BLACK);
        assert!(image.pixels().all(|p| p[3] == 255));
    }
}
