//! Render a [`Scene`] to pixels with `raqote`, and encode it as PNG or JPEG.

use crate::plot::font;
use crate::plot::scene::{Scene, Shape, Text};
use crate::plot::style::Color;
use crate::utils;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use raqote::{DrawOptions, DrawTarget, LineCap, PathBuilder, SolidSource, Source, StrokeStyle};
use std::f32::consts::PI;
use std::fmt::Debug;
use std::path::Path;

/// JPEG quality, 1-100.
const JPEG_QUALITY: u8 = 90;

fn solid(color: Color) -> SolidSource {
    SolidSource::from_unpremultiplied_argb(0xff, color.r, color.g, color.b)
}

/// Draw the scene onto a new draw target.
pub fn render(scene: &Scene) -> Result<DrawTarget, Report> {
    let (width, height) = scene.pixel_size();
    let (width, height) = (
        i32::try_from(width).wrap_err("Image is too wide.")?,
        i32::try_from(height).wrap_err("Image is too tall.")?,
    );
    let mut dt = DrawTarget::new(width, height);
    dt.clear(solid(scene.background));
    let options = DrawOptions::new();

    for shape in &scene.shapes {
        match shape {
            Shape::Line { from, to, width, color } => {
                let mut pb = PathBuilder::new();
                pb.move_to(from.0, from.1);
                pb.line_to(to.0, to.1);
                let path = pb.finish();
                let stroke = StrokeStyle { width: *width, cap: LineCap::Square, ..Default::default() };
                dt.stroke(&path, &Source::Solid(solid(*color)), &stroke, &options);
            }
            Shape::Circle { center, radius, fill } => {
                let mut pb = PathBuilder::new();
                pb.arc(center.0, center.1, *radius, 0.0, 2.0 * PI);
                pb.close();
                let path = pb.finish();
                dt.fill(&path, &Source::Solid(solid(*fill)), &options);
            }
            Shape::Text(text) => draw_text(&mut dt, text, &options),
        }
    }

    Ok(dt)
}

/// Draw text with the bitmap font, one square per font pixel.
fn draw_text(dt: &mut DrawTarget, text: &Text, options: &DrawOptions) {
    let source = Source::Solid(solid(text.color));
    let scale = text.scale as f32;
    let (x, y) = text.position;

    for (i, c) in text.text.chars().enumerate() {
        let advance = (i as u32 * font::ADVANCE) as f32;
        for (column, row) in font::pixels(c) {
            // italic leans the top rows right
            let shear = match text.italic {
                true => ((font::HEIGHT - 1 - row) as f32 / 4.0).floor(),
                false => 0.0,
            };
            let along = (advance + column as f32 + shear) * scale;
            let across = row as f32 * scale;
            let (px, py) = match text.vertical {
                true => (x + across, y - along - scale),
                false => (x + along, y + across),
            };
            dt.fill_rect(px, py, scale, scale, &source, options);
        }
    }
}

/// Returns the draw target pixels as packed RGB bytes.
pub fn to_rgb(dt: &DrawTarget) -> Vec<u8> {
    dt.get_data()
        .iter()
        .flat_map(|argb| {
            let [_a, r, g, b] = argb.to_be_bytes();
            [r, g, b]
        })
        .collect()
}

/// Write the scene as a PNG image, replacing the output only once the image is complete.
pub fn write_png<P>(scene: &Scene, path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    let dt = render(scene)?;
    utils::create_parent_dir(path)?;
    let dir = match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file = tempfile::Builder::new()
        .prefix(".maptree")
        .suffix(".png")
        .tempfile_in(dir)
        .wrap_err_with(|| format!("Unable to create temporary file in: {dir:?}"))?;
    dt.write_png(file.path()).map_err(|e| eyre!("Failed to encode PNG {path:?}: {e:?}"))?;
    file.persist(path).wrap_err_with(|| format!("Failed to move image into place: {path:?}"))?;
    Ok(())
}

/// Write the scene as a JPEG image, replacing the output only once the image is complete.
pub fn write_jpeg<P>(scene: &Scene, path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    let dt = render(scene)?;
    let (width, height) = (dt.width() as u32, dt.height() as u32);
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode(&to_rgb(&dt), width, height, ColorType::Rgb8)
        .wrap_err_with(|| format!("Failed to encode JPEG: {path:?}"))?;
    utils::write_atomic(path, &bytes)
}
