//! Backend independent drawing: a [`Scene`] of [`Shape`]s in pixel coordinates.

use crate::plot::style::Color;
use serde::{Deserialize, Serialize};

/// A point in pixels, origin at the top left, y pointing down.
pub type Point = (f32, f32);

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Shape {
    Line { from: Point, to: Point, width: f32, color: Color },
    Circle { center: Point, radius: f32, fill: Color },
    Text(Text),
}

/// A run of text in the 5x8 pixel font.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Text {
    /// Top left corner for horizontal text. For vertical text, the bottom left
    /// corner, with the text reading upwards.
    pub position: Point,
    pub text: String,
    /// Integer scale of the font.
    pub scale: u32,
    pub color: Color,
    pub italic: bool,
    pub vertical: bool,
}

/// Everything to draw, in drawing order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub background: Color,
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Scene { width: 0.0, height: 0.0, background, shapes: Vec::new() }
    }

    pub fn line(&mut self, from: Point, to: Point, width: f32, color: Color) {
        self.shapes.push(Shape::Line { from, to, width, color });
    }

    pub fn circle(&mut self, center: Point, radius: f32, fill: Color) {
        self.shapes.push(Shape::Circle { center, radius, fill });
    }

    pub fn text(&mut self, text: Text) {
        self.shapes.push(Shape::Text(text));
    }

    /// Image size in whole pixels, at least one pixel in each direction.
    pub fn pixel_size(&self) -> (u32, u32) {
        let size = |v: f32| (v.ceil() as u32).max(1);
        (size(self.width), size(self.height))
    }

    /// Circles in drawing order, handy to inspect the matrix part of a figure.
    pub fn circles(&self) -> impl Iterator<Item = (&Point, &Color)> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Circle { center, fill, .. } => Some((center, fill)),
            _ => None,
        })
    }

    /// Texts in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &Text> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Text(text) => Some(text),
            _ => None,
        })
    }
}
