//! Figure [`Style`]: colours, sizes and tree options, loadable from JSON.

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// An opaque RGB colour, written as `#RRGGBB`.
///
/// ```rust
/// use maptree::plot::style::Color;
///
/// let red: Color = "#FF0000".parse()?;
/// assert_eq!(red, Color { r: 255, g: 0, b: 0 });
/// assert_eq!(red.to_string(), "#FF0000");
/// assert!("red".parse::<Color>().is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[rustfmt::skip]
impl Color { pub const fn new(r: u8, g: u8, b: u8) -> Self { Color { r, g, b } } }
#[rustfmt::skip]
impl Display for Color { fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b) } }
#[rustfmt::skip]
impl From<Color> for String { fn from(color: Color) -> Self { color.to_string() } }
#[rustfmt::skip]
impl TryFrom<String> for Color { type Error = Report; fn try_from(s: String) -> Result<Self, Report> { s.parse() } }

impl FromStr for Color {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self, Report> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| eyre!("Invalid colour {s:?}").suggestion("Colours are written as #RRGGBB."))?;
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
        Ok(Color { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }
}

/// Colours, sizes and tree options of the figure.
///
/// Defaults reproduce the classic map tree: red circles for present families,
/// light grey for absent ones.
///
/// ```rust
/// use maptree::plot::Style;
///
/// let style: Style = serde_json::from_str(r##"{"present_color": "#0000FF", "ladderize": false}"##)?;
/// assert_eq!(style.present_color.to_string(), "#0000FF");
/// assert_eq!(style.absent_color.to_string(), "#EEEEEE");
/// assert!(!style.ladderize);
/// assert!(serde_json::from_str::<Style>(r##"{"present_colour": "#0000FF"}"##).is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Style {
    /// Fill of a present cell.
    pub present_color: Color,
    /// Fill of an absent cell.
    pub absent_color: Color,
    /// Tree branches and scale bar.
    pub line_color: Color,
    /// Labels and headers.
    pub text_color: Color,
    pub background: Color,
    /// Width of tree branches in pixels.
    pub line_width: f32,
    /// Radius of a cell circle in pixels.
    pub cell_radius: f32,
    /// Space between cell circles in pixels.
    pub cell_margin: f32,
    /// Integer scale of the 5x8 pixel font for leaf labels.
    pub leaf_font_scale: u32,
    /// Integer scale of the 5x8 pixel font for family headers.
    pub header_font_scale: u32,
    /// Width of the tree from root to the deepest leaf in pixels.
    pub tree_width: f32,
    /// Blank border around the figure in pixels.
    pub margin: f32,
    /// Length of the scale bar in branch length units, [`None`] to hide it.
    pub scale_length: Option<f32>,
    /// Order clades by size, largest first, after rerooting.
    pub ladderize: bool,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            present_color: Color::new(0xFF, 0x00, 0x00),
            absent_color: Color::new(0xEE, 0xEE, 0xEE),
            line_color: Color::new(0x00, 0x00, 0x00),
            text_color: Color::new(0x00, 0x00, 0x00),
            background: Color::new(0xFF, 0xFF, 0xFF),
            line_width: 2.0,
            cell_radius: 8.0,
            cell_margin: 3.0,
            leaf_font_scale: 2,
            header_font_scale: 2,
            tree_width: 400.0,
            margin: 20.0,
            scale_length: Some(0.1),
            ladderize: true,
        }
    }
}

impl Style {
    /// Read a style from a JSON file and validate it.
    pub fn read<P>(path: &P) -> Result<Style, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read style: {path:?}"))?;
        let style: Style = serde_json::from_str(&text)
            .wrap_err_with(|| format!("Failed to parse style: {path:?}"))?;
        style.validate().wrap_err_with(|| format!("Invalid style: {path:?}"))?;
        debug!("Style: {}", serde_json::to_string(&style)?);
        Ok(style)
    }

    /// Check that sizes are usable for drawing.
    ///
    /// ```rust
    /// use maptree::plot::Style;
    ///
    /// assert!(Style::default().validate().is_ok());
    /// let style = Style { cell_radius: 0.0, ..Default::default() };
    /// assert!(style.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), Report> {
        let positive = [
            ("line_width", self.line_width),
            ("cell_radius", self.cell_radius),
            ("tree_width", self.tree_width),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(eyre!("Style {name} must be a positive number, found {value}"));
            }
        }
        for (name, value) in [("cell_margin", self.cell_margin), ("margin", self.margin)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(eyre!("Style {name} must not be negative, found {value}"));
            }
        }
        for (name, value) in [("leaf_font_scale", self.leaf_font_scale), ("header_font_scale", self.header_font_scale)] {
            if !(1..=16).contains(&value) {
                return Err(eyre!("Style {name} must be between 1 and 16, found {value}"));
            }
        }
        if let Some(length) = self.scale_length {
            if !(length.is_finite() && length > 0.0) {
                return Err(eyre!("Style scale_length must be positive, found {length}"))
                    .suggestion("Use null to hide the scale bar.");
            }
        }
        Ok(())
    }

    /// Distance between the centres of neighbouring cells.
    pub fn cell_size(&self) -> f32 {
        2.0 * self.cell_radius + self.cell_margin
    }
}
