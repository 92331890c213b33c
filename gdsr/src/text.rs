//!
//! # Text Labels
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::bbox::BoundBox;
use crate::element::{validate_layer, ElementTrait};
use crate::error::{LayoutError, LayoutResult};
use crate::point::Point;

/// # Vertical Text Justification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalPresentation {
    Top,
    Middle,
    Bottom,
}
impl VerticalPresentation {
    /// GDSII presentation-bits value
    pub fn code(&self) -> u8 {
        match self {
            Self::Top => 0,
            Self::Middle => 1,
            Self::Bottom => 2,
        }
    }
    /// Create from GDSII presentation-bits value
    pub fn from_code(code: u8) -> LayoutResult<Self> {
        match code {
            0 => Ok(Self::Top),
            1 => Ok(Self::Middle),
            2 => Ok(Self::Bottom),
            _ => LayoutError::invalid(format!("Invalid vertical presentation {}", code)),
        }
    }
}
impl Default for VerticalPresentation {
    fn default() -> Self {
        Self::Middle
    }
}

/// # Horizontal Text Justification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HorizontalPresentation {
    Left,
    Centre,
    Right,
}
impl HorizontalPresentation {
    /// GDSII presentation-bits value
    pub fn code(&self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Centre => 1,
            Self::Right => 2,
        }
    }
    /// Create from GDSII presentation-bits value
    pub fn from_code(code: u8) -> LayoutResult<Self> {
        match code {
            0 => Ok(Self::Left),
            1 => Ok(Self::Centre),
            2 => Ok(Self::Right),
            _ => LayoutError::invalid(format!("Invalid horizontal presentation {}", code)),
        }
    }
}
impl Default for HorizontalPresentation {
    fn default() -> Self {
        Self::Centre
    }
}

/// Combined presentation code, `vertical * 4 + horizontal`
pub fn presentation_code(v: VerticalPresentation, h: HorizontalPresentation) -> u8 {
    v.code() * 4 + h.code()
}
/// Split a combined presentation code. Fails for codes with either half out of range, e.g. 3.
pub fn from_presentation_code(
    code: u8,
) -> LayoutResult<(VerticalPresentation, HorizontalPresentation)> {
    if code > 10 {
        return LayoutError::invalid(format!("Invalid presentation code {}", code));
    }
    Ok((
        VerticalPresentation::from_code(code / 4)?,
        HorizontalPresentation::from_code(code % 4)?,
    ))
}

/// # Text Label
///
/// A string placed at `origin`. Text has no area:
/// its bounding box is its origin alone.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    text: String,
    origin: Point,
    layer: u8,
    magnification: f64,
    angle: f64,
    x_reflection: bool,
    vertical_presentation: VerticalPresentation,
    horizontal_presentation: HorizontalPresentation,
}
impl Text {
    /// Create a new [Text], with unit magnification, no rotation or reflection,
    /// and middle-centre presentation. Fails for an out-of-range layer.
    pub fn new(text: impl Into<String>, origin: impl Into<Point>, layer: i32) -> LayoutResult<Self> {
        Ok(Self {
            text: text.into(),
            origin: origin.into(),
            layer: validate_layer(layer)?,
            magnification: 1.,
            angle: 0.,
            x_reflection: false,
            vertical_presentation: VerticalPresentation::default(),
            horizontal_presentation: HorizontalPresentation::default(),
        })
    }
    /// Set magnification, rotation angle (degrees), and x-reflection
    pub fn with_transform(mut self, magnification: f64, angle: f64, x_reflection: bool) -> Self {
        self.magnification = magnification;
        self.angle = angle;
        self.x_reflection = x_reflection;
        self
    }
    /// Set the presentation
    pub fn with_presentation(
        mut self,
        vertical: VerticalPresentation,
        horizontal: HorizontalPresentation,
    ) -> Self {
        self.vertical_presentation = vertical;
        self.horizontal_presentation = horizontal;
        self
    }
    /// The string content
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn origin(&self) -> Point {
        self.origin
    }
    pub fn layer(&self) -> u8 {
        self.layer
    }
    pub fn magnification(&self) -> f64 {
        self.magnification
    }
    /// Rotation, in degrees counter-clockwise
    pub fn angle(&self) -> f64 {
        self.angle
    }
    pub fn x_reflection(&self) -> bool {
        self.x_reflection
    }
    pub fn vertical_presentation(&self) -> VerticalPresentation {
        self.vertical_presentation
    }
    pub fn horizontal_presentation(&self) -> HorizontalPresentation {
        self.horizontal_presentation
    }
    /// Combined presentation code
    pub fn presentation_code(&self) -> u8 {
        presentation_code(self.vertical_presentation, self.horizontal_presentation)
    }
    /// Set the string content
    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = text.into();
        self
    }
    /// Set the layer number. Fails if out of range.
    pub fn set_layer(&mut self, layer: i32) -> LayoutResult<&mut Self> {
        self.layer = validate_layer(layer)?;
        Ok(self)
    }
    /// Set the presentation from a combined code. Fails for invalid codes.
    pub fn set_presentation_code(&mut self, code: u8) -> LayoutResult<&mut Self> {
        let (v, h) = from_presentation_code(code)?;
        self.vertical_presentation = v;
        self.horizontal_presentation = h;
        Ok(self)
    }
}
impl ElementTrait for Text {
    fn bounding_box(&self) -> BoundBox {
        BoundBox::from_point(self.origin)
    }
    fn anchor(&self) -> Point {
        self.origin
    }
    fn translate(&mut self, delta: Point) {
        self.origin += delta;
    }
    fn rotate_about(&mut self, angle: f64, centre: Point) {
        self.origin = self.origin.rotate(angle, centre);
        self.angle += angle;
    }
    fn scale_about(&mut self, factor: f64, centre: Point) {
        self.origin = self.origin.scale(factor, centre);
        self.magnification *= factor;
    }
    fn reflect_x(&mut self) {
        self.origin = self.origin.reflect_x();
        self.angle = -self.angle;
        self.x_reflection = !self.x_reflection;
    }
}
impl std::fmt::Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Text \"{}\" at {} on layer {}",
            self.text, self.origin, self.layer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Movable;

    #[test]
    fn presentations() -> LayoutResult<()> {
        let mut codes = Vec::new();
        for v in [
            VerticalPresentation::Top,
            VerticalPresentation::Middle,
            VerticalPresentation::Bottom,
        ] {
            for h in [
                HorizontalPresentation::Left,
                HorizontalPresentation::Centre,
                HorizontalPresentation::Right,
            ] {
                let code = presentation_code(v, h);
                assert_eq!(from_presentation_code(code)?, (v, h));
                codes.push(code);
            }
        }
        assert_eq!(codes, vec![0, 1, 2, 4, 5, 6, 8, 9, 10]);
        for bad in [3, 7, 11, 12, 255] {
            assert!(from_presentation_code(bad).is_err());
        }
        Ok(())
    }
    #[test]
    fn defaults() -> LayoutResult<()> {
        let text = Text::new("label", (1., 2.), 4)?;
        assert_eq!(text.magnification(), 1.);
        assert_eq!(text.angle(), 0.);
        assert!(!text.x_reflection());
        assert_eq!(text.presentation_code(), 5);
        assert!(Text::new("label", (1., 2.), 256).is_err());
        Ok(())
    }
    #[test]
    fn transforms() -> LayoutResult<()> {
        let mut text = Text::new("label", (1., 0.), 0)?;
        text.rotate(90., Point::origin()).scale(2., Point::origin());
        assert!(text.origin().is_close(&Point::new(0., 2.)));
        assert_eq!(text.angle(), 90.);
        assert_eq!(text.magnification(), 2.);
        text.reflect_x();
        assert!(text.x_reflection());
        assert_eq!(text.angle(), -90.);
        assert!(text.origin().is_close(&Point::new(0., -2.)));
        text.move_to((5., 5.));
        assert_eq!(text.bounding_box().p0, Point::new(5., 5.));
        assert!(text.set_presentation_code(3).is_err());
        Ok(())
    }
}
