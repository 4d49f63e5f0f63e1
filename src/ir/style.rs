//! Drawing style carried by each shape.
//!
//! The canvas reads these values when painting; nothing in the codecs looks at
//! them. A style is owned per shape, so a pending outline can be drawn in a
//! different color without touching any other shape.

/// An 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b, 255)
    }
}

/// How vertices are marked on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointType {
    Square,
    #[default]
    Round,
}

/// Colors and sizes used to paint one shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeStyle {
    pub line_color: Rgba,
    pub fill_color: Rgba,
    pub select_line_color: Rgba,
    pub select_fill_color: Rgba,
    pub vertex_fill_color: Rgba,
    pub hvertex_fill_color: Rgba,
    pub point_type: PointType,
    pub point_size: f64,
    pub scale: f64,
}

impl ShapeStyle {
    /// Same style with a different outline color (used for the pending line).
    pub fn with_line_color(mut self, color: Rgba) -> Self {
        self.line_color = color;
        self
    }

    /// Vertex marker diameter at the current zoom.
    pub fn vertex_diameter(&self) -> f64 {
        self.point_size / self.scale
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            line_color: Rgba(0, 255, 0, 128),
            fill_color: Rgba(255, 0, 0, 128),
            select_line_color: Rgba::opaque(255, 255, 255),
            select_fill_color: Rgba(0, 128, 255, 155),
            vertex_fill_color: Rgba::opaque(0, 255, 0),
            hvertex_fill_color: Rgba::opaque(255, 0, 0),
            point_type: PointType::Round,
            point_size: 6.0,
            scale: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_leaves_other_fields_alone() {
        let base = ShapeStyle::default();
        let pending = base.with_line_color(Rgba::opaque(0, 0, 255));
        assert_eq!(pending.line_color, Rgba(0, 0, 255, 255));
        assert_eq!(pending.fill_color, base.fill_color);
        assert_eq!(pending.point_type, PointType::Round);
    }

    #[test]
    fn vertex_diameter_shrinks_when_zoomed_in() {
        let style = ShapeStyle {
            scale: 2.0,
            ..ShapeStyle::default()
        };
        assert_eq!(style.vertex_diameter(), 3.0);
    }
}
