mod sanitize;

pub use sanitize::{sanitize_color, sanitize_coordinate, sanitize_radius, DEFAULT_COLOR, DEFAULT_RADIUS};

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::map::GridPoint;

/// Dot shape. Unknown names fall back to `Circle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Shape {
    #[default]
    Circle,
    Hexagon,
}

impl From<&str> for Shape {
    fn from(name: &str) -> Self {
        match name {
            "hexagon" => Shape::Hexagon,
            _ => Shape::Circle,
        }
    }
}

impl From<String> for Shape {
    fn from(name: String) -> Self {
        Shape::from(name.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SvgSettings {
    pub shape: Shape,
    pub color: String,
    pub background_color: String,
    pub radius: f64,
}

impl Default for SvgSettings {
    fn default() -> Self {
        Self {
            shape: Shape::Circle,
            color: "currentColor".to_string(),
            background_color: "transparent".to_string(),
            radius: DEFAULT_RADIUS,
        }
    }
}

/// Render points on a `width x height` canvas, one element per point in the
/// given order.
pub fn render(width: u32, height: u32, points: &[GridPoint], settings: &SvgSettings) -> String {
    let color = sanitize_color(&settings.color);
    let background = sanitize_color(&settings.background_color);
    let radius = sanitize_radius(settings.radius);

    let mut svg = String::with_capacity(128 + points.len() * 64);
    let _ = writeln!(
        svg,
        r#"<svg viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg" style="background-color: {background}">"#
    );
    for point in points {
        write_point(&mut svg, point, settings.shape, &color, radius);
        svg.push('\n');
    }
    svg.push_str("</svg>");
    svg
}

fn write_point(out: &mut String, point: &GridPoint, shape: Shape, color: &str, radius: f64) {
    let x = sanitize_coordinate(point.x);
    let y = sanitize_coordinate(point.y);
    let options = point.svg_options.as_ref();

    // a zero override means "no override"
    let r = sanitize_radius(
        options
            .and_then(|o| o.radius)
            .filter(|r| *r != 0.0)
            .unwrap_or(radius),
    );
    let fill = match options.and_then(|o| o.color.as_deref()) {
        Some(c) if !c.is_empty() => sanitize_color(c),
        _ => color.to_string(),
    };

    match shape {
        Shape::Circle => {
            let _ = write!(out, r#"<circle cx="{x}" cy="{y}" r="{r}" fill="{fill}" />"#);
        }
        Shape::Hexagon => {
            let sqrt3r = 3f64.sqrt() * r;
            let corners = [
                (x + sqrt3r, y - r),
                (x + sqrt3r, y + r),
                (x, y + 2.0 * r),
                (x - sqrt3r, y + r),
                (x - sqrt3r, y - r),
                (x, y - 2.0 * r),
            ];
            let corners: Vec<String> = corners.iter().map(|(cx, cy)| format!("{cx},{cy}")).collect();
            let _ = write!(
                out,
                r#"<polygon points="{}" fill="{fill}" />"#,
                corners.join(" ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::SvgOptions;

    fn points() -> Vec<GridPoint> {
        vec![GridPoint::new(1.0, 2.0), GridPoint::new(3.5, 0.8660254037844386)]
    }

    #[test]
    fn test_circles() {
        let svg = render(10, 5, &points(), &SvgSettings::default());
        assert!(svg.starts_with(r#"<svg viewBox="0 0 10 5""#));
        assert!(svg.contains(r#"<circle cx="1" cy="2" r="0.5" fill="currentColor" />"#));
        assert!(svg.contains(r#"cx="3.5" cy="0.8660254037844386""#));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_hexagons() {
        let settings = SvgSettings {
            shape: Shape::Hexagon,
            radius: 1.0,
            ..Default::default()
        };
        let svg = render(10, 5, &points()[..1], &settings);
        assert!(svg.contains("<polygon points="));
        assert!(svg.contains("1,4 "));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn test_unknown_shape_is_circle() {
        let settings: SvgSettings = serde_json::from_str(r#"{"shape": "star"}"#).unwrap();
        assert_eq!(settings.shape, Shape::Circle);
        let settings: SvgSettings = serde_json::from_str(r#"{"shape": "hexagon"}"#).unwrap();
        assert_eq!(settings.shape, Shape::Hexagon);
    }

    #[test]
    fn test_point_overrides() {
        let mut pin = GridPoint::new(4.0, 4.0);
        pin.svg_options = Some(SvgOptions {
            color: Some("#ff0000".into()),
            radius: Some(2.0),
        });
        let svg = render(10, 10, &[pin], &SvgSettings::default());
        assert!(svg.contains(r##"r="2" fill="#ff0000""##));
    }

    #[test]
    fn test_invalid_override_radius_falls_back() {
        let mut pin = GridPoint::new(4.0, 4.0);
        pin.svg_options = Some(SvgOptions {
            color: None,
            radius: Some(f64::NAN),
        });
        let svg = render(10, 10, &[pin], &SvgSettings::default());
        assert!(svg.contains(r#"r="0.5""#));
    }

    #[test]
    fn test_hostile_colors_are_replaced() {
        let mut pin = GridPoint::new(1.0, 1.0);
        pin.svg_options = Some(SvgOptions {
            color: Some("javascript:alert(1)".into()),
            radius: None,
        });
        let settings = SvgSettings {
            color: "<script>alert(1)</script>".into(),
            background_color: r#"red"><script>"#.into(),
            ..Default::default()
        };
        let svg = render(10, 10, &[pin, GridPoint::new(2.0, 2.0)], &settings);
        assert!(!svg.contains("<script"));
        assert!(!svg.contains("javascript:"));
        assert!(!svg.contains("alert"));
        assert_eq!(svg.matches(DEFAULT_COLOR).count(), 3);
    }

    #[test]
    fn test_non_finite_coordinates() {
        let svg = render(10, 10, &[GridPoint::new(f64::NAN, 3.0)], &SvgSettings::default());
        assert!(svg.contains(r#"cx="0" cy="3""#));
    }
}
