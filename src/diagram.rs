//! Row Spacing Diagram Renderer
//!
//! Draws two panel rows separated by the computed spacing, the ground line,
//! the limiting noon sun ray and the `dmin`/`drec` distance annotations.
//! The scene is written as SVG and rasterised to PNG with resvg.

use std::sync::{Arc, OnceLock};

use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use resvg::tiny_skia;
use resvg::usvg::{Options, Tree, fontdb};

use crate::error::Result;
use crate::spacing::CalculationResult;

// ===================== STYLE =====================

const CANVAS_SIZE: u32 = 800;
/// Band at the top of the canvas reserved for the parameter box (px)
const INFO_BAND: f64 = 120.0;
const PADDING: f64 = 24.0;

const BACKGROUND: &str = "#0e1117";
const GROUND_COLOR: &str = "#9aa0a6";
const FRONT_ROW_COLOR: &str = "#67c1d3";
const BACK_ROW_COLOR: &str = "#26a484";
const SUN_RAY_COLOR: &str = "#f5a623";
const DMIN_COLOR: &str = "#ece75b";
const DREC_COLOR: &str = "#ff6f61";
const TEXT_COLOR: &str = "#fafafa";
const PANEL_BOX_COLOR: &str = "#393e46";

const ROW_STROKE: f64 = 6.0;
const ARROW_HEAD: f64 = 10.0;

// ===================== LAYOUT (fractions of the scene size) =====================

/// Margin added around the scene on every side
const VIEW_MARGIN: f64 = 0.08;
/// Ground line overhang past the outermost rows
const GROUND_OVERHANG: f64 = 0.06;
/// Depth of the `dmin` annotation below the ground
const DMIN_DEPTH: f64 = 0.14;
/// Depth of the `drec` annotation below the ground
const DREC_DEPTH: f64 = 0.30;
/// Room kept under the `drec` annotation for its label
const LABEL_ROOM: f64 = 0.10;

// ===================== GEOMETRY =====================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    fn translated(&self, dx: f64) -> Self {
        Self::new(Point::new(self.start.x + dx, self.start.y), Point::new(self.end.x + dx, self.end.y))
    }

    fn length(&self) -> f64 {
        (self.end.x - self.start.x).hypot(self.end.y - self.start.y)
    }
}

/// World-space extent of the scene (meters)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[cfg(test)]
    fn contains(&self, p: Point) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_y..=self.max_y).contains(&p.y)
    }
}

/// Scene geometry in meters, y pointing up, row 1 anchored at the origin
#[derive(Debug, Clone, Copy)]
pub struct DiagramGeometry {
    pub front_row: Segment,
    pub back_row: Segment,
    pub ground: Segment,
    /// Noon ray grazing the top of row 1; `None` when it has no length (flat panels)
    pub sun_ray: Option<Segment>,
    pub dmin: Segment,
    pub drec: Segment,
    pub bounds: Bounds,
}

impl DiagramGeometry {
    pub fn new(
        tilt: f64,
        length: f64,
        min_spacing: f64,
        recommended_spacing: f64,
    ) -> anyhow::Result<Self> {
        if ![tilt, length, min_spacing, recommended_spacing].iter().all(|v| v.is_finite()) {
            bail!("diagram inputs must be finite");
        }
        if length <= 0.0 {
            bail!("panel length must be positive, got {}", length);
        }

        let t = tilt.to_radians();
        let top = Point::new(length * t.cos(), length * t.sin());
        let front_row = Segment::new(Point::new(0.0, 0.0), top);
        let back_row = front_row.translated(min_spacing);

        // Scene size; keeps annotations proportional for any panel length
        let size = length.max(min_spacing.abs()).max(recommended_spacing.abs());

        let xs = [0.0, top.x, back_row.start.x, back_row.end.x, recommended_spacing];
        let left = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let right = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let overhang = GROUND_OVERHANG * size;
        let ground = Segment::new(Point::new(left - overhang, 0.0), Point::new(right + overhang, 0.0));

        let sun_ray = Segment::new(top, back_row.start);
        let sun_ray = (sun_ray.length() > 1e-9 * size).then_some(sun_ray);

        let dmin_y = -DMIN_DEPTH * size;
        let drec_y = -DREC_DEPTH * size;
        let dmin = Segment::new(Point::new(0.0, dmin_y), Point::new(min_spacing, dmin_y));
        let drec = Segment::new(Point::new(0.0, drec_y), Point::new(recommended_spacing, drec_y));

        let raw = Bounds {
            min_x: ground.start.x,
            max_x: ground.end.x,
            min_y: drec_y - LABEL_ROOM * size,
            max_y: top.y.max(0.0),
        };
        let margin = VIEW_MARGIN * raw.width().max(raw.height());
        let bounds = Bounds {
            min_x: raw.min_x - margin,
            max_x: raw.max_x + margin,
            min_y: raw.min_y - margin,
            max_y: raw.max_y + margin,
        };
        if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
            bail!("degenerate diagram bounds {:?}", bounds);
        }

        Ok(Self { front_row, back_row, ground, sun_ray, dmin, drec, bounds })
    }
}

// ===================== WORLD -> PIXEL =====================

/// Uniform-scale mapping of world meters onto the plot area below the info band
#[derive(Debug, Clone, Copy)]
struct Viewport {
    scale: f64,
    origin_x: f64,
    origin_y: f64,
    bounds: Bounds,
}

impl Viewport {
    fn fit(bounds: Bounds) -> anyhow::Result<Self> {
        let plot_w = CANVAS_SIZE as f64 - 2.0 * PADDING;
        let plot_h = CANVAS_SIZE as f64 - INFO_BAND - 2.0 * PADDING;
        let scale = (plot_w / bounds.width()).min(plot_h / bounds.height());
        if !scale.is_finite() || scale <= 0.0 {
            bail!("cannot fit diagram bounds {:?}", bounds);
        }
        // Center the scene inside the plot area
        let origin_x = PADDING + (plot_w - bounds.width() * scale) / 2.0;
        let origin_y = INFO_BAND + PADDING + (plot_h - bounds.height() * scale) / 2.0;
        Ok(Self { scale, origin_x, origin_y, bounds })
    }

    fn px(&self, p: Point) -> (f64, f64) {
        (
            self.origin_x + (p.x - self.bounds.min_x) * self.scale,
            self.origin_y + (self.bounds.max_y - p.y) * self.scale,
        )
    }
}

// ===================== SVG =====================

fn line(view: &Viewport, seg: Segment, color: &str, width: f64, extra: &str) -> String {
    let (x1, y1) = view.px(seg.start);
    let (x2, y2) = view.px(seg.end);
    format!(
        r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}" stroke-linecap="round"{}/>"#,
        x1, y1, x2, y2, color, width, extra
    )
}

/// Horizontal double-headed arrow with a centered label underneath
fn dimension(view: &Viewport, seg: Segment, color: &str, label: &str) -> String {
    let (x1, y) = view.px(seg.start);
    let (x2, _) = view.px(seg.end);
    let dir = if x2 >= x1 { 1.0 } else { -1.0 };
    let h = ARROW_HEAD;

    let mut out = format!(
        r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="2"/>"#,
        x1, y, x2, y, color
    );
    // Heads point outward at both ends
    for (tip, back) in [(x1, x1 + dir * h), (x2, x2 - dir * h)] {
        out.push_str(&format!(
            r#"<polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{}"/>"#,
            tip,
            y,
            back,
            y - h / 2.0,
            back,
            y + h / 2.0,
            color
        ));
    }
    // Short ticks marking where the distance is measured from/to
    for x in [x1, x2] {
        out.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1"/>"#,
            x,
            y - h,
            x,
            y + h,
            color
        ));
    }
    out.push_str(&format!(
        r#"<text x="{:.2}" y="{:.2}" fill="{}" font-size="18" text-anchor="middle">{}</text>"#,
        (x1 + x2) / 2.0,
        y + 26.0,
        color,
        label
    ));
    out
}

fn info_box(latitude: f64, tilt: f64, length: f64) -> String {
    let lines = [
        "Input parameters".to_string(),
        format!("Latitude: {:.3}°", latitude),
        format!("Tilt: {:.3}°", tilt),
        format!("Length: {:.3} m", length),
    ];
    let mut out = format!(
        r#"<rect x="{}" y="{}" width="230" height="{}" rx="8" fill="{}" stroke="{}" stroke-width="1"/>"#,
        PADDING,
        PADDING / 2.0,
        INFO_BAND - PADDING,
        PANEL_BOX_COLOR,
        GROUND_COLOR
    );
    for (i, text) in lines.iter().enumerate() {
        let weight = if i == 0 { "bold" } else { "normal" };
        out.push_str(&format!(
            r#"<text x="{}" y="{}" fill="{}" font-size="16" font-weight="{}">{}</text>"#,
            PADDING + 12.0,
            PADDING / 2.0 + 24.0 + i as f64 * 22.0,
            TEXT_COLOR,
            weight,
            text
        ));
    }
    out
}

/// Build the SVG document for a diagram.
pub fn diagram_svg(
    geometry: &DiagramGeometry,
    latitude: f64,
    tilt: f64,
    length: f64,
    min_spacing: f64,
    recommended_spacing: f64,
) -> anyhow::Result<String> {
    let view = Viewport::fit(geometry.bounds)?;
    let mut body = String::new();

    body.push_str(&line(&view, geometry.ground, GROUND_COLOR, 2.0, ""));
    if let Some(ray) = geometry.sun_ray {
        body.push_str(&line(&view, ray, SUN_RAY_COLOR, 1.5, r#" stroke-dasharray="8 6""#));
    }
    body.push_str(&line(&view, geometry.front_row, FRONT_ROW_COLOR, ROW_STROKE, ""));
    body.push_str(&line(&view, geometry.back_row, BACK_ROW_COLOR, ROW_STROKE, ""));

    for (seg, color, name) in
        [(geometry.front_row, FRONT_ROW_COLOR, "Row 1"), (geometry.back_row, BACK_ROW_COLOR, "Row 2")]
    {
        let (x, y) = view.px(seg.end);
        body.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" fill="{}" font-size="16" text-anchor="middle">{}</text>"#,
            x,
            y - 14.0,
            color,
            name
        ));
    }

    body.push_str(&dimension(&view, geometry.dmin, DMIN_COLOR, &format!("dmin = {:.3} m", min_spacing)));
    body.push_str(&dimension(
        &view,
        geometry.drec,
        DREC_COLOR,
        &format!("drec = {:.3} m", recommended_spacing),
    ));
    body.push_str(&info_box(latitude, tilt, length));

    Ok(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}" font-family="sans-serif">
<rect x="0" y="0" width="{size}" height="{size}" fill="{bg}"/>
{body}
</svg>
"#,
        size = CANVAS_SIZE,
        bg = BACKGROUND,
        body = body
    ))
}

// ===================== RASTERISATION =====================

// Loaded once, read-only afterwards; every render owns its own surface
static FONT_DB: OnceLock<Arc<fontdb::Database>> = OnceLock::new();

fn font_database() -> Arc<fontdb::Database> {
    FONT_DB
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            if db.is_empty() {
                tracing::warn!("No system fonts found, diagram labels will not be drawn");
            } else {
                tracing::debug!("Loaded {} font faces", db.len());
            }
            Arc::new(db)
        })
        .clone()
}

/// Rendered diagram, PNG encoded
#[derive(Debug, Clone)]
pub struct DiagramImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl DiagramImage {
    pub fn as_png(&self) -> &[u8] {
        &self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.png)
    }

    /// `data:` URI suitable for embedding in HTML or Markdown.
    pub fn to_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }
}

fn rasterize(svg: &str) -> anyhow::Result<DiagramImage> {
    let mut options = Options::default();
    options.fontdb = font_database();

    let tree = Tree::from_str(svg, &options).context("Failed to parse diagram SVG")?;
    let size = tree.size().to_int_size();

    let mut pixmap =
        tiny_skia::Pixmap::new(size.width(), size.height()).context("Failed to create pixmap")?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let png = pixmap.encode_png().context("Failed to encode PNG")?;
    Ok(DiagramImage { png, width: size.width(), height: size.height() })
}

fn build_diagram(
    tilt: f64,
    length: f64,
    min_spacing: f64,
    recommended_spacing: f64,
    latitude: f64,
) -> anyhow::Result<DiagramImage> {
    let geometry = DiagramGeometry::new(tilt, length, min_spacing, recommended_spacing)
        .context("Failed to lay out diagram")?;
    let svg = diagram_svg(&geometry, latitude, tilt, length, min_spacing, recommended_spacing)?;
    rasterize(&svg)
}

/// Render the two-row spacing diagram.
///
/// # Errors
/// Any failure while laying out or rasterising the figure is logged and
/// returned as [`crate::error::Error::RenderFailure`].
pub fn render_panel_diagram(
    tilt: f64,
    length: f64,
    min_spacing: f64,
    recommended_spacing: f64,
    latitude: f64,
) -> Result<DiagramImage> {
    match build_diagram(tilt, length, min_spacing, recommended_spacing, latitude) {
        Ok(image) => {
            tracing::debug!(
                width = image.width,
                height = image.height,
                bytes = image.png.len(),
                "Rendered spacing diagram"
            );
            Ok(image)
        }
        Err(e) => {
            tracing::error!("Diagram rendering failed: {:#}", e);
            Err(e.into())
        }
    }
}

/// Render the diagram for a validated calculation.
pub fn render_result(result: &CalculationResult) -> Result<DiagramImage> {
    render_panel_diagram(
        result.input.tilt,
        result.input.length,
        result.min_spacing,
        result.recommended_spacing,
        result.input.latitude,
    )
}

// ===================== TESTS =====================
