use super::display::{Display, DisplaySelector, DisplaySet};
use shoji_ipc::{PlacementValue, WindowConfig, WindowGeometry};

const LEFT_MARGIN: i64 = 10;
const RIGHT_MARGIN: i64 = 12;
const BOTTOM_MARGIN: i64 = 10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlacementError {
    #[error("invalid display: {0}")]
    InvalidSelector(PlacementValue),
    #[error("invalid window size: {{ width: {width}, height: {height} }}")]
    InvalidSize {
        width: PlacementValue,
        height: PlacementValue,
    },
    #[error("invalid window coordinates: {{ x: {x}, y: {y} }}")]
    InvalidPosition { x: PlacementValue, y: PlacementValue },
    #[error("host reported no displays")]
    NoDisplays,
    #[error("none of the {0} displays is primary")]
    NoPrimaryDisplay(usize),
    #[error("{0} displays are marked primary")]
    MultiplePrimaryDisplays(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Full,
    Pixels(u32),
}

impl Dimension {
    fn parse(value: &PlacementValue) -> Option<Self> {
        if value.is_keyword("full") || value.is_keyword("fill") {
            return Some(Dimension::Full);
        }
        value
            .as_integer()
            .and_then(|n| u32::try_from(n).ok())
            .map(Dimension::Pixels)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRequest {
    pub width: Dimension,
    pub height: Dimension,
}

impl SizeRequest {
    pub fn parse(width: &PlacementValue, height: &PlacementValue) -> Result<Self, PlacementError> {
        match (Dimension::parse(width), Dimension::parse(height)) {
            (Some(width), Some(height)) => Ok(Self { width, height }),
            _ => Err(PlacementError::InvalidSize {
                width: width.clone(),
                height: height.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Center,
    Right,
    Offset(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Top,
    Center,
    Bottom,
    Offset(i64),
}

impl Horizontal {
    fn parse(value: &PlacementValue) -> Option<Self> {
        match value {
            PlacementValue::Text(s) if s == "left" => Some(Horizontal::Left),
            PlacementValue::Text(s) if s == "center" => Some(Horizontal::Center),
            PlacementValue::Text(s) if s == "right" => Some(Horizontal::Right),
            _ => value.as_integer().map(Horizontal::Offset),
        }
    }
}

impl Vertical {
    fn parse(value: &PlacementValue) -> Option<Self> {
        match value {
            PlacementValue::Text(s) if s == "top" => Some(Vertical::Top),
            PlacementValue::Text(s) if s == "center" => Some(Vertical::Center),
            PlacementValue::Text(s) if s == "bottom" => Some(Vertical::Bottom),
            _ => value.as_integer().map(Vertical::Offset),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRequest {
    pub x: Horizontal,
    pub y: Vertical,
}

impl PositionRequest {
    /// Both coordinates are checked before either is reported, so the error
    /// always names the pair.
    pub fn parse(x: &PlacementValue, y: &PlacementValue) -> Result<Self, PlacementError> {
        match (Horizontal::parse(x), Vertical::parse(y)) {
            (Some(x), Some(y)) => Ok(Self { x, y }),
            _ => Err(PlacementError::InvalidPosition {
                x: x.clone(),
                y: y.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Picks the target display. A single-display session always gets the
/// primary display once the selector itself is valid.
pub fn select_display<'a>(
    selector: &PlacementValue,
    displays: &'a DisplaySet,
) -> Result<&'a Display, PlacementError> {
    let selector = DisplaySelector::parse(selector)?;
    Ok(displays.select(selector))
}

/// Full dimensions take the work area, numeric ones pass through unclamped.
pub fn resolve_size(request: &SizeRequest, display: &Display) -> Size {
    let resolve = |dimension: Dimension, full: u32| match dimension {
        Dimension::Full => full,
        Dimension::Pixels(n) => n,
    };
    Size {
        width: resolve(request.width, display.work_area.width),
        height: resolve(request.height, display.work_area.height),
    }
}

/// Horizontal placement is measured against the display bounds, vertical
/// placement against the work area.
pub fn resolve_position(request: &PositionRequest, display: &Display, size: Size) -> Point {
    let bx = display.bounds.x as i64;
    let bw = display.bounds.width as i64;
    let w = size.width as i64;

    let x = match request.x {
        Horizontal::Left => bx + LEFT_MARGIN,
        Horizontal::Center => bx + bw / 2 - w / 2,
        Horizontal::Right => bx + (bw - RIGHT_MARGIN) - w,
        Horizontal::Offset(n) => bx + n.clamp(0, bw),
    };

    let wy = display.work_area.y as i64;
    let wh = display.work_area.height as i64;
    let h = size.height as i64;

    let y = match request.y {
        Vertical::Top => wy,
        Vertical::Center => wy + wh / 2 - h / 2,
        Vertical::Bottom => wy + (wh - BOTTOM_MARGIN - h),
        Vertical::Offset(n) => wy + n.clamp(0, wh),
    };

    Point {
        x: saturate(x),
        y: saturate(y),
    }
}

/// Runs the whole placement pipeline for one window.
///
/// Inputs are validated in the order display, size, position; the first
/// invalid group is reported and nothing is resolved past it.
pub fn resolve(config: &WindowConfig, displays: &DisplaySet) -> Result<WindowGeometry, PlacementError> {
    let target = select_display(&config.display, displays)?;
    let size_request = SizeRequest::parse(&config.width, &config.height)?;
    let position_request = PositionRequest::parse(&config.x, &config.y)?;

    let size = resolve_size(&size_request, target);
    let point = resolve_position(&position_request, target, size);

    tracing::debug!(
        "Placed window on display {} at ({}, {}) size {}x{}",
        target.id,
        point.x,
        point.y,
        size.width,
        size.height
    );

    Ok(WindowGeometry {
        x: point.x,
        y: point.y,
        width: size.width,
        height: size.height,
    })
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
