use super::placement::PlacementError;
use shoji_ipc::{DisplayInfo, PlacementValue, Rect};

pub type DisplayId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pub id: DisplayId,
    pub bounds: Rect,
    pub work_area: Rect,
}

impl Display {
    pub fn from_info(info: &DisplayInfo) -> Self {
        Self {
            id: info.id,
            bounds: info.bounds,
            work_area: info.work_area,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplaySelector {
    Primary,
    /// Index into the secondary displays ordered left to right.
    Index(usize),
}

impl DisplaySelector {
    pub fn parse(value: &PlacementValue) -> Result<Self, PlacementError> {
        if value.is_keyword("primary") {
            return Ok(DisplaySelector::Primary);
        }
        value
            .as_integer()
            .and_then(|n| usize::try_from(n).ok())
            .map(DisplaySelector::Index)
            .ok_or_else(|| PlacementError::InvalidSelector(value.clone()))
    }
}

/// Snapshot of the session's displays with exactly one primary.
///
/// Secondary displays are kept sorted by the left edge of their bounds;
/// displays sharing an edge keep the order the host reported them in.
#[derive(Debug, Clone)]
pub struct DisplaySet {
    primary: Display,
    secondary: Vec<Display>,
}

impl DisplaySet {
    pub fn from_infos(infos: Vec<DisplayInfo>) -> Result<Self, PlacementError> {
        if infos.is_empty() {
            return Err(PlacementError::NoDisplays);
        }

        let mut primaries = Vec::with_capacity(1);
        let mut secondary = Vec::with_capacity(infos.len() - 1);
        for info in &infos {
            if info.primary {
                primaries.push(Display::from_info(info));
            } else {
                secondary.push(Display::from_info(info));
            }
        }

        let primary = match primaries.len() {
            0 => return Err(PlacementError::NoPrimaryDisplay(infos.len())),
            1 => primaries.remove(0),
            n => return Err(PlacementError::MultiplePrimaryDisplays(n)),
        };
        secondary.sort_by_key(|d| d.bounds.x);

        Ok(Self { primary, secondary })
    }

    pub fn primary(&self) -> &Display {
        &self.primary
    }

    /// Non-primary displays, left to right.
    pub fn secondary(&self) -> &[Display] {
        &self.secondary
    }

    pub fn len(&self) -> usize {
        self.secondary.len() + 1
    }

    pub fn select(&self, selector: DisplaySelector) -> &Display {
        if self.len() == 1 {
            return &self.primary;
        }
        match selector {
            DisplaySelector::Index(index) => self.secondary.get(index).unwrap_or(&self.primary),
            DisplaySelector::Primary => &self.primary,
        }
    }
}
