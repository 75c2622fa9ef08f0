use crate::suggest::{SUGGEST_LIMIT_DESKTOP, SUGGEST_LIMIT_MOBILE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Viewports narrower than this are treated as mobile.
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Desktop,
    Mobile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub filter_input: Duration,
    pub map_move: Duration,
    pub list_search: Duration,
    pub processing: Duration,
    pub popup: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitOptions {
    pub padding: u32,
    pub max_zoom: u8,
}

impl Profile {
    pub fn for_viewport_width(px: u32) -> Self {
        if px < MOBILE_BREAKPOINT_PX {
            Profile::Mobile
        } else {
            Profile::Desktop
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Profile::Mobile)
    }

    pub fn timings(&self) -> Timings {
        let ms = Duration::from_millis;
        match self {
            Profile::Desktop => Timings {
                filter_input: ms(500),
                map_move: ms(300),
                list_search: ms(200),
                processing: ms(50),
                popup: ms(1000),
            },
            Profile::Mobile => Timings {
                filter_input: ms(800),
                map_move: ms(500),
                list_search: ms(200),
                processing: ms(100),
                popup: ms(1000),
            },
        }
    }

    pub fn fit(&self) -> FitOptions {
        match self {
            Profile::Desktop => FitOptions {
                padding: 50,
                max_zoom: 12,
            },
            Profile::Mobile => FitOptions {
                padding: 40,
                max_zoom: 10,
            },
        }
    }

    pub fn suggest_limit(&self) -> usize {
        match self {
            Profile::Desktop => SUGGEST_LIMIT_DESKTOP,
            Profile::Mobile => SUGGEST_LIMIT_MOBILE,
        }
    }

    /// Upper bound on markers drawn while no filter is active.
    pub fn unfiltered_marker_cap(&self) -> Option<usize> {
        match self {
            Profile::Desktop => None,
            Profile::Mobile => Some(1000),
        }
    }
}
