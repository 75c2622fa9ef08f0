pub mod errors;
pub mod filter;
pub mod list;
pub mod map;
pub mod model;
pub mod profile;
pub mod session;
pub mod suggest;
pub mod util;

pub use errors::*;
pub use filter::{FilterField, FilterMode, FilterState, Predicate, MATCH_ALL};
pub use list::{ListRow, ListView, RENDER_CAP};
pub use map::{MapCommand, MapView, RecordingMap, SELECT_ZOOM};
pub use model::*;
pub use profile::{FitOptions, Profile, Timings};
pub use session::{ApplySummary, FilterSession, Indicators, PendingPopup, SessionView};
pub use suggest::UniqueValues;
