//! User supplied remapping of track tags and names
//!
//! Rules come from an optional YAML file loaded once at startup:
//!
//! ```yaml
//! - key: group-title
//!   name: Channel 1
//!   want: World News
//! - key: name
//!   name: Channel 1
//!   want: Channel One
//! ```

pub mod rewriter;
pub mod table;

pub use rewriter::{APPENDED_TAG_NAME, NAME_KEY, TrackRewriter, WELL_KNOWN_TAGS};
pub use table::{MappingLoad, MappingLoadOutcome, MappingRule, MappingTable};
