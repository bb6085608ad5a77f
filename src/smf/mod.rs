//! Standard MIDI File (SMF) reading.
//!
//! - **event**: tagged event/meta enums and the MIDI variable-length
//!   quantity, decoded once so nothing downstream touches status bytes
//! - **parse**: `MThd`/`MTrk` chunk scan with running status and
//!   truncation-tolerant, bounds-checked track parsing

pub mod event;
pub mod parse;

pub use event::{read_varint, MetaEvent, TrackEvent, TrackEventKind};
pub use parse::{parse_smf, SmfFile, Track};
