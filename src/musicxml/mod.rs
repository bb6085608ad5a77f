//! MusicXML 3.1 emission.
//!
//! - **builder**: string-building `MusicXmlBuilder` for measure content
//! - **emitter**: whole-document assembly and file output
//!
//! The score model is built first (`crate::score::layout`); a single
//! serialization pass here turns it into text.

pub mod builder;
pub mod emitter;

pub use builder::{xml_escape, Clef, MusicXmlBuilder};
pub use emitter::{emit_musicxml, write_musicxml_file};
