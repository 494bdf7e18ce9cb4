//! mp3-tagger - read, edit and rewrite ID3 tags in MP3 files
//!
//! Both tag layouts are handled from one buffer: the fixed 128 byte ID3v1
//! trailer and the ID3v2 frames following the header. Edits are staged on
//! the tags and spliced into the buffer in one pass when the file is saved.
//!
//! ```no_run
//! use mp3_tagger::{Field, Mp3File, TagVersion};
//!
//! # fn main() -> mp3_tagger::Result<()> {
//! let mut file = Mp3File::open("song.mp3")?;
//! file.set_field(Field::Artist, "Someone")?;
//! file.set_version(TagVersion::V1);
//! file.set_field(Field::Genre, "Jazz")?;
//! file.save()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod field_mapping;
pub mod genres;
pub mod id3;
pub mod mp3;
pub mod utils;

pub use error::{Result, TaggerError};
pub use field_mapping::Field;
pub use id3::{Frame, FrameState, FrameStream, Id3Version, Tag, TagLayout, TagValue, TagVersion};
pub use mp3::{Mp3File, TagMap};
