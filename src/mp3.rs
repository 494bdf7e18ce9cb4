// MP3 file session: load, query and edit tags, save

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, TaggerError};
use crate::field_mapping::Field;
use crate::id3::tag::Staged;
use crate::id3::{Frame, FrameStream, Id3Version, TagLayout, TagValue, TagVersion};
use crate::utils::io;

/// Field values grouped by the layout they were read from
pub type TagMap = BTreeMap<TagLayout, BTreeMap<Field, Option<TagValue>>>;

/// An MP3 file held in memory.
///
/// Reads and edits go through the tags visible under the active
/// [`TagVersion`]; nothing reaches the disk until [`Mp3File::save`].
#[derive(Debug, Clone)]
pub struct Mp3File {
    path: Option<PathBuf>,
    stream: FrameStream,
    id3_version: Id3Version,
    tag_version: TagVersion,
}

impl Mp3File {
    /// Load `path`, which must have an `.mp3` extension
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = io::read_mp3(path)?;
        log::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());

        let mut file = Self::from_bytes(bytes);
        file.path = Some(path.to_path_buf());
        Ok(file)
    }

    /// Work on a buffer that is not backed by a file
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let stream = FrameStream::load(bytes);
        Mp3File {
            path: None,
            id3_version: stream.version(),
            stream,
            tag_version: TagVersion::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Version announced by the file's leading bytes
    pub fn id3_version(&self) -> Id3Version {
        self.id3_version
    }

    pub fn tag_version(&self) -> TagVersion {
        self.tag_version
    }

    /// Choose which layouts later reads and edits apply to
    pub fn set_version(&mut self, tag_version: TagVersion) {
        self.tag_version = tag_version;
    }

    pub fn frames(&mut self) -> &[Frame] {
        self.stream.frames()
    }

    /// Every visible field, per layout.
    ///
    /// The trailer always lists all of its slots; ID3v2 lists the frames
    /// that are present.
    pub fn get_tags(&mut self) -> TagMap {
        let tag_version = self.tag_version;
        let mut map: TagMap = tag_version
            .layouts()
            .iter()
            .map(|&layout| (layout, BTreeMap::new()))
            .collect();

        for tag in self.stream.tags() {
            if !tag_version.includes(tag.layout()) {
                continue;
            }
            let fields = map.entry(tag.layout()).or_default();
            let value = tag.value();
            // Several frames can map to one field, keep the first that has a value
            let slot = fields.entry(tag.field()).or_insert(None);
            if slot.is_none() {
                *slot = value;
            }
        }
        map
    }

    /// Value of `field` under each visible layout that has it
    pub fn field_values(&mut self, field: Field) -> BTreeMap<TagLayout, Option<TagValue>> {
        self.get_tags()
            .into_iter()
            .filter_map(|(layout, mut fields)| Some((layout, fields.remove(&field)?)))
            .collect()
    }

    /// Value of `field`, preferring ID3v2 over the trailer
    pub fn get_field(&mut self, field: Field) -> Option<TagValue> {
        self.field_values(field)
            .into_values()
            .rev()
            .flatten()
            .next()
    }

    /// Write `value` to `field` in every visible layout.
    ///
    /// A missing ID3v2 frame is created when the file has an ID3v2 header.
    /// Either every visible tag takes the value or, on error, none does.
    pub fn set_field(&mut self, field: Field, value: impl Into<TagValue>) -> Result<()> {
        let value = value.into();
        if field == Field::Genre && self.tag_version == TagVersion::Both {
            return Err(TaggerError::TagSet(
                "Genre is stored differently by ID3v1 and ID3v2, select one version first".into(),
            ));
        }

        let tag_version = self.tag_version;
        let staged = self.encode_targets(field, &value)?;
        let has_v2 = self
            .stream
            .tags()
            .any(|tag| tag.field() == field && tag.layout() == TagLayout::Id3v2);

        let new_frame = if tag_version.includes(TagLayout::Id3v2) && !has_v2 && !value.clears(field) {
            self.new_v2_frame(field, &value)?
        } else {
            None
        };

        let frames = self.stream.frames_mut();
        for (frame, tag, change) in staged {
            frames[frame].tags_mut()[tag].stage(change);
        }
        if let Some(frame) = new_frame {
            log::debug!("Adding {} for {field}", frame.title());
            self.stream.push_frame(frame);
        }
        self.stream.commit_frames();
        Ok(())
    }

    /// Clear `field` in every visible layout
    pub fn clear_field(&mut self, field: Field) {
        let tag_version = self.tag_version;
        for frame in self.stream.frames_mut().iter_mut() {
            for tag in frame.tags_mut() {
                if tag.field() == field && tag_version.includes(tag.layout()) {
                    tag.clear();
                }
            }
        }
        self.stream.commit_frames();
    }

    /// The file's bytes with every edit applied
    pub fn to_bytes(&mut self) -> Vec<u8> {
        self.stream.apply_pending().to_vec()
    }

    /// Apply every edit and write the result back to the file it was opened from
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| TaggerError::TagSet("No file to save to".into()))?;
        let bytes = self.stream.apply_pending();
        io::write_file(&path, bytes)?;
        log::debug!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Encode `value` for every visible tag of `field`, as
    /// `(frame index, tag index, change)`
    fn encode_targets(&mut self, field: Field, value: &TagValue) -> Result<Vec<(usize, usize, Staged)>> {
        let tag_version = self.tag_version;
        let mut staged = Vec::new();
        for (frame_index, frame) in self.stream.frames().iter().enumerate() {
            for (tag_index, tag) in frame.tags().iter().enumerate() {
                if tag.field() == field && tag_version.includes(tag.layout()) {
                    staged.push((frame_index, tag_index, tag.encode(value)?));
                }
            }
        }
        Ok(staged)
    }

    fn new_v2_frame(&self, field: Field, value: &TagValue) -> Result<Option<Frame>> {
        if self.id3_version.is_v2() {
            return Ok(Some(Frame::from_value(field, value, self.id3_version)?));
        }
        if self.tag_version == TagVersion::V2 {
            return Err(TaggerError::TagSet(format!(
                "Tag {field} can't be added, the file has no ID3v2 header"
            )));
        }
        log::debug!("No ID3v2 header, {field} is only written to ID3v1");
        Ok(None)
    }
}
