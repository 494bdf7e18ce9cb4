use std::fs;
use std::path::PathBuf;

use mp3_tagger::{Field, Mp3File, TagLayout, TagValue, TagVersion, TaggerError};
use tempfile::TempDir;

/// ID3v2.3 header, one TALB frame, audio, then an ID3v1 trailer
fn sample_bytes() -> Vec<u8> {
    let mut bytes = b"ID3\x03\0\0\0\0\0\0".to_vec();
    bytes.extend_from_slice(b"TALB\0\0\0\x06\0\0\0Album");
    bytes.extend_from_slice(&[0xFF; 512]);

    let mut trailer = [0u8; 128];
    trailer[..3].copy_from_slice(b"TAG");
    trailer[3..8].copy_from_slice(b"Title");
    trailer[63..68].copy_from_slice(b"Album");
    trailer[126] = 7;
    trailer[127] = 17;
    bytes.extend_from_slice(&trailer);
    bytes
}

fn write_sample(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, sample_bytes()).unwrap();
    path
}

fn text(value: &str) -> Option<TagValue> {
    Some(TagValue::Text(value.into()))
}

#[test]
fn rejects_other_extensions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("song.flac");
    fs::write(&path, sample_bytes()).unwrap();

    let err = Mp3File::open(&path).unwrap_err();
    assert!(matches!(err, TaggerError::OpenFile(_)));
    assert!(err.to_string().starts_with("File must be MP3 format"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Mp3File::open(dir.path().join("missing.mp3")).unwrap_err();
    assert!(matches!(err, TaggerError::Io(_)));
}

#[test]
fn reads_both_layouts() {
    let dir = TempDir::new().unwrap();
    let mut file = Mp3File::open(write_sample(&dir, "song.mp3")).unwrap();

    assert_eq!(file.id3_version().to_string(), "2.3");
    let tags = file.get_tags();
    assert_eq!(tags[&TagLayout::Id3v2][&Field::Album], text("Album"));
    assert_eq!(tags[&TagLayout::Id3v1][&Field::Song], text("Title"));
    assert_eq!(tags[&TagLayout::Id3v1][&Field::Track], Some(TagValue::Number(7)));
    assert_eq!(tags[&TagLayout::Id3v1][&Field::Genre], text("Blues"));
}

#[test_log::test]
fn edits_survive_save_and_reopen() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "song.mp3");
    let original_len = sample_bytes().len();

    let mut file = Mp3File::open(&path).unwrap();
    file.set_field(Field::Artist, "Some Artist").unwrap();
    file.set_field(Field::Album, "Another Album").unwrap();
    file.set_version(TagVersion::V1);
    file.set_field(Field::Genre, "Jazz").unwrap();
    file.save().unwrap();

    let saved = fs::read(&path).unwrap();
    assert!(saved.len() > original_len);
    assert_eq!(&saved[..10], &sample_bytes()[..10]);
    assert_eq!(&saved[saved.len() - 128..saved.len() - 125], b"TAG");

    let mut reopened = Mp3File::open(&path).unwrap();
    let artist = reopened.field_values(Field::Artist);
    assert_eq!(artist[&TagLayout::Id3v1], text("Some Artist"));
    assert_eq!(artist[&TagLayout::Id3v2], text("Some Artist"));
    assert_eq!(reopened.get_field(Field::Album), text("Another Album"));

    reopened.set_version(TagVersion::V1);
    assert_eq!(reopened.get_field(Field::Genre), text("Jazz"));
    assert_eq!(reopened.get_field(Field::Track), Some(TagValue::Number(7)));
}

#[test]
fn saving_twice_writes_the_same_bytes() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "song.mp3");

    let mut file = Mp3File::open(&path).unwrap();
    file.set_field(Field::Comment, "Nice").unwrap();
    file.save().unwrap();
    let first = fs::read(&path).unwrap();
    file.save().unwrap();
    assert_eq!(fs::read(&path).unwrap(), first);
}

#[test]
fn genre_under_both_versions_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "song.mp3");

    let mut file = Mp3File::open(&path).unwrap();
    assert!(matches!(
        file.set_field(Field::Genre, "Jazz"),
        Err(TaggerError::TagSet(_))
    ));
    file.save().unwrap();
    assert_eq!(fs::read(&path).unwrap(), sample_bytes());
}

#[test]
fn clearing_a_frame_shrinks_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "song.mp3");

    let mut file = Mp3File::open(&path).unwrap();
    file.set_version(TagVersion::V2);
    file.clear_field(Field::Album);
    file.save().unwrap();

    let saved = fs::read(&path).unwrap();
    assert_eq!(saved.len(), sample_bytes().len() - 16);

    let mut reopened = Mp3File::open(&path).unwrap();
    assert_eq!(reopened.field_values(Field::Album)[&TagLayout::Id3v1], text("Album"));
    reopened.set_version(TagVersion::V2);
    assert_eq!(reopened.get_field(Field::Album), None);
}

#[cfg(unix)]
#[test]
fn write_protected_files_are_made_writable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "song.mp3");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

    let mut file = Mp3File::open(&path).unwrap();
    file.set_field(Field::Song, "Unlocked").unwrap();
    file.save().unwrap();

    // Mode bits are not checked: root can write regardless of them
    assert_eq!(Mp3File::open(&path).unwrap().get_field(Field::Song), text("Unlocked"));
}
