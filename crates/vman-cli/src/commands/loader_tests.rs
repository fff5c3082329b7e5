use std::io::Write;

use tempfile::NamedTempFile;
use vman_bytecode::{ImageBuilder, ImageError};

use super::loader::load;

fn write_image(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(bytes).expect("write image");
    file.flush().expect("flush image");
    file
}

#[test]
fn loads_valid_image() {
    let mut b = ImageBuilder::new();
    b.mov(0, 5);
    let file = write_image(&b.build());

    let program = load(file.path()).expect("valid image");
    assert_eq!(program.entry_point(), 0x10);
    assert_eq!(program.len(), 0x16);
}

#[test]
fn rejects_bad_magic() {
    let mut b = ImageBuilder::new().magic(0xDEAD_BEEF);
    b.mov(0, 5);
    let file = write_image(&b.build());

    let err = load(file.path()).unwrap_err();
    assert!(matches!(
        err.source,
        ImageError::InvalidMagic { found: 0xDEAD_BEEF }
    ));
    assert_eq!(err.path, file.path());
}

#[test]
fn rejects_short_file() {
    let file = write_image(&[0x10, 0, 0, 0]);

    let err = load(file.path()).unwrap_err();
    assert!(matches!(err.source, ImageError::FileTooSmall(4)));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.bin");

    let err = load(&path).unwrap_err();
    assert!(matches!(err.source, ImageError::Io(_)));
    assert!(err.to_string().starts_with("failed to load '"));
    assert!(err.to_string().contains("absent.bin"));
}
