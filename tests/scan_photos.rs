use photo_slideshow::config::Configuration;
use photo_slideshow::error::Error;
use photo_slideshow::scan::{discover, is_supported_image};
use std::fs;
use std::path::{Path, PathBuf};

fn write_png(path: &Path) {
    image::RgbaImage::new(2, 2).save(path).unwrap();
}

fn config_for(root: &Path, seed: Option<u64>) -> Configuration {
    Configuration {
        photo_library_path: Some(root.to_path_buf()),
        shuffle_seed: seed,
        ..Configuration::default()
    }
}

#[test]
fn finds_images_recursively_and_skips_hidden_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("trip/day1")).unwrap();
    fs::create_dir_all(root.join(".cache")).unwrap();
    write_png(&root.join("a.png"));
    write_png(&root.join("trip/day1/b.PNG"));
    write_png(&root.join(".cache/thumb.png"));
    fs::write(root.join("notes.txt"), b"hello").unwrap();

    let found = discover(&config_for(root, Some(1))).unwrap();
    let mut names: Vec<String> = found
        .iter()
        .map(|p| {
            PathBuf::from(p.as_str())
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.png".to_owned(), "b.PNG".to_owned()]);
}

#[test]
fn seeded_order_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..8 {
        write_png(&dir.path().join(format!("{i}.png")));
    }
    let first = discover(&config_for(dir.path(), Some(42))).unwrap();
    let second = discover(&config_for(dir.path(), Some(42))).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 8);
}

#[test]
fn explicit_photos_are_included() {
    let cfg = Configuration {
        photos: vec!["/a.jpg".into(), "https://example.com/b.jpg".into(), "/a.jpg".into()],
        ..Configuration::default()
    };
    let found = discover(&cfg).unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn missing_directory_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_for(&dir.path().join("nope"), None);
    assert!(matches!(discover(&cfg), Err(Error::BadDir(_))));
}

#[test]
fn empty_library_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        discover(&config_for(dir.path(), None)),
        Err(Error::EmptyScan)
    ));
}

#[test]
fn extension_filter() {
    assert!(is_supported_image(Path::new("x.JPG")));
    assert!(is_supported_image(Path::new("x.webp")));
    assert!(!is_supported_image(Path::new("x.txt")));
    assert!(!is_supported_image(Path::new("jpg")));
}
