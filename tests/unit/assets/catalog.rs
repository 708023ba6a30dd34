use super::*;

#[test]
fn normalize_strips_leading_slash_and_dots() {
    assert_eq!(normalize_asset_path("/bg/room.avif").unwrap(), "bg/room.avif");
    assert_eq!(normalize_asset_path("./bg//room.avif").unwrap(), "bg/room.avif");
    assert_eq!(normalize_asset_path("bg\\room.avif").unwrap(), "bg/room.avif");
}

#[test]
fn normalize_rejects_parent_and_empty() {
    assert!(normalize_asset_path("/bg/../secret.txt").is_err());
    assert!(normalize_asset_path("").is_err());
    assert!(normalize_asset_path("/").is_err());
    assert!(normalize_asset_path("./.").is_err());
}

#[test]
fn insert_and_resolve_share_normalization() {
    let mut catalog = AssetCatalog::new();
    assert!(catalog.is_empty());
    catalog.insert("/bg/room.avif", "/data/room.avif").unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(
        catalog.resolve("bg/room.avif"),
        Some(Path::new("/data/room.avif"))
    );
    assert_eq!(
        catalog.resolve("/bg/./room.avif"),
        Some(Path::new("/data/room.avif"))
    );
    assert_eq!(catalog.resolve("/bg/hall.avif"), None);
    assert_eq!(catalog.resolve("/bg/../bg/room.avif"), None);
    assert!(catalog.insert("../x", "/x").is_err());
}

#[test]
fn scan_indexes_nested_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("bg")).unwrap();
    std::fs::create_dir_all(dir.path().join("char/yuki")).unwrap();
    std::fs::write(dir.path().join("bg/room.avif"), b"x").unwrap();
    std::fs::write(dir.path().join("char/yuki/neutral.avif"), b"x").unwrap();

    let catalog = AssetCatalog::scan(dir.path()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.root(), Some(dir.path()));
    assert_eq!(
        catalog.resolve("/char/yuki/neutral.avif"),
        Some(dir.path().join("char/yuki/neutral.avif").as_path())
    );
}

#[test]
fn scan_rejects_missing_root() {
    let dir = tempfile::tempdir().unwrap();
    let err = AssetCatalog::scan(dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, NovellaError::Validation(_)));
}
