use std::io::{Cursor, Write};

use jarsig::archive::{is_directory, read_entries};
use jarsig::{is_signature_artifact, ExtractorConfig, JarExtractor};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

#[test]
fn signature_artifacts_in_any_case() {
    for name in [
        "META-INF/manifest.mf",
        "META-INF/MANIFEST.MF",
        "meta-inf/Manifest.Mf",
        "META-INF/zigbert.sf",
        "META-INF/ZIGBERT.SF",
        "META-INF/zigbert.rsa",
        "META-INF/Mozilla.RSA",
        "META-INF/cose.dsa",
        "META-INF/ids.json",
        "META-INF/IDS.JSON",
        "META-INF/.sf",
    ] {
        assert!(is_signature_artifact(name), "{name} should be an artifact");
    }
}

#[test]
fn ordinary_entries_are_not_artifacts() {
    for name in [
        "install.rdf",
        "manifest.mf",
        "zigbert.rsa",
        "META-INF/",
        "META-INF/manifest.mf.bak",
        "META-INF/zigbert.sf.orig",
        "META-INF/cose.manifest",
        "META-INF/other.json",
        "META-INF/sub/x.rsa",
        "META-INF/sub/manifest.mf",
        "content/META-INF/manifest.mf",
        "META-INFO/zigbert.rsa",
    ] {
        assert!(!is_signature_artifact(name), "{name} should not be an artifact");
    }
}

#[test]
fn directory_names() {
    assert!(is_directory("chrome/"));
    assert!(is_directory("chrome\\"));
    assert!(!is_directory("chrome"));
    assert!(!is_directory("chrome/content.jar"));
}

#[test]
fn entries_keep_archive_order() {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o640);
    writer.start_file("z.js", options).unwrap();
    writer.write_all(b"z").unwrap();
    writer.add_directory("a/", options).unwrap();
    writer.start_file("a/b.js", options).unwrap();
    writer.write_all(b"b").unwrap();
    let data = writer.finish().unwrap().into_inner();

    let entries = read_entries(Cursor::new(data)).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["z.js", "a/", "a/b.js"]);
    assert!(entries[1].is_dir);
    assert_eq!(entries[2].data, b"b");
    assert_eq!(entries[0].unix_mode.map(|mode| mode & 0o777), Some(0o640));
}

#[test]
fn resigning_replaces_every_artifact() {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let files: [(&str, &[u8]); 5] = [
        ("META-INF/zigbert.rsa", b"old"),
        ("a.js", b"a"),
        ("META-INF/MANIFEST.MF", b"old"),
        ("META-INF/zigbert.sf", b"old"),
        ("META-INF/ids.json", b"old"),
    ];
    for (name, data) in files {
        writer.start_file(name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    let data = writer.finish().unwrap().into_inner();

    let jar = JarExtractor::from_reader(
        Cursor::new(data),
        ExtractorConfig::new().ids(b"new".to_vec()),
    )
    .unwrap();
    let out = jar
        .write_signed(Cursor::new(Vec::new()), b"sig", "META-INF/zigbert")
        .unwrap();

    let archive = ZipArchive::new(Cursor::new(out.into_inner())).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert_eq!(names.len(), 5);
    for name in [
        "META-INF/zigbert.rsa",
        "a.js",
        "META-INF/manifest.mf",
        "META-INF/zigbert.sf",
        "META-INF/ids.json",
    ] {
        assert!(names.contains(&name), "missing {name}");
    }
    assert!(!names.contains(&"META-INF/MANIFEST.MF"));
}
