use jarsig::{digest_set, Manifest, ParsingErrorKind, Section, Signature, MAX_LINE_LEN};

/// base64 MD5 of the empty string
const MD5_EMPTY: &str = "1B2M2Y8AsgTpgAmY7PhCfg==";
/// base64 SHA-1 of the empty string
const SHA1_EMPTY: &str = "2jmj7l5rSw0yVb/vlWAYkK/YBwk=";

fn empty_section_text(name: &str) -> String {
    format!(
        "Name: {name}\nDigest-Algorithms: MD5 SHA1\nMD5-Digest: {MD5_EMPTY}\nSHA1-Digest: {SHA1_EMPTY}\n"
    )
}

#[test]
fn section_serializes_sorted_upper_case_algorithms() {
    let section = Section::from_data("install.rdf", b"");
    assert_eq!(section.to_string(), empty_section_text("install.rdf"));
    assert_eq!(section.algorithms(), ["md5", "sha1"]);
    assert_eq!(section.digest("SHA1").map(<[u8]>::len), Some(20));
}

#[test]
fn manifest_layout() {
    let manifest = Manifest::new(vec![
        Section::from_data("install.rdf", b""),
        Section::from_data("chrome.manifest", b""),
    ]);
    let expected = format!(
        "Manifest-Version: 1.0\n\n{}\n{}",
        empty_section_text("install.rdf"),
        empty_section_text("chrome.manifest")
    );
    assert_eq!(manifest.to_string(), expected);

    let with_newline = manifest.clone().with_extra_newline(true);
    assert_eq!(with_newline.to_string(), format!("{expected}\n"));
}

#[test]
fn manifest_round_trip() {
    let text = format!(
        "Manifest-Version: 1.0\n\n{}\n{}",
        empty_section_text("install.rdf"),
        empty_section_text("content/overlay.js")
    );
    let manifest = Manifest::parse(&text).unwrap();
    assert_eq!(manifest.sections().len(), 2);
    assert!(!manifest.extra_newline());
    assert_eq!(manifest.to_string(), text);

    let section = &manifest.sections()[1];
    assert_eq!(section.name(), "content/overlay.js");
    assert_eq!(section.digests(), &digest_set(b""));

    let extra = format!("{text}\n");
    let manifest = Manifest::parse(&extra).unwrap();
    assert!(manifest.extra_newline());
    assert_eq!(manifest.to_string(), extra);
}

#[test]
fn empty_manifest_round_trip() {
    for text in ["Manifest-Version: 1.0\n\n", "Manifest-Version: 1.0\n\n\n"] {
        let manifest = Manifest::parse(text).unwrap();
        assert!(manifest.sections().is_empty());
        assert_eq!(manifest.to_string(), text);
    }
}

#[test]
fn generated_manifest_round_trip() {
    let sections = vec![
        Section::from_data("install.rdf", b"<RDF/>"),
        Section::from_data("chrome/content/browser.xul", b"<window/>"),
        Section::from_data("LICENSE", b"MPL 2.0"),
    ];
    for extra in [false, true] {
        let manifest = Manifest::new(sections.clone()).with_extra_newline(extra);
        let text = manifest.to_string();
        let parsed = Manifest::parse(&text).unwrap();
        assert_eq!(parsed, manifest);
        assert_eq!(parsed.to_string(), text);
    }
}

#[test]
fn long_names_wrap_and_unwrap() {
    let name = format!("chrome/content/{}.js", "x".repeat(150));
    let section = Section::from_data(name.as_str(), b"data");
    let text = section.to_string();

    let name_lines: Vec<&str> = text
        .lines()
        .take_while(|line| !line.starts_with("Digest-Algorithms"))
        .collect();
    assert!(name_lines.len() > 2);
    for (idx, line) in name_lines.iter().enumerate() {
        assert!(line.len() <= MAX_LINE_LEN, "line {idx} too long: {line}");
        if idx > 0 {
            assert!(line.starts_with(' '));
            assert!(!line.starts_with("  "));
        }
    }
    assert_eq!(name_lines[0].len(), MAX_LINE_LEN);

    let manifest = Manifest::parse(&format!("Manifest-Version: 1.0\n\n{text}")).unwrap();
    assert_eq!(manifest.sections()[0].name(), name);
}

#[test]
fn non_ascii_names_wrap_on_char_boundaries() {
    let name = format!("locale/{}.properties", "é".repeat(80));
    let manifest = Manifest::new(vec![Section::from_data(name.as_str(), b"")]);
    let text = manifest.to_string();
    assert!(text.lines().all(|line| line.len() <= MAX_LINE_LEN));

    let parsed = Manifest::parse_bytes(text.as_bytes()).unwrap();
    assert_eq!(parsed.sections()[0].name(), name);
    assert_eq!(parsed.to_string(), text);
}

#[test]
fn line_too_long_is_fatal() {
    let text = format!("Manifest-Version: 1.0\n\n{}\n", "x".repeat(80));
    let err = Manifest::parse(&text).unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.kind, ParsingErrorKind::LineTooLong(80));
    assert!(err.to_string().contains("line too long"));
}

#[test]
fn continuation_without_header_is_fatal() {
    let err = Manifest::parse("\n continued\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.kind, ParsingErrorKind::ContinuationWithoutHeader);

    let err = Manifest::parse("Manifest-Version: 1.0\n\n more\n").unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.kind, ParsingErrorKind::ContinuationWithoutHeader);
}

#[test]
fn unrecognized_line_is_fatal() {
    let err = Manifest::parse("Manifest-Version: 1.0\n\nCreated-By: hand\n").unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(
        err.kind,
        ParsingErrorKind::UnrecognizedLine("Created-By: hand".to_string())
    );
}

#[test]
fn invalid_digest_is_fatal() {
    let text = "Manifest-Version: 1.0\n\nName: a\nMD5-Digest: not base64!\n";
    let err = Manifest::parse(text).unwrap_err();
    assert_eq!(err.line, 4);
    assert_eq!(
        err.kind,
        ParsingErrorKind::InvalidDigest {
            header: "MD5-Digest".to_string()
        }
    );
}

#[test]
fn invalid_utf8_reports_line() {
    let err = Manifest::parse_bytes(b"Manifest-Version: 1.0\n\nName: \xff\n").unwrap_err();
    assert_eq!(err.line, 3);
    assert!(matches!(err.kind, ParsingErrorKind::UnrecognizedLine(_)));
}

#[test]
fn directory_names_are_dropped() {
    let text = format!(
        "Manifest-Version: 1.0\n\n{}\n{}",
        empty_section_text("chrome/"),
        empty_section_text("chrome/content.jar")
    );
    let manifest = Manifest::parse(&text).unwrap();
    let names: Vec<&str> = manifest.sections().iter().map(Section::name).collect();
    assert_eq!(names, ["chrome/content.jar"]);
}

#[test]
fn headers_are_case_insensitive() {
    let text = format!(
        "manifest-version: 1.0\n\nNAME: foo\ndigest-algorithms: md5 sha1\nmd5-digest: {MD5_EMPTY}\nSha1-Digest: {SHA1_EMPTY}\n"
    );
    let manifest = Manifest::parse(&text).unwrap();
    let section = &manifest.sections()[0];
    assert_eq!(section.name(), "foo");
    assert_eq!(section.algorithms(), ["md5", "sha1"]);
    assert_eq!(section.digests(), &digest_set(b""));
}

#[test]
fn continuations_extend_any_header() {
    let text = "Manifest-Version: 1.0\n\nName: a\nMD5-Digest: 1B2M2Y8Asg\n TpgAmY7PhCfg==\n";
    let manifest = Manifest::parse(text).unwrap();
    assert_eq!(manifest.sections()[0].digest("md5"), Some(&digest_set(b"")["md5"][..]));
}

#[test]
fn signature_header_and_omitted_body() {
    let sections = vec![Section::from_data("install.rdf", b"")];
    let signature = Signature::new(sections, digest_set(b"")).with_omit_body(true);

    let header = format!(
        "Signature-Version: 1.0\nMD5-Digest-Manifest: {MD5_EMPTY}\nSHA1-Digest-Manifest: {SHA1_EMPTY}"
    );
    assert_eq!(signature.header(), header);
    assert_eq!(signature.to_string(), format!("{header}\n"));
    assert!(!signature.to_string().contains("Name:"));
    assert_eq!(signature.sections().len(), 1);
    assert_eq!(
        signature.digest_manifest_lines(),
        [
            format!("MD5-Digest-Manifest: {MD5_EMPTY}"),
            format!("SHA1-Digest-Manifest: {SHA1_EMPTY}")
        ]
    );
}

#[test]
fn signature_full_body() {
    let sections = vec![Section::from_data("install.rdf", b"")];
    let signature = Signature::new(sections, digest_set(b""));
    let expected = format!(
        "{}\n\n{}",
        signature.header(),
        empty_section_text("install.rdf")
    );
    assert_eq!(signature.to_string(), expected);
}

#[test]
fn signature_round_trip() {
    let sections = vec![
        Section::from_data("install.rdf", b"a"),
        Section::from_data("bootstrap.js", b"b"),
    ];
    for omit in [false, true] {
        for extra in [false, true] {
            let signature = Signature::new(sections.clone(), digest_set(b"manifest"))
                .with_omit_body(omit)
                .with_extra_newline(extra);
            let text = signature.to_string();
            let parsed = Signature::parse(&text).unwrap();
            assert_eq!(parsed.to_string(), text, "omit={omit} extra={extra}");
            assert_eq!(parsed.digest_manifests(), &digest_set(b"manifest"));
            assert_eq!(parsed.omit_body(), omit);
            if !omit {
                assert_eq!(parsed.sections(), signature.sections());
            }
        }
    }
}

#[test]
fn whitespace_continuation_is_not_a_blank_line() {
    // the last folded chunk of this name is a lone space
    let name = format!("{} ", "a".repeat(MAX_LINE_LEN - "Name: ".len()));
    let manifest = Manifest::new(vec![Section::from_data(name.as_str(), b"")]);
    let text = manifest.to_string();
    assert!(text.contains("\n  \nDigest-Algorithms: MD5 SHA1\n"));

    let parsed = Manifest::parse(&text).unwrap();
    assert_eq!(parsed.sections().len(), 1);
    assert_eq!(parsed.sections()[0].name(), name);
    assert_eq!(parsed.sections()[0].digests(), &digest_set(b""));
    assert_eq!(parsed.to_string(), text);
}

#[test]
fn leading_and_trailing_spaces_in_names_survive() {
    for name in [" leading.js", "trailing.js ", "in between.js"] {
        let manifest = Manifest::new(vec![Section::from_data(name, b"x")]);
        let parsed = Manifest::parse(&manifest.to_string()).unwrap();
        assert_eq!(parsed.sections()[0].name(), name);
    }
}

#[test]
fn whitespace_only_line_without_leading_space_is_rejected() {
    let err = Manifest::parse("Manifest-Version: 1.0\n\t\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.kind, ParsingErrorKind::UnrecognizedLine("\t".to_string()));
}

#[test]
fn crlf_documents_keep_their_trailing_blank_lines() {
    let sections = vec![Section::from_data("install.rdf", b"")];
    let lf = Manifest::new(sections.clone()).to_string();
    let crlf = lf.replace('\n', "\r\n");
    let manifest = Manifest::parse(&crlf).unwrap();
    assert!(!manifest.extra_newline());
    assert_eq!(manifest.to_string(), lf);

    let manifest = Manifest::parse(&format!("{crlf}\r\n")).unwrap();
    assert!(manifest.extra_newline());

    for (omit, extra) in [(true, false), (true, true), (false, true)] {
        let signature = Signature::new(sections.clone(), digest_set(b"manifest"))
            .with_omit_body(omit)
            .with_extra_newline(extra);
        let lf = signature.to_string();
        let parsed = Signature::parse(&lf.replace('\n', "\r\n")).unwrap();
        assert_eq!(parsed.omit_body(), omit, "omit={omit} extra={extra}");
        assert_eq!(parsed.extra_newline(), extra, "omit={omit} extra={extra}");
        assert_eq!(parsed.to_string(), lf);
    }
}
