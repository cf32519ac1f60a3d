//! Edge cases: hostile or sloppy manifests and page text.

use trust_txt::manifest::{parse_with_warnings, DATA_TRAINING_VARIABLE};
use trust_txt::{contains_trust_uri, find_trust_uris, parse, Category, TrustManifest, TrustUri};

#[test]
fn empty_and_comment_only_manifests() {
    assert!(parse("").is_empty());
    assert!(parse("\n\n   \n").is_empty());
    assert!(parse("# only\n#comments here\n   # indented\n").is_empty());
}

#[test]
fn crlf_and_whitespace_are_tolerated() {
    let m = parse("  SOCIAL = https://twitter.com/acme \r\nMember=example.org\r\n");
    assert_eq!(m.social, vec!["https://twitter.com/acme"]);
    assert_eq!(m.member, vec!["example.org"]);
}

#[test]
fn lines_missing_a_part_are_skipped() {
    let (m, warnings) = parse_with_warnings("social\n=https://twitter.com/acme\nsocial=\n   =   \n");
    assert!(m.is_empty());
    assert!(warnings.is_empty());
}

#[test]
fn value_keeps_everything_after_first_separator() {
    let m = parse("social=https://www.facebook.com/profile.php?id=42\n");
    assert_eq!(m.social, vec!["https://www.facebook.com/profile.php?id=42"]);
}

#[test]
fn unknown_variables_warn_without_aborting() {
    let text = "foo=bar\nsocial=https://twitter.com/acme\nfuturefield=1\nvendor=https://v.example\n";
    let (m, warnings) = parse_with_warnings(text);
    assert_eq!(m.social.len(), 1);
    assert_eq!(m.vendor.len(), 1);
    let unknown: Vec<(usize, &str)> = warnings
        .iter()
        .map(|w| (w.line, w.variable.as_str()))
        .collect();
    assert_eq!(unknown, vec![(1, "foo"), (3, "futurefield")]);
}

#[test]
fn data_training_flag_variants() {
    for (value, expected) in [
        ("yes", true),
        ("YES", true),
        ("  Yes  ", true),
        ("no", false),
        ("true", false),
        ("y", false),
    ] {
        let m = parse(&format!("{DATA_TRAINING_VARIABLE}={value}\n"));
        assert_eq!(m.data_training_allowed, expected, "value {value:?}");
    }
}

#[test]
fn last_training_flag_wins() {
    let m = parse("datatrainingallowed=yes\ndatatrainingallowed=no\n");
    assert!(!m.data_training_allowed);
}

#[test]
fn every_category_collects_in_order() {
    let mut text = String::new();
    for category in Category::ALL {
        text.push_str(&format!("{}=https://a.example/{}\n", category.variable(), category.variable()));
        text.push_str(&format!("{}=https://b.example/\n", category.variable()));
    }
    let m = parse(&text);
    assert_eq!(m.entry_count(), 18);
    for category in Category::ALL {
        let entries = m.entries(category);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with(category.variable()));
        assert_eq!(entries[1], "https://b.example/");
    }
}

#[test]
fn large_manifest_parses() {
    let text: String = (0..10_000)
        .map(|i| format!("member=https://member{i}.example/\n# note {i}\n"))
        .collect();
    let m = parse(&text);
    assert_eq!(m.member.len(), 10_000);
    assert_eq!(m.member[9_999], "https://member9999.example/");
}

#[test]
fn serialization_round_trip_keeps_social_order() {
    let text = "social=https://twitter.com/b\n# x\nmember=m.example\nsocial=https://twitter.com/a\n";
    let m = parse(text);
    let again: TrustManifest = parse(&m.to_text());
    assert_eq!(again, m);
    assert_eq!(again.social, vec!["https://twitter.com/b", "https://twitter.com/a"]);
}

#[test]
fn binary_garbage_yields_usable_manifest() {
    let text = "\u{0}\u{1}=\u{2}\nsocial=https://twitter.com/acme\n\u{feff}###\n";
    let m = parse(text);
    assert_eq!(m.social, vec!["https://twitter.com/acme"]);
}

// ── Trust URI discovery ───────────────────────────────────────────────────────

#[test]
fn discovery_stops_at_markup_and_whitespace() {
    let text = "<p>trust://acme.example!</p> trust://b.example/path<br> trust://c.example/x y";
    let found: Vec<String> = find_trust_uris(text).iter().map(|u| u.to_string()).collect();
    assert_eq!(
        found,
        vec!["trust://acme.example!", "trust://b.example/path", "trust://c.example/x"]
    );
}

#[test]
fn discovery_ignores_lookalikes() {
    assert!(!contains_trust_uri("trust:/acme.example"));
    assert!(!contains_trust_uri("trusts://acme.example"));
    assert!(!contains_trust_uri("trust://"));
    assert!(contains_trust_uri("xtrust://acme.example"));
}

#[test]
fn malformed_uris_are_rejected() {
    for bad in ["", "trust://", "trust://!", "http://acme.example", "trust://ac me.example"] {
        assert!(TrustUri::parse(bad).is_err(), "{bad:?} should be rejected");
    }
}

#[test]
fn manifest_url_drops_terminator_and_trailing_slash() {
    for raw in ["trust://Acme.Example!", "trust://acme.example/", "trust://acme.example"] {
        let uri = TrustUri::parse(raw).unwrap();
        assert_eq!(
            uri.manifest_url().unwrap().as_str(),
            "https://acme.example/.well-known/trust.txt",
            "{raw}"
        );
    }
}
