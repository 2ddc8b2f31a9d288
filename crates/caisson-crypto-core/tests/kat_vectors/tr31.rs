//! TR-31 structural parsing against a fully populated version-B block.

use caisson_crypto_core::parse_tr31;

/// 128-char version-B block: header, three optional blocks (KS/PB/TS),
/// a 24-char wrapped key, and a 16-char TDEA MAC.
const KS_VALUE: &str = "00604B120F92920000112233445566778899";
const BLOCK: &str = concat!(
    "B0128B1TX00N0300",
    "KS18",
    "00604B120F92920000112233445566778899",
    "PB04",
    "0C0C0C0C",
    "TS08",
    "00112233445566AA",
    "E5E5E5E5E5E5E5E5E5E5E5E5",
    "ABCDEF0123456789"
);

#[test]
fn header_fields() {
    let parsed = parse_tr31(BLOCK).expect("parse should succeed");
    assert_eq!(parsed.header.version_id, 'B');
    assert_eq!(parsed.header.declared_length, 128);
    assert_eq!(parsed.header.key_usage, "B1");
    assert_eq!(parsed.header.algorithm, 'T');
    assert_eq!(parsed.header.mode_of_use, 'X');
    assert_eq!(parsed.header.key_version, "00");
    assert_eq!(parsed.header.exportability, 'N');
    assert_eq!(parsed.header.optional_block_count, 3);
    assert_eq!(parsed.header.reserved, "00");
}

#[test]
fn optional_block_walk() {
    let parsed = parse_tr31(BLOCK).expect("parse should succeed");
    assert_eq!(parsed.optional_blocks.len(), 3);

    let ks = &parsed.optional_blocks[0];
    assert_eq!(ks.id, "KS");
    assert_eq!(ks.length_bytes, 18);
    assert_eq!(ks.value.len(), 36);
    assert_eq!(ks.value, KS_VALUE);

    let pb = &parsed.optional_blocks[1];
    assert_eq!((pb.id.as_str(), pb.length_bytes), ("PB", 4));

    let ts = &parsed.optional_blocks[2];
    assert_eq!((ts.id.as_str(), ts.length_bytes), ("TS", 8));
    assert_eq!(ts.value, "00112233445566AA");
}

#[test]
fn key_and_authenticator_split() {
    let parsed = parse_tr31(BLOCK).expect("parse should succeed");
    assert_eq!(parsed.encrypted_key, "E5E5E5E5E5E5E5E5E5E5E5E5");
    assert_eq!(parsed.authenticator, "ABCDEF0123456789");
}

#[test]
fn transport_marker_variant() {
    let parsed = parse_tr31(&format!("R{BLOCK}")).expect("parse should succeed");
    assert!(parsed.transport_marker);
    assert_eq!(parsed.header.declared_length, 128);
}

#[test]
fn block_survives_line_wrapping() {
    let wrapped = format!("{}\r\n{}\n{}", &BLOCK[..40], &BLOCK[40..90], &BLOCK[90..]);
    let parsed = parse_tr31(&wrapped).expect("parse should succeed");
    assert_eq!(parsed.encrypted_key, "E5E5E5E5E5E5E5E5E5E5E5E5");
}
