use super::*;

/// A 36-byte module parameters record.
fn params_record(compressed_end: u32) -> Vec<u8> {
    [
        0x0200_1000,
        0x0200_1018,
        0x0200_2000,
        0x0200_8000,
        0x0200_9000,
        compressed_end,
        0x0402_7531,
        NITRO_CODE_BE,
        NITRO_CODE_LE,
    ]
    .iter()
    .flat_map(|w: &u32| w.to_le_bytes())
    .collect()
}

/// 20 bytes of uncompressed head, then 64 bytes of 0xAA compressed to 11.
fn compressed_blob() -> Vec<u8> {
    let mut blob: Vec<u8> = (0u8..20).collect();
    blob.extend_from_slice(&[
        0x00, 0x50, 0x00, 0xF0, 0x00, 0xF0, 0x00, 0xF0, 0xAA, 0xAA, 0x3C,
    ]);
    blob.extend_from_slice(&((8u32 << 24) | 19).to_le_bytes());
    blob.extend_from_slice(&45u32.to_le_bytes());
    blob
}

#[test]
fn test_locate_fields() {
    let mut blob = vec![0xEEu8; 0x40];
    blob.extend(params_record(0x0210_0000));

    let params = ModuleParams::locate(&blob).unwrap();
    assert_eq!(params.autoload_list_start, 0x0200_1000);
    assert_eq!(params.static_bss_end, 0x0200_9000);
    assert_eq!(params.compressed_static_end, 0x0210_0000);
    assert!(params.is_compressed());
    assert!(params.has_nitro_code());
    assert_eq!(params.sdk_version_string(), "4.2.30001");
}

#[test]
fn test_not_compressed_is_returned_unchanged() {
    let mut blob = vec![0x12u8; 0x40];
    blob.extend(params_record(0));

    let (out, was_compressed) = decompress_if_needed(&blob).unwrap();
    assert!(!was_compressed);
    assert_eq!(out, blob);
}

#[test]
fn test_blob_too_short_for_params() {
    let blob = vec![0u8; MODULE_PARAMS_SIZE - 1];
    assert!(matches!(
        decompress_if_needed(&blob),
        Err(DecodeError::TruncatedInput { what: "module parameters", .. })
    ));
}

#[test]
fn test_compressed_blob_is_expanded_and_flag_cleared() {
    let blob = compressed_blob();
    // flag word sits at len - 36 + 0x14 = 23 and is non-zero
    assert_ne!(ModuleParams::locate(&blob).unwrap().compressed_static_end, 0);

    let (out, was_compressed) = decompress_if_needed(&blob).unwrap();
    assert!(was_compressed);
    assert_eq!(out.len(), 84);
    assert_eq!(&out[..20], (0u8..20).collect::<Vec<_>>().as_slice());

    let flag_at = 84 - 36 + 0x14;
    assert_eq!(&out[flag_at..flag_at + 4], &[0, 0, 0, 0]);
    for (i, &b) in out.iter().enumerate().skip(20) {
        if !(flag_at..flag_at + 4).contains(&i) {
            assert_eq!(b, 0xAA, "byte {i}");
        }
    }
    assert!(!ModuleParams::locate(&out).unwrap().is_compressed());
}

#[test]
fn test_decompression_failure_is_an_error() {
    let mut blob = compressed_blob();
    // corrupt the header length in the footer
    let n = blob.len();
    blob[n - 5] = 0x40;

    assert!(matches!(
        decompress_if_needed(&blob),
        Err(DecodeError::UnsupportedCompressionVariant(_))
    ));
}
