use super::*;

fn record(fields: [u32; 8]) -> Vec<u8> {
    fields.iter().flat_map(|f| f.to_le_bytes()).collect()
}

#[test]
fn test_empty_table() {
    let rom = vec![0u8; 0x10];
    assert_eq!(decode_overlay_table(&rom, 0, 0).unwrap(), Vec::new());
    // offset is irrelevant for an empty table
    assert_eq!(decode_overlay_table(&rom, 0xFFFF_0000, 0).unwrap(), Vec::new());
}

#[test]
fn test_decode_records() {
    let mut rom = vec![0u8; 0x20];
    rom.extend(record([0, 0x0210_0000, 0x1000, 0x200, 0x0210_0F00, 0x0210_0F04, 5, 0]));
    rom.extend(record([1, 0x0210_0000, 0x800, 0, 0, 0, 6, 0x0100_0400]));

    let overlays = decode_overlay_table(&rom, 0x20, 64).unwrap();
    assert_eq!(overlays.len(), 2);
    assert_eq!(
        overlays[0],
        OverlayEntry {
            overlay_id: 0,
            ram_address: 0x0210_0000,
            ram_size: 0x1000,
            bss_size: 0x200,
            static_initializer_start: 0x0210_0F00,
            static_initializer_end: 0x0210_0F04,
            file_id: 5,
            reserved: 0,
        }
    );
    assert!(!overlays[0].is_compressed());
    assert_eq!(overlays[1].file_id, 6);
    assert!(overlays[1].is_compressed());
    assert_eq!(overlays[1].compressed_size(), 0x400);
}

#[test]
fn test_length_not_multiple_of_32() {
    let rom = vec![0u8; 0x100];
    assert_eq!(
        decode_overlay_table(&rom, 0, 40),
        Err(DecodeError::MalformedTable {
            table: "overlay table",
            len: 40,
            record_size: 32
        })
    );
}

#[test]
fn test_table_past_end() {
    let rom = vec![0u8; 0x30];
    assert!(matches!(
        decode_overlay_table(&rom, 0x20, 32),
        Err(DecodeError::TruncatedInput { .. })
    ));
}

#[test]
fn test_load_plain_overlay() {
    let mut rom = vec![0u8; 0x40];
    rom[0x30..0x34].copy_from_slice(b"CODE");
    let fat = [FatEntry::default(), FatEntry { start: 0x30, end: 0x34 }];
    let entry = OverlayEntry {
        file_id: 1,
        ..Default::default()
    };

    let (data, decompressed) = load_overlay(&rom, &fat, &entry).unwrap();
    assert_eq!(data, b"CODE");
    assert!(!decompressed);
}

#[test]
fn test_load_compressed_overlay() {
    // 64 bytes of 0xAA, see the blz tests for the stream layout
    let mut file = vec![
        0x00, 0x50, 0x00, 0xF0, 0x00, 0xF0, 0x00, 0xF0, 0xAA, 0xAA, 0x3C,
    ];
    file.extend_from_slice(&((8u32 << 24) | 19).to_le_bytes());
    file.extend_from_slice(&45u32.to_le_bytes());

    let mut rom = vec![0u8; 0x100];
    rom[0x80..0x80 + file.len()].copy_from_slice(&file);
    let fat = [FatEntry {
        start: 0x80,
        end: 0x80 + file.len() as u32,
    }];
    let entry = OverlayEntry {
        file_id: 0,
        reserved: COMPRESSED_FLAG | file.len() as u32,
        ..Default::default()
    };

    let (data, decompressed) = load_overlay(&rom, &fat, &entry).unwrap();
    assert!(decompressed);
    assert_eq!(data, vec![0xAA; 64]);
}

#[test]
fn test_load_overlay_missing_file() {
    let rom = vec![0u8; 0x40];
    let entry = OverlayEntry {
        file_id: 3,
        ..Default::default()
    };
    assert!(load_overlay(&rom, &[], &entry).is_err());
}
