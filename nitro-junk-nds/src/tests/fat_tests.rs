use super::*;

/// Lay out FAT records at `offset` inside a zeroed ROM of `rom_len` bytes.
fn make_fat(rom_len: usize, offset: usize, records: &[(u32, u32)]) -> Vec<u8> {
    let mut rom = vec![0u8; rom_len];
    for (i, (start, end)) in records.iter().enumerate() {
        let at = offset + i * FAT_RECORD_SIZE;
        rom[at..at + 4].copy_from_slice(&start.to_le_bytes());
        rom[at + 4..at + 8].copy_from_slice(&end.to_le_bytes());
    }
    rom
}

#[test]
fn test_one_entry_per_record() {
    let records = [(0x200, 0x210), (0x210, 0x300), (0x300, 0x301)];
    let rom = make_fat(0x400, 0x100, &records);
    let fat = decode_fat(&rom, 0x100, 24).unwrap();

    assert_eq!(fat.len(), 3);
    assert_eq!(fat[0], FatEntry { start: 0x200, end: 0x210 });
    assert_eq!(fat[2].len(), 1);
}

#[test]
fn test_zero_records_keep_their_index() {
    let records = [(0x200, 0x210), (0, 0), (0x300, 0x320)];
    let rom = make_fat(0x400, 0x100, &records);

    let fat = decode_fat(&rom, 0x100, 24).unwrap();
    assert_eq!(fat.len(), 3);
    assert!(fat[1].is_empty());
    assert_eq!(fat[2].start, 0x300);

    let legacy = decode_fat_with_policy(&rom, 0x100, 24, FatPolicy::SkipEmpty).unwrap();
    assert_eq!(legacy.len(), 2);
    assert_eq!(legacy[1].start, 0x300);
}

#[test]
fn test_empty_table() {
    let rom = vec![0u8; 0x10];
    assert_eq!(decode_fat(&rom, 0, 0).unwrap(), Vec::new());
}

#[test]
fn test_length_not_multiple_of_eight() {
    let rom = vec![0u8; 0x100];
    assert_eq!(
        decode_fat(&rom, 0, 12),
        Err(DecodeError::MalformedTable {
            table: "FAT",
            len: 12,
            record_size: 8
        })
    );
}

#[test]
fn test_table_past_end_of_rom() {
    let rom = vec![0u8; 0x100];
    assert!(matches!(
        decode_fat(&rom, 0xF8, 16),
        Err(DecodeError::TruncatedInput { what: "FAT", .. })
    ));
}

#[test]
fn test_entry_data() {
    let mut rom = make_fat(0x400, 0x100, &[(0x200, 0x204)]);
    rom[0x200..0x204].copy_from_slice(b"DATA");
    let fat = decode_fat(&rom, 0x100, 8).unwrap();

    assert_eq!(fat[0].data(&rom).unwrap(), b"DATA");
}

#[test]
fn test_entry_data_out_of_range() {
    let rom = vec![0u8; 0x100];
    let beyond = FatEntry { start: 0xF0, end: 0x110 };
    assert!(beyond.data(&rom).is_err());

    let inverted = FatEntry { start: 0x20, end: 0x10 };
    assert!(inverted.data(&rom).is_err());
}
