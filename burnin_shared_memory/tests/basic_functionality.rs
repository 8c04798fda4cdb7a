//! Basic functionality tests for the interface region

use burnin::shm::consts::{MAX_DISPLAY_TEXT, MAX_ERROR_TEXT, SEGMENT_SIZE};
use burnin::shm::layout::{offsets, slot, user_field_offset};
use burnin_shared_memory::{SegmentMetadata, SharedSegment, ShmError, ShmResult};

#[test]
fn test_create_open_roundtrip() -> ShmResult<()> {
    let name = "shm_it_roundtrip";
    let mut created = SharedSegment::create(name)?;

    created.write_u32(offsets::DUTY_CYCLE, 60)?;
    created.write_u64(offsets::WRITE_OPS, 1_000_000)?;
    created.write_string(offsets::WINDOW_TITLE, MAX_DISPLAY_TEXT, "Disk Burn-In")?;

    let opened = SharedSegment::open(name)?;
    assert!(!opened.is_owner());
    assert_eq!(opened.read_u32(offsets::DUTY_CYCLE)?, 60);
    assert_eq!(opened.read_u64(offsets::WRITE_OPS)?, 1_000_000);
    assert_eq!(
        opened.read_string(offsets::WINDOW_TITLE, MAX_DISPLAY_TEXT)?,
        "Disk Burn-In"
    );
    Ok(())
}

#[test]
fn test_writes_are_visible_across_mappings() -> ShmResult<()> {
    let name = "shm_it_visibility";
    let mut created = SharedSegment::create(name)?;
    let opened = SharedSegment::open(name)?;

    for cycle in 1..=10u32 {
        created.write_u32(offsets::CYCLE, cycle)?;
        created.write_u64(offsets::VERIFY_OPS, u64::from(cycle) * 7)?;
        assert_eq!(opened.read_u32(offsets::CYCLE)?, cycle);
        assert_eq!(opened.read_u64(offsets::VERIFY_OPS)?, u64::from(cycle) * 7);
    }
    Ok(())
}

#[test]
fn test_user_field_slots_are_independent() -> ShmResult<()> {
    let name = "shm_it_user_fields";
    let mut segment = SharedSegment::create(name)?;

    for index in 0..6 {
        let base = user_field_offset(index);
        segment.write_u32(base + slot::ID, index as u32 + 1)?;
        segment.write_string(
            base + slot::LABEL,
            MAX_DISPLAY_TEXT,
            &format!("Field {}", index + 1),
        )?;
        segment.write_string(base + slot::VALUE, MAX_DISPLAY_TEXT, "Ready")?;
    }

    let opened = SharedSegment::open(name)?;
    for index in 0..6 {
        let base = user_field_offset(index);
        assert_eq!(opened.read_u32(base + slot::ID)?, index as u32 + 1);
        assert_eq!(
            opened.read_string(base + slot::LABEL, MAX_DISPLAY_TEXT)?,
            format!("Field {}", index + 1)
        );
        assert_eq!(
            opened.read_string(base + slot::VALUE, MAX_DISPLAY_TEXT)?,
            "Ready"
        );
    }
    Ok(())
}

#[test]
fn test_long_error_text_is_truncated() -> ShmResult<()> {
    let name = "shm_it_truncation";
    let mut segment = SharedSegment::create(name)?;

    let long = "verify mismatch: ".repeat(20);
    let written = segment.write_string(offsets::ERROR_MESSAGE, MAX_ERROR_TEXT, &long)?;
    assert_eq!(written, MAX_ERROR_TEXT - 1);

    let stored = segment.read_string(offsets::ERROR_MESSAGE, MAX_ERROR_TEXT)?;
    assert_eq!(stored.len(), MAX_ERROR_TEXT - 1);
    assert!(long.starts_with(&stored));
    Ok(())
}

#[test]
fn test_double_create_is_rejected() -> ShmResult<()> {
    let name = "shm_it_double_create";
    let _first = SharedSegment::create(name)?;

    match SharedSegment::create(name) {
        Err(ShmError::AlreadyExists { name: n }) => assert_eq!(n, name),
        other => panic!("expected AlreadyExists, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

#[test]
fn test_open_missing_segment() {
    match SharedSegment::open("shm_it_never_created") {
        Err(ShmError::NotFound { name }) => assert_eq!(name, "shm_it_never_created"),
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_open_rejects_corrupt_magic() -> ShmResult<()> {
    let name = "shm_it_bad_magic";
    let _created = SharedSegment::create(name)?;

    // Scribble over the magic through the backing file, as a stray writer
    // would.
    let path = burnin_shared_memory::segment::region_path(name);
    let mut raw = std::fs::OpenOptions::new().write(true).open(&path)?;
    std::io::Write::write_all(&mut raw, b"XXXXXXXX")?;

    assert!(matches!(SharedSegment::open(name), Err(ShmError::BadMagic)));
    Ok(())
}

#[test]
fn test_open_rejects_wrong_size() -> ShmResult<()> {
    let name = "shm_it_bad_size";
    let path = burnin_shared_memory::segment::region_path(name);

    // A half-written region from some other tool.
    std::fs::write(&path, vec![0u8; SEGMENT_SIZE / 2])?;

    match SharedSegment::open(name) {
        Err(ShmError::SizeMismatch { expected, actual }) => {
            assert_eq!(expected, SEGMENT_SIZE);
            assert_eq!(actual, SEGMENT_SIZE / 2);
        }
        other => panic!("expected SizeMismatch, got {:?}", other.map(|_| ())),
    }

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_unlink_clears_leftovers() -> ShmResult<()> {
    let name = "shm_it_unlink";
    {
        let segment = SharedSegment::create(name)?;
        // Forget the segment so Drop does not clean up, like a crashed
        // harness.
        std::mem::forget(segment);
    }
    assert!(burnin_shared_memory::segment::region_path(name).exists());

    SharedSegment::unlink(name)?;
    assert!(!burnin_shared_memory::segment::region_path(name).exists());

    // Unlinking again is fine.
    SharedSegment::unlink(name)?;

    assert!(SharedSegment::create(name).is_ok());
    Ok(())
}

#[test]
fn test_metadata_matches_creator() -> ShmResult<()> {
    let name = "shm_it_metadata";
    let _segment = SharedSegment::create(name)?;

    let metadata = SegmentMetadata::load(name)?;
    assert_eq!(metadata.name, name);
    assert_eq!(metadata.size, SEGMENT_SIZE);
    assert_eq!(
        metadata.host_pid,
        burnin_shared_memory::platform::current_pid()
    );
    Ok(())
}

#[test]
fn test_invalid_names_are_rejected() {
    for bad in ["", "no/slashes", "no spaces", "no\0nul"] {
        assert!(matches!(
            SharedSegment::create(bad),
            Err(ShmError::InvalidName { .. })
        ));
        assert!(matches!(
            SharedSegment::open(bad),
            Err(ShmError::InvalidName { .. })
        ));
    }
}
