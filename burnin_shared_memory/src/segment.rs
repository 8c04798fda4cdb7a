//! Interface region segment structures and operations

use crate::error::{ShmError, ShmResult};
use crate::platform::{attach_region_mmap, create_region_mmap, current_pid};
use burnin::shm::consts::{INTERFACE_VERSION, SEGMENT_MAGIC, SEGMENT_SIZE};
use burnin::shm::layout::offsets;
use burnin::shm::strings::{clean_copy, decode_field};
use memmap2::MmapMut;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use std::sync::atomic::{Ordering, fence};
use std::time::SystemTime;
use tracing::{debug, info};

/// Directory holding region backing files.
const SHM_DIR: &str = "/dev/shm";

/// Prefix for all region backing files.
const FILE_PREFIX: &str = "burnin_";

/// Longest accepted segment name.
const MAX_NAME_LEN: usize = 64;

/// Path of the backing file for segment `name`.
pub fn region_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{SHM_DIR}/{FILE_PREFIX}{name}"))
}

/// Path of the JSON metadata sidecar for segment `name`.
pub fn metadata_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{SHM_DIR}/{FILE_PREFIX}{name}.meta"))
}

/// Validate that a segment name can be embedded in a `/dev/shm` file name.
pub fn validate_segment_name(name: &str) -> ShmResult<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ShmError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Descriptive sidecar written next to the backing file at creation time.
///
/// Not part of the wire contract; used by operators and tests to see who
/// created a region and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentMetadata {
    /// Segment name
    pub name: String,
    /// Region size in bytes
    pub size: usize,
    /// Pid of the creating harness process
    pub host_pid: u32,
    /// Creation timestamp
    pub created_at: SystemTime,
}

impl SegmentMetadata {
    /// Load the metadata sidecar for segment `name`.
    pub fn load(name: &str) -> ShmResult<Self> {
        validate_segment_name(name)?;
        let content = std::fs::read_to_string(metadata_path(name))?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A mapped interface region.
///
/// The harness side calls [`SharedSegment::create`] and owns the backing
/// file; the plugin side calls [`SharedSegment::open`]. All field access
/// goes through the typed accessors below, which serialize little-endian at
/// explicit byte offsets. No `repr(C)` reinterpret casts.
pub struct SharedSegment {
    name: String,
    mmap: MmapMut,
    owner: bool,
}

impl SharedSegment {
    /// Create a new interface region and initialize its header.
    ///
    /// Fails with [`ShmError::AlreadyExists`] if the backing file is
    /// already present. The creating process becomes the owner: dropping
    /// the returned segment removes the backing file and metadata sidecar.
    pub fn create(name: &str) -> ShmResult<Self> {
        validate_segment_name(name)?;

        let path = region_path(name);
        if path.exists() {
            return Err(ShmError::AlreadyExists {
                name: name.to_string(),
            });
        }

        let mmap = match create_region_mmap(&path, SEGMENT_SIZE) {
            Ok(mmap) => mmap,
            Err(ShmError::Io { source }) if source.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(ShmError::AlreadyExists {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let mut segment = Self {
            name: name.to_string(),
            mmap,
            owner: true,
        };

        let host_pid = current_pid();
        segment.write_bytes(offsets::MAGIC, &SEGMENT_MAGIC)?;
        segment.write_u32(offsets::LAYOUT_VERSION, INTERFACE_VERSION)?;
        segment.write_u32(offsets::HOST_PID, host_pid)?;

        // Header must be visible before any peer can observe the file.
        fence(Ordering::Release);

        segment.write_metadata(host_pid)?;

        info!(segment = name, size = SEGMENT_SIZE, "interface region created");
        Ok(segment)
    }

    /// Open an existing interface region and validate its header.
    ///
    /// The opener does not own the backing file; dropping the segment only
    /// unmaps it.
    pub fn open(name: &str) -> ShmResult<Self> {
        validate_segment_name(name)?;

        let path = region_path(name);
        let file_len = match std::fs::metadata(&path) {
            Ok(meta) => meta.len() as usize,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ShmError::NotFound {
                    name: name.to_string(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(ShmError::PermissionDenied {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        if file_len != SEGMENT_SIZE {
            return Err(ShmError::SizeMismatch {
                expected: SEGMENT_SIZE,
                actual: file_len,
            });
        }

        let mmap = match attach_region_mmap(&path) {
            Ok(mmap) => mmap,
            Err(ShmError::Io { source })
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                return Err(ShmError::PermissionDenied {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let segment = Self {
            name: name.to_string(),
            mmap,
            owner: false,
        };

        if segment.read_bytes(offsets::MAGIC, offsets::MAGIC_LEN)? != SEGMENT_MAGIC {
            return Err(ShmError::BadMagic);
        }
        let found = segment.read_u32(offsets::LAYOUT_VERSION)?;
        if found != INTERFACE_VERSION {
            return Err(ShmError::VersionMismatch {
                expected: INTERFACE_VERSION,
                found,
            });
        }

        debug!(segment = name, "interface region opened");
        Ok(segment)
    }

    /// Remove the backing file and metadata sidecar for segment `name`.
    ///
    /// Used to clear leftovers of a crashed run; missing files are not an
    /// error.
    pub fn unlink(name: &str) -> ShmResult<()> {
        validate_segment_name(name)?;
        for path in [region_path(name), metadata_path(name)] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Segment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` on the creating (harness) side.
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    /// Read a little-endian `u32` at `offset`.
    pub fn read_u32(&self, offset: usize) -> ShmResult<u32> {
        self.check_bounds(offset, 4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.mmap[offset..offset + 4]);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Write a little-endian `u32` at `offset`.
    pub fn write_u32(&mut self, offset: usize, value: u32) -> ShmResult<()> {
        self.check_bounds(offset, 4)?;
        self.mmap[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Read a little-endian `u64` at `offset`.
    pub fn read_u64(&self, offset: usize) -> ShmResult<u64> {
        self.check_bounds(offset, 8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.mmap[offset..offset + 8]);
        Ok(u64::from_le_bytes(bytes))
    }

    /// Write a little-endian `u64` at `offset`.
    pub fn write_u64(&mut self, offset: usize, value: u64) -> ShmResult<()> {
        self.check_bounds(offset, 8)?;
        self.mmap[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Borrow `len` raw bytes at `offset`.
    pub fn read_bytes(&self, offset: usize, len: usize) -> ShmResult<&[u8]> {
        self.check_bounds(offset, len)?;
        Ok(&self.mmap[offset..offset + len])
    }

    /// Write raw bytes at `offset`.
    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> ShmResult<()> {
        self.check_bounds(offset, bytes.len())?;
        self.mmap[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Decode the string field of capacity `cap` at `offset`.
    pub fn read_string(&self, offset: usize, cap: usize) -> ShmResult<String> {
        Ok(decode_field(self.read_bytes(offset, cap)?))
    }

    /// Sanitize `text` and store it in the string field of capacity `cap` at
    /// `offset`. Over-long text is truncated, not rejected. Returns the
    /// number of text bytes stored.
    pub fn write_string(&mut self, offset: usize, cap: usize, text: &str) -> ShmResult<usize> {
        self.check_bounds(offset, cap)?;
        Ok(clean_copy(&mut self.mmap[offset..offset + cap], text))
    }

    fn check_bounds(&self, offset: usize, len: usize) -> ShmResult<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.mmap.len() => Ok(()),
            _ => Err(ShmError::OutOfBounds { offset, len }),
        }
    }

    fn write_metadata(&self, host_pid: u32) -> ShmResult<()> {
        let metadata = SegmentMetadata {
            name: self.name.clone(),
            size: SEGMENT_SIZE,
            host_pid,
            created_at: SystemTime::now(),
        };
        let json = serde_json::to_string_pretty(&metadata)?;

        // A sidecar may survive a crashed harness; the backing file is the
        // exclusivity anchor, so a leftover here is ours to replace.
        let path = metadata_path(&self.name);
        let _ = std::fs::remove_file(&path);
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .mode(0o600)
            .open(&path)?;
        std::io::Write::write_all(&mut file, json.as_bytes())?;
        Ok(())
    }
}

impl Drop for SharedSegment {
    fn drop(&mut self) {
        if self.owner {
            let _ = std::fs::remove_file(region_path(&self.name));
            let _ = std::fs::remove_file(metadata_path(&self.name));
            debug!(segment = %self.name, "interface region removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert!(validate_segment_name("plugin_0").is_ok());
        assert!(validate_segment_name("disk-burnin-01").is_ok());

        assert!(validate_segment_name("").is_err());
        assert!(validate_segment_name("bad/name").is_err());
        assert!(validate_segment_name("bad name").is_err());
        assert!(validate_segment_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_paths_are_prefixed() {
        assert_eq!(
            region_path("p0"),
            PathBuf::from("/dev/shm/burnin_p0")
        );
        assert_eq!(
            metadata_path("p0"),
            PathBuf::from("/dev/shm/burnin_p0.meta")
        );
    }

    #[test]
    fn test_header_is_initialized_on_create() {
        let segment = SharedSegment::create("segment_unit_header").unwrap();

        assert_eq!(
            segment.read_bytes(offsets::MAGIC, offsets::MAGIC_LEN).unwrap(),
            SEGMENT_MAGIC
        );
        assert_eq!(
            segment.read_u32(offsets::LAYOUT_VERSION).unwrap(),
            INTERFACE_VERSION
        );
        assert_eq!(segment.read_u32(offsets::HOST_PID).unwrap(), current_pid());
        assert!(segment.is_owner());
    }

    #[test]
    fn test_bounds_are_enforced() {
        let mut segment = SharedSegment::create("segment_unit_bounds").unwrap();

        assert!(matches!(
            segment.read_u32(SEGMENT_SIZE),
            Err(ShmError::OutOfBounds { .. })
        ));
        assert!(matches!(
            segment.read_u64(SEGMENT_SIZE - 4),
            Err(ShmError::OutOfBounds { .. })
        ));
        assert!(matches!(
            segment.write_bytes(SEGMENT_SIZE - 2, &[0; 4]),
            Err(ShmError::OutOfBounds { .. })
        ));
        assert!(matches!(
            segment.read_bytes(usize::MAX, 8),
            Err(ShmError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_string_fields_roundtrip() {
        let mut segment = SharedSegment::create("segment_unit_strings").unwrap();

        let written = segment
            .write_string(offsets::STATUS_TEXT, 20, "Verifying")
            .unwrap();
        assert_eq!(written, 9);
        assert_eq!(
            segment.read_string(offsets::STATUS_TEXT, 20).unwrap(),
            "Verifying"
        );

        // Over-long text is cut, not rejected.
        let written = segment
            .write_string(offsets::STATUS_TEXT, 20, "a status line that does not fit")
            .unwrap();
        assert_eq!(written, 19);
    }

    #[test]
    fn test_metadata_sidecar() {
        let name = "segment_unit_meta";
        let _segment = SharedSegment::create(name).unwrap();

        let metadata = SegmentMetadata::load(name).unwrap();
        assert_eq!(metadata.name, name);
        assert_eq!(metadata.size, SEGMENT_SIZE);
        assert_eq!(metadata.host_pid, current_pid());
    }

    #[test]
    fn test_owner_drop_removes_files() {
        let name = "segment_unit_drop";
        {
            let _segment = SharedSegment::create(name).unwrap();
            assert!(region_path(name).exists());
            assert!(metadata_path(name).exists());
        }
        assert!(!region_path(name).exists());
        assert!(!metadata_path(name).exists());
    }
}
