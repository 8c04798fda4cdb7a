//! Linux-specific shared memory operations

use crate::error::ShmResult;
use memmap2::{MmapMut, MmapOptions};
use nix::unistd::getpid;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Create the backing file for a region and map it read/write.
///
/// The file must not exist yet; creation is exclusive so two processes
/// cannot both initialize the same region. Pages are populated up front to
/// keep later field access off the page-fault path.
pub fn create_region_mmap(path: &Path, size: usize) -> ShmResult<MmapMut> {
    let file = OpenOptions::new()
        .create_new(true)
        .read(true)
        .write(true)
        .mode(0o600) // Owner read/write only
        .open(path)?;

    file.set_len(size as u64)?;

    let mmap = unsafe { MmapOptions::new().populate().map_mut(&file)? };
    Ok(mmap)
}

/// Map an existing region file read/write.
pub fn attach_region_mmap(path: &Path) -> ShmResult<MmapMut> {
    let file = OpenOptions::new().read(true).write(true).open(path)?;

    let mmap = unsafe { MmapOptions::new().map_mut(&file)? };
    Ok(mmap)
}

/// Check if a process is alive using the null signal.
pub fn is_process_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    // A null signal tests for existence without delivering anything.
    match kill(Pid::from_raw(pid as i32), None) {
        Ok(_) => true,
        Err(nix::Error::ESRCH) => false, // No such process
        Err(nix::Error::EPERM) => true,  // Process exists but owned by someone else
        Err(_) => false,
    }
}

/// Get current process ID
pub fn current_pid() -> u32 {
    getpid().as_raw() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShmError;

    #[test]
    fn test_current_process_is_alive() {
        assert!(is_process_alive(current_pid()));
    }

    #[test]
    fn test_impossible_pid_is_dead() {
        // Linux pids cap at 2^22; this one can never exist.
        assert!(!is_process_alive(u32::MAX / 2));
    }

    #[test]
    fn test_create_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region");

        let first = create_region_mmap(&path, 4096);
        assert!(first.is_ok());

        let second = create_region_mmap(&path, 4096);
        assert!(matches!(second, Err(ShmError::Io { .. })));
    }

    #[test]
    fn test_attach_maps_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region");

        let mut created = create_region_mmap(&path, 4096).unwrap();
        created[0] = 0xA5;
        created.flush().unwrap();

        let attached = attach_region_mmap(&path).unwrap();
        assert_eq!(attached.len(), 4096);
        assert_eq!(attached[0], 0xA5);
    }
}
