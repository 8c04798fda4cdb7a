//! Cross-process mutual exclusion for the interface region

use crate::error::{LockError, ShmError, ShmResult};
use crate::platform::{attach_region_mmap, create_region_mmap, current_pid, is_process_alive};
use burnin::shm::consts::{INTERFACE_VERSION, LOCK_MAGIC, LOCK_REGION_SIZE};
use burnin::shm::layout::lock as layout;
use memmap2::MmapMut;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering, fence};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Poll interval while waiting for a held lock.
const RETRY_INTERVAL: Duration = Duration::from_micros(500);

/// Path of the lock region file for segment `name`.
pub fn lock_path(name: &str) -> PathBuf {
    PathBuf::from(format!("/dev/shm/burnin_{name}.lock"))
}

/// Advisory lock shared by the harness and plugin processes.
///
/// The owner word holds the pid of the current holder, or zero when free.
/// Acquisition is a compare-and-swap on that word; if the recorded holder
/// has died the word is reclaimed instead of waiting out the timeout.
///
/// Holding the lock is represented by a [`LockGuard`]; release happens on
/// drop, so every exit path out of a locked section releases.
pub struct CrossProcessLock {
    name: String,
    mmap: MmapMut,
    owner: bool,
}

impl CrossProcessLock {
    /// Create the lock region for segment `name` and initialize its header.
    ///
    /// The creating process owns the backing file and removes it on drop.
    pub fn create(name: &str) -> ShmResult<Self> {
        crate::segment::validate_segment_name(name)?;

        let path = lock_path(name);
        if path.exists() {
            return Err(ShmError::AlreadyExists {
                name: name.to_string(),
            });
        }

        let mut mmap = match create_region_mmap(&path, LOCK_REGION_SIZE) {
            Ok(mmap) => mmap,
            Err(ShmError::Io { source }) if source.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(ShmError::AlreadyExists {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        mmap[layout::MAGIC..layout::MAGIC + LOCK_MAGIC.len()].copy_from_slice(&LOCK_MAGIC);
        mmap[layout::LAYOUT_VERSION..layout::LAYOUT_VERSION + 4]
            .copy_from_slice(&INTERFACE_VERSION.to_le_bytes());
        fence(Ordering::Release);

        debug!(segment = name, "lock region created");
        Ok(Self {
            name: name.to_string(),
            mmap,
            owner: true,
        })
    }

    /// Open the existing lock region for segment `name` and validate its
    /// header.
    pub fn open(name: &str) -> ShmResult<Self> {
        crate::segment::validate_segment_name(name)?;

        let path = lock_path(name);
        let file_len = match std::fs::metadata(&path) {
            Ok(meta) => meta.len() as usize,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ShmError::NotFound {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        if file_len != LOCK_REGION_SIZE {
            return Err(ShmError::SizeMismatch {
                expected: LOCK_REGION_SIZE,
                actual: file_len,
            });
        }

        let mmap = attach_region_mmap(&path)?;
        if mmap[layout::MAGIC..layout::MAGIC + LOCK_MAGIC.len()] != LOCK_MAGIC {
            return Err(ShmError::BadMagic);
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&mmap[layout::LAYOUT_VERSION..layout::LAYOUT_VERSION + 4]);
        let found = u32::from_le_bytes(version);
        if found != INTERFACE_VERSION {
            return Err(ShmError::VersionMismatch {
                expected: INTERFACE_VERSION,
                found,
            });
        }

        Ok(Self {
            name: name.to_string(),
            mmap,
            owner: false,
        })
    }

    /// Remove the lock region file for segment `name`; missing files are
    /// not an error.
    pub fn unlink(name: &str) -> ShmResult<()> {
        crate::segment::validate_segment_name(name)?;
        match std::fs::remove_file(lock_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Acquire the lock, waiting at most `timeout`.
    ///
    /// Returns [`LockError::AlreadyHeld`] if this process is the recorded
    /// holder and [`LockError::Timeout`] when a live holder keeps the lock
    /// for the whole window. A dead holder's word is reclaimed immediately.
    pub fn acquire(&self, timeout: Duration) -> Result<LockGuard<'_>, LockError> {
        let me = current_pid();
        let word = self.owner_word();
        let deadline = Instant::now() + timeout;

        loop {
            match word.compare_exchange(0, me, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Ok(LockGuard { word, pid: me }),
                Err(holder) if holder == me => {
                    return Err(LockError::AlreadyHeld { pid: holder });
                }
                Err(holder) => {
                    if !is_process_alive(holder)
                        && word
                            .compare_exchange(holder, me, Ordering::AcqRel, Ordering::Acquire)
                            .is_ok()
                    {
                        warn!(segment = %self.name, holder, "reclaimed lock from dead process");
                        return Ok(LockGuard { word, pid: me });
                    }
                }
            }

            if Instant::now() >= deadline {
                return Err(LockError::Timeout { waited: timeout });
            }
            std::thread::sleep(RETRY_INTERVAL);
        }
    }

    /// Pid of the current holder, if any.
    pub fn holder(&self) -> Option<u32> {
        match self.owner_word().load(Ordering::Acquire) {
            0 => None,
            pid => Some(pid),
        }
    }

    // Same shared-mapping cast the segment header uses; offset 12 keeps the
    // word 4-byte aligned from the page-aligned mapping.
    fn owner_word(&self) -> &AtomicU32 {
        unsafe { &*(self.mmap.as_ptr().add(layout::OWNER_PID) as *const AtomicU32) }
    }
}

impl Drop for CrossProcessLock {
    fn drop(&mut self) {
        if self.owner {
            let _ = std::fs::remove_file(lock_path(&self.name));
        }
    }
}

/// Scoped proof of lock ownership; releases on drop.
#[derive(Debug)]
pub struct LockGuard<'a> {
    word: &'a AtomicU32,
    pid: u32,
}

impl LockGuard<'_> {
    /// Pid recorded as holder, always the calling process.
    pub fn holder_pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.word.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(50);

    #[test]
    fn test_acquire_and_release() {
        let lock = CrossProcessLock::create("lock_unit_roundtrip").unwrap();
        assert_eq!(lock.holder(), None);

        {
            let guard = lock.acquire(SHORT).unwrap();
            assert_eq!(guard.holder_pid(), current_pid());
            assert_eq!(lock.holder(), Some(current_pid()));
        }

        // Guard drop released the word; a fresh acquire succeeds.
        assert_eq!(lock.holder(), None);
        let _guard = lock.acquire(SHORT).unwrap();
    }

    #[test]
    fn test_reacquire_while_held_is_already_held() {
        let lock = CrossProcessLock::create("lock_unit_reacquire").unwrap();
        let _guard = lock.acquire(SHORT).unwrap();

        match lock.acquire(SHORT) {
            Err(LockError::AlreadyHeld { pid }) => assert_eq!(pid, current_pid()),
            other => panic!("expected AlreadyHeld, got {other:?}"),
        }
    }

    #[test]
    fn test_live_foreign_holder_times_out() {
        let lock = CrossProcessLock::create("lock_unit_timeout").unwrap();

        // Pid 1 always exists and is never us, so the word looks held by a
        // live peer.
        lock.owner_word().store(1, Ordering::Release);

        let started = Instant::now();
        match lock.acquire(SHORT) {
            Err(LockError::Timeout { waited }) => assert_eq!(waited, SHORT),
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert!(started.elapsed() >= SHORT);

        lock.owner_word().store(0, Ordering::Release);
    }

    #[test]
    fn test_dead_holder_is_reclaimed() {
        let lock = CrossProcessLock::create("lock_unit_reclaim").unwrap();

        // No process can have this pid (Linux pids cap at 2^22).
        lock.owner_word().store(u32::MAX / 2, Ordering::Release);

        let guard = lock.acquire(SHORT).unwrap();
        assert_eq!(guard.holder_pid(), current_pid());
    }

    #[test]
    fn test_open_validates_header() {
        let created = CrossProcessLock::create("lock_unit_open").unwrap();

        let opened = CrossProcessLock::open("lock_unit_open").unwrap();
        assert_eq!(opened.holder(), None);

        // Opener must not acquire through a held lock.
        let _guard = created.acquire(SHORT).unwrap();
        assert_eq!(opened.holder(), Some(current_pid()));

        assert!(matches!(
            CrossProcessLock::open("lock_unit_missing"),
            Err(ShmError::NotFound { .. })
        ));
    }
}
