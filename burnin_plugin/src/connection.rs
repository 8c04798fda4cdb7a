//! Plugin-side attachment to an existing interface region.
//!
//! The harness creates the region and the lock; the plugin receives the
//! segment name at launch and attaches here. Opening validates the magic,
//! layout version, and size, and registers this process as the attached
//! plugin. A name that does not resolve to a live region is a
//! [`PluginError::Connection`] and is never retried.

use std::time::Duration;

use burnin::shm::layout::offsets;
use burnin_shared_memory::platform::current_pid;
use burnin_shared_memory::{CrossProcessLock, SharedSegment};
use tracing::info;

use crate::error::PluginResult;

/// An attached but not yet initialized interface region.
///
/// Handed to [`PluginInterface::new`](crate::PluginInterface::new), which
/// consumes it and publishes the initial field values.
pub struct PluginConnection {
    pub(crate) segment: SharedSegment,
    pub(crate) lock: CrossProcessLock,
}

impl PluginConnection {
    /// Attach to the region `name` and record this process as its plugin.
    pub fn open(name: &str, lock_timeout: Duration) -> PluginResult<Self> {
        let mut segment = SharedSegment::open(name)?;
        let lock = CrossProcessLock::open(name)?;

        {
            let _guard = lock.acquire(lock_timeout)?;
            segment.write_u32(offsets::PLUGIN_PID, current_pid())?;
        }

        info!(segment = name, pid = current_pid(), "plugin attached");
        Ok(Self { segment, lock })
    }

    /// Name of the attached segment.
    pub fn name(&self) -> &str {
        self.segment.name()
    }

    /// Pid of the harness process that created the region.
    pub fn host_pid(&self) -> PluginResult<u32> {
        Ok(self.segment.read_u32(offsets::HOST_PID)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnin_shared_memory::{ShmError, ShmResult};
    use crate::error::PluginError;

    const TIMEOUT: Duration = Duration::from_millis(500);

    fn host_region(name: &str) -> ShmResult<(SharedSegment, CrossProcessLock)> {
        Ok((SharedSegment::create(name)?, CrossProcessLock::create(name)?))
    }

    #[test]
    fn conn_unit_open_registers_pid() {
        let name = "conn_unit_register";
        let (host, _lock) = host_region(name).unwrap();
        assert_eq!(host.read_u32(offsets::PLUGIN_PID).unwrap(), 0);

        let conn = PluginConnection::open(name, TIMEOUT).unwrap();
        assert_eq!(conn.name(), name);
        assert_eq!(conn.host_pid().unwrap(), current_pid());
        assert_eq!(host.read_u32(offsets::PLUGIN_PID).unwrap(), current_pid());
    }

    #[test]
    fn conn_unit_missing_region_is_connection_error() {
        match PluginConnection::open("conn_unit_missing", TIMEOUT) {
            Err(PluginError::Connection {
                source: ShmError::NotFound { name },
            }) => assert_eq!(name, "conn_unit_missing"),
            Err(other) => panic!("expected Connection(NotFound), got {other:?}"),
            Ok(_) => panic!("expected Connection(NotFound), got a connection"),
        }
    }

    #[test]
    fn conn_unit_missing_lock_is_connection_error() {
        let name = "conn_unit_no_lock";
        let _segment = SharedSegment::create(name).unwrap();

        assert!(matches!(
            PluginConnection::open(name, TIMEOUT),
            Err(PluginError::Connection {
                source: ShmError::NotFound { .. }
            })
        ));
    }
}
