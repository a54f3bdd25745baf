use std::fmt;

use crate::error::DeviceError;

/// Identifies whoever holds a device. On the console this is a process, in tests any
/// number will do to simulate several processes competing for the same device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u32);

impl OwnerId {
    pub const fn new(id: u32) -> Self {
        OwnerId(id)
    }

    /// The id of the calling OS process.
    pub fn current_process() -> Self {
        OwnerId(std::process::id())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner #{}", self.0)
    }
}

/// All-or-nothing writer lock of a single device.
#[derive(Debug, Default)]
pub struct DeviceLock {
    owner: Option<OwnerId>,
}

impl DeviceLock {
    pub fn new() -> Self {
        DeviceLock { owner: None }
    }

    /// Unlocked -> Locked(owner). A held lock is never shared, not even with its own owner.
    pub fn acquire(&mut self, owner: OwnerId) -> Result<(), DeviceError> {
        match self.owner {
            Some(current) => Err(DeviceError::OwnershipConflict { owner: current }),
            None => {
                self.owner = Some(owner);
                Ok(())
            }
        }
    }

    /// Locked(owner) -> Unlocked.
    ///
    /// Returns `false` and leaves the lock untouched when `owner` does not hold it.
    pub fn release(&mut self, owner: OwnerId) -> bool {
        if self.owner == Some(owner) {
            self.owner = None;
            true
        } else {
            log::warn!("{} tried to release a lock held by {:?}", owner, self.owner);
            false
        }
    }

    #[inline]
    pub fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.owner.is_some()
    }
}
