//! Notification flags shared with the harness.

use bitflags::bitflags;

bitflags! {
    /// Flag bits in the interface region's `flags` word.
    ///
    /// The plugin raises bits when it publishes something new; the harness
    /// clears the notification bits after consuming them. `DISPLAY_TEXT_SET`
    /// and `TEST_STOPPED` are level flags, not notifications.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InterfaceFlags: u32 {
        /// Window title and operation labels have been written.
        const DISPLAY_TEXT_SET  = 0x0000_0001;
        /// An error was latched since the harness last looked.
        const NEW_ERROR         = 0x0000_0002;
        /// Status code or text changed since the harness last looked.
        const NEW_STATUS        = 0x0000_0004;
        /// User field slot 1 has a new value.
        const NEW_USER_VALUE_1  = 0x0000_0008;
        /// User field slot 2 has a new value.
        const NEW_USER_VALUE_2  = 0x0000_0010;
        /// The plugin finished its run and detached.
        const TEST_STOPPED      = 0x0000_0020;
    }
}

impl InterfaceFlags {
    /// Mask of the bits the harness clears after consuming them.
    pub const NOTIFICATION_MASK: Self = Self::from_bits_truncate(
        Self::NEW_ERROR.bits()
            | Self::NEW_STATUS.bits()
            | Self::NEW_USER_VALUE_1.bits()
            | Self::NEW_USER_VALUE_2.bits(),
    );

    /// Returns the new-value flag for a user field slot id, if that slot has
    /// one. Only slots 1 and 2 are surfaced in the harness UI.
    #[inline]
    pub const fn new_value_flag(slot_id: u32) -> Option<Self> {
        match slot_id {
            1 => Some(Self::NEW_USER_VALUE_1),
            2 => Some(Self::NEW_USER_VALUE_2),
            _ => None,
        }
    }

    /// Returns `true` if any notification bit is set.
    #[inline]
    pub fn has_notification(self) -> bool {
        self.intersects(Self::NOTIFICATION_MASK)
    }
}

impl Default for InterfaceFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_mask_excludes_level_flags() {
        assert!(!InterfaceFlags::NOTIFICATION_MASK.contains(InterfaceFlags::DISPLAY_TEXT_SET));
        assert!(!InterfaceFlags::NOTIFICATION_MASK.contains(InterfaceFlags::TEST_STOPPED));
        assert!(InterfaceFlags::NOTIFICATION_MASK.contains(InterfaceFlags::NEW_ERROR));
        assert!(InterfaceFlags::NOTIFICATION_MASK.contains(InterfaceFlags::NEW_STATUS));
    }

    #[test]
    fn only_slots_one_and_two_have_flags() {
        assert_eq!(
            InterfaceFlags::new_value_flag(1),
            Some(InterfaceFlags::NEW_USER_VALUE_1)
        );
        assert_eq!(
            InterfaceFlags::new_value_flag(2),
            Some(InterfaceFlags::NEW_USER_VALUE_2)
        );
        assert_eq!(InterfaceFlags::new_value_flag(0), None);
        assert_eq!(InterfaceFlags::new_value_flag(3), None);
        assert_eq!(InterfaceFlags::new_value_flag(6), None);
    }

    #[test]
    fn notification_detection() {
        let mut flags = InterfaceFlags::DISPLAY_TEXT_SET;
        assert!(!flags.has_notification());
        flags |= InterfaceFlags::NEW_STATUS;
        assert!(flags.has_notification());
        flags.remove(InterfaceFlags::NOTIFICATION_MASK);
        assert!(!flags.has_notification());
        assert!(flags.contains(InterfaceFlags::DISPLAY_TEXT_SET));
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(InterfaceFlags::default(), InterfaceFlags::empty());
    }

    #[test]
    fn bits_roundtrip_through_raw_word() {
        let flags = InterfaceFlags::NEW_ERROR | InterfaceFlags::TEST_STOPPED;
        let raw = flags.bits();
        assert_eq!(InterfaceFlags::from_bits_truncate(raw), flags);
        // Unknown bits from a peer are dropped, not an error.
        assert_eq!(
            InterfaceFlags::from_bits_truncate(raw | 0x8000_0000),
            flags
        );
    }
}
