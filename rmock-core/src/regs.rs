use crate::constants::{layout, MIN_REGISTER_FILE_LEN};

use log::error;

/// Byte-addressable backing storage for the emulated register file.
///
/// 16-bit accesses are little-endian, matching what the device side writes
/// into the shared file. Implementations provide no synchronization: both
/// sides rely on the status-set-before-signal / status-clear-before-handled
/// ordering instead of locks.
pub trait RegisterBlock {
    fn len(&self) -> usize;
    fn read8(&self, offset: u16) -> u8;
    fn write8(&mut self, offset: u16, value: u8);
    fn read16(&self, offset: u16) -> u16;
    fn write16(&mut self, offset: u16, value: u16);
}

/// Plain in-memory register block. Stands in for the shared mapping when
/// both sides live in one process, which is how the test suite runs
/// several emulated devices side by side.
pub struct MemBlock {
    bytes: [u8; MIN_REGISTER_FILE_LEN],
}

impl MemBlock {
    pub fn new() -> Self {
        Self {
            bytes: [0; MIN_REGISTER_FILE_LEN],
        }
    }

    /// Raw view of the backing bytes, for layout assertions
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for MemBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBlock for MemBlock {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn read8(&self, offset: u16) -> u8 {
        let idx = offset as usize;
        if idx >= self.bytes.len() {
            error!("Out-of-range register read (offset 0x{:x})", offset);
            return 0;
        }
        self.bytes[idx]
    }

    fn write8(&mut self, offset: u16, value: u8) {
        let idx = offset as usize;
        if idx >= self.bytes.len() {
            error!("Out-of-range register write (offset 0x{:x})", offset);
            return;
        }
        self.bytes[idx] = value;
    }

    fn read16(&self, offset: u16) -> u16 {
        let idx = offset as usize;
        if idx + 1 >= self.bytes.len() {
            error!("Out-of-range register read (offset 0x{:x})", offset);
            return 0;
        }
        u16::from_le_bytes([self.bytes[idx], self.bytes[idx + 1]])
    }

    fn write16(&mut self, offset: u16, value: u16) {
        let idx = offset as usize;
        if idx + 1 >= self.bytes.len() {
            error!("Out-of-range register write (offset 0x{:x})", offset);
            return;
        }
        let le = value.to_le_bytes();
        self.bytes[idx] = le[0];
        self.bytes[idx + 1] = le[1];
    }
}

/// Named accessors over the raw register layout.
///
/// Widths are explicit per register: mask and status are 16 bit, the PHY
/// status register is 8 bit. This type is the only place that touches raw
/// offsets; everything above it works with named operations.
pub struct Registers<B> {
    block: B,
}

impl<B: RegisterBlock> Registers<B> {
    pub fn new(block: B) -> Self {
        Self { block }
    }

    pub fn block(&self) -> &B {
        &self.block
    }

    pub fn interrupt_mask(&self) -> u16 {
        self.block.read16(layout::INTERRUPT_MASK_REGISTER)
    }

    pub fn interrupt_status(&self) -> u16 {
        self.block.read16(layout::INTERRUPT_STATUS_REGISTER)
    }

    pub fn phy_status(&self) -> u8 {
        self.block.read8(layout::PHY_STATUS_REGISTER)
    }

    /// Link-change events allowed by the mask register?
    pub fn link_change_enabled(&self) -> bool {
        self.interrupt_mask() & layout::LINK_CHANGE_INT_MASK != 0
    }

    pub fn enable_link_change(&mut self) {
        let mask = self.interrupt_mask() | layout::LINK_CHANGE_INT_MASK;
        self.block.write16(layout::INTERRUPT_MASK_REGISTER, mask);
    }

    pub fn disable_link_change(&mut self) {
        let mask = self.interrupt_mask() & !layout::LINK_CHANGE_INT_MASK;
        self.block.write16(layout::INTERRUPT_MASK_REGISTER, mask);
    }

    /// A link-change event is pending (status bit still set)
    pub fn link_change_pending(&self) -> bool {
        self.interrupt_status() & layout::LINK_CHANGE_INT_MASK != 0
    }

    /// Device side: mark the event pending. Must happen strictly before
    /// the trigger channel is signalled.
    pub fn mark_link_change_pending(&mut self) {
        let status = self.interrupt_status() | layout::LINK_CHANGE_INT_MASK;
        self.block.write16(layout::INTERRUPT_STATUS_REGISTER, status);
    }

    /// Driver side: acknowledge the pending event. Write-1-to-clear on the
    /// link-change bit alone; unrelated status bits are untouched.
    pub fn ack_link_change(&mut self) {
        let status = self.interrupt_status() & !layout::LINK_CHANGE_INT_MASK;
        self.block.write16(layout::INTERRUPT_STATUS_REGISTER, status);
    }

    /// Current link state from the PHY status register
    pub fn link_up(&self) -> bool {
        self.phy_status() & layout::LINK_STATUS_MASK != 0
    }

    /// Device side: flip the simulated link state
    pub fn toggle_link(&mut self) {
        let phy = self.phy_status() ^ layout::LINK_STATUS_MASK;
        self.block.write8(layout::PHY_STATUS_REGISTER, phy);
    }
}
