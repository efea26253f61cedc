// Minimum size of a usable register file mapping, in bytes. The highest
// register in the layout is the PHY status byte at 0x6C.
pub const MIN_REGISTER_FILE_LEN: usize = 0x80;

pub mod layout {
    // Byte offsets of the interrupt-relevant registers. This layout is the
    // compatibility surface shared with the device side and must not change.
    pub const INTERRUPT_MASK_REGISTER: u16 = 0x3C; // 16 bit
    pub const INTERRUPT_STATUS_REGISTER: u16 = 0x3E; // 16 bit
    pub const PHY_STATUS_REGISTER: u16 = 0x6C; // 8 bit

    // Bit 5 of mask/status: link-change interrupt enable / pending
    pub const LINK_CHANGE_INT_MASK: u16 = 1 << 5;

    // Bit 1 of the PHY status register: current link state (1 = up)
    pub const LINK_STATUS_MASK: u8 = 1 << 1;
}

pub mod pci {
    // Identification of the emulated NIC, used by the physical-line path to
    // locate the resource to claim
    pub const VENDOR_ID: u16 = 0x10ec;
    pub const DEVICE_ID: u16 = 0x8168;
}
