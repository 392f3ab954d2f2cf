//! ISP command frame construction

use super::opcodes;

/// A single 4-byte ISP command frame
///
/// Frames are transferred as-is; the fourth byte doubles as the response
/// slot for read commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IspFrame {
    /// The four command bytes, sent in order
    pub bytes: [u8; 4],
}

/// Split a 16-bit word address into (high, low) frame bytes
const fn addr_bytes(word_addr: u16) -> (u8, u8) {
    ((word_addr >> 8) as u8, word_addr as u8)
}

impl IspFrame {
    /// Build a frame from its four raw bytes
    pub const fn new(b0: u8, b1: u8, b2: u8, b3: u8) -> Self {
        Self {
            bytes: [b0, b1, b2, b3],
        }
    }

    /// Programming Enable: `AC 53 00 00`
    ///
    /// A responding target echoes 0x53 in the third response byte.
    pub const fn programming_enable() -> Self {
        Self::new(opcodes::PROG_CMD, opcodes::PROG_ENABLE_ARG, 0x00, 0x00)
    }

    /// Chip Erase: `AC 80 00 00`
    pub const fn chip_erase() -> Self {
        Self::new(opcodes::PROG_CMD, opcodes::CHIP_ERASE_ARG, 0x00, 0x00)
    }

    /// Read Signature Byte `index` (0..=2); response arrives in byte 3
    pub const fn read_signature(index: u8) -> Self {
        Self::new(opcodes::READ_SIGNATURE, 0x00, index, 0x00)
    }

    /// Load one data byte into the target's page buffer
    ///
    /// `word_offset` addresses the word within the page buffer; `high`
    /// selects the high byte of the word.
    pub const fn load_page_byte(word_offset: u16, data: u8, high: bool) -> Self {
        let op = if high {
            opcodes::LOAD_PAGE_HIGH
        } else {
            opcodes::LOAD_PAGE_LOW
        };
        let (hi, lo) = addr_bytes(word_offset);
        Self::new(op, hi, lo, data)
    }

    /// Write the loaded page buffer to flash at the page's word address
    pub const fn write_page(word_addr: u16) -> Self {
        let (hi, lo) = addr_bytes(word_addr);
        Self::new(opcodes::WRITE_PAGE, hi, lo, 0x00)
    }

    /// Read one byte of program memory; response arrives in byte 3
    ///
    /// Flash is word-addressed over ISP: bit 0 of the byte address selects
    /// the high or low byte of the word.
    pub const fn read_flash(byte_addr: u32) -> Self {
        let word_addr = (byte_addr >> 1) as u16;
        let op = if byte_addr & 1 != 0 {
            opcodes::READ_FLASH_HIGH
        } else {
            opcodes::READ_FLASH_LOW
        };
        let (hi, lo) = addr_bytes(word_addr);
        Self::new(op, hi, lo, 0x00)
    }

    /// Read the low fuse byte: `50 00 00 00`; response arrives in byte 3
    pub const fn read_low_fuse() -> Self {
        Self::new(opcodes::READ_LOW_FUSE, 0x00, 0x00, 0x00)
    }

    /// Read the high fuse byte: `58 08 00 00`; response arrives in byte 3
    pub const fn read_high_fuse() -> Self {
        Self::new(
            opcodes::READ_FUSE_HIGH_LOCK,
            opcodes::HIGH_FUSE_ARG,
            0x00,
            0x00,
        )
    }

    /// Read the lock bits: `58 00 00 00`; response arrives in byte 3
    pub const fn read_lock_bits() -> Self {
        Self::new(
            opcodes::READ_FUSE_HIGH_LOCK,
            opcodes::LOCK_BITS_ARG,
            0x00,
            0x00,
        )
    }
}
