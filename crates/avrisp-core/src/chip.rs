//! AVR chip descriptors
//!
//! Geometry, identity and timing for the supported targets. Erase and
//! page-write completion cannot be polled over plain ISP (no busy pin is
//! wired), so the delays here are deliberately generous fixed waits rather
//! than datasheet minimums. When adding a chip, take the timing from its
//! datasheet instead of reusing another family member's values.

/// Descriptor for one AVR target family member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvrChip {
    /// Canonical lowercase name, e.g. "attiny13"
    pub name: &'static str,
    /// Expected 3-byte device signature
    pub signature: [u8; 3],
    /// Total flash size in bytes
    pub flash_size: u32,
    /// Flash page size in bytes
    pub page_size: u32,
    /// Fixed wait after chip erase, in milliseconds
    pub erase_delay_ms: u32,
    /// Fixed wait after each page write, in milliseconds
    pub page_write_delay_ms: u32,
}

impl AvrChip {
    /// Number of 16-bit words per flash page
    pub const fn words_per_page(&self) -> u32 {
        self.page_size / 2
    }

    /// Number of flash pages
    pub const fn total_pages(&self) -> u32 {
        self.flash_size / self.page_size
    }
}

/// ATtiny13: the reference target (1 KiB flash, 16-word pages)
pub const ATTINY13: AvrChip = AvrChip {
    name: "attiny13",
    signature: [0x1E, 0x90, 0x07],
    flash_size: 1024,
    page_size: 32,
    erase_delay_ms: 10,
    page_write_delay_ms: 5,
};

/// ATtiny25
pub const ATTINY25: AvrChip = AvrChip {
    name: "attiny25",
    signature: [0x1E, 0x91, 0x08],
    flash_size: 2048,
    page_size: 32,
    erase_delay_ms: 10,
    page_write_delay_ms: 5,
};

/// ATtiny45
pub const ATTINY45: AvrChip = AvrChip {
    name: "attiny45",
    signature: [0x1E, 0x92, 0x06],
    flash_size: 4096,
    page_size: 64,
    erase_delay_ms: 10,
    page_write_delay_ms: 5,
};

/// ATtiny85
pub const ATTINY85: AvrChip = AvrChip {
    name: "attiny85",
    signature: [0x1E, 0x93, 0x0B],
    flash_size: 8192,
    page_size: 64,
    erase_delay_ms: 10,
    page_write_delay_ms: 5,
};

/// ATmega328P
pub const ATMEGA328P: AvrChip = AvrChip {
    name: "atmega328p",
    signature: [0x1E, 0x95, 0x0F],
    flash_size: 32768,
    page_size: 128,
    erase_delay_ms: 15,
    page_write_delay_ms: 5,
};

/// All supported chips
pub const CHIPS: &[AvrChip] = &[ATTINY13, ATTINY25, ATTINY45, ATTINY85, ATMEGA328P];

/// Look up a chip descriptor by name (case-insensitive)
pub fn find(name: &str) -> Option<&'static AvrChip> {
    CHIPS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}
