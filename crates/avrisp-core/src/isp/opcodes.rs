//! AVR serial programming instruction bytes
//!
//! Byte values follow the "Serial Programming Instruction Set" table common
//! to the ATtiny and ATmega datasheets. Commands starting with
//! [`PROG_CMD`] select their operation with the second byte.

// ============================================================================
// Programming control
// ============================================================================

/// First byte of programming enable and chip erase commands
pub const PROG_CMD: u8 = 0xAC;
/// Second byte selecting Programming Enable; echoed by the target as the
/// acknowledgement
pub const PROG_ENABLE_ARG: u8 = 0x53;
/// Second byte selecting Chip Erase
pub const CHIP_ERASE_ARG: u8 = 0x80;

// ============================================================================
// Identification
// ============================================================================

/// Read Signature Byte (byte index in the third frame byte)
pub const READ_SIGNATURE: u8 = 0x30;

// ============================================================================
// Flash programming
// ============================================================================

/// Load Program Memory Page, low data byte of a word
pub const LOAD_PAGE_LOW: u8 = 0x40;
/// Load Program Memory Page, high data byte of a word
pub const LOAD_PAGE_HIGH: u8 = 0x48;
/// Write Program Memory Page at the given word address
pub const WRITE_PAGE: u8 = 0x4C;

// ============================================================================
// Flash read-back
// ============================================================================

/// Read Program Memory, low byte of the addressed word
pub const READ_FLASH_LOW: u8 = 0x20;
/// Read Program Memory, high byte of the addressed word
pub const READ_FLASH_HIGH: u8 = 0x28;

// ============================================================================
// Fuse and lock read-back
// ============================================================================

/// Read Fuse Bits (the low fuse byte)
pub const READ_LOW_FUSE: u8 = 0x50;
/// Read Fuse High Bits / Read Lock Bits; the second byte selects which
pub const READ_FUSE_HIGH_LOCK: u8 = 0x58;
/// Second byte selecting the high fuse byte under [`READ_FUSE_HIGH_LOCK`]
pub const HIGH_FUSE_ARG: u8 = 0x08;
/// Second byte selecting the lock bits under [`READ_FUSE_HIGH_LOCK`]
pub const LOCK_BITS_ARG: u8 = 0x00;
