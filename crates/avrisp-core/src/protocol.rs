//! ISP operation implementations
//!
//! One function per operation of the serial programming instruction set,
//! each a direct frame encode/decode over an [`IspPort`]. All calls are
//! synchronous; a call's duration is the sum of its byte transfers plus any
//! mandated settling delay.
//!
//! Erase and page-write completion cannot be observed (no ready/busy line is
//! wired in plain ISP), so those operations block for a fixed, conservative
//! delay instead of polling. The delay values come from the chip descriptor.

use crate::isp::{opcodes, IspFrame};
use crate::programmer::IspPort;

/// Attempt to enter serial programming mode
///
/// Returns true if the target acknowledged by echoing 0x53 in the third
/// response byte. On false the caller should pulse RESET and retry a bounded
/// number of times before giving up.
pub fn programming_enable<P: IspPort + ?Sized>(port: &mut P) -> bool {
    let response = port.transfer(IspFrame::programming_enable());
    let acked = response[2] == opcodes::PROG_ENABLE_ARG;
    if !acked {
        log::debug!(
            "programming enable not acknowledged (echo byte 0x{:02X})",
            response[2]
        );
    }
    acked
}

/// Read the 3-byte device signature
pub fn read_signature<P: IspPort + ?Sized>(port: &mut P) -> [u8; 3] {
    let mut signature = [0u8; 3];
    for (index, byte) in signature.iter_mut().enumerate() {
        let response = port.transfer(IspFrame::read_signature(index as u8));
        *byte = response[3];
    }
    signature
}

/// Erase the entire flash, then block for the device's erase time
pub fn chip_erase<P: IspPort + ?Sized>(port: &mut P, erase_delay_ms: u32) {
    port.transfer(IspFrame::chip_erase());
    port.delay_ms(erase_delay_ms);
}

/// Load one byte into the target's page buffer at the given word offset
pub fn load_page_byte<P: IspPort + ?Sized>(port: &mut P, word_offset: u16, data: u8, high: bool) {
    port.transfer(IspFrame::load_page_byte(word_offset, data, high));
}

/// Commit the loaded page buffer to flash, then block for the write time
pub fn write_page<P: IspPort + ?Sized>(port: &mut P, word_addr: u16, settle_ms: u32) {
    port.transfer(IspFrame::write_page(word_addr));
    port.delay_ms(settle_ms);
}

/// Read one byte of program memory at the given byte address
pub fn read_flash_byte<P: IspPort + ?Sized>(port: &mut P, byte_addr: u32) -> u8 {
    port.transfer(IspFrame::read_flash(byte_addr))[3]
}

/// Read the low fuse byte
pub fn read_low_fuse<P: IspPort + ?Sized>(port: &mut P) -> u8 {
    port.transfer(IspFrame::read_low_fuse())[3]
}

/// Read the high fuse byte
pub fn read_high_fuse<P: IspPort + ?Sized>(port: &mut P) -> u8 {
    port.transfer(IspFrame::read_high_fuse())[3]
}

/// Read the lock bits
pub fn read_lock_bits<P: IspPort + ?Sized>(port: &mut P) -> u8 {
    port.transfer(IspFrame::read_lock_bits())[3]
}
