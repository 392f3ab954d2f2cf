//! Bit-banged transfer helpers for GPIO-backed ports
//!
//! The ISP wire format is SPI mode 0: data is set up while SCK is low and
//! sampled by both sides on the rising edge, MSB first. These helpers produce
//! that timing from four discretely toggled lines, so any host that can
//! toggle a pin and read a pin can act as a programmer.
//!
//! There is no error path at this layer. Pin I/O failures in a backend are
//! logged there; every protocol failure surfaces one layer up as a bad echo
//! or a verify mismatch.

use crate::isp::IspFrame;

/// Pin-level operations of a bit-banged ISP port
///
/// Implementations own the four lines for the lifetime of a session; nothing
/// else toggles them.
pub trait BitbangIspPort {
    /// Set the SCK (clock) line level
    fn set_sck(&mut self, high: bool);

    /// Set the MOSI (data to target) line level
    fn set_mosi(&mut self, high: bool);

    /// Read the MISO (data from target) line level
    fn get_miso(&self) -> bool;

    /// Drive the RESET line; `asserted` means the line is held low
    fn set_reset(&mut self, asserted: bool);

    /// Delay for half an SCK period
    fn half_period_delay(&self);
}

/// Transfer one byte, MSB first, returning the byte clocked back in
///
/// Each bit: set MOSI, hold for half a period, raise SCK and sample MISO,
/// hold for half a period, lower SCK. A byte is therefore exactly 16
/// half-periods; every call is synchronous and blocking for that duration.
pub fn transfer_byte<M: BitbangIspPort + ?Sized>(port: &mut M, out: u8) -> u8 {
    let mut input = 0u8;
    for i in (0..8).rev() {
        port.set_mosi((out >> i) & 1 != 0);
        port.half_period_delay();
        port.set_sck(true);
        input <<= 1;
        if port.get_miso() {
            input |= 1;
        }
        port.half_period_delay();
        port.set_sck(false);
    }
    input
}

/// Transfer a full 4-byte command frame, returning the four response bytes
pub fn transfer_frame<M: BitbangIspPort + ?Sized>(port: &mut M, frame: IspFrame) -> [u8; 4] {
    let mut response = [0u8; 4];
    for (out, slot) in frame.bytes.iter().zip(response.iter_mut()) {
        *slot = transfer_byte(port, *out);
    }
    response
}

/// Assert RESET (drive low) with settling delays on both sides
///
/// SCK must already be low when RESET falls or the target will not enter
/// serial programming mode.
pub fn assert_reset<M: BitbangIspPort + ?Sized>(port: &mut M) {
    port.set_sck(false);
    port.half_period_delay();
    port.set_reset(true);
    port.half_period_delay();
}

/// Release RESET (drive high) with settling delays on both sides
pub fn release_reset<M: BitbangIspPort + ?Sized>(port: &mut M) {
    port.half_period_delay();
    port.set_reset(false);
    port.half_period_delay();
}
