//! Programmer port abstraction
//!
//! [`IspPort`] is the seam between the protocol layers and the hardware.
//! Backends either implement it directly (emulators, hardware with a real
//! SPI peripheral) or implement the pin-level
//! [`bitbang::BitbangIspPort`] trait and lean on the helpers in
//! [`bitbang`] for the byte transfers.

pub mod bitbang;

use crate::isp::IspFrame;

/// A port to an AVR target in serial programming mode
///
/// All operations are synchronous and blocking; the ISP protocol is a single
/// exclusive master/slave handshake with no independent progress on either
/// side. A frame transfer, once started, always completes.
pub trait IspPort {
    /// Clock one 4-byte command frame to the target, returning the four
    /// response bytes
    fn transfer(&mut self, frame: IspFrame) -> [u8; 4];

    /// Drive RESET low, holding the target in programming-capable reset
    fn assert_reset(&mut self);

    /// Drive RESET high, returning the target to run mode
    fn release_reset(&mut self);

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);

    /// Delay for the specified number of milliseconds
    fn delay_ms(&mut self, ms: u32) {
        self.delay_us(ms.saturating_mul(1000));
    }
}

// Blanket impl for boxed ports to allow trait objects in dispatch code
impl IspPort for Box<dyn IspPort + Send> {
    fn transfer(&mut self, frame: IspFrame) -> [u8; 4] {
        (**self).transfer(frame)
    }

    fn assert_reset(&mut self) {
        (**self).assert_reset()
    }

    fn release_reset(&mut self) {
        (**self).release_reset()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
