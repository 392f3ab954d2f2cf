//! avrisp-dummy - In-memory AVR target emulator
//!
//! Emulates an AVR ISP slave at the frame level: programming enable gated on
//! RESET being held, the byte-echo response pattern, a word-organized page
//! buffer, 1-to-0 write semantics, and chip erase to 0xFF. Useful for
//! testing and development without real hardware, and as the integration
//! target for the session sequencer.

use avrisp_core::isp::{opcodes, IspFrame};
use avrisp_core::programmer::IspPort;

/// Configuration for the emulated target
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// 3-byte device signature to report
    pub signature: [u8; 3],
    /// Flash size in bytes
    pub flash_size: usize,
    /// Flash page size in bytes (must be a power of two)
    pub page_size: usize,
    /// Low fuse byte to report
    pub low_fuse: u8,
    /// High fuse byte to report
    pub high_fuse: u8,
    /// Lock bits to report
    pub lock_bits: u8,
}

impl Default for DummyConfig {
    fn default() -> Self {
        // ATtiny13 with factory fuses (1.2 MHz, nothing locked)
        Self {
            signature: [0x1E, 0x90, 0x07],
            flash_size: 1024,
            page_size: 32,
            low_fuse: 0x6A,
            high_fuse: 0xFF,
            lock_bits: 0xFF,
        }
    }
}

/// Emulated AVR target
pub struct DummyAvr {
    config: DummyConfig,
    flash: Vec<u8>,
    page_buffer: Vec<u8>,
    reset_asserted: bool,
    programming_enabled: bool,
    fail_enable: bool,
}

impl DummyAvr {
    /// Create an emulated target with the given configuration, flash erased
    pub fn new(config: DummyConfig) -> Self {
        assert!(
            config.page_size.is_power_of_two(),
            "AVR flash pages are power-of-two sized"
        );
        let flash = vec![0xFF; config.flash_size];
        let page_buffer = vec![0xFF; config.page_size];
        Self {
            config,
            flash,
            page_buffer,
            reset_asserted: false,
            programming_enabled: false,
            fail_enable: false,
        }
    }

    /// Create an emulated ATtiny13
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// The configuration in use
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Flash contents
    pub fn data(&self) -> &[u8] {
        &self.flash
    }

    /// Mutable flash contents, for corruption/fault-injection tests
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.flash
    }

    /// When set, programming enable never acknowledges, simulating an
    /// absent or unpowered target
    pub fn set_fail_enable(&mut self, fail: bool) {
        self.fail_enable = fail;
    }

    /// Current RESET line state (true = held in reset)
    pub fn reset_asserted(&self) -> bool {
        self.reset_asserted
    }

    fn word_addr(frame: &IspFrame) -> usize {
        ((frame.bytes[1] as usize) << 8) | frame.bytes[2] as usize
    }

    fn handle(&mut self, frame: IspFrame) -> [u8; 4] {
        let b = frame.bytes;
        // A real target shifts back each received byte one slot later
        let mut response = [0x00, b[0], b[1], 0x00];

        match b[0] {
            opcodes::PROG_CMD if b[1] == opcodes::PROG_ENABLE_ARG => {
                if self.reset_asserted && !self.fail_enable {
                    self.programming_enabled = true;
                } else {
                    // Out of sync: the echo slot carries garbage
                    response[2] = 0x00;
                    log::debug!("dummy: programming enable refused");
                }
            }
            opcodes::PROG_CMD if b[1] == opcodes::CHIP_ERASE_ARG => {
                if self.programming_enabled {
                    self.flash.fill(0xFF);
                    self.page_buffer.fill(0xFF);
                }
            }
            opcodes::READ_SIGNATURE => {
                response[3] = self.config.signature[b[2] as usize % 3];
            }
            opcodes::READ_LOW_FUSE => {
                response[3] = self.config.low_fuse;
            }
            opcodes::READ_FUSE_HIGH_LOCK => {
                response[3] = if b[1] == opcodes::HIGH_FUSE_ARG {
                    self.config.high_fuse
                } else {
                    self.config.lock_bits
                };
            }
            opcodes::LOAD_PAGE_LOW | opcodes::LOAD_PAGE_HIGH => {
                if self.programming_enabled {
                    let high = b[0] == opcodes::LOAD_PAGE_HIGH;
                    let offset = (Self::word_addr(&frame) * 2 + usize::from(high))
                        % self.config.page_size;
                    self.page_buffer[offset] = b[3];
                }
            }
            opcodes::WRITE_PAGE => {
                if self.programming_enabled {
                    let byte_addr = Self::word_addr(&frame) * 2;
                    // Low address bits select the word, not the page
                    let start = byte_addr & !(self.config.page_size - 1);
                    if start + self.config.page_size <= self.flash.len() {
                        for (i, &byte) in self.page_buffer.iter().enumerate() {
                            // Flash programming only clears bits
                            self.flash[start + i] &= byte;
                        }
                    } else {
                        log::warn!("dummy: page write at 0x{:04X} out of range", byte_addr);
                    }
                    self.page_buffer.fill(0xFF);
                }
            }
            opcodes::READ_FLASH_LOW | opcodes::READ_FLASH_HIGH => {
                let high = b[0] == opcodes::READ_FLASH_HIGH;
                let addr = Self::word_addr(&frame) * 2 + usize::from(high);
                response[3] = self.flash.get(addr).copied().unwrap_or(0xFF);
            }
            _ => {
                log::warn!("dummy: unhandled frame {:02X?}", b);
            }
        }

        response
    }
}

impl IspPort for DummyAvr {
    fn transfer(&mut self, frame: IspFrame) -> [u8; 4] {
        self.handle(frame)
    }

    fn assert_reset(&mut self) {
        self.reset_asserted = true;
    }

    fn release_reset(&mut self) {
        self.reset_asserted = false;
        // Leaving reset restarts the part; programming mode is lost
        self.programming_enabled = false;
    }

    fn delay_us(&mut self, _us: u32) {
        // Nothing to wait for in memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avrisp_core::chip;
    use avrisp_core::image::FirmwareImage;
    use avrisp_core::protocol;
    use avrisp_core::session::{self, FailureReason, Mismatch, NoProgress, Phase, SessionConfig};

    fn enter(target: &mut DummyAvr) {
        target.assert_reset();
        assert!(protocol::programming_enable(target));
    }

    #[test]
    fn enable_requires_reset_held() {
        let mut target = DummyAvr::new_default();
        assert!(!protocol::programming_enable(&mut target));
        target.assert_reset();
        assert!(protocol::programming_enable(&mut target));
    }

    #[test]
    fn signature_reads_back_from_config() {
        let mut target = DummyAvr::new_default();
        enter(&mut target);
        assert_eq!(protocol::read_signature(&mut target), [0x1E, 0x90, 0x07]);
    }

    #[test]
    fn fuse_bytes_read_back_from_config() {
        let mut target = DummyAvr::new(DummyConfig {
            low_fuse: 0x7A,
            lock_bits: 0x3F,
            ..DummyConfig::default()
        });
        enter(&mut target);

        assert_eq!(protocol::read_low_fuse(&mut target), 0x7A);
        assert_eq!(protocol::read_high_fuse(&mut target), 0xFF);
        assert_eq!(protocol::read_lock_bits(&mut target), 0x3F);

        let chip = chip::ATTINY13;
        target.release_reset();
        let report = session::probe(&mut target, &chip, &SessionConfig::default());
        assert_eq!(
            report.fuses,
            Some(session::Fuses {
                low: 0x7A,
                high: 0xFF,
                lock: 0x3F,
            })
        );
    }

    #[test]
    fn page_write_only_clears_bits() {
        let mut target = DummyAvr::new_default();
        enter(&mut target);

        for word in 0..16u16 {
            protocol::load_page_byte(&mut target, word, 0xF0, false);
            protocol::load_page_byte(&mut target, word, 0x0F, true);
        }
        protocol::write_page(&mut target, 0, 5);
        assert_eq!(&target.data()[..4], &[0xF0, 0x0F, 0xF0, 0x0F]);

        // Re-programming without erase cannot set bits back to 1
        for word in 0..16u16 {
            protocol::load_page_byte(&mut target, word, 0x0F, false);
            protocol::load_page_byte(&mut target, word, 0xF0, true);
        }
        protocol::write_page(&mut target, 0, 5);
        assert_eq!(&target.data()[..4], &[0x00, 0x00, 0x00, 0x00]);

        protocol::chip_erase(&mut target, 10);
        assert!(target.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn full_session_against_emulated_attiny13() {
        let chip = chip::ATTINY13;
        let mut target = DummyAvr::new_default();
        let bytes: Vec<u8> = (0..64u32).map(|i| (i * 3) as u8).collect();
        let image = FirmwareImage::new(bytes.clone(), 0, chip.page_size).unwrap();

        let report = session::run(
            &mut target,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );

        assert!(report.success(), "{}", report.summary());
        assert_eq!(report.pages_written, 2);
        assert_eq!(&target.data()[..64], &bytes[..]);
        assert!(!target.reset_asserted(), "target returned to run mode");
    }

    #[test]
    fn unresponsive_target_reports_device_not_responding() {
        let chip = chip::ATTINY13;
        let mut target = DummyAvr::new_default();
        target.set_fail_enable(true);
        let image = FirmwareImage::new(vec![0xFF; 32], 0, chip.page_size).unwrap();

        let report = session::run(
            &mut target,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );

        assert_eq!(report.phase, Phase::Failed);
        assert_eq!(
            report.failure,
            Some(FailureReason::DeviceNotResponding { attempts: 4 })
        );
        assert!(!target.reset_asserted(), "reset released on failure too");
    }

    #[test]
    fn corruption_between_write_and_verify_is_pinpointed() {
        let chip = chip::ATTINY13;
        let mut target = DummyAvr::new_default();
        let image = FirmwareImage::new(vec![0xA5; 32], 0, chip.page_size).unwrap();

        let report = session::run(
            &mut target,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );
        assert!(report.success());

        // Flip one byte behind the programmer's back, then re-verify
        target.data_mut()[0x000B] = 0x5A;
        let report = session::verify(
            &mut target,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );

        assert!(!report.success());
        assert_eq!(
            report.mismatches,
            vec![Mismatch {
                address: 0x000B,
                expected: 0xA5,
                actual: 0x5A,
            }]
        );
    }

    #[test]
    fn wrong_part_in_socket_fails_strict_probe() {
        let chip = chip::ATTINY13;
        let mut target = DummyAvr::new(DummyConfig {
            signature: chip::ATTINY85.signature,
            flash_size: 8192,
            page_size: 64,
            ..DummyConfig::default()
        });

        let config = SessionConfig {
            strict_signature: true,
            ..SessionConfig::default()
        };
        let report = session::probe(&mut target, &chip, &config);

        assert_eq!(report.phase, Phase::Failed);
        assert_eq!(
            report.failure,
            Some(FailureReason::SignatureMismatch {
                expected: chip.signature,
                found: chip::ATTINY85.signature,
            })
        );
    }
}
