//! Programming session sequencer
//!
//! The top-level state machine for a program-and-verify run:
//!
//! ```text
//! Idle -> EnteringMode -> Identifying -> Erasing -> Programming -> Verifying -> Done
//!              |               |
//!              +-------------> Failed (terminal)
//! ```
//!
//! Protocol failures do not unwind as Rust errors; they are recorded in the
//! [`SessionReport`] so a run always completes with a full report. The only
//! fail-fast conditions are a target that never acknowledges programming
//! enable, a signature mismatch under strict policy, and a caller-requested
//! abort at a page boundary. Whatever terminal state is reached, the RESET
//! line is released so the target returns to run mode.

use std::fmt;

use thiserror::Error;

use crate::chip::AvrChip;
use crate::image::FirmwareImage;
use crate::programmer::IspPort;
use crate::protocol;

/// Phase of a programming session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Session created, nothing driven yet
    Idle,
    /// Holding RESET and attempting programming enable
    EnteringMode,
    /// Reading and checking the device signature
    Identifying,
    /// Chip erase issued, waiting out the erase time
    Erasing,
    /// Loading and writing pages
    Programming,
    /// Reading back and comparing every byte
    Verifying,
    /// Terminal: the run completed (success iff no mismatches)
    Done,
    /// Terminal: the run was cut short
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::EnteringMode => "entering programming mode",
            Phase::Identifying => "identifying",
            Phase::Erasing => "erasing",
            Phase::Programming => "programming",
            Phase::Verifying => "verifying",
            Phase::Done => "done",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a session ended in [`Phase::Failed`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// Programming enable was never acknowledged; the target may be absent,
    /// unpowered, or wired wrong
    #[error("device not responding: programming enable not acknowledged after {attempts} attempts")]
    DeviceNotResponding {
        /// How many enable attempts were made
        attempts: u32,
    },

    /// The signature did not match the selected chip and strict policy is in
    /// effect
    #[error(
        "signature mismatch: expected {expected:02X?}, read {found:02X?} (is this the right chip?)"
    )]
    SignatureMismatch {
        /// Signature the chip descriptor expects
        expected: [u8; 3],
        /// Signature actually read
        found: [u8; 3],
    },

    /// The image extends past the end of the target's flash
    #[error("image needs {needed} byte(s) of flash but {flash_size} are available")]
    ImageTooLarge {
        /// Flash bytes the padded image would occupy, counted from address 0
        needed: u32,
        /// Flash size of the selected chip
        flash_size: u32,
    },

    /// The caller requested an abort; honored at a page boundary
    #[error("aborted by caller at a page boundary")]
    Aborted,
}

/// Fuse and lock bytes read during identification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fuses {
    /// Low fuse byte
    pub low: u8,
    /// High fuse byte
    pub high: u8,
    /// Lock bits
    pub lock: u8,
}

/// One byte that read back differently than written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Flash byte address
    pub address: u32,
    /// Byte the image holds
    pub expected: u8,
    /// Byte the target returned
    pub actual: u8,
}

/// Session policy knobs
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Programming enable attempts before declaring the device unresponsive
    pub enable_retries: u32,
    /// Fail the session on a signature mismatch instead of warning
    pub strict_signature: bool,
    /// Time to hold RESET before each enable attempt, in milliseconds
    pub reset_hold_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enable_retries: 4,
            strict_signature: false,
            reset_hold_ms: 20,
        }
    }
}

/// Progress callbacks for a running session
///
/// All methods have no-op defaults; implement only what the caller needs.
/// `abort_requested` is polled between pages during programming.
pub trait SessionProgress {
    /// A new phase has begun
    fn phase_started(&mut self, _phase: Phase) {}

    /// A page was committed to flash
    fn page_written(&mut self, _pages_done: u32, _pages_total: u32) {}

    /// A byte was read back and compared
    fn byte_verified(&mut self, _bytes_done: usize, _bytes_total: usize) {}

    /// Should the session stop at the next page boundary?
    fn abort_requested(&self) -> bool {
        false
    }
}

/// No-op progress reporter
pub struct NoProgress;

impl SessionProgress for NoProgress {}

/// Accumulated result of a session
///
/// Purely additive while the session runs; read-only once a terminal phase
/// is reached.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Terminal phase the session reached
    pub phase: Phase,
    /// Signature bytes read during identification, if any
    pub signature: Option<[u8; 3]>,
    /// Whether the signature matched the chip descriptor
    pub signature_matches: Option<bool>,
    /// Fuse and lock bytes read during identification, if any
    pub fuses: Option<Fuses>,
    /// Whether chip erase was issued
    pub erased: bool,
    /// Pages committed to flash
    pub pages_written: u32,
    /// Every byte that failed verification
    pub mismatches: Vec<Mismatch>,
    /// Populated when the session ended in [`Phase::Failed`]
    pub failure: Option<FailureReason>,
}

impl SessionReport {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            signature: None,
            signature_matches: None,
            fuses: None,
            erased: false,
            pages_written: 0,
            mismatches: Vec::new(),
            failure: None,
        }
    }

    /// Overall success: the run completed and every byte verified
    pub fn success(&self) -> bool {
        self.phase == Phase::Done && self.failure.is_none() && self.mismatches.is_empty()
    }

    /// One-line human-readable outcome
    pub fn summary(&self) -> String {
        if let Some(failure) = &self.failure {
            return format!("failed while {}: {}", self.phase_before_failure(), failure);
        }
        if !self.mismatches.is_empty() {
            return format!(
                "verification failed: {} byte(s) differ, first at 0x{:04X}",
                self.mismatches.len(),
                self.mismatches[0].address
            );
        }
        match self.phase {
            Phase::Done => format!("success: {} page(s) written and verified", self.pages_written),
            phase => format!("incomplete: stopped while {}", phase),
        }
    }

    fn phase_before_failure(&self) -> &'static str {
        match self.failure {
            Some(FailureReason::DeviceNotResponding { .. }) => "entering programming mode",
            Some(FailureReason::SignatureMismatch { .. }) => "identifying",
            Some(FailureReason::ImageTooLarge { .. }) => "validating the image",
            Some(FailureReason::Aborted) => "programming",
            None => "running",
        }
    }
}

/// Run a full program-and-verify session
///
/// The image is an explicit parameter; the sequencer holds no global state.
/// RESET is released before returning, whichever terminal state was reached.
pub fn run<P, G>(
    port: &mut P,
    chip: &AvrChip,
    image: &FirmwareImage,
    config: &SessionConfig,
    progress: &mut G,
) -> SessionReport
where
    P: IspPort + ?Sized,
    G: SessionProgress,
{
    let mut report = SessionReport::new();

    let outcome = (|| {
        check_fit(chip, image)?;
        enter_mode(port, config, &mut report, progress)?;
        identify(port, chip, config, &mut report, progress)?;
        erase(port, chip, &mut report, progress);
        program(port, chip, image, &mut report, progress)?;
        verify_image(port, image, &mut report, progress);
        Ok(())
    })();

    finish(port, &mut report, outcome);
    report
}

/// Enter programming mode and read the signature, nothing more
pub fn probe<P: IspPort + ?Sized>(
    port: &mut P,
    chip: &AvrChip,
    config: &SessionConfig,
) -> SessionReport {
    let mut report = SessionReport::new();

    let outcome = (|| {
        enter_mode(port, config, &mut report, &mut NoProgress)?;
        identify(port, chip, config, &mut report, &mut NoProgress)
    })();

    finish(port, &mut report, outcome);
    report
}

/// Enter programming mode and erase the chip
pub fn erase_chip<P: IspPort + ?Sized>(
    port: &mut P,
    chip: &AvrChip,
    config: &SessionConfig,
) -> SessionReport {
    let mut report = SessionReport::new();

    let outcome = (|| {
        enter_mode(port, config, &mut report, &mut NoProgress)?;
        identify(port, chip, config, &mut report, &mut NoProgress)?;
        erase(port, chip, &mut report, &mut NoProgress);
        Ok(())
    })();

    finish(port, &mut report, outcome);
    report
}

/// Compare flash against an image without writing anything
pub fn verify<P, G>(
    port: &mut P,
    chip: &AvrChip,
    image: &FirmwareImage,
    config: &SessionConfig,
    progress: &mut G,
) -> SessionReport
where
    P: IspPort + ?Sized,
    G: SessionProgress,
{
    let mut report = SessionReport::new();

    let outcome = (|| {
        check_fit(chip, image)?;
        enter_mode(port, config, &mut report, progress)?;
        identify(port, chip, config, &mut report, progress)?;
        verify_image(port, image, &mut report, progress);
        Ok(())
    })();

    finish(port, &mut report, outcome);
    report
}

fn finish<P: IspPort + ?Sized>(
    port: &mut P,
    report: &mut SessionReport,
    outcome: Result<(), FailureReason>,
) {
    // Guaranteed cleanup: the target goes back to run mode no matter how the
    // session ended.
    port.release_reset();

    match outcome {
        Ok(()) => {
            report.phase = Phase::Done;
            if !report.mismatches.is_empty() {
                log::error!(
                    "verification failed: {} byte(s) differ",
                    report.mismatches.len()
                );
            }
        }
        Err(reason) => {
            log::error!("session failed: {}", reason);
            report.phase = Phase::Failed;
            report.failure = Some(reason);
        }
    }
}

// The CLI validates images on load, but library callers reach the sequencer
// directly; reject an oversized image before any pin is driven.
fn check_fit(chip: &AvrChip, image: &FirmwareImage) -> Result<(), FailureReason> {
    if image.check_fits(chip).is_err() {
        return Err(FailureReason::ImageTooLarge {
            needed: image.base_address() + image.padded_len() as u32,
            flash_size: chip.flash_size,
        });
    }
    Ok(())
}

fn enter_mode<P: IspPort + ?Sized, G: SessionProgress>(
    port: &mut P,
    config: &SessionConfig,
    report: &mut SessionReport,
    progress: &mut G,
) -> Result<(), FailureReason> {
    report.phase = Phase::EnteringMode;
    progress.phase_started(Phase::EnteringMode);

    port.assert_reset();
    port.delay_ms(config.reset_hold_ms);

    for attempt in 1..=config.enable_retries {
        if protocol::programming_enable(port) {
            log::debug!("programming mode entered (attempt {})", attempt);
            return Ok(());
        }
        log::warn!(
            "programming enable not acknowledged (attempt {}/{})",
            attempt,
            config.enable_retries
        );
        // Give RESET a positive pulse and try again
        port.release_reset();
        port.delay_ms(1);
        port.assert_reset();
        port.delay_ms(config.reset_hold_ms);
    }

    Err(FailureReason::DeviceNotResponding {
        attempts: config.enable_retries,
    })
}

fn identify<P: IspPort + ?Sized, G: SessionProgress>(
    port: &mut P,
    chip: &AvrChip,
    config: &SessionConfig,
    report: &mut SessionReport,
    progress: &mut G,
) -> Result<(), FailureReason> {
    report.phase = Phase::Identifying;
    progress.phase_started(Phase::Identifying);

    let signature = protocol::read_signature(port);
    let matches = signature == chip.signature;
    report.signature = Some(signature);
    report.signature_matches = Some(matches);

    let fuses = Fuses {
        low: protocol::read_low_fuse(port),
        high: protocol::read_high_fuse(port),
        lock: protocol::read_lock_bits(port),
    };
    log::info!(
        "fuses: low 0x{:02X} high 0x{:02X} lock 0x{:02X}",
        fuses.low,
        fuses.high,
        fuses.lock
    );
    report.fuses = Some(fuses);

    if matches {
        log::info!(
            "signature {:02X} {:02X} {:02X} matches {}",
            signature[0],
            signature[1],
            signature[2],
            chip.name
        );
        return Ok(());
    }

    if config.strict_signature {
        return Err(FailureReason::SignatureMismatch {
            expected: chip.signature,
            found: signature,
        });
    }

    log::warn!(
        "signature {:02X} {:02X} {:02X} does not match {} (expected {:02X} {:02X} {:02X}), continuing",
        signature[0],
        signature[1],
        signature[2],
        chip.name,
        chip.signature[0],
        chip.signature[1],
        chip.signature[2]
    );
    Ok(())
}

fn erase<P: IspPort + ?Sized, G: SessionProgress>(
    port: &mut P,
    chip: &AvrChip,
    report: &mut SessionReport,
    progress: &mut G,
) {
    report.phase = Phase::Erasing;
    progress.phase_started(Phase::Erasing);

    log::info!("erasing chip ({} ms wait)", chip.erase_delay_ms);
    protocol::chip_erase(port, chip.erase_delay_ms);
    report.erased = true;
}

fn program<P: IspPort + ?Sized, G: SessionProgress>(
    port: &mut P,
    chip: &AvrChip,
    image: &FirmwareImage,
    report: &mut SessionReport,
    progress: &mut G,
) -> Result<(), FailureReason> {
    report.phase = Phase::Programming;
    progress.phase_started(Phase::Programming);

    let pages_total = image.page_count() as u32;
    log::info!(
        "programming {} page(s) of {} bytes from 0x{:04X}",
        pages_total,
        image.page_size(),
        image.base_address()
    );

    for page in image.pages() {
        if progress.abort_requested() {
            return Err(FailureReason::Aborted);
        }

        for (word_offset, word) in page.data.chunks_exact(2).enumerate() {
            protocol::load_page_byte(port, word_offset as u16, word[0], false);
            protocol::load_page_byte(port, word_offset as u16, word[1], true);
        }

        let word_addr = (page.address / 2) as u16;
        protocol::write_page(port, word_addr, chip.page_write_delay_ms);

        report.pages_written += 1;
        log::debug!(
            "wrote page {}/{} at 0x{:04X}",
            report.pages_written,
            pages_total,
            page.address
        );
        progress.page_written(report.pages_written, pages_total);
    }

    Ok(())
}

fn verify_image<P: IspPort + ?Sized, G: SessionProgress>(
    port: &mut P,
    image: &FirmwareImage,
    report: &mut SessionReport,
    progress: &mut G,
) {
    report.phase = Phase::Verifying;
    progress.phase_started(Phase::Verifying);

    // Full-range scan over the padded image; never stops at a mismatch so
    // the report always covers every byte.
    let total = image.padded_len();
    for (offset, expected) in image.padded_bytes().enumerate() {
        let address = image.base_address() + offset as u32;
        let actual = protocol::read_flash_byte(port, address);
        if actual != expected {
            log::warn!(
                "mismatch at 0x{:04X}: expected 0x{:02X}, read 0x{:02X}",
                address,
                expected,
                actual
            );
            report.mismatches.push(Mismatch {
                address,
                expected,
                actual,
            });
        }
        progress.byte_verified(offset + 1, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip;
    use crate::isp::{opcodes, IspFrame};

    /// Minimal AVR target model speaking the frame protocol
    struct MockPort {
        flash: Vec<u8>,
        page_buffer: Vec<u8>,
        page_size: usize,
        signature: [u8; 3],
        fuse_bytes: [u8; 3],
        reset_asserted: bool,
        enabled: bool,
        fail_enable: bool,
        enable_attempts: u32,
        /// Byte values reported on read-back instead of flash contents,
        /// simulating corruption between write and verify
        read_overrides: Vec<(u32, u8)>,
    }

    impl MockPort {
        fn new(chip: &AvrChip) -> Self {
            Self {
                flash: vec![0xFF; chip.flash_size as usize],
                page_buffer: vec![0xFF; chip.page_size as usize],
                page_size: chip.page_size as usize,
                signature: chip.signature,
                // ATtiny13 factory values: low fuse, high fuse, lock bits
                fuse_bytes: [0x6A, 0xFF, 0xFF],
                reset_asserted: false,
                enabled: false,
                fail_enable: false,
                enable_attempts: 0,
                read_overrides: Vec::new(),
            }
        }

        fn word_addr(frame: &IspFrame) -> usize {
            ((frame.bytes[1] as usize) << 8) | frame.bytes[2] as usize
        }
    }

    impl IspPort for MockPort {
        fn transfer(&mut self, frame: IspFrame) -> [u8; 4] {
            let b = frame.bytes;
            // The target echoes each received byte one slot later
            let mut response = [0x00, b[0], b[1], 0x00];

            match b[0] {
                opcodes::PROG_CMD if b[1] == opcodes::PROG_ENABLE_ARG => {
                    self.enable_attempts += 1;
                    if self.reset_asserted && !self.fail_enable {
                        self.enabled = true;
                    } else {
                        response[2] = 0x00;
                    }
                }
                opcodes::PROG_CMD if b[1] == opcodes::CHIP_ERASE_ARG => {
                    if self.enabled {
                        self.flash.fill(0xFF);
                    }
                }
                opcodes::READ_SIGNATURE => {
                    response[3] = self.signature[b[2] as usize % 3];
                }
                opcodes::READ_LOW_FUSE => {
                    response[3] = self.fuse_bytes[0];
                }
                opcodes::READ_FUSE_HIGH_LOCK => {
                    response[3] = if b[1] == opcodes::HIGH_FUSE_ARG {
                        self.fuse_bytes[1]
                    } else {
                        self.fuse_bytes[2]
                    };
                }
                opcodes::LOAD_PAGE_LOW | opcodes::LOAD_PAGE_HIGH => {
                    if self.enabled {
                        let offset = Self::word_addr(&frame) * 2
                            + usize::from(b[0] == opcodes::LOAD_PAGE_HIGH);
                        self.page_buffer[offset % self.page_size] = b[3];
                    }
                }
                opcodes::WRITE_PAGE => {
                    if self.enabled {
                        let start = Self::word_addr(&frame) * 2 & !(self.page_size - 1);
                        for (i, &byte) in self.page_buffer.iter().enumerate() {
                            self.flash[start + i] &= byte;
                        }
                        self.page_buffer.fill(0xFF);
                    }
                }
                opcodes::READ_FLASH_LOW | opcodes::READ_FLASH_HIGH => {
                    let addr = Self::word_addr(&frame) * 2
                        + usize::from(b[0] == opcodes::READ_FLASH_HIGH);
                    response[3] = self
                        .read_overrides
                        .iter()
                        .find(|(a, _)| *a == addr as u32)
                        .map(|(_, v)| *v)
                        .unwrap_or(self.flash[addr]);
                }
                _ => panic!("unexpected frame {:02X?}", b),
            }

            response
        }

        fn assert_reset(&mut self) {
            self.reset_asserted = true;
        }

        fn release_reset(&mut self) {
            self.reset_asserted = false;
            self.enabled = false;
        }

        fn delay_us(&mut self, _us: u32) {}
    }

    #[test]
    fn full_run_verifies_clean() {
        let chip = chip::ATTINY13;
        let mut port = MockPort::new(&chip);
        let image = FirmwareImage::new(vec![0xFF; 32], 0, chip.page_size).unwrap();

        let report = run(
            &mut port,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );

        assert!(report.success());
        assert_eq!(report.phase, Phase::Done);
        assert_eq!(report.pages_written, 1);
        assert!(report.mismatches.is_empty());
        assert_eq!(report.signature, Some(chip.signature));
        assert!(report.erased);
        assert!(!port.reset_asserted, "reset must be released");
    }

    #[test]
    fn multi_page_image_lands_byte_exact() {
        let chip = chip::ATTINY13;
        let mut port = MockPort::new(&chip);
        let bytes: Vec<u8> = (0..96u32).map(|i| i as u8).collect();
        let image = FirmwareImage::new(bytes.clone(), 0x40, chip.page_size).unwrap();

        let report = run(
            &mut port,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );

        assert!(report.success());
        assert_eq!(report.pages_written, 3);
        assert_eq!(&port.flash[0x40..0x40 + 96], &bytes[..]);
    }

    #[test]
    fn partial_page_pads_with_zero() {
        let chip = chip::ATTINY13;
        let mut port = MockPort::new(&chip);
        let image = FirmwareImage::new(vec![0xAB; 40], 0, chip.page_size).unwrap();

        let report = run(
            &mut port,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );

        assert!(report.success());
        assert_eq!(report.pages_written, 2);
        assert_eq!(&port.flash[..40], &[0xAB; 40]);
        // Pad bytes beyond the image's true end were written and verified as zero
        assert_eq!(&port.flash[40..64], &[0x00; 24]);
    }

    #[test]
    fn unresponsive_target_fails_after_bounded_retries() {
        let chip = chip::ATTINY13;
        let mut port = MockPort::new(&chip);
        port.fail_enable = true;
        let image = FirmwareImage::new(vec![0xFF; 32], 0, chip.page_size).unwrap();

        let report = run(
            &mut port,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );

        assert!(!report.success());
        assert_eq!(report.phase, Phase::Failed);
        assert_eq!(
            report.failure,
            Some(FailureReason::DeviceNotResponding { attempts: 4 })
        );
        assert_eq!(port.enable_attempts, 4);
        assert_eq!(report.pages_written, 0);
        assert!(!port.reset_asserted, "reset released even on failure");
    }

    #[test]
    fn corrupted_byte_is_reported_exactly_once() {
        let chip = chip::ATTINY13;
        let mut port = MockPort::new(&chip);
        port.read_overrides.push((0x0007, 0x00));
        let image = FirmwareImage::new(vec![0x55; 32], 0, chip.page_size).unwrap();

        let report = run(
            &mut port,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );

        assert!(!report.success());
        assert_eq!(report.phase, Phase::Done, "scan completes despite mismatch");
        assert_eq!(
            report.mismatches,
            vec![Mismatch {
                address: 0x0007,
                expected: 0x55,
                actual: 0x00,
            }]
        );
    }

    #[test]
    fn signature_mismatch_warns_by_default_and_fails_strict() {
        let chip = chip::ATTINY13;
        let image = FirmwareImage::new(vec![0xFF; 32], 0, chip.page_size).unwrap();

        let mut port = MockPort::new(&chip);
        port.signature = chip::ATTINY45.signature;
        let report = run(
            &mut port,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );
        assert!(report.success(), "lenient policy continues");
        assert_eq!(report.signature_matches, Some(false));

        let mut port = MockPort::new(&chip);
        port.signature = chip::ATTINY45.signature;
        let config = SessionConfig {
            strict_signature: true,
            ..SessionConfig::default()
        };
        let report = run(&mut port, &chip, &image, &config, &mut NoProgress);
        assert_eq!(report.phase, Phase::Failed);
        assert!(matches!(
            report.failure,
            Some(FailureReason::SignatureMismatch { .. })
        ));
        assert!(!report.erased, "strict mismatch stops before erase");
    }

    #[test]
    fn signature_read_is_idempotent() {
        let chip = chip::ATTINY13;
        let mut port = MockPort::new(&chip);
        let config = SessionConfig::default();

        let first = probe(&mut port, &chip, &config);
        let second = probe(&mut port, &chip, &config);
        assert_eq!(first.signature, second.signature);
        assert_eq!(first.signature, Some(chip.signature));
    }

    #[test]
    fn probe_reports_fuse_bytes() {
        let chip = chip::ATTINY13;
        let mut port = MockPort::new(&chip);
        port.fuse_bytes = [0x7A, 0xFF, 0x3F];

        let report = probe(&mut port, &chip, &SessionConfig::default());

        assert!(report.success());
        assert_eq!(
            report.fuses,
            Some(Fuses {
                low: 0x7A,
                high: 0xFF,
                lock: 0x3F,
            })
        );
        assert!(!port.reset_asserted);
    }

    #[test]
    fn oversized_image_is_rejected_before_any_write() {
        let chip = chip::ATTINY13;
        let mut port = MockPort::new(&chip);
        // 1000 bytes based at 0x40 pad out past the 1024-byte flash end
        let image = FirmwareImage::new(vec![0x00; 1000], 0x40, chip.page_size).unwrap();

        let report = run(
            &mut port,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );

        assert_eq!(report.phase, Phase::Failed);
        assert!(matches!(
            report.failure,
            Some(FailureReason::ImageTooLarge { .. })
        ));
        assert_eq!(report.pages_written, 0);
        assert!(!report.erased);
        assert_eq!(port.enable_attempts, 0, "no pin was driven");

        let report = verify(
            &mut port,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );
        assert!(matches!(
            report.failure,
            Some(FailureReason::ImageTooLarge { .. })
        ));
        assert!(report.mismatches.is_empty());
    }

    #[test]
    fn abort_is_honored_at_page_boundary() {
        struct AbortAfterFirstPage {
            pages_seen: u32,
        }

        impl SessionProgress for AbortAfterFirstPage {
            fn page_written(&mut self, pages_done: u32, _total: u32) {
                self.pages_seen = pages_done;
            }

            fn abort_requested(&self) -> bool {
                self.pages_seen >= 1
            }
        }

        let chip = chip::ATTINY13;
        let mut port = MockPort::new(&chip);
        let image = FirmwareImage::new(vec![0x42; 96], 0, chip.page_size).unwrap();
        let mut progress = AbortAfterFirstPage { pages_seen: 0 };

        let report = run(
            &mut port,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut progress,
        );

        assert_eq!(report.failure, Some(FailureReason::Aborted));
        assert_eq!(report.pages_written, 1);
        assert!(!port.reset_asserted);
    }

    #[test]
    fn verify_only_does_not_write() {
        let chip = chip::ATTINY13;
        let mut port = MockPort::new(&chip);
        let image = FirmwareImage::new(vec![0x12; 32], 0, chip.page_size).unwrap();

        let report = verify(
            &mut port,
            &chip,
            &image,
            &SessionConfig::default(),
            &mut NoProgress,
        );

        // Erased flash reads 0xFF everywhere, so every byte mismatches
        assert!(!report.success());
        assert_eq!(report.pages_written, 0);
        assert!(!report.erased);
        assert_eq!(report.mismatches.len(), 32);
        assert!(port.flash.iter().all(|&b| b == 0xFF));
    }
}
