//! avrisp-core - Core library for bit-banged AVR ISP programming
//!
//! This crate implements the legacy AVR low-voltage serial programming
//! protocol (ISP) over four software-toggled GPIO lines: SCK, MOSI, MISO
//! and RESET. No SPI peripheral is required on the host; every bit is
//! clocked out in software.
//!
//! # Layers
//!
//! Responses flow back up through the same layers commands flow down:
//!
//! - [`programmer`] - the [`IspPort`](programmer::IspPort) seam between the
//!   protocol and the hardware, plus [`programmer::bitbang`] helpers that
//!   turn pin-level operations into byte transfers
//! - [`isp`] - the fixed 4-byte command frames of the serial programming
//!   instruction set
//! - [`protocol`] - one function per ISP operation (programming enable,
//!   signature read, chip erase, page load/write, flash read)
//! - [`session`] - the programming sequencer: enter mode, identify, erase,
//!   program page by page, verify, and report
//!
//! # Example
//!
//! ```ignore
//! use avrisp_core::{chip, image::FirmwareImage, session};
//!
//! let chip = chip::find("attiny13").unwrap();
//! let image = FirmwareImage::new(firmware_bytes, 0, chip.page_size)?;
//! let report = session::run(&mut port, chip, &image,
//!                           &session::SessionConfig::default(),
//!                           &mut session::NoProgress);
//! if report.success() {
//!     println!("programmed {} pages", report.pages_written);
//! }
//! ```
//!
//! The crate never touches files, networks, or HEX records; callers hand it
//! a flat byte image and a port. Fuse and EEPROM programming are out of
//! scope, as are high-voltage and debugWIRE protocols.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod chip;
pub mod error;
pub mod image;
pub mod isp;
pub mod programmer;
pub mod protocol;
pub mod session;

pub use error::{Error, Result};
