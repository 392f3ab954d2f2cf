//! avrisp-linux-gpio - Linux GPIO bit-bang ISP port
//!
//! Drives the four ISP lines (SCK, MOSI, MISO, RESET) through the Linux
//! character device GPIO interface (gpiocdev), the modern replacement for
//! the deprecated sysfs interface. Any platform exposing `/dev/gpiochipN`
//! (Raspberry Pi, BeagleBone, ...) can program AVR targets this way, no SPI
//! peripheral required.
//!
//! # Target wiring
//!
//! | AVR pin | GPIO role      | Direction |
//! |---------|----------------|-----------|
//! | SCK     | clock          | output    |
//! | MOSI    | data to target | output    |
//! | MISO    | data from target | input (pull-up) |
//! | RESET   | reset, active low | output |
//!
//! The target must share ground with the host and be powered at a level
//! compatible with the host's GPIO voltage.
//!
//! # Usage with the avrisp CLI
//!
//! ```bash
//! avrisp program -p linux_gpio:dev=/dev/gpiochip0,sck=8,mosi=10,miso=9,reset=20 \
//!     --chip attiny13 -i firmware.hex
//!
//! # gpiochip number instead of device path, custom clock rate (kHz)
//! avrisp probe -p linux_gpio:gpiochip=0,sck=8,mosi=10,miso=9,reset=20,sckrate=50
//! ```

pub mod device;
pub mod error;

pub use device::{parse_options, LinuxGpioIsp, LinuxGpioIspConfig};
pub use error::{LinuxGpioError, Result};

/// Open a Linux GPIO ISP port and return it boxed for CLI dispatch
///
/// # Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path (or use `gpiochip=N`)
/// - `gpiochip=N` - GPIO chip number (alternative to `dev`)
/// - `sck=N` - clock line offset (required)
/// - `mosi=N` - data-out line offset (required)
/// - `miso=N` - data-in line offset (required)
/// - `reset=N` - reset line offset (required)
/// - `sckrate=N` - SCK rate in kHz (optional, default ~100 kHz)
pub fn open_linux_gpio_isp(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn avrisp_core::programmer::IspPort + Send>, Box<dyn std::error::Error>>
{
    let config = parse_options(options)?;
    let port = LinuxGpioIsp::open(&config)?;
    Ok(Box::new(port))
}
