//! Linux GPIO ISP device implementation
//!
//! Implements the pin-level [`BitbangIspPort`] trait over a gpiocdev line
//! request and gets the byte transfers from the core bitbang helpers. ISP
//! timing is relaxed; the half-period sleep only has to stay above the
//! target's minimum SCK period (2 CPU cycles high, 2 low), so thread::sleep
//! jitter is harmless.

use crate::error::{LinuxGpioError, Result};

use gpiocdev::line::{Bias, Offset, Value};
use gpiocdev::request::{Config, Request};

use avrisp_core::isp::IspFrame;
use avrisp_core::programmer::bitbang::{self, BitbangIspPort};
use avrisp_core::programmer::IspPort;

/// GPIO line indices
#[derive(Debug, Clone, Copy)]
enum Line {
    Sck = 0,
    Mosi = 1,
    Miso = 2,
    Reset = 3,
}

/// Number of GPIO lines we use
const NUM_LINES: usize = 4;

/// Default half-period delay in nanoseconds (for ~100 kHz SCK)
const DEFAULT_HALF_PERIOD_NS: u64 = 5000;

/// Configuration for opening a Linux GPIO ISP port
#[derive(Debug, Clone)]
pub struct LinuxGpioIspConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// SCK (clock) GPIO line offset
    pub sck: Offset,
    /// MOSI (data to target) GPIO line offset
    pub mosi: Offset,
    /// MISO (data from target) GPIO line offset
    pub miso: Offset,
    /// RESET (active low) GPIO line offset
    pub reset: Offset,
    /// Half-period delay in nanoseconds
    pub half_period_ns: u64,
}

impl Default for LinuxGpioIspConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            sck: 0,
            mosi: 0,
            miso: 0,
            reset: 0,
            half_period_ns: DEFAULT_HALF_PERIOD_NS,
        }
    }
}

impl LinuxGpioIspConfig {
    /// Create a new configuration with the given device path and pins
    pub fn new(device: impl Into<String>, sck: Offset, mosi: Offset, miso: Offset, reset: Offset) -> Self {
        Self {
            device: device.into(),
            sck,
            mosi,
            miso,
            reset,
            ..Default::default()
        }
    }

    /// Set the SCK rate in Hz (approximate, via half-period calculation)
    pub fn with_sck_rate_hz(mut self, hz: u32) -> Self {
        if hz > 0 {
            self.half_period_ns = 500_000_000 / hz as u64;
        }
        self
    }
}

/// Linux GPIO ISP port using bit-banging
pub struct LinuxGpioIsp {
    /// GPIO line request handle
    request: Request,
    /// GPIO line offsets indexed by Line
    offsets: [Offset; NUM_LINES],
    /// Half-period delay in nanoseconds
    half_period_ns: u64,
}

impl LinuxGpioIsp {
    /// Open a Linux GPIO ISP port with the given configuration
    ///
    /// Initial line state: SCK low, MOSI low, RESET high (target running),
    /// MISO input with pull-up.
    pub fn open(config: &LinuxGpioIspConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }

        log::debug!("linux_gpio_isp: opening device {}", config.device);

        let offsets = [config.sck, config.mosi, config.miso, config.reset];

        let mut req_config = Config::default();
        req_config.with_line(config.sck).as_output(Value::Inactive);
        req_config.with_line(config.mosi).as_output(Value::Inactive);
        req_config
            .with_line(config.miso)
            .as_input()
            .with_bias(Bias::PullUp);
        // RESET starts high: the target keeps running until a session
        // asserts it
        req_config.with_line(config.reset).as_output(Value::Active);

        let request = Request::from_config(req_config)
            .on_chip(&config.device)
            .with_consumer("avrisp")
            .request()
            .map_err(LinuxGpioError::LineRequestFailed)?;

        log::info!(
            "linux_gpio_isp: opened {} (sck={}, mosi={}, miso={}, reset={}, sck rate ~{} kHz)",
            config.device,
            config.sck,
            config.mosi,
            config.miso,
            config.reset,
            500_000 / config.half_period_ns.max(1)
        );

        Ok(Self {
            request,
            offsets,
            half_period_ns: config.half_period_ns,
        })
    }

    fn set_line(&mut self, line: Line, high: bool) {
        let value = if high { Value::Active } else { Value::Inactive };
        if let Err(e) = self.request.set_value(self.offsets[line as usize], value) {
            log::error!("failed to set {:?}: {}", line, e);
        }
    }
}

impl BitbangIspPort for LinuxGpioIsp {
    fn set_sck(&mut self, high: bool) {
        self.set_line(Line::Sck, high);
    }

    fn set_mosi(&mut self, high: bool) {
        self.set_line(Line::Mosi, high);
    }

    fn get_miso(&self) -> bool {
        match self.request.value(self.offsets[Line::Miso as usize]) {
            Ok(Value::Active) => true,
            Ok(Value::Inactive) => false,
            Err(e) => {
                log::error!("failed to get MISO: {}", e);
                false
            }
        }
    }

    fn set_reset(&mut self, asserted: bool) {
        // RESET is active low
        let high = !asserted;
        self.set_line(Line::Reset, high);
    }

    fn half_period_delay(&self) {
        if self.half_period_ns > 0 {
            std::thread::sleep(std::time::Duration::from_nanos(self.half_period_ns));
        }
    }
}

impl IspPort for LinuxGpioIsp {
    fn transfer(&mut self, frame: IspFrame) -> [u8; 4] {
        bitbang::transfer_frame(self, frame)
    }

    fn assert_reset(&mut self) {
        bitbang::assert_reset(self);
    }

    fn release_reset(&mut self) {
        bitbang::release_reset(self);
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}

/// Parse programmer options from a list of key-value pairs
///
/// See [`crate::open_linux_gpio_isp`] for the supported options.
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxGpioIspConfig> {
    let mut config = LinuxGpioIspConfig::default();
    let mut have_sck = false;
    let mut have_mosi = false;
    let mut have_miso = false;
    let mut have_reset = false;
    let mut gpiochip: Option<u32> = None;

    let parse_offset = |key: &str, value: &str| -> Result<Offset> {
        value
            .parse()
            .map_err(|_| LinuxGpioError::InvalidParameter(format!("{}={}", key, value)))
    };

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "gpiochip" => {
                gpiochip = Some(
                    value
                        .parse()
                        .map_err(|_| LinuxGpioError::InvalidParameter(format!("gpiochip={}", value)))?,
                );
            }
            "sck" => {
                config.sck = parse_offset(key, value)?;
                have_sck = true;
            }
            "mosi" => {
                config.mosi = parse_offset(key, value)?;
                have_mosi = true;
            }
            "miso" => {
                config.miso = parse_offset(key, value)?;
                have_miso = true;
            }
            "reset" => {
                config.reset = parse_offset(key, value)?;
                have_reset = true;
            }
            "sckrate" => {
                let rate_khz: u32 = value
                    .parse()
                    .map_err(|_| LinuxGpioError::InvalidParameter(format!("sckrate={}", value)))?;
                config = config.with_sck_rate_hz(rate_khz * 1000);
            }
            _ => {
                log::warn!("linux_gpio_isp: unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        match gpiochip {
            Some(n) if n <= 9 => config.device = format!("/dev/gpiochip{}", n),
            Some(n) => {
                return Err(LinuxGpioError::InvalidParameter(format!(
                    "gpiochip={}: maximum supported is 9",
                    n
                )))
            }
            None => return Err(LinuxGpioError::NoDevice),
        }
    } else if gpiochip.is_some() {
        return Err(LinuxGpioError::InvalidParameter(
            "only one of 'dev' or 'gpiochip' can be given".to_string(),
        ));
    }

    if !have_sck {
        return Err(LinuxGpioError::MissingParameter("sck"));
    }
    if !have_mosi {
        return Err(LinuxGpioError::MissingParameter("mosi"));
    }
    if !have_miso {
        return Err(LinuxGpioError::MissingParameter("miso"));
    }
    if !have_reset {
        return Err(LinuxGpioError::MissingParameter("reset"));
    }

    Ok(config)
}
