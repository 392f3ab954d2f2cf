//! Programmer port registration and dispatch
//!
//! Ports are selected with an option string of the form
//! `name:key=value,key=value,...`, e.g.
//! `linux_gpio:dev=/dev/gpiochip0,sck=8,mosi=10,miso=9,reset=20`.

use avrisp_core::programmer::IspPort;

/// Information about a programmer port backend
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Get information about all port backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        description: "In-memory AVR target emulator for testing",
    });

    #[cfg(feature = "linux-gpio")]
    programmers.push(ProgrammerInfo {
        name: "linux_gpio",
        description:
            "Linux GPIO character device bit-bang (dev=/dev/gpiochipN,sck=,mosi=,miso=,reset=)",
    });

    programmers
}

/// Generate a short list of port names for CLI help
pub fn programmer_names_short() -> String {
    let names: Vec<&str> = available_programmers().iter().map(|p| p.name).collect();
    if names.is_empty() {
        "none compiled in".to_string()
    } else {
        names.join(", ")
    }
}

/// Split `name:key=value,...` into the name and its option pairs
fn split_spec(spec: &str) -> (&str, Vec<(&str, &str)>) {
    let (name, rest) = match spec.split_once(':') {
        Some((name, rest)) => (name, rest),
        None => (spec, ""),
    };

    let options = rest
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect();

    (name, options)
}

/// Open a programmer port from its option string
#[allow(unused_variables)]
pub fn open_port(spec: &str) -> Result<Box<dyn IspPort + Send>, Box<dyn std::error::Error>> {
    let (name, options) = split_spec(spec);

    match name {
        #[cfg(feature = "dummy")]
        "dummy" => Ok(Box::new(avrisp_dummy::DummyAvr::new_default())),

        #[cfg(feature = "linux-gpio")]
        "linux_gpio" | "linux-gpio" => avrisp_linux_gpio::open_linux_gpio_isp(&options),

        _ => Err(format!(
            "unknown programmer '{}' (available: {})",
            name,
            programmer_names_short()
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_splits_into_name_and_options() {
        let (name, options) = split_spec("linux_gpio:dev=/dev/gpiochip0,sck=8");
        assert_eq!(name, "linux_gpio");
        assert_eq!(options, vec![("dev", "/dev/gpiochip0"), ("sck", "8")]);

        let (name, options) = split_spec("dummy");
        assert_eq!(name, "dummy");
        assert!(options.is_empty());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn dummy_port_opens() {
        assert!(open_port("dummy").is_ok());
        assert!(open_port("no_such_port").is_err());
    }
}
