//! Program command implementation

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use avrisp_core::session::{self, Phase, SessionProgress};

use crate::cli::TargetArgs;
use crate::commands;

/// Progress reporter using indicatif progress bars
pub struct IndicatifProgress {
    multi: MultiProgress,
    current_bar: Option<ProgressBar>,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            current_bar: None,
        }
    }

    fn create_bar(&mut self, total: u64, phase: &'static str) {
        self.finish_current();
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {}",
                    phase
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.current_bar = Some(pb);
    }

    fn create_spinner(&mut self, message: &'static str) {
        self.finish_current();
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        self.current_bar = Some(pb);
    }

    fn finish_current(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProgress for IndicatifProgress {
    fn phase_started(&mut self, phase: Phase) {
        match phase {
            Phase::EnteringMode => self.create_spinner("Entering programming mode..."),
            Phase::Identifying => self.create_spinner("Reading signature..."),
            Phase::Erasing => self.create_spinner("Erasing chip..."),
            // Programming and verifying bars are sized on the first callback
            Phase::Programming | Phase::Verifying => self.finish_current(),
            Phase::Done | Phase::Failed | Phase::Idle => self.finish_current(),
        }
    }

    fn page_written(&mut self, pages_done: u32, pages_total: u32) {
        if self.current_bar.is_none() {
            self.create_bar(u64::from(pages_total), "pages written");
        }
        if let Some(pb) = &self.current_bar {
            pb.set_position(u64::from(pages_done));
        }
    }

    fn byte_verified(&mut self, bytes_done: usize, bytes_total: usize) {
        if self.current_bar.is_none() {
            self.create_bar(bytes_total as u64, "bytes verified");
        }
        if let Some(pb) = &self.current_bar {
            pb.set_position(bytes_done as u64);
        }
    }
}

impl Drop for IndicatifProgress {
    fn drop(&mut self) {
        self.finish_current();
    }
}

/// Run the program command
pub fn run(target: &TargetArgs, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (chip, mut port, config) = commands::resolve_target(target)?;
    let image = commands::load_image(input, chip)?;

    println!(
        "Programming {} ({} bytes flash, {}-byte pages)",
        chip.name, chip.flash_size, chip.page_size
    );

    let mut progress = IndicatifProgress::new();
    let report = session::run(&mut *port, chip, &image, &config, &mut progress);
    drop(progress);

    commands::finish_report(&report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_constructs_without_a_bar() {
        let progress = IndicatifProgress::default();
        assert!(progress.current_bar.is_none());
    }
}
