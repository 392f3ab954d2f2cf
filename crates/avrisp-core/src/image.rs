//! Firmware image model
//!
//! A [`FirmwareImage`] is the core's only input: a flat byte sequence, a
//! base address and the target's page size. Producing it (HEX parsing, file
//! or network transport) is the caller's job.

use crate::chip::AvrChip;
use crate::error::{Error, Result};

/// A firmware image ready for page programming
///
/// Invariants enforced at construction: non-empty, page size is a nonzero
/// even byte count, base address is page-aligned. The final partial page, if
/// any, is zero-padded when iterated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    bytes: Vec<u8>,
    base_address: u32,
    page_size: u32,
}

/// One page-sized unit of the image, padded to the full page size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Byte address of the first byte of the page
    pub address: u32,
    /// Exactly one page of data, zero-padded past the image's true end
    pub data: Vec<u8>,
}

impl FirmwareImage {
    /// Build an image, validating its geometry
    pub fn new(bytes: Vec<u8>, base_address: u32, page_size: u32) -> Result<Self> {
        if page_size == 0 || page_size % 2 != 0 {
            return Err(Error::InvalidPageSize(page_size));
        }
        if bytes.is_empty() {
            return Err(Error::EmptyImage);
        }
        if base_address % page_size != 0 {
            return Err(Error::UnalignedBaseAddress {
                base: base_address,
                page_size,
            });
        }
        Ok(Self {
            bytes,
            base_address,
            page_size,
        })
    }

    /// The raw image bytes, without padding
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte address the image is programmed at
    pub fn base_address(&self) -> u32 {
        self.base_address
    }

    /// Declared page size in bytes
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// True length in bytes, without padding
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; empty images are rejected at construction
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length rounded up to a whole number of pages
    pub fn padded_len(&self) -> usize {
        self.len().div_ceil(self.page_size as usize) * self.page_size as usize
    }

    /// Number of pages the image occupies
    pub fn page_count(&self) -> usize {
        self.padded_len() / self.page_size as usize
    }

    /// Check that the padded image fits inside the chip's flash
    pub fn check_fits(&self, chip: &AvrChip) -> Result<()> {
        let end = self.base_address as usize + self.padded_len();
        if end > chip.flash_size as usize {
            return Err(Error::ImageTooLarge {
                len: self.len(),
                base: self.base_address,
                flash_size: chip.flash_size,
            });
        }
        Ok(())
    }

    /// Every byte of the padded range, pad positions reading as zero
    pub fn padded_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        let pad = self.padded_len() - self.len();
        self.bytes.iter().copied().chain(std::iter::repeat_n(0, pad))
    }

    /// Iterate the image page by page, in increasing address order
    pub fn pages(&self) -> impl Iterator<Item = Page> + '_ {
        let page_size = self.page_size as usize;
        self.bytes.chunks(page_size).enumerate().map(move |(i, chunk)| {
            let mut data = chunk.to_vec();
            data.resize(page_size, 0x00);
            Page {
                address: self.base_address + (i * page_size) as u32,
                data,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip;

    #[test]
    fn rejects_bad_geometry() {
        assert!(matches!(
            FirmwareImage::new(vec![0; 4], 0, 0),
            Err(Error::InvalidPageSize(0))
        ));
        assert!(matches!(
            FirmwareImage::new(vec![0; 4], 0, 31),
            Err(Error::InvalidPageSize(31))
        ));
        assert!(matches!(
            FirmwareImage::new(Vec::new(), 0, 32),
            Err(Error::EmptyImage)
        ));
        assert!(matches!(
            FirmwareImage::new(vec![0; 4], 16, 32),
            Err(Error::UnalignedBaseAddress { base: 16, .. })
        ));
    }

    #[test]
    fn whole_pages_are_not_padded() {
        let image = FirmwareImage::new(vec![0xAA; 64], 0, 32).unwrap();
        assert_eq!(image.page_count(), 2);
        assert_eq!(image.padded_len(), 64);
        for page in image.pages() {
            assert_eq!(page.data, vec![0xAA; 32]);
        }
    }

    #[test]
    fn final_partial_page_is_zero_padded() {
        let image = FirmwareImage::new(vec![0x11; 40], 0x40, 32).unwrap();
        assert_eq!(image.page_count(), 2);
        assert_eq!(image.padded_len(), 64);

        let pages: Vec<Page> = image.pages().collect();
        assert_eq!(pages[0].address, 0x40);
        assert_eq!(pages[0].data, vec![0x11; 32]);
        assert_eq!(pages[1].address, 0x60);
        assert_eq!(&pages[1].data[..8], &[0x11; 8]);
        assert_eq!(&pages[1].data[8..], &[0x00; 24]);

        let padded: Vec<u8> = image.padded_bytes().collect();
        assert_eq!(padded.len(), 64);
        assert_eq!(&padded[40..], &[0x00; 24]);
    }

    #[test]
    fn fit_check_uses_padded_length() {
        // 1000 bytes at base 0x20 pads to 1024, overrunning 1 KiB flash
        let image = FirmwareImage::new(vec![0; 1000], 0x20, 32).unwrap();
        assert!(image.check_fits(&chip::ATTINY13).is_err());

        let image = FirmwareImage::new(vec![0; 1000], 0, 32).unwrap();
        assert!(image.check_fits(&chip::ATTINY13).is_ok());
    }
}
