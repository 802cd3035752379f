//! Command stream builder for the QL/PT raster protocol.
//!
//! The encoder is an append-only byte accumulator plus a set of staged
//! settings. Mutators only stage values; the bytes are produced when the
//! owning `add_*` emit operation runs, so a setting changed after an emit
//! call never retroactively alters already emitted bytes.

use log::{debug, warn};

use crate::{
    error::Error,
    model::{Family, Model},
    packbits,
};

/// Settings staged on the encoder, consumed by the emit operations.
///
/// `media_*` fields left at `None` are marked invalid in the media command's
/// flag byte. The cut/resolution/color flags feed the expanded mode byte;
/// `half_cut` and `no_chain` only exist in the PT dialect, `cut_at_end` and
/// `two_color` only in the QL dialect.
#[derive(Debug, Clone)]
pub struct RasterSettings {
    pub media_type: Option<u8>,
    pub media_width: Option<u8>,
    pub media_length: Option<u8>,
    pub quality: bool,
    pub dpi_600: bool,
    pub two_color: bool,
    pub cut_at_end: bool,
    pub half_cut: bool,
    pub no_chain: bool,
}

impl Default for RasterSettings {
    fn default() -> Self {
        RasterSettings {
            media_type: None,
            media_width: None,
            media_length: None,
            quality: true,
            dpi_600: false,
            two_color: false,
            cut_at_end: true,
            half_cut: true,
            no_chain: true,
        }
    }
}

/// Compute the expanded mode flag byte from the staged settings.
///
/// The bit layout differs between the two protocol dialects:
///
/// | bit | QL           | PT        |
/// |-----|--------------|-----------|
/// | 0   | two color    | -         |
/// | 2   | -            | half cut  |
/// | 3   | cut at end   | no chain  |
/// | 5   | -            | 600 dpi   |
/// | 6   | 600 dpi      | -         |
fn expanded_mode_flags(family: Family, settings: &RasterSettings) -> u8 {
    let mut flags = 0u8;
    match family {
        Family::Pt => {
            if settings.half_cut {
                flags |= 1 << 2;
            }
            if settings.no_chain {
                flags |= 1 << 3;
            }
            if settings.dpi_600 {
                flags |= 1 << 5;
            }
        }
        Family::Ql => {
            if settings.two_color {
                flags |= 1 << 0;
            }
            if settings.cut_at_end {
                flags |= 1 << 3;
            }
            if settings.dpi_600 {
                flags |= 1 << 6;
            }
        }
    }
    flags
}

/// Stateful builder for one print job's command stream.
pub struct RasterEncoder {
    model: Model,
    settings: RasterSettings,
    data: Vec<u8>,
    page_number: u32,
    compression_enabled: bool,
}

impl RasterEncoder {
    pub fn new(model: &Model) -> Self {
        RasterEncoder {
            model: model.clone(),
            settings: RasterSettings::default(),
            data: Vec::new(),
            page_number: 0,
            compression_enabled: false,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn settings(&self) -> &RasterSettings {
        &self.settings
    }

    /// Device pixel width in dots; the width any bit-plane must match.
    pub fn pixel_width(&self) -> u32 {
        self.model.pixel_width()
    }

    /// The accumulated command stream.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take the finished command stream out of the encoder.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }

    /// Drop all accumulated bytes, keeping staged settings.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    // Staging mutators. Values take effect at the next emit call that
    // reads them.

    pub fn set_media_type(&mut self, value: u8) {
        self.settings.media_type = Some(value);
    }

    pub fn set_media_width(&mut self, value: u8) {
        self.settings.media_width = Some(value);
    }

    pub fn set_media_length(&mut self, value: u8) {
        self.settings.media_length = Some(value);
    }

    pub fn set_quality(&mut self, value: bool) {
        self.settings.quality = value;
    }

    pub fn set_dpi_600(&mut self, value: bool) {
        self.settings.dpi_600 = value;
    }

    pub fn set_two_color(&mut self, value: bool) {
        self.settings.two_color = value;
    }

    pub fn set_cut_at_end(&mut self, value: bool) {
        self.settings.cut_at_end = value;
    }

    pub fn set_half_cut(&mut self, value: bool) {
        self.settings.half_cut = value;
    }

    pub fn set_no_chain(&mut self, value: bool) {
        self.settings.no_chain = value;
    }

    /// Model specific run of zero bytes that flushes any garbage left in the
    /// printer's receive buffer.
    pub fn add_invalidate(&mut self) {
        self.data
            .extend(std::iter::repeat(0x00).take(self.model.num_invalidate_bytes));
    }

    /// ESC @ : initialize. Also resets the page counter for this job.
    pub fn add_initialize(&mut self) {
        self.page_number = 0;
        self.data.extend_from_slice(&[0x1B, 0x40]);
    }

    /// ESC i S : request a status reply from the printer.
    pub fn add_status_request(&mut self) {
        self.data.extend_from_slice(&[0x1B, 0x69, 0x53]);
    }

    /// ESC i a : switch to raster command mode, on models that need it.
    pub fn add_switch_mode(&mut self) {
        if !self.model.mode_setting {
            warn!(
                "{}: mode switch not supported, skipping",
                self.model.identifier
            );
            return;
        }
        self.data.extend_from_slice(&[0x1B, 0x69, 0x61, 0x01]);
    }

    /// ESC i z : print information (media and quality) command.
    ///
    /// Serializes the staged media type/width/length and quality flag
    /// together with the raster line count of this page. The continuation
    /// byte is nonzero after the first page of a multi page job.
    pub fn add_media_and_quality(&mut self, raster_lines: u32) {
        let s = &self.settings;
        let mut valid_flags = 0x80u8;
        if s.media_type.is_some() {
            valid_flags |= 1 << 1;
        }
        if s.media_width.is_some() {
            valid_flags |= 1 << 2;
        }
        if s.media_length.is_some() {
            valid_flags |= 1 << 3;
        }
        if s.quality {
            valid_flags |= 1 << 6;
        }
        debug!(
            "media/quality: flags {:02X} type {:?} width {:?} length {:?} lines {}",
            valid_flags, s.media_type, s.media_width, s.media_length, raster_lines
        );

        self.data.extend_from_slice(&[0x1B, 0x69, 0x7A]);
        self.data.push(valid_flags);
        self.data.push(s.media_type.unwrap_or(0));
        self.data.push(s.media_width.unwrap_or(0));
        self.data.push(s.media_length.unwrap_or(0));
        self.data.extend_from_slice(&raster_lines.to_le_bytes());
        self.data.push(if self.page_number == 0 { 0 } else { 1 });
        self.data.push(0);
    }

    /// ESC i M : enable or disable the auto cutter. No-op on models
    /// without one.
    pub fn add_autocut(&mut self, autocut: bool) {
        if !self.model.cutting {
            return;
        }
        self.data
            .extend_from_slice(&[0x1B, 0x69, 0x4D, if autocut { 0x40 } else { 0x00 }]);
    }

    /// ESC i A : cut every `n` labels. QL dialect only; the PT command set
    /// has no equivalent.
    pub fn add_cut_every(&mut self, n: u8) {
        if !self.model.cutting || self.model.family == Family::Pt {
            return;
        }
        self.data.extend_from_slice(&[0x1B, 0x69, 0x41, n]);
    }

    /// ESC i K : expanded mode flag byte, computed from the staged settings
    /// at the moment of this call.
    pub fn add_expanded_mode(&mut self) {
        if !self.model.expanded_mode {
            return;
        }
        let flags = expanded_mode_flags(self.model.family, &self.settings);
        debug!("expanded mode: {:02X}", flags);
        self.data.extend_from_slice(&[0x1B, 0x69, 0x4B, flags]);
    }

    /// ESC i d : feed margin in dots.
    pub fn add_margins(&mut self, dots: u16) {
        self.data.extend_from_slice(&[0x1B, 0x69, 0x64]);
        self.data.extend_from_slice(&dots.to_le_bytes());
    }

    /// M : select raster compression. No-op on models without PackBits
    /// support; otherwise the choice applies to every following raster row.
    pub fn add_compression(&mut self, enable: bool) {
        if !self.model.compression {
            return;
        }
        self.compression_enabled = enable;
        self.data
            .extend_from_slice(&[0x4D, if enable { 0x02 } else { 0x00 }]);
    }

    /// Append the bit-plane rows in the device's framing.
    ///
    /// `black` (and `red`, when two color printing is in use) are packed
    /// MSB-first bitmaps of `width` x `height` pixels. `width` must equal
    /// [`Self::pixel_width`]; anything else is a contract violation.
    pub fn add_raster_data(
        &mut self,
        black: &[u8],
        red: Option<&[u8]>,
        width: u32,
        height: u32,
    ) -> Result<(), Error> {
        let expected = self.pixel_width();
        if width != expected {
            return Err(Error::InvalidPixelWidth {
                expected,
                actual: width,
            });
        }
        let row_len = (width / 8) as usize;
        let plane_len = row_len * height as usize;
        if black.len() < plane_len || red.map_or(false, |r| r.len() < plane_len) {
            return Err(Error::InvalidConfig(format!(
                "bit-plane shorter than {} rows of {} bytes",
                height, row_len
            )));
        }

        for y in 0..height as usize {
            let rows: [Option<&[u8]>; 2] = [
                Some(&black[y * row_len..(y + 1) * row_len]),
                red.map(|r| &r[y * row_len..(y + 1) * row_len]),
            ];
            for (i, row) in rows.iter().enumerate() {
                let row = match row {
                    Some(row) => *row,
                    None => continue,
                };
                let packed;
                let row = if self.compression_enabled {
                    packed = packbits::encode(row);
                    &packed[..]
                } else {
                    row
                };
                let translen = row.len();
                match self.model.family {
                    Family::Pt => {
                        self.data.push(0x47);
                        self.data
                            .extend_from_slice(&(translen as u16).to_le_bytes());
                    }
                    Family::Ql => {
                        if red.is_some() {
                            self.data
                                .extend_from_slice(&[0x77, if i == 0 { 0x01 } else { 0x02 }]);
                        } else {
                            self.data.extend_from_slice(&[0x67, 0x00]);
                        }
                        self.data.push(translen as u8);
                    }
                }
                self.data.extend_from_slice(row);
            }
        }
        Ok(())
    }

    /// FF / Control-Z : print this page, ejecting on the last one. Advances
    /// the page counter so a following media command stages as a
    /// continuation page.
    pub fn add_print(&mut self, last_page: bool) {
        self.data.push(if last_page { 0x1A } else { 0x0C });
        self.page_number += 1;
    }
}
