use crate::error::Error;

/// Protocol dialect, selected once from the model descriptor.
///
/// The two families share most of the command set but differ in raster row
/// framing and in the bit layout of the expanded mode flag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// QL series: wide print head, rows framed as `0x67`/`0x77` with a
    /// one-byte transfer length.
    Ql,
    /// PT series: narrow tape, rows framed as `0x47` with a two-byte
    /// little-endian transfer length.
    Pt,
}

/// Device capability descriptor.
///
/// The fields are public so a caller can inject its own descriptor for a
/// model that is not in the built-in table. All values are reference data
/// resolved once per job; nothing here is mutated by the encoder.
#[derive(Debug, Clone)]
pub struct Model {
    pub identifier: &'static str,
    /// Bytes per raster row; the device pixel width is `bytes_per_row * 8`.
    pub bytes_per_row: u32,
    /// Number of zero bytes sent by the invalidate command.
    pub num_invalidate_bytes: usize,
    /// Supports the raster mode switch command (ESC i a).
    pub mode_setting: bool,
    /// Has a cutter (ESC i M / ESC i A are honored).
    pub cutting: bool,
    /// Accepts the expanded mode flag byte (ESC i K).
    pub expanded_mode: bool,
    /// Accepts PackBits compressed raster rows.
    pub compression: bool,
    /// Fixed horizontal correction added to the computed print offset.
    pub additional_offset_r: u32,
    pub family: Family,
}

impl Model {
    /// Look up a model by its identifier, e.g. `"QL-800"`.
    ///
    /// An unknown identifier is a fatal configuration error.
    pub fn find(identifier: &str) -> Result<&'static Model, Error> {
        ALL_MODELS
            .iter()
            .find(|m| m.identifier == identifier)
            .ok_or_else(|| Error::UnknownModel(identifier.to_string()))
    }

    /// Device pixel width in dots. Any bit-plane handed to the encoder must
    /// match this exactly.
    pub fn pixel_width(&self) -> u32 {
        self.bytes_per_row * 8
    }
}

macro_rules! model {
    ($id:expr, $bpr:expr, $inv:expr, $mode:expr, $cut:expr, $exp:expr, $comp:expr, $family:expr) => {
        Model {
            identifier: $id,
            bytes_per_row: $bpr,
            num_invalidate_bytes: $inv,
            mode_setting: $mode,
            cutting: $cut,
            expanded_mode: $exp,
            compression: $comp,
            additional_offset_r: 0,
            family: $family,
        }
    };
}

/// Built-in capability table.
///
/// QL-720NW, QL-800 and QL-820NWB are tested on hardware; the remaining
/// entries follow the Brother raster command references.
pub const ALL_MODELS: &[Model] = &[
    model!("QL-500", 90, 200, false, false, false, false, Family::Ql),
    model!("QL-550", 90, 200, false, true, false, false, Family::Ql),
    model!("QL-560", 90, 200, false, true, false, false, Family::Ql),
    model!("QL-570", 90, 200, false, true, false, false, Family::Ql),
    model!("QL-580N", 90, 200, false, true, false, false, Family::Ql),
    model!("QL-600", 90, 200, false, true, true, false, Family::Ql),
    model!("QL-650TD", 90, 200, false, true, false, false, Family::Ql),
    model!("QL-700", 90, 200, false, true, false, false, Family::Ql),
    model!("QL-710W", 90, 200, false, true, false, true, Family::Ql),
    model!("QL-720NW", 90, 200, false, true, false, true, Family::Ql),
    model!("QL-800", 90, 400, false, true, true, false, Family::Ql),
    model!("QL-810W", 90, 400, false, true, true, false, Family::Ql),
    model!("QL-820NWB", 90, 400, false, true, true, false, Family::Ql),
    model!("QL-1050", 162, 400, true, true, false, true, Family::Ql),
    model!("QL-1060N", 162, 400, true, true, false, true, Family::Ql),
    model!("QL-1100", 162, 400, true, true, true, false, Family::Ql),
    model!("QL-1110NWB", 162, 400, true, true, true, false, Family::Ql),
    model!("QL-1115NWB", 162, 400, true, true, true, false, Family::Ql),
    model!("PT-P750W", 16, 100, true, false, false, true, Family::Pt),
    model!("PT-P900W", 70, 100, true, true, true, true, Family::Pt),
    model!("PT-P950NW", 70, 100, true, true, true, true, Family::Pt),
];
