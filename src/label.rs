use crate::error::Error;

/// Physical form factor of the installed media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFactor {
    /// Fixed size rectangular label on a carrier tape.
    DieCut,
    /// Fixed size round label on a carrier tape.
    RoundDieCut,
    /// Fixed width, variable length tape (QL series).
    Continuous,
    /// Narrow format continuous tape (PT series).
    PtContinuous,
}

impl FormFactor {
    /// Die-cut family labels have a fixed printable box in both dimensions.
    pub fn is_die_cut(self) -> bool {
        matches!(self, FormFactor::DieCut | FormFactor::RoundDieCut)
    }
}

/// Label geometry descriptor.
///
/// Like [`crate::Model`] this is read-only reference data with public fields,
/// so unusual media can be described by the caller directly.
#[derive(Debug, Clone)]
pub struct Label {
    pub identifier: &'static str,
    pub form_factor: FormFactor,
    /// Total tape width and length in printer dots (length 0 for continuous).
    pub dots_total: [u32; 2],
    /// Printable area width and height in dots (height 0 for continuous).
    pub dots_printable: [u32; 2],
    /// Tape size in millimeters as reported by the printer status
    /// (length 0 for continuous).
    pub tape_size: [u8; 2],
    /// Unprintable dots at the right edge of the tape.
    pub offset_r: u32,
    /// Default feed margin in dots.
    pub feed_margin: u16,
}

impl Label {
    /// Look up a label by its identifier, e.g. `"29x90"` or `"62"`.
    pub fn find(identifier: &str) -> Result<&'static Label, Error> {
        ALL_LABELS
            .iter()
            .find(|l| l.identifier == identifier)
            .ok_or_else(|| Error::UnknownLabel(identifier.to_string()))
    }
}

macro_rules! label {
    ($id:expr, $ff:expr, $total:expr, $printable:expr, $mm:expr, $offset_r:expr, $feed:expr) => {
        Label {
            identifier: $id,
            form_factor: $ff,
            dots_total: $total,
            dots_printable: $printable,
            tape_size: $mm,
            offset_r: $offset_r,
            feed_margin: $feed,
        }
    };
}

use FormFactor::{Continuous, DieCut, PtContinuous, RoundDieCut};

/// Built-in media table for 300 dpi QL models and 360 dpi PT models.
pub const ALL_LABELS: &[Label] = &[
    // Continuous tapes
    label!("12", Continuous, [142, 0], [106, 0], [12, 0], 29, 35),
    label!("29", Continuous, [342, 0], [306, 0], [29, 0], 6, 35),
    label!("38", Continuous, [449, 0], [413, 0], [38, 0], 12, 35),
    label!("50", Continuous, [590, 0], [554, 0], [50, 0], 12, 35),
    label!("54", Continuous, [636, 0], [590, 0], [54, 0], 0, 35),
    label!("62", Continuous, [732, 0], [696, 0], [62, 0], 12, 35),
    label!("62red", Continuous, [732, 0], [696, 0], [62, 0], 12, 35),
    label!("102", Continuous, [1200, 0], [1164, 0], [102, 0], 12, 35),
    // Die-cut labels
    label!("17x54", DieCut, [201, 636], [165, 566], [17, 54], 0, 0),
    label!("17x87", DieCut, [201, 1026], [165, 956], [17, 87], 0, 0),
    label!("23x23", DieCut, [272, 272], [202, 202], [23, 23], 42, 0),
    label!("29x42", DieCut, [342, 495], [306, 425], [29, 42], 6, 0),
    label!("29x90", DieCut, [342, 1061], [306, 991], [29, 90], 6, 0),
    label!("39x48", DieCut, [463, 565], [425, 495], [39, 48], 6, 0),
    label!("38x90", DieCut, [449, 1061], [413, 991], [38, 90], 12, 0),
    label!("52x29", DieCut, [578, 341], [526, 271], [52, 29], 0, 0),
    label!("60x86", DieCut, [708, 1024], [672, 954], [60, 86], 18, 0),
    label!("62x29", DieCut, [732, 341], [696, 271], [62, 29], 12, 0),
    label!("62x100", DieCut, [732, 1179], [696, 1109], [62, 100], 12, 0),
    label!("102x51", DieCut, [1200, 596], [1164, 526], [102, 51], 12, 0),
    label!("102x152", DieCut, [1200, 1804], [1164, 1660], [102, 152], 12, 0),
    // Round die-cut labels
    label!("d12", RoundDieCut, [142, 142], [94, 94], [12, 12], 113, 35),
    label!("d24", RoundDieCut, [284, 284], [236, 236], [24, 24], 42, 35),
    label!("d58", RoundDieCut, [688, 688], [618, 618], [58, 58], 51, 35),
    // PT continuous tapes (360 dpi)
    label!("pt12", PtContinuous, [170, 0], [150, 0], [12, 0], 0, 14),
    label!("pt18", PtContinuous, [256, 0], [234, 0], [18, 0], 0, 14),
    label!("pt24", PtContinuous, [341, 0], [320, 0], [24, 0], 0, 14),
    label!("pt36", PtContinuous, [512, 0], [454, 0], [36, 0], 0, 14),
];
