//! Meter-reading kinds and per-device-kind selection.
//!
//! Kind codes are fixed by the ESP32 firmware payloads; display labels are
//! what the dashboard shows as chart series keys.

/// One kind of metered quantity, identified by its wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterKind {
    /// Code 1 — water volume in liters.
    Volume,
    /// Code 2 — energy in kWh.
    Energy,
    /// Code 4 — current in amperes.
    Current,
}

impl MeterKind {
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(Self::Volume),
            2 => Some(Self::Energy),
            4 => Some(Self::Current),
            _ => None,
        }
    }

    pub fn code(self) -> i16 {
        match self {
            Self::Volume => 1,
            Self::Energy => 2,
            Self::Current => 4,
        }
    }

    /// Chart series key shown on the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            Self::Volume => "Volume (L)",
            Self::Energy => "kWh",
            Self::Current => "Ampere",
        }
    }
}

/// Measurement kinds charted for a device, keyed on the device `kind` column.
/// Unknown or missing device kinds fall back to volume only.
pub fn kinds_for_device(device_kind: Option<&str>) -> Vec<MeterKind> {
    match device_kind {
        Some("WATER_METER") => vec![MeterKind::Volume],
        Some("ENERGY_METER") => vec![MeterKind::Energy, MeterKind::Current],
        _ => vec![MeterKind::Volume],
    }
}
