use super::error::DecodeError;
use crate::model::MetricValue;
use std::fmt;
use std::str::FromStr;

/// Wire field codes requested from the inverter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCode {
    /// DC current
    Idc,
    /// Voltage phase 1
    Ul1,
    /// Inverter operating temperature
    Tkk,
    /// Current phase 1
    Il1,
    /// Status word, value carries a `,<digits>` qualifier
    Sys,
    /// Generated frequency (Hz)
    Tnf,
    /// DC voltage (V)
    Udc,
    /// AC power being generated, reported doubled (W)
    Pac,
    /// Relative output (%)
    Prl,
    /// Total yield (kWh)
    Kt0,
}

impl FieldCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldCode::Idc => "IDC",
            FieldCode::Ul1 => "UL1",
            FieldCode::Tkk => "TKK",
            FieldCode::Il1 => "IL1",
            FieldCode::Sys => "SYS",
            FieldCode::Tnf => "TNF",
            FieldCode::Udc => "UDC",
            FieldCode::Pac => "PAC",
            FieldCode::Prl => "PRL",
            FieldCode::Kt0 => "KT0",
        }
    }

    /// Catalog entry describing this code.
    pub fn entry(&self) -> &'static CatalogEntry {
        /* CATALOG is declared in the same order as the enum variants */
        &CATALOG[*self as usize]
    }
}

impl fmt::Display for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldCode {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOG
            .iter()
            .find(|entry| entry.code.as_str() == s)
            .map(|entry| entry.code)
            .ok_or_else(|| DecodeError::UnknownField(s.to_owned()))
    }
}

/// Arithmetic applied to the raw integer read off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingRule {
    Identity,
    /// Divide by 2
    Half,
    /// Divide by 10
    Tenth,
    /// Divide by 100
    Hundredth,
}

impl ScalingRule {
    pub fn apply(&self, raw: u64) -> MetricValue {
        match self {
            ScalingRule::Identity => MetricValue::Integer(raw),
            ScalingRule::Half => MetricValue::Float(raw as f64 / 2.0),
            ScalingRule::Tenth => MetricValue::Float(raw as f64 / 10.0),
            ScalingRule::Hundredth => MetricValue::Float(raw as f64 / 100.0),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: FieldCode,
    /// Name the value is published under. Downstream dashboards depend on these exact strings.
    pub metric: &'static str,
    pub rule: ScalingRule,
}

const fn entry(code: FieldCode, metric: &'static str, rule: ScalingRule) -> CatalogEntry {
    CatalogEntry { code, metric, rule }
}

pub static CATALOG: [CatalogEntry; 10] = [
    entry(FieldCode::Idc, "dc_current", ScalingRule::Hundredth),
    entry(FieldCode::Ul1, "voltage_phase1", ScalingRule::Tenth),
    entry(FieldCode::Tkk, "inverter_temp", ScalingRule::Identity),
    entry(FieldCode::Il1, "current_phase1", ScalingRule::Identity),
    entry(FieldCode::Sys, "sys", ScalingRule::Identity),
    entry(FieldCode::Tnf, "frequency", ScalingRule::Hundredth),
    entry(FieldCode::Udc, "dc_voltage", ScalingRule::Tenth),
    entry(FieldCode::Pac, "power_output", ScalingRule::Half),
    /* misspelling is what existing consumers query for */
    entry(FieldCode::Prl, "relative_ouput", ScalingRule::Identity),
    entry(FieldCode::Kt0, "total_yield", ScalingRule::Identity),
];

/// Look up the catalog entry for a wire code (exact, case-sensitive match).
pub fn lookup(code: &str) -> Result<&'static CatalogEntry, DecodeError> {
    code.parse::<FieldCode>().map(|code| code.entry())
}
