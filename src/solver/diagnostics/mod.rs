//! Derived fields and runtime diagnostics.
//!
//! - [`vorticity`], [`potential_vorticity`], [`field`]: pure derived fields
//! - [`SWDiagnostics`]: conservation and bound diagnostics of one state
//! - [`DiagnosticsTracker`]: drift of those diagnostics over a run

mod diagnostics;
mod fields;

pub use diagnostics::{DiagnosticsTracker, SWDiagnostics};
pub use fields::{
    FieldName, GridLocation, PvPeak, field, field_at_centres, potential_vorticity, pv_peak,
    vorticity,
};
