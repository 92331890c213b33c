//!
//! # GDSII Export Options
//!

// Crates.io
use chrono::NaiveDateTime;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

// Workspace
use gdsrutils::SerdeFile;

///
/// # GDSII Export Options
///
/// Units and naming applied when writing a [crate::Library] or [crate::Cell] to GDSII.
/// Loadable from JSON, YAML, or TOML via [SerdeFile].
///
/// ```
/// use gdsr::GdsOptionsBuilder;
///
/// let opts = GdsOptionsBuilder::default()
///     .database_unit(1e-10)
///     .build()
///     .unwrap();
/// assert_eq!(opts.user_unit, 1e-6);
/// assert_eq!(opts.library_name, "library");
/// ```
///
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned", setter(into))]
#[serde(default)]
pub struct GdsOptions {
    /// Size of one user-unit, in meters. Element coordinates are in user-units.
    #[builder(default = "1e-6")]
    pub user_unit: f64,
    /// Size of one database-unit, in meters. Coordinates are stored as integer database-units.
    #[builder(default = "1e-9")]
    pub database_unit: f64,
    /// Library name, used when exporting a lone [crate::Cell]
    #[builder(default = "String::from(\"library\")")]
    pub library_name: String,
    /// Modification and access timestamps. Current time if not specified.
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<NaiveDateTime>,
}
impl Default for GdsOptions {
    fn default() -> Self {
        Self {
            user_unit: 1e-6,
            database_unit: 1e-9,
            library_name: "library".into(),
            dates: None,
        }
    }
}
impl GdsOptions {
    /// Database-units per user-unit
    pub fn scale(&self) -> f64 {
        self.user_unit / self.database_unit
    }
}
impl SerdeFile for GdsOptions {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builder() {
        assert_eq!(GdsOptionsBuilder::default().build().unwrap(), GdsOptions::default());
        assert_eq!(GdsOptions::default().scale().round(), 1000.);
    }
    #[test]
    fn partial_json() {
        let opts: GdsOptions = serde_json::from_str(r#"{"library_name": "top"}"#).unwrap();
        assert_eq!(opts.library_name, "top");
        assert_eq!(opts.database_unit, 1e-9);
        assert!(opts.dates.is_none());
    }
}
