//! Compound-file MSI backend built on the `msi` crate.

use super::{apply_property, architecture_from_template, mentions_wix, MsiInspector, PROPERTY_NAMES};
use crate::core::detection::MsiInfo;
use crate::error::{InsightError, Result};
use msi::Select;
use std::path::Path;
use tracing::debug;

/// Reads the `Property` table and summary information directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryInspector;

impl LibraryInspector {
    pub const NAME: &'static str = "library";
}

impl MsiInspector for LibraryInspector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn inspect(&self, path: &Path) -> Result<MsiInfo> {
        let mut package = msi::open(path)?;
        let mut info = MsiInfo::default();

        let summary = package.summary_info();
        info.architecture = summary.arch().and_then(architecture_from_template);
        if summary.creating_application().is_some_and(mentions_wix) {
            info.is_wix = true;
        }

        if !package.has_table("Property") {
            return Err(InsightError::Msi("database has no Property table".into()));
        }
        let rows = package.select_rows(Select::table("Property").columns(&["Property", "Value"]))?;
        for row in rows {
            let (Some(name), Some(value)) = (row[0].as_str(), row[1].as_str()) else {
                continue;
            };
            if PROPERTY_NAMES.contains(&name) {
                debug!(property = name, value, "MSI property");
                apply_property(&mut info, name, value);
            }
        }
        Ok(info)
    }
}
