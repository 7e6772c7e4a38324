use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{save_settings, Settings};

/// Choose (or create) the data directory, persist settings, and set up the
/// order store.
pub fn run(data_dir: Option<String>, company: Option<String>) -> Result<String> {
    let defaults = Settings::default();
    let dir = data_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&defaults.data_dir));
    std::fs::create_dir_all(&dir)?;

    let settings = Settings {
        data_dir: dir.to_string_lossy().to_string(),
        company_name: company.unwrap_or_default(),
    };
    save_settings(&settings)?;

    let conn = get_connection(&dir.join("salescope.db"))?;
    init_db(&conn)?;

    Ok(format!(
        "Initialized salescope data in {}\nLoad sample data with `salescope demo`.",
        dir.display()
    ))
}
