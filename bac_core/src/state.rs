//! On-disk session store with file locking.
//!
//! Holds the profile, the tracking session and saved custom drinks in one
//! JSON file. The engine never reads this; it is the collaborator that
//! feeds it.

use crate::{validate, CustomDrink, Error, Result, TrackingSession, UserProfile};
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Everything the front end persists between runs
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AppState {
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub session: TrackingSession,
    #[serde(default)]
    pub custom_drinks: Vec<CustomDrink>,
}

impl AppState {
    /// Load state from a file with shared locking
    ///
    /// A missing file is a fresh install. An unreadable or unparseable file
    /// is logged and replaced by the default state on the next save.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match read_shared(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No state file at {:?}, starting fresh", path);
                return Ok(Self::default());
            }
            Err(e) => {
                tracing::warn!("Cannot read state file {:?} ({}), starting fresh", path, e);
                return Ok(Self::default());
            }
        };

        serde_json::from_str::<Self>(&contents).or_else(|e| {
            tracing::warn!("State file {:?} is corrupt ({}), starting fresh", path, e);
            Ok(Self::default())
        })
    }

    /// Save state to a file with exclusive locking
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &serde_json::to_string_pretty(self)?)?;
        tracing::debug!("Saved state to {:?}", path);
        Ok(())
    }

    /// Load state, modify it, and save it back
    pub fn update<F, T>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut AppState) -> Result<T>,
    {
        let mut state = Self::load(path)?;
        let out = f(&mut state)?;
        state.save(path)?;
        Ok(out)
    }

    /// The saved profile, or an error telling the user to run setup
    pub fn require_profile(&self) -> Result<&UserProfile> {
        self.profile
            .as_ref()
            .ok_or_else(|| Error::State("No profile set up. Run `bactrack setup` first.".into()))
    }

    /// Validate and save (or replace) a named custom drink
    pub fn save_custom_drink(&mut self, name: &str, volume_oz: f64, abv_percent: f64) -> Result<()> {
        validate::validate_custom_drink(name, volume_oz, abv_percent)?;
        let name = name.trim().to_string();

        self.custom_drinks
            .retain(|d| !d.name.eq_ignore_ascii_case(&name));
        self.custom_drinks.push(CustomDrink {
            name,
            volume_oz,
            abv_percent,
            created_at: Utc::now(),
        });
        Ok(())
    }

    pub fn find_custom_drink(&self, name: &str) -> Option<&CustomDrink> {
        let name = name.trim();
        self.custom_drinks
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Returns true if a drink with that name was removed
    pub fn delete_custom_drink(&mut self, name: &str) -> bool {
        let before = self.custom_drinks.len();
        let name = name.trim();
        self.custom_drinks
            .retain(|d| !d.name.eq_ignore_ascii_case(name));
        self.custom_drinks.len() != before
    }
}

fn read_shared(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;
    let mut contents = String::new();
    let read = (&file).read_to_string(&mut contents);
    file.unlock()?;
    read.map(|_| contents)
}

/// Write `contents` to a locked temp file beside `path`, sync it, then
/// rename it over `path`
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::State(format!("path {:?} has no parent", path)))?;
    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
