use crate::models::MovieId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceList {
    Favorites,
    Watchlist,
}

impl PreferenceList {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceList::Favorites => "favorites",
            PreferenceList::Watchlist => "watchlist",
        }
    }
}

impl fmt::Display for PreferenceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferenceList {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "favorites" => Ok(PreferenceList::Favorites),
            "watchlist" => Ok(PreferenceList::Watchlist),
            _ => Err(anyhow::anyhow!(
                "preference list must be 'favorites' or 'watchlist'"
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default)]
    favorites: BTreeSet<MovieId>,
    #[serde(default)]
    watchlist: BTreeSet<MovieId>,
}

impl PreferenceFile {
    fn set(&self, list: PreferenceList) -> &BTreeSet<MovieId> {
        match list {
            PreferenceList::Favorites => &self.favorites,
            PreferenceList::Watchlist => &self.watchlist,
        }
    }

    fn set_mut(&mut self, list: PreferenceList) -> &mut BTreeSet<MovieId> {
        match list {
            PreferenceList::Favorites => &mut self.favorites,
            PreferenceList::Watchlist => &mut self.watchlist,
        }
    }
}

/// Favorites and watchlist, persisted as a small JSON document.
///
/// Every toggle rewrites the file before returning, so the on-disk copy is
/// never behind what callers have observed.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    data: Mutex<PreferenceFile>,
}

impl PreferenceStore {
    /// Opens the store at `path`. A missing file is an empty store; a corrupt
    /// one is logged and replaced on the next toggle.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<PreferenceFile>(&text) {
                Ok(data) => {
                    info!(
                        "Loaded preferences from {:?} ({} favorites, {} watchlist)",
                        path,
                        data.favorites.len(),
                        data.watchlist.len()
                    );
                    data
                }
                Err(e) => {
                    warn!("Ignoring unreadable preferences file {:?}: {}", path, e);
                    PreferenceFile::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PreferenceFile::default(),
            Err(e) => {
                warn!("Failed to read preferences file {:?}: {}", path, e);
                PreferenceFile::default()
            }
        };
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_set(&self, list: PreferenceList) -> BTreeSet<MovieId> {
        self.lock().set(list).clone()
    }

    pub fn contains(&self, list: PreferenceList, id: MovieId) -> bool {
        self.lock().set(list).contains(&id)
    }

    /// Adds `id` if absent, removes it if present, persists, and returns the
    /// resulting set. On a write failure the in-memory change is rolled back.
    pub fn toggle(&self, list: PreferenceList, id: MovieId) -> Result<BTreeSet<MovieId>> {
        let mut data = self.lock();
        let before = data.clone();
        let set = data.set_mut(list);
        if !set.remove(&id) {
            set.insert(id);
        }
        if let Err(e) = write_atomic(&self.path, &data) {
            *data = before;
            return Err(e);
        }
        Ok(data.set(list).clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PreferenceFile> {
        self.data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn write_atomic(path: &Path, data: &PreferenceFile) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create preferences directory {:?}", dir))?;
    }
    let body = serde_json::to_string_pretty(data).context("Failed to encode preferences")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body).with_context(|| format!("Failed to write {:?}", tmp))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {:?}", path))?;
    Ok(())
}
