use crate::schedule::ScheduleDocument;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Charge un planning persisté.
    fn load(&self) -> anyhow::Result<ScheduleDocument>;
    /// Sauvegarde de manière atomique.
    fn save(&self, doc: &ScheduleDocument) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self { path: path.as_ref().to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<ScheduleDocument> {
        let data = fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let doc: ScheduleDocument =
            serde_json::from_slice(&data).with_context(|| format!("parsing schedule {}", self.path.display()))?;
        Ok(doc)
    }

    fn save(&self, doc: &ScheduleDocument) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(doc)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
