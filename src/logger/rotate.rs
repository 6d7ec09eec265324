//! Size-bounded rotating log file.
//!
//! When a write would push the active file past its size limit the file is
//! renamed to `<stem>-<UTC timestamp>.<ext>`, optionally gzipped, and a fresh
//! file is opened. Backups beyond the configured count or age are removed.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::config::FileConfig;

const BACKUP_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]-[minute]-[second].[subsecond digits:3]");

const MEGABYTE: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Rotation limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size in bytes that triggers rotation
    pub max_bytes: u64,
    /// Backups to keep, 0 keeps all
    pub max_backups: usize,
    /// Maximum backup age, `None` keeps all
    pub max_age: Option<Duration>,
    pub compress: bool,
}

impl From<&FileConfig> for RotationPolicy {
    fn from(config: &FileConfig) -> Self {
        Self {
            max_bytes: u64::from(config.max_size.max(1)) * MEGABYTE,
            max_backups: config.max_backups as usize,
            max_age: (config.max_age > 0).then(|| DAY * config.max_age),
            compress: config.compress,
        }
    }
}

/// Log file that rotates itself according to a [`RotationPolicy`].
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    file: File,
    size: u64,
}

impl RotatingFile {
    /// Open (or create) `path` for appending, creating its directory if needed.
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            policy,
            file,
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotate now, regardless of the current size.
    pub fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let backup = self.backup_path();
        fs::rename(&self.path, &backup)?;
        self.file = open_append(&self.path)?;
        self.size = 0;

        if self.policy.compress {
            compress(&backup)?;
        }
        self.prune_backups()
    }

    /// Current backups, newest first.
    pub fn backups(&self) -> io::Result<Vec<PathBuf>> {
        let (dir, stem, ext) = self.name_parts();
        let prefix = format!("{stem}-");

        let mut backups: Vec<((PrimitiveDateTime, u32), PathBuf)> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .filter_map(|p| {
                let name = p.file_name()?.to_str()?;
                let name = name.strip_suffix(".gz").unwrap_or(name);
                let stamp = name.strip_prefix(&prefix)?.strip_suffix(ext.as_str())?;
                let key = parse_stamp(stamp)?;
                Some((key, p))
            })
            .collect();
        backups.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(backups.into_iter().map(|(_, p)| p).collect())
    }

    fn prune_backups(&self) -> io::Result<()> {
        let backups = self.backups()?;
        let cutoff = self
            .policy
            .max_age
            .and_then(|age| SystemTime::now().checked_sub(age));

        for (i, backup) in backups.iter().enumerate() {
            let over_count = self.policy.max_backups > 0 && i >= self.policy.max_backups;
            let expired = cutoff.is_some_and(|cutoff| {
                fs::metadata(backup)
                    .and_then(|m| m.modified())
                    .is_ok_and(|modified| modified < cutoff)
            });
            if over_count || expired {
                let _ = fs::remove_file(backup);
            }
        }
        Ok(())
    }

    /// Split the active path into directory, stem and extension (with leading dot).
    fn name_parts(&self) -> (PathBuf, String, String) {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let stem = self
            .path
            .file_stem()
            .map_or_else(|| "log".to_string(), |s| s.to_string_lossy().into_owned());
        let ext = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (dir, stem, ext)
    }

    fn backup_path(&self) -> PathBuf {
        let (dir, stem, ext) = self.name_parts();
        let stamp = OffsetDateTime::now_utc()
            .format(BACKUP_TIME_FORMAT)
            .unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string());

        let mut candidate = dir.join(format!("{stem}-{stamp}{ext}"));
        let mut n = 1;
        while candidate.exists() || gz_path(&candidate).exists() {
            candidate = dir.join(format!("{stem}-{stamp}.{n}{ext}"));
            n += 1;
        }
        candidate
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let incoming = buf.len() as u64;
        if self.size > 0 && self.size + incoming > self.policy.max_bytes {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Order key for a backup's `<timestamp>[.<n>]` part, `None` when the name
/// was not produced by rotation.
fn parse_stamp(stamp: &str) -> Option<(PrimitiveDateTime, u32)> {
    if let Ok(time) = PrimitiveDateTime::parse(stamp, BACKUP_TIME_FORMAT) {
        return Some((time, 0));
    }
    let (base, n) = stamp.rsplit_once('.')?;
    let time = PrimitiveDateTime::parse(base, BACKUP_TIME_FORMAT).ok()?;
    Some((time, n.parse().ok()?))
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Replace `path` with a gzipped copy at `path.gz`.
fn compress(path: &Path) -> io::Result<()> {
    let target = gz_path(path);
    let mut source = File::open(path)?;
    let mut encoder = GzEncoder::new(File::create(&target)?, Compression::default());
    io::copy(&mut source, &mut encoder)?;
    encoder.finish()?.sync_all()?;
    fs::remove_file(path)
}
