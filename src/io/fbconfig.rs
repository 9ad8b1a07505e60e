//! Frame buffer configuration table in IRAF `imtoolrc` format.
//!
//! Each non-comment line reads `configno nframes width height # name[|alias...]`,
//! for example `3 2 1024 1024 # imt3|imt1024`.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::FrameBufferSize;

const IMTOOLRC_ENV: [&str; 2] = ["imtoolrc", "IMTOOLRC"];
const SYSTEM_IMTOOLRC: &str = "/usr/local/lib/imtoolrc";

/// Standard IRAF frame buffer table.
const BUILTIN_IMTOOLRC: &str = "\
# configno nframes width height # names
 1  2   512   512  # imt1|imt512
 2  2   800   800  # imt2|imt800
 3  2  1024  1024  # imt3|imt1024
 4  1  1600  1600  # imt4|imt1600
 5  1  2048  2048  # imt5|imt2048
 6  1  4096  4096  # imt6|imt4096
 7  1  8192  8192  # imt7|imt8192
 8  1  1024  4096  # imt8|imt1x4
 9  2  1144   880  # imt9|imtfs
10  2  1144   764  # imt10|imtfs35
11  2   128   128  # imt11|imt128
12  2   256   256  # imt12|imt256
13  2   128  1056  # imt13|imt128x1056
14  2  1024  2048  # imt14|imt1kx2k
15  2  2048  1024  # imt15|imt2kx1k
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBufferConfig {
    pub config_no: u32,
    pub nframes: u32,
    pub width: usize,
    pub height: usize,
    /// Names from the comment field; the first one is canonical.
    pub names: Vec<String>,
}

impl FrameBufferConfig {
    pub fn size(&self) -> FrameBufferSize {
        FrameBufferSize::new(self.width, self.height)
    }

    pub fn name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    fn contains(&self, width: usize, height: usize) -> bool {
        width <= self.width && height <= self.height
    }

    fn area(&self) -> usize {
        self.width * self.height
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameBufferTable {
    entries: BTreeMap<u32, FrameBufferConfig>,
}

impl FrameBufferTable {
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let entry = parse_line(line, idx + 1)?;
            entries.insert(entry.config_no, entry);
        }
        Ok(Self { entries })
    }

    pub fn builtin() -> Self {
        // The embedded table is static and known to parse.
        Self::parse(BUILTIN_IMTOOLRC).unwrap_or_default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let table = Self::parse(&text)?;
        info!(
            "Loaded {} frame buffer configurations from {:?}",
            table.len(),
            path
        );
        Ok(table)
    }

    /// Candidate imtoolrc locations, in search order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = IMTOOLRC_ENV
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .map(PathBuf::from)
            .collect();
        paths.push(PathBuf::from(SYSTEM_IMTOOLRC));
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(Path::new(&home).join(".imtoolrc"));
        }
        paths
    }

    pub fn locate() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|p| p.is_file())
    }

    /// The first imtoolrc found on the search path, else the builtin table.
    pub fn load_or_builtin() -> Result<Self> {
        match Self::locate() {
            Some(path) => Self::load(&path),
            None => {
                debug!("No imtoolrc found, using builtin frame buffer table");
                Ok(Self::builtin())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, config_no: u32) -> Option<&FrameBufferConfig> {
        self.entries.get(&config_no)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameBufferConfig> {
        self.entries.values()
    }

    /// Look up a configuration by any of its names (e.g. `imt1024` or `imt3`).
    pub fn by_name(&self, name: &str) -> Result<&FrameBufferConfig> {
        self.entries
            .values()
            .find(|cfg| cfg.names.iter().any(|n| n == name))
            .ok_or_else(|| Error::UnknownFrameBuffer {
                name: name.to_string(),
            })
    }

    /// Smallest configuration (by area) that holds a `width` x `height` image,
    /// or the largest one when none does. Ties go to the lower config number.
    pub fn select(&self, width: usize, height: usize) -> Option<&FrameBufferConfig> {
        let fitting = self
            .entries
            .values()
            .filter(|cfg| cfg.contains(width, height))
            .min_by_key(|cfg| cfg.area());
        let chosen = fitting.or_else(|| {
            self.entries
                .values()
                .rev()
                .max_by_key(|cfg| cfg.area())
        });
        if let Some(cfg) = chosen {
            debug!(
                "Selected frame buffer {} ({}x{}) for {}x{} image",
                cfg.name().unwrap_or("?"),
                cfg.width,
                cfg.height,
                width,
                height
            );
        }
        chosen
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<FrameBufferConfig> {
    let (fields, comment) = match line.split_once('#') {
        Some((fields, comment)) => (fields, comment.trim()),
        None => (line, ""),
    };
    let nums: Vec<&str> = fields.split_whitespace().collect();
    if nums.len() < 4 {
        return Err(Error::FrameBufferConfig {
            line: line_no,
            reason: format!("expected 4 numeric fields, found {}", nums.len()),
        });
    }
    let field = |i: usize, what: &str| -> Result<usize> {
        nums[i]
            .parse::<usize>()
            .map_err(|_| Error::FrameBufferConfig {
                line: line_no,
                reason: format!("invalid {what} '{}'", nums[i]),
            })
    };
    let config_no = field(0, "config number")? as u32;
    let nframes = field(1, "frame count")? as u32;
    let width = field(2, "width")?;
    let height = field(3, "height")?;
    if width == 0 || height == 0 {
        return Err(Error::FrameBufferConfig {
            line: line_no,
            reason: format!("empty frame buffer {width}x{height}"),
        });
    }
    let names = comment
        .split_whitespace()
        .next()
        .map(|token| {
            token
                .split('|')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(FrameBufferConfig {
        config_no,
        nframes,
        width,
        height,
        names,
    })
}
