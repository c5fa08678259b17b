//! History and alias persistence.
//!
//! Both collections serialise through the tagged-section codec, so
//! several programs (or several tags of one program) can share a cache
//! file. Saving into a file replaces only the section with the same
//! tag: everything else in the file is preserved byte-for-byte. The
//! default files live under `$XDG_CACHE_HOME`, falling back to
//! `$HOME/.cache`.

use std::env;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use ccli_core::cache::{find_section, read_section, write_section};

use crate::error::{Error, Result};
use crate::shell::Shell;

const HISTORY_CACHE_NAME: &str = "ccli";
const ALIAS_CACHE_NAME: &str = "ccli-alias";

impl Shell {
    // -- history ----------------------------------------------------------

    /// Write the retained history as a section tagged `tag`. Returns the
    /// number of lines written.
    pub fn history_save_to<W: Write>(&self, tag: &str, writer: &mut W) -> Result<usize> {
        let lines: Vec<&str> = self.history.iter().collect();
        Ok(write_section(writer, tag, &lines)?)
    }

    /// Append the lines of the section tagged `tag` to history. Fails
    /// with [`Error::NotFound`] when the section is absent.
    pub fn history_load_from<R: BufRead>(&mut self, tag: &str, reader: &mut R) -> Result<usize> {
        let lines = read_section(reader, tag)?
            .ok_or_else(|| Error::NotFound(format!("history section '{tag}'")))?;
        for line in &lines {
            self.history.add(line);
        }
        Ok(lines.len())
    }

    /// Save history into `file`, replacing an existing section with the
    /// same tag and leaving other sections untouched.
    pub fn history_save_file(&self, tag: &str, file: impl AsRef<Path>) -> Result<usize> {
        let lines: Vec<&str> = self.history.iter().collect();
        save_section_file(file.as_ref(), tag, &lines)
    }

    /// Load history from the section tagged `tag` of `file`.
    pub fn history_load_file(&mut self, tag: &str, file: impl AsRef<Path>) -> Result<usize> {
        let mut reader = BufReader::new(fs::File::open(file)?);
        self.history_load_from(tag, &mut reader)
    }

    /// Save history into the default cache file.
    pub fn history_save(&self, tag: &str) -> Result<usize> {
        self.history_save_file(tag, default_cache_file(HISTORY_CACHE_NAME)?)
    }

    /// Load history from the default cache file.
    pub fn history_load(&mut self, tag: &str) -> Result<usize> {
        self.history_load_file(tag, default_cache_file(HISTORY_CACHE_NAME)?)
    }

    // -- aliases ----------------------------------------------------------

    /// Write the registered aliases as `name=expansion` lines in a
    /// section tagged `tag`.
    pub fn alias_save_to<W: Write>(&self, tag: &str, writer: &mut W) -> Result<usize> {
        let lines = self.alias_lines();
        Ok(write_section(writer, tag, &lines)?)
    }

    /// Register every alias found in the section tagged `tag`.
    pub fn alias_load_from<R: BufRead>(&mut self, tag: &str, reader: &mut R) -> Result<usize> {
        let lines = read_section(reader, tag)?
            .ok_or_else(|| Error::NotFound(format!("alias section '{tag}'")))?;
        let mut loaded = 0;
        for line in &lines {
            let Some((name, expansion)) = line.split_once('=') else {
                continue;
            };
            if name.is_empty() || expansion.is_empty() {
                continue;
            }
            self.register_alias(name, expansion)?;
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Save aliases into `file`, replacing the section with this tag.
    pub fn alias_save_file(&self, tag: &str, file: impl AsRef<Path>) -> Result<usize> {
        let lines = self.alias_lines();
        save_section_file(file.as_ref(), tag, &lines)
    }

    /// Load aliases from the section tagged `tag` of `file`.
    pub fn alias_load_file(&mut self, tag: &str, file: impl AsRef<Path>) -> Result<usize> {
        let mut reader = BufReader::new(fs::File::open(file)?);
        self.alias_load_from(tag, &mut reader)
    }

    /// Save aliases into the default cache file.
    pub fn alias_save(&self, tag: &str) -> Result<usize> {
        self.alias_save_file(tag, default_cache_file(ALIAS_CACHE_NAME)?)
    }

    /// Load aliases from the default cache file.
    pub fn alias_load(&mut self, tag: &str) -> Result<usize> {
        self.alias_load_file(tag, default_cache_file(ALIAS_CACHE_NAME)?)
    }

    fn alias_lines(&self) -> Vec<String> {
        self.aliases()
            .map(|(name, expansion)| format!("{name}={expansion}"))
            .collect()
    }
}

/// `$XDG_CACHE_HOME/<name>`, else `$HOME/.cache/<name>`.
fn default_cache_file(name: &str) -> Result<PathBuf> {
    if let Some(cache) = env::var_os("XDG_CACHE_HOME") {
        if !cache.is_empty() {
            return Ok(PathBuf::from(cache).join(name));
        }
    }
    match env::var_os("HOME") {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home).join(".cache").join(name)),
        _ => Err(Error::NotFound("no cache directory in environment".into())),
    }
}

/// Rewrite `path` with the section for `tag` replaced by `lines`. Other
/// bytes are carried over verbatim; the file is created when missing.
fn save_section_file<S: AsRef<str>>(path: &Path, tag: &str, lines: &[S]) -> Result<usize> {
    let mut data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => return Err(err.into()),
    };
    if let Some((start, end)) = find_section(&data, tag) {
        data.drain(start..end);
    }
    let written = write_section(&mut data, tag, lines)?;
    fs::write(path, &data)?;
    Ok(written)
}
