//! Filesystem completion helper.
//!
//! Completes the word under the cursor against directory entries:
//! either the directory named by the word's own path prefix, or each
//! colon-separated entry of a PATH-style string. Matches can be
//! narrowed by file type and permission bits (`libc::S_IFREG`,
//! `libc::S_IXUSR`, ...) and by extension. Directories always match,
//! gain a trailing `/`, and suppress the completion space so the user
//! can keep typing the path.

use std::fs;
use std::os::unix::fs::MetadataExt;

use crate::complete::Completions;
use crate::error::Result;

/// Add filesystem candidates for `word` to `comps`.
///
/// When `word` contains a `/`, its directory part is searched and the
/// candidates keep the directory prefix (hidden again at display time).
/// Otherwise each entry of `path` is searched and candidates are bare
/// file names; with no `path` the current directory is searched for
/// directories only.
///
/// `mode` filters by type bits (`S_IFMT` part) and permission bits (the
/// rest, any-bit match); zero disables either filter. `extensions`
/// keeps only names with one of the given suffixes.
pub fn file_completion(
    comps: &mut Completions,
    word: &str,
    mode: u32,
    extensions: Option<&[&str]>,
    path: Option<&str>,
) -> Result<()> {
    if word.contains('/') {
        return complete_directory(comps, word, mode, extensions, None);
    }
    let Some(path) = path else {
        return complete_directory(comps, word, libc::S_IFDIR as u32, extensions, None);
    };
    for dir in path.split(':') {
        if dir.is_empty() {
            continue;
        }
        complete_directory(comps, word, mode, extensions, Some(dir))?;
    }
    Ok(())
}

fn complete_directory(
    comps: &mut Completions,
    word: &str,
    mode: u32,
    extensions: Option<&[&str]>,
    dirname: Option<&str>,
) -> Result<()> {
    // Split the word into its directory part (kept on candidates) and
    // the base name being matched.
    let (dir_part, base) = match word.rfind('/') {
        Some(i) => (&word[..=i], &word[i + 1..]),
        None => ("", word),
    };

    let search_dir = match dirname {
        Some(dir) => dir.to_string(),
        None if dir_part.is_empty() => ".".to_string(),
        None => dir_part.to_string(),
    };
    if dirname.is_some() || !dir_part.is_empty() {
        comps.set_display_index(dir_part.len());
    }

    let mode_type = mode & libc::S_IFMT as u32;
    let mode_perm = mode & !(libc::S_IFMT as u32);

    for entry in fs::read_dir(&search_dir)? {
        let Ok(entry) = entry else {
            continue;
        };
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if !base.is_empty() && !name.starts_with(base) {
            continue;
        }

        let full = match dirname {
            Some(dir) => format!("{dir}/{name}"),
            None => format!("{dir_part}{name}"),
        };
        let Ok(meta) = fs::metadata(&full) else {
            continue;
        };

        let is_dir = meta.is_dir();
        if !is_dir {
            if mode_type != 0 && (meta.mode() & libc::S_IFMT as u32) != mode_type {
                continue;
            }
            if mode_perm != 0 && (meta.mode() & mode_perm) == 0 {
                continue;
            }
            if let Some(extensions) = extensions {
                if !extensions.iter().any(|ext| name.ends_with(ext)) {
                    continue;
                }
            }
        }

        // PATH hits list bare names; path-prefixed hits keep the prefix.
        let mut candidate = match dirname {
            Some(_) => name.into_owned(),
            None => format!("{dir_part}{name}"),
        };
        if is_dir {
            candidate.push('/');
            comps.no_space();
        }
        comps.push(candidate);
    }
    Ok(())
}
