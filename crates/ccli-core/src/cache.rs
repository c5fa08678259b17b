//! Tagged-section codec for persisted line collections.
//!
//! A cache file is a sequence of framed sections, each addressed by a
//! short tag so several independent collections (histories of different
//! tools, alias sets) can share one file:
//!
//! ```text
//! ####---ccli---#### <tag> <N>
//! <line 1>
//! ...
//! <line N>
//! %%%%---ccli---%%%% <tag>
//! ```
//!
//! Reading is strictly sequential, so a non-seekable input (a pipe) works
//! the same as a file. Foreign bytes between and around sections are left
//! untouched by the splicing helpers in the `ccli` crate, which locate
//! sections through [`find_section`].

use std::io::{self, BufRead, Write};

/// Marker opening a section.
pub const SECTION_START: &str = "####---ccli---####";
/// Marker closing a section.
pub const SECTION_END: &str = "%%%%---ccli---%%%%";

/// Parse a section header line into its tag and payload line count.
fn parse_header(line: &str) -> Option<(&str, usize)> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some(SECTION_START) {
        return None;
    }
    let tag = parts.next()?;
    let count = parts.next()?.parse().ok()?;
    Some((tag, count))
}

/// Write one tagged section. Writing an empty collection writes nothing,
/// so absent state never creates an empty frame. Returns the number of
/// payload lines written.
pub fn write_section<W: Write, S: AsRef<str>>(
    w: &mut W,
    tag: &str,
    lines: &[S],
) -> io::Result<usize> {
    if lines.is_empty() {
        return Ok(0);
    }
    writeln!(w, "{SECTION_START} {tag} {}", lines.len())?;
    for line in lines {
        writeln!(w, "{}", line.as_ref())?;
    }
    writeln!(w, "{SECTION_END} {tag}")?;
    Ok(lines.len())
}

/// Scan forward for the section tagged `tag` and return its payload
/// lines, or `None` when no such section exists before end of input.
/// Other sections are skipped wholesale, so their payloads can never be
/// mistaken for headers; loose bytes between sections are skipped too.
pub fn read_section<R: BufRead>(r: &mut R, tag: &str) -> io::Result<Option<Vec<String>>> {
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if r.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        let header = trimmed(&raw).into_owned();
        let count = match parse_header(&header) {
            Some((t, count)) if t == tag => count,
            Some((_, count)) => {
                // Foreign section: skip its payload and end marker.
                for _ in 0..count + 1 {
                    raw.clear();
                    if r.read_until(b'\n', &mut raw)? == 0 {
                        return Ok(None);
                    }
                }
                continue;
            }
            None => continue,
        };

        let mut lines = Vec::with_capacity(count);
        for _ in 0..count {
            raw.clear();
            if r.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            lines.push(trimmed(&raw).into_owned());
        }
        // Consume the end marker; a missing one just means a truncated
        // file, which the payload count already bounded.
        raw.clear();
        let _ = r.read_until(b'\n', &mut raw)?;
        return Ok(Some(lines));
    }
}

/// Locate the byte range of the section tagged `tag` inside `data`,
/// spanning from its header line through its end-marker line (newline
/// included). `None` when the tag is absent.
pub fn find_section(data: &[u8], tag: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    let mut lines = data.split_inclusive(|&b| b == b'\n');
    while let Some(line) = lines.next() {
        let start = offset;
        offset += line.len();
        let header = trimmed(line);
        let Some((found, count)) = parse_header(&header) else {
            continue;
        };
        // Skip the payload and the end marker, wanted or not.
        for _ in 0..count + 1 {
            match lines.next() {
                Some(line) => offset += line.len(),
                None => break,
            }
        }
        if found == tag {
            return Some((start, offset));
        }
    }
    None
}

fn trimmed(raw: &[u8]) -> std::borrow::Cow<'_, str> {
    let end = raw.strip_suffix(b"\n").unwrap_or(raw);
    String::from_utf8_lossy(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn section(tag: &str, lines: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        write_section(&mut out, tag, lines).unwrap();
        out
    }

    #[test]
    fn test_write_read_round_trip() {
        let data = section("hist", &["make clean", "make test", ""]);
        let mut r = Cursor::new(&data);
        let lines = read_section(&mut r, "hist").unwrap().unwrap();
        assert_eq!(lines, vec!["make clean", "make test", ""]);
    }

    #[test]
    fn test_empty_collection_writes_nothing() {
        let mut out = Vec::new();
        let n = write_section::<_, &str>(&mut out, "hist", &[]).unwrap();
        assert_eq!(n, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_tag() {
        let data = section("hist", &["one"]);
        let mut r = Cursor::new(&data);
        assert!(read_section(&mut r, "other").unwrap().is_none());
    }

    #[test]
    fn test_reads_tag_among_other_sections() {
        let mut data = section("first", &["a", "b"]);
        data.extend(b"loose bytes that are not a section\n");
        data.extend(section("wanted", &["x", "y"]));
        data.extend(section("last", &["z"]));

        let mut r = Cursor::new(&data);
        let lines = read_section(&mut r, "wanted").unwrap().unwrap();
        assert_eq!(lines, vec!["x", "y"]);
    }

    #[test]
    fn test_payload_resembling_header_is_skipped() {
        // A payload line spelling out another section's header must not
        // derail the scan for a later tag.
        let mut data = section("first", &[&format!("{SECTION_START} wanted 1"), "b"]);
        data.extend(section("wanted", &["real"]));

        let mut r = Cursor::new(&data);
        let lines = read_section(&mut r, "wanted").unwrap().unwrap();
        assert_eq!(lines, vec!["real"]);
    }

    #[test]
    fn test_find_section_range() {
        let first = section("first", &["a"]);
        let wanted = section("wanted", &["x", "y"]);
        let last = section("last", &["z"]);
        let mut data = first.clone();
        data.extend(&wanted);
        data.extend(&last);

        let (start, end) = find_section(&data, "wanted").unwrap();
        assert_eq!(start, first.len());
        assert_eq!(end, first.len() + wanted.len());
        assert_eq!(&data[start..end], &wanted[..]);
        assert!(find_section(&data, "absent").is_none());
    }

    #[test]
    fn test_truncated_section() {
        let mut data = section("hist", &["a", "b", "c"]);
        data.truncate(data.len() / 2);
        let mut r = Cursor::new(&data);
        // No panic, and at most the surviving lines come back.
        let lines = read_section(&mut r, "hist").unwrap().unwrap();
        assert!(lines.len() <= 3);
    }
}
