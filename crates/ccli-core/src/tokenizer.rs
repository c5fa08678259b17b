//! Shell-style argument tokeniser.
//!
//! Splits a line into arguments honouring single and double quotes,
//! backslash escapes, and an optional top-level statement delimiter.
//! Parsing is two passes per argument, both byte-oriented: the first
//! delimits the argument (quotes suppress whitespace splitting, a
//! backslash consumes the following byte), the second strips unescaped
//! quote bytes and resolves the escapes. Only ASCII bytes are ever
//! special, so multi-byte sequences travel through both passes intact.

/// Split a whole line into arguments.
///
/// An empty or all-whitespace line yields an empty vector.
///
/// # Examples
///
/// ```
/// use ccli_core::tokenizer::tokenize;
///
/// let argv = tokenize(r#"open "my file" now"#);
/// assert_eq!(argv, vec!["open", "my file", "now"]);
/// ```
pub fn tokenize(line: &str) -> Vec<String> {
    split_statement(line, None).0
}

/// Split one statement off a line.
///
/// Behaves like [`tokenize`] until `delim` is seen outside quotes; the
/// returned offset points past the delimiter and any following
/// whitespace, i.e. where parsing of the next statement should resume.
/// `None` means the whole line was consumed.
pub fn tokenize_statement(line: &str, delim: &str) -> (Vec<String>, Option<usize>) {
    split_statement(line, Some(delim))
}

fn split_statement(line: &str, delim: Option<&str>) -> (Vec<String>, Option<usize>) {
    let bytes = line.as_bytes();
    let mut argv = Vec::new();
    let mut p = 0;

    'statement: while p < bytes.len() {
        while p < bytes.len() && bytes[p].is_ascii_whitespace() {
            p += 1;
        }
        if p >= bytes.len() {
            break;
        }

        if let Some(d) = delim {
            if bytes[p..].starts_with(d.as_bytes()) {
                return (argv, Some(resume_offset(bytes, p + d.len())));
            }
        }

        let word_start = p;
        let mut quote = 0u8;
        while p < bytes.len() {
            let b = bytes[p];
            match b {
                b'\'' | b'"' => {
                    if quote == 0 {
                        quote = b;
                    } else if quote == b {
                        quote = 0;
                    }
                    p += 1;
                }
                b'\\' => {
                    // The escape consumes the next byte verbatim; a
                    // trailing backslash stays put.
                    p += 1;
                    if p < bytes.len() {
                        p += 1;
                    }
                }
                _ => {
                    if quote == 0 {
                        if let Some(d) = delim {
                            if bytes[p..].starts_with(d.as_bytes()) {
                                argv.push(strip_word(&line[word_start..p]));
                                return (argv, Some(resume_offset(bytes, p + d.len())));
                            }
                        }
                        if b.is_ascii_whitespace() {
                            break;
                        }
                    }
                    p += 1;
                }
            }
        }
        argv.push(strip_word(&line[word_start..p]));

        if p >= bytes.len() {
            break 'statement;
        }
    }

    (argv, None)
}

fn resume_offset(bytes: &[u8], mut p: usize) -> usize {
    while p < bytes.len() && bytes[p].is_ascii_whitespace() {
        p += 1;
    }
    p
}

/// Second pass: drop unescaped quote bytes and resolve escapes.
fn strip_word(word: &str) -> String {
    let bytes = word.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut quote = 0u8;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\'' | b'"' => {
                if quote == 0 {
                    quote = b;
                } else if quote == b {
                    quote = 0;
                }
                i += 1;
            }
            b'\\' => {
                i += 1;
                if i < bytes.len() {
                    out.push(bytes[i]);
                    i += 1;
                } else {
                    out.push(b'\\');
                }
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
