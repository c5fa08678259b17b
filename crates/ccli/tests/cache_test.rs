//! Persistence round-trips over writers and real cache files.

use std::fs;
use std::io::Cursor;

use ccli::{MockConsole, Shell};

fn shell() -> Shell {
    Shell::with_console("cache> ", Box::new(MockConsole::new()))
}

fn shell_with_history(lines: &[&str]) -> Shell {
    let mut shell = shell();
    for line in lines {
        shell.execute(line, true);
    }
    shell
}

#[test]
fn test_history_round_trip_over_writer() {
    let history_shell = shell_with_history(&["make clean", "make test", "ls -l"]);
    let mut buffer = Vec::new();
    let written = history_shell.history_save_to("build", &mut buffer).unwrap();
    assert_eq!(written, 3);

    let mut fresh = shell();
    let loaded = fresh
        .history_load_from("build", &mut Cursor::new(&buffer))
        .unwrap();
    assert_eq!(loaded, 3);
    assert_eq!(fresh.history(1), Some("ls -l"));
    assert_eq!(fresh.history(3), Some("make clean"));
}

#[test]
fn test_history_load_missing_tag_fails() {
    let history_shell = shell_with_history(&["one"]);
    let mut buffer = Vec::new();
    history_shell.history_save_to("mine", &mut buffer).unwrap();

    let mut fresh = shell();
    assert!(fresh
        .history_load_from("other", &mut Cursor::new(&buffer))
        .is_err());
}

#[test]
fn test_save_file_replaces_only_its_tag() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("cache");

    let first = shell_with_history(&["alpha", "beta"]);
    first.history_save_file("first", &file).unwrap();
    let second = shell_with_history(&["gamma"]);
    second.history_save_file("second", &file).unwrap();

    // Resaving the first tag with new content must leave the second
    // section byte-for-byte intact.
    let before = fs::read(&file).unwrap();
    let second_section = {
        let text = String::from_utf8(before.clone()).unwrap();
        let at = text.find("####---ccli---#### second").unwrap();
        text[at..].to_string()
    };

    let updated = shell_with_history(&["alpha", "beta", "delta"]);
    updated.history_save_file("first", &file).unwrap();

    let after = String::from_utf8(fs::read(&file).unwrap()).unwrap();
    assert!(after.contains(&second_section));
    assert!(after.contains("delta"));
    // The stale "first" section is gone: exactly one header per tag.
    assert_eq!(after.matches("####---ccli---#### first").count(), 1);

    let mut fresh = shell();
    fresh.history_load_file("first", &file).unwrap();
    assert_eq!(fresh.history(1), Some("delta"));
    let mut fresh = shell();
    fresh.history_load_file("second", &file).unwrap();
    assert_eq!(fresh.history(1), Some("gamma"));
}

#[test]
fn test_alias_round_trip() {
    let mut saver = shell();
    saver.register_alias("ll", "ls -l").unwrap();
    saver.register_alias("gs", "git status").unwrap();
    let mut buffer = Vec::new();
    assert_eq!(saver.alias_save_to("main", &mut buffer).unwrap(), 2);

    let mut loader = shell();
    assert_eq!(
        loader
            .alias_load_from("main", &mut Cursor::new(&buffer))
            .unwrap(),
        2
    );
    assert_eq!(loader.alias_expansion("ll"), Some("ls -l"));
    assert_eq!(loader.alias_expansion("gs"), Some("git status"));
}

#[test]
fn test_alias_expansion_keeps_equals_signs() {
    let mut saver = shell();
    saver.register_alias("env", "export MODE=debug").unwrap();
    let mut buffer = Vec::new();
    saver.alias_save_to("main", &mut buffer).unwrap();

    let mut loader = shell();
    loader
        .alias_load_from("main", &mut Cursor::new(&buffer))
        .unwrap();
    assert_eq!(loader.alias_expansion("env"), Some("export MODE=debug"));
}

#[test]
fn test_history_and_aliases_share_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("cache");

    let mut shell_a = shell_with_history(&["make"]);
    shell_a.register_alias("m", "make").unwrap();
    shell_a.history_save_file("hist", &file).unwrap();
    shell_a.alias_save_file("aliases", &file).unwrap();

    let mut fresh = shell();
    fresh.history_load_file("hist", &file).unwrap();
    fresh.alias_load_file("aliases", &file).unwrap();
    assert_eq!(fresh.history(1), Some("make"));
    assert_eq!(fresh.alias_expansion("m"), Some("make"));
}

#[test]
fn test_default_cache_path_uses_xdg() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("XDG_CACHE_HOME", dir.path());

    let shell_a = shell_with_history(&["remembered"]);
    shell_a.history_save("app").unwrap();
    assert!(dir.path().join("ccli").exists());

    let mut fresh = shell();
    fresh.history_load("app").unwrap();
    assert_eq!(fresh.history(1), Some("remembered"));

    std::env::remove_var("XDG_CACHE_HOME");
}

#[test]
fn test_saving_empty_history_writes_nothing() {
    let shell = shell();
    let mut buffer = Vec::new();
    assert_eq!(shell.history_save_to("empty", &mut buffer).unwrap(), 0);
    assert!(buffer.is_empty());
}
