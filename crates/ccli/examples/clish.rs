//! A small demonstration shell.
//!
//! Run with `cargo run --example clish`. Try Tab completion on command
//! names and on `cat`'s file argument, `alias ll='list -l'`, Ctrl-R
//! over history, and backslash continuations.

use std::fmt::Write as _;

use ccli::{file_completion, CommandTable, Shell};

fn main() -> ccli::Result<()> {
    let mut shell = Shell::new("clish> ")?;
    shell.set_chain_delimiter(Some(";"));

    shell.register_command("hello", |shell, req| {
        let name = req.argv.get(1).map(String::as_str).unwrap_or("world");
        let _ = writeln!(shell, "hello {name}");
        0
    })?;

    shell.register_command("history", |shell, _req| {
        let mut lines = Vec::new();
        let mut past = 1;
        while let Some(line) = shell.history(past) {
            lines.push(format!("{past:5}  {line}"));
            past += 1;
        }
        let mut count = 1;
        for line in lines.iter().rev() {
            count = shell.page(count, &format!("{line}\n"));
            if count < 0 {
                break;
            }
        }
        0
    })?;

    shell.register_command("cat", |shell, req| {
        for path in &req.argv[1..] {
            match std::fs::read_to_string(path) {
                Ok(contents) => shell.print(&contents),
                Err(err) => {
                    let _ = writeln!(shell, "cat: {path}: {err}");
                }
            }
        }
        0
    })?;
    shell.register_completion("cat", |_, req, comps| {
        let _ = file_completion(comps, req.prefix, 0, None, None);
    })?;

    let table = CommandTable::root(vec![CommandTable::new("show")
        .with_subcommand(CommandTable::new("aliases").with_callback(|shell, _| {
            let listing: Vec<String> = shell
                .aliases()
                .map(|(name, expansion)| format!("{name} -> {expansion}"))
                .collect();
            for entry in listing {
                let _ = writeln!(shell, "{entry}");
            }
            0
        }))
        .with_subcommand(CommandTable::new("prompt").with_callback(|shell, _| {
            let prompt = shell.prompt().to_string();
            let _ = writeln!(shell, "{prompt}");
            0
        }))]);
    shell.register_command_table(table)?;

    let _ = shell.history_load("clish");
    let _ = shell.alias_load("clish");

    shell.run();

    let _ = shell.history_save("clish");
    let _ = shell.alias_save("clish");
    Ok(())
}
