//! Execution of submitted lines.
//!
//! A line is tokenised, split into statements when a chain delimiter is
//! configured, and each statement resolved in order: alias first, then
//! the command registry, then the unknown hook. An empty statement goes
//! to the empty-line hook. The raw line is recorded in history once,
//! after dispatch, unless the caller asked otherwise.

use std::fmt::Write as _;

use ccli_core::{tokenize, tokenize_statement, LineBuffer};

use crate::registry::CommandRequest;
use crate::shell::Shell;

impl Shell {
    /// Execute `line` as if the user had typed it. `record` controls
    /// whether the line is added to history. Returns the dispatched
    /// callback's status; non-zero would end a running event loop.
    ///
    /// The interactive line is left alone: callbacks that inspect or
    /// inject into "the line" during this call see a scratch buffer
    /// holding `line`.
    pub fn execute(&mut self, line: &str, record: bool) -> i32 {
        let saved = std::mem::replace(&mut self.line, LineBuffer::from_str(line));
        let status = self.execute_line(line, record);
        self.line = saved;
        status
    }

    /// Dispatch a submitted line, honouring the chain delimiter.
    pub(crate) fn execute_line(&mut self, raw: &str, record: bool) -> i32 {
        let mut status = 0;
        let mut had_args = false;

        match self.chain_delimiter.clone() {
            None => {
                let argv = tokenize(raw);
                had_args = !argv.is_empty();
                status = self.dispatch_statement(raw, argv);
            }
            Some(delimiter) => {
                let mut rest = raw;
                loop {
                    let (argv, next) = tokenize_statement(rest, &delimiter);
                    had_args |= !argv.is_empty();
                    status = self.dispatch_statement(raw, argv);
                    if status != 0 {
                        break;
                    }
                    match next {
                        Some(offset) if offset < rest.len() => rest = &rest[offset..],
                        _ => break,
                    }
                }
            }
        }

        if record && had_args {
            self.history.add(raw);
        }
        status
    }

    fn dispatch_statement(&mut self, raw: &str, argv: Vec<String>) -> i32 {
        if argv.is_empty() {
            let enter = self.registry.enter.clone();
            let req = CommandRequest {
                command: "",
                line: raw,
                argv: &[],
            };
            return enter(self, &req);
        }

        // An executing alias falls through to the command lookup, so an
        // alias may wrap a command of its own name without recursing.
        if let Some(index) = self.registry.alias_index(&argv[0]) {
            if !self.registry.aliases[index].executing {
                return self.dispatch_alias(index, &argv);
            }
        }

        if let Some(command) = self.registry.find(&argv[0]) {
            let callback = command.callback.clone();
            let name = command.name.clone();
            let req = CommandRequest {
                command: &name,
                line: raw,
                argv: &argv,
            };
            return callback(self, &req);
        }

        let unknown = self.registry.unknown.clone();
        let req = CommandRequest {
            command: &argv[0],
            line: raw,
            argv: &argv,
        };
        unknown(self, &req)
    }

    /// Substitute the expansion for `argv[0]` and re-execute. While the
    /// expansion runs the alias is flagged, so an expansion whose first
    /// word names the same alias resolves as a plain command, or through
    /// the unknown hook, instead of looping.
    fn dispatch_alias(&mut self, index: usize, argv: &[String]) -> i32 {
        self.registry.aliases[index].executing = true;
        let name = argv[0].clone();

        let mut expanded = self.registry.aliases[index].expansion.clone();
        for arg in &argv[1..] {
            expanded.push(' ');
            expanded.push_str(arg);
        }

        let status = self.execute_line(&expanded, false);

        // The expansion may have unregistered the alias; find it again.
        if let Some(index) = self.registry.alias_index(&name) {
            self.registry.aliases[index].executing = false;
        }
        status
    }

    /// Commands every shell starts with.
    pub(crate) fn register_builtins(&mut self) {
        let _ = self.register_command("exit", |shell, _req| {
            shell.print("Exiting\n");
            1
        });
        let _ = self.register_command("alias", builtin_alias);
        let _ = self.register_command("unalias", builtin_unalias);
    }
}

fn builtin_alias(shell: &mut Shell, req: &CommandRequest<'_>) -> i32 {
    if req.argv.len() < 2 {
        let listing: Vec<(String, String)> = shell
            .aliases()
            .map(|(name, expansion)| (name.to_string(), expansion.to_string()))
            .collect();
        for (name, expansion) in listing {
            let _ = writeln!(shell, "alias {name}='{expansion}'");
        }
        return 0;
    }

    for word in &req.argv[1..] {
        match word.split_once('=') {
            Some((name, expansion)) => {
                let _ = shell.register_alias(name, expansion);
            }
            None => match shell.alias_expansion(word) {
                Some(expansion) => {
                    let expansion = expansion.to_string();
                    let _ = writeln!(shell, "alias {word}={expansion}");
                }
                None => {
                    let _ = writeln!(shell, "alias {word}: not found");
                }
            },
        }
    }
    0
}

fn builtin_unalias(shell: &mut Shell, req: &CommandRequest<'_>) -> i32 {
    if req.argv.len() < 2 {
        shell.print("unalias: usage: unalias name [name ...]\n");
        return 0;
    }
    for word in &req.argv[1..] {
        if shell.unregister_alias(word).is_err() {
            let _ = writeln!(shell, "unalias {word}: not found");
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockConsole;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn shell() -> Shell {
        Shell::with_console("test> ", Box::new(MockConsole::new()))
    }

    fn shell_with_output() -> (Shell, Rc<RefCell<Vec<u8>>>) {
        let console = MockConsole::new();
        let output = console.output_handle();
        (Shell::with_console("test> ", Box::new(console)), output)
    }

    fn output_string(output: &Rc<RefCell<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&output.borrow()).into_owned()
    }

    #[test]
    fn test_dispatch_to_registered_command() {
        let mut shell = shell();
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&seen);
        shell
            .register_command("echo", move |_, req| {
                record.borrow_mut().push(req.argv.join(","));
                0
            })
            .unwrap();

        let status = shell.execute("echo one two", true);
        assert_eq!(status, 0);
        assert_eq!(seen.borrow().as_slice(), ["echo,one,two"]);
        assert_eq!(shell.history(1), Some("echo one two"));
    }

    #[test]
    fn test_unknown_hook_receives_argv() {
        let (mut shell, output) = shell_with_output();
        shell.execute("hello world", true);
        assert_eq!(output_string(&output), "Command not found: hello\n");
        assert_eq!(shell.history(1), Some("hello world"));
    }

    #[test]
    fn test_empty_line_runs_enter_hook() {
        let mut shell = shell();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        shell.register_default(move |_, _| {
            *counter.borrow_mut() += 1;
            0
        });
        shell.execute("", true);
        shell.execute("   ", true);
        assert_eq!(*hits.borrow(), 2);
        // Empty submissions are never recorded.
        assert_eq!(shell.history(1), None);
    }

    #[test]
    fn test_execute_without_recording() {
        let mut shell = shell();
        shell.register_command("noop", |_, _| 0).unwrap();
        shell.execute("noop", false);
        assert_eq!(shell.history(1), None);
    }

    #[test]
    fn test_exit_builtin_stops_loop() {
        let mut shell = shell();
        assert_ne!(shell.execute("exit", false), 0);
    }

    #[test]
    fn test_alias_expansion_records_alias_form() {
        let mut shell = shell();
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&seen);
        shell
            .register_command("ls", move |_, req| {
                record.borrow_mut().push(req.argv.join(" "));
                0
            })
            .unwrap();
        shell.execute("alias ll='ls -l'", true);
        shell.execute("ll /tmp", true);

        assert_eq!(seen.borrow().as_slice(), ["ls -l /tmp"]);
        // History holds what was typed, not the expansion.
        assert_eq!(shell.history(1), Some("ll /tmp"));
        assert_eq!(shell.history(2), Some("alias ll='ls -l'"));
    }

    #[test]
    fn test_self_referencing_alias_hits_unknown_once() {
        let (mut shell, output) = shell_with_output();
        shell.register_alias("loop", "loop again").unwrap();
        let status = shell.execute("loop", false);
        assert_eq!(status, 0);
        assert_eq!(output_string(&output), "Command not found: loop\n");
        // The flag is cleared afterwards, so the alias still resolves.
        shell.execute("loop", false);
        assert_eq!(
            output_string(&output),
            "Command not found: loop\nCommand not found: loop\n"
        );
    }

    #[test]
    fn test_alias_to_real_command_with_same_name() {
        let mut shell = shell();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&hits);
        shell
            .register_command("ls", move |_, req| {
                record.borrow_mut().push(req.argv.join(" "));
                0
            })
            .unwrap();
        // An alias may shadow a command of the same name; the expansion
        // reaches the command because the alias is marked executing.
        shell.register_alias("ls", "ls -F").unwrap();
        shell.execute("ls /home", false);
        assert_eq!(hits.borrow().as_slice(), ["ls -F /home"]);
    }

    #[test]
    fn test_chain_delimiter_dispatches_in_order() {
        let mut shell = shell();
        shell.set_chain_delimiter(Some(";"));
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&seen);
        shell
            .register_command("say", move |_, req| {
                record.borrow_mut().push(req.argv[1..].join(" "));
                0
            })
            .unwrap();

        shell.execute("say one; say two ;say three", true);
        assert_eq!(seen.borrow().as_slice(), ["one", "two", "three"]);
        // One history entry for the whole line.
        assert_eq!(shell.history(1), Some("say one; say two ;say three"));
        assert_eq!(shell.history(2), None);
    }

    #[test]
    fn test_chain_stops_at_nonzero_status() {
        let mut shell = shell();
        shell.set_chain_delimiter(Some(";"));
        let seen = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&seen);
        shell
            .register_command("count", move |_, _| {
                *counter.borrow_mut() += 1;
                0
            })
            .unwrap();
        let status = shell.execute("count; exit; count", false);
        assert_ne!(status, 0);
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn test_unalias_builtin() {
        let (mut shell, output) = shell_with_output();
        shell.register_alias("ll", "ls -l").unwrap();
        shell.execute("unalias ll", false);
        assert!(shell.alias_expansion("ll").is_none());
        shell.execute("unalias ll", false);
        assert!(output_string(&output).contains("unalias ll: not found"));
    }

    #[test]
    fn test_alias_builtin_lists_and_queries() {
        let (mut shell, output) = shell_with_output();
        shell.execute("alias ll='ls -l'", false);
        shell.execute("alias gs='git status'", false);
        shell.execute("alias", false);
        let listing = output_string(&output);
        assert!(listing.contains("alias ll='ls -l'"));
        assert!(listing.contains("alias gs='git status'"));
        shell.execute("alias ll", false);
        assert!(output_string(&output).contains("alias ll=ls -l"));
        shell.execute("alias nope", false);
        assert!(output_string(&output).contains("alias nope: not found"));
    }

    #[test]
    fn test_reregistered_command_wins() {
        let mut shell = shell();
        let seen = Rc::new(RefCell::new(0));
        let first = Rc::clone(&seen);
        let second = Rc::clone(&seen);
        shell
            .register_command("cmd", move |_, _| {
                *first.borrow_mut() = 1;
                0
            })
            .unwrap();
        shell
            .register_command("cmd", move |_, _| {
                *second.borrow_mut() = 2;
                0
            })
            .unwrap();
        shell.execute("cmd", false);
        assert_eq!(*seen.borrow(), 2);
    }
}
