//! Command, alias, and hook registry.
//!
//! Storage is a pair of ordered lists with linear lookup; command counts
//! in embedded shells are small enough that an index would buy nothing.
//! Registering an existing command name replaces its callback in place,
//! and registering an alias with an empty expansion removes it.

use std::rc::Rc;

use crate::complete::Completions;
use crate::error::{Error, Result};
use crate::shell::Shell;
use crate::table::CompletionTable;

/// Everything a command callback gets to see about its invocation.
pub struct CommandRequest<'a> {
    /// The registered command name, or the first word for the unknown
    /// hook, or `""` for the empty-line hook.
    pub command: &'a str,
    /// The raw submitted line.
    pub line: &'a str,
    /// The tokenised arguments; `argv[0]` is the command word.
    pub argv: &'a [String],
}

/// Everything a completion callback gets to see. `word` indexes the
/// argument under the cursor and `prefix` is the in-progress match text
/// (empty when the cursor sits on whitespace).
pub struct CompletionRequest<'a> {
    pub command: &'a str,
    /// The line up to the cursor.
    pub line: &'a str,
    pub word: usize,
    pub prefix: &'a str,
}

/// Invoked when a line dispatches to a command, the unknown hook, or the
/// empty-line hook. A non-zero return ends the event loop.
pub type CommandCallback = Rc<dyn Fn(&mut Shell, &CommandRequest<'_>) -> i32>;

/// Invoked on Tab to contribute candidates for the word under the cursor.
pub type CompletionCallback = Rc<dyn Fn(&mut Shell, &CompletionRequest<'_>, &mut Completions)>;

/// Invoked on Ctrl-C with the current line and cursor offset. A non-zero
/// return ends the event loop.
pub type InterruptCallback = Rc<dyn Fn(&mut Shell, &str, usize) -> i32>;

pub(crate) struct Command {
    pub name: String,
    pub callback: CommandCallback,
    pub completion: Option<CompletionCallback>,
}

pub(crate) struct Alias {
    pub name: String,
    pub expansion: String,
    /// Set while this alias's expansion is being dispatched, so an
    /// expansion that names itself falls through to the unknown hook
    /// instead of recursing.
    pub executing: bool,
}

pub(crate) struct Registry {
    pub commands: Vec<Command>,
    pub aliases: Vec<Alias>,
    pub enter: CommandCallback,
    pub unknown: CommandCallback,
    pub interrupt: InterruptCallback,
    pub default_completion: Option<CompletionCallback>,
    pub completion_table: Option<Rc<CompletionTable>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            aliases: Vec::new(),
            enter: Rc::new(|_, _| 0),
            unknown: Rc::new(|shell, req| {
                shell.print("Command not found: ");
                shell.print(req.command);
                shell.print("\n");
                0
            }),
            interrupt: Rc::new(|shell, _, _| {
                shell.print("^C\n");
                1
            }),
            default_completion: None,
            completion_table: None,
        }
    }

    pub fn find(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn register(&mut self, name: &str, callback: CommandCallback) {
        if let Some(existing) = self.commands.iter_mut().find(|c| c.name == name) {
            existing.callback = callback;
            return;
        }
        self.commands.push(Command {
            name: name.to_string(),
            callback,
            completion: None,
        });
    }

    pub fn unregister(&mut self, name: &str) -> Result<()> {
        let index = self
            .commands
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::NotFound(format!("command '{name}'")))?;
        self.commands.remove(index);
        Ok(())
    }

    pub fn set_completion(&mut self, name: &str, completion: CompletionCallback) -> Result<()> {
        let command = self
            .commands
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::NotFound(format!("command '{name}'")))?;
        command.completion = Some(completion);
        Ok(())
    }

    pub fn alias_index(&self, name: &str) -> Option<usize> {
        self.aliases.iter().position(|a| a.name == name)
    }

    pub fn register_alias(&mut self, name: &str, expansion: &str) -> Result<()> {
        if expansion.is_empty() {
            return self.remove_alias(name);
        }
        if let Some(existing) = self.aliases.iter_mut().find(|a| a.name == name) {
            existing.expansion = expansion.to_string();
            return Ok(());
        }
        self.aliases.push(Alias {
            name: name.to_string(),
            expansion: expansion.to_string(),
            executing: false,
        });
        Ok(())
    }

    pub fn remove_alias(&mut self, name: &str) -> Result<()> {
        let index = self
            .alias_index(name)
            .ok_or_else(|| Error::NotFound(format!("alias '{name}'")))?;
        self.aliases.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> CommandCallback {
        Rc::new(|_, _| 0)
    }

    #[test]
    fn test_register_find_unregister() {
        let mut registry = Registry::new();
        registry.register("run", noop());
        registry.register("read", noop());
        assert!(registry.find("run").is_some());
        assert!(registry.find("missing").is_none());

        registry.unregister("run").unwrap();
        assert!(registry.find("run").is_none());
        assert!(registry.find("read").is_some());
        assert!(registry.unregister("run").is_err());
    }

    #[test]
    fn test_reregister_replaces_in_place() {
        let mut registry = Registry::new();
        registry.register("run", Rc::new(|_, _| 1));
        registry.register("other", noop());
        registry.register("run", Rc::new(|_, _| 2));
        assert_eq!(registry.commands.len(), 2);
        assert_eq!(registry.commands[0].name, "run");
    }

    #[test]
    fn test_completion_requires_command() {
        let mut registry = Registry::new();
        let completion: CompletionCallback = Rc::new(|_, _, _| {});
        assert!(registry.set_completion("missing", completion.clone()).is_err());
        registry.register("run", noop());
        assert!(registry.set_completion("run", completion).is_ok());
    }

    #[test]
    fn test_alias_lifecycle() {
        let mut registry = Registry::new();
        registry.register_alias("ll", "ls -l").unwrap();
        assert_eq!(registry.alias_index("ll"), Some(0));
        registry.register_alias("ll", "ls -la").unwrap();
        assert_eq!(registry.aliases.len(), 1);
        assert_eq!(registry.aliases[0].expansion, "ls -la");

        // Empty expansion removes.
        registry.register_alias("ll", "").unwrap();
        assert!(registry.alias_index("ll").is_none());
        assert!(registry.remove_alias("ll").is_err());
    }
}
