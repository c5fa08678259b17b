//! Hierarchical command and completion tables.
//!
//! A table is an owned tree: each node names one word of a command path
//! and optionally carries a callback. Registering a command table turns
//! every top-level child into an ordinary flat command whose adapter
//! re-enters the tree, so `open file x` walks `open` → `file` and
//! invokes the deepest matched node with argv re-based there. Because
//! the trees are plain owned values, a malformed table cannot be
//! expressed structurally; registration only has to check that node
//! names are non-empty.

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::registry::{CommandCallback, CommandRequest, CompletionCallback, CompletionRequest};
use crate::shell::Shell;

/// One node of a command tree. The root's name is ignored.
pub struct CommandTable {
    pub name: String,
    pub callback: Option<CommandCallback>,
    pub subcommands: Vec<CommandTable>,
}

impl CommandTable {
    /// A node without callback or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callback: None,
            subcommands: Vec::new(),
        }
    }

    /// An anonymous root holding the top-level commands.
    pub fn root(subcommands: Vec<CommandTable>) -> Self {
        Self {
            name: String::new(),
            callback: None,
            subcommands,
        }
    }

    pub fn with_callback(
        mut self,
        callback: impl Fn(&mut Shell, &CommandRequest<'_>) -> i32 + 'static,
    ) -> Self {
        self.callback = Some(Rc::new(callback));
        self
    }

    pub fn with_subcommand(mut self, child: CommandTable) -> Self {
        self.subcommands.push(child);
        self
    }

    fn validate(&self) -> Result<()> {
        for child in &self.subcommands {
            if child.name.is_empty() {
                return Err(Error::BadStructure(format!(
                    "empty command name under '{}'",
                    self.name
                )));
            }
            child.validate()?;
        }
        Ok(())
    }
}

/// One node of a completion tree. The root's name is ignored; children
/// complete the word at their depth once every earlier word matched
/// exactly.
pub struct CompletionTable {
    pub name: String,
    pub callback: Option<CompletionCallback>,
    pub options: Vec<CompletionTable>,
}

impl CompletionTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callback: None,
            options: Vec::new(),
        }
    }

    pub fn root(options: Vec<CompletionTable>) -> Self {
        Self {
            name: String::new(),
            callback: None,
            options,
        }
    }

    pub fn with_callback(
        mut self,
        callback: impl Fn(&mut Shell, &CompletionRequest<'_>, &mut crate::complete::Completions)
            + 'static,
    ) -> Self {
        self.callback = Some(Rc::new(callback));
        self
    }

    pub fn with_option(mut self, child: CompletionTable) -> Self {
        self.options.push(child);
        self
    }

    /// Follow `path` by exact name match, returning the node whose
    /// children complete the next word. `None` as soon as a word has no
    /// matching child.
    pub(crate) fn descend(&self, path: &[String]) -> Option<&CompletionTable> {
        let mut node = self;
        for word in path {
            node = node.options.iter().find(|c| &c.name == word)?;
        }
        Some(node)
    }

    fn validate(&self) -> Result<()> {
        for child in &self.options {
            if child.name.is_empty() {
                return Err(Error::BadStructure(format!(
                    "empty completion name under '{}'",
                    self.name
                )));
            }
            child.validate()?;
        }
        Ok(())
    }
}

impl Shell {
    /// Register every top-level entry of `table` as a flat command that
    /// dispatches into the tree. Fails with [`Error::BadStructure`] if
    /// any node below the root has an empty name, before anything is
    /// registered.
    pub fn register_command_table(&mut self, table: CommandTable) -> Result<()> {
        table.validate()?;
        let root = Rc::new(table);
        for index in 0..root.subcommands.len() {
            let tree = Rc::clone(&root);
            let name = root.subcommands[index].name.clone();
            self.register_command(&name, move |shell, req| {
                dispatch_node(&tree.subcommands[index], shell, req)
            })?;
        }
        Ok(())
    }

    /// Install `table` as the hierarchical completion source consulted
    /// on Tab (see the completion engine for the source order).
    pub fn register_completion_table(&mut self, table: CompletionTable) -> Result<()> {
        table.validate()?;
        self.registry.completion_table = Some(Rc::new(table));
        Ok(())
    }
}

/// Walk as deep as the arguments match, then invoke the deepest node's
/// callback with argv re-based so the node's own word is `argv[0]`. A
/// matched node without a callback falls through to the unknown hook.
fn dispatch_node(node: &CommandTable, shell: &mut Shell, req: &CommandRequest<'_>) -> i32 {
    let mut node = node;
    let mut depth = 1;
    while depth < req.argv.len() {
        match node.subcommands.iter().find(|c| c.name == req.argv[depth]) {
            Some(child) => {
                node = child;
                depth += 1;
            }
            None => break,
        }
    }
    match &node.callback {
        Some(callback) => {
            let callback = Rc::clone(callback);
            let inner = CommandRequest {
                command: &node.name,
                line: req.line,
                argv: &req.argv[depth - 1..],
            };
            callback(shell, &inner)
        }
        None => {
            let unknown = shell.registry.unknown.clone();
            unknown(shell, req)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_names() {
        let table = CommandTable::root(vec![CommandTable::new("open")
            .with_subcommand(CommandTable::new(""))]);
        assert!(table.validate().is_err());

        let table = CompletionTable::root(vec![CompletionTable::new("")]);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_descend() {
        let table = CompletionTable::root(vec![
            CompletionTable::new("open")
                .with_option(CompletionTable::new("file"))
                .with_option(CompletionTable::new("dir")),
            CompletionTable::new("close"),
        ]);

        let path = vec!["open".to_string()];
        let node = table.descend(&path).unwrap();
        assert_eq!(node.name, "open");
        assert_eq!(node.options.len(), 2);

        let path = vec!["open".to_string(), "file".to_string()];
        assert_eq!(table.descend(&path).unwrap().name, "file");

        let path = vec!["missing".to_string()];
        assert!(table.descend(&path).is_none());

        assert_eq!(table.descend(&[]).unwrap().name, "");
    }
}
