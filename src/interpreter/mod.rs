pub mod context;
mod tree;

pub use context::{BufferedContext, StdioContext};
pub use tree::TreeWalkInterpreter;

/// Sink for everything a program prints.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}

/// Whether bare expression statements show their value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Every executed expression statement writes its value, like an interactive session.
    #[default]
    Evaluate,
    /// Only `print` writes output.
    Script,
}
