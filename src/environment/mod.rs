use crate::string::IdentName;
use crate::value::{error::RuntimeErrorKind, LoxValue};
use std::collections::HashMap;

/// Index of a frame inside its owning [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameRef(u32);

#[derive(Debug, Default)]
struct Frame {
    values: HashMap<IdentName, LoxValue>,
    parent: Option<FrameRef>,
}

/// Lexical scope chain stored as an arena of frames.
///
/// Frames only ever link to their enclosing frame by index. Scopes nest strictly, so the
/// innermost frame is always the last one in the arena and leaving it just pops it.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Creates an environment holding only the global frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Number of live frames, counting the global frame.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn current(&self) -> FrameRef {
        FrameRef(self.frames.len() as u32 - 1)
    }

    fn frame(&self, frame: FrameRef) -> &Frame {
        &self.frames[frame.0 as usize]
    }

    fn frame_mut(&mut self, frame: FrameRef) -> &mut Frame {
        &mut self.frames[frame.0 as usize]
    }

    /// Walks from the innermost frame outwards and returns the first frame binding `name`.
    fn resolve(&self, name: &str) -> Option<FrameRef> {
        let mut cursor = Some(self.current());
        while let Some(frame) = cursor {
            let inner = self.frame(frame);
            if inner.values.contains_key(name) {
                return Some(frame);
            }
            cursor = inner.parent;
        }
        None
    }

    pub fn enter_scope(&mut self) {
        let parent = Some(self.current());
        self.frames.push(Frame {
            values: HashMap::new(),
            parent,
        });
        tracing::trace!(depth = self.depth(), "entered scope");
    }

    /// Discards the innermost frame. The global frame is never discarded.
    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
            tracing::trace!(depth = self.depth(), "exited scope");
        } else {
            tracing::warn!("attempted to exit the global scope");
        }
    }

    /// Runs `body` inside a fresh child scope. The child is discarded whether `body`
    /// succeeds or fails.
    pub fn with_scope<T, E>(
        &mut self,
        body: impl FnOnce(&mut Environment) -> Result<T, E>,
    ) -> Result<T, E> {
        self.enter_scope();
        let depth = self.depth();
        let result = body(self);
        debug_assert_eq!(depth, self.depth(), "scope body must leave nesting balanced");
        self.exit_scope();
        result
    }

    /// Binds `name` in the innermost frame, overwriting any binding already there.
    pub fn declare(&mut self, name: &str, value: LoxValue) {
        let current = self.current();
        self.frame_mut(current).values.insert(name.into(), value);
    }

    pub fn access(&self, name: &str) -> Result<LoxValue, RuntimeErrorKind> {
        self.resolve(name)
            .and_then(|frame| self.frame(frame).values.get(name).cloned())
            .ok_or_else(|| RuntimeErrorKind::UndefinedVariable(name.into()))
    }

    /// Overwrites the nearest existing binding of `name`. Never creates a binding.
    pub fn assign(&mut self, name: &str, value: LoxValue) -> Result<(), RuntimeErrorKind> {
        let Some(frame) = self.resolve(name) else {
            return Err(RuntimeErrorKind::UndefinedVariable(name.into()));
        };
        self.frame_mut(frame).values.insert(name.into(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_declaration_shadows_outer() {
        let mut environment = Environment::new();
        environment.declare("x", LoxValue::Number(1.0));
        environment.enter_scope();
        environment.declare("x", LoxValue::Number(2.0));
        assert_eq!(environment.access("x"), Ok(LoxValue::Number(2.0)));
        environment.exit_scope();
        assert_eq!(environment.access("x"), Ok(LoxValue::Number(1.0)));
    }

    #[test]
    fn assign_updates_nearest_binding() {
        let mut environment = Environment::new();
        environment.declare("x", LoxValue::Number(1.0));
        environment.enter_scope();
        environment
            .assign("x", LoxValue::Number(5.0))
            .expect("x is declared in the global frame.");
        environment.exit_scope();
        assert_eq!(environment.access("x"), Ok(LoxValue::Number(5.0)));
    }

    #[test]
    fn assign_never_creates_a_binding() {
        let mut environment = Environment::new();
        assert_eq!(
            environment.assign("y", LoxValue::Nil),
            Err(RuntimeErrorKind::UndefinedVariable("y".into()))
        );
        assert!(environment.access("y").is_err());
    }

    #[test]
    fn redeclaring_in_one_frame_overwrites() {
        let mut environment = Environment::new();
        environment.declare("a", LoxValue::Number(1.0));
        environment.declare("a", LoxValue::Bool(true));
        assert_eq!(environment.access("a"), Ok(LoxValue::Bool(true)));
    }

    #[test]
    fn scoped_body_restores_parent_on_error() {
        let mut environment = Environment::new();
        let result: Result<(), RuntimeErrorKind> = environment.with_scope(|inner| {
            inner.declare("local", LoxValue::Nil);
            inner.access("missing").map(|_| ())
        });
        assert!(result.is_err());
        assert_eq!(environment.depth(), 1);
        assert!(environment.access("local").is_err());
    }

    #[test]
    fn global_frame_survives_extra_exit() {
        let mut environment = Environment::new();
        environment.declare("g", LoxValue::Nil);
        environment.exit_scope();
        assert_eq!(environment.depth(), 1);
        assert_eq!(environment.access("g"), Ok(LoxValue::Nil));
    }
}
