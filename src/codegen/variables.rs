#[derive(Debug)]
pub(super) struct Var {
    pub name: String,
    /// Stack height at declaration; the value lives in that slot.
    pub stack_loc: usize,
}

/// Variables currently in scope, innermost last.
#[derive(Debug, Default)]
pub(super) struct Variables {
    vars: Vec<Var>,
    scopes: Vec<usize>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&Var> {
        self.vars.iter().rev().find(|v| v.name == name)
    }

    fn innermost(&self) -> &[Var] {
        let start = self.scopes.last().copied().unwrap_or(0);
        &self.vars[start..]
    }

    /// Returns `false` if `name` is already bound in the innermost scope.
    pub fn declare(&mut self, name: &str, stack_loc: usize) -> bool {
        if self.innermost().iter().any(|v| v.name == name) {
            return false;
        }
        self.vars.push(Var {
            name: name.to_string(),
            stack_loc,
        });
        true
    }

    pub fn begin_scope(&mut self) {
        self.scopes.push(self.vars.len());
    }

    /// Drops every variable declared since the matching `begin_scope` and
    /// returns how many there were.
    pub fn end_scope(&mut self) -> usize {
        let start = self.scopes.pop().unwrap_or(0);
        let count = self.vars.len() - start;
        self.vars.truncate(start);
        count
    }
}
