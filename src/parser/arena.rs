//! Arena owning every syntax tree node of one compilation.
//!
//! Nodes live in one `id_arena` pool per node type and point at each other
//! through [`Id`] handles. Every allocation is also charged against a fixed
//! byte budget, laid out the way a bump pointer would place it: aligned for
//! the node's type, never freed individually. The pools are dropped together
//! with the arena.

use std::{alloc::Layout, ops::Index};

use crate::error::{CompileError, Result};

use super::{BinExpr, Expr, IfPred, Scope, Stmt, Term};

pub use id_arena::Id;

pub const DEFAULT_ARENA_CAPACITY: usize = 4 * 1024 * 1024;

pub type Pool<T> = id_arena::Arena<T>;

/// A node type with its own pool inside the [`Arena`].
pub trait Node: Sized {
    fn pool(arena: &Arena) -> &Pool<Self>;
    fn pool_mut(arena: &mut Arena) -> &mut Pool<Self>;

    /// Out-of-line payload charged together with the node itself.
    fn payload(&self) -> Option<Layout> {
        None
    }
}

macro_rules! impl_node {
    ($ty:ty, $pool:ident) => {
        impl_node!($ty, $pool, |_node| None);
    };
    ($ty:ty, $pool:ident, |$node:ident| $payload:expr) => {
        impl Node for $ty {
            fn pool(arena: &Arena) -> &Pool<Self> {
                &arena.$pool
            }

            fn pool_mut(arena: &mut Arena) -> &mut Pool<Self> {
                &mut arena.$pool
            }

            fn payload(&self) -> Option<Layout> {
                let $node = self;
                $payload
            }
        }
    };
}

impl_node!(Expr, exprs);
impl_node!(Term, terms);
impl_node!(BinExpr, bin_exprs);
impl_node!(Stmt, stmts);
impl_node!(IfPred, preds);
impl_node!(Scope, scopes, |scope| Layout::array::<Id<Stmt>>(scope.0.len()).ok());

#[derive(Debug)]
pub struct Arena {
    capacity: usize,
    offset: usize,
    exprs: Pool<Expr>,
    terms: Pool<Term>,
    bin_exprs: Pool<BinExpr>,
    stmts: Pool<Stmt>,
    scopes: Pool<Scope>,
    preds: Pool<IfPred>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ARENA_CAPACITY)
    }
}

impl Arena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            offset: 0,
            exprs: Pool::new(),
            terms: Pool::new(),
            bin_exprs: Pool::new(),
            stmts: Pool::new(),
            scopes: Pool::new(),
            preds: Pool::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes handed out so far, alignment padding included.
    pub fn used(&self) -> usize {
        self.offset
    }

    fn reserve(&mut self, layout: Layout) -> Result<()> {
        let aligned = self.offset.next_multiple_of(layout.align());
        let end = aligned
            .checked_add(layout.size())
            .filter(|&end| end <= self.capacity);

        let Some(end) = end else {
            return Err(CompileError::ArenaExhausted {
                requested: layout.size(),
                remaining: self.capacity - self.offset,
                capacity: self.capacity,
            });
        };

        self.offset = end;
        Ok(())
    }

    pub fn alloc<T: Node>(&mut self, node: T) -> Result<Id<T>> {
        self.reserve(Layout::new::<T>())?;
        if let Some(payload) = node.payload() {
            self.reserve(payload)?;
        }

        Ok(T::pool_mut(self).alloc(node))
    }

    pub fn get<T: Node>(&self, id: Id<T>) -> &T {
        &T::pool(self)[id]
    }
}

impl<T: Node> Index<Id<T>> for Arena {
    type Output = T;

    fn index(&self, id: Id<T>) -> &T {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Token, TokenKind};

    fn int_lit(n: &str) -> Term {
        Term::IntLit(Token {
            kind: TokenKind::IntLit,
            line: 1,
            value: Some(n.to_string()),
        })
    }

    #[test]
    fn respects_alignment() {
        let mut arena = Arena::with_capacity(1024);
        arena.reserve(Layout::new::<u8>()).unwrap();
        arena
            .reserve(Layout::from_size_align(8, 8).unwrap())
            .unwrap();
        assert_eq!(arena.used(), 16);
    }

    #[test]
    fn fails_when_full() {
        let mut arena = Arena::with_capacity(4);
        let err = arena.reserve(Layout::new::<u64>()).unwrap_err();
        assert_eq!(
            err,
            CompileError::ArenaExhausted {
                requested: 8,
                remaining: 4,
                capacity: 4,
            }
        );
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn handles_index_their_own_pool() {
        let mut arena = Arena::default();
        let one = arena.alloc(int_lit("1")).unwrap();
        let two = arena.alloc(int_lit("2")).unwrap();
        let expr = arena.alloc(Expr::Term(two)).unwrap();

        assert_ne!(one, two);
        let Term::IntLit(t) = &arena[one] else {
            panic!();
        };
        assert_eq!(t.text(), "1");
        let Expr::Term(term) = arena[expr] else {
            panic!();
        };
        assert_eq!(term, two);
    }

    #[test]
    fn charges_scope_payload() {
        let mut arena = Arena::default();
        arena.alloc(Scope(vec![])).unwrap();
        let empty = arena.used();

        let mut arena = Arena::default();
        let term = arena.alloc(int_lit("0")).unwrap();
        let expr = arena.alloc(Expr::Term(term)).unwrap();
        let exit = arena.alloc(Stmt::Exit(expr)).unwrap();
        let before = arena.used();
        arena.alloc(Scope(vec![exit, exit])).unwrap();

        assert!(arena.used() - before >= empty + 2 * std::mem::size_of::<Id<Stmt>>());
    }

    #[test]
    fn failed_alloc_leaves_pool_untouched() {
        let mut arena = Arena::with_capacity(std::mem::size_of::<Term>());
        arena.alloc(int_lit("1")).unwrap();
        let err = arena.alloc(int_lit("2")).unwrap_err();
        assert!(matches!(err, CompileError::ArenaExhausted { .. }));
        assert_eq!(arena.terms.len(), 1);
    }
}
