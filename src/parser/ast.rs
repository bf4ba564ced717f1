use crate::lexer::Token;

use super::{Arena, Id};

#[derive(Clone, Debug, PartialEq)]
pub struct Program(pub Vec<Id<Stmt>>);

impl Program {
    /// Whether any `exit` statement appears anywhere in the tree, reachable or not.
    pub fn has_exit(&self, arena: &Arena) -> bool {
        self.0.iter().any(|&stmt| stmt_has_exit(arena, stmt))
    }
}

fn stmt_has_exit(arena: &Arena, stmt: Id<Stmt>) -> bool {
    match &arena[stmt] {
        Stmt::Exit(_) => true,
        Stmt::Let(_, _) | Stmt::Assign(_, _) => false,
        Stmt::Scope(scope) => scope_has_exit(arena, *scope),
        Stmt::If(_, scope, pred) => {
            scope_has_exit(arena, *scope) || (*pred).is_some_and(|p| pred_has_exit(arena, p))
        }
    }
}

fn scope_has_exit(arena: &Arena, scope: Id<Scope>) -> bool {
    arena[scope].0.iter().any(|&stmt| stmt_has_exit(arena, stmt))
}

fn pred_has_exit(arena: &Arena, pred: Id<IfPred>) -> bool {
    let mut pred = Some(pred);
    while let Some(p) = pred {
        let (scope, next) = match &arena[p] {
            IfPred::Elif(_, scope, next) => (*scope, *next),
            IfPred::Else(scope) => (*scope, None),
        };
        if scope_has_exit(arena, scope) {
            return true;
        }
        pred = next;
    }
    false
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Exit(Id<Expr>),
    Let(Token, Id<Expr>),
    Assign(Token, Id<Expr>),
    Scope(Id<Scope>),
    If(Id<Expr>, Id<Scope>, Option<Id<IfPred>>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scope(pub Vec<Id<Stmt>>);

/// The `elif` / `else` chain hanging off an `if`.
#[derive(Clone, Debug, PartialEq)]
pub enum IfPred {
    Elif(Id<Expr>, Id<Scope>, Option<Id<IfPred>>),
    Else(Id<Scope>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Term(Id<Term>),
    Binary(Id<BinExpr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    IntLit(Token),
    Ident(Token),
    Paren(Id<Expr>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinExpr {
    pub kind: BinOpKind,
    pub lhs: Id<Expr>,
    pub rhs: Id<Expr>,
}
