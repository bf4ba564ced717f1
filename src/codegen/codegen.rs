use std::fmt::{self, Write as _};

use tracing::{debug, trace};

use crate::{
    error::{CompileError, Result},
    lexer::Token,
    parser::{Arena, BinExpr, BinOpKind, Expr, Id, IfPred, Program, Scope, Stmt, Term},
};

use super::variables::Variables;

const SYS_EXIT: u32 = 60;
const SLOT_SIZE: usize = 8;

pub struct Codegen<'a> {
    arena: &'a Arena,
    output: String,
    stack_size: usize,
    vars: Variables,
    label_index: usize,
}

impl<'a> Codegen<'a> {
    pub fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            output: String::new(),
            stack_size: 0,
            vars: Variables::new(),
            label_index: 0,
        }
    }

    pub fn generate(mut self, program: &Program) -> Result<String> {
        self.emit("global _start");
        self.emit("_start:");

        for &stmt in &program.0 {
            self.gen_stmt(stmt)?;
        }

        self.emit(format_args!("  mov rax, {SYS_EXIT}"));
        self.emit("  mov rdi, 0");
        self.emit("  syscall");

        debug!(
            labels = self.label_index,
            bytes = self.output.len(),
            "generated assembly"
        );
        Ok(self.output)
    }

    fn emit(&mut self, line: impl fmt::Display) {
        // Writing into a String cannot fail.
        let _ = writeln!(self.output, "{line}");
    }

    fn push(&mut self, operand: &str) {
        self.emit(format_args!("  push {operand}"));
        self.stack_size += 1;
    }

    fn pop(&mut self, reg: &str) {
        self.emit(format_args!("  pop {reg}"));
        self.stack_size -= 1;
    }

    fn new_label(&mut self) -> String {
        let s = format!(".L{:0>3}", self.label_index);
        self.label_index += 1;
        s
    }

    /// Byte offset from `rsp` of the slot recorded at `stack_loc`.
    fn slot_offset(&self, stack_loc: usize) -> usize {
        (self.stack_size - stack_loc - 1) * SLOT_SIZE
    }

    fn lookup(&self, ident: &Token) -> Result<usize> {
        self.vars
            .lookup(ident.text())
            .map(|v| v.stack_loc)
            .ok_or_else(|| CompileError::UndeclaredIdentifier {
                name: ident.text().to_string(),
                line: ident.line,
            })
    }

    fn gen_stmt(&mut self, stmt: Id<Stmt>) -> Result<()> {
        let arena = self.arena;
        match &arena[stmt] {
            Stmt::Exit(expr) => {
                self.emit("  ;; exit");
                self.gen_expr(*expr)?;
                self.emit(format_args!("  mov rax, {SYS_EXIT}"));
                self.pop("rdi");
                self.emit("  syscall");
            }
            Stmt::Let(ident, expr) => {
                self.emit("  ;; let");
                // The initializer's pushed value becomes the slot, and it still
                // sees any outer binding of the same name.
                let stack_loc = self.stack_size;
                self.gen_expr(*expr)?;
                if !self.vars.declare(ident.text(), stack_loc) {
                    return Err(CompileError::DuplicateIdentifier {
                        name: ident.text().to_string(),
                        line: ident.line,
                    });
                }
            }
            Stmt::Assign(ident, expr) => {
                self.emit("  ;; assign");
                let stack_loc = self.lookup(ident)?;
                self.gen_expr(*expr)?;
                self.pop("rax");
                let offset = self.slot_offset(stack_loc);
                self.emit(format_args!("  mov [rsp + {offset}], rax"));
            }
            Stmt::Scope(scope) => self.gen_scope(*scope)?,
            Stmt::If(expr, scope, pred) => {
                self.emit("  ;; if");
                self.gen_if(*expr, *scope, *pred)?;
            }
        }
        Ok(())
    }

    fn gen_scope(&mut self, scope: Id<Scope>) -> Result<()> {
        let arena = self.arena;
        let Scope(stmts) = &arena[scope];

        self.vars.begin_scope();
        for &stmt in stmts {
            self.gen_stmt(stmt)?;
        }

        let pop_count = self.vars.end_scope();
        if pop_count != 0 {
            self.emit(format_args!("  add rsp, {}", pop_count * SLOT_SIZE));
            self.stack_size -= pop_count;
        }
        Ok(())
    }

    /// Pops the condition and jumps to the returned label when it is zero.
    fn gen_condition(&mut self, expr: Id<Expr>) -> Result<String> {
        self.gen_expr(expr)?;
        self.pop("rax");
        let label = self.new_label();
        self.emit("  test rax, rax");
        self.emit(format_args!("  jz {label}"));
        Ok(label)
    }

    fn gen_if(&mut self, expr: Id<Expr>, scope: Id<Scope>, pred: Option<Id<IfPred>>) -> Result<()> {
        let else_label = self.gen_condition(expr)?;
        self.gen_scope(scope)?;

        let Some(pred) = pred else {
            self.emit(format_args!("{else_label}:"));
            return Ok(());
        };

        let end_label = self.new_label();
        self.emit(format_args!("  jmp {end_label}"));
        self.emit(format_args!("{else_label}:"));
        self.gen_if_pred(pred, &end_label)?;
        self.emit(format_args!("{end_label}:"));
        trace!(%end_label, "closed if chain");
        Ok(())
    }

    fn gen_if_pred(&mut self, pred: Id<IfPred>, end_label: &str) -> Result<()> {
        let arena = self.arena;
        let mut pred = Some(pred);
        while let Some(p) = pred {
            pred = match &arena[p] {
                IfPred::Elif(expr, scope, next) => {
                    self.emit("  ;; elif");
                    let else_label = self.gen_condition(*expr)?;
                    self.gen_scope(*scope)?;
                    self.emit(format_args!("  jmp {end_label}"));
                    self.emit(format_args!("{else_label}:"));
                    *next
                }
                IfPred::Else(scope) => {
                    self.emit("  ;; else");
                    self.gen_scope(*scope)?;
                    None
                }
            };
        }
        Ok(())
    }

    /// Walks the expression tree with an explicit work list, so operator
    /// chains of any length are generated without recursion. Right hand
    /// sides are generated first, so `rax` ends up with the left operand.
    fn gen_expr(&mut self, expr: Id<Expr>) -> Result<()> {
        let arena = self.arena;
        let mut work = vec![Work::Expr(expr)];

        while let Some(item) = work.pop() {
            match item {
                Work::Expr(expr) => match &arena[expr] {
                    Expr::Term(term) => {
                        if let Some(inner) = self.gen_term(*term)? {
                            work.push(Work::Expr(inner));
                        }
                    }
                    Expr::Binary(bin) => {
                        let BinExpr { kind, lhs, rhs } = arena[*bin];
                        work.push(Work::BinOp(kind));
                        work.push(Work::Expr(lhs));
                        work.push(Work::Expr(rhs));
                    }
                },
                Work::BinOp(kind) => self.gen_binop(kind),
            }
        }
        Ok(())
    }

    /// Pushes a literal or variable, or hands back the inside of a
    /// parenthesized term for the caller to generate.
    fn gen_term(&mut self, term: Id<Term>) -> Result<Option<Id<Expr>>> {
        let arena = self.arena;
        match &arena[term] {
            Term::IntLit(lit) => {
                self.emit(format_args!("  mov rax, {}", lit.text()));
                self.push("rax");
            }
            Term::Ident(ident) => {
                let stack_loc = self.lookup(ident)?;
                let offset = self.slot_offset(stack_loc);
                self.push(&format!("QWORD [rsp + {offset}]"));
            }
            Term::Paren(expr) => return Ok(Some(*expr)),
        }
        Ok(None)
    }

    /// Both operands are on the stack, left on top.
    fn gen_binop(&mut self, kind: BinOpKind) {
        self.pop("rax");
        self.pop("rbx");

        match kind {
            BinOpKind::Add => self.emit("  add rax, rbx"),
            BinOpKind::Sub => self.emit("  sub rax, rbx"),
            BinOpKind::Mul => self.emit("  imul rax, rbx"),
            BinOpKind::Div => {
                self.emit("  cqo");
                self.emit("  idiv rbx");
            }
        }

        self.push("rax");
    }
}

enum Work {
    Expr(Id<Expr>),
    BinOp(BinOpKind),
}
