//! Static resolution pass for the Lox interpreter.
//!
//! A single AST walk that:
//! 1. **Builds lexical scopes**: a stack of `HashMap<&str, bool>` tracking
//!    declared (false) and fully defined (true) names in each nested block,
//!    function or class body.
//! 2. **Enforces static rules**: reading a variable in its own initializer,
//!    `return` outside a function, a value-carrying `return` inside an
//!    initializer, `this`/`super` outside a class, `super` in a class with
//!    no superclass, and a class inheriting from itself.
//! 3. **Records binding distances**: every variable occurrence (`Variable`,
//!    `Assign`, `This`, `Super`) is reported back to the interpreter as
//!    either a local at some depth or a global, so the runtime climbs
//!    exactly the right number of environment frames.
//!
//! Resolution walks the whole tree even after an error so one run surfaces
//! every diagnostic; any recorded error fails the pass at the end, before
//! evaluation starts.

use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::token::Token;

/// Which callable construct we are inside. Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ClassType {
    /// Not inside any class
    None,

    /// Inside a class declaration _without_ a superclass
    Class,

    /// Inside a class declaration _with_ a superclass
    Subclass,
}

/// Resolver: tracks scopes, enforces static rules, and records binding
/// distances (locals vs. globals) by calling back into the interpreter.
pub struct Resolver<'s, 'i, 'o, W: Write> {
    interpreter: &'i mut Interpreter<'o, W>,
    scopes: Vec<HashMap<&'s str, bool>>, // false=declared, true=defined
    current_function: FunctionType,
    current_class: ClassType,
    errors: Vec<LoxError>,
}

impl<'s, 'i, 'o, W: Write> Resolver<'s, 'i, 'o, W> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'i mut Interpreter<'o, W>) -> Self {
        info!("Resolver instantiated");

        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            errors: Vec::new(),
        }
    }

    /// Walk all top-level statements. Every static error found anywhere in
    /// the tree is returned together.
    pub fn resolve(&mut self, statements: &'s [Stmt]) -> Result<(), Vec<LoxError>> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        self.resolve_stmts(statements);

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    fn resolve_stmts(&mut self, statements: &'s [Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn error<S: Into<String>>(&mut self, line: usize, msg: S) {
        self.errors.push(LoxError::resolve(line, msg));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &'s Stmt) {
        debug!("Resolving stmt: {:?}", stmt);

        match stmt {
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),

            Stmt::Block(statements) => {
                // 1. Push a new anonymous scope for `{ ... }`
                self.begin_scope();

                self.resolve_stmts(statements);

                // 2. Pop the block scope
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // 1. Declare the variable name (marked but not yet defined)
                self.declare(name);

                // 2. Resolve the initializer expression, if any
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }

                // 3. Define the variable so it is readable in this scope
                self.define(name);
            }

            Stmt::Function(declaration) => {
                // 1. Declare and define the function name immediately, so
                //    the body can call itself recursively
                self.declare(&declaration.name);
                self.define(&declaration.name);

                // 2. Resolve parameters and body under a function context
                self.resolve_function(
                    FunctionType::Function,
                    &declaration.params,
                    &declaration.body,
                );
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);

                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                // 1. Ensure we are inside a function or method at all
                if self.current_function == FunctionType::None {
                    self.error(keyword.line, "Can't return from top-level code.");
                }

                // 2. In an initializer, only bare `return;` is allowed; the
                //    evaluator makes it yield the instance
                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(keyword.line, "Can't return a value from an initializer.");
                    }

                    self.resolve_expr(expr);
                }
            }
        }
    }

    fn resolve_class(
        &mut self,
        name: &'s Token,
        superclass: Option<&'s Expr>,
        methods: &'s [Rc<FunctionDecl>],
    ) {
        // 1. Declare & define the class name so methods can refer to it
        self.declare(name);
        self.define(name);

        // 2. Save and enter the class context
        let enclosing_class: ClassType = self.current_class;

        self.current_class = if superclass.is_some() {
            ClassType::Subclass
        } else {
            ClassType::Class
        };

        // 3. If there is a superclass, guard against self-inheritance, then
        //    resolve it like any variable use and bind `super`
        if let Some(super_expr) = superclass {
            if let Expr::Variable {
                name: super_name, ..
            } = super_expr
            {
                if super_name.lexeme == name.lexeme {
                    self.error(super_name.line, "A class can't inherit from itself.");
                }
            }

            self.resolve_expr(super_expr);

            // Open a scope for `super`
            self.begin_scope();
            if let Some(scope) = self.scopes.last_mut() {
                scope.insert("super", true);
            }
        }

        // 4. Open the implicit `this` scope for methods
        self.begin_scope();
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert("this", true);
        }

        // 5. Resolve each method in its own function context; the method
        //    named `init` is the initializer
        for method in methods {
            let kind: FunctionType = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };

            self.resolve_function(kind, &method.params, &method.body);
        }

        // 6. Close the `this` scope
        self.end_scope();

        // 7. If we opened a `super` scope, close it now
        if superclass.is_some() {
            self.end_scope();
        }

        // 8. Restore the outer class context
        self.current_class = enclosing_class;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &'s Expr) {
        debug!("Resolving expr: {:?}", expr);

        match expr {
            Expr::Literal(_) => {
                // Literals have no sub-expressions
            }

            Expr::Grouping(inner) => {
                self.resolve_expr(inner);
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right);
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                // 1. Prevent reading a variable in its own initializer
                let declared_but_undefined: bool = self
                    .scopes
                    .last()
                    .is_some_and(|scope| scope.get(name.lexeme.as_str()) == Some(&false));

                if declared_but_undefined {
                    self.error(
                        name.line,
                        "Can't read local variable in its own initializer.",
                    );
                }

                // 2. Bind this occurrence at its lexical depth
                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                // Resolve the right-hand side first, then bind the target
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);

                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Get { object, .. } => {
                // Properties are looked up dynamically; only the object
                // expression resolves here
                self.resolve_expr(object);
            }

            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }

            Expr::This { id, keyword } => {
                // `this` is only valid inside class methods
                if self.current_class == ClassType::None {
                    self.error(keyword.line, "Can't use 'this' outside of a class.");
                    return;
                }

                // Bind `this` like a local variable
                self.resolve_local(*id, keyword);
            }

            Expr::Super { id, keyword, .. } => {
                // 1. Disallow outside any class
                if self.current_class == ClassType::None {
                    self.error(keyword.line, "Can't use 'super' outside of a class.");
                    return;
                }

                // 2. Disallow in a class with no superclass
                if self.current_class != ClassType::Subclass {
                    self.error(
                        keyword.line,
                        "Can't use 'super' in a class with no superclass.",
                    );
                    return;
                }

                // 3. Valid: bind `super` like a local variable
                self.resolve_local(*id, keyword);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function's parameters and body.
    ///
    /// `kind` distinguishes plain functions, methods, and the initializer.
    fn resolve_function(&mut self, kind: FunctionType, params: &'s [Token], body: &'s [Stmt]) {
        // 1. Save the enclosing function context so it can be restored
        let enclosing: FunctionType = self.current_function;
        self.current_function = kind;

        // 2. Begin a new lexical scope for the parameters and body
        self.begin_scope();

        // 3. Declare and immediately define each parameter
        for param in params {
            self.declare(param);
            self.define(param);
        }

        // 4. Resolve the body under the new context
        self.resolve_stmts(body);

        // 5. Pop the parameter/body scope and restore the outer context
        self.end_scope();
        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Mark the name as declared but not yet defined. Redeclaring a name in
    /// the same scope replaces the previous binding.
    fn declare(&mut self, name: &'s Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.as_str(), false);
        }
    }

    /// Mark the name as fully defined in the current scope.
    fn define(&mut self, name: &'s Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.as_str(), true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Binding-distance helper
    // ─────────────────────────────────────────────────────────────────────

    /// Record this occurrence as either a local at depth `d` or, if no
    /// enclosing scope declares the name, a global.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        // 1. Search each scope from innermost outward
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme.as_str()) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);

                // 2. Tell the interpreter about the local binding
                self.interpreter.note_local(id, depth);

                return;
            }
        }

        // 3. Not found in any scope: it is a global
        debug!("Resolved '{}' as global", name.lexeme);

        self.interpreter.note_global(id);
    }
}
