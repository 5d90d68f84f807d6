use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use crate::value::{LoxClass, LoxFunction, LoxInstance, Value};

/// Non-local exit threading through `execute`/`evaluate`. A `return`
/// statement unwinds to the nearest call boundary; a runtime error unwinds
/// all the way out. Both travel the same `?` path so block environments are
/// restored on every exit.
#[derive(Debug)]
pub enum Unwind {
    Return(Value),
    Error(LoxError),
}

impl From<LoxError> for Unwind {
    fn from(e: LoxError) -> Self {
        Unwind::Error(e)
    }
}

impl From<io::Error> for Unwind {
    fn from(e: io::Error) -> Self {
        Unwind::Error(LoxError::Io(e))
    }
}

type Exec<T> = std::result::Result<T, Unwind>;

/// Tree-walking evaluator.
///
/// Holds the global scope, the current environment chain, and the binding
/// table filled in by the resolver. Program output goes through the borrowed
/// writer so callers decide where `print` lands (stdout for the binary, a
/// buffer in tests).
pub struct Interpreter<'o, W: Write> {
    output: &'o mut W,
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
}

impl<'o, W: Write> Interpreter<'o, W> {
    pub fn new(output: &'o mut W) -> Self {
        let globals: Rc<RefCell<Environment>> = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: clock_native,
            },
        );

        Interpreter {
            output,
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
        }
    }

    /// Record a variable occurrence as a local at the given depth. Called by
    /// the resolver.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Record a variable occurrence as a global: absent from the table, it
    /// is looked up by name at runtime.
    pub fn note_global(&mut self, id: ExprId) {
        self.locals.remove(&id);
    }

    /// Execute a resolved program.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        for statement in statements {
            if let Err(unwind) = self.execute(statement) {
                return match unwind {
                    // The resolver rejects top-level `return`.
                    Unwind::Return(_) => Ok(()),

                    Unwind::Error(e) => Err(e),
                };
            }
        }

        Ok(())
    }

    /// Evaluate a single expression to a value, for the REPL echo path.
    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value> {
        match self.evaluate(expr) {
            Ok(value) => Ok(value),

            // A `return` cannot escape an expression: calls catch it.
            Err(Unwind::Return(value)) => Ok(value),

            Err(Unwind::Error(e)) => Err(e),
        }
    }

    /// REPL echo: evaluate an expression statement and render its value on
    /// the output writer, the same sink `print` uses.
    pub fn echo_expression(&mut self, expr: &Expr) -> Result<()> {
        let value: Value = self.evaluate_expression(expr)?;

        writeln!(self.output, "{}", value)?;

        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Exec<()> {
        debug!("Executing stmt: {:?}", stmt);

        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;

                writeln!(self.output, "{}", value)?;

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let environment: Rc<RefCell<Environment>> = Rc::new(RefCell::new(
                    Environment::with_enclosing(Rc::clone(&self.environment)),
                ));

                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }

                Ok(())
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Function(declaration) => {
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(())
            }

            Stmt::Return { keyword: _, value } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Err(Unwind::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Exec<()> {
        let superclass_value: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),

                _ => {
                    let line: usize = match expr {
                        Expr::Variable { name, .. } => name.line,
                        _ => name.line,
                    };

                    return Err(LoxError::runtime(line, "Superclass must be a class.").into());
                }
            },

            None => None,
        };

        // Two-step define/assign so the class name already exists in the
        // scope the methods close over.
        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        let method_closure: Rc<RefCell<Environment>> = match &superclass_value {
            Some(superclass) => {
                let environment: Rc<RefCell<Environment>> = Rc::new(RefCell::new(
                    Environment::with_enclosing(Rc::clone(&self.environment)),
                ));

                environment
                    .borrow_mut()
                    .define("super", Value::Class(Rc::clone(superclass)));

                environment
            }

            None => Rc::clone(&self.environment),
        };

        let mut method_map: HashMap<String, Rc<LoxFunction>> = HashMap::new();

        for method in methods {
            let is_initializer: bool = method.name.lexeme == "init";

            let function = LoxFunction::new(
                Rc::clone(method),
                Rc::clone(&method_closure),
                is_initializer,
            );

            method_map.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class = LoxClass::new(name.lexeme.clone(), superclass_value, method_map);

        self.environment
            .borrow_mut()
            .assign(&name.lexeme, Value::Class(Rc::new(class)), name.line)?;

        Ok(())
    }

    /// Run statements in the given environment, restoring the previous one
    /// on every exit path (normal, `return` unwind, error).
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Exec<()> {
        let previous: Rc<RefCell<Environment>> =
            std::mem::replace(&mut self.environment, environment);

        for statement in statements {
            if let Err(unwind) = self.execute(statement) {
                self.environment = previous;

                return Err(unwind);
            }
        }

        self.environment = previous;

        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> Exec<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::Number(n) => Value::Number(*n),
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_value: Value = self.evaluate(left)?;

                match operator.token_type {
                    TokenType::OR if is_truthy(&left_value) => Ok(left_value),

                    TokenType::AND if !is_truthy(&left_value) => Ok(left_value),

                    _ => self.evaluate(right),
                }
            }

            Expr::Variable { id, name } => Ok(self.look_up_variable(name, *id)?),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,

                    None => self.globals.borrow_mut().assign(
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => Ok(LoxInstance::get(&instance, name)?),

                _ => Err(LoxError::runtime(name.line, "Only instances have properties.").into()),
            },

            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value: Value = self.evaluate(value)?;

                    instance.borrow_mut().set(name, value.clone());

                    Ok(value)
                }

                _ => Err(LoxError::runtime(name.line, "Only instances have fields.").into()),
            },

            Expr::This { id, keyword } => Ok(self.look_up_variable(keyword, *id)?),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Exec<Value> {
        let value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(LoxError::runtime(operator.line, "Operand must be a number.").into()),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&value))),

            _ => Err(LoxError::runtime(operator.line, "Invalid unary operator.").into()),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Exec<Value> {
        let left_value: Value = self.evaluate(left)?;
        let right_value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                _ => Err(LoxError::runtime(
                    operator.line,
                    "Operands must be two numbers or two strings.",
                )
                .into()),
            },

            TokenType::MINUS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),

                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.").into()),
            },

            TokenType::STAR => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.").into()),
            },

            // Division by zero follows IEEE-754 and is not an error.
            TokenType::SLASH => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),

                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.").into()),
            },

            TokenType::GREATER => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),

                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.").into()),
            },

            TokenType::GREATER_EQUAL => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),

                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.").into()),
            },

            TokenType::LESS => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),

                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.").into()),
            },

            TokenType::LESS_EQUAL => match (left_value, right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),

                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.").into()),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&left_value, &right_value))),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(&left_value, &right_value))),

            _ => Err(LoxError::runtime(operator.line, "Invalid binary operator.").into()),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Exec<Value> {
        let callee_value: Value = self.evaluate(callee)?;

        let mut arg_values: Vec<Value> = Vec::with_capacity(arguments.len());

        for argument in arguments {
            arg_values.push(self.evaluate(argument)?);
        }

        match callee_value {
            Value::NativeFunction { arity, func, .. } => {
                check_arity(arity, arg_values.len(), paren)?;

                Ok(func(&arg_values)?)
            }

            Value::Function(function) => {
                check_arity(function.arity(), arg_values.len(), paren)?;

                Ok(function.call(self, arg_values)?)
            }

            Value::Class(class) => {
                check_arity(class.arity(), arg_values.len(), paren)?;

                let instance: Rc<RefCell<LoxInstance>> =
                    Rc::new(RefCell::new(LoxInstance::new(Rc::clone(&class))));

                if let Some(initializer) = class.find_method("init") {
                    initializer.bind(Rc::clone(&instance)).call(self, arg_values)?;
                }

                Ok(Value::Instance(instance))
            }

            _ => Err(
                LoxError::runtime(paren.line, "Can only call functions and classes.").into(),
            ),
        }
    }

    /// `super.method`: the superclass sits at the resolved depth, the
    /// receiver one scope nearer. Lookup starts above the current class.
    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Exec<Value> {
        let distance: usize = match self.locals.get(&id) {
            Some(&distance) => distance,

            None => {
                return Err(
                    LoxError::runtime(keyword.line, "Undefined variable 'super'.").into(),
                )
            }
        };

        let superclass: Value =
            Environment::get_at(&self.environment, distance, "super", keyword.line)?;

        let receiver: Value =
            Environment::get_at(&self.environment, distance - 1, "this", keyword.line)?;

        match (superclass, receiver) {
            (Value::Class(superclass), Value::Instance(receiver)) => {
                match superclass.find_method(&method.lexeme) {
                    Some(found) => Ok(Value::Function(Rc::new(found.bind(receiver)))),

                    None => Err(LoxError::runtime(
                        method.line,
                        format!("Undefined property '{}'.", method.lexeme),
                    )
                    .into()),
                }
            }

            _ => Err(LoxError::runtime(keyword.line, "Undefined variable 'super'.").into()),
        }
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => {
                Environment::get_at(&self.environment, distance, &name.lexeme, name.line)
            }

            None => self.globals.borrow().get(&name.lexeme, name.line),
        }
    }
}

fn check_arity(expected: usize, got: usize, paren: &Token) -> Result<()> {
    if expected != got {
        return Err(LoxError::runtime(
            paren.line,
            format!("Expected {} arguments but got {}.", expected, got),
        ));
    }

    Ok(())
}

/// `false` and `nil` are falsy; everything else (including `0` and `""`) is
/// truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}

fn is_equal(left: &Value, right: &Value) -> bool {
    left == right
}

fn clock_native(_args: &[Value]) -> Result<Value> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LoxError::runtime(0, format!("Clock error: {}", e)))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}
