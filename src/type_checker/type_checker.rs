use std::collections::BTreeSet;

use tracing::{info, trace};

use crate::{
    ast::{ast::Stmt, statements::Program, types::TypeExpr},
    containers::SymbolMap,
    errors::errors::{Error, ErrorImpl},
    types::{
        BuiltinKind, Builtins, ClassId, ClassRegistry, ClassType, FuncType, Mismatch, Type,
        VerifyError,
    },
    Span, ICE,
};

/// A check failed and its diagnostic has already been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failed;

pub type CheckResult<T> = Result<T, Failed>;

/// Definite-assignment state of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InitState {
    Uninitialized,
    /// Assigned on some but not all paths reaching this point.
    Conditional,
    Initialized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub ty: Type,
    pub init: InitState,
    pub constant: bool,
    /// Bound by a definition whose value failed to check. Reads of it fail
    /// without reporting again.
    pub unresolved: bool,
    pub span: Span,
}

impl Symbol {
    pub fn is_initialized(&self) -> bool {
        self.init == InitState::Initialized
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ScopeKind {
    Root,
    Branch,
    Function { declared: Option<Type> },
}

/// One frame of the scope stack. Every frame holds a full copy of the
/// bindings visible in it.
#[derive(Debug, Clone)]
pub struct Scope {
    pub symbols: SymbolMap<Symbol>,
    /// Type returned on every path through this frame so far.
    pub return_type: Option<Type>,
    kind: ScopeKind,
}

/// What a branch frame looked like when it was left.
#[derive(Debug, Clone)]
pub struct Branch {
    pub symbols: SymbolMap<Symbol>,
    pub return_type: Option<Type>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Report warnings (ignored generics, ignored super types) as errors.
    pub warnings_as_errors: bool,
}

#[derive(Debug)]
pub struct TypeChecker {
    pub classes: ClassRegistry,
    pub builtins: Builtins,
    pub functions: Vec<FuncType>,
    scopes: Vec<Scope>,
    diagnostics: Vec<Error>,
    options: CheckOptions,
}

impl TypeChecker {
    pub fn new(options: CheckOptions) -> Self {
        let mut classes = ClassRegistry::new();
        let builtins = Builtins::synthesize(&mut classes);

        let mut symbols = SymbolMap::new();
        for kind in BuiltinKind::ALL {
            symbols.insert(
                kind.name(),
                Symbol {
                    ty: Type::Class(classes.handle(builtins.get(kind))),
                    init: InitState::Initialized,
                    constant: true,
                    unresolved: false,
                    span: Span::null(),
                },
            );
        }

        TypeChecker {
            classes,
            builtins,
            functions: vec![],
            scopes: vec![Scope {
                symbols,
                return_type: None,
                kind: ScopeKind::Root,
            }],
            diagnostics: vec![],
            options,
        }
    }

    // DIAGNOSTICS

    /// Records an error and returns the marker to propagate.
    pub fn error(&mut self, kind: ErrorImpl, span: &Span) -> Failed {
        self.diagnostics.push(Error::new(kind, span.clone()));
        Failed
    }

    pub fn warn(&mut self, kind: ErrorImpl, span: &Span) {
        let warning = Error::warning(kind, span.clone());
        if self.options.warnings_as_errors {
            self.diagnostics.push(warning.promote());
        } else {
            self.diagnostics.push(warning);
        }
    }

    /// Reports a failed comparison of `received` against `expected`.
    pub fn mismatch(
        &mut self,
        mismatch: Mismatch,
        expected: &Type,
        received: &Type,
        span: &Span,
    ) -> Failed {
        match mismatch {
            Mismatch::Incompatible => self.error(
                ErrorImpl::TypeMismatch {
                    expected: expected.to_string(),
                    received: received.to_string(),
                },
                span,
            ),
            Mismatch::Unsupported(feature) => self.error(
                ErrorImpl::Unimplemented {
                    feature: feature.to_string(),
                },
                span,
            ),
        }
    }

    /// `Ok` if `received` satisfies `expected`, reporting otherwise.
    pub fn expect_type(&mut self, received: &Type, expected: &Type, span: &Span) -> CheckResult<()> {
        match self.classes.compare(received, expected) {
            Ok(()) => Ok(()),
            Err(mismatch) => Err(self.mismatch(mismatch, expected, received, span)),
        }
    }

    pub fn diagnostics(&self) -> &[Error] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|error| error.is_error()).count()
    }

    // TYPES

    pub fn builtin(&self, kind: BuiltinKind) -> Type {
        self.builtins.object(kind)
    }

    pub fn class(&self, id: ClassId) -> &ClassType {
        self.classes.get(id)
    }

    /// Lowers an annotation and resolves its class names.
    pub fn resolve_annotation(&mut self, annotation: &TypeExpr) -> CheckResult<Type> {
        let mut ty = annotation.to_type();
        match ty.verify(&self.classes) {
            Ok(()) => Ok(ty),
            Err(VerifyError::UnknownClass(name)) => {
                Err(self.error(ErrorImpl::UnknownSymbol { name }, annotation.get_span()))
            }
            Err(VerifyError::Generics(_)) => Err(self.error(
                ErrorImpl::Unimplemented {
                    feature: String::from("Generic types"),
                },
                annotation.get_span(),
            )),
        }
    }

    /// A condition must be an object whose class casts to exactly `bool`
    /// through a plain `=>` (or `toBool`) overload.
    pub fn check_condition(&mut self, ty: &Type, span: &Span) -> CheckResult<()> {
        let accepted = ty.object_class().is_some_and(|class| {
            let class = self.classes.get(class);
            ["=>", "toBool"]
                .iter()
                .filter_map(|name| class.field(name))
                .filter_map(Type::as_func)
                .flat_map(|func| func.overloads.iter())
                .any(|overload| {
                    overload.generics.is_empty()
                        && overload.arguments.is_empty()
                        && self.builtins.is(&overload.return_type, BuiltinKind::Bool)
                })
        });

        if accepted {
            Ok(())
        } else {
            Err(self.error(
                ErrorImpl::TypeMismatch {
                    expected: BuiltinKind::Bool.name().to_string(),
                    received: ty.to_string(),
                },
                span,
            ))
        }
    }

    /// Picks the first candidate parameter list the arguments satisfy.
    pub fn resolve_overload(
        &mut self,
        callee: &str,
        candidates: &[Vec<Type>],
        arguments: &[Type],
        span: &Span,
    ) -> CheckResult<usize> {
        'candidates: for (index, parameters) in candidates.iter().enumerate() {
            if parameters.len() != arguments.len() {
                continue;
            }
            for (argument, parameter) in arguments.iter().zip(parameters.iter()) {
                match self.classes.compare(argument, parameter) {
                    Ok(()) => {}
                    Err(Mismatch::Incompatible) => continue 'candidates,
                    Err(unsupported) => {
                        return Err(self.mismatch(unsupported, parameter, argument, span))
                    }
                }
            }
            trace!(target: "typeck", callee, overload = index, "selected overload");
            return Ok(index);
        }

        if let [only] = candidates {
            if only.len() != arguments.len() {
                return Err(self.error(
                    ErrorImpl::ArityMismatch {
                        expected: only.len(),
                        received: arguments.len(),
                    },
                    span,
                ));
            }
        }
        Err(self.error(
            ErrorImpl::NoMatchingOverload {
                callee: callee.to_string(),
                arguments: format_types(arguments),
            },
            span,
        ))
    }

    /// Resolves a call of `func`, returning the chosen overload and its
    /// return type.
    pub fn call(
        &mut self,
        callee: &str,
        func: &FuncType,
        arguments: &[Type],
        span: &Span,
    ) -> CheckResult<(usize, Type)> {
        let candidates: Vec<Vec<Type>> = func
            .overloads
            .iter()
            .map(|overload| overload.arguments.clone())
            .collect();
        let index = self.resolve_overload(callee, &candidates, arguments, span)?;
        Ok((index, func.overloads[index].return_type.clone()))
    }

    /// Resolves a constructor of `class`. A class without constructors
    /// accepts an empty argument list.
    pub fn construct(&mut self, class: ClassId, arguments: &[Type], span: &Span) -> CheckResult<Option<usize>> {
        let class = self.classes.get(class);
        if class.constructors.is_empty() && arguments.is_empty() {
            return Ok(None);
        }
        let name = class.name.clone();
        let candidates = class.constructors.clone();
        self.resolve_overload(&name, &candidates, arguments, span).map(Some)
    }

    /// Looks up `member` on the class of `receiver`.
    pub fn member(&mut self, receiver: &Type, member: &str, span: &Span) -> CheckResult<Type> {
        let Some(class) = receiver.object_class() else {
            return Err(self.error(
                ErrorImpl::NotAnObject {
                    type_: receiver.to_string(),
                },
                span,
            ));
        };
        let class = self.classes.get(class);
        match class.field(member) {
            Some(field) => Ok(field.clone()),
            None => {
                let kind = ErrorImpl::NoSuchMember {
                    class: class.name.clone(),
                    member: member.to_string(),
                };
                Err(self.error(kind, span))
            }
        }
    }

    /// Calls the operator field `operator` of `receiver`, as `a + b` calls
    /// `a."+"(b)`.
    pub fn call_member(
        &mut self,
        receiver: &Type,
        operator: &str,
        arguments: &[Type],
        span: &Span,
    ) -> CheckResult<(usize, Type)> {
        let field = self.member(receiver, operator, span)?;
        match field {
            Type::Func(func) => self.call(operator, &func, arguments, span),
            other => Err(self.error(
                ErrorImpl::TypeMismatch {
                    expected: String::from("function"),
                    received: other.to_string(),
                },
                span,
            )),
        }
    }

    /// Adds a function type to the program's list unless an equal one is
    /// already there.
    pub fn register_function(&mut self, func: &FuncType) {
        if !self.functions.contains(func) {
            self.functions.push(func.clone());
        }
    }

    // SCOPES

    pub fn current(&self) -> &Scope {
        match self.scopes.last() {
            Some(scope) => scope,
            None => ICE!("scope stack is empty"),
        }
    }

    fn current_mut(&mut self) -> &mut Scope {
        match self.scopes.last_mut() {
            Some(scope) => scope,
            None => ICE!("scope stack is empty"),
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// `true` outside of every branch and function body.
    pub fn at_root(&self) -> bool {
        self.depth() == 1
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.current().symbols.get(name)
    }

    /// Reads a variable: it must exist and be initialized on every path.
    pub fn read(&mut self, name: &str, span: &Span) -> CheckResult<Type> {
        let (ty, init) = match self.lookup(name) {
            Some(symbol) if symbol.unresolved => return Err(Failed),
            Some(symbol) => (symbol.ty.clone(), symbol.init),
            None => {
                return Err(self.error(
                    ErrorImpl::UnknownSymbol {
                        name: name.to_string(),
                    },
                    span,
                ))
            }
        };

        match init {
            InitState::Initialized => Ok(ty),
            InitState::Uninitialized | InitState::Conditional => Err(self.error(
                ErrorImpl::UseBeforeInit {
                    name: name.to_string(),
                    conditional: init == InitState::Conditional,
                },
                span,
            )),
        }
    }

    /// Binds `name` in the current scope.
    ///
    /// Rebinding an existing name keeps the old type and merges the init
    /// state when the new type satisfies it. When both sides are functions
    /// each new signature either matches an existing one (and must return a
    /// compatible type) or is appended as an overload. Initialized
    /// constants cannot be rebound.
    pub fn define(
        &mut self,
        name: &str,
        ty: Type,
        init: InitState,
        constant: bool,
        span: &Span,
    ) -> CheckResult<()> {
        let Some(existing) = self.lookup(name).filter(|symbol| !symbol.unresolved).cloned() else {
            self.current_mut().symbols.insert(
                name,
                Symbol {
                    ty,
                    init,
                    constant,
                    unresolved: false,
                    span: span.clone(),
                },
            );
            return Ok(());
        };

        let redefinition = |old: String, new: String| ErrorImpl::Redefinition {
            name: name.to_string(),
            old,
            new,
        };

        if existing.constant && existing.is_initialized() {
            return Err(self.error(redefinition(existing.ty.to_string(), ty.to_string()), span));
        }

        let merged_type = match (&existing.ty, &ty) {
            (Type::Func(old), Type::Func(new)) => {
                let mut merged = old.clone();
                for overload in &new.overloads {
                    let Some(matching) = merged.signature(&overload.arguments) else {
                        merged.overloads.push(overload.clone());
                        continue;
                    };
                    match self.classes.compare(&overload.return_type, &matching.return_type) {
                        Ok(()) => {}
                        Err(Mismatch::Incompatible) => {
                            let kind = redefinition(matching.to_string(), overload.to_string());
                            return Err(self.error(kind, span));
                        }
                        Err(unsupported) => {
                            let expected = matching.return_type.clone();
                            return Err(self.mismatch(unsupported, &expected, &overload.return_type, span));
                        }
                    }
                }
                Type::Func(merged)
            }
            _ => match self.classes.compare(&ty, &existing.ty) {
                Ok(()) => existing.ty.clone(),
                Err(Mismatch::Incompatible) => {
                    return Err(self.error(redefinition(existing.ty.to_string(), ty.to_string()), span))
                }
                Err(unsupported) => return Err(self.mismatch(unsupported, &existing.ty, &ty, span)),
            },
        };

        if let Some(symbol) = self.current_mut().symbols.get_mut(name) {
            symbol.ty = merged_type;
            symbol.init = symbol.init.max(init);
            symbol.constant |= constant;
        }
        Ok(())
    }

    /// Binds `name` after the value meant for it failed to check, so later
    /// uses are skipped instead of reported as unknown. An existing binding
    /// keeps its type and counts as assigned.
    pub fn define_unresolved(&mut self, name: &str, span: &Span) {
        if let Some(symbol) = self.current_mut().symbols.get_mut(name) {
            symbol.init = InitState::Initialized;
            return;
        }
        self.current_mut().symbols.insert(
            name,
            Symbol {
                ty: Type::None,
                init: InitState::Initialized,
                constant: false,
                unresolved: true,
                span: span.clone(),
            },
        );
    }

    /// Binds `name` unconditionally, hiding any outer binding.
    pub fn shadow(&mut self, name: &str, ty: Type, span: &Span) {
        self.current_mut().symbols.insert(
            name,
            Symbol {
                ty,
                init: InitState::Initialized,
                constant: false,
                unresolved: false,
                span: span.clone(),
            },
        );
    }

    pub fn enter_branch(&mut self) {
        let symbols = self.current().symbols.clone();
        self.scopes.push(Scope {
            symbols,
            return_type: None,
            kind: ScopeKind::Branch,
        });
        trace!(target: "typeck::scope", depth = self.depth(), "entered branch");
    }

    pub fn exit_branch(&mut self) -> Branch {
        match self.scopes.pop() {
            Some(Scope {
                symbols,
                return_type,
                kind: ScopeKind::Branch,
            }) => {
                trace!(target: "typeck::scope", depth = self.depth(), "left branch");
                Branch {
                    symbols,
                    return_type,
                }
            }
            _ => ICE!("left a branch that was never entered"),
        }
    }

    /// Reconciles the arms of a branching construct into the current scope.
    ///
    /// With `exhaustive` set exactly one arm always runs, so a name
    /// initialized in every arm is initialized afterwards and a return type
    /// present in every arm carries over. Otherwise anything an arm
    /// initializes is only conditionally initialized. Names introduced by
    /// the arms take the intersection of their types. An existing name keeps
    /// its outer type unless the merge is exhaustive, in which case the
    /// overloads every arm added survive.
    pub fn merge_branches(&mut self, arms: Vec<Branch>, exhaustive: bool, span: &Span) -> CheckResult<()> {
        let mut result = Ok(());

        let names: BTreeSet<&String> = arms.iter().flat_map(|arm| arm.symbols.keys()).collect();
        for name in names {
            let states: Vec<InitState> = arms
                .iter()
                .map(|arm| {
                    arm.symbols
                        .get(name)
                        .map_or(InitState::Uninitialized, |symbol| symbol.init)
                })
                .collect();
            let merged = if exhaustive && states.iter().all(|state| *state == InitState::Initialized) {
                InitState::Initialized
            } else if states.iter().any(|state| *state != InitState::Uninitialized) {
                InitState::Conditional
            } else {
                InitState::Uninitialized
            };

            if let Some(outer) = self.current().symbols.get(name).cloned() {
                let mut symbol = outer;
                symbol.init = symbol.init.max(merged);
                if exhaustive && !symbol.unresolved {
                    symbol.ty = self.reconcile(&symbol.ty, arms.iter().filter_map(|arm| arm.symbols.get(name)));
                }
                self.current_mut().symbols.insert(name.as_str(), symbol);
                continue;
            }

            let mut introduced = arms.iter().filter_map(|arm| arm.symbols.get(name));
            let Some(first) = introduced.next() else {
                continue;
            };
            let mut symbol = Symbol {
                init: merged,
                ..first.clone()
            };
            for other in introduced {
                if symbol.unresolved || other.unresolved {
                    symbol = Symbol {
                        ty: Type::None,
                        unresolved: true,
                        ..symbol
                    };
                    break;
                }
                match self.classes.intersect(&symbol.ty, &other.ty) {
                    Ok(ty) => symbol.ty = ty,
                    Err(mismatch) => {
                        result = Err(self.mismatch(mismatch, &symbol.ty, &other.ty, span));
                        break;
                    }
                }
                symbol.constant |= other.constant;
            }
            trace!(target: "typeck::scope", name = %name, init = ?symbol.init, ty = %symbol.ty, "merged binding");
            self.current_mut().symbols.insert(name.as_str(), symbol);
        }

        if exhaustive && !arms.is_empty() && arms.iter().all(|arm| arm.return_type.is_some()) {
            let mut returned = self.current().return_type.clone();
            for ty in arms.iter().filter_map(|arm| arm.return_type.as_ref()) {
                returned = match returned {
                    None => Some(ty.clone()),
                    Some(previous) => match self.classes.intersect(&previous, ty) {
                        Ok(merged) => Some(merged),
                        Err(mismatch) => {
                            result = Err(self.mismatch(mismatch, &previous, ty, span));
                            Some(previous)
                        }
                    },
                };
            }
            self.current_mut().return_type = returned;
        }

        trace!(target: "typeck::scope", arms = arms.len(), exhaustive, "merged branches");
        result
    }

    /// The type an outer binding has after every arm ran, or `outer` when
    /// the arm types have nothing in common.
    fn reconcile<'a>(&self, outer: &Type, mut arms: impl Iterator<Item = &'a Symbol>) -> Type {
        let Some(first) = arms.next() else {
            return outer.clone();
        };
        let mut merged = first.ty.clone();
        for arm in arms {
            if arm.unresolved {
                return outer.clone();
            }
            if arm.ty != merged {
                match self.classes.intersect(&merged, &arm.ty) {
                    Ok(ty) => merged = ty,
                    Err(_) => return outer.clone(),
                }
            }
        }
        if first.unresolved {
            outer.clone()
        } else {
            merged
        }
    }

    /// Opens a function body. Parameters are bound with `shadow`.
    pub fn enter_function(&mut self, declared: Option<Type>) {
        let symbols = self.current().symbols.clone();
        self.scopes.push(Scope {
            symbols,
            return_type: None,
            kind: ScopeKind::Function { declared },
        });
        trace!(target: "typeck::scope", depth = self.depth(), "entered function");
    }

    /// Closes a function body, returning the type returned on every path.
    pub fn exit_function(&mut self) -> Option<Type> {
        match self.scopes.pop() {
            Some(Scope {
                return_type,
                kind: ScopeKind::Function { .. },
                ..
            }) => return_type,
            _ => ICE!("left a function that was never entered"),
        }
    }

    /// The declared return type of the innermost function, `None` outside
    /// of any function.
    pub fn declared_return(&self) -> Option<Option<Type>> {
        self.scopes.iter().rev().find_map(|scope| match &scope.kind {
            ScopeKind::Function { declared } => Some(declared.clone()),
            _ => None,
        })
    }

    /// Accounts for a `return` of `value` on the current path.
    pub fn record_return(&mut self, value: Type, span: &Span) -> CheckResult<()> {
        let returned = match self.declared_return() {
            None => return Err(self.error(ErrorImpl::ReturnOutsideFunction, span)),
            Some(Some(declared)) => {
                self.expect_type(&value, &declared, span)?;
                declared
            }
            Some(None) => value,
        };

        let merged = match self.current().return_type.clone() {
            None => returned,
            Some(previous) => match self.classes.intersect(&previous, &returned) {
                Ok(merged) => merged,
                Err(mismatch) => return Err(self.mismatch(mismatch, &previous, &returned, span)),
            },
        };
        self.current_mut().return_type = Some(merged);
        Ok(())
    }

    /// Consumes the checker once the root scope is all that is left.
    pub fn finish(mut self) -> CheckedProgram {
        if self.scopes.len() != 1 {
            ICE!("{} scopes still open after checking", self.scopes.len() - 1);
        }
        let globals = match self.scopes.pop() {
            Some(scope) => scope.symbols,
            None => ICE!("scope stack is empty"),
        };

        CheckedProgram {
            classes: self.classes,
            builtins: self.builtins,
            functions: self.functions,
            globals,
            diagnostics: self.diagnostics,
        }
    }
}

/// Renders argument types as `(int, string)`.
pub fn format_types(types: &[Type]) -> String {
    let types: Vec<String> = types.iter().map(Type::to_string).collect();
    format!("({})", types.join(", "))
}

/// Expands spread arguments into one argument per element.
pub fn expand_arguments(types: Vec<Type>) -> Vec<Type> {
    let mut expanded = vec![];
    for ty in types {
        match ty {
            Type::Spread(elements) => expanded.extend(elements.iter().cloned()),
            other => expanded.push(other),
        }
    }
    expanded
}

/// Everything the checker hands on once a program has been walked: the
/// class table and hierarchy, the distinct function types, the top-level
/// bindings and every diagnostic. Resolved expression types stay on the
/// AST nodes.
#[derive(Debug)]
pub struct CheckedProgram {
    pub classes: ClassRegistry,
    pub builtins: Builtins,
    pub functions: Vec<FuncType>,
    pub globals: SymbolMap<Symbol>,
    pub diagnostics: Vec<Error>,
}

impl CheckedProgram {
    /// `true` when no error-severity diagnostic was reported.
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.iter().any(Error::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Error> {
        self.diagnostics.iter().filter(|error| error.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Error> {
        self.diagnostics.iter().filter(|error| !error.is_error())
    }

    /// Class name to class id, for every class of the program.
    pub fn class_table(&self) -> &SymbolMap<ClassId> {
        self.classes.names()
    }

    /// Classes in the order their hierarchy was computed.
    pub fn class_list(&self) -> &[ClassId] {
        self.classes.registered()
    }

    pub fn global(&self, name: &str) -> Option<&Symbol> {
        self.globals.get(name)
    }

    pub fn builtin(&self, kind: BuiltinKind) -> Type {
        self.builtins.object(kind)
    }
}

/// Checks a whole program in a fresh checker.
pub fn type_check(program: &mut Program, options: &CheckOptions) -> CheckedProgram {
    let mut checker = TypeChecker::new(*options);
    info!(target: "typeck", statements = program.body.len(), "type check started");

    let _ = program.get_type(&mut checker);

    let checked = checker.finish();
    info!(
        target: "typeck",
        classes = checked.class_list().len(),
        functions = checked.functions.len(),
        errors = checked.errors().count(),
        warnings = checked.warnings().count(),
        "type check finished"
    );
    checked
}
