use crate::language::{
    ast::*,
    errors::CompileError,
    symbols::{Symbol, SymbolTable},
    types::ValueType,
};
use std::collections::HashMap;

/// Out-of-band annotation map: node identity to inferred type. The code
/// generator re-derives binary results with the same promotion rule, so its
/// overwrites are idempotent.
#[derive(Debug, Default)]
pub struct TypeMap {
    types: HashMap<NodeId, ValueType>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, ty: ValueType) {
        self.types.insert(id, ty);
    }

    pub fn get(&self, id: NodeId) -> Option<ValueType> {
        self.types.get(&id).copied()
    }

    /// Lookup that must succeed after a completed type-checking pass; a
    /// miss means the pipeline itself is broken.
    pub fn expect(&self, id: NodeId, what: &str) -> Result<ValueType, CompileError> {
        self.get(id)
            .ok_or_else(|| CompileError::internal(format!("no type annotation for {what}")))
    }
}

/// Runs the type-checking pass: depth-first in source order, stopping at
/// the first error. Its only product is the annotation map.
pub fn check_program(program: &Program) -> Result<TypeMap, CompileError> {
    let mut checker = Checker {
        table: SymbolTable::new(),
        types: TypeMap::new(),
    };
    checker.check_program(program)?;
    Ok(checker.types)
}

struct Checker {
    table: SymbolTable,
    types: TypeMap,
}

impl Checker {
    fn check_program(&mut self, program: &Program) -> Result<(), CompileError> {
        self.table.open_scope();
        for statement in &program.statements {
            self.check_statement(statement)?;
        }
        self.table.close_scope();
        Ok(())
    }

    fn check_statement(&mut self, statement: &Statement) -> Result<(), CompileError> {
        match statement {
            Statement::Declare(stmt) => self.check_declare(stmt),
            Statement::Print(stmt) => self.check_print(stmt),
            Statement::If(stmt) => self.check_if(stmt),
            Statement::While(stmt) => self.check_while(stmt),
            Statement::For(stmt) => self.check_for(stmt),
            Statement::Block(block) => self.check_block(block),
        }
    }

    // Re-declaring a name shadows, it never errors.
    fn check_declare(&mut self, stmt: &DeclareStmt) -> Result<(), CompileError> {
        let ty = self.check_expr(&stmt.value)?;
        self.table
            .enter(&stmt.name.name, Symbol::new(&stmt.name.name, ty));
        self.types.insert(stmt.id, ty);
        Ok(())
    }

    /// `for`-update path: the symbol is re-typed in place when the assigned
    /// type differs; the code generator reallocates its slot.
    fn check_assign(&mut self, stmt: &AssignStmt) -> Result<(), CompileError> {
        let ty = self.check_expr(&stmt.value)?;
        let symbol = self
            .table
            .retrieve_mut(&stmt.name.name)
            .ok_or_else(|| CompileError::undefined(stmt.name.span, &stmt.name.name))?;
        symbol.set_ty(ty);
        self.types.insert(stmt.id, ty);
        Ok(())
    }

    fn check_print(&mut self, stmt: &PrintStmt) -> Result<(), CompileError> {
        self.check_expr(&stmt.expr)?;
        self.types.insert(stmt.id, ValueType::Method);
        Ok(())
    }

    fn check_if(&mut self, stmt: &IfStmt) -> Result<(), CompileError> {
        let condition = self.check_expr(&stmt.condition)?;
        if condition != ValueType::Boolean {
            return Err(CompileError::type_error(
                stmt.condition.span(),
                format!("if condition must evaluate to a boolean value, found {condition}"),
            ));
        }
        self.check_statement(&stmt.then_branch)?;
        if let Some(else_branch) = &stmt.else_branch {
            self.check_statement(else_branch)?;
        }
        self.types.insert(stmt.id, ValueType::Statement);
        Ok(())
    }

    fn check_while(&mut self, stmt: &WhileStmt) -> Result<(), CompileError> {
        let condition = self.check_expr(&stmt.condition)?;
        if condition != ValueType::Boolean {
            return Err(CompileError::type_error(
                stmt.condition.span(),
                format!("while condition must evaluate to a boolean value, found {condition}"),
            ));
        }
        self.check_statement(&stmt.body)?;
        self.types.insert(stmt.id, ValueType::Statement);
        Ok(())
    }

    // The loop variable lives in the loop's own scope.
    fn check_for(&mut self, stmt: &ForStmt) -> Result<(), CompileError> {
        self.table.open_scope();
        self.check_declare(&stmt.init)?;
        let condition = self.check_expr(&stmt.condition)?;
        if condition != ValueType::Boolean {
            self.table.close_scope();
            return Err(CompileError::type_error(
                stmt.condition.span(),
                format!("for condition must evaluate to a boolean value, found {condition}"),
            ));
        }
        let result = self
            .check_statement(&stmt.body)
            .and_then(|_| self.check_assign(&stmt.update));
        self.table.close_scope();
        result?;
        self.types.insert(stmt.id, ValueType::Statement);
        Ok(())
    }

    fn check_block(&mut self, block: &Block) -> Result<(), CompileError> {
        self.table.open_scope();
        let result = block
            .statements
            .iter()
            .try_for_each(|statement| self.check_statement(statement));
        self.table.close_scope();
        result?;
        self.types.insert(block.id, ValueType::Statement);
        Ok(())
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<ValueType, CompileError> {
        match expr {
            Expr::Int(lit) => {
                self.types.insert(lit.id, ValueType::Int);
                Ok(ValueType::Int)
            }
            Expr::Double(lit) => {
                self.types.insert(lit.id, ValueType::Double);
                Ok(ValueType::Double)
            }
            Expr::Bool(lit) => {
                self.types.insert(lit.id, ValueType::Boolean);
                Ok(ValueType::Boolean)
            }
            Expr::Variable(var) => {
                let symbol = self
                    .table
                    .retrieve(&var.name)
                    .ok_or_else(|| CompileError::undefined(var.span, &var.name))?;
                let ty = symbol.ty();
                self.types.insert(var.id, ty);
                Ok(ty)
            }
            Expr::Paren(paren) => {
                let ty = self.check_expr(&paren.inner)?;
                self.types.insert(paren.id, ty);
                Ok(ty)
            }
            Expr::Negate(negate) => {
                let ty = self.check_expr(&negate.operand)?;
                self.types.insert(negate.id, ty);
                Ok(ty)
            }
            Expr::Not(not) => {
                let ty = self.check_expr(&not.operand)?;
                if ty != ValueType::Boolean {
                    return Err(CompileError::type_error(
                        not.operand.span(),
                        format!("`!` can only be applied to boolean values, found {ty}"),
                    ));
                }
                self.types.insert(not.id, ValueType::Boolean);
                Ok(ValueType::Boolean)
            }
            Expr::Binary(binary) => self.check_binary(binary),
        }
    }

    fn check_binary(&mut self, binary: &BinaryExpr) -> Result<ValueType, CompileError> {
        let left = self.check_expr(&binary.left)?;
        let right = self.check_expr(&binary.right)?;

        if !ValueType::are_compatible(left, right) {
            return Err(CompileError::type_error(
                binary.span,
                format!(
                    "incompatible operand types for `{}`: {left} and {right}",
                    binary.op.symbol()
                ),
            ));
        }

        // Operands keep their own (possibly distinct) types; only the
        // expression node carries the combined result.
        self.types.insert(binary.left.id(), left);
        self.types.insert(binary.right.id(), right);

        let result = match binary.op.kind() {
            BinaryKind::Arithmetic => ValueType::result_type(left, right),
            BinaryKind::Comparison | BinaryKind::Logical => ValueType::Boolean,
        };
        self.types.insert(binary.id, result);
        Ok(result)
    }
}
