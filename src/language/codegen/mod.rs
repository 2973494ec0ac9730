use crate::language::{
    ast::*,
    errors::CompileError,
    symbols::{Symbol, SymbolTable},
    typecheck::TypeMap,
    types::{ValueType, operator_word},
};
use std::env;

#[cfg(test)]
mod tests;

/// The flat body of the entry method plus the frame limits it needs.
#[derive(Clone, Debug)]
pub struct GeneratedMethod {
    pub instructions: Vec<String>,
    pub max_stack: usize,
    pub locals: usize,
}

impl GeneratedMethod {
    /// Assembler order: the two `.limit` lines precede every instruction.
    pub fn body_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.instructions.len() + 2);
        lines.push(format!(".limit locals {}", self.locals));
        lines.push(format!(".limit stack {}", self.max_stack));
        lines.extend(self.instructions.iter().cloned());
        lines
    }
}

/// Runs the code-generation pass over a tree that already passed type
/// checking. A missing annotation or symbol here is a pipeline bug and
/// surfaces as `CompileError::Internal`.
pub fn generate_program(
    program: &Program,
    types: TypeMap,
) -> Result<GeneratedMethod, CompileError> {
    let mut generator = Generator::new(types);
    generator.generate(program)
}

struct Generator {
    types: TypeMap,
    table: SymbolTable,
    code: Vec<String>,
    /// Next free storage slot; slot 0 holds the entry method's argument.
    store_index: usize,
    locals: usize,
    label_count: usize,
    stack: usize,
    max_stack: usize,
    trace: bool,
}

impl Generator {
    fn new(types: TypeMap) -> Self {
        Self {
            types,
            table: SymbolTable::new(),
            code: Vec::new(),
            store_index: 1,
            locals: 1,
            label_count: 0,
            stack: 0,
            max_stack: 0,
            trace: env::var_os("STILT_DEBUG_TRACE").is_some(),
        }
    }

    fn generate(&mut self, program: &Program) -> Result<GeneratedMethod, CompileError> {
        self.table.open_scope();
        for statement in &program.statements {
            self.emit_statement(statement)?;
        }
        self.table.close_scope();
        // Fold whatever the last statement left into the high-water mark.
        self.reset_stack();

        Ok(GeneratedMethod {
            instructions: std::mem::take(&mut self.code),
            max_stack: self.max_stack,
            locals: self.locals,
        })
    }

    fn push_line(&mut self, line: impl Into<String>) {
        self.code.push(line.into());
    }

    fn increase_stack(&mut self, width: usize) {
        self.stack += width;
    }

    // Statement boundary: fold the running depth into the high-water mark.
    fn reset_stack(&mut self) {
        if self.stack > self.max_stack {
            self.max_stack = self.stack;
        }
        self.stack = 0;
    }

    fn fresh_label(&mut self) -> usize {
        self.label_count += 1;
        self.label_count
    }

    fn emit_statement(&mut self, statement: &Statement) -> Result<(), CompileError> {
        if self.trace {
            let kind = match statement {
                Statement::Declare(_) => "declare",
                Statement::Print(_) => "print",
                Statement::If(_) => "if",
                Statement::While(_) => "while",
                Statement::For(_) => "for",
                Statement::Block(_) => "block",
            };
            eprintln!("[stilt-debug] stmt {kind}");
        }
        match statement {
            Statement::Declare(stmt) => self.emit_declare(stmt),
            Statement::Print(stmt) => self.emit_print(stmt),
            Statement::If(stmt) => self.emit_if(stmt),
            Statement::While(stmt) => self.emit_while(stmt),
            Statement::For(stmt) => self.emit_for(stmt),
            Statement::Block(block) => self.emit_block(block),
        }
    }

    /// The value is computed before the new symbol becomes visible, so
    /// `a = a + 1;` still reads the outer `a`.
    fn emit_declare(&mut self, stmt: &DeclareStmt) -> Result<(), CompileError> {
        let ty = self.types.expect(stmt.id, "variable declaration")?;

        self.emit_expr(&stmt.value)?;

        let address = self.store_index;
        self.store_index += ty.slot_width();
        self.locals += ty.slot_width();
        let mut symbol = Symbol::new(&stmt.name.name, ty);
        symbol.set_address(address);
        self.table.enter(&stmt.name.name, symbol);

        let mnemonic = self.mnemonic(ty)?;
        self.push_line(format!("{mnemonic}store {address}"));
        self.reset_stack();
        Ok(())
    }

    /// `for` update: the same type reuses the slot, a changed type re-types
    /// the symbol in place and abandons the old slot.
    fn emit_assign(&mut self, stmt: &AssignStmt) -> Result<(), CompileError> {
        let ty = self.types.expect(stmt.value.id(), "assignment value")?;

        // The value is computed against the symbol's old state, mirroring
        // the type checker's order, before any re-typing takes effect.
        self.emit_expr(&stmt.value)?;

        let current = self
            .table
            .retrieve(&stmt.name.name)
            .map(|symbol| symbol.ty())
            .ok_or_else(|| {
                CompileError::internal(format!(
                    "assignment to `{}` survived type checking without a symbol",
                    stmt.name.name
                ))
            })?;

        if current != ty {
            let new_address = self.store_index;
            self.store_index += ty.slot_width();
            self.locals += ty.slot_width();
            let symbol = self
                .table
                .retrieve_mut(&stmt.name.name)
                .ok_or_else(|| CompileError::internal("symbol vanished during assignment"))?;
            symbol.set_ty(ty);
            symbol.set_address(new_address);
        }

        let symbol = self
            .table
            .retrieve(&stmt.name.name)
            .ok_or_else(|| CompileError::internal("symbol vanished during assignment"))?;
        let address = symbol
            .address()
            .ok_or_else(|| CompileError::internal("assignment target has no storage slot"))?;
        let mnemonic = self.mnemonic(symbol.ty())?;

        self.push_line(format!("{mnemonic}store {address}"));
        self.reset_stack();
        Ok(())
    }

    fn emit_print(&mut self, stmt: &PrintStmt) -> Result<(), CompileError> {
        self.push_line("getstatic java/lang/System/out Ljava/io/PrintStream;");
        self.increase_stack(1);

        self.emit_expr(&stmt.expr)?;

        let ty = self.types.expect(stmt.expr.id(), "print operand")?;
        let descriptor = ty.descriptor().ok_or_else(|| {
            CompileError::internal(format!("print operand has non-value type {ty}"))
        })?;
        self.push_line(format!(
            "invokevirtual java/io/PrintStream/println({descriptor})V"
        ));
        self.reset_stack();
        Ok(())
    }

    // Branch to the then label on non-zero, fall through the else code.
    fn emit_if(&mut self, stmt: &IfStmt) -> Result<(), CompileError> {
        let label = self.fresh_label();

        self.emit_expr(&stmt.condition)?;
        self.push_line(format!("ifne then_if_{label}"));
        self.push_line(format!("else_if_{label}:"));
        if let Some(else_branch) = &stmt.else_branch {
            self.emit_statement(else_branch)?;
        }
        self.push_line(format!("goto end_if_{label}"));
        self.push_line(format!("then_if_{label}:"));
        self.emit_statement(&stmt.then_branch)?;
        self.push_line(format!("end_if_{label}:"));
        Ok(())
    }

    fn emit_while(&mut self, stmt: &WhileStmt) -> Result<(), CompileError> {
        let label = self.fresh_label();

        self.push_line(format!("before_w_{label}:"));
        self.emit_expr(&stmt.condition)?;
        self.push_line(format!("ifne then_w_{label}"));
        self.push_line(format!("goto end_w_{label}"));
        self.push_line(format!("then_w_{label}:"));
        self.emit_statement(&stmt.body)?;
        self.push_line(format!("goto before_w_{label}"));
        self.push_line(format!("end_w_{label}:"));
        Ok(())
    }

    // While skeleton with the update appended before looping back.
    fn emit_for(&mut self, stmt: &ForStmt) -> Result<(), CompileError> {
        let label = self.fresh_label();

        self.table.open_scope();
        self.emit_declare(&stmt.init)?;

        self.push_line(format!("before_f_{label}:"));
        self.emit_expr(&stmt.condition)?;
        self.push_line(format!("ifne then_f_{label}"));
        self.push_line(format!("goto end_f_{label}"));
        self.push_line(format!("then_f_{label}:"));
        self.emit_statement(&stmt.body)?;
        self.emit_assign(&stmt.update)?;
        self.push_line(format!("goto before_f_{label}"));
        self.push_line(format!("end_f_{label}:"));

        self.table.close_scope();
        Ok(())
    }

    fn emit_block(&mut self, block: &Block) -> Result<(), CompileError> {
        self.table.open_scope();
        let result = block
            .statements
            .iter()
            .try_for_each(|statement| self.emit_statement(statement));
        self.table.close_scope();
        result
    }

    fn emit_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Int(lit) => {
                self.push_line(format!("ldc {}", lit.value));
                self.increase_stack(1);
                Ok(())
            }
            Expr::Double(lit) => {
                self.push_line(format!("ldc2_w {}", format_double(lit.value)));
                self.increase_stack(2);
                Ok(())
            }
            Expr::Bool(lit) => {
                self.push_line(format!("iconst_{}", if lit.value { 1 } else { 0 }));
                self.increase_stack(1);
                Ok(())
            }
            Expr::Variable(var) => self.emit_variable(var),
            Expr::Paren(paren) => self.emit_expr(&paren.inner),
            Expr::Negate(negate) => {
                self.emit_expr(&negate.operand)?;
                let ty = self.types.expect(negate.id, "negation")?;
                let mnemonic = self.mnemonic(ty)?;
                self.push_line(format!("{mnemonic}neg"));
                Ok(())
            }
            Expr::Not(not) => {
                // (v + 1) mod 2 maps 0 to 1 and 1 to 0; kept arithmetic so
                // composed boolean expressions behave identically.
                self.emit_expr(&not.operand)?;
                self.push_line("iconst_1");
                self.push_line("iadd");
                self.push_line("iconst_2");
                self.push_line("irem");
                Ok(())
            }
            Expr::Binary(binary) => match binary.op.kind() {
                BinaryKind::Arithmetic => self.emit_arithmetic(binary),
                BinaryKind::Comparison => self.emit_comparison(binary),
                BinaryKind::Logical => self.emit_logical(binary),
            },
        }
    }

    fn emit_variable(&mut self, var: &VariableExpr) -> Result<(), CompileError> {
        let symbol = self.table.retrieve(&var.name).ok_or_else(|| {
            CompileError::internal(format!(
                "reference to `{}` survived type checking without a symbol",
                var.name
            ))
        })?;
        let ty = symbol.ty();
        let address = symbol
            .address()
            .ok_or_else(|| CompileError::internal(format!("`{}` has no storage slot", var.name)))?;

        // Refresh the annotation from the live symbol; after a re-typing
        // assignment this is what later statements must see.
        self.types.insert(var.id, ty);

        let mnemonic = self.mnemonic(ty)?;
        self.push_line(format!("{mnemonic}load {address}"));
        self.increase_stack(ty.slot_width());
        Ok(())
    }

    fn emit_arithmetic(&mut self, binary: &BinaryExpr) -> Result<(), CompileError> {
        let left_ty = self.types.expect(binary.left.id(), "left operand")?;
        let right_ty = self.types.expect(binary.right.id(), "right operand")?;

        // Same promotion rule as the type checker; the overwrite is
        // idempotent.
        let result = ValueType::result_type(left_ty, right_ty);
        self.types.insert(binary.id, result);

        let mnemonic = self.mnemonic(result)?;

        self.emit_expr(&binary.left)?;
        if left_ty != result {
            self.emit_widening(left_ty, result)?;
        }
        self.emit_expr(&binary.right)?;
        if right_ty != result {
            self.emit_widening(right_ty, result)?;
        }

        self.push_line(format!("{mnemonic}{}", operator_word(binary.op)));
        self.reset_stack();
        Ok(())
    }

    // Comparisons normalize to 0/1 so they compose in larger expressions.
    fn emit_comparison(&mut self, binary: &BinaryExpr) -> Result<(), CompileError> {
        let label = self.fresh_label();

        let left_ty = self.types.expect(binary.left.id(), "left operand")?;
        let right_ty = self.types.expect(binary.right.id(), "right operand")?;
        let common = ValueType::result_type(left_ty, right_ty);
        let word = operator_word(binary.op);

        self.emit_expr(&binary.left)?;
        if left_ty != common {
            self.emit_widening(left_ty, common)?;
        }
        self.emit_expr(&binary.right)?;
        if right_ty != common {
            self.emit_widening(right_ty, common)?;
        }

        // Doubles first collapse to an int-sized ordering value.
        if common == ValueType::Double {
            self.push_line("dcmpg");
            self.push_line("iconst_0");
        }

        self.push_line(format!("if_icmp{word} then_c_{label}"));
        self.push_line(format!("else_c_{label}:"));
        self.push_line("iconst_0");
        self.push_line(format!("goto end_c_{label}"));
        self.push_line(format!("then_c_{label}:"));
        self.push_line("iconst_1");
        self.push_line(format!("end_c_{label}:"));
        Ok(())
    }

    fn emit_logical(&mut self, binary: &BinaryExpr) -> Result<(), CompileError> {
        self.emit_expr(&binary.left)?;
        self.emit_expr(&binary.right)?;
        self.push_line(operator_word(binary.op));
        Ok(())
    }

    fn emit_widening(&mut self, from: ValueType, to: ValueType) -> Result<(), CompileError> {
        let from_mnemonic = self.mnemonic(from)?;
        let to_mnemonic = self.mnemonic(to)?;
        self.push_line(format!("{from_mnemonic}2{to_mnemonic}"));
        if to == ValueType::Double {
            self.increase_stack(1);
        }
        Ok(())
    }

    fn mnemonic(&self, ty: ValueType) -> Result<&'static str, CompileError> {
        ty.mnemonic()
            .ok_or_else(|| CompileError::internal(format!("no mnemonic for non-value type {ty}")))
    }
}

// The assembler must always see a decimal point, never a bare long.
fn format_double(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
