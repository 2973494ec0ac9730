use crate::language::span::Span;

/// Identity of a syntax-tree node, assigned once at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Clone, Debug)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Statement {
    Declare(DeclareStmt),
    Print(PrintStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Block(Block),
}

impl Statement {
    pub fn id(&self) -> NodeId {
        match self {
            Statement::Declare(stmt) => stmt.id,
            Statement::Print(stmt) => stmt.id,
            Statement::If(stmt) => stmt.id,
            Statement::While(stmt) => stmt.id,
            Statement::For(stmt) => stmt.id,
            Statement::Block(block) => block.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Statement::Declare(stmt) => stmt.span,
            Statement::Print(stmt) => stmt.span,
            Statement::If(stmt) => stmt.span,
            Statement::While(stmt) => stmt.span,
            Statement::For(stmt) => stmt.span,
            Statement::Block(block) => block.span,
        }
    }
}

/// `name = expr;` — always introduces a (possibly shadowing) definition.
#[derive(Clone, Debug)]
pub struct DeclareStmt {
    pub id: NodeId,
    pub name: Identifier,
    pub value: Expr,
    pub span: Span,
}

/// Assignment through an existing definition; only the `for` update clause.
#[derive(Clone, Debug)]
pub struct AssignStmt {
    pub id: NodeId,
    pub name: Identifier,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct PrintStmt {
    pub id: NodeId,
    pub expr: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct IfStmt {
    pub id: NodeId,
    pub condition: Expr,
    pub then_branch: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct WhileStmt {
    pub id: NodeId,
    pub condition: Expr,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ForStmt {
    pub id: NodeId,
    pub init: DeclareStmt,
    pub condition: Expr,
    pub update: AssignStmt,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Block {
    pub id: NodeId,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Int(IntLit),
    Double(DoubleLit),
    Bool(BoolLit),
    Variable(VariableExpr),
    Paren(ParenExpr),
    Negate(NegateExpr),
    Not(NotExpr),
    Binary(BinaryExpr),
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Int(lit) => lit.id,
            Expr::Double(lit) => lit.id,
            Expr::Bool(lit) => lit.id,
            Expr::Variable(var) => var.id,
            Expr::Paren(paren) => paren.id,
            Expr::Negate(negate) => negate.id,
            Expr::Not(not) => not.id,
            Expr::Binary(binary) => binary.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Int(lit) => lit.span,
            Expr::Double(lit) => lit.span,
            Expr::Bool(lit) => lit.span,
            Expr::Variable(var) => var.span,
            Expr::Paren(paren) => paren.span,
            Expr::Negate(negate) => negate.span,
            Expr::Not(not) => not.span,
            Expr::Binary(binary) => binary.span,
        }
    }
}

#[derive(Clone, Debug)]
pub struct IntLit {
    pub id: NodeId,
    pub value: i64,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct DoubleLit {
    pub id: NodeId,
    pub value: f64,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct BoolLit {
    pub id: NodeId,
    pub value: bool,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct VariableExpr {
    pub id: NodeId,
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ParenExpr {
    pub id: NodeId,
    pub inner: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct NegateExpr {
    pub id: NodeId,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct NotExpr {
    pub id: NodeId,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct BinaryExpr {
    pub id: NodeId,
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryKind {
    Arithmetic,
    Comparison,
    Logical,
}

impl BinaryOp {
    pub fn kind(self) -> BinaryKind {
        match self {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                BinaryKind::Arithmetic
            }
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => BinaryKind::Comparison,
            BinaryOp::And | BinaryOp::Or => BinaryKind::Logical,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}
