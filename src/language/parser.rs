use crate::language::{
    ast::*,
    errors::SyntaxError,
    span::Span,
    token::{Token, TokenKind},
};

/// Parses a token stream into a tree whose nodes carry the `NodeId`s the
/// passes key their annotation map by. On a statement-level error the
/// parser records it and resynchronizes at the next `;` or `}`.
pub fn parse(tokens: &[Token]) -> Result<Program, Vec<SyntaxError>> {
    let mut parser = AstParser::new(tokens);
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.errors)
    }
}

struct AstParser<'a> {
    tokens: &'a [Token],
    position: usize,
    last_span: Option<Span>,
    errors: Vec<SyntaxError>,
    next_id: u32,
}

impl<'a> AstParser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            last_span: None,
            errors: Vec::new(),
            next_id: 0,
        }
    }

    fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        let span = Span::new(
            0,
            self.tokens.last().map(|token| token.span.end).unwrap_or(0),
        );
        Program { statements, span }
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::LBrace) => Ok(Statement::Block(self.parse_block()?)),
            Some(TokenKind::Print) => Ok(Statement::Print(self.parse_print()?)),
            Some(TokenKind::If) => Ok(Statement::If(self.parse_if()?)),
            Some(TokenKind::While) => Ok(Statement::While(self.parse_while()?)),
            Some(TokenKind::For) => Ok(Statement::For(self.parse_for()?)),
            Some(TokenKind::Identifier(_)) => Ok(Statement::Declare(self.parse_declare()?)),
            Some(kind) => Err(self.error(
                format!("Unexpected {} at start of statement", kind.describe()),
                self.peek_span(),
            )),
            None => Err(self.error(
                "Unexpected end of input while reading statement",
                self.eof_span(),
            )),
        }
    }

    fn parse_block(&mut self) -> Result<Block, SyntaxError> {
        let start = self.peek_span();
        let id = self.node_id();
        self.consume(&TokenKind::LBrace, "Expected `{` to open a block")?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        self.consume(&TokenKind::RBrace, "Expected `}` to close the block")?;

        Ok(Block {
            id,
            statements,
            span: start.to(self.last_span()),
        })
    }

    /// `name = expr ;` — statement-level declaration (shadowing).
    fn parse_declare(&mut self) -> Result<DeclareStmt, SyntaxError> {
        let start = self.peek_span();
        let (id, name, value) = self.parse_assignment_parts()?;
        if let Err(err) = self.consume_with_help(
            &TokenKind::Semi,
            "Expected `;` after assignment",
            Some(format!("Try: {} = <expression>;", name.name)),
        ) {
            self.errors.push(err);
        }
        Ok(DeclareStmt {
            id,
            name,
            value,
            span: start.to(self.last_span()),
        })
    }

    /// `name = expr` without the trailing `;` — the update clause of `for`.
    fn parse_assignment(&mut self) -> Result<AssignStmt, SyntaxError> {
        let start = self.peek_span();
        let (id, name, value) = self.parse_assignment_parts()?;
        Ok(AssignStmt {
            id,
            name,
            value,
            span: start.to(self.last_span()),
        })
    }

    fn parse_assignment_parts(&mut self) -> Result<(NodeId, Identifier, Expr), SyntaxError> {
        let id = self.node_id();
        let name = self.expect_identifier("Expected a variable name")?;
        self.consume_with_help(
            &TokenKind::Eq,
            "Expected `=` after variable name",
            Some(format!("Try: {} = <expression>;", name.name)),
        )?;
        let value = self.parse_expression()?;
        Ok((id, name, value))
    }

    fn parse_print(&mut self) -> Result<PrintStmt, SyntaxError> {
        let start = self.peek_span();
        let id = self.node_id();
        self.consume(&TokenKind::Print, "Expected `print`")?;
        self.consume(&TokenKind::LParen, "Expected `(` after `print`")?;
        let expr = self.parse_expression()?;
        self.consume(&TokenKind::RParen, "Expected `)` after print expression")?;
        if let Err(err) = self.consume_with_help(
            &TokenKind::Semi,
            "Expected `;` after print statement",
            Some("Try: print(<expression>);".to_string()),
        ) {
            self.errors.push(err);
        }
        Ok(PrintStmt {
            id,
            expr,
            span: start.to(self.last_span()),
        })
    }

    fn parse_if(&mut self) -> Result<IfStmt, SyntaxError> {
        let start = self.peek_span();
        let id = self.node_id();
        self.consume(&TokenKind::If, "Expected `if`")?;
        self.consume(&TokenKind::LParen, "Expected `(` after `if`")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::RParen, "Expected `)` after if condition")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(IfStmt {
            id,
            condition,
            then_branch,
            else_branch,
            span: start.to(self.last_span()),
        })
    }

    fn parse_while(&mut self) -> Result<WhileStmt, SyntaxError> {
        let start = self.peek_span();
        let id = self.node_id();
        self.consume(&TokenKind::While, "Expected `while`")?;
        self.consume(&TokenKind::LParen, "Expected `(` after `while`")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::RParen, "Expected `)` after while condition")?;
        let body = Box::new(self.parse_statement()?);
        Ok(WhileStmt {
            id,
            condition,
            body,
            span: start.to(self.last_span()),
        })
    }

    /// `for ( init ; condition ; update ) statement`
    fn parse_for(&mut self) -> Result<ForStmt, SyntaxError> {
        let start = self.peek_span();
        let id = self.node_id();
        self.consume(&TokenKind::For, "Expected `for`")?;
        self.consume(&TokenKind::LParen, "Expected `(` after `for`")?;

        let init_start = self.peek_span();
        let (init_id, init_name, init_value) = self.parse_assignment_parts()?;
        let init = DeclareStmt {
            id: init_id,
            name: init_name,
            value: init_value,
            span: init_start.to(self.last_span()),
        };
        self.consume(&TokenKind::Semi, "Expected `;` after for initializer")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::Semi, "Expected `;` after for condition")?;
        let update = self.parse_assignment()?;
        self.consume(&TokenKind::RParen, "Expected `)` after for update")?;
        let body = Box::new(self.parse_statement()?);

        Ok(ForStmt {
            id,
            init,
            condition,
            update,
            body,
            span: start.to(self.last_span()),
        })
    }

    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::AmpersandAmpersand) => BinaryOp::And,
                Some(TokenKind::PipePipe) => BinaryOp::Or,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            expr = self.binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::EqEq) => BinaryOp::Eq,
                Some(TokenKind::BangEq) => BinaryOp::NotEq,
                Some(TokenKind::Lt) => BinaryOp::Lt,
                Some(TokenKind::LtEq) => BinaryOp::LtEq,
                Some(TokenKind::Gt) => BinaryOp::Gt,
                Some(TokenKind::GtEq) => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            expr = self.binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            expr = self.binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            expr = self.binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Minus) => {
                let start = self.peek_span();
                let id = self.node_id();
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.to(operand.span());
                Ok(Expr::Negate(NegateExpr {
                    id,
                    operand: Box::new(operand),
                    span,
                }))
            }
            Some(TokenKind::Bang) => {
                let start = self.peek_span();
                let id = self.node_id();
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.to(operand.span());
                Ok(Expr::Not(NotExpr {
                    id,
                    operand: Box::new(operand),
                    span,
                }))
            }
            _ => self.parse_primary(),
        }
    }

    /// The offending token is left in place on error, so `synchronize` can
    /// still see it as a statement boundary.
    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let token = match self.tokens.get(self.position) {
            Some(token) => token.clone(),
            None => {
                return Err(self.error(
                    "Unexpected end of input while reading expression",
                    self.eof_span(),
                ));
            }
        };
        match token.kind {
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::Int(IntLit {
                    id: self.node_id(),
                    value,
                    span: token.span,
                }))
            }
            TokenKind::Double(value) => {
                self.advance();
                Ok(Expr::Double(DoubleLit {
                    id: self.node_id(),
                    value,
                    span: token.span,
                }))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(BoolLit {
                    id: self.node_id(),
                    value: true,
                    span: token.span,
                }))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(BoolLit {
                    id: self.node_id(),
                    value: false,
                    span: token.span,
                }))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Variable(VariableExpr {
                    id: self.node_id(),
                    name,
                    span: token.span,
                }))
            }
            TokenKind::LParen => {
                self.advance();
                let id = self.node_id();
                let inner = self.parse_expression()?;
                self.consume(&TokenKind::RParen, "Expected `)` after expression")?;
                Ok(Expr::Paren(ParenExpr {
                    id,
                    inner: Box::new(inner),
                    span: token.span.to(self.last_span()),
                }))
            }
            kind => Err(self.error(
                format!("Unexpected {} in expression", kind.describe()),
                token.span,
            )),
        }
    }

    fn binary(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let span = left.span().to(right.span());
        Expr::Binary(BinaryExpr {
            id: self.node_id(),
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        })
    }

    fn consume(&mut self, expected: &TokenKind, message: &str) -> Result<(), SyntaxError> {
        self.consume_with_help(expected, message, None)
    }

    fn consume_with_help(
        &mut self,
        expected: &TokenKind,
        message: &str,
        help: Option<String>,
    ) -> Result<(), SyntaxError> {
        match self.tokens.get(self.position) {
            Some(token) if &token.kind == expected => {
                self.advance();
                Ok(())
            }
            Some(token) => {
                let err = self.error(
                    format!("{message}: found {}", token.kind.describe()),
                    token.span,
                );
                Err(match help {
                    Some(help) => err.with_help(help),
                    None => err,
                })
            }
            None => {
                let err = self.error(format!("{message}: reached end of input"), self.eof_span());
                Err(match help {
                    Some(help) => err.with_help(help),
                    None => err,
                })
            }
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Result<Identifier, SyntaxError> {
        match self.advance() {
            Some(token) => match &token.kind {
                TokenKind::Identifier(name) => Ok(Identifier {
                    name: name.clone(),
                    span: token.span,
                }),
                kind => Err(SyntaxError::new(
                    format!("{message}: found {}", kind.describe()),
                    token.span,
                )),
            },
            None => Err(self.error(format!("{message}: reached end of input"), self.eof_span())),
        }
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.position).map(|token| &token.kind)
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.position)
            .map(|token| token.span)
            .unwrap_or_else(|| self.eof_span())
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.position);
        if let Some(token) = token {
            self.position += 1;
            self.last_span = Some(token.span);
        }
        token
    }

    fn check(&self, expected: &TokenKind) -> bool {
        matches!(self.peek_kind(), Some(kind) if kind == expected)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn last_span(&self) -> Span {
        self.last_span.unwrap_or_else(|| self.eof_span())
    }

    fn eof_span(&self) -> Span {
        let end = self
            .last_span
            .map(|span| span.end)
            .or_else(|| self.tokens.last().map(|token| token.span.end))
            .unwrap_or(0);
        Span::new(end, end)
    }

    fn error(&self, message: impl Into<String>, span: Span) -> SyntaxError {
        SyntaxError::new(message, span)
    }

    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if matches!(self.peek_kind(), Some(TokenKind::Semi)) {
                self.advance();
                break;
            }
            if matches!(self.peek_kind(), Some(TokenKind::RBrace)) {
                break;
            }
            self.advance();
        }
    }
}
