//! Recursive-descent parser, single-token lookahead, per the EBNF grammar
//! in spec.md §4.2.

use crate::ast::*;
use tacc_lex::{Lexer, Token, TokenKind};
use tacc_util::{ParserError, Symbol};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type PResult<T> = Result<T, ParserError>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Lex and parse `source` in one step.
    pub fn parse_source(source: &str) -> PResult<Program> {
        let tokens =
            Lexer::tokenize(source).map_err(|e| ParserError::new(e.line, e.message))?;
        Parser::new(tokens).parse_program()
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn line(&self) -> u32 {
        self.current().line
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(ParserError::new(
                self.line(),
                format!("se esperaba {what}, se encontró {:?}", self.current_kind()),
            ))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<Symbol> {
        match self.current_kind().clone() {
            TokenKind::Ident(sym) => {
                self.advance();
                Ok(sym)
            }
            other => Err(ParserError::new(
                self.line(),
                format!("se esperaba {what}, se encontró {other:?}"),
            )),
        }
    }

    // program := { statement } EOF
    pub fn parse_program(&mut self) -> PResult<Program> {
        let mut statements = Vec::new();
        while !self.check(&TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    // statement := simple_stmt NL | compound_stmt
    fn parse_statement(&mut self) -> PResult<Stmt> {
        match self.current_kind() {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Def => self.parse_def(),
            TokenKind::Try => self.parse_try(),
            _ => {
                let stmt = self.parse_simple_stmt()?;
                self.expect(TokenKind::Newline, "fin de línea")?;
                Ok(stmt)
            }
        }
    }

    fn parse_simple_stmt(&mut self) -> PResult<Stmt> {
        let line = self.line();
        match self.current_kind() {
            TokenKind::Print => self.parse_print(line),
            TokenKind::Return => self.parse_return(line),
            TokenKind::Del => self.parse_del(line),
            TokenKind::Break => {
                self.advance();
                Ok(Stmt::Break { line })
            }
            TokenKind::Continue => {
                self.advance();
                Ok(Stmt::Continue { line })
            }
            TokenKind::Global => self.parse_global(line),
            _ => self.parse_assignment_or_expr_stmt(line),
        }
    }

    fn parse_print(&mut self, line: u32) -> PResult<Stmt> {
        self.advance(); // 'print'
        self.expect(TokenKind::LParen, "'('")?;
        let expr = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(Stmt::Print { expr, line })
    }

    fn parse_return(&mut self, line: u32) -> PResult<Stmt> {
        self.advance(); // 'return'
        if self.check(&TokenKind::Newline) {
            Ok(Stmt::Return { expr: None, line })
        } else {
            Ok(Stmt::Return {
                expr: Some(self.parse_expression()?),
                line,
            })
        }
    }

    fn parse_del(&mut self, line: u32) -> PResult<Stmt> {
        self.advance(); // 'del'
        let target = self.parse_expression()?;
        Ok(Stmt::Del { target, line })
    }

    fn parse_global(&mut self, line: u32) -> PResult<Stmt> {
        self.advance(); // 'global'
        let mut names = vec![self.expect_ident("un identificador")?];
        while self.matches(&TokenKind::Comma) {
            names.push(self.expect_ident("un identificador")?);
        }
        Ok(Stmt::Global { names, line })
    }

    // assignment := target '=' expression ; expr_stmt := expression
    //
    // Both start by parsing a full expression; `target` is a strict subset
    // of `expression` (IDENT or a chain of index operations), so a single
    // parse followed by a shape check resolves the ambiguity without
    // backtracking.
    fn parse_assignment_or_expr_stmt(&mut self, line: u32) -> PResult<Stmt> {
        let expr = self.parse_expression()?;
        if self.matches(&TokenKind::Assign) {
            let value = self.parse_expression()?;
            return self.assignment_from_target(expr, value, line);
        }
        Ok(Stmt::Expr { expr, line })
    }

    fn assignment_from_target(&self, target: Expr, value: Expr, line: u32) -> PResult<Stmt> {
        match target.kind {
            ExprKind::Identifier(name) => Ok(Stmt::Assignment {
                name,
                expr: value,
                line,
            }),
            ExprKind::Index { target, index } => Ok(Stmt::IndexAssignment {
                target: *target,
                index: *index,
                value,
                line,
            }),
            _ => Err(ParserError::new(
                line,
                "el lado izquierdo de la asignación no es un destino válido".to_string(),
            )),
        }
    }

    // block := NL INDENT { statement } DEDENT
    fn parse_block(&mut self) -> PResult<Block> {
        self.expect(TokenKind::Newline, "fin de línea")?;
        self.expect(TokenKind::Indent, "un bloque indentado")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::Dedent) {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::Dedent, "fin del bloque")?;
        Ok(Block { statements })
    }

    // if_stmt := 'if' expr ':' block { 'elif' expr ':' block } [ 'else' ':' block ]
    fn parse_if(&mut self) -> PResult<Stmt> {
        let line = self.line();
        self.advance(); // 'if'
        let cond = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let then_block = self.parse_block()?;

        let mut elifs = Vec::new();
        while self.check(&TokenKind::Elif) {
            self.advance();
            let elif_cond = self.parse_expression()?;
            self.expect(TokenKind::Colon, "':'")?;
            let elif_block = self.parse_block()?;
            elifs.push((elif_cond, elif_block));
        }

        let else_block = if self.matches(&TokenKind::Else) {
            self.expect(TokenKind::Colon, "':'")?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then_block,
            elifs,
            else_block,
            line,
        })
    }

    // while_stmt := 'while' expr ':' block
    fn parse_while(&mut self) -> PResult<Stmt> {
        let line = self.line();
        self.advance(); // 'while'
        let cond = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let block = self.parse_block()?;
        Ok(Stmt::While { cond, block, line })
    }

    // for_stmt := 'for' IDENT 'in' expr ':' block
    fn parse_for(&mut self) -> PResult<Stmt> {
        let line = self.line();
        self.advance(); // 'for'
        let name = self.expect_ident("un identificador")?;
        self.expect(TokenKind::In, "'in'")?;
        let iterable = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let block = self.parse_block()?;
        Ok(Stmt::For {
            name,
            iterable,
            block,
            line,
        })
    }

    // def_stmt := 'def' IDENT '(' [ params ] ')' ':' block
    fn parse_def(&mut self) -> PResult<Stmt> {
        let line = self.line();
        self.advance(); // 'def'
        let name = self.expect_ident("el nombre de la función")?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            params.push(self.expect_ident("un parámetro")?);
            while self.matches(&TokenKind::Comma) {
                params.push(self.expect_ident("un parámetro")?);
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Colon, "':'")?;
        let body = self.parse_block()?;
        Ok(Stmt::Function {
            name,
            params,
            body,
            line,
        })
    }

    // try_stmt := 'try' ':' block { 'except' [ IDENT ] ':' block }
    fn parse_try(&mut self) -> PResult<Stmt> {
        let line = self.line();
        self.advance(); // 'try'
        self.expect(TokenKind::Colon, "':'")?;
        let try_block = self.parse_block()?;

        let mut excepts = Vec::new();
        while self.check(&TokenKind::Except) {
            self.advance();
            let exc_name = if let TokenKind::Ident(sym) = self.current_kind() {
                let sym = *sym;
                self.advance();
                Some(sym)
            } else {
                None
            };
            self.expect(TokenKind::Colon, "':'")?;
            let except_block = self.parse_block()?;
            excepts.push((exc_name, except_block));
        }

        Ok(Stmt::Try {
            try_block,
            excepts,
            line,
        })
    }

    // expression := comparison
    fn parse_expression(&mut self) -> PResult<Expr> {
        self.parse_comparison()
    }

    // comparison := addsub { (==|!=|<|>|<=|>=) addsub }
    fn parse_comparison(&mut self) -> PResult<Expr> {
        let mut left = self.parse_addsub()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Eq => BinOp::Eq,
                TokenKind::Ne => BinOp::Ne,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            let line = self.line();
            self.advance();
            let right = self.parse_addsub()?;
            left = Expr {
                kind: ExprKind::BinaryOp {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                line,
            };
        }
        Ok(left)
    }

    // addsub := muldiv { (+|-) muldiv }
    fn parse_addsub(&mut self) -> PResult<Expr> {
        let mut left = self.parse_muldiv()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let line = self.line();
            self.advance();
            let right = self.parse_muldiv()?;
            left = Expr {
                kind: ExprKind::BinaryOp {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                line,
            };
        }
        Ok(left)
    }

    // muldiv := unary { (*|/|%) unary }
    fn parse_muldiv(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let line = self.line();
            self.advance();
            let right = self.parse_unary()?;
            left = Expr {
                kind: ExprKind::BinaryOp {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                line,
            };
        }
        Ok(left)
    }

    // unary := '-' unary | postfix
    fn parse_unary(&mut self) -> PResult<Expr> {
        if self.check(&TokenKind::Minus) {
            let line = self.line();
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr {
                kind: ExprKind::UnaryOp {
                    op: UnOp::Neg,
                    operand: Box::new(operand),
                },
                line,
            });
        }
        self.parse_postfix()
    }

    // postfix := atom { '[' expr ']' | '.' IDENT | '(' [args] ')' }
    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.current_kind() {
                TokenKind::LBracket => {
                    let line = self.line();
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr {
                        kind: ExprKind::Index {
                            target: Box::new(expr),
                            index: Box::new(index),
                        },
                        line,
                    };
                }
                TokenKind::Dot => {
                    let line = self.line();
                    self.advance();
                    let method = self.expect_ident("un nombre de método")?;
                    let base = match expr.kind {
                        ExprKind::Identifier(name) => name,
                        _ => {
                            return Err(ParserError::new(
                                line,
                                "solo se admite 'nombre.método(...)' en llamadas".to_string(),
                            ))
                        }
                    };
                    self.expect(TokenKind::LParen, "'('")?;
                    let args = self.parse_args()?;
                    self.expect(TokenKind::RParen, "')'")?;
                    expr = Expr {
                        kind: ExprKind::Call {
                            callee: Callee::Dotted(base, method),
                            args,
                        },
                        line,
                    };
                }
                TokenKind::LParen => {
                    let line = self.line();
                    let name = match expr.kind {
                        ExprKind::Identifier(name) => name,
                        _ => {
                            return Err(ParserError::new(
                                line,
                                "solo se puede llamar a un nombre".to_string(),
                            ))
                        }
                    };
                    self.advance();
                    let args = self.parse_args()?;
                    self.expect(TokenKind::RParen, "')'")?;
                    expr = Expr {
                        kind: ExprKind::Call {
                            callee: Callee::Name(name),
                            args,
                        },
                        line,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            args.push(self.parse_expression()?);
            while self.matches(&TokenKind::Comma) {
                args.push(self.parse_expression()?);
            }
        }
        Ok(args)
    }

    // atom := NUMBER | STRING | IDENT | 'True' | 'False'
    //       | '[' [ expr {',' expr} ] ']'
    //       | '{' [ expr ':' expr {',' expr ':' expr} ] '}'
    //       | '(' expression ')'
    fn parse_atom(&mut self) -> PResult<Expr> {
        let line = self.line();
        match self.current_kind().clone() {
            TokenKind::Int(v) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Int(v),
                    line,
                })
            }
            TokenKind::Float(v) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Float(v),
                    line,
                })
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Str(s),
                    line,
                })
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(true),
                    line,
                })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(false),
                    line,
                })
            }
            TokenKind::Ident(sym) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Identifier(sym),
                    line,
                })
            }
            // `len` and `range` are keywords lexically but act as ordinary
            // call targets in this grammar (spec.md §4.4 lowers them
            // specially in the generator, not the parser).
            TokenKind::Len => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Identifier(Symbol::intern("len")),
                    line,
                })
            }
            TokenKind::Range => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Identifier(Symbol::intern("range")),
                    line,
                })
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    elements.push(self.parse_expression()?);
                    while self.matches(&TokenKind::Comma) {
                        elements.push(self.parse_expression()?);
                    }
                }
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(Expr {
                    kind: ExprKind::List(elements),
                    line,
                })
            }
            TokenKind::LBrace => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(&TokenKind::RBrace) {
                    items.push(self.parse_dict_item()?);
                    while self.matches(&TokenKind::Comma) {
                        items.push(self.parse_dict_item()?);
                    }
                }
                self.expect(TokenKind::RBrace, "'}'")?;
                Ok(Expr {
                    kind: ExprKind::Dict(items),
                    line,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            other => Err(ParserError::new(
                line,
                format!("token inesperado en una expresión: {other:?}"),
            )),
        }
    }

    fn parse_dict_item(&mut self) -> PResult<(Expr, Expr)> {
        let key = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'")?;
        let value = self.parse_expression()?;
        Ok((key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Program {
        Parser::parse_source(src).unwrap()
    }

    #[test]
    fn simple_assignment() {
        let prog = parse("x = 1 + 2\n");
        assert_eq!(prog.statements.len(), 1);
        match &prog.statements[0] {
            Stmt::Assignment { name, .. } => assert_eq!(name.as_str(), "x"),
            other => panic!("expected Assignment, got {other:?}"),
        }
    }

    #[test]
    fn index_assignment_to_list_element() {
        let prog = parse("lista[1] = 7\n");
        match &prog.statements[0] {
            Stmt::IndexAssignment { target, .. } => {
                assert!(matches!(target.kind, ExprKind::Identifier(_)));
            }
            other => panic!("expected IndexAssignment, got {other:?}"),
        }
    }

    #[test]
    fn nested_index_assignment_keeps_target_as_index_expr() {
        let prog = parse("m[0][1] = 9\n");
        match &prog.statements[0] {
            Stmt::IndexAssignment { target, .. } => {
                assert!(matches!(target.kind, ExprKind::Index { .. }));
            }
            other => panic!("expected IndexAssignment, got {other:?}"),
        }
    }

    #[test]
    fn if_elif_else_chain() {
        let prog = parse("if x:\n    print(1)\nelif y:\n    print(2)\nelse:\n    print(3)\n");
        match &prog.statements[0] {
            Stmt::If {
                elifs, else_block, ..
            } => {
                assert_eq!(elifs.len(), 1);
                assert!(else_block.is_some());
            }
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn dotted_call_is_a_method_call() {
        let prog = parse("lista.append(5)\n");
        match &prog.statements[0] {
            Stmt::Expr { expr, .. } => match &expr.kind {
                ExprKind::Call { callee, args } => {
                    assert!(matches!(callee, Callee::Dotted(_, _)));
                    assert_eq!(args.len(), 1);
                }
                other => panic!("expected Call, got {other:?}"),
            },
            other => panic!("expected Expr, got {other:?}"),
        }
    }

    #[test]
    fn function_definition_with_params() {
        let prog = parse("def factorial(n):\n    return n\n");
        match &prog.statements[0] {
            Stmt::Function { name, params, .. } => {
                assert_eq!(name.as_str(), "factorial");
                assert_eq!(params.len(), 1);
            }
            other => panic!("expected Function, got {other:?}"),
        }
    }

    #[test]
    fn comparison_has_lower_precedence_than_addsub() {
        let prog = parse("x = 1 + 2 == 3\n");
        match &prog.statements[0] {
            Stmt::Assignment { expr, .. } => match &expr.kind {
                ExprKind::BinaryOp { op: BinOp::Eq, .. } => {}
                other => panic!("expected top-level Eq, got {other:?}"),
            },
            other => panic!("expected Assignment, got {other:?}"),
        }
    }

    #[test]
    fn unary_minus_binds_tighter_than_muldiv_does_not_confuse_binop_minus() {
        let prog = parse("x = -1 * 2\n");
        match &prog.statements[0] {
            Stmt::Assignment { expr, .. } => match &expr.kind {
                ExprKind::BinaryOp { op: BinOp::Mul, left, .. } => {
                    assert!(matches!(left.kind, ExprKind::UnaryOp { .. }));
                }
                other => panic!("expected top-level Mul, got {other:?}"),
            },
            other => panic!("expected Assignment, got {other:?}"),
        }
    }

    #[test]
    fn dict_and_list_literals_parse() {
        let prog = parse("x = {\"a\": 1, \"b\": 2}\n");
        match &prog.statements[0] {
            Stmt::Assignment { expr, .. } => match &expr.kind {
                ExprKind::Dict(items) => assert_eq!(items.len(), 2),
                other => panic!("expected Dict, got {other:?}"),
            },
            other => panic!("expected Assignment, got {other:?}"),
        }
    }

    #[test]
    fn for_range_form_parses_as_call() {
        let prog = parse("for i in range(10):\n    print(i)\n");
        match &prog.statements[0] {
            Stmt::For { iterable, .. } => {
                assert!(matches!(iterable.kind, ExprKind::Call { .. }));
            }
            other => panic!("expected For, got {other:?}"),
        }
    }

    #[test]
    fn invalid_assignment_target_is_a_parser_error() {
        let err = Parser::parse_source("f() = 1\n").unwrap_err();
        assert_eq!(err.line, 1);
    }
}
