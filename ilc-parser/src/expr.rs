//! Pratt expression parsing.
//!
//! `infix_precedence` is the precedence column of the `ParseRule rules[]`
//! table from the grammar this language's operators were modelled on;
//! `parse_precedence` is the climbing loop that consults it. Dispatch to the
//! actual prefix/infix parselet is a `match` on the token rather than a
//! stored function pointer per table entry — `Token` carries owned payloads
//! (not the dense small-int tag the original table was indexed by), so a
//! match is the natural shape for that half of the table here.

use ilc_ast::{BinaryOp, ExprKind, ExprNode, UnaryOp};
use ilc_lexer::Token;

use crate::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    Lowest,
    Assignment,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Comparison,
    BitShift,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

/// Precedence of `tok` used as an infix/postfix operator, or `Lowest` if it
/// never appears in that position. `BitOr`/`BitXor`/`BitAnd`/`BitShift` are
/// represented here (matching the full climbing ladder this grammar was
/// modelled on) even though nothing in `ExprKind` ever constructs a bitwise
/// binary expression — `^ | & << >>` lex as tokens but `parse_infix` below
/// has no case for them, so they simply never combine two operands.
fn infix_precedence(tok: &Token) -> Precedence {
    match tok {
        Token::LParen | Token::Dot => Precedence::Call,
        Token::Star | Token::Slash => Precedence::Factor,
        Token::Plus | Token::Minus => Precedence::Term,
        Token::LtLt | Token::GtGt => Precedence::BitShift,
        Token::Lt | Token::LtEq | Token::Gt | Token::GtEq => Precedence::Comparison,
        Token::EqEq | Token::BangEq => Precedence::Equality,
        Token::Amp => Precedence::BitAnd,
        Token::Caret => Precedence::BitXor,
        Token::Pipe => Precedence::BitOr,
        Token::Eq => Precedence::Assignment,
        _ => Precedence::Lowest,
    }
}

/// One precedence level above `prec`, for computing a left-associative
/// binary operator's right-operand minimum precedence.
fn next_precedence(prec: Precedence) -> Precedence {
    use Precedence::*;
    match prec {
        Lowest => Assignment,
        Assignment => BitOr,
        BitOr => BitXor,
        BitXor => BitAnd,
        BitAnd => Equality,
        Equality => Comparison,
        Comparison => BitShift,
        BitShift => Term,
        Term => Factor,
        Factor => Unary,
        Unary => Call,
        Call => Primary,
        Primary => Primary,
    }
}

impl<'a, 'ast> Parser<'a, 'ast> {
    pub(crate) fn parse_expression(&mut self) -> Option<&'ast ExprNode<'ast>> {
        self.parse_precedence(Precedence::Assignment)
    }

    fn parse_precedence(&mut self, min_prec: Precedence) -> Option<&'ast ExprNode<'ast>> {
        let mut left = self.parse_prefix()?;
        loop {
            let prec = infix_precedence(self.peek());
            if prec < min_prec || prec == Precedence::Lowest {
                break;
            }
            left = self.parse_infix(left, prec)?;
        }
        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<&'ast ExprNode<'ast>> {
        match self.peek() {
            Token::Number(_) => self.number(),
            Token::StringLit(_) => self.string_lit(),
            Token::True | Token::False => self.bool_lit(),
            Token::Ident(_) => self.identifier(),
            Token::LParen => self.grouping(),
            Token::Minus | Token::Plus | Token::Bang | Token::Amp | Token::Star => self.unary(),
            _ => {
                self.error_here("expected an expression");
                None
            }
        }
    }

    fn parse_infix(&mut self, lhs: &'ast ExprNode<'ast>, prec: Precedence) -> Option<&'ast ExprNode<'ast>> {
        match self.peek() {
            Token::LParen => self.call(lhs),
            Token::Dot => self.property_access(lhs),
            Token::Eq => self.assignment(lhs),
            Token::Plus
            | Token::Minus
            | Token::Star
            | Token::Slash
            | Token::EqEq
            | Token::BangEq
            | Token::Lt
            | Token::LtEq
            | Token::Gt
            | Token::GtEq => self.binary(lhs, prec),
            _ => None,
        }
    }

    fn number(&mut self) -> Option<&'ast ExprNode<'ast>> {
        let loc = self.peek_location();
        let Token::Number(n) = *self.advance() else {
            unreachable!("parse_prefix only dispatches here for Token::Number")
        };
        Some(self.arena.alloc_expr(ExprNode::new(loc, ExprKind::NumberConstant(n))))
    }

    fn string_lit(&mut self) -> Option<&'ast ExprNode<'ast>> {
        let loc = self.peek_location();
        let Token::StringLit(s) = *self.advance() else {
            unreachable!("parse_prefix only dispatches here for Token::StringLit")
        };
        Some(self.arena.alloc_expr(ExprNode::new(
            loc,
            ExprKind::StringConstant(ilc_diagnostics::AstString::new(loc, s)),
        )))
    }

    fn bool_lit(&mut self) -> Option<&'ast ExprNode<'ast>> {
        let loc = self.peek_location();
        let value = matches!(self.advance(), Token::True);
        Some(self.arena.alloc_expr(ExprNode::new(loc, ExprKind::BooleanConstant(value))))
    }

    fn identifier(&mut self) -> Option<&'ast ExprNode<'ast>> {
        let loc = self.peek_location();
        let Token::Ident(name) = *self.advance() else {
            unreachable!("parse_prefix only dispatches here for Token::Ident")
        };
        Some(self.arena.alloc_expr(ExprNode::new(
            loc,
            ExprKind::Identifier(ilc_diagnostics::AstString::new(loc, name)),
        )))
    }

    fn grouping(&mut self) -> Option<&'ast ExprNode<'ast>> {
        self.advance();
        let inner = self.parse_expression()?;
        self.consume(&Token::RParen, "expected `)` after expression")?;
        Some(inner)
    }

    fn unary(&mut self) -> Option<&'ast ExprNode<'ast>> {
        let loc = self.peek_location();
        let op = match self.advance() {
            Token::Minus => UnaryOp::Negate,
            Token::Plus => return self.parse_precedence(Precedence::Unary),
            Token::Bang => UnaryOp::Not,
            Token::Amp => UnaryOp::AddrOf,
            Token::Star => UnaryOp::Deref,
            _ => unreachable!("parse_prefix only dispatches unary() for + - ! & *"),
        };
        let operand = self.parse_precedence(Precedence::Unary)?;
        Some(
            self.arena
                .alloc_expr(ExprNode::new(loc, ExprKind::Unary { op, operand })),
        )
    }

    fn binary(&mut self, lhs: &'ast ExprNode<'ast>, prec: Precedence) -> Option<&'ast ExprNode<'ast>> {
        let op = match self.advance() {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Subtract,
            Token::Star => BinaryOp::Multiply,
            Token::Slash => BinaryOp::Divide,
            Token::EqEq => BinaryOp::Eq,
            Token::BangEq => BinaryOp::Ne,
            Token::Lt => BinaryOp::Lt,
            Token::LtEq => BinaryOp::Le,
            Token::Gt => BinaryOp::Gt,
            Token::GtEq => BinaryOp::Ge,
            _ => unreachable!("parse_infix only dispatches binary() for known binary operators"),
        };
        // Left-associative: parse the right operand at one precedence level
        // higher than this operator's own.
        let rhs = self.parse_precedence(next_precedence(prec))?;
        let merged = lhs.location.merge(rhs.location);
        Some(self.arena.alloc_expr(ExprNode::new(merged, ExprKind::Binary { op, lhs, rhs })))
    }

    /// Assignment is right-associative and accepts any LHS that is a bare
    /// name or a property-access chain; anything else is rejected here at
    /// parse time. This is a shape check only — `lhs` is still an
    /// unresolved `Identifier` at this point, not yet the `Variable` node
    /// [`ExprNode::is_lvalue`] recognizes, so that method isn't the right
    /// tool here. Whether the name actually resolves to a variable (and not
    /// a function) is the type checker's job once validation has run.
    fn assignment(&mut self, lhs: &'ast ExprNode<'ast>) -> Option<&'ast ExprNode<'ast>> {
        self.advance();
        let assignable = matches!(lhs.kind(), ExprKind::Identifier(_) | ExprKind::PropertyAccess { .. });
        if !assignable {
            self.diagnostics.error(lhs.location, "left-hand side of assignment is not assignable");
        }
        let rhs = self.parse_precedence(Precedence::Assignment)?;
        let merged = lhs.location.merge(rhs.location);
        Some(self.arena.alloc_expr(ExprNode::new(merged, ExprKind::Assign { lhs, rhs })))
    }

    fn property_access(&mut self, lhs: &'ast ExprNode<'ast>) -> Option<&'ast ExprNode<'ast>> {
        self.advance();
        let loc = self.peek_location();
        let Token::Ident(name) = *self.peek() else {
            self.error_here("expected a field or method name after `.`");
            return None;
        };
        self.advance();
        let merged = lhs.location.merge(loc);
        Some(self.arena.alloc_expr(ExprNode::new(
            merged,
            ExprKind::PropertyAccess {
                lhs,
                name: ilc_diagnostics::AstString::new(loc, name),
            },
        )))
    }

    fn call(&mut self, callee: &'ast ExprNode<'ast>) -> Option<&'ast ExprNode<'ast>> {
        self.advance();
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
                // Trailing commas are rejected: a comma must always be
                // followed by another argument, never directly by `)`.
                if self.check(&Token::RParen) {
                    self.error_here("expected an argument after `,`");
                    return None;
                }
            }
        }
        let end_loc = self.peek_location();
        self.consume(&Token::RParen, "expected `)` after call arguments")?;
        let arguments = self.arena.alloc_expr_slice(args);
        let merged = callee.location.merge(end_loc);
        Some(
            self.arena
                .alloc_expr(ExprNode::new(merged, ExprKind::Call { callee, arguments })),
        )
    }
}
