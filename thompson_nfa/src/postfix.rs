use crate::tokenizer::{Token, TokenKind};
use crate::{CompileError, CompileResult, ErrorKind};

/// Converts an infix token stream into postfix (reverse Polish) order.
///
/// This is a shunting-yard conversion. Each operator is checked against the
/// input token right before it, which is the only place where illegal
/// juxtapositions such as `a|*` or `()` are caught.
pub struct PostfixConverter;

impl PostfixConverter {
    /// Convert `infix`, as produced by the tokenizer, into postfix order.
    ///
    /// `(` is both emitted and pushed so the builder can see where each group
    /// opens. The `End` token is consumed and not emitted.
    pub fn convert(infix: &[Token]) -> CompileResult<Vec<Token>> {
        let mut postfix = Vec::with_capacity(infix.len());
        let mut operators: Vec<&Token> = Vec::new();
        // `None` until the first token has been seen.
        let mut last: Option<&TokenKind> = None;
        let mut end = infix.last().map_or(0, |t| t.pos);

        for token in infix {
            match &token.kind {
                TokenKind::Literal(_)
                | TokenKind::Dot
                | TokenKind::Class(_)
                | TokenKind::Caret
                | TokenKind::Dollar => postfix.push(token.clone()),
                TokenKind::LParen(_) => {
                    postfix.push(token.clone());
                    operators.push(token);
                }
                TokenKind::RParen(_) => {
                    match last {
                        Some(TokenKind::LParen(_)) => {
                            return Err(CompileError::new(ErrorKind::EmptyGroup, token.pos))
                        }
                        Some(TokenKind::Alternation) => {
                            return Err(CompileError::new(ErrorKind::EmptyAlternation, token.pos))
                        }
                        _ => {}
                    }
                    loop {
                        match operators.pop() {
                            Some(op) if matches!(op.kind, TokenKind::LParen(_)) => break,
                            Some(op) => postfix.push(op.clone()),
                            None => {
                                return Err(CompileError::new(
                                    ErrorKind::UnmatchedCloseParen,
                                    token.pos,
                                ))
                            }
                        }
                    }
                    postfix.push(token.clone());
                }
                kind if kind.is_quantifier() => {
                    let follows_atom = matches!(
                        last,
                        Some(
                            TokenKind::Literal(_)
                                | TokenKind::Dot
                                | TokenKind::Class(_)
                                | TokenKind::RParen(_)
                        )
                    );
                    if !follows_atom {
                        return Err(CompileError::new(
                            ErrorKind::InvalidQuantifierTarget,
                            token.pos,
                        ));
                    }
                    Self::push_operator(token, &mut operators, &mut postfix);
                }
                TokenKind::Alternation => {
                    if matches!(
                        last,
                        None | Some(TokenKind::LParen(_)) | Some(TokenKind::Alternation)
                    ) {
                        return Err(CompileError::new(ErrorKind::EmptyAlternation, token.pos));
                    }
                    Self::push_operator(token, &mut operators, &mut postfix);
                }
                TokenKind::Concat => Self::push_operator(token, &mut operators, &mut postfix),
                TokenKind::End => {
                    end = token.pos;
                    continue;
                }
                // Quantifiers are caught by the guard above.
                _ => {}
            }
            last = Some(&token.kind);
        }

        match last {
            Some(TokenKind::Alternation) => {
                return Err(CompileError::new(ErrorKind::EmptyAlternation, end))
            }
            Some(TokenKind::Concat) => {
                return Err(CompileError::new(ErrorKind::TrailingOperator, end))
            }
            _ => {}
        }

        while let Some(op) = operators.pop() {
            if matches!(op.kind, TokenKind::LParen(_)) {
                return Err(CompileError::new(ErrorKind::UnmatchedOpenParen, op.pos));
            }
            postfix.push(op.clone());
        }

        trace!(
            "postfix: {}",
            postfix
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        );
        Ok(postfix)
    }

    /// Operator precedence. Parentheses and operands have none.
    pub fn precedence(kind: &TokenKind) -> u8 {
        match kind {
            TokenKind::Star | TokenKind::Plus | TokenKind::Question | TokenKind::Repeat { .. } => 3,
            TokenKind::Concat => 2,
            TokenKind::Alternation => 1,
            _ => 0,
        }
    }

    /// Pops operators of greater or equal precedence (left associativity)
    /// down to the nearest `(`, then pushes `token`.
    fn push_operator<'t>(
        token: &'t Token,
        operators: &mut Vec<&'t Token>,
        postfix: &mut Vec<Token>,
    ) {
        let prec = Self::precedence(&token.kind);
        while let Some(top) = operators.last() {
            if matches!(top.kind, TokenKind::LParen(_)) || Self::precedence(&top.kind) < prec {
                break;
            }
            postfix.push((*top).clone());
            operators.pop();
        }
        operators.push(token);
    }
}
