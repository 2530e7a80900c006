//! PEST-based parser for Quill scripts
//!
//! Produces the executor AST, with span information for error reporting.
//!
//! Both pest and the builder recurse once per nesting level, and so do the
//! interpreter and `Drop` on the finished tree. Sources that nest deeper than
//! [`MAX_NESTING_DEPTH`] are rejected before pest sees them, and the builder
//! refuses to produce a tree deeper than [`MAX_TREE_DEPTH`].

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::executor::types::ast::{
    BinaryOp, Expr, ForLoopKind, MemberAccess, Span, Stmt, UnaryOp,
};


/// Deepest bracket, ternary or statement-header nesting accepted in source
pub const MAX_NESTING_DEPTH: usize = 100;

/// Deepest syntax tree the builder produces
///
/// Counted in builder levels, which is an upper bound on the tree's depth.
/// A flat chain such as `1 + 1 + ... + 1` uses one level per operator.
pub const MAX_TREE_DEPTH: usize = 2000;

/* ===================== Script Definition ===================== */

/// A parsed script: the top-level statements wrapped in one block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// Script body (statements to execute)
    pub body: Stmt,
    /// Span of the entire source
    pub span: Span,
}

/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "parser/script.pest"]
struct ScriptParser;

/* ===================== Error Types ===================== */

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    PestError(String, Option<Span>),
    #[error("{0}")]
    BuildError(String, Option<Span>),
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::PestError(_, span) => *span,
            ParseError::BuildError(_, span) => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::PestError(msg, _) => msg,
            ParseError::BuildError(msg, _) => msg,
        }
    }
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let span = match err.line_col {
            pest::error::LineColLocation::Pos((line, col)) => Some(Span {
                start: 0,
                end: 0,
                start_line: line.saturating_sub(1),
                start_col: col.saturating_sub(1),
                end_line: line.saturating_sub(1),
                end_col: col,
            }),
            pest::error::LineColLocation::Span((start_line, start_col), (end_line, end_col)) => {
                Some(Span {
                    start: 0,
                    end: 0,
                    start_line: start_line.saturating_sub(1),
                    start_col: start_col.saturating_sub(1),
                    end_line: end_line.saturating_sub(1),
                    end_col: end_col.saturating_sub(1),
                })
            }
        };
        ParseError::PestError(err.to_string(), span)
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/* ===================== Line Index ===================== */

/// Byte offset to (line, column) lookup, built once per source
struct LineIndex<'s> {
    source: &'s str,
    /// Byte offset at which each line starts
    starts: Vec<usize>,
    /// Lines without multi-byte characters can use byte distance as the column
    ascii: Vec<bool>,
}

impl<'s> LineIndex<'s> {
    fn new(source: &'s str) -> Self {
        let bytes = source.as_bytes();
        let mut starts = vec![0];
        starts.extend(
            bytes
                .iter()
                .enumerate()
                .filter(|(_, b)| **b == b'\n')
                .map(|(idx, _)| idx + 1),
        );

        let ascii = starts
            .iter()
            .enumerate()
            .map(|(line, &start)| {
                let end = starts.get(line + 1).copied().unwrap_or(bytes.len());
                bytes[start..end].is_ascii()
            })
            .collect();

        Self {
            source,
            starts,
            ascii,
        }
    }

    /// (line, column), both 0-indexed, with the column counted in characters
    fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self
            .starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let start = self.starts[line];

        let col = if self.ascii[line] {
            offset - start
        } else {
            self.source
                .get(start..offset)
                .map_or(0, |text| text.chars().count())
        };
        (line, col)
    }

    fn span(&self, start: usize, end: usize) -> Span {
        let (start_line, start_col) = self.line_col(start);
        let (end_line, end_col) = self.line_col(end);
        Span::new(start, end, start_line, start_col, end_line, end_col)
    }
}

/* ===================== Nesting Pre-check ===================== */

/// Reject sources whose nesting would recurse too deeply inside pest
///
/// Counts open `(`, `[`, `{` and unanswered `?`, plus runs of
/// `if`/`while`/`for`/`else` headers whose bodies have no braces. Strings
/// and comments are skipped.
fn check_nesting(source: &str, lines: &LineIndex) -> ParseResult<()> {
    // Each opener remembers the header run it interrupted
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut saved_runs = 0usize;
    let mut run = 0usize;

    let mut chars = source.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' | '\'' => {
                while let Some((_, next)) = chars.next() {
                    if next == '\\' {
                        chars.next();
                    } else if next == c {
                        break;
                    }
                }
                continue;
            }
            '/' => {
                if matches!(chars.peek(), Some((_, '/'))) {
                    for (_, next) in chars.by_ref() {
                        if next == '\n' {
                            break;
                        }
                    }
                }
                continue;
            }
            '(' | '[' | '{' | '?' => {
                open.push((c, run));
                saved_runs += run;
                run = 0;
            }
            ':' => {
                if let Some(&('?', outer)) = open.last() {
                    open.pop();
                    saved_runs -= outer;
                    run = outer;
                }
            }
            ')' | ']' | '}' => {
                while let Some(&('?', outer)) = open.last() {
                    open.pop();
                    saved_runs -= outer;
                }
                if let Some((_, outer)) = open.pop() {
                    saved_runs -= outer;
                    // A closed block ends the statement that owned it
                    run = if c == '}' { 0 } else { outer };
                }
            }
            ';' => run = 0,
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = offset + c.len_utf8();
                while let Some(&(idx, next)) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    end = idx + next.len_utf8();
                    chars.next();
                }
                if matches!(&source[offset..end], "if" | "while" | "for" | "else") {
                    run += 1;
                }
            }
            _ => continue,
        }

        if open.len() + saved_runs + run > MAX_NESTING_DEPTH {
            return Err(ParseError::BuildError(
                format!(
                    "Script nests more than {} levels deep",
                    MAX_NESTING_DEPTH
                ),
                Some(lines.span(offset, offset + c.len_utf8())),
            ));
        }
    }

    Ok(())
}

/* ===================== Public API ===================== */

/// Parse a Quill source string into a script
pub fn parse_script(source: &str) -> ParseResult<Script> {
    let lines = LineIndex::new(source);
    check_nesting(source, &lines)?;

    let mut pairs = ScriptParser::parse(Rule::program, source)?;
    let program = pairs
        .next()
        .ok_or_else(|| ParseError::BuildError("Empty parse result".to_string(), None))?;

    let mut builder = AstBuilder { lines, depth: 0 };
    let program_span = builder.span_of(&program);

    let statements = program
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::statement)
        .map(|pair| builder.build_statement(pair))
        .collect::<ParseResult<Vec<_>>>()?;

    let body_span = match (statements.first(), statements.last()) {
        (Some(first), Some(last)) => first.span().merge(&last.span()),
        _ => program_span,
    };

    Ok(Script {
        body: Stmt::Block {
            body: statements,
            span: body_span,
        },
        span: program_span,
    })
}

/* ===================== AST Builder ===================== */

/// Take the next child pair, or report which part of the tree was missing
fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, what: &str, span: Span) -> ParseResult<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| ParseError::BuildError(format!("Missing {}", what), Some(span)))
}

struct AstBuilder<'s> {
    lines: LineIndex<'s>,
    /// Current builder nesting, see [`MAX_TREE_DEPTH`]
    depth: usize,
}

impl AstBuilder<'_> {
    /// Convert a PEST pair's span to our Span type
    fn span_of(&self, pair: &Pair<Rule>) -> Span {
        let pest_span = pair.as_span();
        self.lines.span(pest_span.start(), pest_span.end())
    }

    fn descend(&mut self, levels: usize, span: Span) -> ParseResult<()> {
        self.depth += levels;
        if self.depth > MAX_TREE_DEPTH {
            return Err(ParseError::BuildError(
                format!(
                    "Expression or statement nests more than {} levels deep",
                    MAX_TREE_DEPTH
                ),
                Some(span),
            ));
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth = self.depth.saturating_sub(levels);
    }

    /* ----- Statements ----- */

    fn build_statement(&mut self, pair: Pair<Rule>) -> ParseResult<Stmt> {
        let span = self.span_of(&pair);
        self.descend(1, span)?;
        let stmt = self.build_statement_rule(pair, span);
        self.ascend(1);
        stmt
    }

    fn build_statement_rule(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Stmt> {
        match pair.as_rule() {
            Rule::statement => {
                let inner = next_pair(&mut pair.into_inner(), "statement", span)?;
                self.build_statement(inner)
            }
            Rule::block => self.build_block(pair),
            Rule::if_stmt => self.build_if_stmt(pair, span),
            Rule::while_stmt => self.build_while_stmt(pair, span),
            Rule::for_loop_stmt => self.build_for_loop_stmt(pair, span),
            Rule::try_stmt => self.build_try_stmt(pair, span),
            Rule::declare_stmt => self.build_declare_stmt(pair, span),
            Rule::assign_stmt => self.build_assign_stmt(pair, span),
            Rule::break_stmt => Ok(Stmt::Break { span }),
            Rule::continue_stmt => Ok(Stmt::Continue { span }),
            Rule::return_stmt => {
                let mut inner = pair.into_inner();
                let _kw_return = next_pair(&mut inner, "'return'", span)?;
                let value = match inner.next() {
                    Some(expr_pair) => Some(self.build_expression(expr_pair)?),
                    None => None,
                };
                Ok(Stmt::Return { value, span })
            }
            Rule::throw_stmt => {
                let mut inner = pair.into_inner();
                let _kw_throw = next_pair(&mut inner, "'throw'", span)?;
                let value = self.build_expression(next_pair(&mut inner, "thrown value", span)?)?;
                Ok(Stmt::Throw { value, span })
            }
            Rule::expr_stmt => {
                let expr_pair = next_pair(&mut pair.into_inner(), "expression", span)?;
                let expr = self.build_expression(expr_pair)?;
                Ok(Stmt::Expr { expr, span })
            }
            _ => Err(ParseError::BuildError(
                format!("Unexpected statement rule: {:?}", pair.as_rule()),
                Some(span),
            )),
        }
    }

    fn build_block(&mut self, pair: Pair<Rule>) -> ParseResult<Stmt> {
        let span = self.span_of(&pair);
        let body = pair
            .into_inner()
            .map(|stmt_pair| self.build_statement(stmt_pair))
            .collect::<ParseResult<Vec<_>>>()?;

        Ok(Stmt::Block { body, span })
    }

    /// `if` with its `else if` arms folded into nested `Stmt::If`s
    fn build_if_stmt(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Stmt> {
        let else_ifs = pair
            .clone()
            .into_inner()
            .filter(|child| child.as_rule() == Rule::else_if_clause)
            .count();
        self.descend(else_ifs, span)?;

        let mut inner = pair.into_inner();
        let test = self.build_expression(next_pair(&mut inner, "if condition", span)?)?;
        let then_s = self.build_statement(next_pair(&mut inner, "if body", span)?)?;

        let mut arms = Vec::with_capacity(else_ifs);
        let mut else_s = None;
        for clause in inner {
            let clause_span = self.span_of(&clause);
            let rule = clause.as_rule();
            let mut clause_inner = clause.into_inner();
            let _kw_else = next_pair(&mut clause_inner, "'else'", clause_span)?;

            if rule == Rule::else_if_clause {
                let _kw_if = next_pair(&mut clause_inner, "'if'", clause_span)?;
                let arm_test =
                    self.build_expression(next_pair(&mut clause_inner, "if condition", clause_span)?)?;
                let arm_body =
                    self.build_statement(next_pair(&mut clause_inner, "if body", clause_span)?)?;
                arms.push((arm_test, arm_body, clause_span));
            } else {
                let else_body = next_pair(&mut clause_inner, "else body", clause_span)?;
                else_s = Some(Box::new(self.build_statement(else_body)?));
            }
        }
        self.ascend(else_ifs);

        for (arm_test, arm_body, clause_span) in arms.into_iter().rev() {
            let arm_span = match &else_s {
                Some(rest) => clause_span.merge(&rest.span()),
                None => clause_span,
            };
            else_s = Some(Box::new(Stmt::If {
                test: arm_test,
                then_s: Box::new(arm_body),
                else_s,
                span: arm_span,
            }));
        }

        Ok(Stmt::If {
            test,
            then_s: Box::new(then_s),
            else_s,
            span,
        })
    }

    fn build_while_stmt(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Stmt> {
        let mut inner = pair.into_inner();

        let test = self.build_expression(next_pair(&mut inner, "while condition", span)?)?;
        let body = self.build_statement(next_pair(&mut inner, "while body", span)?)?;

        Ok(Stmt::While {
            test,
            body: Box::new(body),
            span,
        })
    }

    fn build_for_loop_stmt(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Stmt> {
        let mut inner = pair.into_inner();

        let mut binding_pair = next_pair(&mut inner, "loop binding", span)?;
        if binding_pair.as_rule() == Rule::kw_let {
            binding_pair = next_pair(&mut inner, "loop binding", span)?;
        }
        let binding = binding_pair.as_str().to_string();

        let kind_pair = next_pair(&mut inner, "'of' or 'in'", span)?;
        let kind = match kind_pair.as_str() {
            "of" => ForLoopKind::Of,
            "in" => ForLoopKind::In,
            other => {
                return Err(ParseError::BuildError(
                    format!("Expected 'of' or 'in', got: {}", other),
                    Some(self.span_of(&kind_pair)),
                ))
            }
        };

        let iterable = self.build_expression(next_pair(&mut inner, "loop iterable", span)?)?;
        let body = self.build_statement(next_pair(&mut inner, "loop body", span)?)?;

        Ok(Stmt::ForLoop {
            kind,
            binding,
            iterable,
            body: Box::new(body),
            span,
        })
    }

    fn build_declare_stmt(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Stmt> {
        let mut inner = pair.into_inner();

        let _kw_let = next_pair(&mut inner, "'let'", span)?;
        let name = next_pair(&mut inner, "variable name", span)?.as_str().to_string();

        let init = match inner.next() {
            Some(expr_pair) => Some(self.build_expression(expr_pair)?),
            None => None,
        };

        Ok(Stmt::Declare { name, init, span })
    }

    fn build_try_stmt(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Stmt> {
        let mut inner = pair.into_inner();

        let body = self.build_statement(next_pair(&mut inner, "try block", span)?)?;
        let catch_var = next_pair(&mut inner, "catch binding", span)?
            .as_str()
            .to_string();
        let catch_body = self.build_statement(next_pair(&mut inner, "catch block", span)?)?;

        Ok(Stmt::Try {
            body: Box::new(body),
            catch_var,
            catch_body: Box::new(catch_body),
            span,
        })
    }

    fn build_assign_stmt(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Stmt> {
        let mut inner = pair.into_inner();

        let var = next_pair(&mut inner, "assignment target", span)?
            .as_str()
            .to_string();

        let mut path = Vec::new();
        let mut value = None;

        for pair in inner {
            match pair.as_rule() {
                Rule::assign_path_segment => {
                    let segment_span = self.span_of(&pair);
                    let segment_inner =
                        next_pair(&mut pair.into_inner(), "path segment", segment_span)?;
                    match segment_inner.as_rule() {
                        Rule::identifier => path.push(MemberAccess::Prop {
                            property: segment_inner.as_str().to_string(),
                            span: segment_span,
                        }),
                        _ => path.push(MemberAccess::Index {
                            expr: self.build_expression(segment_inner)?,
                            span: segment_span,
                        }),
                    }
                }
                _ => {
                    value = Some(self.build_expression(pair)?);
                    break;
                }
            }
        }

        let value = value.ok_or_else(|| {
            ParseError::BuildError("Assignment is missing a value".to_string(), Some(span))
        })?;

        Ok(Stmt::Assign {
            var,
            path,
            value,
            span,
        })
    }

    /* ----- Expressions ----- */

    fn build_expression(&mut self, pair: Pair<Rule>) -> ParseResult<Expr> {
        let span = self.span_of(&pair);
        self.descend(1, span)?;
        let expr = self.build_expression_rule(pair, span);
        self.ascend(1);
        expr
    }

    fn build_expression_rule(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Expr> {
        match pair.as_rule() {
            Rule::expression | Rule::primary | Rule::literal => {
                let inner = next_pair(&mut pair.into_inner(), "expression", span)?;
                self.build_expression(inner)
            }
            Rule::ternary_expr => self.build_ternary_expr(pair, span),
            Rule::logical_or_expr
            | Rule::logical_and_expr
            | Rule::equality_expr
            | Rule::comparison_expr
            | Rule::additive_expr
            | Rule::multiplicative_expr => self.build_binary_expr(pair, span),
            Rule::unary_expr => self.build_unary_expr(pair, span),
            Rule::call_expr => self.build_call_expr(pair, span),
            Rule::identifier => Ok(Expr::Ident {
                name: pair.as_str().to_string(),
                span,
            }),
            Rule::number => {
                let num_str = pair.as_str();
                let value = num_str.parse::<f64>().map_err(|e| {
                    ParseError::BuildError(
                        format!("Failed to parse number '{}': {}", num_str, e),
                        Some(span),
                    )
                })?;
                Ok(Expr::LitNum { v: value, span })
            }
            Rule::boolean => Ok(Expr::LitBool {
                v: pair.as_str() == "true",
                span,
            }),
            Rule::string => Ok(Expr::LitStr {
                v: string_value(pair, span)?,
                span,
            }),
            Rule::null_lit => Ok(Expr::LitNull { span }),
            Rule::array_lit => {
                let elements = match pair.into_inner().next() {
                    Some(list) => list
                        .into_inner()
                        .map(|expr_pair| self.build_expression(expr_pair))
                        .collect::<ParseResult<Vec<_>>>()?,
                    None => vec![],
                };
                Ok(Expr::LitList { elements, span })
            }
            Rule::object_lit => self.build_object_literal(pair, span),
            _ => Err(ParseError::BuildError(
                format!("Unexpected expression rule: {:?}", pair.as_rule()),
                Some(span),
            )),
        }
    }

    /// Fold `cond ? a : cond ? b : c` right-associatively
    fn build_ternary_expr(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Expr> {
        let arms = pair.clone().into_inner().count() / 2;
        self.descend(arms, span)?;

        let mut parts = pair
            .into_inner()
            .map(|part| self.build_expression(part))
            .collect::<ParseResult<Vec<_>>>()?;
        self.ascend(arms);

        let mut expr = parts.pop().ok_or_else(|| {
            ParseError::BuildError("Missing ternary condition".to_string(), Some(span))
        })?;
        while let (Some(consequent), Some(condition)) = (parts.pop(), parts.pop()) {
            let new_span = condition.span().merge(&expr.span());
            expr = Expr::Ternary {
                condition: Box::new(condition),
                consequent: Box::new(consequent),
                alternate: Box::new(expr),
                span: new_span,
            };
        }

        Ok(expr)
    }

    /// Fold `operand (op operand)*` into a left-associative tree
    fn build_binary_expr(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Expr> {
        let folds = pair.clone().into_inner().count() / 2;
        self.descend(folds, span)?;

        let mut inner = pair.into_inner();
        let mut left = self.build_expression(next_pair(&mut inner, "left operand", span)?)?;

        while let Some(op_pair) = inner.next() {
            let op = binary_op_for(op_pair.as_rule()).ok_or_else(|| {
                ParseError::BuildError(
                    format!("Expected operator, got {:?}", op_pair.as_rule()),
                    Some(self.span_of(&op_pair)),
                )
            })?;

            let right_pair = inner.next().ok_or_else(|| {
                ParseError::BuildError(
                    "Missing right operand after operator".to_string(),
                    Some(span),
                )
            })?;
            let right = self.build_expression(right_pair)?;
            let new_span = left.span().merge(&right.span());

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: new_span,
            };
        }
        self.ascend(folds);

        Ok(left)
    }

    fn build_unary_expr(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Expr> {
        let mut ops = Vec::new();
        let mut operand_pair = None;
        for child in pair.into_inner() {
            let op = match child.as_rule() {
                Rule::op_not => UnaryOp::Not,
                Rule::op_neg => UnaryOp::Neg,
                _ => {
                    operand_pair = Some(child);
                    break;
                }
            };
            ops.push((op, self.span_of(&child)));
        }

        let operand_pair = operand_pair.ok_or_else(|| {
            ParseError::BuildError("Missing unary operand".to_string(), Some(span))
        })?;
        self.descend(ops.len(), span)?;
        let mut expr = self.build_expression(operand_pair)?;
        self.ascend(ops.len());

        for (op, op_span) in ops.into_iter().rev() {
            let new_span = op_span.merge(&expr.span());
            expr = match (op, expr) {
                // Negative literals are folded so `-3` stays a number literal
                (UnaryOp::Neg, Expr::LitNum { v, .. }) => Expr::LitNum {
                    v: -v,
                    span: new_span,
                },
                (op, operand) => Expr::Unary {
                    op,
                    operand: Box::new(operand),
                    span: new_span,
                },
            };
        }

        Ok(expr)
    }

    fn build_call_expr(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Expr> {
        let postfixes = pair.clone().into_inner().count().saturating_sub(1);
        self.descend(postfixes, span)?;

        let mut inner = pair.into_inner();
        let mut expr = self.build_expression(next_pair(&mut inner, "callee", span)?)?;

        for postfix_pair in inner {
            let postfix_span = self.span_of(&postfix_pair);
            let postfix_inner = next_pair(&mut postfix_pair.into_inner(), "postfix", postfix_span)?;
            let new_span = expr.span().merge(&postfix_span);

            expr = match postfix_inner.as_rule() {
                Rule::call_suffix => {
                    let args = match postfix_inner.into_inner().next() {
                        Some(arg_list) => arg_list
                            .into_inner()
                            .map(|arg_pair| self.build_expression(arg_pair))
                            .collect::<ParseResult<Vec<_>>>()?,
                        None => vec![],
                    };
                    Expr::Call {
                        callee: Box::new(expr),
                        args,
                        span: new_span,
                    }
                }
                Rule::index_access => {
                    let index_pair =
                        next_pair(&mut postfix_inner.into_inner(), "index", postfix_span)?;
                    Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(self.build_expression(index_pair)?),
                        span: new_span,
                    }
                }
                Rule::regular_access => {
                    let prop_pair =
                        next_pair(&mut postfix_inner.into_inner(), "property", postfix_span)?;
                    Expr::Member {
                        object: Box::new(expr),
                        property: prop_pair.as_str().to_string(),
                        span: new_span,
                    }
                }
                other => {
                    return Err(ParseError::BuildError(
                        format!("Unexpected postfix rule: {:?}", other),
                        Some(postfix_span),
                    ))
                }
            };
        }
        self.ascend(postfixes);

        Ok(expr)
    }

    fn build_object_literal(&mut self, pair: Pair<Rule>, span: Span) -> ParseResult<Expr> {
        let mut properties = Vec::new();

        if let Some(property_list) = pair.into_inner().next() {
            for property in property_list.into_inner() {
                let property_span = self.span_of(&property);
                let inner = next_pair(&mut property.into_inner(), "property", property_span)?;

                match inner.as_rule() {
                    Rule::property_pair => {
                        let mut pair_inner = inner.into_inner();
                        let key_pair = next_pair(&mut pair_inner, "property key", property_span)?;
                        let key = match key_pair.as_rule() {
                            Rule::string => string_value(key_pair, property_span)?,
                            _ => key_pair.as_str().to_string(),
                        };
                        let value_pair =
                            next_pair(&mut pair_inner, "property value", property_span)?;
                        properties.push((key, self.build_expression(value_pair)?));
                    }
                    _ => {
                        let key = inner.as_str().to_string();
                        let value = Expr::Ident {
                            name: key.clone(),
                            span: property_span,
                        };
                        properties.push((key, value));
                    }
                }
            }
        }

        Ok(Expr::LitObj { properties, span })
    }
}

fn binary_op_for(rule: Rule) -> Option<BinaryOp> {
    let op = match rule {
        Rule::op_or => BinaryOp::Or,
        Rule::op_and => BinaryOp::And,
        Rule::op_eq => BinaryOp::Eq,
        Rule::op_ne => BinaryOp::Ne,
        Rule::op_lt => BinaryOp::Lt,
        Rule::op_lte => BinaryOp::Lte,
        Rule::op_gt => BinaryOp::Gt,
        Rule::op_gte => BinaryOp::Gte,
        Rule::op_add => BinaryOp::Add,
        Rule::op_sub => BinaryOp::Sub,
        Rule::op_mul => BinaryOp::Mul,
        Rule::op_div => BinaryOp::Div,
        Rule::op_mod => BinaryOp::Mod,
        _ => return None,
    };
    Some(op)
}

/// Decoded contents of a string literal pair
fn string_value(pair: Pair<Rule>, span: Span) -> ParseResult<String> {
    let content = next_pair(&mut pair.into_inner(), "string content", span)?;
    Ok(unescape(content.as_str()))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
