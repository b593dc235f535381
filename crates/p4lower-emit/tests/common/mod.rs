#![allow(dead_code)]

use p4lower_core::{BlockId, Field, HeaderInstanceId, ProgramBuilder, Type, TypeDeclId};
use p4lower_emit::{LoweringConfig, LoweringSession};
use std::collections::HashMap;

/// A small L2/L3 program: ethernet and ipv4 headers, an options header with a varbit, metadata,
/// one control and one parser.
pub struct Fixture {
    pub builder: ProgramBuilder,
    pub ethernet_t: TypeDeclId,
    pub ipv4_t: TypeDeclId,
    pub metadata_t: TypeDeclId,
    pub ethernet: HeaderInstanceId,
    pub ipv4: HeaderInstanceId,
    pub options: HeaderInstanceId,
    pub meta: HeaderInstanceId,
    pub ingress: BlockId,
    pub parser: BlockId,
}

pub fn fixture() -> Fixture {
    let mut builder = ProgramBuilder::new();
    let ethernet_t = builder.header_type(
        "ethernet_t",
        vec![
            Field::new("dstAddr", Type::bits(48)),
            Field::new("srcAddr", Type::bits(48)),
            Field::new("etherType", Type::bits(16)),
        ],
    );
    let ipv4_t = builder.header_type(
        "ipv4_t",
        vec![
            Field::new("version", Type::bits(4)),
            Field::new("ihl", Type::bits(4)),
            Field::new("diffserv", Type::bits(8)),
            Field::new("totalLen", Type::bits(16)),
            Field::new("ttl", Type::bits(8)),
            Field::new("protocol", Type::bits(8)),
            Field::new("srcAddr", Type::bits(32)),
            Field::new("dstAddr", Type::bits(32)),
        ],
    );
    let options_t = builder.header_type(
        "options_t",
        vec![
            Field::new("kind", Type::bits(8)),
            Field::new("data", Type::varbits(320)),
        ],
    );
    let metadata_t = builder.metadata_type(
        "metadata_t",
        vec![
            Field::new("a", Type::bits(8)),
            Field::new("b", Type::bits(8)),
            Field::new("x", Type::bits(8)),
            Field::new("port", Type::bits(16)),
            Field::new("mac", Type::bits(48)),
        ],
    );

    let ethernet = builder.header_instance("ethernet", ethernet_t);
    let ipv4 = builder.header_instance("ipv4", ipv4_t);
    let options = builder.header_instance("options", options_t);
    let meta = builder.header_instance("meta", metadata_t);
    let ingress = builder.control("ingress", "ingress_t");
    let parser = builder.parser("parser", "parser_t");

    Fixture {
        builder,
        ethernet_t,
        ipv4_t,
        metadata_t,
        ethernet,
        ipv4,
        options,
        meta,
        ingress,
        parser,
    }
}

/// A session without debug traces, so expected output stays short.
pub fn quiet_session() -> LoweringSession {
    LoweringSession::new(LoweringConfig {
        emit_debug_traces: false,
        ..LoweringConfig::default()
    })
}

/// Evaluates the integer C expressions the lowering produces for arithmetic.
///
/// Values are unbounded enough (`u128`) that every intermediate of a 32-bit operation is exact,
/// so the result only matches modular arithmetic if the generated masks are right.
pub fn eval(text: &str, vars: &[(&str, u128)]) -> u128 {
    let vars: HashMap<&str, u128> = vars.iter().copied().collect();
    let tokens = tokenize(text);
    let mut parser = Parser {
        tokens,
        pos: 0,
        vars,
    };
    let value = parser.ternary();
    assert_eq!(
        parser.pos,
        parser.tokens.len(),
        "trailing tokens in {:?}",
        text
    );
    value
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(u128),
    Ident(String),
    Op(&'static str),
}

const OPS: &[&str] = &[
    "<<", ">>", "==", "!=", "<=", ">=", "&&", "||", "+", "-", "*", "/", "%", "&", "|", "^", "~",
    "!", "<", ">", "(", ")", "?", ":",
];

fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            let lit: String = chars[start..i].iter().collect();
            let value = match lit.strip_prefix("0x") {
                Some(hex) => u128::from_str_radix(hex, 16).unwrap(),
                None => lit.parse().unwrap(),
            };
            tokens.push(Token::Num(value));
        } else if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else {
            let rest: String = chars[i..].iter().take(2).collect();
            let op = OPS
                .iter()
                .find(|op| rest.starts_with(**op))
                .unwrap_or_else(|| panic!("unexpected character {:?} in {:?}", c, text));
            tokens.push(Token::Op(*op));
            i += op.len();
        }
    }
    tokens
}

struct Parser<'v> {
    tokens: Vec<Token>,
    pos: usize,
    vars: HashMap<&'v str, u128>,
}

/// Binary operators from loosest to tightest binding.
const LEVELS: &[&[&str]] = &[
    &["||"],
    &["&&"],
    &["|"],
    &["^"],
    &["&"],
    &["==", "!="],
    &["<", ">", "<=", ">="],
    &["<<", ">>"],
    &["+", "-"],
    &["*", "/", "%"],
];

impl Parser<'_> {
    fn peek_op(&self) -> Option<&'static str> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn expect(&mut self, op: &str) {
        assert_eq!(self.peek_op(), Some(op), "expected {}", op);
        self.pos += 1;
    }

    fn ternary(&mut self) -> u128 {
        let cond = self.binary(0);
        if self.peek_op() == Some("?") {
            self.pos += 1;
            let t = self.ternary();
            self.expect(":");
            let f = self.ternary();
            return if cond != 0 { t } else { f };
        }
        cond
    }

    fn binary(&mut self, level: usize) -> u128 {
        if level == LEVELS.len() {
            return self.unary();
        }
        let mut left = self.binary(level + 1);
        while let Some(op) = self.peek_op().filter(|op| LEVELS[level].contains(op)) {
            self.pos += 1;
            let right = self.binary(level + 1);
            left = match op {
                "||" => ((left != 0) || (right != 0)) as u128,
                "&&" => ((left != 0) && (right != 0)) as u128,
                "|" => left | right,
                "^" => left ^ right,
                "&" => left & right,
                "==" => (left == right) as u128,
                "!=" => (left != right) as u128,
                "<" => (left < right) as u128,
                ">" => (left > right) as u128,
                "<=" => (left <= right) as u128,
                ">=" => (left >= right) as u128,
                "<<" => left << right,
                ">>" => left >> right,
                "+" => left + right,
                "-" => left.wrapping_sub(right),
                "*" => left * right,
                "/" => left / right,
                "%" => left % right,
                _ => unreachable!(),
            };
        }
        left
    }

    fn unary(&mut self) -> u128 {
        match self.peek_op() {
            Some("~") => {
                self.pos += 1;
                !self.unary()
            }
            Some("!") => {
                self.pos += 1;
                (self.unary() == 0) as u128
            }
            Some("-") => {
                self.pos += 1;
                self.unary().wrapping_neg()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> u128 {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        match token {
            Some(Token::Num(value)) => value,
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => 1,
                "false" => 0,
                _ => *self
                    .vars
                    .get(name.as_str())
                    .unwrap_or_else(|| panic!("unbound variable {}", name)),
            },
            Some(Token::Op("(")) => {
                let value = self.ternary();
                self.expect(")");
                value
            }
            other => panic!("unexpected token {:?}", other),
        }
    }
}
