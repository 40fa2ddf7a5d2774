//! Parsed representation: `Or(And(Cond...)...)` (`spec.md` §4.D).

use super::lexer::CmpOp;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    In,
    Contains,
    Regex,
}

impl From<CmpOp> for Op {
    fn from(op: CmpOp) -> Self {
        match op {
            CmpOp::Eq => Op::Eq,
            CmpOp::Ne => Op::Ne,
            CmpOp::Gt => Op::Gt,
            CmpOp::Lt => Op::Lt,
            CmpOp::Ge => Op::Ge,
            CmpOp::Le => Op::Le,
        }
    }
}

/// Either a plain vertex attribute name, or the dotted `edge.<property>`
/// form.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Attr(String),
    Edge(String),
}

impl Key {
    pub fn parse(text: &str) -> Key {
        match text.strip_prefix("edge.") {
            Some(prop) => Key::Edge(prop.to_string()),
            None => Key::Attr(text.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Single(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub key: Key,
    pub op: Op,
    pub value: Literal,
}

/// One AND-group: every condition must hold.
pub type AndGroup = Vec<Condition>;

/// The full query: OR of AND-groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub groups: Vec<AndGroup>,
}
