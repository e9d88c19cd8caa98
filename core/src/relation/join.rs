use super::Relation;
use crate::sql::{SQL, Token};

/// How a relation is joined to its left source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Cross,
}

impl JoinKind {
    pub(crate) fn keyword<'a>(self) -> SQL<'a> {
        match self {
            JoinKind::Inner => SQL::token(Token::JOIN),
            JoinKind::Left => SQL::token(Token::LEFT).push(Token::JOIN),
            JoinKind::Cross => SQL::token(Token::CROSS).push(Token::JOIN),
        }
    }
}

/// A relation attached to a source.
///
/// Included relations contribute their selection and a row variant; joined
/// relations only filter.
#[derive(Debug, Clone)]
pub struct Join {
    pub(crate) included: bool,
    pub(crate) kind: JoinKind,
    pub(crate) relation: Relation,
}

impl Join {
    #[inline]
    pub fn is_included(&self) -> bool {
        self.included
    }

    #[inline]
    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    #[inline]
    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub(crate) fn fork(&self) -> Join {
        Join {
            included: self.included,
            kind: self.kind,
            relation: self.relation.fork(),
        }
    }
}
