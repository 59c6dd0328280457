use std::{borrow::Cow, collections::BTreeSet};

use crate::{
    inverted_index::{DocId, InvertedIndex},
    query::Expr,
};

/// Evaluate `expr` against `index`, returning matching ids in ascending
/// order without duplicates.
///
/// `NOT` is the complement within the index's universe. Unknown terms
/// contribute the empty set, so every parsed query has an answer.
pub fn evaluate(expr: &Expr, index: &InvertedIndex) -> Vec<DocId> {
    eval(expr, index).iter().copied().collect()
}

fn eval<'i>(expr: &Expr, index: &'i InvertedIndex) -> Cow<'i, BTreeSet<DocId>> {
    match expr {
        Expr::Term(term) => Cow::Borrowed(index.postings(term)),
        Expr::And(l, r) => {
            let (l, r) = (eval(l, index), eval(r, index));
            Cow::Owned(l.intersection(&r).copied().collect())
        }
        Expr::Or(l, r) => {
            let (l, r) = (eval(l, index), eval(r, index));
            Cow::Owned(l.union(&r).copied().collect())
        }
        Expr::Not(x) => {
            let x = eval(x, index);
            Cow::Owned(index.universe().difference(&x).copied().collect())
        }
    }
}
