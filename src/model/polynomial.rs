use std::str::FromStr;

use crate::Error;
use crate::rational::{Cursor, Rational};

use super::Term;

/// Ordered sum of [`Term`]s, strictly sorted by variable index.
///
/// After every structural change the index set is contiguous: if any term
/// names `x<n>`, zero terms exist for every index `1..n`. That makes column
/// access positional for the simplex tableau. Removal is the one exception;
/// it leaves a gap so a dropped column stays dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polynomial {
    terms: Vec<Term>,
}

fn is_sign(ch: u8) -> bool {
    ch == b'+' || ch == b'-'
}

fn is_x(ch: u8) -> bool {
    ch == b'x' || ch == b'X'
}

fn is_rel(ch: u8) -> bool {
    ch == b'<' || ch == b'=' || ch == b'>'
}

enum ParseState {
    Start,
    Sign,
    Coeff,
    X,
    Idx,
}

impl Polynomial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a polynomial prefix of `input`.
    ///
    /// When `allow_rest` is set, hitting a relational character (`<`, `=`,
    /// `>`) terminates the polynomial; the remainder, starting with that
    /// character, is handed back for the caller to parse. Without it a
    /// relational character is an error.
    pub(crate) fn parse_prefix(input: &str, allow_rest: bool) -> Option<(Self, &str)> {
        let mut cur = Cursor::new(input);
        let mut state = ParseState::Start;
        let mut sign: Option<u8> = None;
        let mut coeff: Option<Rational> = None;
        let mut terms: Vec<Term> = Vec::new();
        let mut rest = "";

        while let Some(ch) = cur.next() {
            match state {
                ParseState::Start | ParseState::Sign => {
                    if matches!(state, ParseState::Start) && is_sign(ch) {
                        sign = Some(ch);
                        state = ParseState::Sign;
                    } else if ch.is_ascii_digit() {
                        cur.back();
                        coeff = Some(Rational::parse_from(&mut cur)?);
                        state = ParseState::Coeff;
                    } else if is_x(ch) {
                        state = ParseState::X;
                    } else {
                        return None;
                    }
                }
                ParseState::Coeff => {
                    if is_x(ch) {
                        state = ParseState::X;
                    } else {
                        return None;
                    }
                }
                ParseState::X => {
                    if !ch.is_ascii_digit() {
                        return None;
                    }
                    let value = match (sign, coeff) {
                        (Some(b'-'), Some(c)) => -c,
                        (Some(b'-'), None) => Rational::from(-1),
                        (_, Some(c)) => c,
                        (_, None) => Rational::from(1),
                    };
                    cur.back();
                    let idx = cur.scan_integer()? as usize;
                    if idx == 0 {
                        return None;
                    }
                    terms.push(Term::new(idx, value));
                    state = ParseState::Idx;
                }
                ParseState::Idx => {
                    if is_sign(ch) {
                        sign = Some(ch);
                        coeff = None;
                        state = ParseState::Sign;
                    } else if is_rel(ch) && allow_rest {
                        cur.back();
                        rest = cur.rest();
                        break;
                    } else {
                        return None;
                    }
                }
            }
        }

        if !matches!(state, ParseState::Idx) {
            return None;
        }

        let mut poly = Polynomial { terms };
        poly.simplify();
        poly.fill_gaps();
        Some((poly, rest))
    }

    /// Appends a term. A term with an already present index merges into it
    /// by summing coefficients.
    pub fn add_term(&mut self, term: Term) {
        self.terms.push(term);
        self.simplify();
        self.fill_gaps();
    }

    /// Drops the term with the given index. The gap it leaves is not
    /// refilled; a removed tableau column must stay removed.
    pub fn remove_term(&mut self, idx: usize) {
        self.terms.retain(|t| t.idx() != idx);
    }

    pub fn clear_terms(&mut self) {
        self.terms.clear();
    }

    pub fn term(&self, idx: usize) -> Result<Term, Error> {
        self.terms
            .iter()
            .find(|t| t.idx() == idx)
            .copied()
            .ok_or(Error::OutOfRange(idx))
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn coeff(&self, idx: usize) -> Result<Rational, Error> {
        self.term(idx).map(|t| t.coeff())
    }

    pub fn coeff_mut(&mut self, idx: usize) -> Result<&mut Rational, Error> {
        self.terms
            .iter_mut()
            .find(|t| t.idx() == idx)
            .map(Term::coeff_mut)
            .ok_or(Error::OutOfRange(idx))
    }

    /// Whether the term with the given index carries a big-M coefficient.
    /// Missing indices are simply not big.
    pub fn is_big(&self, idx: usize) -> bool {
        self.terms.iter().any(|t| t.idx() == idx && t.is_big())
    }

    pub fn indices(&self) -> Vec<usize> {
        self.terms.iter().map(Term::idx).collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn last_idx(&self) -> usize {
        self.terms.last().map_or(0, Term::idx)
    }

    pub fn next_idx(&self) -> usize {
        self.last_idx() + 1
    }

    /// Merges duplicate indices (the earlier term keeps its big flag) and
    /// restores ascending index order.
    fn simplify(&mut self) {
        let mut i = 0;
        while i < self.terms.len() {
            let mut j = i + 1;
            while j < self.terms.len() {
                if self.terms[j].idx() == self.terms[i].idx() {
                    let merged = self.terms[j].coeff();
                    *self.terms[i].coeff_mut() += merged;
                    self.terms.remove(j);
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        self.terms.sort_by_key(Term::idx);
    }

    /// Materializes zero terms so indices form the contiguous range
    /// `1..=last_idx`.
    fn fill_gaps(&mut self) {
        for idx in 1..=self.last_idx() {
            if !self.terms.iter().any(|t| t.idx() == idx) {
                self.terms.push(Term::zero(idx));
            }
        }
        self.terms.sort_by_key(Term::idx);
    }
}

impl FromStr for Polynomial {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Polynomial::parse_prefix(s, false)
            .map(|(poly, _)| poly)
            .ok_or(Error::InvalidArgument("malformed polynomial"))
    }
}
