use std::fmt;

use super::{Direction, Goal, Polynomial, Relation, Restriction, Term};

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{{X{}}}",
            self.coeff(),
            if self.is_big() { "M" } else { "" },
            self.idx()
        )
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Polynom:")?;
        for term in self.terms() {
            write!(f, " {term}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "[Goal:]");
        }
        write!(f, "[Goal:")?;
        for term in self.terms() {
            write!(f, " {term}")?;
        }
        write!(f, " => {}]", self.direction())
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len() == 0 {
            return write!(f, "[Restriction:]");
        }
        write!(f, "[Restriction:")?;
        for term in self.terms() {
            write!(f, " {term}")?;
        }
        write!(f, " {} {}]", self.relation(), self.right())
    }
}
