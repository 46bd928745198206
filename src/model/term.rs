use crate::rational::Rational;

/// One addend of a [`Polynomial`](super::Polynomial): a variable index, its
/// rational coefficient, and whether the coefficient sits on the symbolic
/// big-M track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Term {
    idx: usize,
    coeff: Rational,
    big: bool,
}

impl Term {
    /// A zero-coefficient placeholder for the given variable.
    pub fn zero(idx: usize) -> Self {
        Self { idx, coeff: Rational::default(), big: false }
    }

    pub fn new(idx: usize, coeff: Rational) -> Self {
        Self { idx, coeff, big: false }
    }

    /// A term whose coefficient is a multiple of the symbolic M.
    pub fn big_m(idx: usize, coeff: Rational) -> Self {
        Self { idx, coeff, big: true }
    }

    pub fn idx(&self) -> usize {
        self.idx
    }

    pub fn coeff(&self) -> Rational {
        self.coeff
    }

    pub fn coeff_mut(&mut self) -> &mut Rational {
        &mut self.coeff
    }

    pub fn is_big(&self) -> bool {
        self.big
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::Rational;

    #[test]
    fn test_display_forms() {
        assert_eq!(Term::zero(10).to_string(), "0{X10}");
        assert_eq!(Term::new(3, Rational::new(1, 5).unwrap()).to_string(), "1/5{X3}");
        assert_eq!(Term::new(3, Rational::new(2, 3).unwrap()).to_string(), "2/3{X3}");
        assert_eq!(Term::big_m(3, Rational::default()).to_string(), "0M{X3}");
        assert_eq!(Term::big_m(5, Rational::new(1, 3).unwrap()).to_string(), "1/3M{X5}");
    }

    #[test]
    fn test_equality_covers_all_fields() {
        let plain = Term::new(1, Rational::from(2));
        let big = Term::big_m(1, Rational::from(2));
        assert_ne!(plain, big);
        assert_ne!(plain, Term::new(2, Rational::from(2)));
        assert_eq!(plain, Term::new(1, Rational::from(2)));
    }
}
