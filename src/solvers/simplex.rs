//! Big-M simplex over exact rationals.
//!
//! The [`Solver`] owns the problem statement. `solve()` first rewrites every
//! restriction into an equality (slack and surplus variables), then plants
//! artificial variables with symbolic-M goal coefficients wherever a row has
//! no obvious basic variable, and finally pivots until no column improves
//! the objective. Each iteration is snapshotted as a [`Step`]; a repeated
//! snapshot means cycling and terminates the run as unsolvable.
//!
//! The M coefficients are never encoded as a huge number. They ride a second
//! price track (`mprice`/`m`) next to the plain one (`pprice`/`w`), and the
//! M track outranks the plain track while any artificial is still in play.

use std::fmt;

use num_traits::Zero;
use tracing::{debug, trace};

use crate::model::{Direction, Goal, Polynomial, Relation, Restriction, Term};
use crate::rational::Rational;

/// Primal LP container: goal, restrictions, current per-row basis
/// selection, and the memo of the user-visible variable set used when the
/// final basis is packed.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    goal: Goal,
    sel: Vec<Term>,
    restrs: Vec<Restriction>,
    initial_basis: Vec<usize>,
}

/// Immutable snapshot of one tableau iteration.
#[derive(Debug, Clone)]
pub struct Step {
    goal: Goal,
    sel: Vec<Term>,
    restrs: Vec<Restriction>,
    pprice: Polynomial,
    mprice: Polynomial,
    basis: Vec<Term>,
    w: Rational,
    m: Rational,
    packed: bool,
}

impl Step {
    /// True only for an optimally terminated step whose basis carries no
    /// artificial variable anymore.
    pub fn valid(&self) -> bool {
        self.packed && !self.goal.has_big()
    }

    /// Final basis in terms of the initial variable set; filled only on the
    /// terminating step of an optimal run.
    pub fn basis(&self) -> &[Term] {
        &self.basis
    }

    /// Plain-track objective value.
    pub fn w(&self) -> Rational {
        self.w
    }

    /// M-track objective accumulator.
    pub fn m(&self) -> Rational {
        self.m
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrs
    }

    /// Which variable is basic in each row.
    pub fn selection(&self) -> &[Term] {
        &self.sel
    }

    pub fn pprice(&self) -> &Polynomial {
        &self.pprice
    }

    pub fn mprice(&self) -> &Polynomial {
        &self.mprice
    }
}

/// Price rows and objective accumulators are functions of the tableau, so
/// the cycle-detection key is goal, selection, and restrictions only.
impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.goal == other.goal && self.sel == other.sel && self.restrs == other.restrs
    }
}

impl Eq for Step {}

// Tableau polynomials are index-aligned after augmentation; a missing
// column here is a broken invariant.
fn rcoeff(r: &Restriction, idx: usize) -> Rational {
    r.coeff(idx).expect("aligned restriction column")
}

fn price_at(price: &Polynomial, idx: usize) -> Rational {
    price.coeff(idx).expect("aligned price column")
}

fn calculate_wm(s: &mut Step) {
    s.w = Rational::zero();
    s.m = Rational::zero();
    for (row, restr) in s.restrs.iter().enumerate() {
        if s.sel[row].is_big() {
            s.m += s.sel[row].coeff() * restr.right();
        } else {
            s.w += s.sel[row].coeff() * restr.right();
        }
    }
}

fn calculate_price(s: &mut Step) {
    for col in s.goal.indices() {
        let mut psum = Rational::zero();
        let mut msum = Rational::zero();
        for (row, restr) in s.restrs.iter().enumerate() {
            let to_add = s.sel[row].coeff() * rcoeff(restr, col);
            if s.sel[row].is_big() {
                msum += to_add;
            } else {
                psum += to_add;
            }
        }

        let col_term = s.goal.term(col).expect("aligned goal column");
        if col_term.is_big() {
            msum -= col_term.coeff();
        } else {
            psum -= col_term.coeff();
        }

        *s.pprice.coeff_mut(col).expect("aligned price column") = psum;
        *s.mprice.coeff_mut(col).expect("aligned price column") = msum;
    }

    calculate_wm(s);
}

/// Picks the improving column on one price track, or `None` when the
/// extremum does not strictly improve the objective.
fn select_column(s: &Step, artificial: bool) -> Option<usize> {
    let price = if artificial { &s.mprice } else { &s.pprice };
    let mut sel = price.last_idx();
    if sel == 0 {
        return None;
    }

    match s.goal.direction() {
        Direction::Min => {
            for i in price.indices() {
                if price_at(price, i) > price_at(price, sel) {
                    sel = i;
                }
            }
            (price_at(price, sel) > Rational::zero()).then_some(sel)
        }
        Direction::Max => {
            for i in price.indices() {
                if price_at(price, i) < price_at(price, sel) {
                    sel = i;
                }
            }
            (price_at(price, sel) < Rational::zero()).then_some(sel)
        }
    }
}

fn rhs_column(s: &Step) -> Vec<Rational> {
    s.restrs.iter().map(Restriction::right).collect()
}

fn column(s: &Step, col: usize) -> Vec<Rational> {
    s.restrs.iter().map(|r| rcoeff(r, col)).collect()
}

/// Element-wise `a / b`. Without `allow_negative` only strictly positive
/// divisors produce a quotient (the standard ratio-test rule); with it any
/// nonzero divisor does.
fn divide_columns(a: &[Rational], b: &[Rational], allow_negative: bool) -> Vec<Option<Rational>> {
    a.iter()
        .zip(b)
        .map(|(&num, &den)| {
            let usable = if allow_negative {
                !den.is_zero()
            } else {
                den > Rational::zero()
            };
            usable.then(|| num / den)
        })
        .collect()
}

fn rows_with_min(ratios: &[Option<Rational>]) -> Vec<usize> {
    let Some(min) = ratios.iter().flatten().min().copied() else {
        return Vec::new();
    };
    ratios
        .iter()
        .enumerate()
        .filter(|(_, r)| **r == Some(min))
        .map(|(i, _)| i)
        .collect()
}

/// Narrows a tied candidate set to the rows minimizing this column's
/// quotients. Rows outside the tie never re-enter.
fn refine_min(ratios: &[Option<Rational>], candidates: &[usize]) -> Vec<usize> {
    let Some(min) = candidates.iter().filter_map(|&i| ratios[i]).min() else {
        return candidates.to_vec();
    };
    candidates
        .iter()
        .copied()
        .filter(|&i| ratios[i] == Some(min))
        .collect()
}

/// Ratio test with lexicographic tie-breaking over the remaining columns.
/// `None` means no row qualifies (unbounded), or a tie that no column
/// resolves (the tableau would repeat).
fn select_row(s: &Step, col: usize) -> Option<usize> {
    let divisor = column(s, col);
    let ratios = divide_columns(&rhs_column(s), &divisor, false);
    let mut candidates = rows_with_min(&ratios);

    if candidates.is_empty() {
        return None;
    }
    if candidates.len() == 1 {
        return Some(candidates[0]);
    }

    for i in s.goal.indices() {
        if i == col {
            continue;
        }
        let quotients = divide_columns(&column(s, i), &divisor, true);
        candidates = refine_min(&quotients, &candidates);
        if candidates.len() == 1 {
            return Some(candidates[0]);
        }
    }

    None
}

/// One pivot: drops the outgoing artificial column entirely, swaps the
/// basis selection, normalizes the pivot row, and eliminates the pivot
/// column from every other row.
fn advance_step(prev: &Step, sel_col: usize, sel_row: usize) -> Step {
    let mut next = prev.clone();

    let out_idx = prev.sel[sel_row].idx();
    if prev.goal.is_big(out_idx) {
        next.goal.remove_term(out_idx);
        for r in &mut next.restrs {
            r.remove_term(out_idx);
        }
        next.pprice.remove_term(out_idx);
        next.mprice.remove_term(out_idx);
    }
    next.sel[sel_row] = next.goal.term(sel_col).expect("pivot column exists");

    let pivot = rcoeff(&prev.restrs[sel_row], sel_col);

    for row in 0..prev.restrs.len() {
        if row == sel_row {
            for i in next.goal.indices() {
                *next.restrs[row].coeff_mut(i).expect("aligned restriction column") /= pivot;
            }
            *next.restrs[row].right_mut() /= pivot;
        } else {
            for i in next.goal.indices() {
                let value = (pivot * rcoeff(&prev.restrs[row], i)
                    - rcoeff(&prev.restrs[row], sel_col) * rcoeff(&prev.restrs[sel_row], i))
                    / pivot;
                *next.restrs[row].coeff_mut(i).expect("aligned restriction column") = value;
            }
            let right = (pivot * prev.restrs[row].right()
                - rcoeff(&prev.restrs[row], sel_col) * prev.restrs[sel_row].right())
                / pivot;
            *next.restrs[row].right_mut() = right;
        }
    }

    next
}

/// Packs the terminal basis in terms of the initial variable set: the
/// row's right side for basic variables, zero for the rest.
fn pack_end_results(last: &mut Step, indices: &[usize]) {
    for &i in indices {
        match last.sel.iter().position(|t| t.idx() == i) {
            Some(row) => last.basis.push(Term::new(i, last.restrs[row].right())),
            None => last.basis.push(Term::zero(i)),
        }
    }
    last.packed = true;
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and installs the goal. Fails once any restriction has been
    /// added, or on malformed input; the previous goal then stands.
    pub fn set_goal(&mut self, input: &str) -> bool {
        if !self.restrs.is_empty() {
            return false;
        }
        let Ok(goal) = input.parse::<Goal>() else {
            return false;
        };
        self.initial_basis = goal.indices();
        self.goal = goal;
        true
    }

    /// Parses and appends a restriction. The goal must be set first. When
    /// the new restriction names a higher variable index than the rest of
    /// the model, everything is padded with zero terms to stay aligned.
    pub fn add_restriction(&mut self, input: &str) -> bool {
        if self.goal.is_empty() {
            return false;
        }
        let Ok(mut restriction) = input.parse::<Restriction>() else {
            return false;
        };

        if self.goal.len() > restriction.len() {
            restriction.add_term(Term::zero(self.goal.last_idx()));
        } else if self.goal.len() < restriction.len() {
            self.goal.add_term(Term::zero(restriction.last_idx()));
            self.initial_basis = self.goal.indices();

            for r in &mut self.restrs {
                if r.len() < restriction.len() {
                    r.add_term(Term::zero(restriction.last_idx()));
                }
            }
        }

        self.restrs.push(restriction);
        true
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrs
    }

    /// Rewrites every inequality into an equality by appending a slack
    /// (`<=`, coefficient +1) or surplus (`>=`, coefficient -1) variable,
    /// padding all other rows and the goal with zeros.
    fn append_preferred(&mut self) {
        for r in 0..self.restrs.len() {
            if self.restrs[r].relation() == Relation::Equal {
                continue;
            }

            let coeff = if self.restrs[r].relation() == Relation::LessEqual {
                Rational::from(1)
            } else {
                Rational::from(-1)
            };
            let idx = self.restrs[r].next_idx();
            self.restrs[r].add_term(Term::new(idx, coeff));

            for other in 0..self.restrs.len() {
                if other == r {
                    continue;
                }
                let next = self.restrs[other].next_idx();
                self.restrs[other].add_term(Term::zero(next));
            }
            self.goal.add_term(Term::zero(self.goal.next_idx()));

            self.restrs[r].set_relation(Relation::Equal);
        }
    }

    /// Selects a basic variable for every row. A column that is +1 in the
    /// row and 0 everywhere else is an obvious basis (the highest such
    /// index wins, so a slack beats a structural variable); rows without
    /// one get an artificial variable with a big-M goal coefficient.
    fn append_artificial(&mut self) {
        let rows = self.restrs.len();
        let mut sel: Vec<Option<Term>> = vec![None; rows];

        for (row, slot) in sel.iter_mut().enumerate() {
            for i in self.goal.indices() {
                if rcoeff(&self.restrs[row], i) != Rational::from(1) {
                    continue;
                }
                let unit = (0..rows)
                    .all(|other| other == row || rcoeff(&self.restrs[other], i).is_zero());
                if unit {
                    *slot = Some(self.goal.term(i).expect("aligned goal column"));
                }
            }
        }

        for row in 0..rows {
            if sel[row].is_some() {
                continue;
            }

            let idx = self.restrs[row].next_idx();
            self.restrs[row].add_term(Term::new(idx, Rational::from(1)));

            let m_coeff = match self.goal.direction() {
                Direction::Min => Rational::from(1),
                Direction::Max => Rational::from(-1),
            };
            self.goal.add_term(Term::big_m(idx, m_coeff));

            for other in 0..rows {
                if other == row {
                    continue;
                }
                self.restrs[other].add_term(Term::zero(idx));
            }

            sel[row] = Some(self.goal.term(idx).expect("artificial column exists"));
        }

        self.sel = sel
            .into_iter()
            .map(|t| t.expect("every row has a basis"))
            .collect();
    }

    /// Replaces the primal program with its dual in place.
    pub fn invert_to_dual(&mut self) -> &mut Self {
        let old_terms = self.goal.len();
        let old_restrs = self.restrs.len();

        let (from_rel, to_rel, to_dir) = match self.goal.direction() {
            Direction::Min => (Relation::LessEqual, Relation::GreaterEqual, Direction::Max),
            Direction::Max => (Relation::GreaterEqual, Relation::LessEqual, Direction::Min),
        };

        // orient every mixed restriction the same way
        for r in &mut self.restrs {
            if r.relation() == from_rel {
                for j in r.indices() {
                    let negated = -rcoeff(r, j);
                    *r.coeff_mut(j).expect("aligned restriction column") = negated;
                }
                *r.right_mut() = -r.right();
            }
        }

        let mut new_goal = Goal::new(to_dir);
        let mut new_restrs: Vec<Restriction> =
            (0..old_terms).map(|_| Restriction::new(from_rel)).collect();

        // one dual variable per primal row, one dual row per primal variable
        for i in 0..old_restrs {
            new_goal.add_term(Term::new(i + 1, self.restrs[i].right()));

            for (j, new_restr) in new_restrs.iter_mut().enumerate() {
                let t = self.restrs[i].term(j + 1).expect("aligned restriction column");
                new_restr.add_term(Term::new(i + 1, t.coeff()));
            }
        }

        // dual right sides come from the primal goal; negative ones flip
        // their row
        for (i, new_restr) in new_restrs.iter_mut().enumerate() {
            let g = self.goal.coeff(i + 1).expect("aligned goal column");
            if g < Rational::zero() {
                *new_restr.right_mut() = -g;
                for j in new_restr.indices() {
                    let negated = -rcoeff(new_restr, j);
                    *new_restr.coeff_mut(j).expect("aligned restriction column") = negated;
                }
                new_restr.set_relation(to_rel);
            } else {
                new_restr.set_relation(from_rel);
                *new_restr.right_mut() = g;
            }
        }

        self.initial_basis = new_goal.indices();
        self.goal = new_goal;
        self.restrs = new_restrs;
        self
    }

    /// Runs the Big-M simplex and returns the full step sequence. The
    /// terminating step is valid only for an optimum free of artificials;
    /// unboundedness and cycling leave it invalid.
    pub fn solve(&mut self) -> Vec<Step> {
        self.append_preferred();
        self.append_artificial();

        debug!(
            rows = self.restrs.len(),
            cols = self.goal.len(),
            "starting simplex"
        );

        let mut zeros = Polynomial::new();
        zeros.add_term(Term::zero(self.goal.last_idx()));

        let mut steps: Vec<Step> = Vec::new();
        let mut s = Step {
            goal: self.goal.clone(),
            sel: self.sel.clone(),
            restrs: self.restrs.clone(),
            pprice: zeros.clone(),
            mprice: zeros,
            basis: Vec::new(),
            w: Rational::zero(),
            m: Rational::zero(),
            packed: false,
        };

        loop {
            calculate_price(&mut s);

            // a repeating tableau makes no progress; unsolvable
            if steps.contains(&s) {
                debug!("tableau repeated, stopping");
                steps.push(s);
                break;
            }
            steps.push(s.clone());

            let mut sel_col = None;
            if s.goal.has_big() {
                sel_col = select_column(&s, true);
            }
            if sel_col.is_none() {
                sel_col = select_column(&s, false);
            }
            let Some(col) = sel_col else {
                debug!(w = %s.w, "optimum reached");
                pack_end_results(steps.last_mut().expect("at least one step"), &self.initial_basis);
                break;
            };

            let Some(row) = select_row(&s, col) else {
                debug!(col, "no pivot row, unbounded");
                break;
            };

            trace!(col, row, "pivoting");
            s = advance_step(&s, col, row);
        }

        steps
    }
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Solver")?;
        if !self.goal.is_empty() {
            write!(f, "{}:", self.goal.direction())?;
            for t in self.goal.terms() {
                let m = if t.is_big() { "M" } else { "" };
                write!(f, " {:>2}{}", t.coeff().to_string(), m)?;
            }
            writeln!(f)?;
        }
        for r in &self.restrs {
            write!(f, "{:>4}", r.right().to_string())?;
            for t in r.terms() {
                write!(f, " {:>2}", t.coeff().to_string())?;
            }
            writeln!(f, " {}", r.relation())?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const TAB: &str = "   ";

        writeln!(f, "<Step>")?;
        writeln!(f, "{TAB}<Goal>{}</Goal>", self.goal)?;
        writeln!(f, "{TAB}<Restrs>")?;
        for (restr, sel) in self.restrs.iter().zip(&self.sel) {
            writeln!(f, "{TAB}{TAB}{restr} {sel}")?;
        }
        writeln!(f, "{TAB}</Restrs>")?;

        write!(f, "{TAB}<pprice>")?;
        for i in self.pprice.indices() {
            write!(f, "{:>4}", price_at(&self.pprice, i).to_string())?;
        }
        writeln!(f, "</pprice>")?;
        write!(f, "{TAB}<mprice>")?;
        for i in self.mprice.indices() {
            write!(f, "{:>4}", price_at(&self.mprice, i).to_string())?;
        }
        writeln!(f, "</mprice>")?;
        write!(f, "</Step>")
    }
}
