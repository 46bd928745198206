//! Transportation (balance) problems by the method of potentials.
//!
//! A [`BalanceMatrix`] holds integer costs, supplies, and demands. Solving
//! balances the matrix with a dummy supplier or consumer, builds an initial
//! plan by the north-west corner or minimum-cost rule, then repeatedly
//! brings the most negative reduced cost into the plan along an alternating
//! cycle until every reduced cost is nonnegative.
//!
//! Degenerate plans are kept basic with ε placeholders: an allocation value
//! of `-1` marks a cell that belongs to the basis but carries no mass. Such
//! cells contribute nothing to the objective or to row/column sums, but do
//! count toward the `r + c - 1` basic cells.

use std::fmt;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::linalg::Matrix;

/// Degenerate basic cells are stored as this sentinel in the plan.
const EPS: i64 = -1;

/// Initial-plan rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    NorthWest,
    MinCost,
}

/// One iteration of the potential method: the plan `X`, the reduced costs
/// `D`, and the objective value `W`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    x: Matrix<i64>,
    d: Matrix<i64>,
    w: i64,
}

impl Step {
    /// The plan is optimal when no reduced cost is negative.
    pub fn valid(&self) -> bool {
        all_nonnegative(&self.d)
    }

    pub fn x(&self) -> &Matrix<i64> {
        &self.x
    }

    pub fn d(&self) -> &Matrix<i64> {
        &self.d
    }

    pub fn w(&self) -> i64 {
        self.w
    }
}

/// Balance-problem statement: every input row but the last is
/// `(costs…, supply)`; the last row is the demand line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceMatrix {
    costs: Matrix<i64>,
    prods: Vec<i64>,
    consums: Vec<i64>,
}

impl BalanceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and installs the matrix. On rejection (fewer than two
    /// rows, ragged cost rows, demand row of the wrong length) the previous
    /// state stands.
    pub fn set(&mut self, rows: &[Vec<i64>]) -> bool {
        if rows.len() < 2 {
            return false;
        }

        let (cost_rows, demand) = rows.split_at(rows.len() - 1);
        let mut costs: Vec<Vec<i64>> = Vec::with_capacity(cost_rows.len());
        let mut prods: Vec<i64> = Vec::with_capacity(cost_rows.len());
        for row in cost_rows {
            let Some((&supply, cells)) = row.split_last() else {
                return false;
            };
            costs.push(cells.to_vec());
            prods.push(supply);
        }
        let consums = demand[0].clone();

        let width = costs[0].len();
        if consums.len() != width {
            return false;
        }
        if costs.iter().any(|r| r.len() != width) {
            return false;
        }

        self.costs = Matrix::from_rows(&costs);
        self.prods = prods;
        self.consums = consums;
        true
    }

    /// Balanced copy of the problem: a dummy zero-cost supplier or consumer
    /// absorbs any supply/demand difference.
    fn balanced(&self) -> (Matrix<i64>, Vec<i64>, Vec<i64>) {
        let mut costs = self.costs.clone();
        let mut prods = self.prods.clone();
        let mut consums = self.consums.clone();

        let supply: i64 = prods.iter().sum();
        let demand: i64 = consums.iter().sum();
        if demand > supply {
            prods.push(demand - supply);
            costs.push_empty_row();
        } else if supply > demand {
            consums.push(supply - demand);
            costs.push_empty_column();
        }

        (costs, prods, consums)
    }

    /// Initial plan by the north-west corner rule, on the balanced matrix.
    pub fn nw_plan(&self) -> Matrix<i64> {
        let (_, mut prods, mut consums) = self.balanced();
        let mut x = Matrix::new(prods.len(), consums.len());

        for i in 0..prods.len() {
            for j in 0..consums.len() {
                let v = prods[i].min(consums[j]);
                prods[i] -= v;
                consums[j] -= v;
                x[(i, j)] = v;
            }
        }
        x
    }

    /// Initial plan by the minimum-cost rule, on the balanced matrix.
    /// Zero-cost cells (the dummy line) allocate after every real cell.
    pub fn min_cost_plan(&self) -> Matrix<i64> {
        let (costs, mut prods, mut consums) = self.balanced();
        let mut x = Matrix::new(prods.len(), consums.len());

        for (i, j) in enumerate_by_min(&costs) {
            let v = prods[i].min(consums[j]);
            prods[i] -= v;
            consums[j] -= v;
            x[(i, j)] = v;
        }
        x
    }

    /// Runs the potential method from the chosen initial plan and returns
    /// the step sequence; the terminal step is valid once no reduced cost
    /// is negative.
    pub fn solve(&self, method: Method) -> Vec<Step> {
        if self.costs.rows == 0 {
            return Vec::new();
        }

        let (costs, _, _) = self.balanced();
        let mut x = match method {
            Method::NorthWest => self.nw_plan(),
            Method::MinCost => self.min_cost_plan(),
        };
        debug!(rows = costs.rows, cols = costs.cols, ?method, "starting potential method");

        let (u, v) = fill_uv(&costs, &mut x);
        let d = reduced_costs(&costs, &u, &v);
        let w = calculate_w(&costs, &x);

        let mut step = Step { x, d, w };
        let mut steps = vec![step.clone()];

        while !all_nonnegative(&step.d) {
            let entering = most_negative(&step.d);
            trace!(?entering, "bringing cell into the plan");

            let x = advance_x(&step.x, entering);
            let d = advance_d(&step.d, &x, entering);
            let w = calculate_w(&costs, &x);
            step = Step { x, d, w };
            steps.push(step.clone());
        }

        steps
    }
}

/// All cells ordered for the minimum-cost rule: ascending cost, ties by
/// ascending `i + j`, with zero-cost cells rotated behind every paying
/// cell so dummy lines fill last.
fn enumerate_by_min(costs: &Matrix<i64>) -> Vec<(usize, usize)> {
    let mut cells: Vec<(usize, usize)> =
        (0..costs.rows).cartesian_product(0..costs.cols).collect();
    cells.sort_by_key(|&(i, j)| (costs[(i, j)], i + j));

    let first_paying = cells
        .iter()
        .position(|&(i, j)| costs[(i, j)] > 0)
        .unwrap_or(cells.len());
    cells.rotate_left(first_paying);
    cells
}

/// Cells currently in the basis: any nonzero allocation, ε included.
fn form_links(x: &Matrix<i64>) -> Vec<(usize, usize)> {
    let mut links = Vec::new();
    for i in 0..x.rows {
        for j in 0..x.cols {
            if x[(i, j)] != 0 {
                links.push((i, j));
            }
        }
    }
    links
}

/// Registers an ε cell joining a row with unknown potential to a column
/// with a known one, so propagation can continue on a degenerate plan.
fn add_link(
    links: &mut Vec<(usize, usize)>,
    x: &mut Matrix<i64>,
    u: &[Option<i64>],
    v: &[Option<i64>],
) -> bool {
    for (i, ui) in u.iter().enumerate() {
        if ui.is_some() {
            continue;
        }
        for (j, vj) in v.iter().enumerate() {
            if vj.is_some() {
                links.push((i, j));
                x[(i, j)] = EPS;
                return true;
            }
        }
    }
    false
}

/// Solves `U[i] + cost[i][j] = V[j]` over the linked cells, starting from
/// `U[0] = 0` and inserting ε links when the plan is degenerate.
fn fill_uv(costs: &Matrix<i64>, x: &mut Matrix<i64>) -> (Vec<i64>, Vec<i64>) {
    let mut u: Vec<Option<i64>> = vec![None; costs.rows];
    let mut v: Vec<Option<i64>> = vec![None; costs.cols];
    let mut links = form_links(x);

    u[0] = Some(0);

    let mut progress = true;
    while progress {
        progress = false;

        for &(i, j) in &links {
            match (u[i], v[j]) {
                (Some(ui), None) => {
                    v[j] = Some(ui + costs[(i, j)]);
                    progress = true;
                }
                (None, Some(vj)) => {
                    u[i] = Some(vj - costs[(i, j)]);
                    progress = true;
                }
                _ => {}
            }
        }

        if !progress {
            progress = add_link(&mut links, x, &u, &v);
        }
    }

    (
        u.into_iter().map(|p| p.expect("row potential determined")).collect(),
        v.into_iter().map(|p| p.expect("column potential determined")).collect(),
    )
}

fn reduced_costs(costs: &Matrix<i64>, u: &[i64], v: &[i64]) -> Matrix<i64> {
    let mut d = Matrix::new(costs.rows, costs.cols);
    for i in 0..costs.rows {
        for j in 0..costs.cols {
            d[(i, j)] = costs[(i, j)] - v[j] + u[i];
        }
    }
    d
}

fn all_nonnegative(d: &Matrix<i64>) -> bool {
    d.data.iter().all(|&v| v >= 0)
}

/// Entering cell: the most negative reduced cost, row-major on ties.
fn most_negative(d: &Matrix<i64>) -> (usize, usize) {
    let mut best = (0, 0);
    for i in 0..d.rows {
        for j in 0..d.cols {
            if d[(i, j)] < d[best] {
                best = (i, j);
            }
        }
    }
    best
}

/// Strikes out rows and columns that hold a single basic cell; such cells
/// cannot take part in an alternating cycle. Returns the struck cells.
fn mark_forbidden(x: &Matrix<i64>, entering: (usize, usize)) -> Vec<(usize, usize)> {
    let mut linked = Matrix::<bool>::new(x.rows, x.cols);
    for i in 0..x.rows {
        for j in 0..x.cols {
            linked[(i, j)] = x[(i, j)] != 0;
        }
    }
    linked[entering] = true;

    let mut forbidden: Vec<(usize, usize)> = Vec::new();
    let mut direction = 0;
    let mut striking = true;

    while striking {
        if direction > 0 {
            striking = false;
        }

        if direction % 2 == 0 {
            for i in 0..x.rows {
                let count = (0..x.cols).filter(|&j| linked[(i, j)]).count();
                if count == 1 {
                    for j in 0..x.cols {
                        forbidden.push((i, j));
                        linked[(i, j)] = false;
                    }
                    striking = true;
                }
            }
        } else {
            for j in 0..x.cols {
                let count = (0..x.rows).filter(|&i| linked[(i, j)]).count();
                if count == 1 {
                    for i in 0..x.rows {
                        forbidden.push((i, j));
                        linked[(i, j)] = false;
                    }
                    striking = true;
                }
            }
        }

        if forbidden.len() == x.rows * x.cols {
            break;
        }
        direction += 1;
    }

    forbidden.sort_unstable();
    forbidden.dedup();
    forbidden
}

fn count_allowed(x: &Matrix<i64>, forbidden: &[(usize, usize)], entering: (usize, usize)) -> usize {
    let mut num = 0;
    for i in 0..x.rows {
        for j in 0..x.cols {
            if (i, j) == entering {
                num += 1;
            } else if x[(i, j)] != 0 && !forbidden.contains(&(i, j)) {
                num += 1;
            }
        }
    }
    num
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Mark {
    #[default]
    None,
    Plus,
    Minus,
}

fn next_sign(current: &mut Mark) -> Mark {
    *current = match *current {
        Mark::Plus => Mark::Minus,
        _ => Mark::Plus,
    };
    *current
}

/// Walks one leg of the cycle: from `pos`, the farthest unmarked basic
/// cell in the given direction (skipping struck cells) gets the next
/// alternating sign and becomes the new position.
fn try_move(
    count: &mut usize,
    pos: &mut (usize, usize),
    signs: &mut Matrix<Mark>,
    current: &mut Mark,
    x: &Matrix<i64>,
    forbidden: &[(usize, usize)],
    step: (isize, isize),
) {
    let mut last = *pos;
    let mut i = pos.0 as isize + step.0;
    let mut j = pos.1 as isize + step.1;

    while i >= 0 && j >= 0 && (i as usize) < x.rows && (j as usize) < x.cols {
        let cell = (i as usize, j as usize);
        if x[cell] != 0 && !forbidden.contains(&cell) {
            last = cell;
        }
        i += step.0;
        j += step.1;
    }

    if last != *pos && signs[last] == Mark::None {
        *count += 1;
        *pos = last;
        signs[last] = next_sign(current);
    }
}

/// The minus-marked cell with the smallest allocation; its value is the
/// step size δ.
fn least_minus(x: &Matrix<i64>, signs: &Matrix<Mark>, entering: (usize, usize)) -> (usize, usize) {
    let mut ret = entering;
    for i in 0..x.rows {
        for j in 0..x.cols {
            if signs[(i, j)] == Mark::Minus
                && (x[(i, j)] < x[ret] || signs[ret] == Mark::Plus)
            {
                ret = (i, j);
            }
        }
    }
    ret
}

/// Shifts δ around the alternating cycle through `entering`. When several
/// cells hit zero at once, only the first stays plain zero; the rest turn
/// into ε placeholders so the basis keeps its size.
fn advance_x(prev: &Matrix<i64>, entering: (usize, usize)) -> Matrix<i64> {
    let forbidden = mark_forbidden(prev, entering);

    let mut signs = Matrix::<Mark>::new(prev.rows, prev.cols);
    let mut pos = entering;
    signs[pos] = Mark::Plus;
    let mut current = Mark::Plus;
    let mut count = 1;
    let num = count_allowed(prev, &forbidden, entering);

    while count < num {
        try_move(&mut count, &mut pos, &mut signs, &mut current, prev, &forbidden, (-1, 0));
        try_move(&mut count, &mut pos, &mut signs, &mut current, prev, &forbidden, (1, 0));
        try_move(&mut count, &mut pos, &mut signs, &mut current, prev, &forbidden, (0, 1));
        try_move(&mut count, &mut pos, &mut signs, &mut current, prev, &forbidden, (0, -1));
    }

    let lm = least_minus(prev, &signs, entering);
    let delta = prev[lm];

    let mut next = prev.clone();
    let mut nullified = false;
    for i in 0..prev.rows {
        for j in 0..prev.cols {
            match signs[(i, j)] {
                Mark::Minus => {
                    if delta > 0 {
                        if prev[(i, j)] >= 0 {
                            next[(i, j)] -= delta;
                        } else {
                            next[(i, j)] = -delta;
                        }
                    } else if delta <= EPS && prev[(i, j)] <= 0 {
                        next[(i, j)] -= delta;
                    }
                }
                Mark::Plus => {
                    if delta > 0 {
                        if prev[(i, j)] >= 0 {
                            next[(i, j)] += delta;
                        } else {
                            next[(i, j)] = delta;
                        }
                    } else if delta <= EPS && prev[(i, j)] <= 0 {
                        next[(i, j)] += delta;
                    }
                }
                Mark::None => continue,
            }

            if next[(i, j)] == 0 {
                if !nullified {
                    nullified = true;
                } else {
                    next[(i, j)] = EPS;
                }
            }
        }
    }

    next
}

/// Recomputes reduced costs from the stroke partition around the entering
/// cell: rows on the entering side gain `|D[entering]|`, columns on the
/// other side lose it, unstroked intersections keep their value.
fn advance_d(prev_d: &Matrix<i64>, x: &Matrix<i64>, entering: (usize, usize)) -> Matrix<i64> {
    let mut linked = Matrix::<bool>::new(x.rows, x.cols);
    for i in 0..x.rows {
        for j in 0..x.cols {
            linked[(i, j)] = x[(i, j)] != 0;
        }
    }

    let mut hstroke = vec![false; x.rows];
    let mut vstroke = vec![false; x.cols];
    hstroke[entering.0] = true;

    let mut striking = true;
    let mut direction = 0;
    while striking {
        striking = false;

        if direction % 2 == 0 {
            for i in 0..x.rows {
                for j in 0..x.cols {
                    if (i, j) == entering {
                        continue;
                    }
                    if hstroke[i] && !vstroke[j] && linked[(i, j)] {
                        vstroke[j] = true;
                        striking = true;
                    }
                }
            }
        } else {
            for j in 0..x.cols {
                for i in 0..x.rows {
                    if (i, j) == entering {
                        continue;
                    }
                    if vstroke[j] && !hstroke[i] && linked[(i, j)] {
                        hstroke[i] = true;
                        striking = true;
                    }
                }
            }
        }

        direction += 1;
    }

    let delta = prev_d[entering].abs();
    let mut next = prev_d.clone();
    for i in 0..x.rows {
        for j in 0..x.cols {
            if hstroke[i] && !vstroke[j] {
                next[(i, j)] += delta;
            } else if vstroke[j] && !hstroke[i] {
                next[(i, j)] -= delta;
            }
        }
    }

    next
}

/// Objective value: cost times allocation over paying cells. ε cells carry
/// no mass and contribute nothing.
fn calculate_w(costs: &Matrix<i64>, x: &Matrix<i64>) -> i64 {
    let mut w = 0;
    for i in 0..costs.rows {
        for j in 0..costs.cols {
            if x[(i, j)] > 0 {
                w += costs[(i, j)] * x[(i, j)];
            }
        }
    }
    w
}

/// Renders a plan or price matrix. With `eps_as_one`, ε cells print as
/// their magnitude followed by `E`.
pub fn format_matrix(m: &Matrix<i64>, eps_as_one: bool) -> String {
    use std::fmt::Write;

    let mut out = String::from("[");
    for i in 0..m.rows {
        out.push('\n');
        for j in 0..m.cols {
            let v = m[(i, j)];
            if eps_as_one && v <= EPS {
                let _ = write!(out, "{:>3}E", v.abs());
            } else {
                let _ = write!(out, "{v:>4}");
            }
        }
    }
    out.push_str("\n]");
    out
}

impl fmt::Display for BalanceMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Balance:")?;
        for r in 0..self.costs.rows {
            writeln!(f)?;
            for c in self.costs.row(r) {
                write!(f, "{c:>4}")?;
            }
            write!(f, "|{:>4}", self.prods[r])?;
        }
        if !self.consums.is_empty() {
            writeln!(f)?;
            for c in &self.consums {
                write!(f, "{c:>4}")?;
            }
            write!(f, "\n]")?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const TAB: &str = "   ";
        writeln!(f, "<Step>")?;
        writeln!(f, "{TAB}<X>{}</X>", format_matrix(&self.x, true))?;
        writeln!(f, "{TAB}<D>{}</D>", format_matrix(&self.d, false))?;
        writeln!(f, "{TAB}<W>{}</W>", self.w)?;
        write!(f, "</Step>")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn balance(rows: &[Vec<i64>]) -> BalanceMatrix {
        let mut m = BalanceMatrix::new();
        assert!(m.set(rows));
        m
    }

    fn grid(rows: &[Vec<i64>]) -> Matrix<i64> {
        Matrix::from_rows(rows)
    }

    fn fixture(n: usize) -> BalanceMatrix {
        let rows: Vec<Vec<i64>> = match n {
            0 => vec![
                vec![5, 8, 4, 4, 80],
                vec![1, 2, 3, 8, 45],
                vec![4, 7, 6, 1, 60],
                vec![45, 60, 70, 40],
            ],
            1 => vec![
                vec![4, 5, 5, 7, 10],
                vec![8, 7, 5, 4, 20],
                vec![1, 6, 4, 5, 50],
                vec![3, 2, 1, 3, 30],
                vec![40, 30, 20, 40],
            ],
            2 => vec![
                vec![3, 1, 4, 7, 30],
                vec![7, 3, 5, 8, 85],
                vec![6, 3, 4, 6, 45],
                vec![40, 35, 15, 60],
            ],
            3 => vec![
                vec![4, 2, 4, 1, 50],
                vec![2, 3, 6, 5, 30],
                vec![6, 2, 4, 1, 20],
                vec![30, 30, 10, 20],
            ],
            4 => vec![
                vec![7, 8, 5, 3, 11],
                vec![2, 4, 5, 9, 11],
                vec![6, 3, 1, 2, 8],
                vec![5, 9, 9, 7],
            ],
            _ => unreachable!(),
        };
        balance(&rows)
    }

    #[test]
    fn test_set_and_display() {
        let mut m = BalanceMatrix::new();
        assert!(m.set(&[
            vec![5, 8, 4, 4, 80],
            vec![1, 2, 3, 8, 45],
            vec![4, 7, 6, 1, 60],
            vec![45, 60, 70, 40],
        ]));
        assert_eq!(
            m.to_string(),
            "[Balance:\n\
             \x20  5   8   4   4|  80\n\
             \x20  1   2   3   8|  45\n\
             \x20  4   7   6   1|  60\n\
             \x20 45  60  70  40\n]"
        );

        assert!(m.set(&[vec![5, 8, 4, 4, 80], vec![1, 2, 3, 8]]));
        assert_eq!(
            m.to_string(),
            "[Balance:\n\
             \x20  5   8   4   4|  80\n\
             \x20  1   2   3   8\n]"
        );

        // rejections leave the previous state in place
        assert!(!m.set(&[vec![5, 8, 4, 4, 80]]));
        assert!(!m.set(&[]));
        assert!(!m.set(&[vec![5, 8, 4, 4, 80], vec![1, 2, 3]]));
        assert!(!m.set(&[vec![5, 8, 4, 4, 80], vec![1, 2, 80], vec![1, 2, 3, 8]]));
        assert_eq!(
            m.to_string(),
            "[Balance:\n\
             \x20  5   8   4   4|  80\n\
             \x20  1   2   3   8\n]"
        );
    }

    #[rstest]
    #[case(0, &[
        vec![45, 35, 0, 0],
        vec![0, 25, 20, 0],
        vec![0, 0, 50, 10],
        vec![0, 0, 0, 30],
    ])]
    #[case(1, &[
        vec![10, 0, 0, 0],
        vec![20, 0, 0, 0],
        vec![10, 30, 10, 0],
        vec![0, 0, 10, 20],
        vec![0, 0, 0, 20],
    ])]
    #[case(2, &[
        vec![30, 0, 0, 0, 0],
        vec![10, 35, 15, 25, 0],
        vec![0, 0, 0, 35, 10],
    ])]
    #[case(3, &[
        vec![30, 20, 0, 0, 0],
        vec![0, 10, 10, 10, 0],
        vec![0, 0, 0, 10, 10],
    ])]
    #[case(4, &[
        vec![5, 6, 0, 0],
        vec![0, 3, 8, 0],
        vec![0, 0, 1, 7],
    ])]
    fn test_nw_plan(#[case] n: usize, #[case] expected: &[Vec<i64>]) {
        assert_eq!(fixture(n).nw_plan(), grid(expected));
    }

    #[rstest]
    #[case(0, &[
        vec![0, 10, 70, 0],
        vec![45, 0, 0, 0],
        vec![0, 20, 0, 40],
        vec![0, 30, 0, 0],
    ])]
    #[case(1, &[
        vec![0, 10, 0, 0],
        vec![0, 0, 0, 20],
        vec![40, 0, 0, 10],
        vec![0, 10, 20, 0],
        vec![0, 10, 0, 10],
    ])]
    #[case(2, &[
        vec![0, 30, 0, 0, 0],
        vec![10, 5, 0, 60, 10],
        vec![30, 0, 15, 0, 0],
    ])]
    #[case(3, &[
        vec![0, 30, 0, 20, 0],
        vec![30, 0, 0, 0, 0],
        vec![0, 0, 10, 0, 10],
    ])]
    #[case(4, &[
        vec![0, 3, 1, 7],
        vec![5, 6, 0, 0],
        vec![0, 0, 8, 0],
    ])]
    fn test_min_cost_plan(#[case] n: usize, #[case] expected: &[Vec<i64>]) {
        assert_eq!(fixture(n).min_cost_plan(), grid(expected));
    }

    #[test]
    fn test_potential_method_converges() {
        let m = fixture(0);
        let nw = m.solve(Method::NorthWest);
        let min = m.solve(Method::MinCost);
        let last_nw = nw.last().unwrap();
        let last_min = min.last().unwrap();

        assert!(last_nw.valid());
        assert_eq!(
            *last_nw.x(),
            grid(&[
                vec![10, 0, 70, 0],
                vec![15, 30, 0, 0],
                vec![20, 0, 0, 40],
                vec![0, 30, 0, 0],
            ])
        );
        assert_eq!(
            *last_nw.d(),
            grid(&[
                vec![0, 2, 0, 2],
                vec![0, 0, 3, 10],
                vec![0, 2, 3, 0],
                vec![1, 0, 2, 4],
            ])
        );
        assert_eq!(last_nw.x(), last_min.x());
        assert_eq!(last_nw.d(), last_min.d());
        assert_eq!(last_nw.w(), last_min.w());
    }

    #[test]
    fn test_degenerate_plan_keeps_eps_cell() {
        let m = fixture(1);
        let nw = m.solve(Method::NorthWest);
        let min = m.solve(Method::MinCost);
        let last_nw = nw.last().unwrap();
        let last_min = min.last().unwrap();

        assert!(last_nw.valid());
        assert_eq!(
            *last_nw.x(),
            grid(&[
                vec![0, 10, 0, 0],
                vec![0, 0, 0, 20],
                vec![40, 0, 10, -1],
                vec![0, 20, 10, 0],
                vec![0, 0, 0, 20],
            ])
        );
        assert_eq!(
            *last_nw.d(),
            grid(&[
                vec![3, 0, 1, 2],
                vec![8, 3, 2, 0],
                vec![0, 1, 0, 0],
                vec![5, 0, 0, 1],
                vec![4, 0, 1, 0],
            ])
        );
        // both rules reach the same prices and cost even though the min
        // rule ends on a different alternative plan
        assert_eq!(
            *last_min.x(),
            grid(&[
                vec![0, 10, 0, 0],
                vec![0, 0, 0, 20],
                vec![40, 0, 0, 10],
                vec![0, 10, 20, 0],
                vec![0, 10, 0, 10],
            ])
        );
        assert_eq!(last_nw.d(), last_min.d());
        assert_eq!(last_nw.w(), last_min.w());
    }

    #[test]
    fn test_unbalanced_demand_gets_dummy_consumer() {
        let m = fixture(2);
        let nw = m.solve(Method::NorthWest);
        let min = m.solve(Method::MinCost);
        let last_nw = nw.last().unwrap();
        let last_min = min.last().unwrap();

        assert_eq!(
            *last_nw.x(),
            grid(&[
                vec![30, 0, 0, 0, 0],
                vec![10, 35, 15, 15, 10],
                vec![0, 0, 0, 45, 0],
            ])
        );
        assert_eq!(
            *last_nw.d(),
            grid(&[
                vec![0, 2, 3, 3, 4],
                vec![0, 0, 0, 0, 0],
                vec![1, 2, 1, 0, 2],
            ])
        );
        assert_eq!(last_nw.x(), last_min.x());
        assert_eq!(last_nw.d(), last_min.d());
        assert_eq!(last_nw.w(), last_min.w());
    }

    #[test]
    fn test_alternative_optima_share_cost() {
        let m = fixture(3);
        let nw = m.solve(Method::NorthWest);
        let min = m.solve(Method::MinCost);
        let last_nw = nw.last().unwrap();
        let last_min = min.last().unwrap();

        assert_eq!(
            *last_nw.x(),
            grid(&[
                vec![0, 30, 10, 10, 0],
                vec![30, 0, 0, 0, -1],
                vec![0, 0, 0, 10, 10],
            ])
        );
        assert_eq!(
            *last_nw.d(),
            grid(&[
                vec![2, 0, 0, 0, 0],
                vec![0, 1, 2, 4, 0],
                vec![4, 0, 0, 0, 0],
            ])
        );
        assert_eq!(
            *last_min.x(),
            grid(&[
                vec![-1, 30, 0, 20, 0],
                vec![30, 0, 0, 0, 0],
                vec![0, -2, 10, 0, 10],
            ])
        );
        assert_eq!(
            *last_min.d(),
            grid(&[
                vec![0, 0, 0, 0, 0],
                vec![0, 3, 4, 6, 2],
                vec![2, 0, 0, 0, 0],
            ])
        );
        assert_eq!(last_nw.w(), last_min.w());
    }

    #[test]
    fn test_balanced_instance() {
        let m = fixture(4);
        let nw = m.solve(Method::NorthWest);
        let min = m.solve(Method::MinCost);
        let last_nw = nw.last().unwrap();
        let last_min = min.last().unwrap();

        assert!(last_nw.valid());
        assert_eq!(
            *last_nw.x(),
            grid(&[
                vec![0, 0, 4, 7],
                vec![5, 6, 0, 0],
                vec![0, 3, 5, 0],
            ])
        );
        assert_eq!(
            *last_nw.d(),
            grid(&[
                vec![2, 1, 0, 0],
                vec![0, 0, 3, 9],
                vec![5, 0, 0, 3],
            ])
        );
        assert_eq!(last_nw.x(), last_min.x());
    }

    #[test]
    fn test_plan_sums_match_supply_and_demand() {
        for n in 0..5 {
            let m = fixture(n);
            let (_, prods, consums) = m.balanced();
            let last = m.solve(Method::NorthWest).pop().unwrap();
            let x = last.x();

            for (i, &supply) in prods.iter().enumerate() {
                let sum: i64 = (0..x.cols).map(|j| x[(i, j)].max(0)).sum();
                assert_eq!(sum, supply, "row {i} of fixture {n}");
            }
            for (j, &demand) in consums.iter().enumerate() {
                let sum: i64 = (0..x.rows).map(|i| x[(i, j)].max(0)).sum();
                assert_eq!(sum, demand, "column {j} of fixture {n}");
            }

            // the basis keeps r + c - 1 cells, ε placeholders included
            let basic = x.data.iter().filter(|&&v| v != 0).count();
            assert_eq!(basic, x.rows + x.cols - 1, "fixture {n}");

            // W re-derives from the plan
            let (costs, _, _) = m.balanced();
            assert_eq!(last.w(), calculate_w(&costs, x), "fixture {n}");
        }
    }

    #[test]
    fn test_format_matrix_eps_rendering() {
        let x = grid(&[vec![40, 0], vec![-1, 10]]);
        assert_eq!(format_matrix(&x, true), "[\n  40   0\n  1E  10\n]");
        assert_eq!(format_matrix(&x, false), "[\n  40   0\n  -1  10\n]");
    }

    #[test]
    fn test_solve_on_empty_matrix_yields_no_steps() {
        let m = BalanceMatrix::new();
        assert!(m.solve(Method::NorthWest).is_empty());
    }
}
