//! Shared test utilities: a tiny DPLL search standing in for a real SAT solver

#![allow(dead_code)]

use setpack::{
    instances::{Cnf, ManageVars, SatInstance},
    solvers::{Solve, SolveError, SolverResult, SolverState},
    types::{Assignment, Lit, TernaryVal},
};

fn lit_value(assign: &[TernaryVal], lit: Lit) -> TernaryVal {
    match assign[lit.vidx()] {
        TernaryVal::DontCare => TernaryVal::DontCare,
        val => TernaryVal::from(val.to_bool_with_def(false) == lit.is_pos()),
    }
}

fn dpll(cnf: &Cnf, assign: &mut [TernaryVal]) -> bool {
    let mut trail = vec![];
    let conflict = 'propagate: loop {
        let mut changed = false;
        for cl in cnf {
            let mut unit = None;
            let mut n_open = 0;
            let mut sat = false;
            for &lit in cl {
                match lit_value(assign, lit) {
                    TernaryVal::True => {
                        sat = true;
                        break;
                    }
                    TernaryVal::False => (),
                    TernaryVal::DontCare => {
                        n_open += 1;
                        unit = Some(lit);
                    }
                }
            }
            if sat {
                continue;
            }
            match (n_open, unit) {
                (0, _) => break 'propagate true,
                (1, Some(lit)) => {
                    assign[lit.vidx()] = TernaryVal::from(lit.is_pos());
                    trail.push(lit.vidx());
                    changed = true;
                }
                _ => (),
            }
        }
        if !changed {
            break false;
        }
    };
    if !conflict {
        // counters default to false, so try that first
        let Some(idx) = assign.iter().position(|&v| v == TernaryVal::DontCare) else {
            return true;
        };
        for val in [TernaryVal::False, TernaryVal::True] {
            assign[idx] = val;
            if dpll(cnf, assign) {
                return true;
            }
        }
        assign[idx] = TernaryVal::DontCare;
    }
    for idx in trail {
        assign[idx] = TernaryVal::DontCare;
    }
    false
}

/// Searches for a model of `cnf` over `n_vars` variables that satisfies all
/// literals in `fixed`
pub fn solve(cnf: &Cnf, n_vars: u32, fixed: &[Lit]) -> Option<Assignment> {
    let mut assign = vec![TernaryVal::DontCare; n_vars as usize];
    for &lit in fixed {
        let val = TernaryVal::from(lit.is_pos());
        match assign[lit.vidx()] {
            TernaryVal::DontCare => assign[lit.vidx()] = val,
            old if old != val => return None,
            _ => (),
        }
    }
    if dpll(cnf, &mut assign) {
        Some(Assignment::from(assign))
    } else {
        None
    }
}

/// In-process solver implementing the solver interface
#[derive(Default)]
pub struct DpllSolver {
    model: Option<Assignment>,
    result: Option<SolverResult>,
}

impl Solve for DpllSolver {
    fn signature(&self) -> &'static str {
        "dpll"
    }

    fn solve<VM: ManageVars>(
        &mut self,
        inst: &SatInstance<VM>,
    ) -> Result<SolverResult, SolveError> {
        self.model = solve(inst.cnf(), inst.n_vars(), &[]);
        let res = if self.model.is_some() {
            SolverResult::Sat
        } else {
            SolverResult::Unsat
        };
        self.result = Some(res);
        Ok(res)
    }

    fn solution(&self) -> Result<&Assignment, SolveError> {
        self.model.as_ref().ok_or(SolveError::State {
            required: SolverState::Sat,
            actual: self.result.map_or(SolverState::Input, SolverState::from),
        })
    }
}
