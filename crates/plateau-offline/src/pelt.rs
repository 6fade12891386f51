// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use plateau_core::{
    Diagnostics, ExecutionContext, OfflineDetector, Penalty, PlateauError, PruningStats,
    Segmentation, Sequence, penalty_value,
};
use plateau_costs::CostModel;
use std::borrow::Cow;
use std::time::Instant;

const DEFAULT_CANCEL_CHECK_EVERY: usize = 1000;

/// Configuration for [`Pelt`].
#[derive(Clone, Debug, PartialEq)]
pub struct PeltConfig {
    pub penalty: Penalty,
    /// Parameters estimated per segment; 2 for a joint mean/variance model.
    pub params_per_segment: usize,
    /// Drop candidates that can never again be optimal. Disabling this turns
    /// the search into plain optimal partitioning with the same result.
    pub pruning: bool,
    pub cancel_check_every: usize,
}

impl Default for PeltConfig {
    fn default() -> Self {
        Self {
            penalty: Penalty::Mbic,
            params_per_segment: 2,
            pruning: true,
            cancel_check_every: DEFAULT_CANCEL_CHECK_EVERY,
        }
    }
}

impl PeltConfig {
    fn validate(&self) -> Result<(), PlateauError> {
        if self.params_per_segment == 0 {
            return Err(PlateauError::invalid_input(
                "PeltConfig.params_per_segment must be >= 1; got 0",
            ));
        }
        if let Penalty::Manual(beta) = self.penalty
            && (!beta.is_finite() || beta <= 0.0)
        {
            return Err(PlateauError::invalid_input(format!(
                "PeltConfig.penalty Manual beta must be finite and > 0.0; got {beta}"
            )));
        }
        Ok(())
    }

    fn normalized_cancel_check_every(&self) -> usize {
        self.cancel_check_every.max(1)
    }
}

/// Pruned Exact Linear Time offline detector.
#[derive(Debug)]
pub struct Pelt<C: CostModel> {
    cost_model: C,
    config: PeltConfig,
}

impl<C: CostModel> Pelt<C> {
    pub fn new(cost_model: C, config: PeltConfig) -> Result<Self, PlateauError> {
        config.validate()?;
        Ok(Self { cost_model, config })
    }

    pub fn cost_model(&self) -> &C {
        &self.cost_model
    }

    pub fn config(&self) -> &PeltConfig {
        &self.config
    }
}

#[derive(Clone, Debug)]
struct KernelResult {
    breakpoints: Vec<usize>,
    change_count: usize,
    objective: f64,
}

#[derive(Default, Clone, Copy, Debug)]
struct RuntimeStats {
    cost_evals: usize,
    candidates_considered: usize,
    candidates_pruned: usize,
}

fn checked_counter_increment(counter: &mut usize, name: &str) -> Result<(), PlateauError> {
    *counter = counter
        .checked_add(1)
        .ok_or_else(|| PlateauError::numerical_issue(format!("{name} counter overflow")))?;
    Ok(())
}

fn resolve_penalty_beta(
    penalty: &Penalty,
    n: usize,
    params_per_segment: usize,
) -> Result<f64, PlateauError> {
    let beta = penalty_value(penalty, n, params_per_segment)?;
    if !beta.is_finite() || beta <= 0.0 {
        return Err(PlateauError::invalid_input(format!(
            "resolved penalty must be finite and > 0.0; got beta={beta} for {} at n={n}",
            penalty.name()
        )));
    }
    Ok(beta)
}

struct SearchParams {
    beta: f64,
    charge_segment_length: bool,
    min_segment_len: usize,
    prune_candidates: bool,
    /// How much a split can cost over the merged segment; ln(n) when each
    /// segment is charged ln(length), zero otherwise.
    pruning_slack: f64,
    cancel_check_every: usize,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    tau: usize,
    /// Target at which the pruning test first failed for this candidate.
    pruned_at: Option<usize>,
}

fn evaluate_segment_cost<C: CostModel>(
    model: &C,
    cache: &C::Cache,
    start: usize,
    end: usize,
    charge_segment_length: bool,
    runtime: &mut RuntimeStats,
) -> Result<f64, PlateauError> {
    checked_counter_increment(&mut runtime.cost_evals, "cost_evals")?;

    let mut segment_cost = model.segment_cost(cache, start, end);
    if charge_segment_length {
        segment_cost += ((end - start) as f64).ln();
    }
    if !segment_cost.is_finite() {
        return Err(PlateauError::numerical_issue(format!(
            "non-finite segment cost at [{start}, {end}): {segment_cost}"
        )));
    }
    Ok(segment_cost)
}

fn reconstruct_breakpoints(
    n: usize,
    last_cp: &[usize],
) -> Result<(Vec<usize>, usize), PlateauError> {
    let mut reverse = vec![n];
    let mut cursor = n;
    let mut hops = 0usize;

    while cursor > 0 {
        hops = hops
            .checked_add(1)
            .ok_or_else(|| PlateauError::numerical_issue("breakpoint backtrack hop overflow"))?;
        if hops > n + 1 {
            return Err(PlateauError::numerical_issue(
                "invalid DP backtrack state: cycle detected",
            ));
        }

        let tau = last_cp[cursor];
        if tau == usize::MAX {
            return Err(PlateauError::numerical_issue(format!(
                "invalid DP backtrack state: missing predecessor at t={cursor}"
            )));
        }
        if tau >= cursor {
            return Err(PlateauError::numerical_issue(format!(
                "invalid DP backtrack state: predecessor tau={tau} is not < t={cursor}"
            )));
        }
        if tau == 0 {
            break;
        }
        reverse.push(tau);
        cursor = tau;
    }

    reverse.reverse();
    let change_count = reverse.len().saturating_sub(1);
    Ok((reverse, change_count))
}

fn run_pelt_penalized<C: CostModel>(
    model: &C,
    cache: &C::Cache,
    n: usize,
    params: &SearchParams,
    ctx: &ExecutionContext<'_>,
    started_at: Instant,
    runtime: &mut RuntimeStats,
) -> Result<KernelResult, PlateauError> {
    let beta = params.beta;
    if !beta.is_finite() || beta <= 0.0 {
        return Err(PlateauError::invalid_input(format!(
            "run_pelt_penalized requires finite beta > 0; got {beta}"
        )));
    }

    let mut f = vec![f64::INFINITY; n + 1];
    let mut last_cp = vec![usize::MAX; n + 1];
    f[0] = -beta;
    last_cp[0] = 0;

    let mut candidate_set = vec![Candidate {
        tau: 0,
        pruned_at: None,
    }];

    for t in 1..=n {
        let target_idx = t - 1;
        ctx.check_interrupted_every(target_idx, params.cancel_check_every, started_at)?;

        // A candidate marked at `marked` leaves once `marked` can itself
        // start a feasible final segment ending at `t`.
        if params.prune_candidates {
            let before = candidate_set.len();
            candidate_set.retain(|candidate| {
                candidate
                    .pruned_at
                    .is_none_or(|marked| t - marked < params.min_segment_len)
            });
            for _ in candidate_set.len()..before {
                checked_counter_increment(&mut runtime.candidates_pruned, "candidates_pruned")?;
            }
        }

        let mut scored = vec![None; candidate_set.len()];
        let mut best_cost = f64::INFINITY;
        let mut best_tau = usize::MAX;

        for (idx, candidate) in candidate_set.iter().enumerate() {
            let tau = candidate.tau;
            if t - tau < params.min_segment_len || !f[tau].is_finite() {
                continue;
            }

            let segment_cost = evaluate_segment_cost(
                model,
                cache,
                tau,
                t,
                params.charge_segment_length,
                runtime,
            )?;
            checked_counter_increment(&mut runtime.candidates_considered, "candidates_considered")?;

            let score_no_penalty = f[tau] + segment_cost;
            let total = score_no_penalty + beta;
            if !total.is_finite() {
                return Err(PlateauError::numerical_issue(format!(
                    "non-finite objective at t={t}, tau={tau}: F(tau)={}, segment_cost={segment_cost}, beta={beta}",
                    f[tau]
                )));
            }

            scored[idx] = Some(score_no_penalty);

            if total < best_cost || (total == best_cost && tau < best_tau) {
                best_cost = total;
                best_tau = tau;
            }
        }

        if best_tau != usize::MAX {
            f[t] = best_cost;
            last_cp[t] = best_tau;
        }

        if params.prune_candidates && f[t].is_finite() {
            for (candidate, score) in candidate_set.iter_mut().zip(&scored) {
                if candidate.pruned_at.is_none()
                    && let Some(score_no_penalty) = *score
                    && score_no_penalty - params.pruning_slack > f[t]
                {
                    candidate.pruned_at = Some(t);
                }
            }
        }

        if t < n {
            candidate_set.push(Candidate {
                tau: t,
                pruned_at: None,
            });
        }
    }

    if !f[n].is_finite() {
        return Err(PlateauError::insufficient_data(format!(
            "no feasible segmentation of n={n} samples with min_segment_len={}",
            params.min_segment_len
        )));
    }

    let (breakpoints, change_count) = reconstruct_breakpoints(n, &last_cp)?;
    Ok(KernelResult {
        breakpoints,
        change_count,
        objective: f[n],
    })
}

impl<C: CostModel> OfflineDetector for Pelt<C> {
    fn detect(
        &self,
        x: &Sequence<'_>,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Segmentation, PlateauError> {
        self.config.validate()?;
        ctx.constraints.validate()?;
        self.cost_model.validate(x)?;

        let n = x.len();
        let min_segment_len = ctx
            .constraints
            .min_segment_len
            .max(self.cost_model.min_segment_len());
        let started_at = Instant::now();
        let mut notes = vec![];

        // Fewer than two minimum-length segments: no split is feasible.
        if n < min_segment_len.saturating_mul(2) {
            notes.push(format!(
                "n={n} is shorter than two segments of min_segment_len={min_segment_len}; returning a single segment"
            ));
            let diagnostics = Diagnostics {
                n,
                notes,
                algorithm: Cow::Borrowed("pelt"),
                cost_model: Cow::Borrowed(self.cost_model.name()),
                repro_mode: ctx.repro_mode,
                ..Diagnostics::default()
            };
            return Segmentation::new(n, vec![n], diagnostics);
        }

        let cache = self.cost_model.precompute(x, ctx.repro_mode)?;
        let beta = resolve_penalty_beta(&self.config.penalty, n, self.config.params_per_segment)?;
        let charge_segment_length = self.config.penalty.charges_segment_length();
        let params = SearchParams {
            beta,
            charge_segment_length,
            min_segment_len,
            prune_candidates: self.config.pruning,
            pruning_slack: if charge_segment_length {
                (n as f64).ln()
            } else {
                0.0
            },
            cancel_check_every: self.config.normalized_cancel_check_every(),
        };
        notes.push(format!(
            "penalty={}, beta={beta}, pruning={}",
            self.config.penalty.name(),
            self.config.pruning
        ));

        let mut runtime = RuntimeStats::default();
        let kernel = run_pelt_penalized(
            &self.cost_model,
            &cache,
            n,
            &params,
            ctx,
            started_at,
            &mut runtime,
        )?;

        let runtime_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::debug!(
            n,
            beta,
            change_count = kernel.change_count,
            cost_evals = runtime.cost_evals,
            candidates_pruned = runtime.candidates_pruned,
            runtime_ms,
            "pelt search finished"
        );

        notes.push(format!(
            "final_objective={}, change_count={}",
            kernel.objective, kernel.change_count
        ));
        notes.push(format!("cost_evals={}", runtime.cost_evals));

        let diagnostics = Diagnostics {
            n,
            runtime_ms: Some(runtime_ms),
            notes,
            algorithm: Cow::Borrowed("pelt"),
            cost_model: Cow::Borrowed(self.cost_model.name()),
            penalty_beta: Some(beta),
            objective: Some(kernel.objective),
            repro_mode: ctx.repro_mode,
            pruning_stats: Some(PruningStats {
                candidates_considered: runtime.candidates_considered,
                candidates_pruned: runtime.candidates_pruned,
            }),
            ..Diagnostics::default()
        };

        Segmentation::new(n, kernel.breakpoints, diagnostics)
    }
}
