//! Boolean rule-composition engine.
//!
//! Evaluation is a pure function of `(spec, context)`: no I/O, no mutation,
//! no hidden state. Missing context fields and unknown rule names fail the
//! rule instead of raising.

use crate::models::context::IndicatorContext;
use crate::models::rule::{CompareOp, Operand, RuleOutcome, RuleOverrides, RuleRef, RuleSpec, ThresholdOp};
use crate::models::validation::ValidationConfig;
use serde_json::json;

/// Named-reference chains deeper than this are treated as failed rules
/// rather than resolved further. The consistency checker reports two-node
/// cycles; the cap keeps longer ones (through aliases or composition
/// children) from recursing unboundedly at evaluation time.
const MAX_RESOLUTION_DEPTH: usize = 8;

pub struct RuleEngine<'a> {
    config: &'a ValidationConfig,
}

impl<'a> RuleEngine<'a> {
    pub fn new(config: &'a ValidationConfig) -> Self {
        Self { config }
    }

    /// Evaluate a rule spec against a context.
    pub fn evaluate(&self, spec: &RuleSpec, ctx: &IndicatorContext) -> RuleOutcome {
        self.evaluate_at_depth(spec, ctx, 0)
    }

    /// Evaluate a rule reference: named rules resolve against the rule
    /// table; unknown names fail.
    pub fn evaluate_ref(&self, rule: &RuleRef, ctx: &IndicatorContext) -> RuleOutcome {
        self.evaluate_ref_at_depth(rule, ctx, 0)
    }

    fn evaluate_ref_at_depth(&self, rule: &RuleRef, ctx: &IndicatorContext, depth: usize) -> RuleOutcome {
        match rule {
            RuleRef::Named(name) => {
                // Every table lookup consumes depth so that cyclic named
                // rules bottom out instead of overflowing the stack.
                if depth >= MAX_RESOLUTION_DEPTH {
                    return RuleOutcome::failed(None)
                        .with_meta("resolution_depth_exceeded", json!(name));
                }
                match self.config.rule(name) {
                    Some(spec) => self.evaluate_at_depth(spec, ctx, depth + 1),
                    None => RuleOutcome::failed(None).with_meta("unknown_rule", json!(name)),
                }
            }
            RuleRef::Inline(spec) => self.evaluate_at_depth(spec, ctx, depth),
        }
    }

    fn evaluate_at_depth(&self, spec: &RuleSpec, ctx: &IndicatorContext, depth: usize) -> RuleOutcome {
        match spec {
            RuleSpec::FieldThreshold { field, op, value, eps, min, max } => {
                Self::eval_field_threshold(ctx, field, *op, *value, *eps, *min, *max)
            }
            RuleSpec::BinaryCompare { op, left, right, eps } => {
                Self::eval_binary_compare(ctx, *op, left, right, *eps)
            }
            RuleSpec::AllOf { children } => {
                // Empty all_of is vacuously true.
                let mut passed = true;
                for child in children {
                    if !self.evaluate_ref_at_depth(child, ctx, depth).passed {
                        passed = false;
                    }
                }
                RuleOutcome { passed, value: None, meta: Default::default() }
                    .with_meta("children", json!(children.len()))
            }
            RuleSpec::AnyOf { children } => {
                let mut passed = false;
                for child in children {
                    if self.evaluate_ref_at_depth(child, ctx, depth).passed {
                        passed = true;
                    }
                }
                RuleOutcome { passed, value: None, meta: Default::default() }
                    .with_meta("children", json!(children.len()))
            }
            RuleSpec::Alias { name, overrides } => {
                if depth >= MAX_RESOLUTION_DEPTH {
                    return RuleOutcome::failed(None)
                        .with_meta("resolution_depth_exceeded", json!(name));
                }
                match self.resolve_alias(name, overrides) {
                    Some(resolved) => self.evaluate_at_depth(&resolved, ctx, depth + 1),
                    None => RuleOutcome::failed(None).with_meta("unknown_rule", json!(name)),
                }
            }
        }
    }

    /// Resolve an alias to a copy of its base with overrides applied. The
    /// shared base definition is never touched.
    pub fn resolve_alias(&self, name: &str, overrides: &RuleOverrides) -> Option<RuleSpec> {
        let base = self.config.rule(name)?.clone();
        Some(Self::apply_overrides(base, overrides))
    }

    fn apply_overrides(base: RuleSpec, overrides: &RuleOverrides) -> RuleSpec {
        match base {
            RuleSpec::FieldThreshold { field, op, value, eps, min, max } => {
                RuleSpec::FieldThreshold {
                    field: overrides.field.clone().unwrap_or(field),
                    op: overrides.op.unwrap_or(op),
                    value: overrides.value.unwrap_or(value),
                    eps: overrides.eps.unwrap_or(eps),
                    min: overrides.min.or(min),
                    max: overrides.max.or(max),
                }
            }
            RuleSpec::BinaryCompare { op, left, right, eps } => RuleSpec::BinaryCompare {
                op,
                left,
                right,
                eps: overrides.eps.unwrap_or(eps),
            },
            // Compositions and nested aliases take no field overrides.
            other => other,
        }
    }

    fn eval_field_threshold(
        ctx: &IndicatorContext,
        field: &str,
        op: ThresholdOp,
        value: f64,
        eps: f64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> RuleOutcome {
        let Some(actual) = ctx.get(field) else {
            return RuleOutcome::failed(None).with_meta("missing_field", json!(field));
        };
        let mut passed = match op {
            ThresholdOp::Lt => actual < value - eps,
            ThresholdOp::Gt => actual > value + eps,
            ThresholdOp::Eq => (actual - value).abs() <= eps,
        };
        if let Some(min) = min {
            passed = passed && actual >= min - eps;
        }
        if let Some(max) = max {
            passed = passed && actual <= max + eps;
        }
        RuleOutcome { passed, value: Some(actual), meta: Default::default() }
    }

    fn eval_binary_compare(
        ctx: &IndicatorContext,
        op: CompareOp,
        left: &Operand,
        right: &Operand,
        eps: f64,
    ) -> RuleOutcome {
        let (Some(l), Some(r)) = (Self::resolve_operand(ctx, left), Self::resolve_operand(ctx, right))
        else {
            return RuleOutcome::failed(None).with_meta("missing_operand", json!(true));
        };
        let passed = match op {
            CompareOp::Gt => l > r + eps,
            CompareOp::Lt => l < r - eps,
            CompareOp::Ge => l >= r - eps,
            CompareOp::Le => l <= r + eps,
        };
        RuleOutcome { passed, value: Some(l), meta: Default::default() }
    }

    fn resolve_operand(ctx: &IndicatorContext, operand: &Operand) -> Option<f64> {
        match operand {
            Operand::Literal(v) => Some(*v),
            Operand::Field(key) => ctx.get(key),
        }
    }
}
