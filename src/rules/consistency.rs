//! Static, data-only analysis of the validation configuration.
//!
//! Runs once per load, independent of market data, and never fails on a
//! parseable config: every structural defect becomes a
//! [`ConsistencyIssue`]. Issues are emitted per check, in a fixed category
//! order (contradiction, redundancy, circular, unreachable, conflicting
//! threshold).

use crate::models::issue::{ConsistencyIssue, IssueKind, Severity};
use crate::models::rule::{RuleRef, RuleSpec};
use crate::models::validation::ValidationConfig;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// An all-of block found anywhere in the validation tree. Top-level side
/// lists count as implicit all-of blocks.
struct AllOfGroup {
    label: String,
    /// Named rules listed directly in the block.
    members: BTreeSet<String>,
    /// Named rules the block requires, directly or transitively.
    dependencies: BTreeSet<String>,
}

pub struct ConsistencyChecker<'a> {
    config: &'a ValidationConfig,
}

impl<'a> ConsistencyChecker<'a> {
    pub fn new(config: &'a ValidationConfig) -> Self {
        Self { config }
    }

    /// Run all checks and union their findings.
    pub fn check(&self) -> Vec<ConsistencyIssue> {
        let graph = self.dependency_graph();
        let groups = self.all_of_groups(&graph);

        let mut issues = Vec::new();
        issues.extend(self.check_contradictions(&groups));
        issues.extend(self.check_redundancy(&graph, &groups));
        issues.extend(self.check_circular(&graph));
        issues.extend(self.check_unreachable(&graph));
        issues.extend(self.check_conflicting_thresholds());
        issues
    }

    /// Direct dependency edges between named rules.
    fn dependency_graph(&self) -> BTreeMap<String, Vec<String>> {
        self.config
            .rules
            .iter()
            .map(|(name, spec)| (name.clone(), spec.direct_dependencies()))
            .collect()
    }

    /// Transitive dependency closure of a named rule (excluding itself
    /// unless it is part of a cycle).
    fn closure(graph: &BTreeMap<String, Vec<String>>, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<String> = graph.get(name).cloned().unwrap_or_default().into();
        while let Some(dep) = queue.pop_front() {
            if seen.insert(dep.clone()) {
                if let Some(next) = graph.get(&dep) {
                    queue.extend(next.iter().cloned());
                }
            }
        }
        seen
    }

    /// Dependency set of a rule reference: the name itself (if named) plus
    /// its closure.
    fn ref_dependencies(graph: &BTreeMap<String, Vec<String>>, rule: &RuleRef) -> BTreeSet<String> {
        let mut deps = BTreeSet::new();
        match rule {
            RuleRef::Named(name) => {
                deps.insert(name.clone());
                deps.extend(Self::closure(graph, name));
            }
            RuleRef::Inline(spec) => {
                for name in spec.direct_dependencies() {
                    deps.extend(Self::closure(graph, &name));
                    deps.insert(name);
                }
            }
        }
        deps
    }

    /// Collect every all-of block in the tree: implicit side lists, named
    /// `all_of` rules, and inline `all_of` specs.
    fn all_of_groups(&self, graph: &BTreeMap<String, Vec<String>>) -> Vec<AllOfGroup> {
        let mut groups = Vec::new();

        let mut timeframes: Vec<_> = self.config.timeframes.iter().collect();
        timeframes.sort_by(|a, b| a.0.cmp(b.0));
        for (tf, sides) in timeframes {
            self.collect_list_groups(graph, &format!("{tf}.long"), &sides.long, &mut groups);
            self.collect_list_groups(graph, &format!("{tf}.short"), &sides.short, &mut groups);
        }
        self.collect_list_groups(
            graph,
            "filters_mandatory",
            &self.config.filters_mandatory,
            &mut groups,
        );
        self.collect_list_groups(
            graph,
            "execution_selector.guards",
            &self.config.execution_selector.guards,
            &mut groups,
        );

        for (name, spec) in &self.config.rules {
            if let RuleSpec::AllOf { children } = spec {
                groups.push(Self::group_from_children(graph, name.clone(), children));
            }
            self.collect_nested_groups(graph, name, spec, &mut groups);
        }

        groups
    }

    /// A top-level list is an implicit all-of; nested inline all_of specs
    /// inside it are separate groups.
    fn collect_list_groups(
        &self,
        graph: &BTreeMap<String, Vec<String>>,
        label: &str,
        rules: &[RuleRef],
        groups: &mut Vec<AllOfGroup>,
    ) {
        groups.push(Self::group_from_children(graph, label.to_string(), rules));
        for (i, rule) in rules.iter().enumerate() {
            if let RuleRef::Inline(spec) = rule {
                self.collect_nested_groups(graph, &format!("{label}[{i}]"), spec, groups);
            }
        }
    }

    fn collect_nested_groups(
        &self,
        graph: &BTreeMap<String, Vec<String>>,
        label: &str,
        spec: &RuleSpec,
        groups: &mut Vec<AllOfGroup>,
    ) {
        match spec {
            RuleSpec::AllOf { children } | RuleSpec::AnyOf { children } => {
                if matches!(spec, RuleSpec::AllOf { .. }) && label.contains('[') {
                    groups.push(Self::group_from_children(graph, label.to_string(), children));
                }
                for (i, child) in children.iter().enumerate() {
                    if let RuleRef::Inline(nested) = child {
                        self.collect_nested_groups(graph, &format!("{label}[{i}]"), nested, groups);
                    }
                }
            }
            _ => {}
        }
    }

    fn group_from_children(
        graph: &BTreeMap<String, Vec<String>>,
        label: String,
        children: &[RuleRef],
    ) -> AllOfGroup {
        let mut members = BTreeSet::new();
        let mut dependencies = BTreeSet::new();
        for child in children {
            if let RuleRef::Named(name) = child {
                members.insert(name.clone());
            }
            dependencies.extend(Self::ref_dependencies(graph, child));
        }
        AllOfGroup { label, members, dependencies }
    }

    /// Configured mutually-exclusive pairs that end up conjoined in the
    /// same all-of block.
    fn check_contradictions(&self, groups: &[AllOfGroup]) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        for (a, b) in &self.config.conflict_pairs {
            if let Some(group) = groups
                .iter()
                .find(|g| g.dependencies.contains(a) && g.dependencies.contains(b))
            {
                issues.push(
                    ConsistencyIssue::new(
                        IssueKind::Contradiction,
                        Severity::High,
                        format!(
                            "mutually exclusive rules '{a}' and '{b}' are required together in '{}'",
                            group.label
                        ),
                        vec![a.clone(), b.clone()],
                    )
                    .with_detail("block", json!(group.label)),
                );
            }
        }
        issues
    }

    /// One rule's closure already contains the other, yet both are listed
    /// side by side in the same all-of block. Only direct members count;
    /// a dependency pulled in transitively is not a defect.
    fn check_redundancy(
        &self,
        graph: &BTreeMap<String, Vec<String>>,
        groups: &[AllOfGroup],
    ) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        let mut reported: BTreeSet<(String, String)> = BTreeSet::new();
        for outer in self.config.rules.keys() {
            let closure = Self::closure(graph, outer);
            for inner in &closure {
                if inner == outer || !self.config.rules.contains_key(inner) {
                    continue;
                }
                let key = (outer.clone(), inner.clone());
                if reported.contains(&key) {
                    continue;
                }
                if let Some(group) = groups
                    .iter()
                    .find(|g| g.members.contains(outer) && g.members.contains(inner))
                {
                    reported.insert(key);
                    issues.push(
                        ConsistencyIssue::new(
                            IssueKind::Redundancy,
                            Severity::Medium,
                            format!(
                                "'{inner}' is already implied by '{outer}' but both are listed in '{}'",
                                group.label
                            ),
                            vec![outer.clone(), inner.clone()],
                        )
                        .with_detail("block", json!(group.label)),
                    );
                }
            }
        }
        issues
    }

    /// Two-node cycles only; longer cycles are out of scope for this
    /// checker.
    fn check_circular(&self, graph: &BTreeMap<String, Vec<String>>) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        for (a, deps) in graph {
            for b in deps {
                if b <= a {
                    continue;
                }
                let reciprocal = graph.get(b).map(|d| d.contains(a)).unwrap_or(false);
                if reciprocal {
                    issues.push(ConsistencyIssue::new(
                        IssueKind::CircularDependency,
                        Severity::High,
                        format!("rules '{a}' and '{b}' reference each other"),
                        vec![a.clone(), b.clone()],
                    ));
                }
            }
        }
        issues
    }

    /// Named rules never referenced by any timeframe tree, mandatory
    /// filter, or selector guard, directly or transitively.
    fn check_unreachable(&self, graph: &BTreeMap<String, Vec<String>>) -> Vec<ConsistencyIssue> {
        let mut reachable = BTreeSet::new();
        let mut roots: Vec<&RuleRef> = Vec::new();
        for sides in self.config.timeframes.values() {
            roots.extend(sides.long.iter());
            roots.extend(sides.short.iter());
        }
        roots.extend(self.config.filters_mandatory.iter());
        roots.extend(self.config.execution_selector.guards.iter());

        for root in roots {
            reachable.extend(Self::ref_dependencies(graph, root));
        }

        self.config
            .rules
            .keys()
            .filter(|name| !reachable.contains(*name))
            .map(|name| {
                ConsistencyIssue::new(
                    IssueKind::UnreachableRule,
                    Severity::Low,
                    format!("rule '{name}' is defined but never referenced"),
                    vec![name.clone()],
                )
            })
            .collect()
    }

    /// Threshold rules whose band is empty.
    fn check_conflicting_thresholds(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        for (name, spec) in &self.config.rules {
            Self::collect_threshold_conflicts(name, spec, &mut issues);
        }
        let mut timeframes: Vec<_> = self.config.timeframes.iter().collect();
        timeframes.sort_by(|a, b| a.0.cmp(b.0));
        for (tf, sides) in timeframes {
            for (i, rule) in sides.long.iter().enumerate() {
                if let RuleRef::Inline(spec) = rule {
                    Self::collect_threshold_conflicts(&format!("{tf}.long[{i}]"), spec, &mut issues);
                }
            }
            for (i, rule) in sides.short.iter().enumerate() {
                if let RuleRef::Inline(spec) = rule {
                    Self::collect_threshold_conflicts(&format!("{tf}.short[{i}]"), spec, &mut issues);
                }
            }
        }
        for (i, rule) in self.config.filters_mandatory.iter().enumerate() {
            if let RuleRef::Inline(spec) = rule {
                Self::collect_threshold_conflicts(&format!("filters_mandatory[{i}]"), spec, &mut issues);
            }
        }
        for (i, rule) in self.config.execution_selector.guards.iter().enumerate() {
            if let RuleRef::Inline(spec) = rule {
                Self::collect_threshold_conflicts(
                    &format!("execution_selector.guards[{i}]"),
                    spec,
                    &mut issues,
                );
            }
        }
        issues
    }

    fn collect_threshold_conflicts(label: &str, spec: &RuleSpec, issues: &mut Vec<ConsistencyIssue>) {
        match spec {
            RuleSpec::FieldThreshold { field, min: Some(min), max: Some(max), .. } if min > max => {
                issues.push(
                    ConsistencyIssue::new(
                        IssueKind::ConflictingThreshold,
                        Severity::High,
                        format!("'{label}' constrains '{field}' to an empty band (min {min} > max {max})"),
                        vec![label.to_string()],
                    )
                    .with_detail("min", json!(min))
                    .with_detail("max", json!(max)),
                );
            }
            RuleSpec::AllOf { children } | RuleSpec::AnyOf { children } => {
                for (i, child) in children.iter().enumerate() {
                    if let RuleRef::Inline(nested) = child {
                        Self::collect_threshold_conflicts(&format!("{label}[{i}]"), nested, issues);
                    }
                }
            }
            _ => {}
        }
    }
}
