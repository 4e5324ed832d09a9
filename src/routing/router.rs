//! Ordered rule evaluation.
//!
//! # Responsibilities
//! - Store the rule list in configuration order
//! - Evaluate rules one by one until a terminal outcome
//! - Return the redirect to emit, or an explicit pass-through
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - First terminal outcome wins, matched or not: a rule that matches the
//!   path but is disqualified shadows every later rule
//! - Per-rule pattern errors are logged and skipped, never fatal

use tracing::{debug, warn};

use crate::config::RedirectConfig;
use crate::routing::context::RequestTarget;
use crate::routing::resolver::{resolve_rule, MatchOutcome, Redirect, ResolveError};
use crate::routing::rule::Rule;

/// Final decision for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'r> {
    Redirect(Redirect<'r>),
    /// Let the request continue unmodified.
    PassThrough,
}

/// One rule's verdict, as recorded by [`Redirector::explain`].
#[derive(Debug)]
pub struct Evaluation<'r> {
    pub index: usize,
    pub rule: &'r Rule,
    pub result: Result<MatchOutcome<'r>, ResolveError>,
}

/// The compiled redirect table.
#[derive(Debug, Clone, Default)]
pub struct Redirector {
    rules: Vec<Rule>,
}

impl Redirector {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Build from configuration, keeping file order.
    pub fn from_config(configs: Vec<RedirectConfig>) -> Self {
        Self::new(configs.into_iter().map(Rule::from).collect())
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Walk the rules in order and decide what to do with the request.
    pub fn resolve(&self, target: &RequestTarget) -> Resolution<'_> {
        for (index, rule) in self.rules.iter().enumerate() {
            match resolve_rule(rule, &target.url, &target.context) {
                Ok(MatchOutcome::NoMatch) => continue,
                Ok(MatchOutcome::Redirect(redirect)) => {
                    debug!(rule = index, from = %rule.from, target = %redirect.target, "Rule matched");
                    return Resolution::Redirect(redirect);
                }
                Ok(MatchOutcome::Equivalent { target: resolved }) => {
                    debug!(rule = index, from = %rule.from, target = %resolved, "Rule points at the request itself");
                    return Resolution::PassThrough;
                }
                Ok(MatchOutcome::Disqualified(reason)) => {
                    debug!(rule = index, from = %rule.from, reason = reason.as_str(), "Rule disqualified");
                    return Resolution::PassThrough;
                }
                Err(ResolveError::InvalidRequestUrl) => {
                    warn!(url = %target.url, "Request url lacks host or scheme");
                    return Resolution::PassThrough;
                }
                Err(e) => {
                    warn!(rule = index, error = %e, "Skipping malformed rule");
                    continue;
                }
            }
        }

        Resolution::PassThrough
    }

    /// Every rule evaluated for `target`, up to and including the one that
    /// stopped the walk.
    pub fn explain(&self, target: &RequestTarget) -> Vec<Evaluation<'_>> {
        let mut evaluations = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            let result = resolve_rule(rule, &target.url, &target.context);
            let stop = match &result {
                Ok(outcome) => outcome.is_terminal(),
                Err(e) => matches!(e, ResolveError::InvalidRequestUrl),
            };
            evaluations.push(Evaluation {
                index,
                rule,
                result,
            });
            if stop {
                break;
            }
        }
        evaluations
    }
}
