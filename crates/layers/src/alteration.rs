//! Attribute overrides applied to markers in alter view.

use std::collections::BTreeMap;

use formats::{AlterationDocument, MarkerRecord, is_truthy};
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

pub const EVAL_SUFFIX: &str = "_eval";

/// How an `<attr>_eval` override combines with the existing value.
///
/// The set is closed: documents select the operator by suffix, never by code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Combinator {
    /// `base + sqrt(operand)`
    AddSqrt,
}

impl Combinator {
    pub fn combine(self, base: f64, operand: f64) -> Option<f64> {
        let out = match self {
            Combinator::AddSqrt => base + operand.sqrt(),
        };
        out.is_finite().then_some(out)
    }
}

/// One attribute of an alteration entry, classified by its key.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeOverride<'a> {
    /// Replaces a truthy existing value.
    Replace { attr: &'a str, value: &'a Value },
    /// Combines with the existing numeric value.
    Combine {
        attr: &'a str,
        combinator: Combinator,
        operand: &'a Value,
    },
}

impl<'a> AttributeOverride<'a> {
    pub fn classify(key: &'a str, value: &'a Value) -> Self {
        match key.strip_suffix(EVAL_SUFFIX) {
            Some(attr) if !attr.is_empty() => AttributeOverride::Combine {
                attr,
                combinator: Combinator::AddSqrt,
                operand: value,
            },
            _ => AttributeOverride::Replace { attr: key, value },
        }
    }
}

/// Marker lookup key: the name up to the first `" - "`, lowercased.
pub fn marker_key(name: &str) -> String {
    name.split(" - ").next().unwrap_or(name).to_lowercase()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlterationReport {
    /// Markers with at least one matching entry.
    pub matched: usize,
    pub applied: usize,
    /// Overrides of absent or falsy attributes.
    pub ignored: usize,
    /// `_eval` overrides that could not be combined.
    pub failed: usize,
}

/// Alteration documents of one layer, concatenated in load order.
#[derive(Debug, Clone, Default)]
pub struct AlterationSet {
    entries: BTreeMap<String, Vec<Map<String, Value>>>,
}

impl AlterationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, doc: AlterationDocument) {
        for rejected in &doc.rejected {
            warn!(entry = %rejected.key, "skipping alteration entry: {}", rejected.reason);
        }
        for entry in doc.entries {
            self.entries
                .entry(entry.key.to_lowercase())
                .or_default()
                .push(entry.attributes);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Applies every matching entry to `markers`; later entries win per attribute.
    pub fn apply(&self, markers: &mut [MarkerRecord]) -> AlterationReport {
        let mut report = AlterationReport::default();
        for marker in markers.iter_mut() {
            let Some(name) = marker.name() else {
                continue;
            };
            let key = marker_key(name);
            let Some(entries) = self.entries.get(&key) else {
                continue;
            };
            report.matched += 1;
            for attributes in entries {
                for (attr, value) in attributes {
                    if attr == "name" {
                        continue;
                    }
                    apply_override(marker, &key, AttributeOverride::classify(attr, value), &mut report);
                }
            }
        }
        report
    }
}

fn apply_override(
    marker: &mut MarkerRecord,
    key: &str,
    op: AttributeOverride<'_>,
    report: &mut AlterationReport,
) {
    match op {
        AttributeOverride::Replace { attr, value } => {
            if marker.get(attr).is_some_and(is_truthy) {
                marker.insert(attr, value.clone());
                report.applied += 1;
            } else {
                debug!(marker = key, attr, "override of absent attribute ignored");
                report.ignored += 1;
            }
        }
        AttributeOverride::Combine {
            attr,
            combinator,
            operand,
        } => {
            let Some(base) = marker.get(attr).cloned() else {
                debug!(marker = key, attr, "eval override of absent attribute ignored");
                report.ignored += 1;
                return;
            };
            let combined = base
                .as_f64()
                .zip(operand.as_f64())
                .and_then(|(b, o)| combinator.combine(b, o))
                .and_then(Number::from_f64);
            match combined {
                Some(n) => {
                    marker.insert(attr, Value::Number(n));
                    report.applied += 1;
                }
                None => {
                    warn!(
                        marker = key,
                        attr, "cannot combine {base} with {operand}, attribute left unchanged"
                    );
                    report.failed += 1;
                }
            }
        }
    }
}
