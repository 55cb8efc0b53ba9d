//! Fixed-point expression resolution over a field list
//!
//! Recomputes every computed field (non-edited, expression-bearing) from
//! the current values of all fields, repeating until a pass produces no
//! changes or the iteration cap is reached. Fields whose expression still
//! contains `{...}` after substitution are skipped for the pass and
//! retried on the next one.
//!
//! Cyclic formulas are not detected as errors: the cap simply stops
//! recomputation, leaving whatever partial values exist. Substitution
//! scans the list in order and reads values as they currently stand, so
//! fields updated earlier in a pass are visible to later ones; for an
//! acyclic dependency graph the result converges to the same fixed point
//! either way.

use std::collections::HashMap;

use crate::entities::{Field, FieldRole};
use crate::expressions::eval;

/// Hard cap on resolution passes; guarantees termination under cycles.
pub const MAX_ITERATIONS: usize = 10;

/// Recompute all computed fields and return the updated list.
///
/// The input is never mutated; callers swap in the returned list. Fields
/// with `edited == true` are terminal and keep their user-set value.
pub fn calculate_expressions(fields: &[Field]) -> Vec<Field> {
    let mut processed: Vec<Field> = fields.to_vec();
    let mut has_changes = true;
    let mut iterations = 0;

    while has_changes && iterations < MAX_ITERATIONS {
        has_changes = false;
        iterations += 1;

        for index in 0..processed.len() {
            if processed[index].role() != FieldRole::Computed {
                continue;
            }

            let substituted = substitute(&processed[index].expression, &processed);

            if substituted.contains('{') {
                // A referenced field has no value yet; retry next pass
                tracing::debug!(
                    field = %processed[index].name,
                    expression = %substituted,
                    "expression still has unresolved references"
                );
                continue;
            }

            match eval::evaluate(&substituted) {
                Ok(result) => {
                    let new_value = eval::render_value(result);
                    if new_value != processed[index].value {
                        processed[index].value = new_value;
                        has_changes = true;
                    }
                }
                Err(error) => {
                    // Field keeps its current value for this pass
                    tracing::warn!(
                        field = %processed[index].name,
                        expression = %substituted,
                        %error,
                        "expression rejected"
                    );
                }
            }
        }
    }

    if iterations >= MAX_ITERATIONS {
        tracing::warn!(iterations, "expression resolution hit the iteration cap");
    }

    processed
}

/// Replace `{name}` tokens with the named fields' current values.
///
/// Only fields with a non-empty value substitute; unknown or empty
/// references stay in place so the caller can see they are unresolved.
fn substitute(expression: &str, fields: &[Field]) -> String {
    let mut result = expression.to_string();
    for field in fields {
        if field.name.is_empty() || field.value.is_empty() {
            continue;
        }
        let token = format!("{{{}}}", field.name);
        if result.contains(&token) {
            result = result.replace(&token, &field.value);
        }
    }
    result
}

/// Dependency edges of a field list: name → referenced field names.
///
/// Handed to callers that want to inspect or report cycles up front; the
/// resolver itself never treats a cycle as an error.
pub fn dependency_graph(fields: &[Field]) -> HashMap<String, Vec<String>> {
    fields
        .iter()
        .filter(|field| !field.expression.is_empty())
        .map(|field| {
            (
                field.name.clone(),
                field
                    .referenced_fields()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            )
        })
        .collect()
}
