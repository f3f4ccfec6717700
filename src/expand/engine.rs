//! Resolves scanned segments against a [`VarStore`].

use super::UnsetPolicy;
use super::parser::{Op, Segment};
use crate::{error::ExpandError, store::VarStore};
use tracing::debug;

/// Append the expansion of `seg` to `out`.
///
/// `:=` writes to `store` immediately, so later segments observe it.
pub fn resolve<S: VarStore + ?Sized>(
    seg: &Segment<'_>,
    store: &mut S,
    policy: UnsetPolicy,
    out: &mut String,
) -> Result<(), ExpandError> {
    match *seg {
        Segment::Lit(text) => out.push_str(text),

        Segment::Var { name, raw } => match lookup(store, name) {
            Some(v) => out.push_str(&v),
            None => {
                if policy == UnsetPolicy::Keep {
                    debug!(var = name, "unset variable kept as literal");
                    out.push_str(raw);
                }
            }
        },

        Segment::Op { name, op, operand } => {
            let value = lookup(store, name);
            match (op, value) {
                (Op::Default | Op::Required | Op::Assign, Some(v)) => out.push_str(&v),
                (Op::Default, None) => out.push_str(operand),
                (Op::Alternate, Some(_)) => out.push_str(operand),
                (Op::Alternate, None) => {}
                (Op::Required, None) => {
                    return Err(ExpandError::Required {
                        name: name.to_owned(),
                        message: operand.to_owned(),
                    });
                }
                (Op::Assign, None) => {
                    debug!(var = name, value = operand, "assigning default");
                    store.set(name, operand);
                    out.push_str(operand);
                }
            }
        }
    }

    Ok(())
}

/// Set and non-empty, or nothing.
fn lookup<S: VarStore + ?Sized>(store: &S, name: &str) -> Option<String> {
    store.get(name).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn store(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn op(name: &'static str, op: Op, operand: &'static str) -> Segment<'static> {
        Segment::Op { name, op, operand }
    }

    fn run(seg: Segment<'_>, vars: &mut HashMap<String, String>) -> Result<String, ExpandError> {
        let mut out = String::new();
        resolve(&seg, vars, UnsetPolicy::Empty, &mut out)?;
        Ok(out)
    }

    #[test]
    fn empty_value_counts_as_unset() {
        let mut vars = store(&[("E", "")]);
        assert_eq!(run(op("E", Op::Default, "d"), &mut vars).unwrap(), "d");
        assert_eq!(run(op("E", Op::Alternate, "a"), &mut vars).unwrap(), "");
        assert!(run(op("E", Op::Required, "m"), &mut vars).is_err());
    }

    #[test]
    fn assign_only_writes_when_unset() {
        let mut vars = store(&[("SET", "v")]);

        assert_eq!(run(op("SET", Op::Assign, "x"), &mut vars).unwrap(), "v");
        assert_eq!(vars["SET"], "v");

        assert_eq!(run(op("NEW", Op::Assign, "x"), &mut vars).unwrap(), "x");
        assert_eq!(vars["NEW"], "x");
    }

    #[test]
    fn required_error_carries_name_and_message() {
        let mut vars = store(&[]);
        let err = run(op("DB_URL", Op::Required, "needed for startup"), &mut vars).unwrap_err();
        assert_eq!(
            err.to_string(),
            "variable 'DB_URL' is unset or empty: needed for startup"
        );
    }

    #[test]
    fn keep_policy_emits_raw_placeholder() {
        let mut vars = store(&[]);
        let mut out = String::new();
        let seg = Segment::Var {
            name: "NOPE",
            raw: "${NOPE}",
        };
        resolve(&seg, &mut vars, UnsetPolicy::Keep, &mut out).unwrap();
        assert_eq!(out, "${NOPE}");
    }
}
