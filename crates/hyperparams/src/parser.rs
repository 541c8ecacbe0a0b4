//! Command-line hyperparameter parsing
//!
//! Turns `["--name", "value", ...]` into a [`Hyperparameters`] map with
//! every value passed through [`infer_dtype`].

use crate::hyperparameters::Hyperparameters;
use crate::value::infer_dtype;

/// Number of leading characters stripped from a flag token (`--`).
pub const FLAG_PREFIX_LEN: usize = 2;

/// A `(key, value)` pair taken positionally from a token sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawArgument {
    pub key: String,
    pub value: String,
}

/// Pair up flag and value tokens.
///
/// A trailing flag without a value is dropped.
pub fn raw_arguments<I, S>(tokens: I) -> Vec<RawArgument>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = Vec::new();
    let mut it = tokens.into_iter();

    while let (Some(flag), Some(value)) = (it.next(), it.next()) {
        args.push(RawArgument {
            key: flag.as_ref().chars().skip(FLAG_PREFIX_LEN).collect(),
            value: value.as_ref().to_string(),
        });
    }

    args
}

/// Parse `["--name", "value", ...]` into typed hyperparameters.
///
/// Duplicate keys keep the last value.
pub fn parse_hyperparameters<I, S>(tokens: I) -> Hyperparameters
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hp = Hyperparameters::new();
    for arg in raw_arguments(tokens) {
        let value = infer_dtype(&arg.value);
        tracing::trace!("hyperparameter {} = {:?}", arg.key, value);
        hp.insert(arg.key, value);
    }
    hp
}
