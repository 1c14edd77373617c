//! Options file for the quilt pane engine.
//!
//! The file is KDL:
//!
//! ```kdl
//! layout {
//!     min-pane-size 0.05
//!     root-orientation "column"
//! }
//!
//! debug {
//!     verify-invariants
//! }
//! ```
//!
//! Every section and field is optional.

#[macro_use]
extern crate tracing;

use std::path::Path;

use knuffel::errors::DecodeError;
use miette::{IntoDiagnostic as _, WrapErr as _};

/// Smallest fraction a drag may leave a pane with, unless configured otherwise.
pub const DEFAULT_MIN_PANE_SIZE: f64 = 0.05;

#[derive(knuffel::Decode, Debug, Default, Clone, PartialEq)]
pub struct Config {
    #[knuffel(child, default)]
    pub layout: Layout,
    #[knuffel(child, default)]
    pub debug: DebugConfig,
}

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Layout {
    #[knuffel(child, unwrap(argument), default = Fraction(DEFAULT_MIN_PANE_SIZE))]
    pub min_pane_size: Fraction,
    #[knuffel(child, unwrap(argument), default)]
    pub root_orientation: RootOrientation,
}

#[derive(knuffel::DecodeScalar, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RootOrientation {
    #[default]
    Row,
    Column,
}

#[derive(knuffel::Decode, Debug, Default, Clone, PartialEq)]
pub struct DebugConfig {
    /// Check tree invariants after every mutation, also in release builds.
    #[knuffel(child)]
    pub verify_invariants: bool,
}

/// Fraction of a container in `[0, 0.5)`, written either as a decimal or as `0`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Fraction(pub f64);

impl Default for Layout {
    fn default() -> Self {
        Self {
            min_pane_size: Fraction(DEFAULT_MIN_PANE_SIZE),
            root_orientation: RootOrientation::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("error reading {path:?}"))?;

        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("config.kdl");
        let config = Self::parse(filename, &contents).wrap_err("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        knuffel::parse(filename, text)
    }
}

impl Fraction {
    fn check(value: f64) -> Result<Self, String> {
        if value.is_finite() && (0. ..0.5).contains(&value) {
            Ok(Fraction(value))
        } else {
            Err(format!("value must be at least 0 and below 0.5, got {value}"))
        }
    }
}

impl<S: knuffel::traits::ErrorSpan> knuffel::DecodeScalar<S> for Fraction {
    fn type_check(
        type_name: &Option<knuffel::span::Spanned<knuffel::ast::TypeName, S>>,
        ctx: &mut knuffel::decode::Context<S>,
    ) {
        if let Some(type_name) = &type_name {
            ctx.emit_error(DecodeError::unexpected(
                type_name,
                "type name",
                "no type name expected for this node",
            ));
        }
    }

    fn raw_decode(
        val: &knuffel::span::Spanned<knuffel::ast::Literal, S>,
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Fraction, DecodeError<S>> {
        let value = match &**val {
            knuffel::ast::Literal::Int(ref value) => match value.try_into() {
                Ok(v) => {
                    let v: i32 = v;
                    f64::from(v)
                }
                Err(e) => {
                    ctx.emit_error(DecodeError::conversion(val, e));
                    return Ok(Fraction::default());
                }
            },
            knuffel::ast::Literal::Decimal(ref value) => match value.try_into() {
                Ok(v) => v,
                Err(e) => {
                    ctx.emit_error(DecodeError::conversion(val, e));
                    return Ok(Fraction::default());
                }
            },
            _ => {
                ctx.emit_error(DecodeError::unsupported(
                    val,
                    "Unsupported value, only numbers are recognized",
                ));
                return Ok(Fraction::default());
            }
        };

        match Fraction::check(value) {
            Ok(fraction) => Ok(fraction),
            Err(message) => {
                ctx.emit_error(DecodeError::conversion(val, message));
                Ok(Fraction::default())
            }
        }
    }
}
