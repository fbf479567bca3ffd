//! Unit System Capability
//!
//! The validators only need two things from a unit system: whether a unit
//! string is recognized, and converting a magnitude between two units. That
//! contract is the [`UnitSystem`] trait. [`UnitRegistry`] is the built-in
//! implementation: SI base and derived units, a handful of common lab units,
//! metric prefixes, and compound expressions such as `kg/m^3` or `J/(mol*K)`
//! written as `J/mol/K`. Factors read left to right, so `/` applies only to
//! the factor right after it (`J/mol*K` is `J*K/mol`).
//!
//! # Examples
//!
//! ```rust
//! use cript_core::validation::{UnitRegistry, UnitSystem};
//!
//! let units = UnitRegistry::new();
//! let pa = units.convert(0.05, "kPa", "Pa").unwrap();
//! assert!((pa - 50.0).abs() < 1e-9);
//! assert!(units.convert(1.0, "kPa", "m").is_err());
//! ```

use std::collections::HashMap;
use thiserror::Error;

/// Exponents over (m, kg, s, A, K, mol, cd)
type Dimension = [i8; 7];

const DIMENSIONLESS: Dimension = [0, 0, 0, 0, 0, 0, 0];
const LENGTH: Dimension = [1, 0, 0, 0, 0, 0, 0];
const MASS: Dimension = [0, 1, 0, 0, 0, 0, 0];
const TIME: Dimension = [0, 0, 1, 0, 0, 0, 0];
const CURRENT: Dimension = [0, 0, 0, 1, 0, 0, 0];
const TEMPERATURE: Dimension = [0, 0, 0, 0, 1, 0, 0];
const AMOUNT: Dimension = [0, 0, 0, 0, 0, 1, 0];
const LUMINOSITY: Dimension = [0, 0, 0, 0, 0, 0, 1];
const FREQUENCY: Dimension = [0, 0, -1, 0, 0, 0, 0];
const FORCE: Dimension = [1, 1, -2, 0, 0, 0, 0];
const PRESSURE: Dimension = [-1, 1, -2, 0, 0, 0, 0];
const ENERGY: Dimension = [2, 1, -2, 0, 0, 0, 0];
const POWER: Dimension = [2, 1, -3, 0, 0, 0, 0];
const CHARGE: Dimension = [0, 0, 1, 1, 0, 0, 0];
const VOLTAGE: Dimension = [2, 1, -3, -1, 0, 0, 0];
const RESISTANCE: Dimension = [2, 1, -3, -2, 0, 0, 0];
const VOLUME: Dimension = [3, 0, 0, 0, 0, 0, 0];

const PREFIXES: &[(&str, f64)] = &[
    ("Y", 1e24),
    ("Z", 1e21),
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("da", 1e1),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
];

/// Errors reported by a unit system
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// Unit expression could not be parsed or contains an unknown symbol
    #[error("Unknown unit: {0}")]
    Unknown(String),

    /// Units exist but measure different physical quantities
    #[error("Cannot convert from '{from}' to '{to}'")]
    Incompatible { from: String, to: String },
}

/// External unit-conversion capability consumed by the validators
pub trait UnitSystem: Send + Sync {
    /// Whether `unit` is recognized as any unit at all
    fn is_known(&self, unit: &str) -> bool;

    /// Convert `value` expressed in `from` into `to`
    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, UnitError>;
}

#[derive(Debug, Clone, Copy)]
struct UnitDef {
    factor: f64,
    offset: f64,
    dimension: Dimension,
    prefixable: bool,
}

impl UnitDef {
    const fn linear(factor: f64, dimension: Dimension, prefixable: bool) -> Self {
        Self {
            factor,
            offset: 0.0,
            dimension,
            prefixable,
        }
    }

    const fn affine(factor: f64, offset: f64) -> Self {
        Self {
            factor,
            offset,
            dimension: TEMPERATURE,
            prefixable: false,
        }
    }
}

/// Parsed unit expression reduced to SI
#[derive(Debug, Clone, Copy, PartialEq)]
struct Resolved {
    factor: f64,
    offset: f64,
    dimension: Dimension,
}

/// Table-driven [`UnitSystem`] implementation
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: HashMap<&'static str, UnitDef>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    /// Create a registry with the built-in unit table
    pub fn new() -> Self {
        let table: &[(&'static str, UnitDef)] = &[
            // SI base
            ("m", UnitDef::linear(1.0, LENGTH, true)),
            ("g", UnitDef::linear(1e-3, MASS, true)),
            ("s", UnitDef::linear(1.0, TIME, true)),
            ("A", UnitDef::linear(1.0, CURRENT, true)),
            ("K", UnitDef::linear(1.0, TEMPERATURE, true)),
            ("mol", UnitDef::linear(1.0, AMOUNT, true)),
            ("cd", UnitDef::linear(1.0, LUMINOSITY, true)),
            // SI derived
            ("Hz", UnitDef::linear(1.0, FREQUENCY, true)),
            ("N", UnitDef::linear(1.0, FORCE, true)),
            ("Pa", UnitDef::linear(1.0, PRESSURE, true)),
            ("J", UnitDef::linear(1.0, ENERGY, true)),
            ("W", UnitDef::linear(1.0, POWER, true)),
            ("C", UnitDef::linear(1.0, CHARGE, true)),
            ("V", UnitDef::linear(1.0, VOLTAGE, true)),
            ("ohm", UnitDef::linear(1.0, RESISTANCE, true)),
            ("Ω", UnitDef::linear(1.0, RESISTANCE, true)),
            ("L", UnitDef::linear(1e-3, VOLUME, true)),
            ("l", UnitDef::linear(1e-3, VOLUME, true)),
            // Common non-SI
            ("min", UnitDef::linear(60.0, TIME, false)),
            ("h", UnitDef::linear(3600.0, TIME, false)),
            ("hr", UnitDef::linear(3600.0, TIME, false)),
            ("day", UnitDef::linear(86400.0, TIME, false)),
            ("bar", UnitDef::linear(1e5, PRESSURE, true)),
            ("atm", UnitDef::linear(101_325.0, PRESSURE, false)),
            ("psi", UnitDef::linear(6_894.757_293_168, PRESSURE, false)),
            ("torr", UnitDef::linear(133.322_368_421, PRESSURE, false)),
            ("eV", UnitDef::linear(1.602_176_634e-19, ENERGY, true)),
            ("cal", UnitDef::linear(4.184, ENERGY, true)),
            ("Da", UnitDef::linear(1.660_539_066_60e-27, MASS, true)),
            ("angstrom", UnitDef::linear(1e-10, LENGTH, false)),
            ("Å", UnitDef::linear(1e-10, LENGTH, false)),
            ("percent", UnitDef::linear(1e-2, DIMENSIONLESS, false)),
            ("%", UnitDef::linear(1e-2, DIMENSIONLESS, false)),
            ("dimensionless", UnitDef::linear(1.0, DIMENSIONLESS, false)),
            // Temperature scales
            ("degC", UnitDef::affine(1.0, 273.15)),
            ("°C", UnitDef::affine(1.0, 273.15)),
            ("celsius", UnitDef::affine(1.0, 273.15)),
            ("degF", UnitDef::affine(5.0 / 9.0, 459.67 * 5.0 / 9.0)),
            ("°F", UnitDef::affine(5.0 / 9.0, 459.67 * 5.0 / 9.0)),
            ("fahrenheit", UnitDef::affine(5.0 / 9.0, 459.67 * 5.0 / 9.0)),
            // Long names
            ("meter", UnitDef::linear(1.0, LENGTH, false)),
            ("gram", UnitDef::linear(1e-3, MASS, false)),
            ("second", UnitDef::linear(1.0, TIME, false)),
            ("kelvin", UnitDef::linear(1.0, TEMPERATURE, false)),
            ("pascal", UnitDef::linear(1.0, PRESSURE, false)),
            ("liter", UnitDef::linear(1e-3, VOLUME, false)),
            ("minute", UnitDef::linear(60.0, TIME, false)),
            ("hour", UnitDef::linear(3600.0, TIME, false)),
        ];

        Self {
            units: table.iter().copied().collect(),
        }
    }

    fn lookup_symbol(&self, symbol: &str) -> Option<Resolved> {
        if let Some(def) = self.units.get(symbol) {
            return Some(Resolved {
                factor: def.factor,
                offset: def.offset,
                dimension: def.dimension,
            });
        }

        PREFIXES.iter().find_map(|(prefix, scale)| {
            let base = symbol.strip_prefix(prefix)?;
            let def = self.units.get(base)?;
            def.prefixable.then(|| Resolved {
                factor: def.factor * scale,
                offset: 0.0,
                dimension: def.dimension,
            })
        })
    }

    fn parse_factor(&self, token: &str) -> Option<(Resolved, i8)> {
        let (symbol, exponent) = match token.split_once("**").or_else(|| token.split_once('^')) {
            Some((symbol, exp)) => (symbol, exp.trim().parse::<i8>().ok()?),
            None => (token, 1),
        };
        self.lookup_symbol(symbol.trim()).map(|r| (r, exponent))
    }

    fn resolve(&self, unit: &str) -> Result<Resolved, UnitError> {
        let unit = unit.trim();
        if unit.is_empty() {
            return Err(UnitError::Unknown(unit.to_string()));
        }

        let normalized = unit.replace('·', "*");
        let mut factors = Vec::new();
        // `/` binds to the next factor only: `J/mol*K` is `J*K/mol`
        for (i, part) in normalized.split('/').enumerate() {
            let tokens = split_factors(part);
            if tokens.is_empty() {
                return Err(UnitError::Unknown(unit.to_string()));
            }
            for (j, token) in tokens.into_iter().enumerate() {
                let (resolved, exponent) = self
                    .parse_factor(token)
                    .ok_or_else(|| UnitError::Unknown(unit.to_string()))?;
                let exponent = if i > 0 && j == 0 {
                    exponent.checked_neg()
                } else {
                    Some(exponent)
                };
                let exponent = exponent.ok_or_else(|| UnitError::Unknown(unit.to_string()))?;
                factors.push((resolved, exponent));
            }
        }

        // A lone temperature scale keeps its offset; inside a compound it is a delta.
        if let [(single, 1)] = factors.as_slice() {
            return Ok(*single);
        }

        let mut combined = Resolved {
            factor: 1.0,
            offset: 0.0,
            dimension: DIMENSIONLESS,
        };
        for (resolved, exponent) in factors {
            combined.factor *= resolved.factor.powi(i32::from(exponent));
            for (slot, dim) in combined.dimension.iter_mut().zip(resolved.dimension) {
                *slot = dim
                    .checked_mul(exponent)
                    .and_then(|scaled| slot.checked_add(scaled))
                    .ok_or_else(|| UnitError::Unknown(unit.to_string()))?;
            }
        }
        Ok(combined)
    }
}

/// Split on `*` and space separators, keeping `**` power operators attached to their symbol
fn split_factors(part: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let bytes = part.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'*' {
            if bytes.get(i + 1) == Some(&b'*') {
                i += 2;
                continue;
            }
            tokens.push(&part[start..i]);
            start = i + 1;
        } else if bytes[i] == b' ' {
            tokens.push(&part[start..i]);
            start = i + 1;
        }
        i += 1;
    }
    tokens.push(&part[start..]);
    tokens.into_iter().filter(|t| !t.trim().is_empty()).collect()
}

impl UnitSystem for UnitRegistry {
    fn is_known(&self, unit: &str) -> bool {
        self.resolve(unit).is_ok()
    }

    fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;

        if source.dimension != target.dimension {
            return Err(UnitError::Incompatible {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let si = value * source.factor + source.offset;
        Ok((si - target.offset) / target.factor)
    }
}
