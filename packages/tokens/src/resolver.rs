//! # Token Resolver
//!
//! Pure lookup of dot-path tokens (`color.primary`, `spacing.md`) against a
//! [`TokenSchema`]. Misses return `None`; the `*_or` helpers fall back to a
//! caller-supplied default and log, so a missing token never aborts
//! compilation.
//!
//! Every resolver gets a fresh generation number. Caches keyed on resolved
//! values compare generations to notice that the token set was swapped.

use crate::error::TokenError;
use crate::schema::{TokenSchema, TokenValue};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use vellum_model::{normalize_hex_color, ColorValue, NumberValue};

const MAX_ALIAS_DEPTH: usize = 8;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
pub struct TokenResolver {
    values: HashMap<String, TokenValue>,
    generation: u64,
}

impl Default for TokenResolver {
    fn default() -> Self {
        Self::empty()
    }
}

impl TokenResolver {
    pub fn new(schema: &TokenSchema) -> Self {
        let values: HashMap<String, TokenValue> = schema.flatten().into_iter().collect();
        debug!(tokens = values.len(), "Loaded token schema");
        Self {
            values,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Resolver with no tokens; every reference falls back
    pub fn empty() -> Self {
        Self::new(&TokenSchema::default())
    }

    pub fn from_json(json: &str) -> Result<Self, TokenError> {
        let schema = TokenSchema::from_json(json)?;
        Ok(Self::new(&schema))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a token, following `{alias}` references
    pub fn resolve(&self, path: &str) -> Option<&TokenValue> {
        self.lookup(path).ok()
    }

    fn lookup(&self, path: &str) -> Result<&TokenValue, TokenError> {
        let mut current = path;
        for _ in 0..=MAX_ALIAS_DEPTH {
            let value = self
                .values
                .get(current)
                .ok_or_else(|| TokenError::Unresolved(path.to_string()))?;
            match value.alias_target() {
                Some(target) => current = target,
                None => return Ok(value),
            }
        }
        Err(TokenError::AliasDepth(path.to_string()))
    }

    pub fn number(&self, value: &NumberValue) -> Result<f64, TokenError> {
        match value {
            NumberValue::Fixed(n) => Ok(*n),
            NumberValue::Token(reference) => {
                let token = self.lookup(&reference.token)?;
                token.as_number().ok_or_else(|| TokenError::WrongKind {
                    path: reference.token.clone(),
                    expected: "number",
                })
            }
        }
    }

    /// Resolve to a normalized `#rrggbb` / `#rrggbbaa` color
    pub fn color(&self, value: &ColorValue) -> Result<String, TokenError> {
        let (raw, path) = match value {
            ColorValue::Literal(hex) => (hex.as_str(), None),
            ColorValue::Token(reference) => {
                let token = self.lookup(&reference.token)?;
                let raw = token.as_str().ok_or_else(|| TokenError::WrongKind {
                    path: reference.token.clone(),
                    expected: "color",
                })?;
                (raw, Some(reference.token.as_str()))
            }
        };
        normalize_hex_color(raw).ok_or_else(|| TokenError::WrongKind {
            path: path.unwrap_or(raw).to_string(),
            expected: "color",
        })
    }

    pub fn number_or(&self, value: &NumberValue, fallback: f64) -> f64 {
        self.number(value).unwrap_or_else(|err| {
            warn!(error = %err, fallback, "Falling back for unresolved number");
            fallback
        })
    }

    pub fn color_or(&self, value: &ColorValue, fallback: &str) -> String {
        self.color(value).unwrap_or_else(|err| {
            warn!(error = %err, fallback, "Falling back for unresolved color");
            fallback.to_string()
        })
    }
}
