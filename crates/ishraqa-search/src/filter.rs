use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One entry of the renderer's facet filter list.
///
/// The outer list is AND-combined; tokens inside an `AnyOf` group are
/// OR-combined. Tokens have the form `field:value`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FacetFilter {
    Single(String),
    AnyOf(Vec<String>),
}

impl FacetFilter {
    pub fn single(token: impl Into<String>) -> Self {
        Self::Single(token.into())
    }

    pub fn any_of<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnyOf(tokens.into_iter().map(Into::into).collect())
    }

    fn clause(&self) -> Result<Option<String>> {
        match self {
            Self::Single(token) => Ok(Some(equality(token)?)),
            Self::AnyOf(tokens) => match tokens.as_slice() {
                [] => Ok(None),
                [token] => Ok(Some(equality(token)?)),
                tokens => {
                    let parts = tokens
                        .iter()
                        .map(|t| equality(t))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(Some(format!("({})", parts.join(" OR "))))
                }
            },
        }
    }
}

/// Split a `field:value` token on its first `:`.
pub fn parse_token(token: &str) -> Result<(&str, &str)> {
    match token.split_once(':') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value)),
        _ => bail!("Malformed facet filter token {:?}, expected \"field:value\"", token),
    }
}

fn equality(token: &str) -> Result<String> {
    let (field, value) = parse_token(token)?;
    Ok(format!("{} = \"{}\"", field, escape_value(value)))
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Build the backend filter expression.
///
/// Returns `None` when no clause survives, so callers can omit the
/// parameter entirely instead of sending an empty string.
pub fn build_filter_expression(filters: &[FacetFilter]) -> Result<Option<String>> {
    let mut clauses = Vec::with_capacity(filters.len());
    for filter in filters {
        if let Some(clause) = filter.clause()? {
            clauses.push(clause);
        }
    }

    if clauses.is_empty() {
        Ok(None)
    } else {
        Ok(Some(clauses.join(" AND ")))
    }
}
