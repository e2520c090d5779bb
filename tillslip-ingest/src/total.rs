//! Grand total resolution: labeled line first, largest amount otherwise

use tracing::debug;

use crate::amount::{find_amounts, last_amount};

/// Where the total came from
#[derive(Debug, Clone, PartialEq)]
pub enum TotalSource {
    /// Last amount on the first line carrying a total keyword
    Keyword { keyword: String, line: usize },
    /// Largest positive amount anywhere on the receipt
    Maximum,
    /// No amount at all
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTotal {
    pub value: f64,
    pub source: TotalSource,
}

/// Resolve the receipt total. Keywords are matched against the lowercased
/// line; the result is never negative.
pub fn resolve_total<S: AsRef<str>>(lines: &[S], keywords: &[String]) -> ResolvedTotal {
    for (i, line) in lines.iter().enumerate() {
        let lower = line.as_ref().to_lowercase();
        let Some(keyword) = keywords.iter().find(|k| lower.contains(k.as_str())) else {
            continue;
        };
        // A labeled line with no usable amount does not end the search
        match last_amount(&lower) {
            Some(token) if token.value > 0.0 => {
                debug!(keyword = %keyword, line = i, total = token.value, "total from keyword");
                return ResolvedTotal {
                    value: token.value,
                    source: TotalSource::Keyword {
                        keyword: keyword.clone(),
                        line: i,
                    },
                };
            }
            _ => continue,
        }
    }

    let max = lines
        .iter()
        .flat_map(|line| find_amounts(line.as_ref()))
        .map(|t| t.value)
        .filter(|v| *v > 0.0)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

    match max {
        Some(value) => {
            debug!(total = value, "total from largest amount");
            ResolvedTotal {
                value,
                source: TotalSource::Maximum,
            }
        }
        None => ResolvedTotal {
            value: 0.0,
            source: TotalSource::Missing,
        },
    }
}
