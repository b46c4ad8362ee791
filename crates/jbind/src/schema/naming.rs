// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property naming strategies.
//!
//! A strategy maps canonical property names to wire names during
//! stringification; the registry builds the reverse index for parsing.
//! Explicit wire-name overrides are exempt from the class strategy.

/// Wire-name translation applied to every property of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingStrategy {
    /// `firstName` -> `first_name`
    SnakeCase,
    /// `firstName` -> `first-name`
    KebabCase,
    /// `firstName` -> `first.name`
    LowerDotCase,
    /// `firstName` -> `firstname`
    LowerCase,
    /// `first_name` -> `firstName`
    LowerCamelCase,
    /// `firstName` -> `FirstName`
    UpperCamelCase,
}

impl NamingStrategy {
    /// Translate a canonical name into its wire form.
    pub fn translate(self, name: &str) -> String {
        let segs = segments(name);
        match self {
            NamingStrategy::SnakeCase => join_lower(&segs, "_"),
            NamingStrategy::KebabCase => join_lower(&segs, "-"),
            NamingStrategy::LowerDotCase => join_lower(&segs, "."),
            NamingStrategy::LowerCase => join_lower(&segs, ""),
            NamingStrategy::LowerCamelCase => {
                let mut out = String::with_capacity(name.len());
                for (i, seg) in segs.iter().enumerate() {
                    if i == 0 {
                        out.push_str(&seg.to_lowercase());
                    } else {
                        out.push_str(&capitalize(seg));
                    }
                }
                out
            }
            NamingStrategy::UpperCamelCase => {
                segs.iter().map(|s| capitalize(s)).collect()
            }
        }
    }
}

/// Split a name on underscores, dashes, dots, and camel-case boundaries.
///
/// Acronym runs stay together until a lowercase tail starts a new word
/// (`HTTPStatus` -> `HTTP` + `Status`).
fn segments(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut segs = Vec::new();
    let mut cur = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c == '_' || c == '-' || c == '.' {
            if !cur.is_empty() {
                segs.push(std::mem::take(&mut cur));
            }
            continue;
        }
        if c.is_uppercase() && !cur.is_empty() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_lower) {
                segs.push(std::mem::take(&mut cur));
            }
        }
        cur.push(c);
    }
    if !cur.is_empty() {
        segs.push(cur);
    }
    segs
}

fn join_lower(segs: &[String], sep: &str) -> String {
    segs.iter()
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(sep)
}

fn capitalize(seg: &str) -> String {
    let mut chars = seg.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
