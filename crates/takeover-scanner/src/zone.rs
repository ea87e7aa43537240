use crate::{Error, Result};
use lazy_regex::regex_is_match;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument, trace, warn};

const CLASSES: [&str; 4] = ["IN", "CH", "HS", "CS"];

/// Reads a BIND zone file and returns the owner of every CNAME record as a
/// subdomain of `root_domain`, in file order. Duplicates are kept.
#[instrument(name = "zone_file", level = "info", skip_all, fields(path = %path.display()))]
pub fn parse_zone_file(path: &Path, root_domain: &str) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|err| Error::ZoneFile {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;

    let subdomains = extract_cname_subdomains(&content, root_domain);
    info!("{} CNAME records found", subdomains.len());
    Ok(subdomains)
}

pub fn extract_cname_subdomains(content: &str, root_domain: &str) -> Vec<String> {
    let mut origin = root_domain.trim_end_matches('.').to_string();
    let mut last_owner: Option<String> = None;
    let mut subdomains = Vec::new();

    // open parentheses of a record spanning several lines
    let mut depth: usize = 0;

    for raw in content.lines() {
        let (line, parens) = scan_line(raw);

        if depth > 0 {
            depth = parens.apply(depth);
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        let mut tokens: Vec<&str> = line.split_whitespace().collect();

        if let Some(directive) = tokens.first().filter(|token| token.starts_with('$')) {
            if directive.eq_ignore_ascii_case("$ORIGIN") {
                if let Some(new_origin) = tokens.get(1) {
                    origin = qualify(new_origin, &origin);
                    debug!("$ORIGIN set to {}", origin);
                }
            } else if !directive.eq_ignore_ascii_case("$TTL") {
                warn!("Unsupported zone directive {}, records it brings in are not checked", directive);
            }
            continue;
        }

        // a record starting with blank space reuses the previous owner
        let owner = if raw.starts_with(char::is_whitespace) {
            last_owner.clone()
        } else {
            let owner = qualify(tokens.remove(0), &origin);
            last_owner = Some(owner.clone());
            Some(owner)
        };

        let Some(rtype) = record_type(&tokens) else {
            continue;
        };
        depth = parens.apply(0);

        if !rtype.eq_ignore_ascii_case("CNAME") {
            continue;
        }
        if let Some(owner) = owner {
            trace!("CNAME owner: {}", owner);
            subdomains.push(owner);
        }
    }

    subdomains
}

// region:        --- Helpers

/// Parentheses seen outside quoted strings on one line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Parens {
    opened: usize,
    closed: usize,
}

impl Parens {
    fn apply(&self, depth: usize) -> usize {
        (depth + self.opened).saturating_sub(self.closed)
    }
}

/// Cuts the comment off `line` and counts its parentheses. `;`, `(` and `)`
/// inside `"..."` (with `\"` escapes) are data, not syntax.
fn scan_line(line: &str) -> (&str, Parens) {
    let mut parens = Parens::default();
    let mut in_quotes = false;
    let mut escaped = false;

    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return (&line[..index], parens),
            '(' if !in_quotes => parens.opened += 1,
            ')' if !in_quotes => parens.closed += 1,
            _ => {}
        }
    }

    (line, parens)
}

/// Skips the optional TTL and class, in either order.
fn record_type<'a>(tokens: &[&'a str]) -> Option<&'a str> {
    tokens
        .iter()
        .take(3)
        .find(|token| !is_ttl(token) && !is_class(token))
        .copied()
}

fn is_ttl(token: &str) -> bool {
    regex_is_match!(r"^(\d+[smhdw]?)+$"i, token)
}

fn is_class(token: &str) -> bool {
    CLASSES.iter().any(|class| class.eq_ignore_ascii_case(token))
}

/// `@` is the origin, absolute names lose their root dot, relative names get the origin appended.
fn qualify(name: &str, origin: &str) -> String {
    if name == "@" {
        origin.to_string()
    } else if let Some(absolute) = name.strip_suffix('.') {
        absolute.to_string()
    } else {
        format!("{name}.{origin}")
    }
}

// endregion:     --- Helpers
