use hypewatch_core::domain::ticker::canonical_id;

/// A `--add` argument: `SYMBOL` or `SYMBOL=alias,alias`. The `$` sigil is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerAddition {
    pub id: String,
    pub aliases: Vec<String>,
}

pub fn parse_addition(raw: &str) -> Result<TickerAddition, String> {
    let (symbol, aliases) = match raw.split_once('=') {
        Some((s, a)) => (s, a),
        None => (raw, ""),
    };
    if symbol.trim().is_empty() {
        return Err(format!("missing symbol in {raw:?}"));
    }

    Ok(TickerAddition {
        id: canonical_id(symbol),
        aliases: aliases
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect(),
    })
}
