//! AFINN-style affect lexicon: integer weights in -5..=5, lowercase keys.
//!
//! General-purpose entries follow AFINN-165 valences; the trailing block adds market and
//! forum slang that AFINN does not cover.

use std::collections::HashMap;
use std::sync::OnceLock;

const ENTRIES: &[(&str, i8)] = &[
    // positive
    ("amazing", 4),
    ("awesome", 4),
    ("beat", 2),
    ("beats", 2),
    ("benefit", 2),
    ("best", 3),
    ("better", 2),
    ("boom", 2),
    ("boost", 1),
    ("breakthrough", 3),
    ("brilliant", 4),
    ("confident", 2),
    ("cool", 1),
    ("excellent", 3),
    ("excited", 3),
    ("exciting", 3),
    ("fantastic", 4),
    ("favorable", 2),
    ("gain", 2),
    ("gains", 2),
    ("good", 3),
    ("great", 3),
    ("grow", 1),
    ("growing", 1),
    ("growth", 2),
    ("happy", 3),
    ("hope", 2),
    ("huge", 1),
    ("improve", 2),
    ("improved", 2),
    ("improvement", 2),
    ("innovative", 2),
    ("love", 3),
    ("loved", 3),
    ("lucky", 3),
    ("nice", 3),
    ("opportunity", 2),
    ("optimistic", 2),
    ("outstanding", 5),
    ("positive", 2),
    ("profit", 2),
    ("profitable", 2),
    ("profits", 2),
    ("promising", 3),
    ("rally", 2),
    ("record", 1),
    ("recover", 2),
    ("recovery", 2),
    ("rebound", 2),
    ("reward", 2),
    ("rich", 2),
    ("rise", 1),
    ("rising", 1),
    ("soar", 3),
    ("soared", 3),
    ("soaring", 3),
    ("solid", 2),
    ("strong", 2),
    ("stronger", 2),
    ("success", 2),
    ("successful", 3),
    ("superb", 5),
    ("surge", 2),
    ("surged", 2),
    ("thrilled", 5),
    ("top", 2),
    ("upgrade", 2),
    ("upgraded", 2),
    ("upside", 2),
    ("win", 4),
    ("winner", 4),
    ("winning", 4),
    ("wins", 4),
    ("wonderful", 4),
    ("wow", 4),
    // negative
    ("afraid", -2),
    ("angry", -3),
    ("awful", -3),
    ("bad", -3),
    ("bankrupt", -3),
    ("bankruptcy", -3),
    ("bearish", -2),
    ("bleak", -2),
    ("blame", -2),
    ("broke", -1),
    ("collapse", -2),
    ("collapsed", -2),
    ("concern", -2),
    ("concerns", -2),
    ("crash", -2),
    ("crashed", -2),
    ("crisis", -3),
    ("cut", -1),
    ("cuts", -1),
    ("danger", -2),
    ("dead", -3),
    ("decline", -1),
    ("declined", -1),
    ("delay", -1),
    ("delayed", -1),
    ("disappointed", -2),
    ("disappointing", -2),
    ("disaster", -2),
    ("doom", -2),
    ("downgrade", -2),
    ("downgraded", -2),
    ("drop", -1),
    ("dropped", -1),
    ("dump", -1),
    ("fail", -2),
    ("failed", -2),
    ("failure", -2),
    ("fall", -1),
    ("falling", -1),
    ("fear", -2),
    ("fears", -2),
    ("fraud", -4),
    ("hate", -3),
    ("horrible", -3),
    ("hurt", -2),
    ("lawsuit", -2),
    ("lose", -3),
    ("loses", -3),
    ("losing", -3),
    ("loss", -3),
    ("losses", -3),
    ("lost", -3),
    ("miss", -2),
    ("missed", -2),
    ("negative", -2),
    ("panic", -3),
    ("plunge", -2),
    ("plunged", -2),
    ("poor", -2),
    ("problem", -2),
    ("problems", -2),
    ("recall", -2),
    ("recession", -2),
    ("risk", -2),
    ("risky", -2),
    ("sad", -2),
    ("scam", -2),
    ("scandal", -3),
    ("selloff", -2),
    ("slump", -2),
    ("terrible", -3),
    ("threat", -2),
    ("trouble", -2),
    ("ugly", -3),
    ("warning", -3),
    ("weak", -2),
    ("weaker", -2),
    ("worried", -3),
    ("worry", -3),
    ("worse", -3),
    ("worst", -3),
    ("worthless", -2),
    // market and forum slang
    ("bagholder", -2),
    ("bagholders", -2),
    ("bullish", 2),
    ("calls", 1),
    ("diamond", 1),
    ("downtrend", -2),
    ("hodl", 1),
    ("moon", 3),
    ("mooning", 3),
    ("outperform", 2),
    ("overvalued", -2),
    ("puts", -1),
    ("rekt", -3),
    ("rocket", 2),
    ("squeeze", 2),
    ("tendies", 3),
    ("underperform", -2),
    ("undervalued", 2),
    ("uptrend", 2),
];

pub fn lexicon() -> &'static HashMap<&'static str, i8> {
    static LEXICON: OnceLock<HashMap<&'static str, i8>> = OnceLock::new();
    LEXICON.get_or_init(|| ENTRIES.iter().copied().collect())
}
