//! Known strategies: short four-letter sheet names and their upstream codes.

/// `(name, code)` in default sheet order.
pub const STRATEGIES: &[(&str, &str)] = &[
    ("lion", "STRAT_BTC_ETH_USD_H_1"),
    ("tige", "STRAT_BTC_USD_H_4_V2"),
    ("cat", "STRAT_BTC_USD_H_5"),
    ("rhin", "STRAT_BNB_USD_LO_D_1"),
    ("hors", "STRAT_SOL_USD_LO_D_1"),
    ("lama", "STRAT_ADA_USD_LO_D_1"),
    ("peli", "STRAT_MATIC_USD_LO_D_1"),
    ("flam", "STRAT_DOGE_USD_LO_D_1"),
    ("coli", "STRAT_XTZ_USD_LO_D_1"),
    ("phoe", "STRAT_AI_TOP_PERFORMER_H_1"),
    ("drag", "STRAT_AI_TOP_2_PERFORMERS_H_1"),
    ("pega", "STRAT_AI_TOP_3_PERFORMERS_H_1"),
    ("wolf", "STRAT_BTC_USD_H_6"),
    ("ostr", "STRAT_ETH_USD_H_6"),
    ("deer", "STRAT_BTC_USD_D_2_V2"),
    ("elep", "STRAT_XRP_USD_D_1"),
    ("peng", "STRAT_ETH_USD_D_3"),
    ("pand", "STRAT_BTC_ETH_USD_LO_D_1"),
    ("puma", "STRAT_ETH_USD_H_3_V2"),
    ("fox", "STRAT_BTC_ETH_USD_LO_H_1"),
    ("hipp", "STRAT_ETH_USD_VOLUME_H_1"),
    ("shee", "STRAT_BTC_ETH_USD_D_1_V2"),
    ("falc", "STRAT_ETH_USD_H_4_V2"),
    ("dog", "STRAT_ETH_USD_D_2_V2"),
    ("lamb", "STRAT_BTC_USD_D_3"),
    ("eagl", "STRAT_BTC_USD_H_3_V2"),
    ("rabb", "STRAT_BTC_USD_VOLUME_H_1"),
    ("kang", "STRAT_ETH_USD_FUNDING_8H_1"),
    ("gira", "STRAT_LTC_USD_D_1"),
    ("buff", "STRAT_BCH_USD_LO_D_1"),
    ("cow", "STRAT_EOS_USD_D_2"),
    ("croc", "STRAT_BTC_USD_FUNDING_8H_1"),
    ("pack", "STRAT_HIGH_VOL_H_1"),
    ("shar", "STRAT_LOW_VOL_H_1"),
];

/// Alternative sheet order (AI baskets first, then by underlying).
const SECOND_ORDER: &[&str] = &[
    "phoe", "drag", "pega", "lion", "shee", "fox", "pand", "kang", "falc", "hipp", "dog", "tige",
    "deer", "rabb", "croc", "puma", "eagl", "wolf", "ostr", "cat", "rhin", "hors", "peli", "lama",
    "flam", "coli", "buff", "elep", "gira", "cow", "lamb", "peng", "pack", "shar",
];

/// Upstream code for a sheet name.
pub fn code_for(name: &str) -> Option<&'static str> {
    STRATEGIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// All names in default order.
pub fn default_order() -> Vec<String> {
    STRATEGIES.iter().map(|(n, _)| n.to_string()).collect()
}

/// The second order, completed with any catalog names it does not list.
pub fn second_order() -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(STRATEGIES.len());
    let listed = SECOND_ORDER
        .iter()
        .copied()
        .chain(STRATEGIES.iter().map(|(n, _)| *n));
    for name in listed {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
