//! Configuration validation.
//!
//! Validates every `[engine]` and `[strategy]` key before a run. Numeric keys
//! are parsed from their raw strings so that a typo is reported instead of
//! silently falling back to a default.

use std::str::FromStr;

use crate::domain::error::ReplayError;
use crate::ports::config_port::ConfigPort;

pub const ENGINE: &str = "engine";
pub const STRATEGY: &str = "strategy";

pub fn validate_engine_config(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    validate_initial_cash(config)?;
    validate_sizing(config)?;
    validate_flag(config, "force_close_at_end")?;
    validate_flag(config, "strict_source")?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    match config
        .get_string(STRATEGY, "kind")
        .map(|s| s.trim().to_lowercase())
        .as_deref()
    {
        Some("moving_average") => validate_moving_average(config),
        Some("fixed_bar") => validate_fixed_bar(config),
        Some(other) if !other.is_empty() => Err(ReplayError::invalid(
            STRATEGY,
            "kind",
            format!("unknown strategy kind '{other}', expected moving_average or fixed_bar"),
        )),
        _ => Err(ReplayError::missing(STRATEGY, "kind")),
    }
}

/// Accepts true/yes/1 and false/no/0, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// `Ok(None)` when absent or blank, `ConfigInvalid` when unparseable.
pub fn parse_key<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, ReplayError> {
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map(Some).map_err(|_| {
            ReplayError::invalid(section, key, format!("cannot parse '{}'", raw.trim()))
        }),
        _ => Ok(None),
    }
}

pub fn require_key<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<T, ReplayError> {
    parse_key(config, section, key)?.ok_or_else(|| ReplayError::missing(section, key))
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    let value: f64 = require_key(config, ENGINE, "initial_cash")?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ReplayError::invalid(
            ENGINE,
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_sizing(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    let sizing = config
        .get_string(ENGINE, "sizing")
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "all_in".to_string());

    match sizing.as_str() {
        "all_in" => Ok(()),
        "fixed_qty" => {
            let quantity: i64 = require_key(config, ENGINE, "quantity")?;
            if quantity < 1 {
                return Err(ReplayError::invalid(
                    ENGINE,
                    "quantity",
                    "quantity must be a positive integer",
                ));
            }
            Ok(())
        }
        other => Err(ReplayError::invalid(
            ENGINE,
            "sizing",
            format!("unknown sizing '{other}', expected all_in or fixed_qty"),
        )),
    }
}

fn validate_flag(config: &dyn ConfigPort, key: &str) -> Result<(), ReplayError> {
    match config.get_string(ENGINE, key) {
        Some(raw) if !raw.trim().is_empty() && parse_bool(&raw).is_none() => Err(
            ReplayError::invalid(ENGINE, key, format!("'{}' is not a boolean", raw.trim())),
        ),
        _ => Ok(()),
    }
}

fn validate_moving_average(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    let fast: i64 = require_key(config, STRATEGY, "fast_period")?;
    let slow: i64 = require_key(config, STRATEGY, "slow_period")?;
    if fast < 1 {
        return Err(ReplayError::invalid(
            STRATEGY,
            "fast_period",
            "fast_period must be at least 1",
        ));
    }
    if slow <= fast {
        return Err(ReplayError::invalid(
            STRATEGY,
            "slow_period",
            "slow_period must be greater than fast_period",
        ));
    }

    if let Some(indicator) = config.get_string(STRATEGY, "indicator") {
        let indicator = indicator.trim().to_lowercase();
        if !indicator.is_empty() && indicator != "sma" && indicator != "ema" {
            return Err(ReplayError::invalid(
                STRATEGY,
                "indicator",
                format!("unknown indicator '{indicator}', expected sma or ema"),
            ));
        }
    }

    if let Some(epsilon) = parse_key::<f64>(config, STRATEGY, "epsilon")? {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ReplayError::invalid(
                STRATEGY,
                "epsilon",
                "epsilon must be non-negative",
            ));
        }
    }
    Ok(())
}

fn validate_fixed_bar(config: &dyn ConfigPort) -> Result<(), ReplayError> {
    let buy: i64 = require_key(config, STRATEGY, "buy_bar")?;
    let sell: i64 = require_key(config, STRATEGY, "sell_bar")?;
    if buy < 1 {
        return Err(ReplayError::invalid(
            STRATEGY,
            "buy_bar",
            "buy_bar must be at least 1",
        ));
    }
    if sell <= buy {
        return Err(ReplayError::invalid(
            STRATEGY,
            "sell_bar",
            "sell_bar must be greater than buy_bar",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_engine_config_passes() {
        let config = make_config(
            r#"
[engine]
initial_cash = 10000
strategy_name = golden
sizing = all_in
force_close_at_end = true
strict_source = no
"#,
        );
        assert!(validate_engine_config(&config).is_ok());
    }

    #[test]
    fn missing_initial_cash_fails() {
        let config = make_config("[engine]\nsizing = all_in\n");
        let err = validate_engine_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigMissing { key, .. } if key == "initial_cash"));
    }

    #[test]
    fn initial_cash_zero_fails() {
        let config = make_config("[engine]\ninitial_cash = 0\n");
        let err = validate_engine_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "initial_cash"));
    }

    #[test]
    fn initial_cash_not_a_number_fails() {
        let config = make_config("[engine]\ninitial_cash = lots\n");
        let err = validate_engine_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "initial_cash"));
    }

    #[test]
    fn fixed_qty_requires_quantity() {
        let config = make_config("[engine]\ninitial_cash = 100\nsizing = fixed_qty\n");
        let err = validate_engine_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigMissing { key, .. } if key == "quantity"));
    }

    #[test]
    fn fixed_qty_zero_fails() {
        let config = make_config("[engine]\ninitial_cash = 100\nsizing = fixed_qty\nquantity = 0\n");
        let err = validate_engine_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "quantity"));
    }

    #[test]
    fn fixed_qty_with_quantity_passes() {
        let config = make_config("[engine]\ninitial_cash = 100\nsizing = fixed_qty\nquantity = 5\n");
        assert!(validate_engine_config(&config).is_ok());
    }

    #[test]
    fn unknown_sizing_fails() {
        let config = make_config("[engine]\ninitial_cash = 100\nsizing = half\n");
        let err = validate_engine_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "sizing"));
    }

    #[test]
    fn bad_flag_fails() {
        let config = make_config("[engine]\ninitial_cash = 100\nstrict_source = maybe\n");
        let err = validate_engine_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "strict_source"));
    }

    #[test]
    fn valid_moving_average_passes() {
        let config = make_config(
            "[strategy]\nkind = moving_average\nindicator = ema\nfast_period = 5\nslow_period = 20\nepsilon = 0.01\n",
        );
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn moving_average_fast_not_below_slow_fails() {
        let config =
            make_config("[strategy]\nkind = moving_average\nfast_period = 20\nslow_period = 20\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "slow_period"));
    }

    #[test]
    fn moving_average_zero_fast_fails() {
        let config =
            make_config("[strategy]\nkind = moving_average\nfast_period = 0\nslow_period = 3\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "fast_period"));
    }

    #[test]
    fn moving_average_missing_slow_fails() {
        let config = make_config("[strategy]\nkind = moving_average\nfast_period = 2\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigMissing { key, .. } if key == "slow_period"));
    }

    #[test]
    fn unknown_indicator_fails() {
        let config = make_config(
            "[strategy]\nkind = moving_average\nindicator = wma\nfast_period = 2\nslow_period = 3\n",
        );
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "indicator"));
    }

    #[test]
    fn negative_epsilon_fails() {
        let config = make_config(
            "[strategy]\nkind = moving_average\nfast_period = 2\nslow_period = 3\nepsilon = -1\n",
        );
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "epsilon"));
    }

    #[test]
    fn valid_fixed_bar_passes() {
        let config = make_config("[strategy]\nkind = fixed_bar\nbuy_bar = 2\nsell_bar = 4\n");
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn fixed_bar_sell_before_buy_fails() {
        let config = make_config("[strategy]\nkind = fixed_bar\nbuy_bar = 4\nsell_bar = 2\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "sell_bar"));
    }

    #[test]
    fn fixed_bar_zero_buy_fails() {
        let config = make_config("[strategy]\nkind = fixed_bar\nbuy_bar = 0\nsell_bar = 2\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "buy_bar"));
    }

    #[test]
    fn kind_is_case_insensitive() {
        let config = make_config("[strategy]\nkind = Fixed_Bar\nbuy_bar = 2\nsell_bar = 4\n");
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn missing_kind_fails() {
        let config = make_config("[strategy]\nfast_period = 2\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigMissing { key, .. } if key == "kind"));
    }

    #[test]
    fn unknown_kind_fails() {
        let config = make_config("[strategy]\nkind = momentum\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, ReplayError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn parse_bool_words() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
