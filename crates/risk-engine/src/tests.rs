#[cfg(test)]
mod risk_engine_tests {
    use crate::engine::RiskEngine;
    use crate::models::{RiskConfig, TradeProposal};
    use decision_core::{DecisionError, Regime, TradeAction};

    fn proposal(action: TradeAction, entry: f64, regime: Regime) -> TradeProposal {
        TradeProposal {
            ticker: "RELIANCE.NS".to_string(),
            action,
            entry,
            target: None,
            conviction_score: 0.7,
            regime,
            sentiment_score: None,
        }
    }

    #[test]
    fn accepted_long_matches_worked_example() {
        let engine = RiskEngine::default();
        let trade = engine
            .apply_limits(&proposal(TradeAction::Buy, 2800.0, Regime::Bull), 30.0, 1_000_000.0)
            .unwrap();

        assert!(!trade.killed);
        assert!((trade.stop_loss - 2755.0).abs() < 1e-9);
        assert!((trade.risk_per_share - 45.0).abs() < 1e-9);
        assert!((trade.target_price - 2890.0).abs() < 1e-9);
        assert_eq!(trade.position_size, 222);
        assert!((trade.risk_reward_ratio - 2.0).abs() < 1e-6);
        assert!(trade.total_risk <= 1_000_000.0 * 0.01);
        assert_eq!(trade.kill_reason, None);
    }

    #[test]
    fn buy_in_bear_regime_is_killed() {
        let engine = RiskEngine::default();
        let trade = engine
            .apply_limits(&proposal(TradeAction::Buy, 2800.0, Regime::Bear), 30.0, 1_000_000.0)
            .unwrap();

        assert!(trade.killed);
        assert_eq!(trade.position_size, 0);
        let reason = trade.kill_reason.unwrap();
        assert!(reason.contains("conflicts"));
        assert!(reason.contains("BEAR"));
    }

    #[test]
    fn sell_in_bull_regime_is_killed() {
        let engine = RiskEngine::default();
        let trade = engine
            .apply_limits(&proposal(TradeAction::Sell, 2800.0, Regime::Bull), 30.0, 1_000_000.0)
            .unwrap();
        assert!(trade.killed);
    }

    #[test]
    fn hold_is_always_killed() {
        let engine = RiskEngine::default();
        let trade = engine
            .apply_limits(&proposal(TradeAction::Hold, 2800.0, Regime::Bull), 30.0, 1_000_000.0)
            .unwrap();

        assert!(trade.killed);
        assert!(trade.kill_reason.unwrap().contains("HOLD"));
    }

    #[test]
    fn accepted_short_mirrors_long() {
        let engine = RiskEngine::default();
        let trade = engine
            .apply_limits(&proposal(TradeAction::Sell, 100.0, Regime::Bear), 10.0, 1_000_000.0)
            .unwrap();

        assert!(!trade.killed);
        assert!((trade.stop_loss - 115.0).abs() < 1e-9);
        assert!((trade.target_price - 70.0).abs() < 1e-9);
        assert_eq!(trade.position_size, 666); // floor(10000 / 15)
        assert!((trade.risk_reward_ratio - 2.0).abs() < 1e-6);
    }

    #[test]
    fn long_size_capped_by_cash() {
        let engine = RiskEngine::default();
        // Risk budget allows 2 shares, cash only covers 1
        let trade = engine
            .apply_limits(&proposal(TradeAction::Buy, 9000.0, Regime::Neutral), 30.0, 10_000.0)
            .unwrap();

        assert!(!trade.killed);
        assert_eq!(trade.position_size, 1);
    }

    #[test]
    fn zero_size_is_killed() {
        let engine = RiskEngine::default();
        let trade = engine
            .apply_limits(&proposal(TradeAction::Buy, 2800.0, Regime::Bull), 30.0, 100.0)
            .unwrap();

        assert!(trade.killed);
        assert!(trade.kill_reason.unwrap().contains("position_size"));
    }

    #[test]
    fn weak_supplied_target_is_killed() {
        let engine = RiskEngine::default();
        let mut p = proposal(TradeAction::Buy, 100.0, Regime::Bull);
        p.target = Some(110.0); // reward 10 vs risk 15

        let trade = engine.apply_limits(&p, 10.0, 1_000_000.0).unwrap();

        assert!(trade.killed);
        assert!(trade.kill_reason.unwrap().contains("reward:risk"));
    }

    #[test]
    fn generous_supplied_target_is_accepted() {
        let engine = RiskEngine::default();
        let mut p = proposal(TradeAction::Buy, 100.0, Regime::Bull);
        p.target = Some(145.0); // reward 45 vs risk 15 -> 3R

        let trade = engine.apply_limits(&p, 10.0, 1_000_000.0).unwrap();

        assert!(!trade.killed);
        assert!((trade.risk_reward_ratio - 3.0).abs() < 1e-6);
        assert!((trade.target_price - 145.0).abs() < 1e-9);
    }

    #[test]
    fn wrong_side_target_is_killed() {
        let engine = RiskEngine::default();
        let mut p = proposal(TradeAction::Buy, 100.0, Regime::Bull);
        p.target = Some(50.0); // below entry on a long

        let trade = engine.apply_limits(&p, 10.0, 1_000_000.0).unwrap();
        assert!(trade.killed);
        assert_eq!(trade.risk_reward_ratio, 0.0);
    }

    #[test]
    fn sentiment_penalty_trims_neutral_longs() {
        let engine = RiskEngine::default();
        let mut p = proposal(TradeAction::Buy, 100.0, Regime::Neutral);
        p.sentiment_score = Some(-0.6);

        let trade = engine.apply_limits(&p, 10.0, 1_000_000.0).unwrap();

        assert!(!trade.killed);
        // floor(10000/15) = 666, then floor(666 * 0.75) = 499
        assert_eq!(trade.position_size, 499);
        assert!(trade.total_risk <= 1_000_000.0 * 0.01);
    }

    #[test]
    fn mild_sentiment_leaves_size_alone() {
        let engine = RiskEngine::default();
        let mut p = proposal(TradeAction::Buy, 100.0, Regime::Neutral);
        p.sentiment_score = Some(-0.3);

        let trade = engine.apply_limits(&p, 10.0, 1_000_000.0).unwrap();
        assert_eq!(trade.position_size, 666);
    }

    #[test]
    fn bull_longs_skip_sentiment_penalty() {
        let engine = RiskEngine::default();
        let mut p = proposal(TradeAction::Buy, 100.0, Regime::Bull);
        p.sentiment_score = Some(-0.9);

        let trade = engine.apply_limits(&p, 10.0, 1_000_000.0).unwrap();
        assert_eq!(trade.position_size, 666);
    }

    #[test]
    fn non_finite_inputs_fail_fast() {
        let engine = RiskEngine::default();

        let mut p = proposal(TradeAction::Buy, f64::NAN, Regime::Bull);
        assert!(matches!(
            engine.apply_limits(&p, 30.0, 1_000_000.0),
            Err(DecisionError::InvalidInput(_))
        ));

        p = proposal(TradeAction::Buy, 2800.0, Regime::Bull);
        assert!(matches!(
            engine.apply_limits(&p, 0.0, 1_000_000.0),
            Err(DecisionError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.apply_limits(&p, 30.0, -5.0),
            Err(DecisionError::InvalidInput(_))
        ));

        p.conviction_score = 1.5;
        assert!(matches!(
            engine.apply_limits(&p, 30.0, 1_000_000.0),
            Err(DecisionError::InvalidInput(_))
        ));

        p.conviction_score = 0.7;
        p.sentiment_score = Some(-2.0);
        assert!(matches!(
            engine.apply_limits(&p, 30.0, 1_000_000.0),
            Err(DecisionError::InvalidInput(_))
        ));
    }

    #[test]
    fn accepted_invariants_hold_across_inputs() {
        let engine = RiskEngine::default();
        let equities = [5_000.0, 50_000.0, 1_000_000.0, 10_000_000.0];
        let entries = [5.0, 100.0, 2800.0];
        let atrs = [0.5, 5.0, 40.0];

        for equity in equities {
            for entry in entries {
                for atr in atrs {
                    let trade = engine
                        .apply_limits(&proposal(TradeAction::Buy, entry, Regime::Bull), atr, equity)
                        .unwrap();
                    if trade.killed {
                        assert_eq!(trade.position_size, 0);
                        continue;
                    }
                    assert!(trade.position_size >= 1);
                    assert!(trade.risk_per_share > 0.0);
                    assert!(trade.risk_reward_ratio + 1e-6 >= 2.0);
                    assert!(trade.total_risk <= equity * 0.01 + 1e-9);
                    assert!(trade.stop_loss < trade.entry_price);
                }
            }
        }
    }

    #[test]
    fn custom_config_is_honored() {
        let engine = RiskEngine::new(RiskConfig {
            max_risk_fraction: 0.02,
            atr_stop_multiplier: 2.0,
            min_reward_risk: 3.0,
        });

        let trade = engine
            .apply_limits(&proposal(TradeAction::Buy, 100.0, Regime::Bull), 5.0, 100_000.0)
            .unwrap();

        assert!(!trade.killed);
        assert!((trade.stop_loss - 90.0).abs() < 1e-9); // 2 x ATR
        assert!((trade.target_price - 130.0).abs() < 1e-9); // 3R default
        assert_eq!(trade.position_size, 200); // floor(2000 / 10)
    }
}
