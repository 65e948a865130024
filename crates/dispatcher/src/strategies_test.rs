#[cfg(test)]
mod strategies_tests {
    use crate::strategies::*;
    use snuffy_core::geo::offset_north;
    use snuffy_core::*;

    fn origin() -> Coordinate {
        Coordinate::new(12.9716, 77.5946)
    }

    fn create_test_provider(
        id: &str,
        kind: ServiceKind,
        experience: u32,
        rating: Option<f64>,
        meters_away: f64,
    ) -> Provider {
        Provider {
            id: id.to_string(),
            kind,
            name: format!("provider-{id}"),
            email: format!("{id}@example.com"),
            phone_number: None,
            profile_pic: None,
            bio: None,
            experience,
            rating,
            coordinate: offset_north(origin(), meters_away),
            status: ProviderStatus::Available,
            pending_requests: vec![],
            completed_requests: 0,
            active_offer_id: None,
        }
    }

    #[test]
    fn test_caretaker_score_scenario() {
        let strategy = CaretakerScore::new();
        let a = create_test_provider("A", ServiceKind::Caretaker, 5, None, 2000.0);
        let b = create_test_provider("B", ServiceKind::Caretaker, 10, None, 1000.0);

        let score_a = strategy.score(&a, origin());
        let score_b = strategy.score(&b, origin());

        assert!((score_a - 2.5).abs() < 1e-3, "A scored {score_a}");
        assert!((score_b - 10.0).abs() < 1e-3, "B scored {score_b}");
        assert!(score_b > score_a);
    }

    #[test]
    fn test_caretaker_score_colocated_uses_floor() {
        let strategy = CaretakerScore::new();
        let here = create_test_provider("C", ServiceKind::Caretaker, 3, None, 0.0);

        let score = strategy.score(&here, origin());
        assert!(score.is_finite());
        assert!((score - 3000.0).abs() < 1e-6);
    }

    #[test]
    fn test_caretaker_score_monotonic() {
        let strategy = CaretakerScore::new();

        // More experience at the same distance scores higher.
        let mut previous = 0.0;
        for experience in 0..20 {
            let p = create_test_provider("X", ServiceKind::Caretaker, experience, None, 1500.0);
            let score = strategy.score(&p, origin());
            assert!(score >= previous);
            previous = score;
        }

        // Greater distance at the same experience scores lower.
        let mut previous = f64::INFINITY;
        for step in 1..20 {
            let p = create_test_provider("X", ServiceKind::Caretaker, 7, None, step as f64 * 250.0);
            let score = strategy.score(&p, origin());
            assert!(score < previous);
            previous = score;
        }
    }

    #[test]
    fn test_walker_score_bounds() {
        let strategy = WalkerScore::new();
        for rating in [0.0, 1.0, 2.5, 4.0, 5.0] {
            for meters in [0.0, 0.5, 10.0, 1_000.0, 500_000.0] {
                let p = create_test_provider("W", ServiceKind::DogWalker, 0, Some(rating), meters);
                let score = strategy.score(&p, origin());
                assert!(
                    (0.0..=1.0).contains(&score),
                    "rating {rating} at {meters}m scored {score}"
                );
            }
        }

        let best = create_test_provider("W", ServiceKind::DogWalker, 0, Some(5.0), 0.0);
        assert!((strategy.score(&best, origin()) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_walker_score_default_rating() {
        let strategy = WalkerScore::new();
        let unrated = create_test_provider("U", ServiceKind::DogWalker, 0, None, 100.0);
        let rated = create_test_provider("R", ServiceKind::DogWalker, 0, Some(4.0), 100.0);

        assert_eq!(strategy.effective_rating(&unrated), 4.0);
        assert_eq!(
            strategy.score(&unrated, origin()),
            strategy.score(&rated, origin())
        );
    }

    #[test]
    fn test_walker_prefers_proximity() {
        let strategy = WalkerScore::new();
        let near = create_test_provider("N", ServiceKind::DogWalker, 0, Some(3.0), 0.0);
        let far = create_test_provider("F", ServiceKind::DogWalker, 0, Some(5.0), 5_000.0);

        // 0.7 + 0.18 against roughly 0.0001 + 0.3
        assert!(strategy.score(&near, origin()) > strategy.score(&far, origin()));
    }

    #[test]
    fn test_strategy_names_and_kinds() {
        let config = AssignmentConfig::default();
        let caretaker = strategy_for(ServiceKind::Caretaker, &config);
        let walker = strategy_for(ServiceKind::DogWalker, &config);

        assert_eq!(caretaker.name(), "CaretakerScore");
        assert_eq!(caretaker.kind(), ServiceKind::Caretaker);
        assert_eq!(walker.name(), "WalkerScore");
        assert_eq!(walker.kind(), ServiceKind::DogWalker);
    }

    #[test]
    fn test_strategy_from_config_weights() {
        let config = AssignmentConfig {
            walker_proximity_weight: 0.0,
            walker_rating_weight: 1.0,
            ..AssignmentConfig::default()
        };
        let strategy = WalkerScore::from_config(&config);
        let p = create_test_provider("W", ServiceKind::DogWalker, 0, Some(2.5), 0.0);
        assert!((strategy.score(&p, origin()) - 0.5).abs() < 1e-9);
    }
}
