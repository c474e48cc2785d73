use std::sync::Arc;
use std::time::Duration;

use cyclarb::application::quote::{GatewaySettings, QuoteFailure, QuoteGateway};
use cyclarb::domain::id::Mint;
use cyclarb::domain::token::TokenPolicy;
use cyclarb::error::VenueError;
use cyclarb::testkit::domain::token;
use cyclarb::testkit::venue::ScriptedVenue;
use tokio::time::Instant;

fn gateway(venue: &Arc<ScriptedVenue>, settings: GatewaySettings) -> Arc<QuoteGateway> {
    Arc::new(QuoteGateway::new(
        venue.clone(),
        TokenPolicy::default(),
        settings,
    ))
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_spacing() {
    let venue = Arc::new(ScriptedVenue::new().with_rate("usdc", "sol", 0.01));
    let gateway = gateway(
        &venue,
        GatewaySettings {
            min_spacing: Duration::from_millis(100),
            ..GatewaySettings::default()
        },
    );

    let started = Instant::now();
    let handles: Vec<_> = (0..5)
        .map(|_| {
            let gateway = gateway.clone();
            tokio::spawn(async move {
                gateway
                    .get_quote(&token("USDC"), &token("SOL"), 1_000_000, 50)
                    .await
            })
        })
        .collect();
    for handle in handles {
        let quote = handle.await.unwrap().unwrap();
        assert_eq!(quote.out_amount(), 10_000);
    }

    assert!(started.elapsed() >= Duration::from_millis(400));
    assert_eq!(venue.quote_calls(), 5);
    assert_eq!(gateway.stats().quotes, 5);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_doubles_up_to_cap() {
    let venue = Arc::new(ScriptedVenue::new().with_rate("usdc", "sol", 0.01));
    for _ in 0..4 {
        venue.fail_next(VenueError::RateLimited);
    }
    let gateway = gateway(
        &venue,
        GatewaySettings {
            min_spacing: Duration::ZERO,
            max_retries: 4,
            backoff_base: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(3),
            ..GatewaySettings::default()
        },
    );

    let started = Instant::now();
    let quote = gateway
        .get_quote(&token("USDC"), &token("SOL"), 1_000_000, 50)
        .await
        .unwrap();
    // 1s + 2s + 3s + 3s of backoff before the fifth call succeeds.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(9));
    assert!(elapsed < Duration::from_secs(10));
    assert_eq!(quote.out_amount(), 10_000);

    let stats = gateway.stats();
    assert_eq!(stats.calls, 5);
    assert_eq!(stats.rate_limited, 4);
    assert_eq!(stats.consecutive_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn test_status_429_counts_as_rate_limit() {
    let venue = Arc::new(ScriptedVenue::new());
    for _ in 0..3 {
        venue.fail_next(VenueError::Status {
            status: 429,
            body: "slow down".into(),
        });
    }
    let gateway = gateway(
        &venue,
        GatewaySettings {
            min_spacing: Duration::ZERO,
            max_retries: 2,
            ..GatewaySettings::default()
        },
    );

    let err = gateway
        .get_quote(&token("USDC"), &token("SOL"), 1_000, 50)
        .await
        .unwrap_err();
    assert_eq!(err, QuoteFailure::RateLimited { attempts: 3 });
    assert!(err.is_retryable());
    assert_eq!(gateway.stats().consecutive_failures, 3);
}

#[tokio::test(start_paused = true)]
async fn test_policy_denial_skips_spacing() {
    let venue = Arc::new(ScriptedVenue::new());
    let gateway = QuoteGateway::new(
        venue.clone(),
        TokenPolicy::new([], [Mint::from("bonk")]),
        GatewaySettings {
            min_spacing: Duration::from_secs(60),
            ..GatewaySettings::default()
        },
    );

    let started = Instant::now();
    for _ in 0..3 {
        let err = gateway
            .get_quote(&token("USDC"), &token("BONK"), 1_000, 50)
            .await
            .unwrap_err();
        assert!(matches!(err, QuoteFailure::PolicyRejected { .. }));
    }
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(venue.quote_calls(), 0);
    assert_eq!(gateway.stats().policy_rejections, 3);
}
