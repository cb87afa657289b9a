mod common;

use proptest::prelude::*;

use eventdesk_server::services::{qr, registration};
use eventdesk_server::utils::error::AppError;

use common::{published_event, request};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Sum of admitted quantities never exceeds capacity, and a request is
    /// refused only when it genuinely would not fit.
    #[test]
    fn registrations_respect_capacity(
        capacity in 1i32..20,
        quantities in prop::collection::vec(1i32..5, 1..15),
    ) {
        let outcome: Result<(), TestCaseError> = runtime().block_on(async {
            let fx = published_event(capacity, "0").await;
            let mut admitted = 0i32;

            for (n, quantity) in quantities.iter().copied().enumerate() {
                let result =
                    registration::register(fx.store.as_ref(), fx.event.id, request(&fx.ticket, n, quantity)).await;
                match result {
                    Ok(_) => {
                        admitted += quantity;
                        prop_assert!(admitted <= capacity);
                    }
                    Err(AppError::CapacityExceeded { remaining, .. }) => {
                        prop_assert!(admitted + quantity > capacity);
                        prop_assert_eq!(remaining, i64::from(capacity - admitted));
                    }
                    Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
                }
            }
            Ok(())
        });
        outcome?;
    }

    /// Filling an event to exactly its capacity always succeeds.
    #[test]
    fn exact_capacity_is_admitted(capacity in 1i32..30) {
        let outcome: Result<(), TestCaseError> = runtime().block_on(async {
            let fx = published_event(capacity, "0").await;
            let result =
                registration::register(fx.store.as_ref(), fx.event.id, request(&fx.ticket, 0, capacity)).await;
            prop_assert!(result.is_ok());

            let over =
                registration::register(fx.store.as_ref(), fx.event.id, request(&fx.ticket, 1, 1)).await;
            let is_capacity_error = matches!(over, Err(AppError::CapacityExceeded { .. }));
            prop_assert!(is_capacity_error);
            Ok(())
        });
        outcome?;
    }

    /// Issuance is single-use whatever the token looks like.
    #[test]
    fn reissuing_is_always_a_conflict(token in "[A-Za-z0-9_-]{4,64}") {
        let outcome: Result<(), TestCaseError> = runtime().block_on(async {
            let fx = published_event(5, "0").await;
            let receipt = registration::register(fx.store.as_ref(), fx.event.id, request(&fx.ticket, 0, 1))
                .await
                .expect("registration");

            let again = qr::assign_token(fx.store.as_ref(), receipt.registration.id, token).await;
            let is_conflict = matches!(again, Err(AppError::Conflict(_)));
            prop_assert!(is_conflict);
            Ok(())
        });
        outcome?;
    }
}
