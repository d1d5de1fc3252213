//! End-to-end order lifecycle: profile, cart, submission, real-time sync,
//! approval, and the idempotence and partial-failure guarantees around
//! them. Everything runs against one shared in-memory store, the way the
//! storefront and the admin console share one remote store in production.

use std::sync::Arc;

use green_basket_admin::{ApprovalError, ApprovalOutcome, OrdersFeed};
use green_basket_core::{Order, OrderStatus, Profile, ProfileUpdate, Rupees};
use green_basket_integration_tests::{AlwaysAdmin, NeverAdmin, TestContext, buyer, staff};
use green_basket_notify::NotificationKind;
use green_basket_storefront::{CartStore, OrderHistory, SubmitError};

mod support {
    use green_basket_admin::OrdersFeed;
    use green_basket_core::Order;

    /// Wait until the orders feed satisfies `accept`, bounded so a broken
    /// projection fails the test instead of hanging it.
    pub async fn wait_orders(
        feed: &mut OrdersFeed,
        accept: impl Fn(&[Order]) -> bool,
    ) -> Vec<Order> {
        for _ in 0..50 {
            let current = feed.current();
            if accept(&current) {
                return current;
            }
            feed.changed().await.expect("orders feed closed");
        }
        panic!("orders feed never reached the expected state");
    }
}

use support::wait_orders;

fn stocked_cart() -> CartStore {
    let cart = CartStore::new();
    cart.add_item(
        green_basket_storefront::CatalogRow {
            sku: Some("tomato".to_owned()),
            name: "Tomato".to_owned(),
            price_per_kg: Some(20.into()),
            ..green_basket_storefront::CatalogRow::default()
        }
        .to_cart_item(),
    );
    cart.add_item(
        green_basket_storefront::CatalogRow {
            sku: Some("onion".to_owned()),
            name: "Onion".to_owned(),
            price_per_kg: Some(15.into()),
            ..green_basket_storefront::CatalogRow::default()
        }
        .to_cart_item(),
    );
    cart.set_quantity("onion", 20);
    cart
}

async fn saved_profile(ctx: &TestContext) -> Profile {
    let user = buyer("asha@freshmart.in");
    ctx.set_identity(Some(user));
    let profiles = ctx.profile_store();
    profiles
        .save(ProfileUpdate {
            name: Some("Asha Rao".to_owned()),
            business: Some("Freshmart Wholesale".to_owned()),
            phone: Some("+91 98450 12345".to_owned()),
            address: Some("14 Market Rd, Bengaluru".to_owned()),
            ..ProfileUpdate::default()
        })
        .await
        .expect("profile save");

    let mut state = profiles.subscribe();
    loop {
        {
            let current = state.borrow_and_update();
            if let Some(profile) = &current.profile {
                return profile.clone();
            }
        }
        state.changed().await.expect("profile mirror closed");
    }
}

#[tokio::test]
async fn test_submit_then_approve_closes_the_loop() {
    let ctx = TestContext::new();
    let profile = saved_profile(&ctx).await;
    let cart = stocked_cart();

    // The admin console is already watching when the order arrives.
    let mut feed = OrdersFeed::subscribe(ctx.store.as_ref())
        .await
        .expect("subscribe");

    let outcome = ctx
        .submission()
        .submit(&cart.items(), Some(&profile))
        .await
        .expect("submit");
    assert!(outcome.notification.is_sent());

    // Submission does not clear the cart; that is the caller's decision.
    assert_eq!(cart.len(), 2);
    cart.clear();

    let pending = wait_orders(&mut feed, |orders| orders.len() == 1).await;
    let order = pending.first().expect("one order");
    assert_eq!(order.id, outcome.order_id);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, Rupees::from_whole(500));
    assert!(order.created_at.is_some());

    // Staff approve; the same feed observes the mutation - no direct
    // channel between admin and customer components.
    let approval = ctx.approval(Arc::new(AlwaysAdmin));
    let outcome = approval
        .approve(Some(&staff()), order)
        .await
        .expect("approve");
    assert!(outcome.transitioned());

    let approved = wait_orders(&mut feed, |orders| {
        orders.first().is_some_and(|o| o.status.is_approved())
    })
    .await;
    let order = approved.first().expect("one order");
    assert!(order.approved_at.is_some());

    // One pending notice to the buyer, one confirmation.
    assert_eq!(ctx.notifier.sent_of(NotificationKind::OrderPending), 1);
    assert_eq!(ctx.notifier.sent_of(NotificationKind::OrderConfirmed), 1);
    let recipients: Vec<String> = ctx.notifier.sent().iter().map(|n| n.recipient.clone()).collect();
    assert!(recipients.iter().all(|r| r == "asha@freshmart.in"));
}

#[tokio::test]
async fn test_double_approve_sends_exactly_one_confirmation() {
    let ctx = TestContext::new();
    let profile = saved_profile(&ctx).await;
    let cart = stocked_cart();

    ctx.submission()
        .submit(&cart.items(), Some(&profile))
        .await
        .expect("submit");

    let mut feed = OrdersFeed::subscribe(ctx.store.as_ref())
        .await
        .expect("subscribe");
    let orders = wait_orders(&mut feed, |orders| orders.len() == 1).await;
    let order = orders.first().expect("one order");

    let approval = ctx.approval(Arc::new(AlwaysAdmin));
    let first = approval
        .approve(Some(&staff()), order)
        .await
        .expect("approve");
    assert!(first.transitioned());

    // Duplicate click with the stale pending snapshot.
    let second = approval
        .approve(Some(&staff()), order)
        .await
        .expect("approve again");
    assert!(matches!(second, ApprovalOutcome::AlreadyApproved));

    // And once more with the fresh approved snapshot.
    let fresh = wait_orders(&mut feed, |orders| {
        orders.first().is_some_and(|o| o.status.is_approved())
    })
    .await;
    let third = approval
        .approve(Some(&staff()), fresh.first().expect("one order"))
        .await
        .expect("approve thrice");
    assert!(matches!(third, ApprovalOutcome::AlreadyApproved));

    assert_eq!(ctx.notifier.sent_of(NotificationKind::OrderConfirmed), 1);
}

#[tokio::test]
async fn test_notification_outage_never_touches_durable_state() {
    let ctx = TestContext::new();
    let profile = saved_profile(&ctx).await;
    let cart = stocked_cart();
    ctx.notifier.set_failing(true);

    // Submission survives the outage; the failure is reported separately.
    let outcome = ctx
        .submission()
        .submit(&cart.items(), Some(&profile))
        .await
        .expect("submit");
    assert!(!outcome.notification.is_sent());

    let mut feed = OrdersFeed::subscribe(ctx.store.as_ref())
        .await
        .expect("subscribe");
    let orders = wait_orders(&mut feed, |orders| orders.len() == 1).await;

    // Approval also survives; status is the durable fact.
    let approval = ctx.approval(Arc::new(AlwaysAdmin));
    let outcome = approval
        .approve(Some(&staff()), orders.first().expect("one order"))
        .await
        .expect("approve");
    let ApprovalOutcome::Approved { notification } = outcome else {
        panic!("expected a transition");
    };
    assert!(!notification.is_sent());

    wait_orders(&mut feed, |orders| {
        orders.first().is_some_and(|o| o.status.is_approved())
    })
    .await;
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_validation_failures_write_nothing() {
    let ctx = TestContext::new();
    let profile = saved_profile(&ctx).await;
    let writes_after_profile = ctx.store.write_count();

    let err = ctx
        .submission()
        .submit(&[], Some(&profile))
        .await
        .expect_err("empty cart");
    assert!(matches!(err, SubmitError::EmptyCart));

    let cart = stocked_cart();
    let err = ctx
        .submission()
        .submit(&cart.items(), None)
        .await
        .expect_err("missing profile");
    assert!(matches!(err, SubmitError::MissingProfile));

    assert_eq!(ctx.store.write_count(), writes_after_profile);
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_unauthorized_actor_cannot_approve() {
    let ctx = TestContext::new();
    let profile = saved_profile(&ctx).await;
    let cart = stocked_cart();

    ctx.submission()
        .submit(&cart.items(), Some(&profile))
        .await
        .expect("submit");

    let mut feed = OrdersFeed::subscribe(ctx.store.as_ref())
        .await
        .expect("subscribe");
    let orders = wait_orders(&mut feed, |orders| orders.len() == 1).await;
    let order: &Order = orders.first().expect("one order");

    let approval = ctx.approval(Arc::new(NeverAdmin));
    let err = approval
        .approve(Some(&staff()), order)
        .await
        .expect_err("denied");
    assert!(matches!(err, ApprovalError::Unauthorized(_)));

    // Fail closed: no transition, no notification.
    let unchanged = feed.current();
    assert_eq!(
        unchanged.first().expect("one order").status,
        OrderStatus::Pending
    );
    assert_eq!(ctx.notifier.sent_of(NotificationKind::OrderConfirmed), 0);
}

#[tokio::test]
async fn test_customer_history_follows_the_admin_mutation() {
    let ctx = TestContext::new();
    let profile = saved_profile(&ctx).await;
    let cart = stocked_cart();

    let mut history = OrderHistory::subscribe(ctx.store.as_ref(), profile.id)
        .await
        .expect("subscribe");

    ctx.submission()
        .submit(&cart.items(), Some(&profile))
        .await
        .expect("submit");

    // The customer's own view picks the order up...
    while history.current().is_empty() {
        history.changed().await.expect("history closed");
    }

    let approval = ctx.approval(Arc::new(AlwaysAdmin));
    let orders = history.current();
    approval
        .approve(Some(&staff()), orders.first().expect("one order"))
        .await
        .expect("approve");

    // ...and observes the approval without any direct admin->customer
    // channel.
    while !history
        .current()
        .first()
        .is_some_and(|order| order.status.is_approved())
    {
        history.changed().await.expect("history closed");
    }
}
