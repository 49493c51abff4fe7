use proptest::prelude::*;

use drip_accrual::{LedgerContext, Role, RoleTable, TransferCoordinator};
use drip_store::MemoryLedger;
use drip_types::{AccountId, Rate, Timestamp, TransferAmount, PRECISION};

fn id(s: &str) -> AccountId {
    AccountId::new(s)
}

fn setup(initial_rate: u128) -> (LedgerContext<MemoryLedger>, TransferCoordinator<RoleTable>) {
    let mut roles = RoleTable::new(id("owner"));
    roles
        .grant_role(&id("owner"), Role::MintBurn, id("minter"))
        .unwrap();
    let ctx = LedgerContext::new(
        MemoryLedger::new(),
        Rate::from_raw(initial_rate),
        Timestamp::new(0),
    );
    (ctx, TransferCoordinator::new(roles))
}

proptest! {
    /// Every accepted global rate is strictly below the previous one; rejected
    /// attempts leave the rate unchanged.
    #[test]
    fn global_rate_only_decreases(
        initial in 1u128..PRECISION,
        attempts in prop::collection::vec(0u128..PRECISION, 1..30),
    ) {
        let (mut ctx, c) = setup(initial);
        let mut current = Rate::from_raw(initial);
        for (i, raw) in attempts.into_iter().enumerate() {
            let attempted = Rate::from_raw(raw);
            let result = c.set_global_rate(&mut ctx, &id("owner"), attempted, Timestamp::new(i as u64));
            if attempted < current {
                prop_assert!(result.is_ok());
                current = attempted;
            } else {
                prop_assert!(result.is_err());
            }
            prop_assert_eq!(ctx.global_rate(), current);
        }
    }

    /// Effective balance never decreases with time, and grows iff the rate is nonzero.
    #[test]
    fn accrual_is_monotonic(
        principal in 1u128..1_000_000_000_000,
        rate in 0u128..PRECISION,
        t1 in 0u64..1_000_000,
        dt in 1u64..1_000_000,
    ) {
        let (mut ctx, c) = setup(PRECISION);
        let x = id("x");
        c.mint(&mut ctx, &id("minter"), &x, principal, Rate::from_raw(rate), Timestamp::new(0)).unwrap();
        let b1 = ctx.effective_balance_of(&x, Timestamp::new(t1)).unwrap();
        let b2 = ctx.effective_balance_of(&x, Timestamp::new(t1 + dt)).unwrap();
        prop_assert!(b2 >= b1, "balance must not decrease: b1={}, b2={}", b1, b2);
        if rate == 0 {
            prop_assert_eq!(b1, b2);
        }
    }

    /// A large enough rate and principal always produce visible growth.
    #[test]
    fn nonzero_rate_grows(
        principal in PRECISION..PRECISION * 1_000,
        rate in 1u128..PRECISION,
        dt in 1u64..10_000,
    ) {
        let (mut ctx, c) = setup(PRECISION);
        let x = id("x");
        c.mint(&mut ctx, &id("minter"), &x, principal, Rate::from_raw(rate), Timestamp::new(0)).unwrap();
        let b = ctx.effective_balance_of(&x, Timestamp::new(dt)).unwrap();
        prop_assert!(b > principal);
    }

    /// Settling twice at the same instant realizes nothing the second time.
    #[test]
    fn settlement_is_idempotent(
        principal in 0u128..1_000_000_000_000,
        rate in 0u128..PRECISION,
        at in 0u64..1_000_000,
    ) {
        let (mut ctx, c) = setup(PRECISION);
        let x = id("x");
        c.mint(&mut ctx, &id("minter"), &x, principal, Rate::from_raw(rate), Timestamp::new(0)).unwrap();
        let first = c.settle(&mut ctx, &x, Timestamp::new(at)).unwrap();
        let before = ctx.principal_balance_of(&x);
        let second = c.settle(&mut ctx, &x, Timestamp::new(at)).unwrap();
        prop_assert_eq!(second.increase, 0);
        prop_assert_eq!(ctx.principal_balance_of(&x), before);
        prop_assert_eq!(before, first.settled_principal);
    }

    /// Settlement never changes the effective balance it realizes.
    #[test]
    fn settlement_preserves_effective_balance(
        principal in 0u128..1_000_000_000_000,
        rate in 0u128..PRECISION,
        at in 0u64..1_000_000,
    ) {
        let (mut ctx, c) = setup(PRECISION);
        let x = id("x");
        c.mint(&mut ctx, &id("minter"), &x, principal, Rate::from_raw(rate), Timestamp::new(0)).unwrap();
        let expected = ctx.effective_balance_of(&x, Timestamp::new(at)).unwrap();
        c.settle(&mut ctx, &x, Timestamp::new(at)).unwrap();
        prop_assert_eq!(ctx.effective_balance_of(&x, Timestamp::new(at)).unwrap(), expected);
    }

    /// An empty recipient adopts the sender's rate, whatever it held before.
    #[test]
    fn first_funding_inherits_sender_rate(
        sender_rate in 0u128..PRECISION,
        stale_rate in 0u128..PRECISION,
        amount in 1u128..1_000,
        at in 0u64..10_000,
    ) {
        let (mut ctx, c) = setup(PRECISION);
        let (a, b) = (id("a"), id("b"));
        c.mint(&mut ctx, &id("minter"), &b, 1, Rate::from_raw(stale_rate), Timestamp::new(0)).unwrap();
        c.burn(&mut ctx, &id("minter"), &b, TransferAmount::All, Timestamp::new(0)).unwrap();
        c.mint(&mut ctx, &id("minter"), &a, 1_000, Rate::from_raw(sender_rate), Timestamp::new(0)).unwrap();

        c.transfer(&mut ctx, &a, &b, TransferAmount::Exact(amount), Timestamp::new(at)).unwrap();
        prop_assert_eq!(ctx.account_rate(&b), Rate::from_raw(sender_rate));
    }

    /// The move itself conserves the pair's post-settlement principal.
    #[test]
    fn transfer_conserves_settled_principal(
        pa in 1u128..1_000_000,
        pb in 0u128..1_000_000,
        ra in 0u128..PRECISION,
        rb in 0u128..PRECISION,
        at in 0u64..1_000,
        pct in 0u128..=100,
    ) {
        let (mut ctx, c) = setup(PRECISION);
        let (a, b) = (id("a"), id("b"));
        c.mint(&mut ctx, &id("minter"), &a, pa, Rate::from_raw(ra), Timestamp::new(0)).unwrap();
        if pb > 0 {
            c.mint(&mut ctx, &id("minter"), &b, pb, Rate::from_raw(rb), Timestamp::new(0)).unwrap();
        }
        let now = Timestamp::new(at);
        let settled_a = ctx.effective_balance_of(&a, now).unwrap();
        let settled_b = ctx.effective_balance_of(&b, now).unwrap();
        let amount = settled_a * pct / 100;

        c.transfer(&mut ctx, &a, &b, TransferAmount::Exact(amount), now).unwrap();
        prop_assert_eq!(
            ctx.principal_balance_of(&a) + ctx.principal_balance_of(&b),
            settled_a + settled_b
        );
        prop_assert_eq!(ctx.principal_balance_of(&a), settled_a - amount);
    }

    /// An overdrawn transfer leaves every observable value untouched.
    #[test]
    fn failed_transfer_is_atomic(
        pa in 1u128..1_000_000,
        ra in 0u128..PRECISION,
        at in 1u64..1_000,
        excess in 1u128..1_000,
    ) {
        let (mut ctx, c) = setup(PRECISION);
        let (a, b) = (id("a"), id("b"));
        c.mint(&mut ctx, &id("minter"), &a, pa, Rate::from_raw(ra), Timestamp::new(0)).unwrap();
        let now = Timestamp::new(at);
        let settled = ctx.effective_balance_of(&a, now).unwrap();

        let result = c.transfer(&mut ctx, &a, &b, TransferAmount::Exact(settled + excess), now);
        prop_assert!(result.is_err());
        prop_assert_eq!(ctx.principal_balance_of(&a), pa);
        prop_assert_eq!(ctx.principal_balance_of(&b), 0);
        prop_assert_eq!(ctx.last_sync_of(&a), Some(Timestamp::new(0)));
        prop_assert_eq!(ctx.last_sync_of(&b), None);
        prop_assert_eq!(ctx.total_principal(), pa);
    }
}
