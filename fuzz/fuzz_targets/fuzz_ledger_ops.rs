#![no_main]

use libfuzzer_sys::fuzz_target;

use drip_accrual::{LedgerContext, Role, RoleTable, TransferCoordinator};
use drip_store::MemoryLedger;
use drip_types::{AccountId, Rate, Timestamp, TransferAmount, PRECISION};

const ACCOUNTS: [&str; 4] = ["a", "b", "c", "d"];

// Drive the coordinator with arbitrary operation sequences. Operations may fail,
// but principal must always add up to the base ledger's total supply and a
// failed operation must leave every balance untouched.
fuzz_target!(|data: &[u8]| {
    let owner = AccountId::new("owner");
    let minter = AccountId::new("minter");
    let mut roles = RoleTable::new(owner.clone());
    if roles.grant_role(&owner, Role::MintBurn, minter.clone()).is_err() {
        return;
    }
    let coordinator = TransferCoordinator::new(roles);
    let mut ctx = LedgerContext::new(MemoryLedger::new(), Rate::ONE, Timestamp::new(0));

    let mut now = 0u64;
    for chunk in data.chunks_exact(4) {
        now += u64::from(chunk[0] % 4);
        let at = Timestamp::new(now);
        let x = AccountId::new(ACCOUNTS[usize::from(chunk[1] % 4)]);
        let y = AccountId::new(ACCOUNTS[usize::from(chunk[2] % 4)]);
        let amount = u128::from(chunk[3]);
        let exact = if chunk[3] == u8::MAX {
            TransferAmount::All
        } else {
            TransferAmount::Exact(amount)
        };

        let before: Vec<u128> = ACCOUNTS
            .iter()
            .map(|n| ctx.principal_balance_of(&AccountId::new(*n)))
            .collect();

        let result = match (chunk[0] >> 2) & 0b111 {
            0 => coordinator
                .mint(&mut ctx, &minter, &x, amount, Rate::from_raw(PRECISION / (amount + 1)), at)
                .map(|_| ()),
            1 => coordinator.burn(&mut ctx, &minter, &x, exact, at).map(|_| ()),
            2 => coordinator.approve(&mut ctx, &x, &y, amount),
            3 => coordinator
                .transfer_from(&mut ctx, &y, &x, &minter, exact, at)
                .map(|_| ()),
            4 => coordinator.settle(&mut ctx, &x, at).map(|_| ()),
            5 => coordinator
                .set_global_rate(&mut ctx, &owner, Rate::from_raw(amount), at),
            _ => coordinator.transfer(&mut ctx, &x, &y, exact, at).map(|_| ()),
        };

        if result.is_err() {
            let after: Vec<u128> = ACCOUNTS
                .iter()
                .map(|n| ctx.principal_balance_of(&AccountId::new(*n)))
                .collect();
            assert_eq!(before, after);
        }

        let held: u128 = ACCOUNTS
            .iter()
            .chain(["minter"].iter())
            .map(|n| ctx.principal_balance_of(&AccountId::new(*n)))
            .sum();
        assert_eq!(held, ctx.total_principal());
    }
});
