#![no_main]

use libfuzzer_sys::fuzz_target;

use drip_accrual::AccountAccrual;
use drip_types::{Rate, Timestamp};

fn word(bytes: &[u8]) -> u128 {
    let mut buf = [0u8; 16];
    buf.copy_from_slice(bytes);
    u128::from_le_bytes(buf)
}

// Fuzz effective-balance computation with arbitrary principal, rate and times.
// Overflow and backward clocks must surface as errors, never as panics.
fuzz_target!(|data: &[u8]| {
    if data.len() < 48 {
        return;
    }

    let principal = word(&data[0..16]);
    let rate = Rate::from_raw(word(&data[16..32]));
    let last_sync = u64::from_le_bytes([
        data[32], data[33], data[34], data[35],
        data[36], data[37], data[38], data[39],
    ]);
    let now = u64::from_le_bytes([
        data[40], data[41], data[42], data[43],
        data[44], data[45], data[46], data[47],
    ]);

    let accrual = AccountAccrual::new(rate, Timestamp::new(last_sync));
    if let Ok(balance) = accrual.effective_balance(principal, Timestamp::new(now)) {
        assert!(balance >= principal);
        if rate.is_zero() || now == last_sync {
            assert_eq!(balance, principal);
        }
    }
    if now < last_sync {
        assert!(accrual.effective_balance(principal, Timestamp::new(now)).is_err());
    }
});
