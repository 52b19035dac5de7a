use alloy_primitives::{Address, U256, address};
use criterion::{Criterion, criterion_group, criterion_main};
use dex_engine::{Ledger, PoolFactory, Router, Token};
use lazy_static::lazy_static;
use std::hint::black_box;

const TRADER: Address = address!("0x00000000000000000000000000000000000a11ce");

lazy_static! {
    static ref WETH: Token =
        Token::new_with_data(address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), Some("WETH".to_string()), Some(18));
    static ref USDT: Token =
        Token::new_with_data(address!("0xdac17f958d2ee523a2206206994597c13d831ec7"), Some("USDT".to_string()), Some(6));
    static ref FIXTURE: (Ledger, Router) = build_fixture().unwrap();
}

fn build_fixture() -> eyre::Result<(Ledger, Router)> {
    let mut ledger = Ledger::with_timestamp(1_700_000_000);
    let factory = PoolFactory::deploy(&mut ledger, TRADER);
    let router = Router::deploy(&mut ledger, TRADER, &factory);
    for token in [WETH.clone(), USDT.clone()] {
        let address = ledger.add_token(token.clone(), false);
        ledger.mint(address, TRADER, token.parse_units(1_000_000_000))?;
        ledger.approve(address, TRADER, router.address(), U256::MAX)?;
    }
    router.add_liquidity(
        &mut ledger,
        TRADER,
        WETH.get_address(),
        USDT.get_address(),
        WETH.parse_units(1_000),
        USDT.parse_units(3_000_000),
        U256::ZERO,
        U256::ZERO,
        TRADER,
        u64::MAX,
    )?;
    Ok((ledger, router))
}

fn swap_round_trip() -> eyre::Result<U256> {
    let (ledger, router) = &*FIXTURE;
    let mut ledger = ledger.clone();
    let mut amount = WETH.parse_units(1);
    for _ in 0..50 {
        let usdt = router.swap_token_pair(&mut ledger, TRADER, WETH.get_address(), USDT.get_address(), amount, U256::ZERO, TRADER, u64::MAX)?;
        amount = router.swap_token_pair(&mut ledger, TRADER, USDT.get_address(), WETH.get_address(), usdt, U256::ZERO, TRADER, u64::MAX)?;
    }
    Ok(amount)
}

fn quote_path() -> eyre::Result<Vec<U256>> {
    let (ledger, router) = &*FIXTURE;
    let path = [WETH.get_address(), USDT.get_address(), WETH.get_address(), USDT.get_address()];
    Ok(router.get_amounts_out(ledger, WETH.parse_units(10), &path)?)
}

fn benchmark_swaps(c: &mut Criterion) {
    let mut group = c.benchmark_group("router");
    group.sample_size(10);

    group.bench_function("swap_round_trip", |b| b.iter(|| black_box(swap_round_trip())));
    group.bench_function("get_amounts_out", |b| b.iter(|| black_box(quote_path())));
    group.bench_function("get_amount_out", |b| {
        b.iter(|| Router::get_amount_out(black_box(U256::from(10_000)), black_box(U256::from(40_000)), black_box(U256::from(90_000))))
    });
    group.finish();
}

criterion_group!(benches, benchmark_swaps);
criterion_main!(benches);
