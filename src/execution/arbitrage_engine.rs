use crate::errors::{DexError, Result};
use crate::execution::flash_loan::{FlashLenderWrapper, FlashLoanReceiver};
use crate::execution::router::Router;
use crate::execution::types::{ArbitrageEngineStats, ArbitrageReport, ArbitrageState, CycleRoute};
use crate::ledger::Ledger;
use crate::logic::math::checked_add;
use crate::utils::config::ArbitrageConfigSection;
use alloy_primitives::{Address, U256};
use eyre::eyre;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Flash-loan funded cycle executor.
///
/// Borrows one token, trades it around a fixed three-hop cycle through the
/// router and keeps the surplus after repaying the lender. A cycle that does
/// not end above `amount + premium + min_profit` reverts as a whole, loan
/// included.
pub struct ArbitrageEngine {
    address: Address,
    owner: Address,
    router: Router,
    lender: FlashLenderWrapper,
    config: ArbitrageConfigSection,
    state: ArbitrageState,
    last_report: Option<ArbitrageReport>,
    settled_count: u64,
    rejected_count: u64,
}

impl ArbitrageEngine {
    pub fn deploy(ledger: &mut Ledger, owner: Address, router: &Router, lender: FlashLenderWrapper, config: ArbitrageConfigSection) -> Self {
        let address = ledger.next_address(owner);
        info!(engine = %address, %owner, router = %router.address(), lender = %lender.address(), min_profit = config.min_profit, "Arbitrage engine deployed");
        Self {
            address,
            owner,
            router: *router,
            lender,
            config,
            state: ArbitrageState::Idle,
            last_report: None,
            settled_count: 0,
            rejected_count: 0,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn state(&self) -> ArbitrageState {
        self.state
    }

    pub fn last_report(&self) -> Option<&ArbitrageReport> {
        self.last_report.as_ref()
    }

    pub fn get_statistics(&self) -> ArbitrageEngineStats {
        ArbitrageEngineStats {
            state: self.state,
            settled_count: self.settled_count,
            rejected_count: self.rejected_count,
            min_profit: self.config.min_profit(),
        }
    }

    /// Borrows `amount` of `borrow_token` and runs `borrow_token -> hop1 -> hop2 -> borrow_token`.
    pub fn request_flash_loan(&mut self, ledger: &mut Ledger, borrow_token: Address, hop1: Address, hop2: Address, amount: U256) -> Result<ArbitrageReport> {
        if self.state == ArbitrageState::LoanRequested {
            return Err(DexError::Locked);
        }
        let route = CycleRoute::new(borrow_token, hop1, hop2);
        let params = route.encode_params();

        self.state = ArbitrageState::LoanRequested;
        self.last_report = None;

        let lender = Arc::clone(&self.lender);
        let engine = self.address;
        match lender.flash_loan_simple(ledger, engine, self, borrow_token, amount, &params) {
            Ok(()) => {
                self.state = ArbitrageState::Settled;
                self.settled_count += 1;
                let report = self.last_report.clone().ok_or(DexError::FlashLoanRejected)?;
                info!(
                    engine = %self.address,
                    borrowed = %report.borrowed,
                    premium = %report.premium,
                    net_profit = %report.net_profit,
                    profit = %format_amount(ledger, borrow_token, report.net_profit),
                    "Arbitrage settled"
                );
                Ok(report)
            }
            Err(error) => {
                self.state = ArbitrageState::Idle;
                self.rejected_count += 1;
                self.last_report = None;
                warn!(engine = %self.address, %error, %borrow_token, %hop1, %hop2, %amount, "Arbitrage reverted");
                Err(error)
            }
        }
    }

    /// Sends the engine's whole balance of `token` to the owner.
    pub fn withdraw(&self, ledger: &mut Ledger, caller: Address, token: Address) -> Result<U256> {
        if caller != self.owner {
            return Err(DexError::OnlyOwner);
        }
        let balance = ledger.balance_of(token, self.address)?;
        if !balance.is_zero() {
            ledger.transfer(token, self.address, self.owner, balance)?;
        }
        info!(engine = %self.address, %token, %balance, "Withdrawn");
        Ok(balance)
    }

    fn run_cycle(&self, ledger: &mut Ledger, route: &CycleRoute, amount: U256) -> Result<Vec<U256>> {
        let deadline = ledger.block_timestamp();
        let mut amounts = Vec::with_capacity(4);
        amounts.push(amount);

        let mut amount_in = amount;
        for hop in route.path().windows(2) {
            ledger.approve(hop[0], self.address, self.router.address(), amount_in)?;
            amount_in = self.router.swap_token_pair(ledger, self.address, hop[0], hop[1], amount_in, U256::ZERO, self.address, deadline)?;
            amounts.push(amount_in);
        }
        Ok(amounts)
    }
}

impl FlashLoanReceiver for ArbitrageEngine {
    fn address(&self) -> Address {
        self.address
    }

    fn execute_operation(
        &mut self,
        ledger: &mut Ledger,
        lender: Address,
        asset: Address,
        amount: U256,
        premium: U256,
        initiator: Address,
        params: &[u8],
    ) -> Result<bool> {
        if lender != self.lender.address() || initiator != self.address || self.state != ArbitrageState::LoanRequested {
            return Err(DexError::UnauthorizedCallback);
        }
        let route = CycleRoute::decode_params(asset, params)?;

        let amounts = self.run_cycle(ledger, &route, amount)?;
        let final_balance = ledger.balance_of(asset, self.address)?;
        let owed = checked_add(amount, premium)?;
        debug!(engine = %self.address, ?amounts, %final_balance, %owed, "Cycle executed");

        let net_profit = final_balance.checked_sub(owed).ok_or(DexError::NoProfit)?;
        if net_profit <= self.config.min_profit() {
            return Err(DexError::NoProfit);
        }

        ledger.approve(asset, self.address, lender, owed)?;
        self.last_report = Some(ArbitrageReport { route, amounts, borrowed: amount, premium, final_balance, net_profit });
        Ok(true)
    }
}

fn format_amount(ledger: &Ledger, token: Address, value: U256) -> String {
    match ledger.token_info(token) {
        Some(info) => format!("{:.6} {}", info.to_float(value), info.get_symbol()),
        None => value.to_string(),
    }
}

/// Builder pattern for creating and configuring an ArbitrageEngine
pub struct ArbitrageEngineBuilder {
    owner: Address,
    router: Option<Router>,
    lender: Option<FlashLenderWrapper>,
    config: ArbitrageConfigSection,
}

impl ArbitrageEngineBuilder {
    pub fn new(owner: Address) -> Self {
        Self { owner, router: None, lender: None, config: ArbitrageConfigSection::default() }
    }

    pub fn with_router(mut self, router: &Router) -> Self {
        self.router = Some(*router);
        self
    }

    pub fn with_lender(mut self, lender: FlashLenderWrapper) -> Self {
        self.lender = Some(lender);
        self
    }

    pub fn with_config(mut self, config: ArbitrageConfigSection) -> Self {
        self.config = config;
        self
    }

    pub fn with_min_profit(mut self, min_profit: u64) -> Self {
        self.config = self.config.with_min_profit(min_profit);
        self
    }

    pub fn build(self, ledger: &mut Ledger) -> eyre::Result<ArbitrageEngine> {
        let router = self.router.ok_or_else(|| eyre!("router is not set"))?;
        let lender = self.lender.ok_or_else(|| eyre!("flash lender is not set"))?;
        Ok(ArbitrageEngine::deploy(ledger, self.owner, &router, lender, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::flash_loan::{FlashLender, LendingPool};
    use crate::logic::factory::PoolFactory;
    use crate::utils::config::FlashLoanConfigSection;

    const OWNER: Address = Address::new([0x0e; 20]);
    const DEPLOYER: Address = Address::new([0xde; 20]);

    struct Setup {
        ledger: Ledger,
        engine: ArbitrageEngine,
        lender: LendingPool,
        tokens: [Address; 3],
    }

    fn setup() -> eyre::Result<Setup> {
        let mut ledger = Ledger::with_timestamp(1_000);
        let factory = PoolFactory::deploy(&mut ledger, DEPLOYER);
        let router = Router::deploy(&mut ledger, DEPLOYER, &factory);
        let lender = LendingPool::deploy(&mut ledger, DEPLOYER, &FlashLoanConfigSection::default());
        let tokens = [
            ledger.deploy_token(DEPLOYER, "AAA", 18, false),
            ledger.deploy_token(DEPLOYER, "BBB", 18, false),
            ledger.deploy_token(DEPLOYER, "CCC", 18, false),
        ];
        for token in tokens {
            ledger.mint(token, DEPLOYER, U256::from(10_000_000_000u64))?;
            ledger.approve(token, DEPLOYER, router.address(), U256::MAX)?;
        }
        lender.deposit(&mut ledger, DEPLOYER, tokens[0], U256::from(1_000_000_000u64))?;

        // AAA/BBB 1:1, BBB/CCC 1:1, CCC/AAA 1:2 so AAA -> BBB -> CCC -> AAA gains
        let reserves = [(0, 1, 1_000_000u64, 1_000_000u64), (1, 2, 1_000_000, 1_000_000), (2, 0, 1_000_000, 2_000_000)];
        for (a, b, amount_a, amount_b) in reserves {
            router.add_liquidity(&mut ledger, DEPLOYER, tokens[a], tokens[b], U256::from(amount_a), U256::from(amount_b), U256::ZERO, U256::ZERO, DEPLOYER, 1_000)?;
        }

        let engine = ArbitrageEngineBuilder::new(OWNER).with_router(&router).with_lender(Arc::new(lender)).build(&mut ledger)?;
        Ok(Setup { ledger, engine, lender, tokens })
    }

    #[test]
    fn test_builder_requires_router_and_lender() {
        let mut ledger = Ledger::with_timestamp(1);
        assert!(ArbitrageEngineBuilder::new(OWNER).build(&mut ledger).is_err());
    }

    #[test]
    fn test_profitable_cycle() -> eyre::Result<()> {
        let mut s = setup()?;
        let [a, b, c] = s.tokens;
        let report = s.engine.request_flash_loan(&mut s.ledger, a, b, c, U256::from(10_000))?;

        assert_eq!(s.engine.state(), ArbitrageState::Settled);
        assert_eq!(report.amounts.len(), 4);
        assert_eq!(report.premium, s.lender.premium_for(U256::from(10_000))?);
        assert_eq!(s.ledger.balance_of(a, s.engine.address())?, report.net_profit);
        assert_eq!(s.engine.get_statistics().settled_count, 1);

        let withdrawn = s.engine.withdraw(&mut s.ledger, OWNER, a)?;
        assert_eq!(withdrawn, report.net_profit);
        assert_eq!(s.ledger.balance_of(a, OWNER)?, report.net_profit);
        Ok(())
    }

    #[test]
    fn test_losing_cycle_reverts_everything() -> eyre::Result<()> {
        let mut s = setup()?;
        let [a, b, c] = s.tokens;
        let events_before = s.ledger.events().len();
        let lender_before = s.ledger.balance_of(a, s.lender.address())?;

        let result = s.engine.request_flash_loan(&mut s.ledger, a, c, b, U256::from(10_000));
        assert_eq!(result, Err(DexError::NoProfit));
        assert_eq!(s.engine.state(), ArbitrageState::Idle);
        assert_eq!(s.ledger.events().len(), events_before);
        assert_eq!(s.ledger.balance_of(a, s.lender.address())?, lender_before);
        assert_eq!(s.engine.get_statistics().rejected_count, 1);
        Ok(())
    }

    #[test]
    fn test_min_profit_threshold() -> eyre::Result<()> {
        let mut s = setup()?;
        let [a, b, c] = s.tokens;
        s.engine.config = s.engine.config.with_min_profit(1_000_000);
        assert_eq!(s.engine.request_flash_loan(&mut s.ledger, a, b, c, U256::from(10_000)), Err(DexError::NoProfit));
        Ok(())
    }

    #[test]
    fn test_unsolicited_callback() -> eyre::Result<()> {
        let mut s = setup()?;
        let [a, b, c] = s.tokens;
        let params = CycleRoute::new(a, b, c).encode_params();
        let (lender, engine) = (s.lender.address(), s.engine.address());

        let result = s.engine.execute_operation(&mut s.ledger, lender, a, U256::from(1), U256::ZERO, engine, &params);
        assert_eq!(result, Err(DexError::UnauthorizedCallback));

        s.engine.state = ArbitrageState::LoanRequested;
        let result = s.engine.execute_operation(&mut s.ledger, OWNER, a, U256::from(1), U256::ZERO, engine, &params);
        assert_eq!(result, Err(DexError::UnauthorizedCallback));
        let result = s.engine.execute_operation(&mut s.ledger, lender, a, U256::from(1), U256::ZERO, OWNER, &params);
        assert_eq!(result, Err(DexError::UnauthorizedCallback));
        let result = s.engine.execute_operation(&mut s.ledger, lender, a, U256::from(1), U256::ZERO, engine, &params[..39]);
        assert_eq!(result, Err(DexError::InvalidCallbackData));
        Ok(())
    }

    #[test]
    fn test_withdraw_only_owner() -> eyre::Result<()> {
        let mut s = setup()?;
        assert_eq!(s.engine.withdraw(&mut s.ledger, DEPLOYER, s.tokens[0]), Err(DexError::OnlyOwner));
        assert_eq!(s.engine.withdraw(&mut s.ledger, OWNER, s.tokens[0])?, U256::ZERO);
        Ok(())
    }
}
