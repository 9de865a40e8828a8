//! Development-node environment driving mock router and executor contracts

use alloy::{
    network::TransactionBuilder,
    node_bindings::{Anvil, AnvilInstance},
    primitives::{Address, Bytes, U256},
    providers::Provider,
    rpc::types::eth::{TransactionReceipt, TransactionRequest},
    sol,
    sol_types::{SolCall, SolValue},
};
use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, info};
use crate::{
    config::Config,
    environment::{artifacts::load_bytecode, ExecutionEnvironment},
    errors::{AuditError, AuditResult, EnvResult, EnvironmentError},
    network::setup_node_provider,
    types::{ArbitrageParams, ExecutionReceipt},
    ConcreteProvider,
};

sol! {
    function setReserve(address tokenA, address tokenB, uint256 reserveA, uint256 reserveB) external;
    function mint(address to, uint256 amount) external;
    function approve(address spender, uint256 amount) external returns (bool);
    function balanceOf(address account) external view returns (uint256);

    struct ArbParams {
        address[] path;
        uint256 amountIn;
        uint256 minProfit;
    }

    function executeArbitrage(ArbParams params) external;
}

pub struct RpcEnvironment {
    provider: Arc<ConcreteProvider>,
    operator: Address,
    router: Address,
    executor: Address,
    token_code: Bytes,
    // Keeps a spawned node alive for the environment's lifetime
    _anvil: Option<AnvilInstance>,
}

impl RpcEnvironment {
    /// Connects to (or spawns) a development node and deploys the router and executor.
    pub async fn connect(config: &Config) -> AuditResult<Self> {
        let (rpc_url, anvil) = match &config.rpc_url {
            Some(url) => (url.clone(), None),
            None => {
                info!("🛠️  No RPC_URL set, spawning a local Anvil node");
                let anvil = Anvil::new()
                    .try_spawn()
                    .map_err(|e| AuditError::fatal("spawn anvil", anyhow::anyhow!("{}", e)))?;
                (anvil.endpoint(), Some(anvil))
            }
        };

        let provider = setup_node_provider(&rpc_url)
            .await
            .map_err(|e| AuditError::fatal("connect to node", e))?;

        let operator = provider
            .get_accounts()
            .await
            .context("Failed to list node accounts")
            .map_err(|e| AuditError::fatal("resolve operator", e))?
            .first()
            .copied()
            .ok_or_else(|| AuditError::fatal("resolve operator", anyhow::anyhow!("node has no unlocked accounts")))?;

        let router_code = load_bytecode(&config.router_artifact)
            .map_err(|e| AuditError::fatal("load router artifact", e))?;
        let executor_code = load_bytecode(&config.executor_artifact)
            .map_err(|e| AuditError::fatal("load executor artifact", e))?;
        let token_code = load_bytecode(&config.token_artifact)
            .map_err(|e| AuditError::fatal("load token artifact", e))?;

        let router = deploy(&provider, operator, router_code)
            .await
            .map_err(|e| AuditError::fatal("deploy router", e))?;

        let mut executor_init = executor_code.to_vec();
        executor_init.extend_from_slice(&router.abi_encode());
        let executor = deploy(&provider, operator, executor_init.into())
            .await
            .map_err(|e| AuditError::fatal("deploy executor", e))?;

        info!("📜 Router deployed at {}", router);
        info!("📜 Executor deployed at {}", executor);

        Ok(Self {
            provider,
            operator,
            router,
            executor,
            token_code,
            _anvil: anvil,
        })
    }

    pub fn router(&self) -> Address {
        self.router
    }

    async fn send(&self, operation: &'static str, to: Address, input: Vec<u8>) -> EnvResult<TransactionReceipt> {
        let tx = TransactionRequest::default()
            .from(self.operator)
            .to(to)
            .input(input.into());
        let receipt = submit(&self.provider, operation, tx).await?;
        if !receipt.status() {
            return Err(EnvironmentError::Reverted {
                operation,
                reason: format!("transaction {} failed", receipt.transaction_hash),
            });
        }
        Ok(receipt)
    }
}

async fn submit(
    provider: &ConcreteProvider,
    operation: &'static str,
    tx: TransactionRequest,
) -> EnvResult<TransactionReceipt> {
    let pending = provider
        .send_transaction(tx)
        .await
        .map_err(|e| classify(operation, e.to_string(), e.into()))?;
    pending
        .get_receipt()
        .await
        .map_err(|e| classify(operation, e.to_string(), e.into()))
}

async fn deploy(provider: &ConcreteProvider, from: Address, code: Bytes) -> EnvResult<Address> {
    let tx = TransactionRequest::default().from(from).with_deploy_code(code);
    let receipt = submit(provider, "deploy", tx).await?;
    receipt
        .contract_address
        .filter(|_| receipt.status())
        .ok_or(EnvironmentError::Reverted {
            operation: "deploy",
            reason: format!("no contract created by {}", receipt.transaction_hash),
        })
}

// Nodes reject reverting transactions at gas estimation, so reverts arrive as RPC errors.
fn classify(operation: &'static str, message: String, source: anyhow::Error) -> EnvironmentError {
    if message.to_ascii_lowercase().contains("revert") {
        EnvironmentError::Reverted { operation, reason: message }
    } else {
        EnvironmentError::Transport { operation, source }
    }
}

fn gas_used(receipt: &TransactionReceipt) -> u64 {
    u64::try_from(receipt.gas_used).unwrap_or(u64::MAX)
}

impl ExecutionEnvironment for RpcEnvironment {
    fn name(&self) -> &str {
        "rpc"
    }

    fn operator(&self) -> Address {
        self.operator
    }

    fn executor(&self) -> Address {
        self.executor
    }

    async fn create_token(&mut self) -> EnvResult<Address> {
        let token = deploy(&self.provider, self.operator, self.token_code.clone()).await?;
        debug!("Mock token deployed at {}", token);
        Ok(token)
    }

    async fn set_reserve(
        &mut self,
        token_a: Address,
        token_b: Address,
        reserve_a: U256,
        reserve_b: U256,
    ) -> EnvResult<()> {
        let call = setReserveCall {
            tokenA: token_a,
            tokenB: token_b,
            reserveA: reserve_a,
            reserveB: reserve_b,
        };
        self.send("setReserve", self.router, call.abi_encode()).await?;
        Ok(())
    }

    async fn mint(&mut self, token: Address, account: Address, amount: U256) -> EnvResult<()> {
        let call = mintCall { to: account, amount };
        self.send("mint", token, call.abi_encode()).await?;
        Ok(())
    }

    async fn approve(&mut self, token: Address, spender: Address, amount: U256) -> EnvResult<()> {
        let call = approveCall { spender, amount };
        self.send("approve", token, call.abi_encode()).await?;
        Ok(())
    }

    async fn execute_arbitrage(&mut self, params: &ArbitrageParams) -> EnvResult<ExecutionReceipt> {
        let call = executeArbitrageCall {
            params: ArbParams {
                path: params.path.clone(),
                amountIn: params.amount_in,
                minProfit: params.min_profit,
            },
        };
        let receipt = self.send("executeArbitrage", self.executor, call.abi_encode()).await?;
        Ok(ExecutionReceipt {
            gas_used: gas_used(&receipt),
            success: true,
            tx_hash: Some(receipt.transaction_hash),
        })
    }

    async fn balance_of(&self, token: Address, account: Address) -> EnvResult<U256> {
        let tx = TransactionRequest::default()
            .to(token)
            .input(balanceOfCall { account }.abi_encode().into());
        let output = self
            .provider
            .call(&tx)
            .await
            .map_err(|e| EnvironmentError::transport("balanceOf", e))?;
        let decoded = balanceOfCall::abi_decode_returns(&output, true)
            .map_err(|e| EnvironmentError::transport("balanceOf", e))?;
        Ok(decoded._0)
    }
}
