//! Fixtures and fakes shared by the unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Map};

use crate::{
    abiencode,
    chain::{ChainError, ChainReader},
    channel::{
        update_channel_balance, Address, Amount, AssetId, Balance, ChannelUpdate,
        CommitmentHasher, CoreChannelState, CreateParams, CreateUpdateDetails,
        DepositUpdateDetails, FullChannelState, Hash, NetworkContext, ParamsDetails,
        PublicIdentifier, ResolveUpdateDetails, SetupUpdateDetails, TransferState,
        TransferUpdate, UpdateDetails, UpdateParams,
    },
    sig::{self, ChannelSigner, EthSigner, SignatureRecovery},
    Signature,
};

const ALICE_SECRET: [u8; 32] = [0x11; 32];
const BOB_SECRET: [u8; 32] = [0x22; 32];

pub const TRANSFER_ID: Hash = Hash([0xab; 32]);
pub const TRANSFER_DEFINITION: Address = Address([0x55; 20]);

/// Install a subscriber printing through the test harness, `RUST_LOG`
/// selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `(alice, bob)`, always the same keys.
pub fn signers() -> (EthSigner, EthSigner) {
    (
        EthSigner::from_secret_bytes(&ALICE_SECRET).unwrap(),
        EthSigner::from_secret_bytes(&BOB_SECRET).unwrap(),
    )
}

pub fn alice_identifier() -> PublicIdentifier {
    signers().0.public_identifier().clone()
}

pub fn bob_identifier() -> PublicIdentifier {
    signers().1.public_identifier().clone()
}

/// A funded channel with a single (native) asset, 100 each.
pub fn full_state() -> FullChannelState {
    let (alice, bob) = signers();
    let (alice, bob) = (alice.address(), bob.address());

    FullChannelState {
        core: CoreChannelState {
            channel_address: Address([0xcc; 20]),
            alice,
            bob,
            asset_ids: vec![Address::default()],
            balances: vec![Balance {
                to: [alice, bob],
                amount: [100u64.into(), 100u64.into()],
            }],
            processed_deposits_a: vec![100u64.into()],
            processed_deposits_b: vec![100u64.into()],
            defund_nonces: vec![1u64.into()],
            timeout: 86400u64.into(),
            nonce: 2,
            merkle_root: Hash::default(),
        },
        alice_identifier: alice_identifier(),
        bob_identifier: bob_identifier(),
        network_context: NetworkContext {
            chain_id: 1337,
            channel_factory_address: Address([0xfa; 20]),
            transfer_registry_address: Address([0xfb; 20]),
        },
        latest_update: None,
        in_dispute: false,
    }
}

/// Alice locking 30 of the native asset into a hashlock transfer.
pub fn create_params(state: &FullChannelState) -> CreateParams {
    let balance = Balance {
        to: [state.core.alice, state.core.bob],
        amount: [30u64.into(), Amount::zero()],
    };
    let mut data = Map::new();
    data.insert("lockHash".to_string(), json!("0xabc"));
    data.insert("expiry".to_string(), json!("0"));

    CreateParams {
        channel_address: state.core.channel_address,
        balance,
        asset_id: state.core.asset_ids[0],
        transfer_definition: TRANSFER_DEFINITION,
        transfer_initial_state: TransferState { balance, data },
        timeout: 3600u64.into(),
        meta: Some(json!({ "message": "coffee" })),
    }
}

/// The update resulting from [create_params] applied by alice.
pub fn create_update() -> ChannelUpdate {
    let state = full_state();
    let params = UpdateParams {
        channel_address: state.core.channel_address,
        details: ParamsDetails::Create(create_params(&state)),
    };
    apply_params(&params, &state, &alice_identifier())
}

fn ledger_balance(state: &FullChannelState, asset_id: AssetId) -> Balance {
    state
        .core
        .asset_index(asset_id)
        .and_then(|idx| state.core.balances.get(idx).copied())
        .unwrap_or_else(|| Balance::zero([state.core.alice, state.core.bob]))
}

/// Minimal update engine: what the counterparty would have sent us after
/// applying `params` to `state` as `from`.
pub fn apply_params(
    params: &UpdateParams,
    state: &FullChannelState,
    from: &PublicIdentifier,
) -> ChannelUpdate {
    let from_alice = *from == state.alice_identifier;
    let (initiator, counterparty) = if from_alice {
        (state.core.alice, state.bob_identifier.clone())
    } else {
        (state.core.bob, state.alice_identifier.clone())
    };

    let (to_identifier, asset_id, balance, details) = match &params.details {
        ParamsDetails::Setup(p) => (
            p.counterparty_identifier.clone(),
            Address::default(),
            Balance::zero([state.core.alice, state.core.bob]),
            UpdateDetails::Setup(SetupUpdateDetails {
                timeout: p.timeout,
                network_context: p.network_context,
                meta: p.meta.clone(),
            }),
        ),
        ParamsDetails::Deposit(p) => {
            let idx = state.core.asset_index(p.asset_id).unwrap();
            (
                counterparty,
                p.asset_id,
                ledger_balance(state, p.asset_id),
                UpdateDetails::Deposit(DepositUpdateDetails {
                    total_deposits_alice: state.core.processed_deposits_a[idx],
                    total_deposits_bob: state.core.processed_deposits_b[idx],
                    meta: p.meta.clone(),
                }),
            )
        }
        ParamsDetails::Create(p) => {
            let balance = update_channel_balance(
                TransferUpdate::Create,
                p.asset_id,
                &p.balance,
                &state.core,
                initiator,
            )
            .unwrap();
            (
                counterparty,
                p.asset_id,
                balance,
                UpdateDetails::Create(CreateUpdateDetails {
                    transfer_id: TRANSFER_ID,
                    balance,
                    transfer_definition: p.transfer_definition,
                    transfer_timeout: p.timeout,
                    transfer_initial_state: p.transfer_initial_state.clone(),
                    transfer_encodings: vec![
                        "tuple(tuple(address[2] to, uint256[2] amount) balance, bytes32 lockHash, uint256 expiry)".to_string(),
                        "tuple(bytes32 preImage)".to_string(),
                    ],
                    merkle_root: Hash([0x33; 32]),
                    meta: p.meta.clone(),
                }),
            )
        }
        ParamsDetails::Resolve(p) => {
            let asset_id = state.core.asset_ids[0];
            (
                counterparty,
                asset_id,
                ledger_balance(state, asset_id),
                UpdateDetails::Resolve(ResolveUpdateDetails {
                    transfer_id: p.transfer_id,
                    transfer_definition: TRANSFER_DEFINITION,
                    transfer_resolver: p.transfer_resolver.clone(),
                    merkle_root: Hash::default(),
                    meta: p.meta.clone(),
                }),
            )
        }
    };

    ChannelUpdate {
        channel_address: params.channel_address,
        from_identifier: from.clone(),
        to_identifier,
        nonce: state.core.nonce + 1,
        balance,
        asset_id,
        details,
        alice_signature: None,
        bob_signature: None,
    }
}

/// Signer whose backend always fails.
pub struct FailingSigner {
    address: Address,
    identifier: PublicIdentifier,
}

impl FailingSigner {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            identifier: PublicIdentifier::new(format!("failing-{address}")),
        }
    }
}

#[async_trait]
impl ChannelSigner for FailingSigner {
    fn public_identifier(&self) -> &PublicIdentifier {
        &self.identifier
    }

    fn address(&self) -> Address {
        self.address
    }

    async fn sign_message(&self, _hash: Hash) -> Result<Signature, sig::Error> {
        Err(sig::Error::Backend("key store unavailable".to_string()))
    }
}

/// Recovery with scripted results per signature, independent of the hash.
/// Unknown signatures fail to recover.
#[derive(Debug, Default)]
pub struct FakeRecovery {
    results: HashMap<Signature, Result<Address, sig::Error>>,
}

impl FakeRecovery {
    pub fn with_signer(mut self, sig: Signature, signer: Address) -> Self {
        self.results.insert(sig, Ok(signer));
        self
    }

    pub fn with_malformed(mut self, sig: Signature, reason: &str) -> Self {
        self.results
            .insert(sig, Err(sig::Error::Backend(reason.to_string())));
        self
    }
}

#[async_trait]
impl SignatureRecovery for FakeRecovery {
    async fn recover(&self, _hash: Hash, sig: Signature) -> Result<Address, sig::Error> {
        self.results
            .get(&sig)
            .cloned()
            .unwrap_or_else(|| Err(sig::Error::Backend("unknown signature".to_string())))
    }
}

/// Hasher rejecting every state.
pub struct FailingHasher;

impl CommitmentHasher for FailingHasher {
    fn hash_core_state(&self, _core: &CoreChannelState) -> Result<Hash, abiencode::Error> {
        Err(abiencode::Error::LedgerLengthMismatch {
            field: "balances",
            expected: 1,
            actual: 0,
        })
    }
}

/// In-memory deposit totals. Assets without totals read as zero.
#[derive(Debug, Default)]
pub struct FakeChainReader {
    totals: HashMap<AssetId, (Amount, Amount)>,
    fail_a: Option<String>,
    fail_b: Option<String>,
}

impl FakeChainReader {
    pub fn with_totals(mut self, asset_id: AssetId, alice: u64, bob: u64) -> Self {
        self.totals.insert(asset_id, (alice.into(), bob.into()));
        self
    }

    pub fn failing_a(mut self, reason: &str) -> Self {
        self.fail_a = Some(reason.to_string());
        self
    }

    pub fn failing_b(mut self, reason: &str) -> Self {
        self.fail_b = Some(reason.to_string());
        self
    }

    fn totals(&self, asset_id: AssetId) -> (Amount, Amount) {
        self.totals
            .get(&asset_id)
            .copied()
            .unwrap_or((Amount::zero(), Amount::zero()))
    }
}

#[async_trait]
impl ChainReader for FakeChainReader {
    async fn get_total_deposited_a(
        &self,
        _channel_address: Address,
        _chain_id: u64,
        asset_id: AssetId,
    ) -> Result<Amount, ChainError> {
        match &self.fail_a {
            Some(reason) => Err(ChainError::new(reason.as_str())),
            None => Ok(self.totals(asset_id).0),
        }
    }

    async fn get_total_deposited_b(
        &self,
        _channel_address: Address,
        _chain_id: u64,
        asset_id: AssetId,
    ) -> Result<Amount, ChainError> {
        match &self.fail_b {
            Some(reason) => Err(ChainError::new(reason.as_str())),
            None => Ok(self.totals(asset_id).1),
        }
    }
}
