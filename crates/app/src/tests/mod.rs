// Path: crates/app/src/tests/mod.rs
//! End-to-end scenarios driven through the facade, the way the consensus
//! driver would.

use crate::app::Aurum;
use crate::plugins::counter::{CounterPlugin, CounterPluginState, CounterTx};
use aurum_crypto::{Address, PrivateKey, PublicKey};
use aurum_state::MemStore;
use aurum_types::codec;
use aurum_types::{
    Account, AccountGetter, AppTx, Code, Coin, Coins, ExecResult, KVStore, SendTx, Tx, TxInput,
    TxOutput, Validator,
};
use std::sync::Arc;

const CHAIN_ID: &str = "test_chain_id";

struct TestAccount {
    priv_key: PrivateKey,
    pub_key: PublicKey,
    addr: Address,
}

fn test_account(secret: &[u8]) -> TestAccount {
    let priv_key = PrivateKey::from_secret_ed25519(secret);
    let pub_key = priv_key.pub_key();
    TestAccount {
        priv_key,
        pub_key,
        addr: pub_key.address(),
    }
}

fn coins(pairs: &[(&str, i64)]) -> Coins {
    Coins(pairs.iter().map(|(d, a)| Coin::new(*d, *a)).collect())
}

fn fresh_app() -> Aurum<MemStore> {
    let mut app = Aurum::new(MemStore::new());
    assert_eq!(app.set_option("base/chainID", CHAIN_ID), "Success");
    app
}

fn seed_account(app: &mut Aurum<MemStore>, acct: &TestAccount, balance: Coins) {
    let account = Account {
        pub_key: Some(acct.pub_key),
        sequence: 0,
        balance,
    };
    let json = serde_json::to_string(&account).unwrap();
    assert_eq!(app.set_option("base/account", &json), "Success");
}

fn stored_account(app: &Aurum<MemStore>, addr: &Address) -> Account {
    app.state()
        .get_account(addr)
        .unwrap()
        .expect("account should exist")
}

fn signed_send_bytes(
    from: &TestAccount,
    sequence: i64,
    input: Coins,
    outputs: Vec<(Address, Coins)>,
    fee: Coin,
) -> Vec<u8> {
    let mut send = SendTx {
        gas: 0,
        fee,
        inputs: vec![TxInput::new(from.pub_key, input, sequence)],
        outputs: outputs
            .into_iter()
            .map(|(address, coins)| TxOutput { address, coins })
            .collect(),
    };
    let sig = from.priv_key.sign(&Tx::Send(send.clone()).sign_bytes(CHAIN_ID));
    assert!(send.set_signature(&from.addr, sig));
    codec::to_bytes_canonical(&Tx::Send(send))
}

fn counter_tx_bytes(
    from: &TestAccount,
    plugin_name: &str,
    valid: bool,
    fee: Coin,
    input_coins: Coins,
    sequence: i64,
    app_fee: Coins,
) -> Vec<u8> {
    let data = codec::to_bytes_canonical(&CounterTx {
        valid,
        fee: app_fee,
    });
    let mut app_tx = AppTx {
        gas: 0,
        fee,
        name: plugin_name.into(),
        input: TxInput::new(from.pub_key, input_coins, sequence),
        data,
    };
    app_tx.set_signature(from.priv_key.sign(&Tx::App(app_tx.clone()).sign_bytes(CHAIN_ID)));
    codec::to_bytes_canonical(&Tx::App(app_tx))
}

fn counter_state(app: &Aurum<MemStore>, plugin: &CounterPlugin) -> CounterPluginState {
    match app.state().get(&plugin.state_key()).unwrap() {
        None => CounterPluginState::default(),
        Some(bytes) => codec::from_bytes_canonical(&bytes).unwrap(),
    }
}

fn total_held(accounts: &[&Account], denom: &str) -> i64 {
    accounts.iter().map(|a| a.balance.amount_of(denom)).sum()
}

// ---------------------------------------------------------------- SendTx

#[test]
fn send_moves_coins_and_pays_the_fee() {
    let alice = test_account(b"test1");
    let bob = test_account(b"test2");
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 1000), ("gold", 1000)]));

    let res = app.deliver_tx(&signed_send_bytes(
        &alice,
        1,
        coins(&[("", 11)]),
        vec![(bob.addr, coins(&[("", 10)]))],
        Coin::new("", 1),
    ));
    assert_eq!(res.unwrap().log, "Success");

    let alice_acc = stored_account(&app, &alice.addr);
    assert_eq!(alice_acc.balance, coins(&[("", 989), ("gold", 1000)]));
    assert_eq!(alice_acc.sequence, 1);

    let bob_acc = stored_account(&app, &bob.addr);
    assert_eq!(bob_acc.balance, coins(&[("", 10)]));
    assert_eq!(bob_acc.sequence, 0);
    assert!(bob_acc.pub_key.is_none(), "outputs never install a key");

    // conservation: total before == total after + fee
    assert_eq!(total_held(&[&alice_acc, &bob_acc], ""), 1000 - 1);
    assert_eq!(total_held(&[&alice_acc, &bob_acc], "gold"), 1000);
}

#[test]
fn wrong_sequence_is_rejected_and_leaves_state_unchanged() {
    let alice = test_account(b"test1");
    let bob = test_account(b"test2");
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 1000), ("gold", 1000)]));

    let err = app
        .deliver_tx(&signed_send_bytes(
            &alice,
            2,
            coins(&[("", 11)]),
            vec![(bob.addr, coins(&[("", 10)]))],
            Coin::new("", 1),
        ))
        .unwrap_err();
    assert_eq!(err.code, Code::BaseInvalidSequence);
    assert_eq!(
        err.log,
        "Error in DeliverTx: in validateInputsAdvanced(): Got 2, expected 1. (acc.seq=0)"
    );

    let alice_acc = stored_account(&app, &alice.addr);
    assert_eq!(alice_acc.balance, coins(&[("", 1000), ("gold", 1000)]));
    assert_eq!(alice_acc.sequence, 0);
    assert!(app.state().get_account(&bob.addr).unwrap().is_none());
}

#[test]
fn duplicate_output_addresses_are_rejected() {
    let alice = test_account(b"test1");
    let bob = test_account(b"test2");
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 1000)]));

    let err = app
        .deliver_tx(&signed_send_bytes(
            &alice,
            1,
            coins(&[("", 21)]),
            vec![
                (bob.addr, coins(&[("", 10)])),
                (bob.addr, coins(&[("", 10)])),
            ],
            Coin::new("", 1),
        ))
        .unwrap_err();
    assert_eq!(err.code, Code::BaseDuplicateAddress);
    assert_eq!(err.log, "Error in DeliverTx: in getOrMakeOutputs()");
}

#[test]
fn input_output_overlap_reuses_the_loaded_account() {
    let alice = test_account(b"test1");
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 1000)]));

    // Alice pays herself; only the fee leaves her balance.
    let res = app.deliver_tx(&signed_send_bytes(
        &alice,
        1,
        coins(&[("", 11)]),
        vec![(alice.addr, coins(&[("", 10)]))],
        Coin::new("", 1),
    ));
    assert!(res.is_ok(), "{res:?}");

    let alice_acc = stored_account(&app, &alice.addr);
    assert_eq!(alice_acc.balance, coins(&[("", 999)]));
    assert_eq!(alice_acc.sequence, 1);
}

#[test]
fn unknown_input_account_is_rejected_in_get_inputs() {
    let ghost = test_account(b"nobody");
    let bob = test_account(b"test2");
    let mut app = fresh_app();

    let err = app
        .deliver_tx(&signed_send_bytes(
            &ghost,
            1,
            coins(&[("", 11)]),
            vec![(bob.addr, coins(&[("", 10)]))],
            Coin::new("", 1),
        ))
        .unwrap_err();
    assert_eq!(err.code, Code::BaseUnknownAddress);
    assert_eq!(err.log, "Error in DeliverTx: in getInputs()");
}

#[test]
fn totals_must_balance_against_the_fee() {
    let alice = test_account(b"test1");
    let bob = test_account(b"test2");
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 1000)]));

    // input 11 != output 10 + fee 0
    let err = app
        .deliver_tx(&signed_send_bytes(
            &alice,
            1,
            coins(&[("", 11)]),
            vec![(bob.addr, coins(&[("", 10)]))],
            Coin::new("", 0),
        ))
        .unwrap_err();
    assert_eq!(err.code, Code::BaseInvalidOutput);
    assert_eq!(
        err.log,
        "Error in DeliverTx: Input total != output total + fees"
    );
}

#[test]
fn tampered_signature_is_rejected() {
    let alice = test_account(b"test1");
    let mallory = test_account(b"mallory");
    let bob = test_account(b"test2");
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 1000)]));

    // signed by mallory, claiming alice's account
    let mut send = SendTx {
        gas: 0,
        fee: Coin::new("", 1),
        inputs: vec![TxInput {
            address: alice.addr,
            coins: coins(&[("", 11)]),
            sequence: 1,
            signature: None,
            pub_key: Some(alice.pub_key),
        }],
        outputs: vec![TxOutput {
            address: bob.addr,
            coins: coins(&[("", 10)]),
        }],
    };
    let sig = mallory
        .priv_key
        .sign(&Tx::Send(send.clone()).sign_bytes(CHAIN_ID));
    send.set_signature(&alice.addr, sig);

    let err = app
        .deliver_tx(&codec::to_bytes_canonical(&Tx::Send(send)))
        .unwrap_err();
    assert_eq!(err.code, Code::BaseInvalidSignature);
}

#[test]
fn foreign_pub_key_for_an_address_is_rejected() {
    let alice = test_account(b"test1");
    let mallory = test_account(b"mallory");
    let bob = test_account(b"test2");
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 1000)]));

    // mallory signs with her own key but claims alice's address
    let mut send = SendTx {
        gas: 0,
        fee: Coin::new("", 1),
        inputs: vec![TxInput {
            address: alice.addr,
            coins: coins(&[("", 11)]),
            sequence: 1,
            signature: None,
            pub_key: Some(mallory.pub_key),
        }],
        outputs: vec![TxOutput {
            address: bob.addr,
            coins: coins(&[("", 10)]),
        }],
    };
    let sig = mallory
        .priv_key
        .sign(&Tx::Send(send.clone()).sign_bytes(CHAIN_ID));
    send.set_signature(&alice.addr, sig);

    let err = app
        .deliver_tx(&codec::to_bytes_canonical(&Tx::Send(send)))
        .unwrap_err();
    assert_eq!(err.code, Code::BaseInvalidInput);
    assert!(err.log.contains("PubKey does not match address"));
}

// ----------------------------------------------------------- size & codec

#[test]
fn oversize_transactions_are_rejected_before_decoding() {
    let mut app = fresh_app();
    let err = app.deliver_tx(&vec![0u8; 10_241]).unwrap_err();
    assert_eq!(err.code, Code::BaseEncodingError);
    assert_eq!(err.log, "Tx size exceeds maximum");

    // at the limit the bytes reach the decoder instead
    let err = app.deliver_tx(&vec![0u8; 10_240]).unwrap_err();
    assert_eq!(err.code, Code::BaseEncodingError);
    assert!(err.log.starts_with("Error decoding tx"));
}

// --------------------------------------------------------- check vs deliver

#[test]
fn check_accepts_iff_deliver_would_and_leaves_live_state_alone() {
    let alice = test_account(b"test1");
    let bob = test_account(b"test2");

    let good = |app: &mut Aurum<MemStore>| {
        seed_account(app, &alice, coins(&[("", 1000)]));
        signed_send_bytes(
            &alice,
            1,
            coins(&[("", 11)]),
            vec![(bob.addr, coins(&[("", 10)]))],
            Coin::new("", 1),
        )
    };

    // accept path: check leaves the live state untouched
    let mut app = fresh_app();
    let tx = good(&mut app);
    assert!(app.check_tx(&tx).is_ok());
    assert_eq!(stored_account(&app, &alice.addr).sequence, 0);
    assert_eq!(
        stored_account(&app, &alice.addr).balance,
        coins(&[("", 1000)])
    );
    assert!(app.state().get_account(&bob.addr).unwrap().is_none());
    assert!(app.deliver_tx(&tx).is_ok());

    // reject path: same code from both, modulo the prefix
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 5)]));
    let broke = signed_send_bytes(
        &alice,
        1,
        coins(&[("", 11)]),
        vec![(bob.addr, coins(&[("", 10)]))],
        Coin::new("", 1),
    );
    let check_err = app.check_tx(&broke).unwrap_err();
    let deliver_err = app.deliver_tx(&broke).unwrap_err();
    assert_eq!(check_err.code, Code::BaseInsufficientFunds);
    assert_eq!(check_err.code, deliver_err.code);
    assert!(check_err.log.starts_with("Error in CheckTx"));
    assert!(deliver_err.log.starts_with("Error in DeliverTx"));
}

#[test]
fn commit_replaces_the_check_shadow() {
    let alice = test_account(b"test1");
    let bob = test_account(b"test2");
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 1000)]));

    let tx = signed_send_bytes(
        &alice,
        1,
        coins(&[("", 11)]),
        vec![(bob.addr, coins(&[("", 10)]))],
        Coin::new("", 1),
    );

    assert!(app.check_tx(&tx).is_ok());
    // the shadow remembered the sequence bump
    let err = app.check_tx(&tx).unwrap_err();
    assert_eq!(err.code, Code::BaseInvalidSequence);

    // nothing was delivered, so a commit resets the shadow to the
    // committed state and the transaction checks clean again
    let (hash, log) = app.commit();
    assert!(!hash.is_empty());
    assert_eq!(log, "Success");
    assert!(app.check_tx(&tx).is_ok());
}

#[test]
fn commit_root_reflects_delivered_state() {
    let alice = test_account(b"test1");
    let bob = test_account(b"test2");
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 1000)]));
    let (before, _) = app.commit();

    app.deliver_tx(&signed_send_bytes(
        &alice,
        1,
        coins(&[("", 11)]),
        vec![(bob.addr, coins(&[("", 10)]))],
        Coin::new("", 1),
    ))
    .unwrap();
    let (after, _) = app.commit();
    assert_ne!(before, after);
}

// ----------------------------------------------------------------- AppTx

#[test]
fn counter_success_charges_input_and_bumps_counter() {
    let alice = test_account(b"test1");
    let mut app = fresh_app();
    let plugin = CounterPlugin::new("testcounter");
    let key_probe = CounterPlugin::new("testcounter");
    app.register_plugin(Arc::new(plugin));
    seed_account(&mut app, &alice, coins(&[("", 1000), ("gold", 1000)]));

    let res = app.deliver_tx(&counter_tx_bytes(
        &alice,
        "testcounter",
        true,
        Coin::new("", 1),
        coins(&[("", 3), ("gold", 1)]),
        1,
        coins(&[("", 2), ("gold", 1)]),
    ));
    assert!(res.is_ok(), "{res:?}");

    let alice_acc = stored_account(&app, &alice.addr);
    assert_eq!(alice_acc.balance, coins(&[("", 997), ("gold", 999)]));
    assert_eq!(alice_acc.sequence, 1);

    let state = counter_state(&app, &key_probe);
    assert_eq!(state.counter, 1);
    assert_eq!(state.total_fees, coins(&[("", 2), ("gold", 1)]));
}

#[test]
fn counter_failure_keeps_the_fee_and_refunds_the_rest() {
    let alice = test_account(b"test1");
    let mut app = fresh_app();
    let key_probe = CounterPlugin::new("testcounter");
    app.register_plugin(Arc::new(CounterPlugin::new("testcounter")));
    seed_account(&mut app, &alice, coins(&[("", 1000), ("gold", 1000)]));

    // the plugin wants more gold than was forwarded
    let err = app
        .deliver_tx(&counter_tx_bytes(
            &alice,
            "testcounter",
            true,
            Coin::new("", 1),
            coins(&[("", 3), ("gold", 1)]),
            1,
            coins(&[("", 2), ("gold", 2)]),
        ))
        .unwrap_err();
    assert_eq!(err.code, Code::BaseInsufficientFunds);
    assert_eq!(
        err.log,
        "Error in DeliverTx: CounterTx.Fee is not covered by context.Coins"
    );

    let alice_acc = stored_account(&app, &alice.addr);
    // fee captured, forwarded coins refunded in full
    assert_eq!(alice_acc.balance, coins(&[("", 999), ("gold", 1000)]));
    // the sequence increment survives the refund
    assert_eq!(alice_acc.sequence, 1);

    assert_eq!(counter_state(&app, &key_probe).counter, 0);
}

#[test]
fn invalid_counter_tx_discards_plugin_writes() {
    let alice = test_account(b"test1");
    let mut app = fresh_app();
    let key_probe = CounterPlugin::new("testcounter");
    app.register_plugin(Arc::new(CounterPlugin::new("testcounter")));
    seed_account(&mut app, &alice, coins(&[("", 1000)]));

    let err = app
        .deliver_tx(&counter_tx_bytes(
            &alice,
            "testcounter",
            false,
            Coin::new("", 1),
            coins(&[("", 3)]),
            1,
            Coins::new(),
        ))
        .unwrap_err();
    assert_eq!(err.code, Code::InternalError);
    assert!(err.log.contains("CounterTx.Valid must be true"));
    assert_eq!(counter_state(&app, &key_probe).counter, 0);

    let alice_acc = stored_account(&app, &alice.addr);
    assert_eq!(alice_acc.balance, coins(&[("", 999)]), "fee still captured");
    assert_eq!(alice_acc.sequence, 1);
}

#[test]
fn unknown_plugin_name_reports_unknown_address() {
    let alice = test_account(b"test1");
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 1000)]));

    let err = app
        .deliver_tx(&counter_tx_bytes(
            &alice,
            "ghost",
            true,
            Coin::new("", 1),
            coins(&[("", 3)]),
            1,
            Coins::new(),
        ))
        .unwrap_err();
    assert_eq!(err.code, Code::BaseUnknownAddress);
    assert_eq!(err.log, "Error in DeliverTx: Unrecognized plugin nameghost");

    // nothing was deducted: the lookup precedes the deduction
    let alice_acc = stored_account(&app, &alice.addr);
    assert_eq!(alice_acc.balance, coins(&[("", 1000)]));
    assert_eq!(alice_acc.sequence, 0);
}

#[test]
fn check_tx_never_invokes_the_plugin() {
    let alice = test_account(b"test1");
    let mut app = fresh_app();
    let key_probe = CounterPlugin::new("testcounter");
    app.register_plugin(Arc::new(CounterPlugin::new("testcounter")));
    seed_account(&mut app, &alice, coins(&[("", 1000)]));

    let tx = counter_tx_bytes(
        &alice,
        "testcounter",
        true,
        Coin::new("", 1),
        coins(&[("", 3)]),
        1,
        Coins::new(),
    );
    assert!(app.check_tx(&tx).is_ok());

    assert_eq!(counter_state(&app, &key_probe).counter, 0);
    // and the live account is untouched
    let alice_acc = stored_account(&app, &alice.addr);
    assert_eq!(alice_acc.balance, coins(&[("", 1000)]));
    assert_eq!(alice_acc.sequence, 0);
}

/// Port of the original counter fee matrix: each row is
/// (fee, input coins, sequence, app fee, expect success).
#[test]
fn counter_fee_matrix() {
    let alice = test_account(b"test1");
    let mut app = fresh_app();
    app.register_plugin(Arc::new(CounterPlugin::new("testcounter")));
    seed_account(&mut app, &alice, coins(&[("", 1000), ("gold", 1000)]));

    let mut deliver = |fee: Coin, input: Coins, seq: i64, app_fee: Coins| -> ExecResult {
        app.deliver_tx(&counter_tx_bytes(
            &alice,
            "testcounter",
            true,
            fee,
            input,
            seq,
            app_fee,
        ))
    };

    // basic send, no fee
    assert!(deliver(Coin::default(), coins(&[("", 1)]), 1, Coins::new()).is_ok());
    // fee exceeds input
    assert!(deliver(Coin::new("", 2), coins(&[("", 1)]), 2, Coins::new()).is_err());
    // input equals fee
    assert!(deliver(Coin::new("", 2), coins(&[("", 2)]), 2, Coins::new()).is_ok());
    // more input than fee
    assert!(deliver(Coin::new("", 2), coins(&[("", 3)]), 3, Coins::new()).is_ok());
    // input equals fee + app fee
    assert!(deliver(
        Coin::new("", 1),
        coins(&[("", 3), ("gold", 1)]),
        4,
        coins(&[("", 2), ("gold", 1)]),
    )
    .is_ok());
    // not enough "" for the app fee; deduction happened, sequence advanced
    assert!(deliver(
        Coin::new("", 1),
        coins(&[("", 2), ("gold", 1)]),
        5,
        coins(&[("", 2), ("gold", 1)]),
    )
    .is_err());
    // not enough gold either; the previous failure already used seq 5
    assert!(deliver(
        Coin::new("", 1),
        coins(&[("", 3), ("gold", 1)]),
        5,
        coins(&[("", 2), ("gold", 2)]),
    )
    .is_err());
    // more "" than needed
    assert!(deliver(
        Coin::new("", 1),
        coins(&[("", 4), ("gold", 1)]),
        6,
        coins(&[("", 2), ("gold", 1)]),
    )
    .is_ok());
    // more gold than needed
    assert!(deliver(
        Coin::new("", 1),
        coins(&[("", 3), ("gold", 2)]),
        7,
        coins(&[("", 2), ("gold", 1)]),
    )
    .is_ok());
}

// --------------------------------------------------------- facade surface

#[test]
fn info_reports_the_version() {
    let app = fresh_app();
    assert!(app.info().starts_with("Aurum v"));
}

#[test]
fn set_option_rejects_unknown_keys_and_plugins() {
    let mut app = fresh_app();
    assert_eq!(
        app.set_option("base/bogus", "x"),
        "Unrecognized option key bogus"
    );
    assert_eq!(
        app.set_option("ghost/anything", "x"),
        "Invalid plugin name: ghost"
    );
    assert!(app
        .set_option("base/account", "not json")
        .starts_with("Error decoding acc message"));

    // a registered plugin gets the suffix; the counter has no options
    app.register_plugin(Arc::new(CounterPlugin::new("testcounter")));
    assert_eq!(app.set_option("testcounter/anything", "x"), "");
}

#[test]
fn query_forwards_to_the_backend() {
    let alice = test_account(b"test1");
    let mut app = fresh_app();
    seed_account(&mut app, &alice, coins(&[("", 7)]));

    let err = app.query(&[]).unwrap_err();
    assert_eq!(err.code, Code::EncodingError);

    let mut key = b"base/a/".to_vec();
    key.extend_from_slice(alice.addr.as_ref());
    let res = app.query(&key).unwrap();
    let account: Account = codec::from_bytes_canonical(&res.data).unwrap();
    assert_eq!(account.balance, coins(&[("", 7)]));
}

#[test]
fn block_hooks_run_plugins_in_registration_order() {
    struct Diffing(&'static str, u64);

    impl aurum_types::Plugin for Diffing {
        fn name(&self) -> &str {
            self.0
        }

        fn run_tx(
            &self,
            _store: &mut dyn KVStore,
            _ctx: aurum_types::CallContext,
            _tx_bytes: &[u8],
        ) -> ExecResult {
            Ok(aurum_types::ExecSuccess::default())
        }

        fn end_block(&self, _store: &mut dyn KVStore, height: u64) -> Vec<Validator> {
            vec![Validator {
                pub_key: self.0.as_bytes().to_vec(),
                power: self.1 + height,
            }]
        }
    }

    let mut app = fresh_app();
    app.register_plugin(Arc::new(Diffing("second", 200)));
    app.register_plugin(Arc::new(Diffing("first", 100)));

    app.init_chain(&[]);
    app.begin_block(1);
    let diffs = app.end_block(1);
    assert_eq!(
        diffs,
        vec![
            Validator {
                pub_key: b"second".to_vec(),
                power: 201
            },
            Validator {
                pub_key: b"first".to_vec(),
                power: 101
            },
        ]
    );
}
