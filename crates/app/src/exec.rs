// Path: crates/app/src/exec.rs
//! The deterministic transaction reducer.
//!
//! Every stage name prepended to an error log here is compared
//! byte-for-byte across replicas; so is the order of the checks. Change
//! neither.

use aurum_crypto::Address;
use aurum_state::State;
use aurum_types::{
    Account, AccountGetter, AccountSetter, AppTx, CallContext, Coins, ExecFailure, ExecResult,
    ExecSuccess, KVStore, Plugins, SendTx, Tx, TxInput, TxOutput,
};
use std::collections::{BTreeMap, BTreeSet};

/// Validates and executes `tx` against `state`.
///
/// With `is_check_tx` set, mutations that only matter at delivery time
/// (output credits, plugin invocation) are skipped; the caller passes the
/// check-time shadow state on that path.
pub fn exec_tx<S: KVStore>(
    state: &mut State<S>,
    plugins: &Plugins,
    tx: &Tx,
    is_check_tx: bool,
) -> ExecResult {
    let chain_id = state.chain_id().to_owned();
    match tx {
        Tx::Send(send) => exec_send_tx(state, send, tx, &chain_id, is_check_tx),
        Tx::App(app) => exec_app_tx(state, plugins, app, tx, &chain_id, is_check_tx),
    }
}

fn exec_send_tx<S: KVStore>(
    state: &mut State<S>,
    send: &SendTx,
    tx: &Tx,
    chain_id: &str,
    is_check_tx: bool,
) -> ExecResult {
    validate_inputs_basic(&send.inputs).map_err(|e| e.prepend_log("in validateInputsBasic()"))?;
    validate_outputs_basic(&send.outputs)
        .map_err(|e| e.prepend_log("in validateOutputsBasic()"))?;

    let mut accounts =
        get_inputs(state, &send.inputs).map_err(|e| e.prepend_log("in getInputs()"))?;
    get_or_make_outputs(state, &mut accounts, &send.outputs)
        .map_err(|e| e.prepend_log("in getOrMakeOutputs()"))?;

    let sign_bytes = tx.sign_bytes(chain_id);
    let in_total = validate_inputs_advanced(&accounts, &sign_bytes, &send.inputs)
        .map_err(|e| e.prepend_log("in validateInputsAdvanced()"))?;
    let out_total = sum_outputs(&send.outputs)?;
    let fee = Coins::from_coin(send.fee.clone());
    if in_total != out_total.plus(&fee)? {
        return Err(ExecFailure::invalid_output(
            "Input total != output total + fees",
        ));
    }

    // All arithmetic was pre-verified; the mutations below cannot fail
    // halfway through.
    adjust_by_inputs(state, &mut accounts, &send.inputs)?;
    adjust_by_outputs(state, &mut accounts, &send.outputs, is_check_tx)?;

    Ok(ExecSuccess::default())
}

fn exec_app_tx<S: KVStore>(
    state: &mut State<S>,
    plugins: &Plugins,
    app: &AppTx,
    tx: &Tx,
    chain_id: &str,
    is_check_tx: bool,
) -> ExecResult {
    app.input.validate_basic()?;

    let Some(mut in_acc) = state.get_account(&app.input.address)? else {
        return Err(ExecFailure::unknown_address(""));
    };
    if let Some(pub_key) = app.input.pub_key {
        in_acc.pub_key = Some(pub_key);
    }

    let sign_bytes = tx.sign_bytes(chain_id);
    if let Err(err) = validate_input_advanced(&in_acc, &sign_bytes, &app.input) {
        tracing::info!(
            target: "execution",
            address = %app.input.address,
            error = %err,
            "validateInputAdvanced failed"
        );
        return Err(err.prepend_log("in validateInputAdvanced()"));
    }
    let fee = Coins::from_coin(app.fee.clone());
    if !app.input.coins.is_gte(&fee) {
        tracing::info!(
            target: "execution",
            address = %app.input.address,
            "Sender did not send enough to cover the fee"
        );
        return Err(ExecFailure::insufficient_funds(""));
    }

    let Some(plugin) = plugins.get_by_name(&app.name) else {
        return Err(ExecFailure::unknown_address("")
            .append_log(&format!("Unrecognized plugin name{}", app.name)));
    };

    // The full input amount leaves the account; the fee share of it is
    // never forwarded and is kept even if the plugin fails.
    let coins = app.input.coins.minus(&fee)?;
    in_acc.sequence = next_sequence(in_acc.sequence)?;
    in_acc.balance = in_acc.balance.minus(&app.input.coins)?;

    // Plugins are never invoked at check time.
    if is_check_tx {
        state.set_account(&app.input.address, &in_acc)?;
        return Ok(ExecSuccess::default());
    }

    // Failure restore point: post-deduction, pre-plugin. Reconstructing
    // from the pre-deduction account would lose the sequence increment.
    let in_acc_pre = in_acc.clone();

    let mut cache = state.cache_wrap();
    cache.set_account(&app.input.address, &in_acc)?;
    let ctx = CallContext::new(app.input.address, in_acc, coins.clone());
    match plugin.run_tx(&mut cache, ctx, &app.data) {
        Ok(success) => {
            cache.cache_sync()?;
            tracing::info!(target: "execution", plugin = %app.name, "Successful execution");
            Ok(success)
        }
        Err(err) => {
            tracing::info!(target: "execution", plugin = %app.name, error = %err, "AppTx failed");
            // Discard the plugin's writes, refund the forwarded coins.
            drop(cache);
            let mut restored = in_acc_pre;
            restored.balance = restored.balance.plus(&coins)?;
            state.set_account(&app.input.address, &restored)?;
            Err(err)
        }
    }
}

fn validate_inputs_basic(inputs: &[TxInput]) -> Result<(), ExecFailure> {
    for input in inputs {
        input.validate_basic()?;
    }
    Ok(())
}

fn validate_outputs_basic(outputs: &[TxOutput]) -> Result<(), ExecFailure> {
    for output in outputs {
        output.validate_basic()?;
    }
    Ok(())
}

/// Loads every input account. Duplicated input addresses are rejected,
/// and an input that carries a public key installs it on the loaded
/// account; that is how first-use accounts acquire their key.
fn get_inputs<G: AccountGetter>(
    state: &G,
    inputs: &[TxInput],
) -> Result<BTreeMap<Address, Account>, ExecFailure> {
    let mut accounts = BTreeMap::new();
    for input in inputs {
        if accounts.contains_key(&input.address) {
            return Err(ExecFailure::duplicate_address(""));
        }
        let Some(mut account) = state.get_account(&input.address)? else {
            return Err(ExecFailure::unknown_address(""));
        };
        if let Some(pub_key) = input.pub_key {
            account.pub_key = Some(pub_key);
        }
        accounts.insert(input.address, account);
    }
    Ok(accounts)
}

/// Loads or synthesizes every output account. Two outputs must not name
/// the same address; an output naming an input address reuses the
/// already-loaded account.
fn get_or_make_outputs<G: AccountGetter>(
    state: &G,
    accounts: &mut BTreeMap<Address, Account>,
    outputs: &[TxOutput],
) -> Result<(), ExecFailure> {
    let mut seen = BTreeSet::new();
    for output in outputs {
        if !seen.insert(output.address) {
            return Err(ExecFailure::duplicate_address(""));
        }
        if !accounts.contains_key(&output.address) {
            let account = state.get_account(&output.address)?.unwrap_or_default();
            accounts.insert(output.address, account);
        }
    }
    Ok(())
}

/// Validates every input against its loaded account, in input order, and
/// totals the input coins. Halts at the first failure.
fn validate_inputs_advanced(
    accounts: &BTreeMap<Address, Account>,
    sign_bytes: &[u8],
    inputs: &[TxInput],
) -> Result<Coins, ExecFailure> {
    let mut total = Coins::new();
    for input in inputs {
        let account = accounts
            .get(&input.address)
            .expect("validate_inputs_advanced expects the account to be loaded");
        validate_input_advanced(account, sign_bytes, input)?;
        total = total.plus(&input.coins)?;
    }
    Ok(total)
}

fn validate_input_advanced(
    account: &Account,
    sign_bytes: &[u8],
    input: &TxInput,
) -> Result<(), ExecFailure> {
    let expected = next_sequence(account.sequence)?;
    if expected != input.sequence {
        return Err(ExecFailure::invalid_sequence(format!(
            "Got {}, expected {}. (acc.seq={})",
            input.sequence, expected, account.sequence
        )));
    }
    if !account.balance.is_gte(&input.coins) {
        return Err(ExecFailure::insufficient_funds(""));
    }
    if let Some(pub_key) = &input.pub_key {
        if pub_key.address() != input.address {
            return Err(ExecFailure::invalid_input("PubKey does not match address"));
        }
    }
    let verified = match (&account.pub_key, &input.signature) {
        (Some(pub_key), Some(signature)) => pub_key.verify_bytes(sign_bytes, signature),
        _ => false,
    };
    if !verified {
        return Err(ExecFailure::invalid_signature(format!(
            "SignBytes: {}",
            hex::encode_upper(sign_bytes)
        )));
    }
    Ok(())
}

fn sum_outputs(outputs: &[TxOutput]) -> Result<Coins, ExecFailure> {
    let mut total = Coins::new();
    for output in outputs {
        total = total.plus(&output.coins)?;
    }
    Ok(total)
}

fn adjust_by_inputs<S: AccountSetter>(
    state: &mut S,
    accounts: &mut BTreeMap<Address, Account>,
    inputs: &[TxInput],
) -> Result<(), ExecFailure> {
    for input in inputs {
        let account = accounts
            .get_mut(&input.address)
            .expect("adjust_by_inputs expects the account to be loaded");
        account.balance = account.balance.minus(&input.coins)?;
        account.sequence = next_sequence(account.sequence)?;
        state.set_account(&input.address, account)?;
    }
    Ok(())
}

fn adjust_by_outputs<S: AccountSetter>(
    state: &mut S,
    accounts: &mut BTreeMap<Address, Account>,
    outputs: &[TxOutput],
    is_check_tx: bool,
) -> Result<(), ExecFailure> {
    for output in outputs {
        let account = accounts
            .get_mut(&output.address)
            .expect("adjust_by_outputs expects the account to be loaded");
        account.balance = account.balance.plus(&output.coins)?;
        if !is_check_tx {
            state.set_account(&output.address, account)?;
        }
    }
    Ok(())
}

fn next_sequence(sequence: i64) -> Result<i64, ExecFailure> {
    sequence
        .checked_add(1)
        .ok_or_else(|| ExecFailure::internal("Account sequence overflow"))
}
