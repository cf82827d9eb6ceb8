use helper::Helper;
use application_fee::native_application::native_application_test::*;
use application_fee::shared_structs::*;

use scrypto_test::prelude::*;

#[test]
fn test_increment_count_refunds_overpayment() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    // Fee of 100, no grace window open
    let refund = helper.increment_count(dec!(150))?;

    let xrd_address = helper.xrd_address;
    helper.assert_bucket_eq(&refund, xrd_address, dec!(50))?;
    assert_eq!(helper.collected_fees()?, dec!(100));
    assert_eq!(helper.application.get_count(&mut helper.env)?, 1);
    assert_eq!(helper.application.get_pending_residual(&mut helper.env)?, Decimal::ZERO);

    Ok(())
}

#[test]
fn test_increment_count_with_exact_fee_refunds_nothing() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    let refund = helper.increment_count(dec!(100))?;

    assert_eq!(refund.amount(&mut helper.env)?, Decimal::ZERO);
    assert_eq!(helper.collected_fees()?, dec!(100));

    Ok(())
}

#[test]
fn test_increment_count_rejects_underpayment() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();
    let ledger_before = helper.fee_ledger()?;

    let result = helper.increment_count(dec!(40));

    assert!(result.is_err(), "Paying less than the fee should fail");
    assert_eq!(helper.collected_fees()?, Decimal::ZERO);
    assert_eq!(helper.application.get_count(&mut helper.env)?, 0);
    assert_eq!(helper.fee_ledger()?, ledger_before);

    Ok(())
}

#[test]
fn test_wrong_fee_resource_is_rejected() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();
    let ledger_before = helper.fee_ledger()?;

    let payment = helper.admin.take(dec!(150), &mut helper.env)?;
    let result = helper.application.increment_count(payment, &mut helper.env);

    match result {
        Err(error) => assert!(
            format!("{:?}", error).contains("Wrong fee resource"),
            "Unexpected error: {:?}",
            error
        ),
        Ok(_) => panic!("Paying in another resource should fail"),
    }
    assert_eq!(helper.collected_fees()?, Decimal::ZERO);
    assert_eq!(helper.application.get_count(&mut helper.env)?, 0);
    assert_eq!(helper.fee_ledger()?, ledger_before);

    Ok(())
}

#[test]
fn test_resync_to_lower_fee_charges_new_fee() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    // 600 USD at 10 USD per unit: the fee drops from 100 to 60
    helper.set_price(dec!(10))?;
    helper.advance_to_fee_reset()?;

    let refund = helper.increment_count(dec!(80))?;

    assert_eq!(refund.amount(&mut helper.env)?, dec!(20));
    assert_eq!(helper.collected_fees()?, dec!(60));

    let ledger = helper.fee_ledger()?;
    assert_eq!(ledger.fee_prior, dec!(100));
    assert_eq!(ledger.fee, dec!(60));

    Ok(())
}

#[test]
fn test_grace_window_honours_prior_fee_after_increase() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    // Start from a fee of 60 and let it rise to 100
    helper.set_price(dec!(10))?;
    helper.advance_to_fee_reset()?;
    helper.increment_count(dec!(60))?;
    helper.set_price(dec!(6))?;
    helper.advance_to_fee_reset()?;

    // Resync epoch: the old fee of 60 still applies
    let refund = helper.increment_count(dec!(80))?;
    assert_eq!(refund.amount(&mut helper.env)?, dec!(20));
    assert_eq!(helper.fee_ledger()?.fee, dec!(100));

    // Last epoch of the grace window
    helper.advance_epochs(1);
    assert_eq!(helper.application.get_chargeable_fee(&mut helper.env)?, dec!(60));
    let refund = helper.increment_count(dec!(80))?;
    assert_eq!(refund.amount(&mut helper.env)?, dec!(20));

    // Grace window over: 80 no longer covers the fee
    helper.advance_epochs(1);
    assert_eq!(helper.application.get_chargeable_fee(&mut helper.env)?, dec!(100));
    let collected_before = helper.collected_fees()?;
    let ledger_before = helper.fee_ledger()?;

    let result = helper.increment_count(dec!(80));

    assert!(result.is_err(), "The prior fee must not be honoured after the grace window");
    assert_eq!(helper.collected_fees()?, collected_before);
    assert_eq!(helper.application.get_count(&mut helper.env)?, 3);
    assert_eq!(helper.fee_ledger()?, ledger_before);

    Ok(())
}

#[test]
fn test_grace_window_limited_to_resync_epoch() -> Result<(), RuntimeError> {
    let mut helper = Helper::with_grace_epochs(0).unwrap();

    helper.set_price(dec!(10))?;
    helper.advance_to_fee_reset()?;
    helper.increment_count(dec!(60))?;
    helper.set_price(dec!(6))?;
    helper.advance_to_fee_reset()?;

    let refund = helper.increment_count(dec!(100))?;
    assert_eq!(refund.amount(&mut helper.env)?, dec!(40));

    helper.advance_epochs(1);
    let refund = helper.increment_count(dec!(100))?;
    assert_eq!(refund.amount(&mut helper.env)?, Decimal::ZERO);

    Ok(())
}

#[test]
fn test_resync_moves_deadline_forward_once() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();
    let before = helper.fee_ledger()?;

    helper.advance_to_fee_reset()?;
    helper.increment_count(dec!(100))?;
    let after_first = helper.fee_ledger()?;

    helper.increment_count(dec!(100))?;
    let after_second = helper.fee_ledger()?;

    assert!(
        after_first.reset_deadline.seconds_since_unix_epoch
            > before.reset_deadline.seconds_since_unix_epoch
    );
    assert_eq!(after_second.reset_deadline, after_first.reset_deadline);
    assert_eq!(after_second.grace_epoch_boundary, after_first.grace_epoch_boundary);
    assert_eq!(
        after_first.reset_deadline,
        helper.fee_contract.next_reset_time(&mut helper.env)?
    );

    Ok(())
}

#[test]
fn test_deposit_routes_residual_to_body() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    helper.deposit(dec!(250))?;

    assert_eq!(helper.collected_fees()?, dec!(100));
    assert_eq!(helper.application.get_total_deposited(&mut helper.env)?, dec!(150));
    assert_eq!(helper.application.get_last_residual(&mut helper.env)?, dec!(150));
    assert_eq!(helper.application.get_pending_residual(&mut helper.env)?, Decimal::ZERO);

    Ok(())
}

#[test]
fn test_deposit_rejects_underpayment() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();
    let ledger_before = helper.fee_ledger()?;

    let result = helper.deposit(dec!(99));

    assert!(result.is_err(), "Depositing less than the fee should fail");
    assert_eq!(helper.collected_fees()?, Decimal::ZERO);
    assert_eq!(helper.application.get_total_deposited(&mut helper.env)?, Decimal::ZERO);
    assert_eq!(helper.application.get_pending_residual(&mut helper.env)?, Decimal::ZERO);
    assert_eq!(helper.fee_ledger()?, ledger_before);

    Ok(())
}

#[test]
fn test_residual_never_leaks_into_next_call() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    helper.deposit(dec!(250))?;
    helper.increment_count(dec!(150))?;
    helper.deposit(dec!(130))?;

    assert_eq!(helper.application.get_last_residual(&mut helper.env)?, dec!(30));
    assert_eq!(helper.application.get_total_deposited(&mut helper.env)?, dec!(180));
    assert_eq!(helper.application.get_pending_residual(&mut helper.env)?, Decimal::ZERO);
    assert_eq!(helper.collected_fees()?, dec!(300));

    Ok(())
}

#[test]
fn test_batch_charges_every_action() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    let payment = helper.xrd.take(dec!(1000), &mut helper.env)?;
    let remaining = helper.application.batch(
        vec![
            ApplicationAction::Increment,
            ApplicationAction::Deposit(dec!(200)),
            ApplicationAction::Increment,
        ],
        payment,
        &mut helper.env,
    )?;

    assert_eq!(remaining.amount(&mut helper.env)?, dec!(500));
    assert_eq!(helper.collected_fees()?, dec!(300));
    assert_eq!(helper.application.get_count(&mut helper.env)?, 2);
    assert_eq!(helper.application.get_total_deposited(&mut helper.env)?, dec!(200));
    // 1000 minus the first two fees
    assert_eq!(helper.application.get_last_residual(&mut helper.env)?, dec!(800));
    assert_eq!(helper.application.get_pending_residual(&mut helper.env)?, Decimal::ZERO);

    Ok(())
}

#[test]
fn test_batch_fails_when_shared_payment_runs_out() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    let payment = helper.xrd.take(dec!(250), &mut helper.env)?;
    let result = helper.application.batch(
        vec![
            ApplicationAction::Increment,
            ApplicationAction::Increment,
            ApplicationAction::Increment,
        ],
        payment,
        &mut helper.env,
    );

    assert!(result.is_err(), "Every action of a batch must pay its own fee");

    Ok(())
}

#[test]
fn test_underfunded_batch_moves_nothing() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();
    let ledger_before = helper.fee_ledger()?;

    let payment = helper.xrd.take(dec!(50), &mut helper.env)?;
    let result = helper.application.batch(
        vec![ApplicationAction::Increment, ApplicationAction::Increment],
        payment,
        &mut helper.env,
    );

    assert!(result.is_err(), "A batch that cannot pay its first fee should fail");
    assert_eq!(helper.collected_fees()?, Decimal::ZERO);
    assert_eq!(helper.application.get_count(&mut helper.env)?, 0);
    assert_eq!(helper.fee_ledger()?, ledger_before);

    Ok(())
}

#[test]
fn test_batch_deposit_beyond_residual_fails() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    let payment = helper.xrd.take(dec!(300), &mut helper.env)?;
    let result = helper.application.batch(
        vec![ApplicationAction::Deposit(dec!(250))],
        payment,
        &mut helper.env,
    );

    assert!(result.is_err(), "A deposit cannot spend the fee");

    Ok(())
}

#[test]
fn test_withdraw_deposits() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    helper.deposit(dec!(250))?;

    helper.env.disable_auth_module();
    let withdrawn = helper.application.withdraw_deposits(dec!(150), &mut helper.env)?;
    helper.env.enable_auth_module();

    let xrd_address = helper.xrd_address;
    helper.assert_bucket_eq(&withdrawn, xrd_address, dec!(150))?;

    Ok(())
}

#[test]
fn test_instantiate_rejects_long_grace_window() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    let result = NativeApplication::instantiate(
        helper.fee_contract_address,
        helper.admin_address,
        11,
        helper.package_address,
        &mut helper.env,
    );

    assert!(result.is_err(), "Grace windows above the maximum should be rejected");

    Ok(())
}

#[test]
fn test_instantiate_default_grace_window() -> Result<(), RuntimeError> {
    let mut helper = Helper::new().unwrap();

    let application = NativeApplication::instantiate_default(
        helper.fee_contract_address,
        helper.admin_address,
        helper.package_address,
        &mut helper.env,
    )?;
    let ledger = application.get_fee_ledger(&mut helper.env)?;

    assert_eq!(ledger.grace_epochs, 0);
    assert_eq!(ledger.fee, dec!(100));
    assert_eq!(ledger.fee_resource, helper.xrd_address);

    Ok(())
}
