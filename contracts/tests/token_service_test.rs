//! Integration tests for the permissioned token.
//!
//! Each section mirrors one deployment-level behavior: construction,
//! mint, burn, manager updates, transfer and transferFrom gating, and
//! supply accounting across mixed sequences.

use jpeth_contracts::{Address, ErrorKind, TokenConfig, TokenError, TokenEvent, TokenService};

const OWNER: Address = Address::from_bytes([0x0a; 20]);
const MANAGER: Address = Address::from_bytes([0x0b; 20]);

/// Helper: the n-th "other" signer.
fn other(n: u8) -> Address {
    Address::from_bytes([0x10 + n; 20])
}

/// Helper: deploys with the same parameters the deploy script uses.
fn deploy() -> TokenService {
    TokenService::new(TokenConfig::new(
        "JpEthStakingFundSp",
        "JPETH",
        MANAGER,
        OWNER,
        6,
    ))
    .expect("valid deployment")
}

fn last_event(svc: &TokenService) -> &TokenEvent {
    &svc.events().last().expect("an event").event
}

// ---------------------------------------------------------------------------
// Deployment
// ---------------------------------------------------------------------------

#[test]
fn deployment_sets_name_symbol_roles_and_decimals() {
    let svc = deploy();
    assert_eq!(svc.name(), "JpEthStakingFundSp");
    assert_eq!(svc.symbol(), "JPETH");
    assert_eq!(svc.get_manager(), MANAGER);
    assert_eq!(svc.get_whitelister(), MANAGER);
    assert_eq!(svc.owner(), OWNER);
    assert_eq!(svc.decimals(), 6);
}

// ---------------------------------------------------------------------------
// Mint
// ---------------------------------------------------------------------------

#[test]
fn mint_rejects_non_manager() {
    let mut svc = deploy();
    let err = svc.mint(other(0), other(0), 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(err.to_string(), format!("caller is not the manager: {}", other(0)));
}

#[test]
fn mint_rejects_null_target() {
    let mut svc = deploy();
    let err = svc.mint(MANAGER, Address::ZERO, 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "mint target is the zero address");
}

#[test]
fn scenario_a_mint_sets_supply_and_balance() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 100).unwrap();
    assert_eq!(svc.total_supply(), 100);
    assert_eq!(svc.balance_of(&other(0)), 100);
    assert_eq!(
        last_event(&svc),
        &TokenEvent::Transfer {
            from: Address::ZERO,
            to: other(0),
            value: 100
        }
    );
}

// ---------------------------------------------------------------------------
// Burn
// ---------------------------------------------------------------------------

#[test]
fn burn_rejects_non_manager() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 100).unwrap();
    let err = svc.burn(other(0), other(0), 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(svc.balance_of(&other(0)), 100);
}

#[test]
fn burn_rejects_amount_above_balance() {
    let mut svc = deploy();
    svc.mint(MANAGER, MANAGER, 100).unwrap();
    let err = svc.burn(MANAGER, MANAGER, 101).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().starts_with("burn amount exceeds balance"));
    assert_eq!(svc.total_supply(), 100);
}

#[test]
fn burn_only_touches_the_target_account() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 100).unwrap();
    svc.mint(MANAGER, other(1), 1_000).unwrap();
    svc.burn(MANAGER, other(0), 50).unwrap();
    assert_eq!(svc.balance_of(&other(0)), 50);
    assert_eq!(svc.balance_of(&other(1)), 1_000);
    assert_eq!(svc.total_supply(), 1_050);
}

// ---------------------------------------------------------------------------
// UpdateManager
// ---------------------------------------------------------------------------

#[test]
fn update_manager_rejects_non_owner() {
    let mut svc = deploy();
    let err = svc.update_manager(MANAGER, other(0)).unwrap_err();
    assert_eq!(err, TokenError::NotOwner { caller: MANAGER });
    assert_eq!(svc.get_manager(), MANAGER);
}

#[test]
fn update_manager_rejects_null() {
    let mut svc = deploy();
    let err = svc.update_manager(OWNER, Address::ZERO).unwrap_err();
    assert_eq!(err.to_string(), "new manager is the zero address");
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn update_manager_transfers_all_manager_authority() {
    let mut svc = deploy();
    svc.update_manager(OWNER, other(0)).unwrap();
    assert_eq!(svc.get_manager(), other(0));
    assert_eq!(svc.get_whitelister(), other(0));
    assert_eq!(
        last_event(&svc),
        &TokenEvent::ManagerUpdated {
            previous: MANAGER,
            new: other(0)
        }
    );

    // The old manager is locked out immediately.
    assert_eq!(
        svc.mint(MANAGER, other(1), 1).unwrap_err().kind(),
        ErrorKind::Authorization
    );
    assert_eq!(
        svc.unpause(MANAGER).unwrap_err().kind(),
        ErrorKind::Authorization
    );
    svc.mint(other(0), other(1), 1).unwrap();
    svc.unpause(other(0)).unwrap();
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

#[test]
fn scenario_b_transfer_gates_in_order() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 100).unwrap();

    // 1. Paused.
    let err = svc.transfer(other(0), other(1), 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
    assert_eq!(err.to_string(), "transfer: paused");

    // 2. Unpaused, sender not whitelisted.
    svc.unpause(MANAGER).unwrap();
    let err = svc.transfer(other(0), other(1), 100).unwrap_err();
    assert_eq!(err, TokenError::NotWhitelisted { account: other(0) });

    // 3. Sender whitelisted, receiver not.
    svc.add_whitelist(MANAGER, other(0)).unwrap();
    let err = svc.transfer(other(0), other(1), 100).unwrap_err();
    assert_eq!(err, TokenError::NotWhitelisted { account: other(1) });
    assert_eq!(err.kind(), ErrorKind::Validation);

    // 4. Both whitelisted.
    svc.add_whitelist(MANAGER, other(1)).unwrap();
    svc.transfer(other(0), other(1), 100).unwrap();
    assert_eq!(svc.balance_of(&other(0)), 0);
    assert_eq!(svc.balance_of(&other(1)), 100);
    assert_eq!(
        last_event(&svc),
        &TokenEvent::Transfer {
            from: other(0),
            to: other(1),
            value: 100
        }
    );
}

#[test]
fn transfer_above_balance_rejected_without_effect() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 100).unwrap();
    svc.unpause(MANAGER).unwrap();
    svc.add_whitelist(MANAGER, other(0)).unwrap();
    svc.add_whitelist(MANAGER, other(1)).unwrap();
    let events_before = svc.events().len();

    let err = svc.transfer(other(0), other(1), 101).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(svc.balance_of(&other(0)), 100);
    assert_eq!(svc.balance_of(&other(1)), 0);
    assert_eq!(svc.events().len(), events_before);
}

#[test]
fn whitelist_failure_independent_of_pause_state() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 100).unwrap();
    svc.unpause(MANAGER).unwrap();
    svc.add_whitelist(MANAGER, other(0)).unwrap();
    svc.pause(MANAGER).unwrap();
    svc.unpause(MANAGER).unwrap();
    assert!(matches!(
        svc.transfer(other(0), other(1), 1),
        Err(TokenError::NotWhitelisted { .. })
    ));
}

// ---------------------------------------------------------------------------
// TransferFrom
// ---------------------------------------------------------------------------

#[test]
fn transfer_from_rejected_while_paused() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 100).unwrap();
    svc.approve(other(0), other(1), 100).unwrap();
    let err = svc
        .transfer_from(other(1), other(0), other(2), 100)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
    assert_eq!(err.to_string(), "transfer: paused");
    assert_eq!(svc.allowance(&other(0), &other(1)), 100);
}

#[test]
fn transfer_from_requires_both_endpoints_whitelisted() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 100).unwrap();
    svc.unpause(MANAGER).unwrap();
    svc.approve(other(0), other(1), 100).unwrap();

    let err = svc
        .transfer_from(other(1), other(0), other(2), 100)
        .unwrap_err();
    assert_eq!(err, TokenError::NotWhitelisted { account: other(0) });

    svc.add_whitelist(MANAGER, other(0)).unwrap();
    let err = svc
        .transfer_from(other(1), other(0), other(2), 100)
        .unwrap_err();
    assert_eq!(err, TokenError::NotWhitelisted { account: other(2) });
}

#[test]
fn transfer_from_moves_balances_and_emits() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 100).unwrap();
    svc.unpause(MANAGER).unwrap();
    svc.add_whitelist(MANAGER, other(0)).unwrap();
    svc.add_whitelist(MANAGER, other(2)).unwrap();
    svc.approve(other(0), other(1), 100).unwrap();
    assert_eq!(
        last_event(&svc),
        &TokenEvent::Approval {
            owner: other(0),
            spender: other(1),
            value: 100
        }
    );

    svc.transfer_from(other(1), other(0), other(2), 100).unwrap();
    assert_eq!(svc.balance_of(&other(0)), 0);
    assert_eq!(svc.balance_of(&other(2)), 100);
    assert_eq!(
        last_event(&svc),
        &TokenEvent::Transfer {
            from: other(0),
            to: other(2),
            value: 100
        }
    );
}

#[test]
fn scenario_d_allowance_is_consumed() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 500).unwrap();
    svc.unpause(MANAGER).unwrap();
    svc.add_whitelist(MANAGER, other(0)).unwrap();
    svc.add_whitelist(MANAGER, other(2)).unwrap();
    svc.approve(other(0), other(1), 100).unwrap();

    svc.transfer_from(other(1), other(0), other(2), 100).unwrap();
    assert_eq!(svc.allowance(&other(0), &other(1)), 0);

    let err = svc
        .transfer_from(other(1), other(0), other(2), 1)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(err, TokenError::InsufficientAllowance { .. }));
    assert_eq!(svc.balance_of(&other(0)), 400);
}

// ---------------------------------------------------------------------------
// Manager Redeem
// ---------------------------------------------------------------------------

#[test]
fn manager_redeem_keeps_supply() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 100).unwrap();
    svc.manager_redeem(MANAGER, other(0), 100).unwrap();
    assert_eq!(svc.balance_of(&other(0)), 0);
    assert_eq!(svc.balance_of(&MANAGER), 100);
    assert_eq!(svc.total_supply(), 100);

    let err = svc.manager_redeem(MANAGER, other(0), 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = svc.manager_redeem(other(0), MANAGER, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

// ---------------------------------------------------------------------------
// Total Supply
// ---------------------------------------------------------------------------

#[test]
fn total_supply_accumulates_large_mints() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 100).unwrap();
    svc.mint(MANAGER, other(1), 499_999_999_900).unwrap();
    assert_eq!(svc.total_supply(), 500_000_000_000);
}

#[test]
fn scenario_c_burn_then_remint() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 400_000_000_000).unwrap();
    svc.mint(MANAGER, MANAGER, 100_000_000_000).unwrap();
    svc.burn(MANAGER, other(0), 100_000_000_000).unwrap();
    svc.mint(MANAGER, other(0), 100_000_000_000).unwrap();
    assert_eq!(svc.total_supply(), 500_000_000_000);
    assert_eq!(svc.balance_of(&other(0)), 400_000_000_000);
    assert!(svc.is_conserved());
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[test]
fn privileged_calls_from_strangers_change_nothing() {
    let mut svc = deploy();
    svc.mint(MANAGER, other(0), 10).unwrap();
    let snapshot = serde_json::to_value(svc.state()).unwrap();
    let events = svc.events().len();
    let stranger = other(9);

    let results = [
        svc.update_manager(stranger, stranger),
        svc.transfer_ownership(stranger, stranger),
        svc.unpause(stranger),
        svc.pause(stranger),
        svc.add_whitelist(stranger, stranger),
        svc.mint(stranger, stranger, 1),
        svc.burn(stranger, other(0), 1),
        svc.manager_redeem(stranger, other(0), 1),
    ];
    for result in results {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Authorization);
    }
    assert_eq!(serde_json::to_value(svc.state()).unwrap(), snapshot);
    assert_eq!(svc.events().len(), events);
}

#[test]
fn ownership_handover_moves_manager_control() {
    let mut svc = deploy();
    svc.transfer_ownership(OWNER, other(3)).unwrap();
    assert_eq!(svc.owner(), other(3));
    assert!(svc.update_manager(OWNER, other(4)).is_err());
    svc.update_manager(other(3), other(4)).unwrap();
    assert_eq!(svc.get_manager(), other(4));
}
