use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    AccountKind, Currency, Engine, EngineError, GoalStatus, NewAccountCmd, NewContributionCmd,
    NewGoalCmd, NewTransactionCmd, NewTransferCmd, TransactionKind, TransactionListFilter,
    UpdateTransactionCmd, UpdateTransferCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn add_user(db: &DatabaseConnection, username: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec![username.into(), "password".into()],
    ))
    .await
    .unwrap();
}

async fn new_account(engine: &Engine, name: &str, initial_balance_minor: i64) -> Uuid {
    engine
        .create_account(NewAccountCmd::new(
            "alice",
            name,
            AccountKind::Checking,
            initial_balance_minor,
        ))
        .await
        .unwrap()
}

async fn balance_of(engine: &Engine, account_id: Uuid) -> i64 {
    engine
        .account(account_id, "alice")
        .await
        .unwrap()
        .current_balance
}

#[tokio::test]
async fn income_and_expense_apply_signed_effects() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 10_000).await;

    engine
        .create_transaction(
            NewTransactionCmd::new(
                "alice",
                account_id,
                TransactionKind::Income,
                50_000,
                Utc::now(),
            )
            .description("salary")
            .note("January"),
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, account_id).await, 60_000);

    engine
        .create_transaction(
            NewTransactionCmd::new(
                "alice",
                account_id,
                TransactionKind::Expense,
                12_500,
                Utc::now(),
            )
            .description("groceries"),
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, account_id).await, 47_500);
}

#[tokio::test]
async fn delete_transaction_restores_pre_event_balance() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 10_000).await;

    let tx_id = engine
        .create_transaction(NewTransactionCmd::new(
            "alice",
            account_id,
            TransactionKind::Expense,
            4_000,
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, account_id).await, 6_000);

    engine.delete_transaction(tx_id, "alice").await.unwrap();
    assert_eq!(balance_of(&engine, account_id).await, 10_000);

    let err = engine.transaction(tx_id, "alice").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );
}

#[tokio::test]
async fn update_transaction_reverses_old_then_applies_new() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 0).await;

    engine
        .create_transaction(NewTransactionCmd::new(
            "alice",
            account_id,
            TransactionKind::Income,
            100_000,
            Utc::now(),
        ))
        .await
        .unwrap();
    let expense_id = engine
        .create_transaction(NewTransactionCmd::new(
            "alice",
            account_id,
            TransactionKind::Expense,
            10_000,
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, account_id).await, 90_000);

    engine
        .update_transaction(
            UpdateTransactionCmd::new("alice", expense_id)
                .amount_minor(15_000)
                .description("bigger lunch"),
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, account_id).await, 85_000);

    // Flipping the kind reverses the old expense and applies an income.
    engine
        .update_transaction(UpdateTransactionCmd::new("alice", expense_id).kind(TransactionKind::Income))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, account_id).await, 115_000);
}

#[tokio::test]
async fn update_transaction_moves_effect_between_accounts() {
    let (engine, _db) = engine_with_db().await;
    let first = new_account(&engine, "Checking", 0).await;
    let second = new_account(&engine, "Savings", 0).await;

    let tx_id = engine
        .create_transaction(NewTransactionCmd::new(
            "alice",
            first,
            TransactionKind::Income,
            30_000,
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, first).await, 30_000);
    assert_eq!(balance_of(&engine, second).await, 0);

    engine
        .update_transaction(UpdateTransactionCmd::new("alice", tx_id).account_id(second))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, first).await, 0);
    assert_eq!(balance_of(&engine, second).await, 30_000);

    let tx = engine.transaction(tx_id, "alice").await.unwrap();
    assert_eq!(tx.account_id, second);
}

#[tokio::test]
async fn balance_equals_initial_plus_live_transactions() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 25_000).await;

    let mut ids = Vec::new();
    for (kind, amount) in [
        (TransactionKind::Income, 10_000),
        (TransactionKind::Expense, 3_000),
        (TransactionKind::Income, 7_500),
        (TransactionKind::Expense, 1_250),
    ] {
        ids.push(
            engine
                .create_transaction(NewTransactionCmd::new(
                    "alice",
                    account_id,
                    kind,
                    amount,
                    Utc::now(),
                ))
                .await
                .unwrap(),
        );
    }
    engine.delete_transaction(ids[1], "alice").await.unwrap();
    engine
        .update_transaction(UpdateTransactionCmd::new("alice", ids[2]).amount_minor(8_000))
        .await
        .unwrap();

    let live = engine
        .list_transactions("alice", 100, &TransactionListFilter::default())
        .await
        .unwrap();
    let sum: i64 = live.iter().map(|tx| tx.signed_amount()).sum();
    assert_eq!(balance_of(&engine, account_id).await, 25_000 + sum);
}

#[tokio::test]
async fn transfer_lifecycle_end_to_end() {
    let (engine, _db) = engine_with_db().await;
    let a = new_account(&engine, "A", 50_000).await;
    let b = new_account(&engine, "B", 10_000).await;

    let transfer_id = engine
        .create_transfer(NewTransferCmd::new("alice", a, b, 20_000, Utc::now()))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, a).await, 30_000);
    assert_eq!(balance_of(&engine, b).await, 30_000);

    engine
        .update_transfer(UpdateTransferCmd::new("alice", transfer_id).amount_minor(5_000))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, a).await, 45_000);
    assert_eq!(balance_of(&engine, b).await, 15_000);

    engine.delete_transfer(transfer_id, "alice").await.unwrap();
    assert_eq!(balance_of(&engine, a).await, 50_000);
    assert_eq!(balance_of(&engine, b).await, 10_000);
}

#[tokio::test]
async fn transfers_neither_create_nor_destroy_money() {
    let (engine, _db) = engine_with_db().await;
    let a = new_account(&engine, "A", 40_000).await;
    let b = new_account(&engine, "B", 0).await;
    let c = new_account(&engine, "C", 5_000).await;
    let total = 45_000;

    let first = engine
        .create_transfer(NewTransferCmd::new("alice", a, b, 12_000, Utc::now()))
        .await
        .unwrap();
    engine
        .create_transfer(NewTransferCmd::new("alice", b, c, 2_000, Utc::now()))
        .await
        .unwrap();
    engine
        .update_transfer(
            UpdateTransferCmd::new("alice", first)
                .to_account_id(c)
                .amount_minor(9_000),
        )
        .await
        .unwrap();

    let sum = balance_of(&engine, a).await + balance_of(&engine, b).await
        + balance_of(&engine, c).await;
    assert_eq!(sum, total);
}

#[tokio::test]
async fn transfer_with_same_endpoints_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let a = new_account(&engine, "A", 50_000).await;

    let err = engine
        .create_transfer(NewTransferCmd::new("alice", a, a, 10_000, Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidTransfer(
            "from_account_id and to_account_id must differ".to_string()
        )
    );
    assert_eq!(balance_of(&engine, a).await, 50_000);
}

#[tokio::test]
async fn update_transfer_retargets_destination() {
    let (engine, _db) = engine_with_db().await;
    let a = new_account(&engine, "A", 30_000).await;
    let b = new_account(&engine, "B", 0).await;
    let c = new_account(&engine, "C", 0).await;

    let transfer_id = engine
        .create_transfer(NewTransferCmd::new("alice", a, b, 10_000, Utc::now()))
        .await
        .unwrap();

    engine
        .update_transfer(UpdateTransferCmd::new("alice", transfer_id).to_account_id(c))
        .await
        .unwrap();

    assert_eq!(balance_of(&engine, a).await, 20_000);
    assert_eq!(balance_of(&engine, b).await, 0);
    assert_eq!(balance_of(&engine, c).await, 10_000);
}

#[tokio::test]
async fn contribution_with_insufficient_balance_leaves_no_trace() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 10_000).await;
    let goal_id = engine
        .create_goal(NewGoalCmd::new("alice", "Holiday", 100_000))
        .await
        .unwrap();

    let err = engine
        .add_contribution(
            NewContributionCmd::new("alice", goal_id, 15_000, Utc::now()).account_id(account_id),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientFunds("insufficient balance in account 'Checking'".to_string())
    );

    assert_eq!(balance_of(&engine, account_id).await, 10_000);
    let goal = engine.goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.current_amount_minor, 0);
    let contributions = engine
        .list_contributions_for_goal(goal_id, "alice")
        .await
        .unwrap();
    assert!(contributions.is_empty());
}

#[tokio::test]
async fn contribution_of_exact_balance_is_allowed() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 15_000).await;
    let goal_id = engine
        .create_goal(NewGoalCmd::new("alice", "Holiday", 100_000))
        .await
        .unwrap();

    engine
        .add_contribution(
            NewContributionCmd::new("alice", goal_id, 15_000, Utc::now()).account_id(account_id),
        )
        .await
        .unwrap();

    assert_eq!(balance_of(&engine, account_id).await, 0);
    let goal = engine.goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.current_amount_minor, 15_000);
}

#[tokio::test]
async fn contribution_crossing_target_completes_goal() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 50_000).await;
    let goal_id = engine
        .create_goal(
            NewGoalCmd::new("alice", "Holiday", 100_000).current_amount_minor(90_000),
        )
        .await
        .unwrap();

    engine
        .add_contribution(
            NewContributionCmd::new("alice", goal_id, 15_000, Utc::now()).account_id(account_id),
        )
        .await
        .unwrap();

    let goal = engine.goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.current_amount_minor, 105_000);
    assert_eq!(goal.status, GoalStatus::Completed);
    assert!(goal.is_completed);
    assert_eq!(balance_of(&engine, account_id).await, 35_000);
}

#[tokio::test]
async fn removing_any_contribution_resets_goal_to_active() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 50_000).await;
    let goal_id = engine
        .create_goal(NewGoalCmd::new("alice", "Holiday", 10_000))
        .await
        .unwrap();

    // The first contribution alone already meets the target.
    engine
        .add_contribution(
            NewContributionCmd::new("alice", goal_id, 12_000, Utc::now()).account_id(account_id),
        )
        .await
        .unwrap();
    let second = engine
        .add_contribution(
            NewContributionCmd::new("alice", goal_id, 3_000, Utc::now()).account_id(account_id),
        )
        .await
        .unwrap();

    let goal = engine.goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.current_amount_minor, 15_000);
    assert!(goal.is_completed);

    engine.remove_contribution(second, "alice").await.unwrap();

    // 12_000 still exceeds the 10_000 target, but removal always un-completes.
    let goal = engine.goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.current_amount_minor, 12_000);
    assert_eq!(goal.status, GoalStatus::Active);
    assert!(!goal.is_completed);
    assert_eq!(balance_of(&engine, account_id).await, 38_000);
}

#[tokio::test]
async fn contribution_without_account_skips_balance_check() {
    let (engine, _db) = engine_with_db().await;
    let goal_id = engine
        .create_goal(NewGoalCmd::new("alice", "Holiday", 10_000))
        .await
        .unwrap();

    let contribution_id = engine
        .add_contribution(NewContributionCmd::new("alice", goal_id, 4_000, Utc::now()))
        .await
        .unwrap();

    let goal = engine.goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.current_amount_minor, 4_000);

    engine
        .remove_contribution(contribution_id, "alice")
        .await
        .unwrap();
    let goal = engine.goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.current_amount_minor, 0);
}

#[tokio::test]
async fn delete_goal_refunds_linked_contributions() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 100_000).await;
    let goal_id = engine
        .create_goal(NewGoalCmd::new("alice", "Holiday", 100_000))
        .await
        .unwrap();

    engine
        .add_contribution(
            NewContributionCmd::new("alice", goal_id, 30_000, Utc::now()).account_id(account_id),
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, account_id).await, 70_000);

    engine.delete_goal(goal_id, "alice").await.unwrap();
    assert_eq!(balance_of(&engine, account_id).await, 100_000);

    let err = engine.goal(goal_id, "alice").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("goal not exists".to_string()));
}

#[tokio::test]
async fn delete_account_reverses_counterparty_transfer_effects() {
    let (engine, _db) = engine_with_db().await;
    let a = new_account(&engine, "A", 50_000).await;
    let b = new_account(&engine, "B", 10_000).await;

    engine
        .create_transfer(NewTransferCmd::new("alice", a, b, 20_000, Utc::now()))
        .await
        .unwrap();
    engine
        .create_transfer(NewTransferCmd::new("alice", b, a, 5_000, Utc::now()))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, a).await, 35_000);
    assert_eq!(balance_of(&engine, b).await, 25_000);

    engine.delete_account(a, "alice").await.unwrap();

    // B gives back the 20_000 it received and recovers the 5_000 it sent.
    assert_eq!(balance_of(&engine, b).await, 10_000);
    let err = engine.account(a, "alice").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("account not exists".to_string())
    );
}

#[tokio::test]
async fn delete_account_detaches_contributions_but_keeps_goal_amounts() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 50_000).await;
    let goal_id = engine
        .create_goal(NewGoalCmd::new("alice", "Holiday", 100_000))
        .await
        .unwrap();

    let contribution_id = engine
        .add_contribution(
            NewContributionCmd::new("alice", goal_id, 20_000, Utc::now()).account_id(account_id),
        )
        .await
        .unwrap();

    engine.delete_account(account_id, "alice").await.unwrap();

    let goal = engine.goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.current_amount_minor, 20_000);
    let contribution = engine
        .contribution(contribution_id, "alice")
        .await
        .unwrap();
    assert_eq!(contribution.account_id, None);
}

#[tokio::test]
async fn cross_user_access_is_not_found() {
    let (engine, db) = engine_with_db().await;
    add_user(&db, "bob").await;

    let account_id = new_account(&engine, "Checking", 50_000).await;
    let tx_id = engine
        .create_transaction(NewTransactionCmd::new(
            "alice",
            account_id,
            TransactionKind::Income,
            10_000,
            Utc::now(),
        ))
        .await
        .unwrap();

    let err = engine.account(account_id, "bob").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("account not exists".to_string())
    );

    let err = engine.delete_transaction(tx_id, "bob").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );

    let err = engine
        .create_transaction(NewTransactionCmd::new(
            "bob",
            account_id,
            TransactionKind::Expense,
            1_000,
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("account not exists".to_string())
    );

    // Nothing about alice's data moved.
    assert_eq!(balance_of(&engine, account_id).await, 60_000);
}

#[tokio::test]
async fn duplicate_account_name_is_rejected_case_insensitively() {
    let (engine, _db) = engine_with_db().await;
    new_account(&engine, "Checking", 0).await;

    let err = engine
        .create_account(NewAccountCmd::new(
            "alice",
            "checking",
            AccountKind::Wallet,
            0,
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("checking".to_string()));
}

#[tokio::test]
async fn duplicate_category_name_is_rejected_after_normalization() {
    let (engine, _db) = engine_with_db().await;
    engine.create_category("alice", "Groceries").await.unwrap();

    let err = engine
        .create_category("alice", "  groceries ")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("groceries".to_string()));
}

#[tokio::test]
async fn recompute_balances_restores_denormalized_state() {
    let (engine, db) = engine_with_db().await;
    let a = new_account(&engine, "A", 20_000).await;
    let b = new_account(&engine, "B", 0).await;
    let goal_id = engine
        .create_goal(NewGoalCmd::new("alice", "Holiday", 100_000))
        .await
        .unwrap();

    engine
        .create_transaction(NewTransactionCmd::new(
            "alice",
            a,
            TransactionKind::Income,
            30_000,
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .create_transfer(NewTransferCmd::new("alice", a, b, 10_000, Utc::now()))
        .await
        .unwrap();
    engine
        .add_contribution(
            NewContributionCmd::new("alice", goal_id, 5_000, Utc::now()).account_id(a),
        )
        .await
        .unwrap();

    // Corrupt the denormalized columns behind the engine's back.
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(
        backend,
        "UPDATE accounts SET current_balance = 0".to_string(),
    ))
    .await
    .unwrap();
    db.execute(Statement::from_string(
        backend,
        "UPDATE goals SET current_amount_minor = 0".to_string(),
    ))
    .await
    .unwrap();

    engine.recompute_balances("alice").await.unwrap();

    assert_eq!(balance_of(&engine, a).await, 35_000);
    assert_eq!(balance_of(&engine, b).await, 10_000);
    let goal = engine.goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.current_amount_minor, 5_000);
}

#[tokio::test]
async fn user_statistics_aggregate_live_transactions() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 10_000).await;

    engine
        .create_transaction(NewTransactionCmd::new(
            "alice",
            account_id,
            TransactionKind::Income,
            40_000,
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .create_transaction(NewTransactionCmd::new(
            "alice",
            account_id,
            TransactionKind::Expense,
            15_000,
            Utc::now(),
        ))
        .await
        .unwrap();

    let stats = engine.user_statistics("alice").await.unwrap();
    assert_eq!(stats.balance_minor, 35_000);
    assert_eq!(stats.total_income_minor, 40_000);
    assert_eq!(stats.total_expense_minor, 15_000);
}

#[tokio::test]
async fn transaction_listing_paginates_with_cursor() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 0).await;

    for amount in [1_000, 2_000, 3_000] {
        engine
            .create_transaction(NewTransactionCmd::new(
                "alice",
                account_id,
                TransactionKind::Income,
                amount,
                Utc::now(),
            ))
            .await
            .unwrap();
    }

    let filter = TransactionListFilter {
        account_id: Some(account_id),
        ..Default::default()
    };
    let (first_page, cursor) = engine
        .list_transactions_page("alice", 2, None, &filter)
        .await
        .unwrap();
    assert_eq!(first_page.len(), 2);
    let cursor = cursor.expect("a third transaction remains");

    let (second_page, end) = engine
        .list_transactions_page("alice", 2, Some(&cursor), &filter)
        .await
        .unwrap();
    assert_eq!(second_page.len(), 1);
    assert!(end.is_none());

    let mut seen: Vec<Uuid> = first_page.iter().chain(&second_page).map(|tx| tx.id).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 3);
}

#[tokio::test]
async fn goal_seeded_at_target_stays_active_until_contribution() {
    let (engine, _db) = engine_with_db().await;
    let account_id = new_account(&engine, "Checking", 10_000).await;
    let goal_id = engine
        .create_goal(NewGoalCmd::new("alice", "Holiday", 10_000).current_amount_minor(10_000))
        .await
        .unwrap();

    let goal = engine.goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.status, GoalStatus::Active);
    assert!(!goal.is_completed);

    engine
        .add_contribution(
            NewContributionCmd::new("alice", goal_id, 1_000, Utc::now()).account_id(account_id),
        )
        .await
        .unwrap();
    let goal = engine.goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.status, GoalStatus::Completed);
    assert!(goal.is_completed);
}

#[tokio::test]
async fn currencies_are_preserved_on_account_snapshots() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .create_account(
            NewAccountCmd::new("alice", "Travel", AccountKind::Wallet, 5_000)
                .currency(Currency::Usd)
                .color("#2a9d8f"),
        )
        .await
        .unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.currency, Currency::Usd);
    assert_eq!(account.color.as_deref(), Some("#2a9d8f"));
    assert_eq!(account.kind, AccountKind::Wallet);
}
