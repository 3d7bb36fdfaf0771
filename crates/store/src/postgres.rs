//! Postgres-backed store implementation.
//!
//! Purchases and transfers run inside a SQL transaction with the affected
//! account rows locked (`SELECT … FOR UPDATE`), so concurrent debits against
//! one account serialize and a balance check always observes committed
//! effects. An uncommitted `Transaction` value rolls back when dropped,
//! which covers error returns and caller cancellation alike; explicit
//! rollbacks below only make the business aborts eager.
//!
//! ## Error mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx error | PostgreSQL code | StoreError | Scenario |
//! |---|---|---|---|
//! | Database (unique violation) | `23505` | `Constraint` | display name already taken |
//! | Database (check violation) | `23514` | `Constraint` | balance/price/quantity constraint |
//! | Database (other) | any other | `Unavailable` | other database errors |
//! | PoolClosed / network | n/a | `Unavailable` | pool shut down, connection lost |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{FromRow, Row};
use tracing::instrument;
use uuid::Uuid;

use coinshop_accounts::{Account, Credential};
use coinshop_core::{AccountId, Coins, LedgerEntryId};
use coinshop_inventory::InventoryEntry;
use coinshop_ledger::{LedgerEntry, TransferRecord};

use crate::error::{PurchaseError, StoreError, TransferError};
use crate::store::Store;

/// Connect a pool sized like the original deployment (20 connections).
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the schema if missing and seed the fixed catalog.
    ///
    /// Idempotent; runs at startup before the server accepts traffic.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        const SCHEMA: &[&str] = &[
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                credential TEXT NOT NULL,
                balance BIGINT NOT NULL CHECK (balance >= 0)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS catalog (
                item TEXT PRIMARY KEY,
                price BIGINT NOT NULL CHECK (price > 0)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS inventory (
                account_id UUID NOT NULL REFERENCES accounts(id),
                item TEXT NOT NULL REFERENCES catalog(item),
                quantity BIGINT NOT NULL CHECK (quantity >= 0),
                PRIMARY KEY (account_id, item)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS ledger (
                id UUID PRIMARY KEY,
                from_account UUID NOT NULL REFERENCES accounts(id),
                to_account UUID NOT NULL REFERENCES accounts(id),
                amount BIGINT NOT NULL CHECK (amount > 0),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        ];

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }

        for item in coinshop_catalog::seed() {
            sqlx::query("INSERT INTO catalog (item, price) VALUES ($1, $2) ON CONFLICT (item) DO NOTHING")
                .bind(&item.name)
                .bind(item.price.get())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }

        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    #[instrument(skip(self), err)]
    async fn resolve_account_by_name(&self, name: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT id, name, balance FROM accounts WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("resolve_account_by_name", e))?;

        row.map(|row| account_from_row(&row, "resolve_account_by_name"))
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn credential_by_name(&self, name: &str) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query("SELECT id, name, credential FROM accounts WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("credential_by_name", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let row = CredentialRow::from_row(&row)
            .map_err(|e| StoreError::corrupt("credential_by_name", e.to_string()))?;
        Ok(Some(Credential {
            id: AccountId::from_uuid(row.id),
            name: row.name,
            digest: row.credential,
        }))
    }

    #[instrument(skip(self, credential_digest), err)]
    async fn create_account(
        &self,
        name: &str,
        credential_digest: &str,
    ) -> Result<Account, StoreError> {
        let account = Account::with_starting_balance(name)
            .map_err(|e| StoreError::constraint("create_account", e.to_string()))?;

        sqlx::query("INSERT INTO accounts (id, name, credential, balance) VALUES ($1, $2, $3, $4)")
            .bind(account.id.as_uuid())
            .bind(&account.name)
            .bind(credential_digest)
            .bind(account.balance.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_account", e))?;

        Ok(account)
    }

    #[instrument(skip(self), fields(account = %id), err)]
    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT id, name, balance FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("account_by_id", e))?;

        row.map(|row| account_from_row(&row, "account_by_id"))
            .transpose()
    }

    #[instrument(skip(self), fields(account = %account_id, item = item_name), err)]
    async fn purchase(&self, account_id: AccountId, item_name: &str) -> Result<(), PurchaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        // Lock the account row for the duration of the unit so concurrent
        // purchases by the same account serialize on the balance check.
        let account = sqlx::query("SELECT id, name, balance FROM accounts WHERE id = $1 FOR UPDATE")
            .bind(account_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("purchase", e))?;

        let Some(account) = account else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(PurchaseError::AccountNotFound);
        };
        let balance: i64 = account
            .try_get("balance")
            .map_err(|e| StoreError::corrupt("purchase", e.to_string()))?;

        let item = sqlx::query("SELECT item, price FROM catalog WHERE item = $1")
            .bind(item_name)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("purchase", e))?;

        let Some(item) = item else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(PurchaseError::ItemNotFound(item_name.to_string()));
        };
        let price: i64 = item
            .try_get("price")
            .map_err(|e| StoreError::corrupt("purchase", e.to_string()))?;

        if balance < price {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(PurchaseError::InsufficientBalance { balance, price });
        }

        sqlx::query("UPDATE accounts SET balance = balance - $1 WHERE id = $2")
            .bind(price)
            .bind(account_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("purchase", e))?;

        sqlx::query(
            r#"
            INSERT INTO inventory (account_id, item, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (account_id, item)
            DO UPDATE SET quantity = inventory.quantity + 1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(item_name)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("purchase", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(from = %from, to = %to, amount = %amount), err)]
    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Coins,
    ) -> Result<(), TransferError> {
        if amount.is_zero() {
            return Err(TransferError::InvalidAmount);
        }
        if from == to {
            return Err(TransferError::SelfTransfer);
        }

        let entry = LedgerEntry::record(from, to, amount, Utc::now())
            .map_err(|_| TransferError::InvalidAmount)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        // Lock both rows in id order so opposing transfers cannot deadlock.
        let rows = sqlx::query(
            "SELECT id, balance FROM accounts WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(vec![*from.as_uuid(), *to.as_uuid()])
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("transfer", e))?;

        let mut sender_balance: Option<i64> = None;
        let mut receiver_found = false;
        for row in &rows {
            let id: Uuid = row
                .try_get("id")
                .map_err(|e| StoreError::corrupt("transfer", e.to_string()))?;
            if id == *from.as_uuid() {
                let balance: i64 = row
                    .try_get("balance")
                    .map_err(|e| StoreError::corrupt("transfer", e.to_string()))?;
                sender_balance = Some(balance);
            } else if id == *to.as_uuid() {
                receiver_found = true;
            }
        }

        let Some(balance) = sender_balance else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(TransferError::SenderNotFound);
        };
        if !receiver_found {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(TransferError::ReceiverNotFound);
        }
        if balance < amount.get() {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(TransferError::InsufficientBalance {
                balance,
                amount: amount.get(),
            });
        }

        sqlx::query("UPDATE accounts SET balance = balance - $1 WHERE id = $2")
            .bind(amount.get())
            .bind(from.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("transfer", e))?;

        sqlx::query("UPDATE accounts SET balance = balance + $1 WHERE id = $2")
            .bind(amount.get())
            .bind(to.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("transfer", e))?;

        sqlx::query(
            "INSERT INTO ledger (id, from_account, to_account, amount, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(entry.id.as_uuid())
        .bind(from.as_uuid())
        .bind(to.as_uuid())
        .bind(amount.get())
        .bind(entry.occurred_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("transfer", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(account = %account_id), err)]
    async fn inventory_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<InventoryEntry>, StoreError> {
        let rows = sqlx::query("SELECT account_id, item, quantity FROM inventory WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("inventory_for", e))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let row = InventoryRow::from_row(&row)
                .map_err(|e| StoreError::corrupt("inventory_for", e.to_string()))?;
            entries.push(InventoryEntry {
                account_id: AccountId::from_uuid(row.account_id),
                item: row.item,
                quantity: row.quantity,
            });
        }
        Ok(entries)
    }

    #[instrument(skip(self), fields(account = %account_id), err)]
    async fn transfers_for(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransferRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.from_account, t.to_account, t.amount, t.created_at,
                   cf.name AS from_name, ct.name AS to_name
            FROM ledger t
            JOIN accounts cf ON t.from_account = cf.id
            JOIN accounts ct ON t.to_account = ct.id
            WHERE t.from_account = $1 OR t.to_account = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("transfers_for", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let row = LedgerRow::from_row(&row)
                .map_err(|e| StoreError::corrupt("transfers_for", e.to_string()))?;
            records.push(row.into_record("transfers_for")?);
        }
        Ok(records)
    }
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = format!("{}", db_err.message());
            match db_err.code().as_deref() {
                // Unique violation (e.g. display name taken).
                Some("23505") => StoreError::constraint(operation, message),
                // Check constraint violation (balance/price/quantity).
                Some("23514") => StoreError::constraint(operation, message),
                _ => StoreError::unavailable(operation, message),
            }
        }
        sqlx::Error::PoolClosed => StoreError::unavailable(operation, "connection pool closed"),
        other => StoreError::unavailable(operation, other.to_string()),
    }
}

fn account_from_row(row: &PgRow, operation: &'static str) -> Result<Account, StoreError> {
    let row =
        AccountRow::from_row(row).map_err(|e| StoreError::corrupt(operation, e.to_string()))?;
    let balance =
        Coins::new(row.balance).map_err(|e| StoreError::corrupt(operation, e.to_string()))?;
    Ok(Account {
        id: AccountId::from_uuid(row.id),
        name: row.name,
        balance,
    })
}

// SQLx row types

#[derive(Debug)]
struct AccountRow {
    id: Uuid,
    name: String,
    balance: i64,
}

impl<'r> FromRow<'r, PgRow> for AccountRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AccountRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            balance: row.try_get("balance")?,
        })
    }
}

#[derive(Debug)]
struct CredentialRow {
    id: Uuid,
    name: String,
    credential: String,
}

impl<'r> FromRow<'r, PgRow> for CredentialRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CredentialRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            credential: row.try_get("credential")?,
        })
    }
}

#[derive(Debug)]
struct InventoryRow {
    account_id: Uuid,
    item: String,
    quantity: i64,
}

impl<'r> FromRow<'r, PgRow> for InventoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(InventoryRow {
            account_id: row.try_get("account_id")?,
            item: row.try_get("item")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

#[derive(Debug)]
struct LedgerRow {
    id: Uuid,
    from_account: Uuid,
    to_account: Uuid,
    amount: i64,
    created_at: DateTime<Utc>,
    from_name: String,
    to_name: String,
}

impl<'r> FromRow<'r, PgRow> for LedgerRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(LedgerRow {
            id: row.try_get("id")?,
            from_account: row.try_get("from_account")?,
            to_account: row.try_get("to_account")?,
            amount: row.try_get("amount")?,
            created_at: row.try_get("created_at")?,
            from_name: row.try_get("from_name")?,
            to_name: row.try_get("to_name")?,
        })
    }
}

impl LedgerRow {
    fn into_record(self, operation: &'static str) -> Result<TransferRecord, StoreError> {
        let amount =
            Coins::new(self.amount).map_err(|e| StoreError::corrupt(operation, e.to_string()))?;
        Ok(TransferRecord {
            entry: LedgerEntry {
                id: LedgerEntryId::from_uuid(self.id),
                from: AccountId::from_uuid(self.from_account),
                to: AccountId::from_uuid(self.to_account),
                amount,
                occurred_at: self.created_at,
            },
            from_name: self.from_name,
            to_name: self.to_name,
        })
    }
}
