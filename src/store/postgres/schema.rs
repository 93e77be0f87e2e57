use anyhow::Result;
use sqlx::PgPool;

/// Create the accounts and transactions tables if they do not exist
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing PostgreSQL schema...");

    sqlx::query(CREATE_ACCOUNTS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", "Failed to create accounts table", e))?;

    sqlx::query(CREATE_TRANSACTIONS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", "Failed to create transactions table", e))?;

    tracing::info!("PostgreSQL schema ready");
    Ok(())
}

/// Accounts: balance + optimistic-lock version
pub const CREATE_ACCOUNTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id BIGINT PRIMARY KEY,
    balance NUMERIC(30, 5) NOT NULL,
    version BIGINT NOT NULL DEFAULT 1
)
"#;

/// Append-only transfer records
pub const CREATE_TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id BIGSERIAL PRIMARY KEY,
    source_account_id BIGINT NOT NULL REFERENCES accounts (id),
    destination_account_id BIGINT NOT NULL REFERENCES accounts (id),
    amount NUMERIC(30, 5) NOT NULL CHECK (amount >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;
