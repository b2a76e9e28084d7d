use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Each service owns its own database; the migration directories are embedded
/// per service so a binary can only ever apply its own schema.
pub async fn run_auth_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations/auth").run(pool).await?;
    Ok(())
}

pub async fn run_candidate_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations/candidate").run(pool).await?;
    Ok(())
}

pub async fn run_offer_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations/offer").run(pool).await?;
    Ok(())
}
