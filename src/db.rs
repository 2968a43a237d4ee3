//! Startup database bootstrap: schema creation in dependency order, the four
//! fixed priority rows, and the admin account.
//!
//! Everything here is idempotent so the service can restart against an
//! already-initialized database.

use crate::auth::hash_password;
use crate::config::Config;
use crate::error::AppError;
use crate::models::user::{NewUser, User};
use crate::models::Role;
use sqlx::PgPool;

pub async fn init(pool: &PgPool, config: &Config) -> Result<(), AppError> {
    create_schema(pool).await?;
    seed_priorities(pool).await?;
    seed_admin(pool, config).await?;
    log::info!("Database initialized");
    Ok(())
}

async fn create_schema(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        "DO $$ BEGIN
            CREATE TYPE user_role AS ENUM ('user', 'admin');
        EXCEPTION
            WHEN duplicate_object THEN NULL;
        END $$",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            user_id SERIAL PRIMARY KEY,
            first_name VARCHAR(50) NOT NULL,
            last_name VARCHAR(50),
            username VARCHAR(50) NOT NULL UNIQUE,
            email VARCHAR(100) NOT NULL UNIQUE,
            password VARCHAR(255) NOT NULL,
            role user_role NOT NULL DEFAULT 'user',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS priorities (
            priority_id SERIAL PRIMARY KEY,
            name VARCHAR(20) NOT NULL,
            level INT NOT NULL UNIQUE
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS lists (
            list_id SERIAL PRIMARY KEY,
            user_id INT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
            title VARCHAR(150) NOT NULL,
            description TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_lists_user_id ON lists(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_lists_created_at ON lists(created_at)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tasks (
            task_id SERIAL PRIMARY KEY,
            list_id INT NOT NULL REFERENCES lists(list_id) ON DELETE CASCADE,
            title VARCHAR(150) NOT NULL,
            description TEXT,
            priority_id INT REFERENCES priorities(priority_id) ON DELETE SET NULL,
            due_date DATE,
            is_completed BOOLEAN NOT NULL DEFAULT false,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_list_id ON tasks(list_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn seed_priorities(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO priorities (name, level) VALUES
            ('Low', 1),
            ('Medium', 2),
            ('High', 3),
            ('Urgent', 4)
         ON CONFLICT (level) DO NOTHING",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn seed_admin(pool: &PgPool, config: &Config) -> Result<(), AppError> {
    let username = config.admin_username.to_lowercase();
    if User::find_by_username(pool, &username).await?.is_some() {
        return Ok(());
    }

    let password = hash_password(&config.admin_password, config.bcrypt_cost)?;
    User::create(
        pool,
        &NewUser {
            first_name: config.admin_first_name.clone(),
            last_name: Some(config.admin_last_name.clone()),
            username,
            email: config.admin_email.to_lowercase(),
            password,
            role: Role::Admin,
        },
    )
    .await?;
    log::info!("Seeded admin user '{}'", config.admin_username);

    Ok(())
}
