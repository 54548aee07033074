//! Bootstrap CLI: seeds the base permissions and the superadmin role, and
//! creates the first superadmin account so the panel is reachable on a
//! fresh database.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::SqlitePool;
use uuid::Uuid;

use vendorgate::authz::{permissions, SUPERADMIN};
use vendorgate::db;
use vendorgate::utils::{hash_password, utc_now};

#[derive(Parser, Debug)]
#[command(author, version, about = "vendorgate bootstrap tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the vendor permissions and the superadmin role if missing
    Seed,
    /// Create a superadmin user (idempotent on email)
    CreateSuperadmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();
    let pool = db::init().await?;

    match cli.command {
        Commands::Seed => {
            seed(&pool).await?;
            println!("Seeded base permissions and the superadmin role");
        }
        Commands::CreateSuperadmin { name, email, password } => {
            let id = create_superadmin(&pool, &name, &email, &password).await?;
            println!("Superadmin ready: {email} ({id})");
        }
    }

    Ok(())
}

async fn seed(pool: &SqlitePool) -> anyhow::Result<()> {
    let now = utc_now();

    for name in [
        permissions::VIEW_VENDORS,
        permissions::CREATE_VENDORS,
        permissions::EDIT_VENDORS,
        permissions::DELETE_VENDORS,
    ] {
        sqlx::query("INSERT OR IGNORE INTO permissions (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await?;
    }

    // the bypass role carries no explicit grants
    sqlx::query("INSERT OR IGNORE INTO roles (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(Uuid::new_v4().to_string())
        .bind(SUPERADMIN)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_superadmin(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    seed(pool).await?;

    let now = utc_now();

    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    let user_id = match existing {
        Some(raw) => Uuid::parse_str(&raw).context("malformed user id in store")?,
        None => {
            let id = Uuid::new_v4();
            let password_hash =
                hash_password(password).map_err(|err| anyhow::anyhow!(err.to_string()))?;
            sqlx::query(
                "INSERT INTO users (id, name, email, password_hash, banned, created_at, updated_at) VALUES (?, ?, ?, ?, 0, ?, ?)",
            )
            .bind(id.to_string())
            .bind(name)
            .bind(email)
            .bind(&password_hash)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await?;
            id
        }
    };

    let role_id: String = sqlx::query_scalar("SELECT id FROM roles WHERE name = ?")
        .bind(SUPERADMIN)
        .fetch_one(pool)
        .await?;

    sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id, created_at) VALUES (?, ?, ?)")
        .bind(user_id.to_string())
        .bind(&role_id)
        .bind(now)
        .execute(pool)
        .await?;

    Ok(user_id)
}
