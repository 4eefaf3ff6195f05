// src/config.rs

use std::{env, str::FromStr, time::Duration};

use anyhow::{Context, bail};
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::Repositories,
    services::{
        account::AccountService, dashboard::DashboardService, invitation::InvitationService,
        onboarding::OnboardingService, session::SessionService,
    },
};

/// Configuração lida do ambiente (com suporte a `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub session_ttl_hours: i64,
    pub invitation_ttl_days: i64,
    pub public_base_url: String,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        if jwt_secret.len() < 32 {
            bail!("JWT_SECRET deve ter pelo menos 32 bytes");
        }

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", 24)?,
            invitation_ttl_days: parse_var("INVITATION_TTL_DAYS", 7)?,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw.parse().with_context(|| format!("{name} inválida: {raw}")),
        Err(_) => Ok(default),
    }
}

/// Conecta ao banco de dados, usando '?' para propagar erros
pub async fn connect_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
    pub accounts: AccountService,
    pub invitations: InvitationService,
    pub onboardings: OnboardingService,
    pub dashboards: DashboardService,
}

impl AppState {
    // --- Monta o gráfico de dependências ---
    pub fn new(repos: Repositories, config: &Config) -> anyhow::Result<Self> {
        let sessions = SessionService::new(&config.jwt_secret, chrono::Duration::hours(config.session_ttl_hours));

        let accounts = AccountService::new(
            repos.tenants.clone(),
            repos.users.clone(),
            sessions.clone(),
            config.bcrypt_cost,
        )?;

        let invitations = InvitationService::new(
            repos.invitations.clone(),
            chrono::Duration::days(config.invitation_ttl_days),
            config.public_base_url.clone(),
            config.bcrypt_cost,
        );

        let onboardings = OnboardingService::new(repos.onboardings.clone());
        let dashboards = DashboardService::new(repos.dashboards.clone());

        Ok(Self {
            sessions,
            accounts,
            invitations,
            onboardings,
            dashboards,
        })
    }
}
