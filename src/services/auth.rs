use reqwest::Client;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::Config;
use crate::jwt;
use crate::models::user::{AuthResponse, CandidateSyncRequest, LoginRequest, RegisterRequest, Role, User};

pub struct AuthService;

impl AuthService {
    /// Create a user with the given role and mint their first token.
    /// A CANDIDATE registration also provisions the profile in
    /// candidate-service; that call is on the critical path — if it fails the
    /// registration fails.
    pub async fn register(
        pool: &PgPool,
        http: &Client,
        config: &Config,
        role: Role,
        req: &RegisterRequest,
    ) -> anyhow::Result<AuthResponse> {
        // The user row commits only once the profile sync has succeeded, so a
        // sync failure leaves no orphaned user and the registration can be
        // retried.
        let mut tx = pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&req.email)
                .fetch_one(&mut *tx)
                .await?;
        if exists {
            anyhow::bail!("User already exists!");
        }

        let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)?;
        let user: User = sqlx::query_as(
            "INSERT INTO users (email, password_hash, first_name, last_name, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, email, password_hash, first_name, last_name, role, created_at",
        )
        .bind(&req.email)
        .bind(&password_hash)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(role.to_string())
        .fetch_one(&mut *tx)
        .await?;

        if role == Role::Candidate {
            Self::sync_candidate(http, &config.candidate_service_url, &user).await?;
        }

        tx.commit().await?;

        let token = jwt::issue_token(&user.email, role, &config.jwt_secret, config.jwt_expiry_seconds)?;
        info!(email = %user.email, %role, "user registered");

        Ok(AuthResponse {
            token,
            email: user.email,
            role: role.to_string(),
        })
    }

    pub async fn login(pool: &PgPool, config: &Config, req: &LoginRequest) -> anyhow::Result<AuthResponse> {
        let user: Option<User> = sqlx::query_as(
            "SELECT id, email, password_hash, first_name, last_name, role, created_at
             FROM users WHERE email = $1",
        )
        .bind(&req.email)
        .fetch_optional(pool)
        .await?;

        // Unknown email and wrong password are indistinguishable to the client.
        let user = match user {
            Some(u) => u,
            None => {
                warn!(email = %req.email, "login failed: user not found");
                anyhow::bail!("Invalid credentials");
            }
        };
        let valid = bcrypt::verify(&req.password, &user.password_hash)
            .map_err(|_| anyhow::anyhow!("Invalid credentials"))?;
        if !valid {
            warn!(email = %req.email, "login failed: password mismatch");
            anyhow::bail!("Invalid credentials");
        }

        let role: Role = user.role.parse()?;
        let token = jwt::issue_token(&user.email, role, &config.jwt_secret, config.jwt_expiry_seconds)?;
        info!(email = %user.email, %role, "login successful");

        Ok(AuthResponse {
            token,
            email: user.email,
            role: user.role,
        })
    }

    async fn sync_candidate(http: &Client, candidate_url: &str, user: &User) -> anyhow::Result<()> {
        let body = CandidateSyncRequest {
            user_id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        };
        http.post(format!("{candidate_url}/candidates/internal"))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
