use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use crate::models::offer::{
    ApplicationResponse, CreateOfferRequest, Offer, RecruiterStats, UpdateOfferRequest,
    APPLICATION_STATUSES,
};

const OFFER_COLS: &str =
    "id, title, description, company, location, contract_type, salary, published_date,
     expiration_date, active, recruiter_email, domain, required_skills";

const APPLICATION_COLS: &str =
    "a.id, a.offer_id, o.title AS offer_title, o.company, a.candidate_email,
     a.application_date, a.status";

pub struct OfferService;

impl OfferService {
    pub async fn list_active(pool: &PgPool) -> anyhow::Result<Vec<Offer>> {
        let offers = sqlx::query_as(&format!(
            "SELECT {OFFER_COLS} FROM offers WHERE active = TRUE ORDER BY published_date DESC"
        ))
        .fetch_all(pool)
        .await?;
        Ok(offers)
    }

    pub async fn get(pool: &PgPool, id: i64) -> anyhow::Result<Offer> {
        sqlx::query_as(&format!("SELECT {OFFER_COLS} FROM offers WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Offer not found with id: {id}"))
    }

    pub async fn list_by_recruiter(pool: &PgPool, recruiter_email: &str) -> anyhow::Result<Vec<Offer>> {
        let offers = sqlx::query_as(&format!(
            "SELECT {OFFER_COLS} FROM offers WHERE recruiter_email = $1 ORDER BY published_date DESC"
        ))
        .bind(recruiter_email)
        .fetch_all(pool)
        .await?;
        Ok(offers)
    }

    pub async fn create(
        pool: &PgPool,
        recruiter_email: &str,
        req: &CreateOfferRequest,
    ) -> anyhow::Result<Offer> {
        let offer: Offer = sqlx::query_as(&format!(
            "INSERT INTO offers
                 (title, description, company, location, contract_type, salary,
                  published_date, expiration_date, active, recruiter_email, domain, required_skills)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9, $10, $11)
             RETURNING {OFFER_COLS}"
        ))
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.company)
        .bind(&req.location)
        .bind(&req.contract_type)
        .bind(req.salary)
        .bind(Utc::now().date_naive())
        .bind(req.expiration_date)
        .bind(recruiter_email)
        .bind(&req.domain)
        .bind(&req.required_skills)
        .fetch_one(pool)
        .await?;

        info!(title = %offer.title, recruiter = %recruiter_email, "offer created");
        Ok(offer)
    }

    pub async fn update(
        pool: &PgPool,
        recruiter_email: &str,
        offer_id: i64,
        req: &UpdateOfferRequest,
    ) -> anyhow::Result<Offer> {
        let offer = Self::get(pool, offer_id).await?;
        if offer.recruiter_email != recruiter_email {
            anyhow::bail!("You are not authorized to modify this offer");
        }

        let updated: Offer = sqlx::query_as(&format!(
            "UPDATE offers SET
                 title           = COALESCE($2, title),
                 description     = COALESCE($3, description),
                 company         = COALESCE($4, company),
                 location        = COALESCE($5, location),
                 contract_type   = COALESCE($6, contract_type),
                 salary          = COALESCE($7, salary),
                 expiration_date = COALESCE($8, expiration_date),
                 domain          = COALESCE($9, domain),
                 required_skills = COALESCE($10, required_skills)
             WHERE id = $1
             RETURNING {OFFER_COLS}"
        ))
        .bind(offer_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.company)
        .bind(&req.location)
        .bind(&req.contract_type)
        .bind(req.salary)
        .bind(req.expiration_date)
        .bind(&req.domain)
        .bind(&req.required_skills)
        .fetch_one(pool)
        .await?;

        info!(title = %updated.title, recruiter = %recruiter_email, "offer updated");
        Ok(updated)
    }

    pub async fn delete(pool: &PgPool, recruiter_email: &str, offer_id: i64) -> anyhow::Result<()> {
        let offer = Self::get(pool, offer_id).await?;
        if offer.recruiter_email != recruiter_email {
            anyhow::bail!("You are not authorized to delete this offer");
        }

        // Applications reference the offer; remove them first.
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM applications WHERE offer_id = $1")
            .bind(offer_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(offer_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(%offer_id, recruiter = %recruiter_email, "offer deleted");
        Ok(())
    }

    pub async fn apply(
        pool: &PgPool,
        candidate_email: &str,
        offer_id: i64,
    ) -> anyhow::Result<ApplicationResponse> {
        let offer = Self::get(pool, offer_id).await?;
        if !offer.active {
            anyhow::bail!("This offer is no longer active");
        }

        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM applications WHERE candidate_email = $1 AND offer_id = $2)",
        )
        .bind(candidate_email)
        .bind(offer_id)
        .fetch_one(pool)
        .await?;
        if duplicate {
            anyhow::bail!("You have already applied to this offer");
        }

        let application_id: i64 = sqlx::query_scalar(
            "INSERT INTO applications (offer_id, candidate_email, status)
             VALUES ($1, $2, 'PENDING') RETURNING id",
        )
        .bind(offer_id)
        .bind(candidate_email)
        .fetch_one(pool)
        .await?;

        info!(candidate = %candidate_email, %offer_id, "application submitted");
        Self::application(pool, application_id).await
    }

    pub async fn my_applications(
        pool: &PgPool,
        candidate_email: &str,
    ) -> anyhow::Result<Vec<ApplicationResponse>> {
        let applications = sqlx::query_as(&format!(
            "SELECT {APPLICATION_COLS} FROM applications a
             JOIN offers o ON o.id = a.offer_id
             WHERE a.candidate_email = $1
             ORDER BY a.application_date DESC"
        ))
        .bind(candidate_email)
        .fetch_all(pool)
        .await?;
        Ok(applications)
    }

    pub async fn applications_for_offer(
        pool: &PgPool,
        offer_id: i64,
    ) -> anyhow::Result<Vec<ApplicationResponse>> {
        let applications = sqlx::query_as(&format!(
            "SELECT {APPLICATION_COLS} FROM applications a
             JOIN offers o ON o.id = a.offer_id
             WHERE a.offer_id = $1
             ORDER BY a.application_date DESC"
        ))
        .bind(offer_id)
        .fetch_all(pool)
        .await?;
        Ok(applications)
    }

    /// Only the recruiter owning the offer may move an application's status.
    pub async fn update_application_status(
        pool: &PgPool,
        recruiter_email: &str,
        application_id: i64,
        status: &str,
    ) -> anyhow::Result<ApplicationResponse> {
        if !APPLICATION_STATUSES.contains(&status) {
            anyhow::bail!("Invalid status: {status}");
        }

        let application = Self::application(pool, application_id).await?;
        let offer = Self::get(pool, application.offer_id).await?;
        if offer.recruiter_email != recruiter_email {
            anyhow::bail!("You are not authorized to update this application");
        }

        sqlx::query("UPDATE applications SET status = $2 WHERE id = $1")
            .bind(application_id)
            .bind(status)
            .execute(pool)
            .await?;

        info!(%application_id, %status, recruiter = %recruiter_email, "application status changed");
        Self::application(pool, application_id).await
    }

    pub async fn recruiter_stats(pool: &PgPool, recruiter_email: &str) -> anyhow::Result<RecruiterStats> {
        let total_offers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM offers WHERE recruiter_email = $1")
                .bind(recruiter_email)
                .fetch_one(pool)
                .await?;

        let total_applications: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications a
             JOIN offers o ON o.id = a.offer_id
             WHERE o.recruiter_email = $1",
        )
        .bind(recruiter_email)
        .fetch_one(pool)
        .await?;

        let mut by_status = [0i64; 3];
        for (i, status) in ["PENDING", "ACCEPTED", "REJECTED"].iter().enumerate() {
            by_status[i] = sqlx::query_scalar(
                "SELECT COUNT(*) FROM applications a
                 JOIN offers o ON o.id = a.offer_id
                 WHERE o.recruiter_email = $1 AND a.status = $2",
            )
            .bind(recruiter_email)
            .bind(status)
            .fetch_one(pool)
            .await?;
        }

        let per_offer: Vec<(String, i64)> = sqlx::query_as(
            "SELECT o.title, COUNT(a.id) FROM offers o
             LEFT JOIN applications a ON a.offer_id = o.id
             WHERE o.recruiter_email = $1
             GROUP BY o.title",
        )
        .bind(recruiter_email)
        .fetch_all(pool)
        .await?;

        Ok(RecruiterStats {
            total_offers,
            total_applications,
            pending_count: by_status[0],
            accepted_count: by_status[1],
            rejected_count: by_status[2],
            applications_by_offer: per_offer.into_iter().collect(),
        })
    }

    async fn application(pool: &PgPool, id: i64) -> anyhow::Result<ApplicationResponse> {
        sqlx::query_as(&format!(
            "SELECT {APPLICATION_COLS} FROM applications a
             JOIN offers o ON o.id = a.offer_id
             WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Application not found with id: {id}"))
    }
}
