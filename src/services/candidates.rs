use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use chrono::Utc;
use reqwest::Client;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::ai::ExtractResponse;
use crate::models::candidate::{Candidate, CandidateUpdateRequest};
use crate::models::user::CandidateSyncRequest;

const CANDIDATE_COLS: &str =
    "id, user_id, email, first_name, last_name, phone, address, cv_file_name,
     cv_storage_path, cv_upload_date, cv_text, skills, extracted_category, created_at";

pub struct CandidateService;

impl CandidateService {
    /// Provision a profile from auth-service after registration.
    pub async fn create(pool: &PgPool, req: &CandidateSyncRequest) -> anyhow::Result<Candidate> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM candidates WHERE email = $1)")
                .bind(&req.email)
                .fetch_one(pool)
                .await?;
        if exists {
            anyhow::bail!("Candidate already exists");
        }

        let candidate: Candidate = sqlx::query_as(&format!(
            "INSERT INTO candidates (user_id, email, first_name, last_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {CANDIDATE_COLS}"
        ))
        .bind(req.user_id)
        .bind(&req.email)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .fetch_one(pool)
        .await?;
        Ok(candidate)
    }

    pub async fn get_by_email(pool: &PgPool, email: &str) -> anyhow::Result<Candidate> {
        sqlx::query_as(&format!(
            "SELECT {CANDIDATE_COLS} FROM candidates WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Candidate not found"))
    }

    pub async fn update(
        pool: &PgPool,
        email: &str,
        req: &CandidateUpdateRequest,
    ) -> anyhow::Result<Candidate> {
        // Ensure the profile exists before the partial update.
        Self::get_by_email(pool, email).await?;

        let candidate: Candidate = sqlx::query_as(&format!(
            "UPDATE candidates SET
                 first_name = COALESCE($2, first_name),
                 last_name  = COALESCE($3, last_name),
                 phone      = COALESCE($4, phone),
                 address    = COALESCE($5, address)
             WHERE email = $1
             RETURNING {CANDIDATE_COLS}"
        ))
        .bind(email)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.phone)
        .bind(&req.address)
        .fetch_one(pool)
        .await?;

        info!(%email, "candidate profile updated");
        Ok(candidate)
    }

    /// Store a PDF CV on disk, then enrich the profile through ai-service.
    /// Extraction is best-effort: a failure is logged and the upload still
    /// succeeds.
    pub async fn upload_cv(
        pool: &PgPool,
        http: &Client,
        ai_service_url: &str,
        upload_dir: &str,
        email: &str,
        mut multipart: Multipart,
    ) -> anyhow::Result<Candidate> {
        let candidate = Self::get_by_email(pool, email).await?;

        let mut file_data: Option<(Vec<u8>, String)> = None;
        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some("file") {
                let filename = field.file_name().unwrap_or("cv.pdf").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                if content_type != "application/pdf" {
                    anyhow::bail!("Only PDF files are allowed");
                }
                let bytes = field.bytes().await?.to_vec();
                file_data = Some((bytes, filename));
            }
        }

        let (bytes, original_filename) =
            file_data.ok_or_else(|| anyhow::anyhow!("No file field in upload"))?;
        if bytes.is_empty() {
            anyhow::bail!("File is empty");
        }

        tokio::fs::create_dir_all(upload_dir).await?;
        let ext = Path::new(&original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("pdf");
        let stored_filename = format!("{}.{}", Uuid::new_v4(), ext);
        let storage_path = PathBuf::from(upload_dir).join(&stored_filename);
        tokio::fs::write(&storage_path, &bytes).await?;

        // Drop the previous file once the new one is on disk.
        if let Some(old_path) = &candidate.cv_storage_path {
            if let Err(e) = tokio::fs::remove_file(old_path).await {
                warn!(%old_path, error = %e, "could not delete previous CV");
            }
        }

        let storage_path_str = storage_path.to_string_lossy().to_string();
        sqlx::query(
            "UPDATE candidates SET cv_file_name = $2, cv_storage_path = $3, cv_upload_date = $4
             WHERE email = $1",
        )
        .bind(email)
        .bind(&original_filename)
        .bind(&storage_path_str)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        info!(%email, file = %stored_filename, "CV uploaded");

        match Self::request_extraction(http, ai_service_url, bytes, &original_filename).await {
            Ok(extracted) => {
                sqlx::query(
                    "UPDATE candidates SET
                         cv_text = COALESCE($2, cv_text),
                         skills = COALESCE($3, skills),
                         extracted_category = COALESCE($4, extracted_category)
                     WHERE email = $1",
                )
                .bind(email)
                .bind(&extracted.cv_text)
                .bind(&extracted.skills)
                .bind(&extracted.category)
                .execute(pool)
                .await?;
            }
            Err(e) => {
                warn!(%email, error = %e, "CV extraction failed — file kept");
            }
        }

        Self::get_by_email(pool, email).await
    }

    /// Resolve the stored CV to (path, original filename) for download.
    pub async fn cv_location(pool: &PgPool, email: &str) -> anyhow::Result<(String, String)> {
        let candidate = Self::get_by_email(pool, email).await?;
        let path = candidate
            .cv_storage_path
            .ok_or_else(|| anyhow::anyhow!("No CV uploaded for this candidate"))?;
        let filename = candidate.cv_file_name.unwrap_or_else(|| "cv.pdf".into());
        Ok((path, filename))
    }

    async fn request_extraction(
        http: &Client,
        ai_service_url: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> anyhow::Result<ExtractResponse> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = http
            .post(format!("{ai_service_url}/ai/extract"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<ExtractResponse>()
            .await?;
        Ok(response)
    }
}
