// src/db/onboarding_repo.rs

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::map_unique_violation,
    models::{
        auth::DataScope,
        onboarding::{
            ComplianceItem, CreateTemplatePayload, Document, DocumentStatus, NewOnboarding, Onboarding,
            OnboardingDetail, OnboardingTemplate, Priority, ProgressSnapshot, Task, TemplateComplianceItem,
            TemplateDocument, TemplateTask,
        },
    },
};

const ONBOARDING_SELECT: &str = r#"
    SELECT o.id, o.tenant_id, o.user_id, u.name AS user_name, u.email AS user_email,
           o.status, o.start_date, o.end_date, o.progress, o.created_at
    FROM onboardings o
    JOIN users u ON u.id = o.user_id
"#;

const TEMPLATE_COLUMNS: &str = "id, tenant_id, name, description, created_at, updated_at";

// Toda consulta filtra pelo tenant da sessão; `DataScope.owner_id` restringe
// ainda ao onboarding do próprio colaborador.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OnboardingRepository: Send + Sync {
    // --- Templates ---
    async fn create_template(
        &self,
        tenant_id: Uuid,
        payload: &CreateTemplatePayload,
    ) -> Result<OnboardingTemplate, AppError>;

    async fn list_templates(&self, tenant_id: Uuid) -> Result<Vec<OnboardingTemplate>, AppError>;

    async fn find_template(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<OnboardingTemplate>, AppError>;

    async fn update_template(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Option<OnboardingTemplate>, AppError>;

    // --- Onboardings ---
    async fn create_onboarding(&self, tenant_id: Uuid, new: NewOnboarding) -> Result<OnboardingDetail, AppError>;

    async fn list_onboardings(&self, tenant_id: Uuid) -> Result<Vec<Onboarding>, AppError>;

    async fn find_onboarding(&self, scope: DataScope, id: Uuid) -> Result<Option<OnboardingDetail>, AppError>;

    async fn find_onboarding_for_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OnboardingDetail>, AppError>;

    // --- Acompanhamento ---
    async fn update_task(
        &self,
        scope: DataScope,
        task_id: Uuid,
        completed: Option<bool>,
        priority: Option<Priority>,
    ) -> Result<Option<Task>, AppError>;

    async fn update_document(
        &self,
        scope: DataScope,
        document_id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<Document>, AppError>;

    async fn update_compliance(
        &self,
        scope: DataScope,
        item_id: Uuid,
        progress: i32,
    ) -> Result<Option<ComplianceItem>, AppError>;
}

#[derive(Clone)]
pub struct PgOnboardingRepository {
    pool: PgPool,
}

impl PgOnboardingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OnboardingRepository for PgOnboardingRepository {
    async fn create_template(
        &self,
        tenant_id: Uuid,
        payload: &CreateTemplatePayload,
    ) -> Result<OnboardingTemplate, AppError> {
        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o template
        let template = sqlx::query_as::<_, OnboardingTemplate>(&format!(
            r#"
            INSERT INTO onboarding_templates (tenant_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .fetch_one(&mut *tx)
        .await?;

        // 3. Itens do template, na ordem recebida
        for (position, task) in payload.tasks.iter().enumerate() {
            sqlx::query(
                "INSERT INTO template_tasks (template_id, title, category, priority, position) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(template.id)
            .bind(&task.title)
            .bind(&task.category)
            .bind(Priority::default())
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        for (position, doc) in payload.documents.iter().enumerate() {
            sqlx::query(
                "INSERT INTO template_documents (template_id, title, required, position) VALUES ($1, $2, $3, $4)",
            )
            .bind(template.id)
            .bind(&doc.title)
            .bind(doc.required)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        for (position, item) in payload.compliance_items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO template_compliance_items (template_id, name, kind, position) VALUES ($1, $2, $3, $4)",
            )
            .bind(template.id)
            .bind(&item.title)
            .bind(&item.kind)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        let template = load_template_children(&mut tx, template).await?;

        // 4. Commit
        tx.commit().await?;

        Ok(template)
    }

    async fn list_templates(&self, tenant_id: Uuid) -> Result<Vec<OnboardingTemplate>, AppError> {
        let mut conn = self.pool.acquire().await?;

        let templates = sqlx::query_as::<_, OnboardingTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM onboarding_templates WHERE tenant_id = $1 ORDER BY created_at DESC"
        ))
        .bind(tenant_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut loaded = Vec::with_capacity(templates.len());
        for template in templates {
            loaded.push(load_template_children(&mut conn, template).await?);
        }
        Ok(loaded)
    }

    async fn find_template(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<OnboardingTemplate>, AppError> {
        let mut conn = self.pool.acquire().await?;

        let template = sqlx::query_as::<_, OnboardingTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM onboarding_templates WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&mut *conn)
        .await?;

        match template {
            Some(template) => Ok(Some(load_template_children(&mut conn, template).await?)),
            None => Ok(None),
        }
    }

    async fn update_template(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Option<OnboardingTemplate>, AppError> {
        let mut conn = self.pool.acquire().await?;

        let template = sqlx::query_as::<_, OnboardingTemplate>(&format!(
            r#"
            UPDATE onboarding_templates
            SET name = COALESCE($3, name),
                description = COALESCE($4, description),
                updated_at = now()
            WHERE id = $1 AND tenant_id = $2
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(tenant_id)
        .bind(name)
        .bind(description)
        .fetch_optional(&mut *conn)
        .await?;

        match template {
            Some(template) => Ok(Some(load_template_children(&mut conn, template).await?)),
            None => Ok(None),
        }
    }

    async fn create_onboarding(&self, tenant_id: Uuid, new: NewOnboarding) -> Result<OnboardingDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        // O INSERT ... SELECT só acha o usuário se ele for do mesmo tenant.
        let onboarding_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO onboardings (tenant_id, user_id, start_date)
            SELECT u.tenant_id, u.id, $3
            FROM users u
            WHERE u.id = $1 AND u.tenant_id = $2
            RETURNING id
            "#,
        )
        .bind(new.user_id)
        .bind(tenant_id)
        .bind(new.start_date)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        let onboarding_id = onboarding_id.ok_or_else(|| AppError::not_found("User"))?;

        for (position, (title, priority)) in new.tasks.iter().enumerate() {
            sqlx::query("INSERT INTO tasks (onboarding_id, title, priority, position) VALUES ($1, $2, $3, $4)")
                .bind(onboarding_id)
                .bind(title)
                .bind(*priority)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        for (position, (title, due_date)) in new.documents.iter().enumerate() {
            sqlx::query("INSERT INTO documents (onboarding_id, title, due_date, position) VALUES ($1, $2, $3, $4)")
                .bind(onboarding_id)
                .bind(title)
                .bind(*due_date)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        for (position, name) in new.compliance_items.iter().enumerate() {
            sqlx::query("INSERT INTO compliance_items (onboarding_id, name, position) VALUES ($1, $2, $3)")
                .bind(onboarding_id)
                .bind(name)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        let scope = DataScope { tenant_id, owner_id: None };
        let detail = load_detail(&mut tx, scope, onboarding_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Onboarding recém-criado não encontrado"))?;

        tx.commit().await?;
        Ok(detail)
    }

    async fn list_onboardings(&self, tenant_id: Uuid) -> Result<Vec<Onboarding>, AppError> {
        let onboardings = sqlx::query_as::<_, Onboarding>(&format!(
            "{ONBOARDING_SELECT} WHERE o.tenant_id = $1 ORDER BY o.created_at DESC"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(onboardings)
    }

    async fn find_onboarding(&self, scope: DataScope, id: Uuid) -> Result<Option<OnboardingDetail>, AppError> {
        let mut conn = self.pool.acquire().await?;
        load_detail(&mut conn, scope, id).await
    }

    async fn find_onboarding_for_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OnboardingDetail>, AppError> {
        let mut conn = self.pool.acquire().await?;

        let id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM onboardings WHERE tenant_id = $1 AND user_id = $2")
                .bind(tenant_id)
                .bind(user_id)
                .fetch_optional(&mut *conn)
                .await?;

        match id {
            Some(id) => {
                let scope = DataScope { tenant_id, owner_id: Some(user_id) };
                load_detail(&mut conn, scope, id).await
            }
            None => Ok(None),
        }
    }

    async fn update_task(
        &self,
        scope: DataScope,
        task_id: Uuid,
        completed: Option<bool>,
        priority: Option<Priority>,
    ) -> Result<Option<Task>, AppError> {
        let mut tx = self.pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks t
            SET completed = COALESCE($4, t.completed),
                priority = COALESCE($5, t.priority)
            FROM onboardings o
            WHERE t.id = $1
              AND t.onboarding_id = o.id
              AND o.tenant_id = $2
              AND ($3::uuid IS NULL OR o.user_id = $3)
            RETURNING t.id, t.onboarding_id, t.title, t.priority, t.completed
            "#,
        )
        .bind(task_id)
        .bind(scope.tenant_id)
        .bind(scope.owner_id)
        .bind(completed)
        .bind(priority)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(task) = &task {
            refresh_progress(&mut tx, task.onboarding_id).await?;
        }
        tx.commit().await?;
        Ok(task)
    }

    async fn update_document(
        &self,
        scope: DataScope,
        document_id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<Document>, AppError> {
        let mut tx = self.pool.begin().await?;

        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents d
            SET status = $4
            FROM onboardings o
            WHERE d.id = $1
              AND d.onboarding_id = o.id
              AND o.tenant_id = $2
              AND ($3::uuid IS NULL OR o.user_id = $3)
            RETURNING d.id, d.onboarding_id, d.title, d.status, d.due_date
            "#,
        )
        .bind(document_id)
        .bind(scope.tenant_id)
        .bind(scope.owner_id)
        .bind(status)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(document) = &document {
            refresh_progress(&mut tx, document.onboarding_id).await?;
        }
        tx.commit().await?;
        Ok(document)
    }

    async fn update_compliance(
        &self,
        scope: DataScope,
        item_id: Uuid,
        progress: i32,
    ) -> Result<Option<ComplianceItem>, AppError> {
        let mut tx = self.pool.begin().await?;

        let item = sqlx::query_as::<_, ComplianceItem>(
            r#"
            UPDATE compliance_items c
            SET progress = $4
            FROM onboardings o
            WHERE c.id = $1
              AND c.onboarding_id = o.id
              AND o.tenant_id = $2
              AND ($3::uuid IS NULL OR o.user_id = $3)
            RETURNING c.id, c.onboarding_id, c.name, c.progress
            "#,
        )
        .bind(item_id)
        .bind(scope.tenant_id)
        .bind(scope.owner_id)
        .bind(progress)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(item) = &item {
            refresh_progress(&mut tx, item.onboarding_id).await?;
        }
        tx.commit().await?;
        Ok(item)
    }
}

// ---
// Helpers (rodam na conexão/transação recebida)
// ---

async fn load_template_children(
    conn: &mut PgConnection,
    mut template: OnboardingTemplate,
) -> Result<OnboardingTemplate, AppError> {
    template.tasks = sqlx::query_as::<_, TemplateTask>(
        "SELECT id, title, category, priority FROM template_tasks WHERE template_id = $1 ORDER BY position",
    )
    .bind(template.id)
    .fetch_all(&mut *conn)
    .await?;

    template.documents = sqlx::query_as::<_, TemplateDocument>(
        "SELECT id, title, required FROM template_documents WHERE template_id = $1 ORDER BY position",
    )
    .bind(template.id)
    .fetch_all(&mut *conn)
    .await?;

    template.compliance_items = sqlx::query_as::<_, TemplateComplianceItem>(
        "SELECT id, name, kind FROM template_compliance_items WHERE template_id = $1 ORDER BY position",
    )
    .bind(template.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(template)
}

async fn load_items(
    conn: &mut PgConnection,
    onboarding_id: Uuid,
) -> Result<(Vec<Task>, Vec<Document>, Vec<ComplianceItem>), AppError> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, onboarding_id, title, priority, completed FROM tasks WHERE onboarding_id = $1 ORDER BY position",
    )
    .bind(onboarding_id)
    .fetch_all(&mut *conn)
    .await?;

    let documents = sqlx::query_as::<_, Document>(
        "SELECT id, onboarding_id, title, status, due_date FROM documents WHERE onboarding_id = $1 ORDER BY position",
    )
    .bind(onboarding_id)
    .fetch_all(&mut *conn)
    .await?;

    let compliance_items = sqlx::query_as::<_, ComplianceItem>(
        "SELECT id, onboarding_id, name, progress FROM compliance_items WHERE onboarding_id = $1 ORDER BY position",
    )
    .bind(onboarding_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok((tasks, documents, compliance_items))
}

async fn load_detail(
    conn: &mut PgConnection,
    scope: DataScope,
    id: Uuid,
) -> Result<Option<OnboardingDetail>, AppError> {
    let onboarding = sqlx::query_as::<_, Onboarding>(&format!(
        "{ONBOARDING_SELECT} WHERE o.id = $1 AND o.tenant_id = $2 AND ($3::uuid IS NULL OR o.user_id = $3)"
    ))
    .bind(id)
    .bind(scope.tenant_id)
    .bind(scope.owner_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(onboarding) = onboarding else {
        return Ok(None);
    };

    let (tasks, documents, compliance_items) = load_items(conn, onboarding.id).await?;
    Ok(Some(OnboardingDetail { onboarding, tasks, documents, compliance_items }))
}

/// Recalcula progresso e status depois de qualquer alteração nos itens.
///
/// Atualizações concorrentes do mesmo onboarding são serializadas pelo lock
/// da linha pai: quem espera o lock lê os itens já com o commit da outra.
async fn refresh_progress(conn: &mut PgConnection, onboarding_id: Uuid) -> Result<(), AppError> {
    sqlx::query("SELECT id FROM onboardings WHERE id = $1 FOR UPDATE")
        .bind(onboarding_id)
        .execute(&mut *conn)
        .await?;

    let (tasks, documents, compliance_items) = load_items(conn, onboarding_id).await?;
    let snapshot = ProgressSnapshot::evaluate(&tasks, &documents, &compliance_items);

    sqlx::query(
        r#"
        UPDATE onboardings
        SET progress = $2,
            status = $3,
            end_date = CASE WHEN $3 = 'COMPLETED'::onboarding_status
                            THEN COALESCE(end_date, CURRENT_DATE)
                            ELSE NULL END
        WHERE id = $1
        "#,
    )
    .bind(onboarding_id)
    .bind(snapshot.progress)
    .bind(snapshot.status)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
