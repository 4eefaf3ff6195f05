#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use onboarding_backend::{
    common::error::AppError,
    config::{AppState, Config},
    db::{
        DashboardRepository, InvitationRepository, OnboardingRepository, Redemption, Repositories, TenantRepository,
        UserRepository,
    },
    models::{
        auth::{DataScope, NewUser, User},
        dashboard::{EmployeeDashboard, HrDashboard},
        invitation::{Invitation, InvitationWithCompany, NewInvitation},
        onboarding::{
            ComplianceItem, CreateTemplatePayload, Document, DocumentStatus, NewOnboarding, Onboarding,
            OnboardingDetail, OnboardingStatus, OnboardingTemplate, Priority, ProgressSnapshot, Task,
            TemplateComplianceItem, TemplateDocument, TemplateTask,
        },
        tenancy::{MemberSummary, NewTenant, Tenant},
    },
    router::build_router,
};

// =============================================================================
//  Repositório em memória (mesmas garantias de unicidade e atomicidade)
// =============================================================================

#[derive(Default)]
struct State {
    tenants: Vec<Tenant>,
    users: Vec<User>,
    invitations: Vec<Invitation>,
    templates: Vec<OnboardingTemplate>,
    onboardings: Vec<Onboarding>,
    tasks: Vec<(usize, Task)>,
    documents: Vec<(usize, Document)>,
    compliance: Vec<(usize, ComplianceItem)>,
}

impl State {
    fn insert_user(&mut self, tenant_id: Uuid, new: &NewUser) -> Result<User, AppError> {
        if self.users.iter().any(|u| u.email == new.email) {
            return Err(AppError::Conflict("This email is already in use.".into()));
        }
        let user = User {
            id: Uuid::new_v4(),
            tenant_id,
            name: new.name.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            role: new.role,
            created_at: Utc::now(),
        };
        self.users.push(user.clone());
        Ok(user)
    }

    fn onboarding_in_scope(&self, scope: DataScope, onboarding_id: Uuid) -> bool {
        self.onboardings.iter().any(|o| {
            o.id == onboarding_id
                && o.tenant_id == scope.tenant_id
                && scope.owner_id.is_none_or(|owner| o.user_id == owner)
        })
    }

    fn items(&self, onboarding_id: Uuid) -> (Vec<Task>, Vec<Document>, Vec<ComplianceItem>) {
        let mut tasks: Vec<_> = self.tasks.iter().filter(|(_, t)| t.onboarding_id == onboarding_id).cloned().collect();
        let mut documents: Vec<_> =
            self.documents.iter().filter(|(_, d)| d.onboarding_id == onboarding_id).cloned().collect();
        let mut compliance: Vec<_> =
            self.compliance.iter().filter(|(_, c)| c.onboarding_id == onboarding_id).cloned().collect();
        tasks.sort_by_key(|(p, _)| *p);
        documents.sort_by_key(|(p, _)| *p);
        compliance.sort_by_key(|(p, _)| *p);
        (
            tasks.into_iter().map(|(_, t)| t).collect(),
            documents.into_iter().map(|(_, d)| d).collect(),
            compliance.into_iter().map(|(_, c)| c).collect(),
        )
    }

    fn detail(&self, scope: DataScope, id: Uuid) -> Option<OnboardingDetail> {
        if !self.onboarding_in_scope(scope, id) {
            return None;
        }
        let onboarding = self.onboardings.iter().find(|o| o.id == id)?.clone();
        let (tasks, documents, compliance_items) = self.items(id);
        Some(OnboardingDetail { onboarding, tasks, documents, compliance_items })
    }

    fn refresh_progress(&mut self, onboarding_id: Uuid) {
        let (tasks, documents, compliance) = self.items(onboarding_id);
        let snapshot = ProgressSnapshot::evaluate(&tasks, &documents, &compliance);
        if let Some(o) = self.onboardings.iter_mut().find(|o| o.id == onboarding_id) {
            o.progress = snapshot.progress;
            o.status = snapshot.status;
            o.end_date = match snapshot.status {
                OnboardingStatus::Completed => o.end_date.or(Some(Utc::now().date_naive())),
                OnboardingStatus::Active => None,
            };
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            tenants: Arc::new(self.clone()),
            users: Arc::new(self.clone()),
            invitations: Arc::new(self.clone()),
            onboardings: Arc::new(self.clone()),
            dashboards: Arc::new(self.clone()),
        }
    }

    // --- Inspeção para as asserções ---

    pub fn tenant_count(&self) -> usize {
        self.lock().tenants.len()
    }

    pub fn users_with_email(&self, email: &str) -> Vec<User> {
        self.lock().users.iter().filter(|u| u.email == email).cloned().collect()
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub fn tenant_named(&self, name: &str) -> Option<Tenant> {
        self.lock().tenants.iter().find(|t| t.name == name).cloned()
    }

    pub fn invitation_exists(&self, token: &str) -> bool {
        self.lock().invitations.iter().any(|i| i.id == token)
    }

    pub fn expire_invitation(&self, token: &str) {
        let mut state = self.lock();
        if let Some(inv) = state.invitations.iter_mut().find(|i| i.id == token) {
            inv.expires_at = Utc::now() - chrono::Duration::minutes(1);
        }
    }
}

#[async_trait]
impl TenantRepository for MemoryStore {
    async fn name_taken(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.lock().tenants.iter().any(|t| t.name.eq_ignore_ascii_case(name)))
    }

    async fn create_with_owner(&self, tenant: NewTenant, owner: NewUser) -> Result<(Tenant, User), AppError> {
        let mut state = self.lock();
        if state.tenants.iter().any(|t| t.name.eq_ignore_ascii_case(&tenant.name)) {
            return Err(AppError::Conflict("A company with this name already exists.".into()));
        }
        if state.users.iter().any(|u| u.email == owner.email) {
            return Err(AppError::Conflict("This email is already in use.".into()));
        }
        let tenant = Tenant { id: Uuid::new_v4(), name: tenant.name, plan: tenant.plan, created_at: Utc::now() };
        let user = state.insert_user(tenant.id, &owner)?;
        state.tenants.push(tenant.clone());
        Ok((tenant, user))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<MemberSummary>, AppError> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| u.tenant_id == tenant_id)
            .map(|u| MemberSummary { id: u.id, name: u.name.clone(), email: u.email.clone(), role: u.role })
            .collect())
    }
}

#[async_trait]
impl InvitationRepository for MemoryStore {
    async fn insert(&self, new: NewInvitation) -> Result<Option<Invitation>, AppError> {
        let mut state = self.lock();
        if state.invitations.iter().any(|i| i.id == new.token) {
            return Ok(None);
        }
        let invitation = Invitation {
            id: new.token,
            tenant_id: new.tenant_id,
            email: new.email,
            role: new.role,
            expires_at: new.expires_at,
            created_at: Utc::now(),
        };
        state.invitations.push(invitation.clone());
        Ok(Some(invitation))
    }

    async fn find_with_company(&self, token: &str) -> Result<Option<InvitationWithCompany>, AppError> {
        let state = self.lock();
        let Some(invitation) = state.invitations.iter().find(|i| i.id == token).cloned() else {
            return Ok(None);
        };
        let company_name = state
            .tenants
            .iter()
            .find(|t| t.id == invitation.tenant_id)
            .map(|t| t.name.clone())
            .unwrap_or_default();
        Ok(Some(InvitationWithCompany { invitation, company_name }))
    }

    // Compare-and-delete sob o mesmo lock: só um resgate vence.
    async fn redeem(&self, token: &str, now: DateTime<Utc>, redemption: Redemption) -> Result<Option<User>, AppError> {
        let mut state = self.lock();
        let Some(index) = state.invitations.iter().position(|i| i.id == token && i.expires_at > now) else {
            return Ok(None);
        };
        let invitation = state.invitations[index].clone();
        let user = state.insert_user(
            invitation.tenant_id,
            &NewUser {
                name: redemption.name,
                email: invitation.email,
                password_hash: redemption.password_hash,
                role: invitation.role,
            },
        )?;
        state.invitations.remove(index);
        Ok(Some(user))
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Invitation>, AppError> {
        let mut list: Vec<_> = self.lock().invitations.iter().filter(|i| i.tenant_id == tenant_id).cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn delete_in_tenant(&self, tenant_id: Uuid, token: &str) -> Result<bool, AppError> {
        let mut state = self.lock();
        let before = state.invitations.len();
        state.invitations.retain(|i| !(i.id == token && i.tenant_id == tenant_id));
        Ok(state.invitations.len() != before)
    }
}

#[async_trait]
impl OnboardingRepository for MemoryStore {
    async fn create_template(
        &self,
        tenant_id: Uuid,
        payload: &CreateTemplatePayload,
    ) -> Result<OnboardingTemplate, AppError> {
        let template = OnboardingTemplate {
            id: Uuid::new_v4(),
            tenant_id,
            name: payload.name.clone(),
            description: payload.description.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            tasks: payload
                .tasks
                .iter()
                .map(|t| TemplateTask {
                    id: Uuid::new_v4(),
                    title: t.title.clone(),
                    category: t.category.clone(),
                    priority: Priority::default(),
                })
                .collect(),
            documents: payload
                .documents
                .iter()
                .map(|d| TemplateDocument { id: Uuid::new_v4(), title: d.title.clone(), required: d.required })
                .collect(),
            compliance_items: payload
                .compliance_items
                .iter()
                .map(|c| TemplateComplianceItem { id: Uuid::new_v4(), name: c.title.clone(), kind: c.kind.clone() })
                .collect(),
        };
        self.lock().templates.push(template.clone());
        Ok(template)
    }

    async fn list_templates(&self, tenant_id: Uuid) -> Result<Vec<OnboardingTemplate>, AppError> {
        Ok(self.lock().templates.iter().filter(|t| t.tenant_id == tenant_id).cloned().collect())
    }

    async fn find_template(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<OnboardingTemplate>, AppError> {
        Ok(self.lock().templates.iter().find(|t| t.id == id && t.tenant_id == tenant_id).cloned())
    }

    async fn update_template(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Option<OnboardingTemplate>, AppError> {
        let mut state = self.lock();
        let Some(template) = state.templates.iter_mut().find(|t| t.id == id && t.tenant_id == tenant_id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            template.name = name;
        }
        if let Some(description) = description {
            template.description = description;
        }
        template.updated_at = Utc::now();
        Ok(Some(template.clone()))
    }

    async fn create_onboarding(&self, tenant_id: Uuid, new: NewOnboarding) -> Result<OnboardingDetail, AppError> {
        let mut state = self.lock();
        let user = state
            .users
            .iter()
            .find(|u| u.id == new.user_id && u.tenant_id == tenant_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("User"))?;
        if state.onboardings.iter().any(|o| o.user_id == user.id) {
            return Err(AppError::Conflict("This employee already has an onboarding.".into()));
        }

        let onboarding = Onboarding {
            id: Uuid::new_v4(),
            tenant_id,
            user_id: user.id,
            user_name: user.name,
            user_email: user.email,
            status: OnboardingStatus::Active,
            start_date: new.start_date,
            end_date: None,
            progress: 0,
            created_at: Utc::now(),
        };
        let id = onboarding.id;
        state.onboardings.push(onboarding);

        for (position, (title, priority)) in new.tasks.into_iter().enumerate() {
            let task = Task { id: Uuid::new_v4(), onboarding_id: id, title, priority, completed: false };
            state.tasks.push((position, task));
        }
        for (position, (title, due_date)) in new.documents.into_iter().enumerate() {
            let doc = Document { id: Uuid::new_v4(), onboarding_id: id, title, status: DocumentStatus::Pending, due_date };
            state.documents.push((position, doc));
        }
        for (position, name) in new.compliance_items.into_iter().enumerate() {
            let item = ComplianceItem { id: Uuid::new_v4(), onboarding_id: id, name, progress: 0 };
            state.compliance.push((position, item));
        }

        let scope = DataScope { tenant_id, owner_id: None };
        state.detail(scope, id).ok_or_else(|| anyhow::anyhow!("missing onboarding").into())
    }

    async fn list_onboardings(&self, tenant_id: Uuid) -> Result<Vec<Onboarding>, AppError> {
        Ok(self.lock().onboardings.iter().filter(|o| o.tenant_id == tenant_id).cloned().collect())
    }

    async fn find_onboarding(&self, scope: DataScope, id: Uuid) -> Result<Option<OnboardingDetail>, AppError> {
        Ok(self.lock().detail(scope, id))
    }

    async fn find_onboarding_for_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OnboardingDetail>, AppError> {
        let state = self.lock();
        let Some(id) = state.onboardings.iter().find(|o| o.tenant_id == tenant_id && o.user_id == user_id).map(|o| o.id)
        else {
            return Ok(None);
        };
        Ok(state.detail(DataScope { tenant_id, owner_id: Some(user_id) }, id))
    }

    async fn update_task(
        &self,
        scope: DataScope,
        task_id: Uuid,
        completed: Option<bool>,
        priority: Option<Priority>,
    ) -> Result<Option<Task>, AppError> {
        let mut state = self.lock();
        let Some(onboarding_id) = state.tasks.iter().find(|(_, t)| t.id == task_id).map(|(_, t)| t.onboarding_id)
        else {
            return Ok(None);
        };
        if !state.onboarding_in_scope(scope, onboarding_id) {
            return Ok(None);
        }
        let mut updated = None;
        if let Some((_, task)) = state.tasks.iter_mut().find(|(_, t)| t.id == task_id) {
            if let Some(completed) = completed {
                task.completed = completed;
            }
            if let Some(priority) = priority {
                task.priority = priority;
            }
            updated = Some(task.clone());
        }
        state.refresh_progress(onboarding_id);
        Ok(updated)
    }

    async fn update_document(
        &self,
        scope: DataScope,
        document_id: Uuid,
        status: DocumentStatus,
    ) -> Result<Option<Document>, AppError> {
        let mut state = self.lock();
        let Some(onboarding_id) =
            state.documents.iter().find(|(_, d)| d.id == document_id).map(|(_, d)| d.onboarding_id)
        else {
            return Ok(None);
        };
        if !state.onboarding_in_scope(scope, onboarding_id) {
            return Ok(None);
        }
        let mut updated = None;
        if let Some((_, doc)) = state.documents.iter_mut().find(|(_, d)| d.id == document_id) {
            doc.status = status;
            updated = Some(doc.clone());
        }
        state.refresh_progress(onboarding_id);
        Ok(updated)
    }

    async fn update_compliance(
        &self,
        scope: DataScope,
        item_id: Uuid,
        progress: i32,
    ) -> Result<Option<ComplianceItem>, AppError> {
        let mut state = self.lock();
        let Some(onboarding_id) = state.compliance.iter().find(|(_, c)| c.id == item_id).map(|(_, c)| c.onboarding_id)
        else {
            return Ok(None);
        };
        if !state.onboarding_in_scope(scope, onboarding_id) {
            return Ok(None);
        }
        let mut updated = None;
        if let Some((_, item)) = state.compliance.iter_mut().find(|(_, c)| c.id == item_id) {
            item.progress = progress;
            updated = Some(item.clone());
        }
        state.refresh_progress(onboarding_id);
        Ok(updated)
    }
}

#[async_trait]
impl DashboardRepository for MemoryStore {
    async fn hr_summary(&self, tenant_id: Uuid) -> Result<Option<HrDashboard>, AppError> {
        let state = self.lock();
        let Some(tenant) = state.tenants.iter().find(|t| t.id == tenant_id) else {
            return Ok(None);
        };
        let mine: Vec<_> = state.onboardings.iter().filter(|o| o.tenant_id == tenant_id).collect();
        let active: Vec<_> = mine.iter().filter(|o| o.status == OnboardingStatus::Active).collect();
        let completed: Vec<_> = mine.iter().filter(|o| o.status == OnboardingStatus::Completed).collect();

        let durations: Vec<i64> = completed
            .iter()
            .filter_map(|o| o.end_date.map(|end| (end - o.start_date).num_days()))
            .collect();
        let average_completion_days = if durations.is_empty() {
            0.0
        } else {
            durations.iter().sum::<i64>() as f64 / durations.len() as f64
        };

        let progress: Vec<i32> = state
            .compliance
            .iter()
            .filter(|(_, c)| active.iter().any(|o| o.id == c.onboarding_id))
            .map(|(_, c)| c.progress)
            .collect();
        let compliance_rate = if progress.is_empty() {
            0.0
        } else {
            progress.iter().sum::<i32>() as f64 / progress.len() as f64
        };

        Ok(Some(HrDashboard {
            company_name: tenant.name.clone(),
            active_onboardings: active.len() as i64,
            completed_last_30_days: completed.len() as i64,
            average_completion_days,
            compliance_rate,
        }))
    }

    async fn employee_summary(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Option<EmployeeDashboard>, AppError> {
        let state = self.lock();
        let Some(user) = state.users.iter().find(|u| u.id == user_id && u.tenant_id == tenant_id) else {
            return Ok(None);
        };
        let onboarding = state.onboardings.iter().find(|o| o.user_id == user_id);
        let (tasks, documents, _) = onboarding.map(|o| state.items(o.id)).unwrap_or_default();

        Ok(Some(EmployeeDashboard {
            name: user.name.clone(),
            role: user.role,
            start_date: onboarding.map(|o| o.start_date),
            onboarding_progress: onboarding.map(|o| o.progress).unwrap_or(0),
            tasks_completed: tasks.iter().filter(|t| t.completed).count() as i64,
            tasks_total: tasks.len() as i64,
            documents_signed: documents.iter().filter(|d| d.status == DocumentStatus::Signed).count() as i64,
            documents_total: documents.len() as i64,
        }))
    }
}

// =============================================================================
//  App de teste
// =============================================================================

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        jwt_secret: "integration-test-secret-with-32-plus-bytes".into(),
        bind_addr: "127.0.0.1:0".into(),
        max_connections: 1,
        session_ttl_hours: 1,
        invitation_ttl_days: 7,
        public_base_url: "http://app.test".into(),
        bcrypt_cost: 4,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::default();
        let state = AppState::new(store.repositories(), &test_config()).unwrap();
        Self { router: build_router(state), store }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request_with_headers(method, uri, token, &[], body).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, json)
    }

    /// Registra uma empresa e devolve o token de sessão do usuário de RH.
    pub async fn register_and_login(&self, company: &str, email: &str) -> String {
        let (status, _) = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(serde_json::json!({
                    "name": "Owner",
                    "email": email,
                    "password": "longenough",
                    "companyName": company,
                    "plan": "pro",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(email, "longenough").await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Convida, aceita e faz login; devolve (token de sessão, id do usuário).
    pub async fn onboard_member(&self, hr_token: &str, email: &str, role: &str) -> (String, Uuid) {
        let invite_token = self.invite(hr_token, email, role).await;
        let (status, body) = self
            .request(
                Method::POST,
                "/api/accept-invitation",
                None,
                Some(serde_json::json!({ "token": invite_token, "name": "Member", "password": "longenough" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "accept failed: {body}");
        let user_id = self.store.users_with_email(email)[0].id;
        (self.login(email, "longenough").await, user_id)
    }

    pub async fn invite(&self, hr_token: &str, email: &str, role: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/invite",
                Some(hr_token),
                Some(serde_json::json!({ "email": email, "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "invite failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }
}
