// src/models/dashboard.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::auth::Role;

// 1. Painel do RH (Os Cards do Topo)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HrDashboard {
    pub company_name: String,
    pub active_onboardings: i64,
    pub completed_last_30_days: i64, // Concluídos nos últimos 30 dias
    pub average_completion_days: f64, // Média de (end_date - start_date)
    pub compliance_rate: f64,         // Média de progresso de conformidade dos ativos
}

// 2. Painel do Colaborador
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDashboard {
    pub name: String,
    pub role: Role,
    pub start_date: Option<NaiveDate>,
    pub onboarding_progress: i32,
    pub tasks_completed: i64,
    pub tasks_total: i64,
    pub documents_signed: i64,
    pub documents_total: i64,
}
