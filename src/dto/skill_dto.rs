use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::skill::{Department, Skill};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSkillPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateSkillPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Skill> for SkillResponse {
    fn from(value: Skill) -> Self {
        Self {
            id: value.id,
            name: value.name,
            category: value.category,
            description: value.description,
            is_active: value.is_active,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SkillListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserSkillPayload {
    pub skill_id: Uuid,
    pub level: Option<String>,
    #[validate(range(min = 0, max = 80))]
    pub years_of_experience: Option<i32>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserSkillPayload {
    pub level: Option<String>,
    #[validate(range(min = 0, max = 80))]
    pub years_of_experience: Option<i32>,
    pub is_primary: Option<bool>,
}

/// User skill joined with its catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSkillResponse {
    pub id: Uuid,
    pub skill_id: Uuid,
    pub skill_name: String,
    pub skill_category: String,
    pub level: String,
    pub years_of_experience: Option<i32>,
    pub is_primary: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDepartmentPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Department> for DepartmentResponse {
    fn from(value: Department) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            is_active: value.is_active,
            created_at: value.created_at,
        }
    }
}
