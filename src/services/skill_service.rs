use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::skill_dto::{
    CreateDepartmentPayload, CreateSkillPayload, CreateUserSkillPayload, SkillListQuery,
    UpdateSkillPayload, UpdateUserSkillPayload, UserSkillResponse,
};
use crate::error::{Error, Result};
use crate::models::skill::{Department, Skill};

const SKILL_COLUMNS: &str = "id, name, category, description, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct SkillService {
    pool: PgPool,
}

impl SkillService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_skill(&self, payload: CreateSkillPayload) -> Result<Skill> {
        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM skills WHERE lower(name) = lower($1)",
        )
        .bind(&payload.name)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_some() {
            return Err(Error::Conflict(
                "A skill with this name already exists".to_string(),
            ));
        }

        let skill = sqlx::query_as::<_, Skill>(&format!(
            "INSERT INTO skills (name, category, description) \
             VALUES ($1, COALESCE($2, 'other'), $3) \
             RETURNING {SKILL_COLUMNS}"
        ))
        .bind(&payload.name)
        .bind(&payload.category)
        .bind(&payload.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(skill)
    }

    pub async fn get_skill(&self, id: Uuid) -> Result<Skill> {
        let skill = sqlx::query_as::<_, Skill>(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(skill)
    }

    pub async fn list_skills(&self, query: SkillListQuery) -> Result<Vec<Skill>> {
        let search = query.search.map(|s| format!("%{}%", s.trim().to_lowercase()));
        let skills = sqlx::query_as::<_, Skill>(&format!(
            "SELECT {SKILL_COLUMNS} FROM skills \
             WHERE is_active = TRUE \
               AND ($1::text IS NULL OR category = $1) \
               AND ($2::text IS NULL OR lower(name) LIKE $2) \
             ORDER BY category, name"
        ))
        .bind(&query.category)
        .bind(&search)
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    pub async fn update_skill(&self, id: Uuid, payload: UpdateSkillPayload) -> Result<Skill> {
        let skill = sqlx::query_as::<_, Skill>(&format!(
            "UPDATE skills SET \
                 name = COALESCE($1, name), \
                 category = COALESCE($2, category), \
                 description = COALESCE($3, description), \
                 is_active = COALESCE($4, is_active), \
                 updated_at = NOW() \
             WHERE id = $5 \
             RETURNING {SKILL_COLUMNS}"
        ))
        .bind(&payload.name)
        .bind(&payload.category)
        .bind(&payload.description)
        .bind(payload.is_active)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(skill)
    }

    pub async fn delete_skill(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Skill not found".to_string()));
        }
        Ok(())
    }

    pub async fn add_user_skill(
        &self,
        user_id: Uuid,
        payload: CreateUserSkillPayload,
    ) -> Result<UserSkillResponse> {
        self.get_skill(payload.skill_id).await?;

        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM user_skills WHERE user_id = $1 AND skill_id = $2",
        )
        .bind(user_id)
        .bind(payload.skill_id)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_some() {
            return Err(Error::Conflict(
                "This skill is already on the profile".to_string(),
            ));
        }

        let user_skill = sqlx::query_as::<_, UserSkillResponse>(
            "WITH inserted AS ( \
                 INSERT INTO user_skills (user_id, skill_id, level, years_of_experience, is_primary) \
                 VALUES ($1, $2, COALESCE($3, 'beginner'), $4, $5) \
                 RETURNING id, skill_id, level, years_of_experience, is_primary, created_at \
             ) \
             SELECT i.id, i.skill_id, s.name AS skill_name, s.category AS skill_category, \
                    i.level, i.years_of_experience, i.is_primary, i.created_at \
             FROM inserted i JOIN skills s ON s.id = i.skill_id",
        )
        .bind(user_id)
        .bind(payload.skill_id)
        .bind(&payload.level)
        .bind(payload.years_of_experience)
        .bind(payload.is_primary)
        .fetch_one(&self.pool)
        .await?;
        Ok(user_skill)
    }

    pub async fn update_user_skill(
        &self,
        user_id: Uuid,
        user_skill_id: Uuid,
        payload: UpdateUserSkillPayload,
    ) -> Result<UserSkillResponse> {
        let user_skill = sqlx::query_as::<_, UserSkillResponse>(
            "WITH updated AS ( \
                 UPDATE user_skills SET \
                     level = COALESCE($1, level), \
                     years_of_experience = COALESCE($2, years_of_experience), \
                     is_primary = COALESCE($3, is_primary) \
                 WHERE id = $4 AND user_id = $5 \
                 RETURNING id, skill_id, level, years_of_experience, is_primary, created_at \
             ) \
             SELECT u.id, u.skill_id, s.name AS skill_name, s.category AS skill_category, \
                    u.level, u.years_of_experience, u.is_primary, u.created_at \
             FROM updated u JOIN skills s ON s.id = u.skill_id",
        )
        .bind(&payload.level)
        .bind(payload.years_of_experience)
        .bind(payload.is_primary)
        .bind(user_skill_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User skill not found".to_string()))?;
        Ok(user_skill)
    }

    pub async fn remove_user_skill(&self, user_id: Uuid, user_skill_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM user_skills WHERE id = $1 AND user_id = $2")
            .bind(user_skill_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("User skill not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_user_skills(&self, user_id: Uuid) -> Result<Vec<UserSkillResponse>> {
        let skills = sqlx::query_as::<_, UserSkillResponse>(
            "SELECT us.id, us.skill_id, s.name AS skill_name, s.category AS skill_category, \
                    us.level, us.years_of_experience, us.is_primary, us.created_at \
             FROM user_skills us JOIN skills s ON s.id = us.skill_id \
             WHERE us.user_id = $1 \
             ORDER BY us.is_primary DESC, s.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    pub async fn create_department(&self, payload: CreateDepartmentPayload) -> Result<Department> {
        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM departments WHERE lower(name) = lower($1)",
        )
        .bind(&payload.name)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_some() {
            return Err(Error::Conflict(
                "A department with this name already exists".to_string(),
            ));
        }

        let department = sqlx::query_as::<_, Department>(
            "INSERT INTO departments (name, description) VALUES ($1, $2) \
             RETURNING id, name, description, is_active, created_at, updated_at",
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(department)
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>> {
        let departments = sqlx::query_as::<_, Department>(
            "SELECT id, name, description, is_active, created_at, updated_at \
             FROM departments WHERE is_active = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(departments)
    }
}
