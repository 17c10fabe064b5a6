// src/db/employee_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::employee::{
        CreateEmployeePayload, Employee, EmployeeFilter, EmployeeStatus, UpdateEmployeePayload,
        UpdateProfilePayload,
    },
};

// O repositório de funcionários, responsável pela tabela 'employees'
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, AppError> {
        // Sem filtro explícito, a lista mostra apenas os ativos
        let status = filter.status.unwrap_or(EmployeeStatus::Active);
        let search = filter.search.as_deref().map(|s| format!("%{}%", s.trim()));

        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT * FROM employees
            WHERE status = $1
              AND ($2::TEXT IS NULL OR department = $2)
              AND ($3::TEXT IS NULL
                   OR first_name ILIKE $3
                   OR last_name ILIKE $3
                   OR email ILIKE $3)
            ORDER BY last_name, first_name
            "#,
        )
        .bind(status)
        .bind(filter.department.as_deref())
        .bind(search)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(employee)
    }

    // Vínculo com o usuário do serviço de autenticação
    pub async fn find_by_external_user<'e, E>(
        &self,
        executor: E,
        external_user_id: i64,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE external_user_id = $1",
        )
        .bind(external_user_id)
        .fetch_optional(executor)
        .await?;
        Ok(employee)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateEmployeePayload,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (
                external_user_id, first_name, middle_name, last_name, email, phone,
                address, department, position, hire_date, status,
                emergency_contact_name, emergency_contact_phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(input.external_user_id)
        .bind(input.first_name.trim())
        .bind(input.middle_name.as_deref())
        .bind(input.last_name.trim())
        .bind(input.email.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.address.as_deref())
        .bind(input.department.as_deref())
        .bind(input.position.as_deref())
        .bind(input.hire_date)
        .bind(input.status.unwrap_or(EmployeeStatus::Active))
        .bind(input.emergency_contact_name.as_deref())
        .bind(input.emergency_contact_phone.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, "employee e-mail or external user"))
    }

    // COALESCE: campo ausente no payload mantém o valor atual
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        input: &UpdateEmployeePayload,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees SET
                external_user_id = COALESCE($2, external_user_id),
                first_name = COALESCE($3, first_name),
                middle_name = COALESCE($4, middle_name),
                last_name = COALESCE($5, last_name),
                email = COALESCE($6, email),
                phone = COALESCE($7, phone),
                address = COALESCE($8, address),
                department = COALESCE($9, department),
                position = COALESCE($10, position),
                hire_date = COALESCE($11, hire_date),
                status = COALESCE($12, status),
                emergency_contact_name = COALESCE($13, emergency_contact_name),
                emergency_contact_phone = COALESCE($14, emergency_contact_phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.external_user_id)
        .bind(input.first_name.as_deref())
        .bind(input.middle_name.as_deref())
        .bind(input.last_name.as_deref())
        .bind(input.email.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.address.as_deref())
        .bind(input.department.as_deref())
        .bind(input.position.as_deref())
        .bind(input.hire_date)
        .bind(input.status)
        .bind(input.emergency_contact_name.as_deref())
        .bind(input.emergency_contact_phone.as_deref())
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, "employee e-mail or external user"))
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        id: i64,
        input: &UpdateProfilePayload,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees SET
                email = COALESCE($2, email),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                emergency_contact_name = COALESCE($5, emergency_contact_name),
                emergency_contact_phone = COALESCE($6, emergency_contact_phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.email.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.address.as_deref())
        .bind(input.emergency_contact_name.as_deref())
        .bind(input.emergency_contact_phone.as_deref())
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, "employee e-mail"))
    }

    // Exclusão física; o ON DELETE CASCADE leva junto as solicitações
    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
