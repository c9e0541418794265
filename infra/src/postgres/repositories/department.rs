use sqlx::Postgres;

use domain::{
    DomainErrorKind, DomainResult, domain_error,
    models::{Department, DepartmentId},
    repositories::{DepartmentInput, DepartmentRepository},
};

use super::{PgRepository, commit, repository_error};

pub type PgDepartmentRepository = PgRepository<Department>;

#[async_trait::async_trait]
impl DepartmentRepository for PgDepartmentRepository {
    /// 部署を登録する。
    ///
    /// IDを指定した場合は、採番用のシーケンスを登録済みの最大IDまで進める。
    async fn create(&self, input: DepartmentInput) -> DomainResult<Department> {
        let mut tx = self.begin().await?;
        let row = match input.id {
            Some(id) => {
                let row = sqlx::query_as::<Postgres, DepartmentRow>(
                    r#"
                    INSERT INTO departments (id, name)
                    VALUES ($1, $2)
                    RETURNING id, name
                    "#,
                )
                .bind(id.0)
                .bind(&input.name)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    let duplicated = e
                        .as_database_error()
                        .is_some_and(|db| db.is_unique_violation());
                    if duplicated {
                        domain_error(
                            DomainErrorKind::Validation,
                            format!("Department {} already exists", id),
                        )
                    } else {
                        repository_error(e)
                    }
                })?;
                sqlx::query(
                    r#"
                    SELECT setval(pg_get_serial_sequence('departments', 'id'), MAX(id))
                    FROM departments
                    "#,
                )
                .execute(&mut *tx)
                .await
                .map_err(repository_error)?;
                row
            }
            None => sqlx::query_as::<Postgres, DepartmentRow>(
                r#"
                INSERT INTO departments (name)
                VALUES ($1)
                RETURNING id, name
                "#,
            )
            .bind(&input.name)
            .fetch_one(&mut *tx)
            .await
            .map_err(repository_error)?,
        };
        commit(tx).await?;
        Ok(Department::from(row))
    }

    /// 部署をIDで取得する。
    async fn by_id(&self, id: DepartmentId) -> DomainResult<Option<Department>> {
        let row = sqlx::query_as::<Postgres, DepartmentRow>(
            r#"
            SELECT id, name
            FROM departments
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(repository_error)?;
        Ok(row.map(Department::from))
    }

    /// 部署をリストする。
    async fn list(&self) -> DomainResult<Vec<Department>> {
        let rows = sqlx::query_as::<Postgres, DepartmentRow>(
            r#"
            SELECT id, name
            FROM departments
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;
        Ok(rows.into_iter().map(Department::from).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DepartmentRow {
    id: i64,
    name: String,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Department::new(DepartmentId(row.id), row.name)
    }
}
