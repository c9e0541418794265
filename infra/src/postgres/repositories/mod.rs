mod department;

pub use department::*;

use std::marker::PhantomData;

use sqlx::{PgPool, Postgres, Transaction};

use domain::{DomainError, DomainErrorKind, DomainResult, domain_error_from};

/// PostgreSQLトランザクション
pub type PgTransaction<'a> = Transaction<'a, Postgres>;

/// PostgreSQLリポジトリ
pub struct PgRepository<T> {
    pub pool: PgPool,
    pub _marker: PhantomData<T>,
}

impl<T> PgRepository<T> {
    /// リポジトリを作成する。
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// トランザクションを開始する。
    ///
    /// # 戻り値
    ///
    /// トランザクション
    pub async fn begin(&self) -> DomainResult<PgTransaction<'_>> {
        self.pool.begin().await.map_err(repository_error)
    }
}

/// トランザクションをコミットする。
///
/// # 引数
///
/// * `tx`: トランザクション
pub async fn commit(tx: PgTransaction<'_>) -> DomainResult<()> {
    tx.commit().await.map_err(repository_error)
}

pub fn repository_error(e: sqlx::Error) -> DomainError {
    domain_error_from(DomainErrorKind::Repository, e)
}
