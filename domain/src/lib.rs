use std::borrow::Cow;

pub mod clients;
pub mod discovery;
pub mod models;
pub mod repositories;

/// ドメインエラーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, enum_display::EnumDisplay)]
pub enum DomainErrorKind {
    /// 検証エラー
    Validation,
    /// エンティティが存在しない
    NotFound,
    /// リポジトリエラー
    Repository,
    /// リモートサービスに到達できない
    RemoteUnavailable,
    /// リモートサービスがエラーを返した
    Remote,
    /// 予期しないエラー
    Unexpected,
}

/// ドメインエラー
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {}", .messages.join(", "))]
pub struct DomainError {
    /// エラーの種類
    pub kind: DomainErrorKind,
    /// エラーメッセージ
    pub messages: Vec<Cow<'static, str>>,
    /// エラーの原因
    pub source: anyhow::Error,
}

/// ドメイン結果
pub type DomainResult<T> = Result<T, DomainError>;

/// メッセージからドメインエラーを作成する。
pub fn domain_error<M>(kind: DomainErrorKind, message: M) -> DomainError
where
    M: Into<Cow<'static, str>>,
{
    let message = message.into();
    DomainError {
        kind,
        source: anyhow::anyhow!(message.to_string()),
        messages: vec![message],
    }
}

/// 原因となったエラーからドメインエラーを作成する。
pub fn domain_error_from<E>(kind: DomainErrorKind, error: E) -> DomainError
where
    E: std::error::Error + Send + Sync + 'static,
{
    DomainError {
        kind,
        messages: vec![error.to_string().into()],
        source: error.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_keeps_kind_and_message() {
        let error = domain_error(DomainErrorKind::NotFound, "Department 7 is not found");

        assert_eq!(error.kind, DomainErrorKind::NotFound);
        assert_eq!(error.messages, vec![Cow::from("Department 7 is not found")]);
        assert_eq!(error.to_string(), "NotFound: Department 7 is not found");
    }

    #[test]
    fn domain_error_from_keeps_source_message() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = domain_error_from(DomainErrorKind::RemoteUnavailable, io);

        assert_eq!(error.kind, DomainErrorKind::RemoteUnavailable);
        assert_eq!(error.messages, vec![Cow::from("refused")]);
        assert_eq!(error.source.to_string(), "refused");
    }
}
