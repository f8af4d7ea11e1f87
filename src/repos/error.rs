/*
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("conflict")]
    Conflict,
    #[error("user store unavailable: {0}")]
    Unavailable(String),
}
