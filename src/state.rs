/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - tokens: StrategyRouter, authenticator: RequestAuthenticator, accounts, users
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - 起動時に組み立てた後は read-only (request 間で mutable state を共有しない)
 */
use std::sync::Arc;

use crate::repos::user_repo::{InMemoryUserRepo, UserLookup};
use crate::services::account::AccountService;
use crate::services::auth::{RequestAuthenticator, StrategyRouter};
use crate::services::password::PasswordHasher;

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<StrategyRouter>,
    pub authenticator: Arc<RequestAuthenticator>,
    pub accounts: Arc<AccountService>,
    pub users: Arc<dyn UserLookup>,
}

impl AppState {
    pub fn new(
        tokens: Arc<StrategyRouter>,
        repo: Arc<InMemoryUserRepo>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        let users: Arc<dyn UserLookup> = repo.clone();
        let authenticator = Arc::new(RequestAuthenticator::new(tokens.clone(), users.clone()));
        let accounts = Arc::new(AccountService::new(repo, hasher, tokens.clone()));

        Self {
            tokens,
            authenticator,
            accounts,
            users,
        }
    }
}
