/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - token の検証ロジックは services/auth 側の責務
 * - request ごとに一度だけ作られ、request の終わりに捨てられる (共有・キャッシュしない)
 */
use std::collections::BTreeSet;

use uuid::Uuid;

use crate::services::auth::identity::Identity;

/// Context attached to an authenticated request.
///
/// - `identity` is the stored account (subject = lowercased email, role)
/// - `authorities` holds exactly one `ROLE_*` entry in the single-role model
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub identity: Identity,
    pub authorities: BTreeSet<String>,
}

impl AuthCtx {
    pub fn new(user_id: Uuid, identity: Identity, authority: String) -> Self {
        Self {
            user_id,
            identity,
            authorities: BTreeSet::from([authority]),
        }
    }

    pub fn subject(&self) -> &str {
        &self.identity.subject
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}
