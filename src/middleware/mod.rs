/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: request 認証 (Bearer → AuthCtx) と 401 応答
 * - cors / http: transport 層の横断的な layer
 */
pub mod auth;
pub mod cors;
pub mod http;
