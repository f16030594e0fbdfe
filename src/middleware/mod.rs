/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http: request id / trace / limit / timeout
 * - auth: リクエストの認証ヘッダから転送用 credential を組み立てる
 */
pub mod auth;
pub mod http;
