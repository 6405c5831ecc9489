use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{auth::AccessToken, id::UserId};

// トークンの発行・失効は外部の認証基盤が担う。
// この層が必要とするのはトークンからユーザー ID を引く操作だけ
#[mockall::automock]
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn fetch_user_id_from_token(&self, access_token: &AccessToken)
        -> AppResult<Option<UserId>>;
}
