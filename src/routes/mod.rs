mod admin;
mod health_check;
mod posts;
mod sessions;
mod users;
mod webhooks;

pub use admin::{metrics, reset};
pub use health_check::health_check;
pub use posts::{create_post, delete_post, get_post, list_posts};
pub use sessions::{login, refresh, revoke};
pub use users::{create_user, update_user, UserResponse};
pub use webhooks::payment_webhook;
