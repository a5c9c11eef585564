use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{err, ok, Ready};

use crate::errors::AppError;

/// Resolves the principal a request acts on behalf of.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, req: &HttpRequest) -> Option<i64>;
}

/// Resolver that maps every request to the same user.
#[derive(Debug, Clone, Copy)]
pub struct FixedIdentity {
    user_id: i64,
}

impl FixedIdentity {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

impl IdentityResolver for FixedIdentity {
    fn resolve(&self, _req: &HttpRequest) -> Option<i64> {
        Some(self.user_id)
    }
}

/// Extractor that provides the acting user's ID.
pub struct ActingUser {
    pub user_id: i64,
}

impl FromRequest for ActingUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let resolver = match req.app_data::<web::Data<dyn IdentityResolver>>() {
            Some(resolver) => resolver,
            None => {
                return err(AppError::InternalError(
                    "Identity resolver not configured".to_string(),
                ))
            }
        };

        match resolver.resolve(req) {
            Some(user_id) => ok(ActingUser { user_id }),
            None => err(AppError::Unauthorized("User not authenticated".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use std::sync::Arc;

    struct Anonymous;

    impl IdentityResolver for Anonymous {
        fn resolve(&self, _req: &HttpRequest) -> Option<i64> {
            None
        }
    }

    fn request_with(resolver: Arc<dyn IdentityResolver>) -> HttpRequest {
        TestRequest::default()
            .app_data(web::Data::from(resolver))
            .to_http_request()
    }

    #[actix_rt::test]
    async fn test_fixed_identity_always_resolves() {
        let req = request_with(Arc::new(FixedIdentity::new(7)));

        let user = ActingUser::extract(&req).await.expect("Should resolve");
        assert_eq!(user.user_id, 7);
    }

    #[actix_rt::test]
    async fn test_missing_identity_is_unauthorized() {
        let req = request_with(Arc::new(Anonymous));

        let result = ActingUser::extract(&req).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[actix_rt::test]
    async fn test_missing_resolver_is_internal_error() {
        let req = TestRequest::default().to_http_request();

        let result = ActingUser::extract(&req).await;
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }
}
