use std::future::{ready, Ready};

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderValue},
    Error,
};
use futures::future::LocalBoxFuture;

use crate::env;

const CORS_ALLOWED_HEADERS_VALUE: &str = "Content-Type";

/// Validates the `Origin` header against the configured allowlist and sets
/// CORS headers for both preflight (OPTIONS) and actual requests. The
/// session lives in a cookie, so credentials are always allowed for
/// allowlisted origins.
pub struct CorsMiddleware {
    allowed_origins: Vec<String>,
}

impl Default for CorsMiddleware {
    fn default() -> Self {
        Self {
            allowed_origins: env::CONF.cors_allowed_origins.clone(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CorsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let allowed_origin_headers: Vec<(String, HeaderValue)> = self
            .allowed_origins
            .iter()
            .map(|origin| {
                let header_value = HeaderValue::from_str(origin)
                    .expect("CORS allowed origin must be a valid header value");
                (origin.clone(), header_value)
            })
            .collect();

        ready(Ok(CorsMiddlewareService {
            service,
            allowed_origin_headers,
        }))
    }
}

pub struct CorsMiddlewareService<S> {
    service: S,
    allowed_origin_headers: Vec<(String, HeaderValue)>,
}

impl<S, B> Service<ServiceRequest> for CorsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.allowed_origin_headers.is_empty() {
            let req_fut = self.service.call(req);
            return Box::pin(async move { Ok(req_fut.await?.map_into_boxed_body()) });
        }

        let origin = req
            .headers()
            .get(header::ORIGIN)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let allowed_origin_header = origin.as_ref().and_then(|o| {
            self.allowed_origin_headers
                .iter()
                .find(|(allowed, _)| allowed == o)
                .map(|(_, header_value)| header_value.clone())
        });

        if req.method() == actix_web::http::Method::OPTIONS {
            let (req_parts, _) = req.into_parts();
            let mut res = actix_web::HttpResponse::Ok();

            if let Some(origin_header) = &allowed_origin_header {
                res.insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, origin_header));
                res.insert_header((
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
                ));
                res.insert_header((
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(CORS_ALLOWED_HEADERS_VALUE),
                ));
                res.insert_header((
                    header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static("true"),
                ));
                res.insert_header((
                    header::ACCESS_CONTROL_MAX_AGE,
                    HeaderValue::from_static("86400"),
                ));
            }

            let res = ServiceResponse::new(req_parts, res.finish()).map_into_boxed_body();
            return Box::pin(async move { Ok(res) });
        }

        let req_fut = self.service.call(req);

        Box::pin(async move {
            let mut res = req_fut.await?.map_into_boxed_body();

            if let Some(origin_header) = allowed_origin_header {
                res.headers_mut()
                    .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin_header);
                res.headers_mut().insert(
                    header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static("true"),
                );
            }

            Ok(res)
        })
    }
}
