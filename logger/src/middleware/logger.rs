use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use colored::Colorize;
use common::env_config::Config;
use db::models::developer::Developer;
use futures::future::{LocalBoxFuture, Ready, ready};
use log::info;

/// Logs one line per request: status, method, path, latency and, once the
/// auth middleware has run, the id of the developer behind the request.
///
/// Bodies are never logged; signup and login bodies carry passwords.
pub struct LoggerMiddleware {}

impl LoggerMiddleware {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for LoggerMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = LoggerMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().to_string();
        let path = req.path().to_string();
        let query_string = req.query_string().to_string();
        let ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        let console_logging_enabled = req
            .app_data::<web::Data<Arc<Config>>>()
            .map(|config| config.console_logging_enabled)
            .unwrap_or(true);

        let srv = Rc::clone(&self.service);
        let started = Instant::now();

        Box::pin(async move {
            let res = srv.call(req).await?;

            if console_logging_enabled {
                let elapsed_ms = started.elapsed().as_millis();
                let status_code = res.status().as_u16();
                let developer_id = res
                    .request()
                    .extensions()
                    .get::<Developer>()
                    .map(|developer| developer.id.to_string());

                let colored_status = match status_code {
                    200..=299 => status_code.to_string().green(),
                    300..=399 => status_code.to_string().yellow(),
                    400..=499 => status_code.to_string().bright_red(),
                    _ => status_code.to_string().red(),
                };

                let colored_method = match method.as_str() {
                    "GET" => method.blue(),
                    "POST" => method.yellow(),
                    "PUT" => method.purple(),
                    "DELETE" => method.red(),
                    _ => method.normal(),
                };

                // Query strings may hold a token; only the keys are logged.
                let params: Vec<&str> = query_string
                    .split('&')
                    .filter(|pair| !pair.is_empty())
                    .map(|pair| pair.split('=').next().unwrap_or(pair))
                    .collect();

                info!(
                    "[{}] {} {} {} developer_id={} ip={} params={:?}",
                    colored_status,
                    colored_method,
                    path.bright_white(),
                    format!("({}ms)", elapsed_ms).bright_black(),
                    developer_id.unwrap_or_else(|| "None".to_string()).bright_blue(),
                    ip,
                    params,
                );
            }

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};

    use super::*;

    #[actix_web::test]
    async fn passes_responses_through_untouched() {
        let app = test::init_service(
            App::new()
                .wrap(LoggerMiddleware::new())
                .route("/teapot", web::get().to(|| async { HttpResponse::ImATeapot().body("short and stout") })),
        )
        .await;

        let req = test::TestRequest::get().uri("/teapot?token=secret").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(test::read_body(resp).await, "short and stout");
    }
}
