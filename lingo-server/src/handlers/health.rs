use actix_web::{HttpResponse, Responder};

pub async fn heartbeat() -> impl Responder {
    HttpResponse::Ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::{test, web, App};

    #[actix_rt::test]
    async fn test_heartbeat() {
        let app =
            test::init_service(App::new().route("/heartbeat", web::get().to(heartbeat))).await;

        let req = test::TestRequest::get().uri("/heartbeat").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    }
}
