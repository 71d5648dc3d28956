use crate::{
    api::{comp_off, leave_request},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

// Per-IP limiter, `None` when the configured rate cannot build one
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let scope = web::scope(&config.api_prefix)
        // /compoff
        .service(
            web::scope("/compoff")
                .service(web::resource("").route(web::get().to(comp_off::my_credits)))
                .service(
                    web::resource("/request").route(web::post().to(comp_off::request_comp_off)),
                )
                .service(web::resource("/balance").route(web::get().to(comp_off::my_balance)))
                .service(
                    web::resource("/balance/{employee_id}")
                        .route(web::get().to(comp_off::employee_balance)),
                )
                .service(
                    web::resource("/{id}/approve").route(web::put().to(comp_off::approve_comp_off)),
                )
                .service(
                    web::resource("/{id}/reject").route(web::put().to(comp_off::reject_comp_off)),
                ),
        )
        // /leave
        .service(
            web::scope("/leave")
                .service(web::resource("/apply").route(web::post().to(leave_request::apply_leave)))
                .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                .service(
                    web::resource("/{id}/approve")
                        .route(web::put().to(leave_request::approve_leave)),
                )
                .service(
                    web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave)),
                )
                .service(
                    web::resource("/{id}/cancel").route(web::put().to(leave_request::cancel_leave)),
                ),
        )
        // /admin
        .service(
            web::scope("/admin")
                .service(
                    web::resource("/compoff/request")
                        .route(web::post().to(comp_off::record_comp_off)),
                )
                .service(
                    web::resource("/leaves/record")
                        .route(web::post().to(leave_request::record_leave)),
                )
                .service(
                    web::resource("/leaves/{id}/cancel")
                        .route(web::put().to(leave_request::admin_cancel_leave)),
                ),
        );

    match build_limiter(config.rate_protected_per_min) {
        Some(limiter) => cfg.service(scope.wrap(limiter)),
        None => {
            tracing::warn!(
                rate = config.rate_protected_per_min,
                "Rate limiter could not be built, serving without it"
            );
            cfg.service(scope)
        }
    };
}
